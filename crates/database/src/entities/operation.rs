//! Audit log entries for todo mutations.

use serde::{Deserialize, Serialize};

/// One recorded mutation against a user's todos. `conversation_id` links the
/// operation to the chat exchange that triggered it, when there was one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TodoOperation {
    pub id: i64,
    pub user_id: i64,
    pub todo_id: Option<i64>,
    pub conversation_id: Option<i64>,
    pub operation: String,
    pub detail: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewOperation {
    pub user_id: i64,
    pub todo_id: Option<i64>,
    pub conversation_id: Option<i64>,
    pub operation: String,
    pub detail: Option<serde_json::Value>,
}
