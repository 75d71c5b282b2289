//! Repository for chat message data access.

use crate::entities::message::{Message, MessageRole};
use crate::ids::new_public_id;
use crate::types::DatabaseResult;
use chrono::Utc;
use sqlx::SqlitePool;

const MESSAGE_COLUMNS: &str = "id, public_id, conversation_id, role, content, created_at";

#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
    ) -> DatabaseResult<Message> {
        let now = Utc::now().to_rfc3339();
        let public_id = new_public_id();

        sqlx::query(
            "INSERT INTO messages (public_id, conversation_id, role, content, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(conversation_id)
        .bind(role)
        .bind(content)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let message = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE public_id = ?"
        ))
        .bind(&public_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn list(&self, conversation_id: i64) -> DatabaseResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE conversation_id = ? \
             ORDER BY id ASC"
        ))
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// The most recent `limit` messages, returned oldest first. This is the
    /// bounded history window fed to the assistant.
    pub async fn recent(
        &self,
        conversation_id: i64,
        limit: i64,
    ) -> DatabaseResult<Vec<Message>> {
        let mut messages = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE conversation_id = ? \
             ORDER BY id DESC LIMIT ?"
        ))
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        messages.reverse();
        Ok(messages)
    }
}
