//! Repository for the todo operation audit log.

use crate::entities::operation::{NewOperation, TodoOperation};
use crate::types::DatabaseResult;
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct OperationRepository {
    pool: SqlitePool,
}

impl OperationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, new: &NewOperation) -> DatabaseResult<()> {
        let detail = new.detail.as_ref().map(|value| value.to_string());

        sqlx::query(
            "INSERT INTO todo_operations (user_id, todo_id, conversation_id, operation, detail, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new.user_id)
        .bind(new.todo_id)
        .bind(new.conversation_id)
        .bind(&new.operation)
        .bind(detail)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> DatabaseResult<Vec<TodoOperation>> {
        let operations = sqlx::query_as::<_, TodoOperation>(
            "SELECT id, user_id, todo_id, conversation_id, operation, detail, created_at \
             FROM todo_operations WHERE user_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_user, test_pool};
    use serde_json::json;

    #[tokio::test]
    async fn insert_and_list_operations() {
        let (pool, _dir) = test_pool().await;
        let user_id = insert_user(&pool, "audit@example.com").await;
        let repo = OperationRepository::new(pool);

        repo.insert(&NewOperation {
            user_id,
            todo_id: None,
            conversation_id: None,
            operation: "create".to_string(),
            detail: Some(json!({"title": "buy milk"})),
        })
        .await
        .unwrap();

        let ops = repo.list_for_user(user_id, 10).await.unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operation, "create");
        assert!(ops[0].detail.as_deref().unwrap().contains("buy milk"));
    }
}
