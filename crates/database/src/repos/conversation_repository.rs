//! Repository for conversation data access.

use crate::entities::conversation::Conversation;
use crate::ids::new_public_id;
use crate::types::DatabaseResult;
use chrono::Utc;
use sqlx::SqlitePool;

const CONVERSATION_COLUMNS: &str = "id, public_id, user_id, title, created_at, updated_at";

#[derive(Clone)]
pub struct ConversationRepository {
    pool: SqlitePool,
}

impl ConversationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        user_id: i64,
        title: Option<&str>,
    ) -> DatabaseResult<Conversation> {
        let now = Utc::now().to_rfc3339();
        let public_id = new_public_id();

        sqlx::query(
            "INSERT INTO conversations (public_id, user_id, title, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(user_id)
        .bind(title)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let conversation = sqlx::query_as::<_, Conversation>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE public_id = ?"
        ))
        .bind(&public_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(conversation)
    }

    pub async fn find_by_public_id(
        &self,
        user_id: i64,
        public_id: &str,
    ) -> DatabaseResult<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE user_id = ? AND public_id = ?"
        ))
        .bind(user_id)
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    pub async fn list(&self, user_id: i64) -> DatabaseResult<Vec<Conversation>> {
        let conversations = sqlx::query_as::<_, Conversation>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE user_id = ? \
             ORDER BY updated_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }

    /// Bump `updated_at` so the conversation sorts to the top of the list.
    pub async fn touch(&self, conversation_id: i64) -> DatabaseResult<()> {
        sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_user, test_pool};

    #[tokio::test]
    async fn insert_and_list() {
        let (pool, _dir) = test_pool().await;
        let user_id = insert_user(&pool, "chat@example.com").await;
        let repo = ConversationRepository::new(pool);

        let first = repo.insert(user_id, Some("groceries")).await.unwrap();
        let second = repo.insert(user_id, None).await.unwrap();

        let all = repo.list(user_id).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(first.title.as_deref(), Some("groceries"));
        assert!(second.title.is_none());
    }
}
