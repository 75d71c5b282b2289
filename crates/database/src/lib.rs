//! Persistence layer for Tasklane: connection management, embedded
//! migrations, entity definitions, and repository implementations.

use sqlx::SqlitePool;
use tasklane_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod ids;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::{prepare_database, DatabaseConnection};
pub use ids::new_public_id;
pub use migrations::run_migrations;

pub use repos::{
    ConversationRepository, MessageRepository, OperationRepository, TodoRepository,
};

pub use entities::{
    conversation::Conversation,
    message::{Message, MessageRole},
    operation::{NewOperation, TodoOperation},
    todo::{NewTodo, Todo, TodoFilter, TodoPatch, TodoPriority, TodoStatus},
};

pub use types::{errors::DatabaseError, DatabaseResult};

/// Open the database described by `config` and bring the schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    pub async fn test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    pub async fn insert_user(pool: &SqlitePool, email: &str) -> i64 {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO users (public_id, email, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(new_public_id())
        .bind(email)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .unwrap();
        result.last_insert_rowid()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::test_pool;

    #[tokio::test]
    async fn migrations_enable_foreign_keys() {
        let (pool, _dir) = test_pool().await;

        let (enabled,): (bool,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(enabled);
    }

    #[tokio::test]
    async fn schema_contains_expected_tables() {
        let (pool, _dir) = test_pool().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();
        for expected in [
            "users",
            "user_identities",
            "sessions",
            "todos",
            "todo_operations",
            "conversations",
            "messages",
        ] {
            assert!(names.contains(&expected), "missing table {expected}");
        }
    }
}
