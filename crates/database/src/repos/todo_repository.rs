//! Repository for todo data access.

use crate::entities::todo::{NewTodo, Todo, TodoFilter};
use crate::ids::new_public_id;
use crate::types::DatabaseResult;
use chrono::Utc;
use sqlx::SqlitePool;

const TODO_COLUMNS: &str = "id, public_id, user_id, title, description, priority, status, \
     due_date, created_at, updated_at, completed_at";

#[derive(Clone)]
pub struct TodoRepository {
    pool: SqlitePool,
}

impl TodoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, user_id: i64, new: &NewTodo) -> DatabaseResult<Todo> {
        let now = Utc::now().to_rfc3339();
        let public_id = new_public_id();

        sqlx::query(
            "INSERT INTO todos (public_id, user_id, title, description, priority, status, due_date, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, 'pending', ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(user_id)
        .bind(&new.title)
        .bind(new.description.as_deref())
        .bind(new.priority)
        .bind(new.due_date.as_deref())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE public_id = ?"
        ))
        .bind(&public_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(todo)
    }

    pub async fn find_by_public_id(
        &self,
        user_id: i64,
        public_id: &str,
    ) -> DatabaseResult<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ? AND public_id = ?"
        ))
        .bind(user_id)
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    pub async fn list(&self, user_id: i64, filter: &TodoFilter) -> DatabaseResult<Vec<Todo>> {
        let mut sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ?");
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.priority.is_some() {
            sql.push_str(" AND priority = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, Todo>(&sql).bind(user_id);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(priority) = filter.priority {
            query = query.bind(priority);
        }
        let limit = filter.limit.unwrap_or(100).clamp(1, 500);
        let offset = filter.offset.unwrap_or(0).max(0);
        let todos = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(todos)
    }

    /// Persist the mutable fields of an already-loaded todo.
    pub async fn update(&self, todo: &Todo) -> DatabaseResult<()> {
        sqlx::query(
            "UPDATE todos SET title = ?, description = ?, priority = ?, status = ?, \
             due_date = ?, updated_at = ?, completed_at = ? WHERE id = ?",
        )
        .bind(&todo.title)
        .bind(todo.description.as_deref())
        .bind(todo.priority)
        .bind(todo.status)
        .bind(todo.due_date.as_deref())
        .bind(&todo.updated_at)
        .bind(todo.completed_at.as_deref())
        .bind(todo.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a todo; returns whether a row was removed.
    pub async fn delete(&self, user_id: i64, public_id: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE user_id = ? AND public_id = ?")
            .bind(user_id)
            .bind(public_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self, user_id: i64) -> DatabaseResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
