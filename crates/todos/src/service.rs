//! Todo CRUD service. Every mutation appends one row to the operation log,
//! tagged with the conversation that triggered it when the call came from
//! the chat layer.

use crate::error::{TodoError, TodoResult};
use crate::validation::{validate_due_date, validate_title};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use tasklane_database::{
    NewOperation, NewTodo, OperationRepository, Todo, TodoFilter, TodoOperation, TodoRepository,
    TodoStatus,
};
use tracing::debug;

#[derive(Clone)]
pub struct TodoService {
    todos: TodoRepository,
    operations: OperationRepository,
}

impl TodoService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            todos: TodoRepository::new(pool.clone()),
            operations: OperationRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        user_id: i64,
        mut new: NewTodo,
        conversation_id: Option<i64>,
    ) -> TodoResult<Todo> {
        new.title = validate_title(&new.title)?;
        if let Some(due) = &new.due_date {
            new.due_date = Some(validate_due_date(due)?);
        }

        let todo = self.todos.insert(user_id, &new).await?;
        self.log(
            user_id,
            Some(todo.id),
            conversation_id,
            "create",
            json!({"title": todo.title, "priority": todo.priority}),
        )
        .await?;

        debug!(todo = %todo.public_id, "created todo");
        Ok(todo)
    }

    pub async fn list(&self, user_id: i64, filter: &TodoFilter) -> TodoResult<Vec<Todo>> {
        Ok(self.todos.list(user_id, filter).await?)
    }

    pub async fn get(&self, user_id: i64, public_id: &str) -> TodoResult<Todo> {
        self.todos
            .find_by_public_id(user_id, public_id)
            .await?
            .ok_or(TodoError::NotFound)
    }

    pub async fn update(
        &self,
        user_id: i64,
        public_id: &str,
        patch: tasklane_database::TodoPatch,
        conversation_id: Option<i64>,
    ) -> TodoResult<Todo> {
        let mut todo = self.get(user_id, public_id).await?;
        let mut changed = Vec::new();

        if let Some(title) = patch.title {
            todo.title = validate_title(&title)?;
            changed.push("title");
        }
        if let Some(description) = patch.description {
            todo.description = description;
            changed.push("description");
        }
        if let Some(priority) = patch.priority {
            todo.priority = priority;
            changed.push("priority");
        }
        if let Some(due_date) = patch.due_date {
            todo.due_date = match due_date {
                Some(due) => Some(validate_due_date(&due)?),
                None => None,
            };
            changed.push("due_date");
        }
        if let Some(status) = patch.status {
            apply_status(&mut todo, status);
            changed.push("status");
        }

        if changed.is_empty() {
            return Ok(todo);
        }

        todo.updated_at = Utc::now().to_rfc3339();
        self.todos.update(&todo).await?;
        self.log(
            user_id,
            Some(todo.id),
            conversation_id,
            "update",
            json!({"changed": changed}),
        )
        .await?;

        Ok(todo)
    }

    /// Shorthand for setting the status to completed.
    pub async fn complete(
        &self,
        user_id: i64,
        public_id: &str,
        conversation_id: Option<i64>,
    ) -> TodoResult<Todo> {
        let mut todo = self.get(user_id, public_id).await?;
        if todo.status != TodoStatus::Completed {
            apply_status(&mut todo, TodoStatus::Completed);
            todo.updated_at = Utc::now().to_rfc3339();
            self.todos.update(&todo).await?;
            self.log(
                user_id,
                Some(todo.id),
                conversation_id,
                "complete",
                json!({"title": todo.title}),
            )
            .await?;
        }
        Ok(todo)
    }

    pub async fn delete(
        &self,
        user_id: i64,
        public_id: &str,
        conversation_id: Option<i64>,
    ) -> TodoResult<()> {
        let todo = self.get(user_id, public_id).await?;
        if !self.todos.delete(user_id, public_id).await? {
            return Err(TodoError::NotFound);
        }
        self.log(
            user_id,
            None,
            conversation_id,
            "delete",
            json!({"title": todo.title}),
        )
        .await?;

        Ok(())
    }

    pub async fn recent_operations(
        &self,
        user_id: i64,
        limit: i64,
    ) -> TodoResult<Vec<TodoOperation>> {
        Ok(self.operations.list_for_user(user_id, limit).await?)
    }

    async fn log(
        &self,
        user_id: i64,
        todo_id: Option<i64>,
        conversation_id: Option<i64>,
        operation: &str,
        detail: serde_json::Value,
    ) -> TodoResult<()> {
        self.operations
            .insert(&NewOperation {
                user_id,
                todo_id,
                conversation_id,
                operation: operation.to_string(),
                detail: Some(detail),
            })
            .await?;
        Ok(())
    }
}

/// Keep `completed_at` consistent with the status column.
fn apply_status(todo: &mut Todo, status: TodoStatus) {
    match (todo.status, status) {
        (TodoStatus::Completed, TodoStatus::Completed) => {}
        (_, TodoStatus::Completed) => {
            todo.completed_at = Some(Utc::now().to_rfc3339());
        }
        (TodoStatus::Completed, _) => {
            todo.completed_at = None;
        }
        _ => {}
    }
    todo.status = status;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklane_config::DatabaseConfig;
    use tasklane_database::{initialize_database, TodoPatch, TodoPriority};
    use tempfile::TempDir;

    async fn test_service() -> (TodoService, i64, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", temp_dir.path().join("todos.db").display()),
            max_connections: 1,
        };
        let pool = initialize_database(&config).await.unwrap();

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO users (public_id, email, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(tasklane_database::new_public_id())
        .bind("svc@example.com")
        .bind(&now)
        .bind(&now)
        .execute(&pool)
        .await
        .unwrap();

        (
            TodoService::new(pool),
            result.last_insert_rowid(),
            temp_dir,
        )
    }

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            description: None,
            priority: TodoPriority::Medium,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn create_validates_and_logs() {
        let (service, user_id, _dir) = test_service().await;

        let todo = service
            .create(user_id, new_todo("  buy milk  "), None)
            .await
            .unwrap();
        assert_eq!(todo.title, "buy milk");

        let err = service
            .create(user_id, new_todo("   "), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TodoError::EmptyTitle));

        let ops = service.recent_operations(user_id, 10).await.unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operation, "create");
    }

    #[tokio::test]
    async fn complete_sets_and_clears_completed_at() {
        let (service, user_id, _dir) = test_service().await;
        let todo = service
            .create(user_id, new_todo("finish report"), None)
            .await
            .unwrap();

        let done = service
            .complete(user_id, &todo.public_id, None)
            .await
            .unwrap();
        assert_eq!(done.status, TodoStatus::Completed);
        assert!(done.completed_at.is_some());

        // Completing again is a no-op and does not double-log.
        let ops_before = service.recent_operations(user_id, 10).await.unwrap().len();
        service
            .complete(user_id, &todo.public_id, None)
            .await
            .unwrap();
        let ops_after = service.recent_operations(user_id, 10).await.unwrap().len();
        assert_eq!(ops_before, ops_after);

        // Reopening clears completed_at.
        let reopened = service
            .update(
                user_id,
                &todo.public_id,
                TodoPatch {
                    status: Some(TodoStatus::Pending),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(reopened.status, TodoStatus::Pending);
        assert!(reopened.completed_at.is_none());
    }

    #[tokio::test]
    async fn update_can_clear_description_and_due_date() {
        let (service, user_id, _dir) = test_service().await;
        let todo = service
            .create(
                user_id,
                NewTodo {
                    title: "with extras".to_string(),
                    description: Some("details".to_string()),
                    priority: TodoPriority::High,
                    due_date: Some("2026-09-01T12:00:00Z".to_string()),
                },
                None,
            )
            .await
            .unwrap();

        let updated = service
            .update(
                user_id,
                &todo.public_id,
                TodoPatch {
                    description: Some(None),
                    due_date: Some(None),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert!(updated.description.is_none());
        assert!(updated.due_date.is_none());
    }

    #[tokio::test]
    async fn delete_unknown_todo_is_not_found() {
        let (service, user_id, _dir) = test_service().await;
        let err = service.delete(user_id, "missing", None).await.unwrap_err();
        assert!(matches!(err, TodoError::NotFound));
    }

    #[tokio::test]
    async fn chat_mutations_carry_conversation_id() {
        let (service, user_id, _dir) = test_service().await;
        service
            .create(user_id, new_todo("from chat"), Some(42))
            .await
            .unwrap();

        let ops = service.recent_operations(user_id, 10).await.unwrap();
        assert_eq!(ops[0].conversation_id, Some(42));
    }
}
