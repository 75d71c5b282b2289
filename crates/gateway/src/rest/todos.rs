//! Todo CRUD endpoints. All routes are scoped to the authenticated user.

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::GatewayState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tasklane_database::{NewTodo, Todo, TodoFilter, TodoPatch, TodoPriority, TodoStatus};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct TodoResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "medium")]
    pub priority: TodoPriority,
    #[schema(value_type = String, example = "pending")]
    pub status: TodoStatus,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.public_id,
            title: todo.title,
            description: todo.description,
            priority: todo.priority,
            status: todo.status,
            due_date: todo.due_date,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
            completed_at: todo.completed_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "high")]
    pub priority: Option<TodoPriority>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Partial update. Omitted fields are untouched; sending `null` for
/// `description` or `due_date` clears them.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[schema(value_type = Option<String>)]
    pub priority: Option<TodoPriority>,
    #[schema(value_type = Option<String>)]
    pub status: Option<TodoStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub due_date: Option<Option<String>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Filter values arrive as strings so a bad value is a 400 with a useful
/// message instead of a generic deserialization rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListTodosQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListTodosQuery {
    fn into_filter(self) -> Result<TodoFilter, ApiError> {
        let status = self
            .status
            .map(|value| {
                TodoStatus::parse(&value)
                    .ok_or_else(|| ApiError::InvalidRequest(format!("unknown status `{value}`")))
            })
            .transpose()?;
        let priority = self
            .priority
            .map(|value| {
                TodoPriority::parse(&value)
                    .ok_or_else(|| ApiError::InvalidRequest(format!("unknown priority `{value}`")))
            })
            .transpose()?;

        Ok(TodoFilter {
            status,
            priority,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoResponse),
        (status = 400, description = "Empty title, overlong title, or invalid due date")
    ),
    security(("bearer_token" = []))
)]
pub async fn create(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<TodoResponse>)> {
    let new = NewTodo {
        title: request.title,
        description: request.description,
        priority: request.priority.unwrap_or_default(),
        due_date: request.due_date,
    };

    let todo = state.todos.create(user.id, new, None).await?;
    Ok((StatusCode::CREATED, Json(todo.into())))
}

#[utoipa::path(
    get,
    path = "/api/todos",
    params(ListTodosQuery),
    responses(
        (status = 200, description = "Todos for the authenticated user", body = [TodoResponse]),
        (status = 400, description = "Unknown status or priority filter")
    ),
    security(("bearer_token" = []))
)]
pub async fn list(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListTodosQuery>,
) -> ApiResult<Json<Vec<TodoResponse>>> {
    let filter = query.into_filter()?;
    let todos = state.todos.list(user.id, &filter).await?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    params(("id" = String, Path, description = "Public todo id")),
    responses(
        (status = 200, description = "The todo", body = TodoResponse),
        (status = 404, description = "No such todo for this user")
    ),
    security(("bearer_token" = []))
)]
pub async fn show(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<TodoResponse>> {
    let todo = state.todos.get(user.id, &id).await?;
    Ok(Json(todo.into()))
}

#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(("id" = String, Path, description = "Public todo id")),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Updated todo", body = TodoResponse),
        (status = 400, description = "Invalid field value"),
        (status = 404, description = "No such todo for this user")
    ),
    security(("bearer_token" = []))
)]
pub async fn update(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTodoRequest>,
) -> ApiResult<Json<TodoResponse>> {
    let patch = TodoPatch {
        title: request.title,
        description: request.description,
        priority: request.priority,
        status: request.status,
        due_date: request.due_date,
    };

    let todo = state.todos.update(user.id, &id, patch, None).await?;
    Ok(Json(todo.into()))
}

#[utoipa::path(
    post,
    path = "/api/todos/{id}/complete",
    params(("id" = String, Path, description = "Public todo id")),
    responses(
        (status = 200, description = "Todo marked completed", body = TodoResponse),
        (status = 404, description = "No such todo for this user")
    ),
    security(("bearer_token" = []))
)]
pub async fn complete(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<TodoResponse>> {
    let todo = state.todos.complete(user.id, &id, None).await?;
    Ok(Json(todo.into()))
}

#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(("id" = String, Path, description = "Public todo id")),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 404, description = "No such todo for this user")
    ),
    security(("bearer_token" = []))
)]
pub async fn remove(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.todos.delete(user.id, &id, None).await?;
    Ok(StatusCode::NO_CONTENT)
}
