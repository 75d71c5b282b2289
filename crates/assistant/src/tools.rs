//! MCP-style tool registry: typed, parameter-validated wrappers over the
//! todo service. The provider sees the specs; dispatch validates the JSON
//! arguments before anything touches the database.

use crate::error::{AssistantError, AssistantResult};
use crate::resolve::{resolve_reference, Resolution};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tasklane_database::{NewTodo, TodoFilter, TodoPatch, TodoPriority, TodoStatus};
use tasklane_todos::TodoService;
use tracing::debug;

pub const TOOL_ADD_TASK: &str = "add_task";
pub const TOOL_LIST_TASKS: &str = "list_tasks";
pub const TOOL_COMPLETE_TASK: &str = "complete_task";
pub const TOOL_UPDATE_TASK: &str = "update_task";
pub const TOOL_DELETE_TASK: &str = "delete_task";

/// A tool invocation, either produced by the LLM provider or synthesized
/// from a keyword intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// One executed todo mutation or query, reported back to the API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub tool: String,
    pub detail: Value,
}

/// Result of dispatching a tool: a user-facing summary line, plus the
/// action when something actually happened. Unresolved task references
/// yield a clarification summary with no action.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub summary: String,
    pub action: Option<Action>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[derive(Clone)]
pub struct ToolRegistry {
    todos: TodoService,
}

impl ToolRegistry {
    pub fn new(todos: TodoService) -> Self {
        Self { todos }
    }

    pub fn specs() -> Vec<ToolSpec> {
        vec![
            ToolSpec {
                name: TOOL_ADD_TASK,
                description: "Create a todo for the user",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "title": {"type": "string"},
                        "description": {"type": "string"},
                        "priority": {"type": "string", "enum": ["low", "medium", "high"]},
                        "due_date": {"type": "string", "format": "date-time"}
                    },
                    "required": ["title"]
                }),
            },
            ToolSpec {
                name: TOOL_LIST_TASKS,
                description: "List the user's todos, optionally filtered by status",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "status": {"type": "string", "enum": ["pending", "in_progress", "completed"]}
                    }
                }),
            },
            ToolSpec {
                name: TOOL_COMPLETE_TASK,
                description: "Mark a todo as completed; reference by id, #ordinal, or title fragment",
                parameters: json!({
                    "type": "object",
                    "properties": {"reference": {"type": "string"}},
                    "required": ["reference"]
                }),
            },
            ToolSpec {
                name: TOOL_UPDATE_TASK,
                description: "Update a todo's title, priority, status, or due date",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "reference": {"type": "string"},
                        "title": {"type": "string"},
                        "priority": {"type": "string", "enum": ["low", "medium", "high"]},
                        "status": {"type": "string", "enum": ["pending", "in_progress", "completed"]},
                        "due_date": {"type": "string", "format": "date-time"}
                    },
                    "required": ["reference"]
                }),
            },
            ToolSpec {
                name: TOOL_DELETE_TASK,
                description: "Delete a todo; reference by id, #ordinal, or title fragment",
                parameters: json!({
                    "type": "object",
                    "properties": {"reference": {"type": "string"}},
                    "required": ["reference"]
                }),
            },
        ]
    }

    pub async fn dispatch(
        &self,
        call: &ToolCall,
        user_id: i64,
        conversation_id: Option<i64>,
    ) -> AssistantResult<ToolOutcome> {
        debug!(tool = %call.name, "dispatching tool call");
        match call.name.as_str() {
            TOOL_ADD_TASK => self.add_task(call, user_id, conversation_id).await,
            TOOL_LIST_TASKS => self.list_tasks(call, user_id).await,
            TOOL_COMPLETE_TASK => self.complete_task(call, user_id, conversation_id).await,
            TOOL_UPDATE_TASK => self.update_task(call, user_id, conversation_id).await,
            TOOL_DELETE_TASK => self.delete_task(call, user_id, conversation_id).await,
            other => Err(AssistantError::ToolNotFound(other.to_string())),
        }
    }

    async fn add_task(
        &self,
        call: &ToolCall,
        user_id: i64,
        conversation_id: Option<i64>,
    ) -> AssistantResult<ToolOutcome> {
        let title = required_str(call, "title")?;
        let priority = match optional_str(&call.arguments, "priority") {
            Some(value) => TodoPriority::parse(value).ok_or_else(|| invalid(call, "priority"))?,
            None => TodoPriority::default(),
        };

        let new = NewTodo {
            title: title.to_string(),
            description: optional_str(&call.arguments, "description").map(str::to_string),
            priority,
            due_date: optional_str(&call.arguments, "due_date").map(str::to_string),
        };

        let todo = self.todos.create(user_id, new, conversation_id).await?;
        Ok(ToolOutcome {
            summary: format!(
                "Added \"{}\" ({} priority).",
                todo.title, todo.priority
            ),
            action: Some(Action {
                tool: TOOL_ADD_TASK.to_string(),
                detail: json!({"todo_id": todo.public_id, "title": todo.title}),
            }),
        })
    }

    async fn list_tasks(&self, call: &ToolCall, user_id: i64) -> AssistantResult<ToolOutcome> {
        let status = match optional_str(&call.arguments, "status") {
            Some(value) => Some(TodoStatus::parse(value).ok_or_else(|| invalid(call, "status"))?),
            None => None,
        };

        let filter = TodoFilter {
            status,
            ..Default::default()
        };
        let todos = self.todos.list(user_id, &filter).await?;

        let summary = if todos.is_empty() {
            match status {
                Some(status) => format!("You have no {status} tasks."),
                None => "You have no tasks yet.".to_string(),
            }
        } else {
            let mut lines = vec![format!("You have {} task(s):", todos.len())];
            for (index, todo) in todos.iter().enumerate() {
                lines.push(format!(
                    "{}. {} [{}, {}]",
                    index + 1,
                    todo.title,
                    todo.priority,
                    todo.status
                ));
            }
            lines.join("\n")
        };

        Ok(ToolOutcome {
            summary,
            action: Some(Action {
                tool: TOOL_LIST_TASKS.to_string(),
                detail: json!({"count": todos.len()}),
            }),
        })
    }

    async fn complete_task(
        &self,
        call: &ToolCall,
        user_id: i64,
        conversation_id: Option<i64>,
    ) -> AssistantResult<ToolOutcome> {
        let reference = required_str(call, "reference")?;
        let todo = match resolve_reference(&self.todos, user_id, reference).await? {
            Resolution::One(todo) => todo,
            other => return Ok(clarification(reference, other)),
        };

        let todo = self
            .todos
            .complete(user_id, &todo.public_id, conversation_id)
            .await?;
        Ok(ToolOutcome {
            summary: format!("Marked \"{}\" as completed.", todo.title),
            action: Some(Action {
                tool: TOOL_COMPLETE_TASK.to_string(),
                detail: json!({"todo_id": todo.public_id, "title": todo.title}),
            }),
        })
    }

    async fn update_task(
        &self,
        call: &ToolCall,
        user_id: i64,
        conversation_id: Option<i64>,
    ) -> AssistantResult<ToolOutcome> {
        let reference = required_str(call, "reference")?;
        let todo = match resolve_reference(&self.todos, user_id, reference).await? {
            Resolution::One(todo) => todo,
            other => return Ok(clarification(reference, other)),
        };

        let priority = match optional_str(&call.arguments, "priority") {
            Some(value) => Some(TodoPriority::parse(value).ok_or_else(|| invalid(call, "priority"))?),
            None => None,
        };
        let status = match optional_str(&call.arguments, "status") {
            Some(value) => Some(TodoStatus::parse(value).ok_or_else(|| invalid(call, "status"))?),
            None => None,
        };

        let patch = TodoPatch {
            title: optional_str(&call.arguments, "title").map(str::to_string),
            description: None,
            priority,
            status,
            due_date: optional_str(&call.arguments, "due_date").map(|d| Some(d.to_string())),
        };

        let todo = self
            .todos
            .update(user_id, &todo.public_id, patch, conversation_id)
            .await?;
        Ok(ToolOutcome {
            summary: format!(
                "Updated \"{}\" ({} priority, {}).",
                todo.title, todo.priority, todo.status
            ),
            action: Some(Action {
                tool: TOOL_UPDATE_TASK.to_string(),
                detail: json!({"todo_id": todo.public_id, "title": todo.title}),
            }),
        })
    }

    async fn delete_task(
        &self,
        call: &ToolCall,
        user_id: i64,
        conversation_id: Option<i64>,
    ) -> AssistantResult<ToolOutcome> {
        let reference = required_str(call, "reference")?;
        let todo = match resolve_reference(&self.todos, user_id, reference).await? {
            Resolution::One(todo) => todo,
            other => return Ok(clarification(reference, other)),
        };

        self.todos
            .delete(user_id, &todo.public_id, conversation_id)
            .await?;
        Ok(ToolOutcome {
            summary: format!("Deleted \"{}\".", todo.title),
            action: Some(Action {
                tool: TOOL_DELETE_TASK.to_string(),
                detail: json!({"title": todo.title}),
            }),
        })
    }
}

fn clarification(reference: &str, resolution: Resolution) -> ToolOutcome {
    let summary = match resolution {
        Resolution::NotFound => {
            format!("I couldn't find a task matching \"{reference}\". Try \"list my tasks\" to see what's there.")
        }
        Resolution::Ambiguous(titles) => {
            format!(
                "\"{reference}\" matches several tasks: {}. Which one did you mean?",
                titles.join(", ")
            )
        }
        Resolution::One(_) => unreachable!("resolved references are handled by the caller"),
    };
    ToolOutcome {
        summary,
        action: None,
    }
}

fn required_str<'a>(call: &'a ToolCall, key: &str) -> AssistantResult<&'a str> {
    optional_str(&call.arguments, key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AssistantError::InvalidArguments {
            tool: call.name.clone(),
            reason: format!("missing required field {key:?}"),
        })
}

fn optional_str<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(Value::as_str)
}

fn invalid(call: &ToolCall, key: &str) -> AssistantError {
    AssistantError::InvalidArguments {
        tool: call.name.clone(),
        reason: format!("unrecognized value for {key:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_cover_all_tools() {
        let names: Vec<&str> = ToolRegistry::specs().iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                TOOL_ADD_TASK,
                TOOL_LIST_TASKS,
                TOOL_COMPLETE_TASK,
                TOOL_UPDATE_TASK,
                TOOL_DELETE_TASK
            ]
        );
    }

    #[test]
    fn required_str_rejects_missing_and_blank() {
        let call = ToolCall {
            name: TOOL_ADD_TASK.to_string(),
            arguments: json!({"title": "  "}),
        };
        assert!(required_str(&call, "title").is_err());

        let call = ToolCall {
            name: TOOL_ADD_TASK.to_string(),
            arguments: json!({}),
        };
        assert!(required_str(&call, "title").is_err());
    }
}
