//! Natural-language routing for todo management.
//!
//! The assistant turns a chat message into a tool call over the todo
//! service. Routing is two-tiered: an optional LLM provider (OpenRouter-
//! compatible chat completions) plans the call, and a deterministic keyword
//! router handles everything when no provider is configured or the provider
//! misbehaves. Either way, mutations only happen through the validated
//! tool registry.

pub mod error;
pub mod intent;
pub mod provider;
pub mod resolve;
pub mod tools;

pub use error::{AssistantError, AssistantResult};
pub use tools::{Action, ToolCall, ToolRegistry};

use intent::Intent;
use provider::{Plan, ProviderClient, WireMessage};
use serde_json::json;
use tasklane_config::AssistantConfig;
use tasklane_database::{Message, MessageRole};
use tasklane_todos::TodoService;
use tracing::{info, warn};

const SMALL_TALK_REPLY: &str = "I can add, list, update, complete, and delete your tasks. \
     Try \"add a task to buy milk\" or \"list my tasks\".";

#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub content: String,
    pub actions: Vec<Action>,
}

#[derive(Clone)]
pub struct Assistant {
    tools: ToolRegistry,
    provider: Option<ProviderClient>,
}

impl Assistant {
    pub fn new(config: &AssistantConfig, todos: TodoService) -> AssistantResult<Self> {
        let provider = ProviderClient::from_config(config)?;
        match &provider {
            Some(client) => info!(model = client.model(), "assistant provider configured"),
            None => info!("no assistant provider configured, using keyword routing"),
        }

        Ok(Self {
            tools: ToolRegistry::new(todos),
            provider,
        })
    }

    /// Route one user message, given the bounded conversation window
    /// (oldest first, already including the new message).
    pub async fn respond(
        &self,
        user_id: i64,
        conversation_id: i64,
        history: &[Message],
        text: &str,
    ) -> AssistantResult<AssistantReply> {
        if let Some(provider) = &self.provider {
            match provider.plan(&build_wire_history(history)).await {
                Ok(Plan::Tool(call)) => {
                    match self.run_tool(&call, user_id, conversation_id).await {
                        // A plan naming an unregistered tool is provider
                        // misbehavior; route the message through the keyword
                        // router instead of failing the request.
                        Err(AssistantError::ToolNotFound(tool)) => {
                            warn!(%tool, "provider named an unregistered tool, falling back to keyword router");
                        }
                        other => return other,
                    }
                }
                Ok(Plan::Reply(content)) => {
                    return Ok(AssistantReply {
                        content,
                        actions: Vec::new(),
                    });
                }
                Err(err) => {
                    warn!(error = %err, "provider routing failed, falling back to keyword router");
                }
            }
        }

        match intent_to_call(intent::parse_intent(text)) {
            Some(call) => self.run_tool(&call, user_id, conversation_id).await,
            None => Ok(AssistantReply {
                content: SMALL_TALK_REPLY.to_string(),
                actions: Vec::new(),
            }),
        }
    }

    async fn run_tool(
        &self,
        call: &ToolCall,
        user_id: i64,
        conversation_id: i64,
    ) -> AssistantResult<AssistantReply> {
        let outcome = match self
            .tools
            .dispatch(call, user_id, Some(conversation_id))
            .await
        {
            Ok(outcome) => outcome,
            // Bad tool arguments are a routing defect, not a user error;
            // answer with guidance instead of failing the request.
            Err(AssistantError::InvalidArguments { tool, reason }) => {
                warn!(%tool, %reason, "tool call had invalid arguments");
                return Ok(AssistantReply {
                    content: SMALL_TALK_REPLY.to_string(),
                    actions: Vec::new(),
                });
            }
            Err(err) => return Err(err),
        };

        Ok(AssistantReply {
            content: outcome.summary,
            actions: outcome.action.into_iter().collect(),
        })
    }
}

fn build_wire_history(history: &[Message]) -> Vec<WireMessage> {
    let mut messages = vec![WireMessage {
        role: "system",
        content: provider::system_prompt(),
    }];
    messages.extend(history.iter().map(|message| WireMessage {
        role: match message.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        },
        content: message.content.clone(),
    }));
    messages
}

fn intent_to_call(intent: Intent) -> Option<ToolCall> {
    let (name, arguments) = match intent {
        Intent::AddTask { title, priority } => {
            let mut arguments = json!({"title": title});
            if let Some(priority) = priority {
                arguments["priority"] = json!(priority.as_str());
            }
            (tools::TOOL_ADD_TASK, arguments)
        }
        Intent::ListTasks { status } => {
            let mut arguments = json!({});
            if let Some(status) = status {
                arguments["status"] = json!(status.as_str());
            }
            (tools::TOOL_LIST_TASKS, arguments)
        }
        Intent::CompleteTask { reference } => {
            (tools::TOOL_COMPLETE_TASK, json!({"reference": reference}))
        }
        Intent::DeleteTask { reference } => {
            (tools::TOOL_DELETE_TASK, json!({"reference": reference}))
        }
        Intent::UpdateTask {
            reference,
            priority,
        } => {
            let mut arguments = json!({"reference": reference});
            if let Some(priority) = priority {
                arguments["priority"] = json!(priority.as_str());
            }
            (tools::TOOL_UPDATE_TASK, arguments)
        }
        Intent::SmallTalk => return None,
    };

    Some(ToolCall {
        name: name.to_string(),
        arguments,
    })
}
