//! Chat-completions client for OpenRouter-compatible providers. The model
//! is instructed to answer with a single JSON object: either a tool call or
//! a plain reply. Anything unparseable falls back to the keyword router.

use crate::error::{AssistantError, AssistantResult};
use crate::tools::{ToolCall, ToolRegistry};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tasklane_config::AssistantConfig;
use tracing::debug;

#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

/// What the model decided: invoke a tool, or answer directly.
#[derive(Debug)]
pub enum Plan {
    Tool(ToolCall),
    Reply(String),
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

#[derive(Deserialize)]
struct PlannedOutput {
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    arguments: Option<serde_json::Value>,
    #[serde(default)]
    reply: Option<String>,
}

impl ProviderClient {
    /// Returns `None` when no API key is configured, in which case the
    /// assistant runs on the keyword router alone.
    pub fn from_config(config: &AssistantConfig) -> AssistantResult<Option<Self>> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("TASKLANE_ASSISTANT_API_KEY").ok());
        let Some(api_key) = api_key else {
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Some(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        }))
    }

    /// Ask the model to route `messages` into a tool call or a direct reply.
    pub async fn plan(&self, messages: &[WireMessage]) -> AssistantResult<Plan> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = CompletionRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let parsed: CompletionResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AssistantError::ProviderResponse("empty choices".to_string()))?;

        parse_plan(&content)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Build the routing prompt: tool specs plus the output contract.
pub fn system_prompt() -> String {
    let specs = serde_json::to_string_pretty(&ToolRegistry::specs())
        .unwrap_or_else(|_| "[]".to_string());
    format!(
        "You are a todo assistant. You manage the user's tasks through these tools:\n\
         {specs}\n\
         Respond with exactly one JSON object and nothing else. To call a tool:\n\
         {{\"tool\": \"<name>\", \"arguments\": {{...}}}}\n\
         To answer without a tool:\n\
         {{\"reply\": \"<text>\"}}"
    )
}

fn parse_plan(content: &str) -> AssistantResult<Plan> {
    let trimmed = strip_code_fence(content.trim());
    let output: PlannedOutput = serde_json::from_str(trimmed)
        .map_err(|e| AssistantError::ProviderResponse(format!("not a plan object: {e}")))?;

    debug!(tool = ?output.tool, "parsed provider plan");
    let PlannedOutput {
        tool,
        arguments,
        reply,
    } = output;

    match (tool, reply) {
        (Some(name), _) if !name.is_empty() => Ok(Plan::Tool(ToolCall {
            name,
            arguments: arguments.unwrap_or_else(|| serde_json::json!({})),
        })),
        (_, Some(reply)) => Ok(Plan::Reply(reply)),
        _ => Err(AssistantError::ProviderResponse(
            "plan has neither tool nor reply".to_string(),
        )),
    }
}

/// Models love wrapping JSON in markdown fences; tolerate that.
fn strip_code_fence(content: &str) -> &str {
    let content = content
        .strip_prefix("```json")
        .or_else(|| content.strip_prefix("```"))
        .unwrap_or(content);
    content.strip_suffix("```").unwrap_or(content).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_parses_tool_call() {
        let plan = parse_plan(r#"{"tool": "add_task", "arguments": {"title": "buy milk"}}"#)
            .unwrap();
        match plan {
            Plan::Tool(call) => {
                assert_eq!(call.name, "add_task");
                assert_eq!(call.arguments["title"], "buy milk");
            }
            Plan::Reply(_) => panic!("expected a tool plan"),
        }
    }

    #[test]
    fn plan_parses_direct_reply_with_fence() {
        let plan = parse_plan("```json\n{\"reply\": \"hello!\"}\n```").unwrap();
        match plan {
            Plan::Reply(reply) => assert_eq!(reply, "hello!"),
            Plan::Tool(_) => panic!("expected a reply plan"),
        }
    }

    #[test]
    fn garbage_output_is_an_error() {
        assert!(parse_plan("sure, I'll add that for you").is_err());
        assert!(parse_plan("{}").is_err());
    }

    #[test]
    fn system_prompt_mentions_every_tool() {
        let prompt = system_prompt();
        for name in ["add_task", "list_tasks", "complete_task", "update_task", "delete_task"] {
            assert!(prompt.contains(name));
        }
    }
}
