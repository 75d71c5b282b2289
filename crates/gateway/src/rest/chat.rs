//! Chat endpoints: talk to the assistant and browse past conversations.

use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::state::GatewayState;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tasklane_chat::{ChatReply, SendMessage};
use tasklane_database::{Conversation, Message, MessageRole};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub conversation_id: String,
    pub reply: String,
    pub actions: Vec<ActionResponse>,
}

/// A todo mutation the assistant performed while answering.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub tool: String,
    #[schema(value_type = Object)]
    pub detail: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub id: String,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub role: &'static str,
    pub content: String,
    pub created_at: String,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            conversation_id: reply.conversation_id,
            reply: reply.reply,
            actions: reply
                .actions
                .into_iter()
                .map(|action| ActionResponse {
                    tool: action.tool,
                    detail: action.detail,
                })
                .collect(),
        }
    }
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.public_id,
            title: conversation.title,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            role: match message.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            },
            content: message.content,
            created_at: message.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty message"),
        (status = 404, description = "Unknown conversation id")
    ),
    security(("bearer_token" = []))
)]
pub async fn send(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let reply = state
        .chat
        .send(
            user.id,
            SendMessage {
                conversation_id: request.conversation_id,
                message: request.message,
            },
        )
        .await?;

    Ok(Json(reply.into()))
}

#[utoipa::path(
    get,
    path = "/api/conversations",
    responses(
        (status = 200, description = "Conversations, most recently active first", body = [ConversationResponse])
    ),
    security(("bearer_token" = []))
)]
pub async fn conversations(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<ConversationResponse>>> {
    let conversations = state.chat.list_conversations(user.id).await?;
    Ok(Json(
        conversations
            .into_iter()
            .map(ConversationResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/conversations/{id}/messages",
    params(("id" = String, Path, description = "Public conversation id")),
    responses(
        (status = 200, description = "Messages in order", body = [MessageResponse]),
        (status = 404, description = "Unknown conversation id")
    ),
    security(("bearer_token" = []))
)]
pub async fn messages(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let messages = state.chat.history(user.id, &id).await?;
    Ok(Json(
        messages.into_iter().map(MessageResponse::from).collect(),
    ))
}
