//! Conversation handling: persist the exchange, feed the assistant a
//! bounded history window, and record its reply.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tasklane_assistant::{Action, Assistant, AssistantError};
use tasklane_database::{
    Conversation, ConversationRepository, DatabaseError, Message, MessageRepository, MessageRole,
};
use thiserror::Error;
use tracing::debug;

/// Most recent messages handed to the assistant per turn. Older context is
/// dropped, not summarized.
pub const HISTORY_WINDOW: i64 = 20;

/// Conversations without an explicit title take the first message,
/// truncated to this many characters.
const TITLE_MAX_CHARS: usize = 60;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("conversation not found")]
    ConversationNotFound,

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessage {
    pub conversation_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub conversation_id: String,
    pub reply: String,
    pub actions: Vec<Action>,
}

#[derive(Clone)]
pub struct ChatService {
    conversations: ConversationRepository,
    messages: MessageRepository,
    assistant: Assistant,
}

impl ChatService {
    pub fn new(pool: SqlitePool, assistant: Assistant) -> Self {
        Self {
            conversations: ConversationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
            assistant,
        }
    }

    pub async fn send(&self, user_id: i64, request: SendMessage) -> ChatResult<ChatReply> {
        let text = request.message.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let conversation = self
            .resolve_conversation(user_id, request.conversation_id.as_deref(), text)
            .await?;

        self.messages
            .insert(conversation.id, MessageRole::User, text)
            .await?;

        let window = self.messages.recent(conversation.id, HISTORY_WINDOW).await?;
        debug!(
            conversation = %conversation.public_id,
            window = window.len(),
            "routing chat message"
        );

        let reply = self
            .assistant
            .respond(user_id, conversation.id, &window, text)
            .await?;

        self.messages
            .insert(conversation.id, MessageRole::Assistant, &reply.content)
            .await?;
        self.conversations.touch(conversation.id).await?;

        Ok(ChatReply {
            conversation_id: conversation.public_id,
            reply: reply.content,
            actions: reply.actions,
        })
    }

    pub async fn list_conversations(&self, user_id: i64) -> ChatResult<Vec<Conversation>> {
        Ok(self.conversations.list(user_id).await?)
    }

    pub async fn history(
        &self,
        user_id: i64,
        conversation_public_id: &str,
    ) -> ChatResult<Vec<Message>> {
        let conversation = self
            .conversations
            .find_by_public_id(user_id, conversation_public_id)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        Ok(self.messages.list(conversation.id).await?)
    }

    async fn resolve_conversation(
        &self,
        user_id: i64,
        public_id: Option<&str>,
        first_message: &str,
    ) -> ChatResult<Conversation> {
        match public_id {
            Some(public_id) => self
                .conversations
                .find_by_public_id(user_id, public_id)
                .await?
                .ok_or(ChatError::ConversationNotFound),
            None => {
                let title = derive_title(first_message);
                Ok(self.conversations.insert(user_id, Some(&title)).await?)
            }
        }
    }
}

fn derive_title(message: &str) -> String {
    let message = message.trim();
    if message.chars().count() <= TITLE_MAX_CHARS {
        return message.to_string();
    }
    let truncated: String = message.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}…", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklane_config::{AssistantConfig, DatabaseConfig};
    use tasklane_database::initialize_database;
    use tasklane_todos::TodoService;
    use tempfile::TempDir;

    async fn test_chat() -> (ChatService, i64, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", temp_dir.path().join("chat.db").display()),
            max_connections: 1,
        };
        let pool = initialize_database(&config).await.unwrap();

        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO users (public_id, email, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(tasklane_database::new_public_id())
        .bind("chat@example.com")
        .bind(&now)
        .bind(&now)
        .execute(&pool)
        .await
        .unwrap();
        let user_id = result.last_insert_rowid();

        let todos = TodoService::new(pool.clone());
        let assistant = Assistant::new(&AssistantConfig::default(), todos).unwrap();
        (ChatService::new(pool, assistant), user_id, temp_dir)
    }

    #[tokio::test]
    async fn send_creates_conversation_and_persists_both_sides() {
        let (chat, user_id, _dir) = test_chat().await;

        let reply = chat
            .send(
                user_id,
                SendMessage {
                    conversation_id: None,
                    message: "add a task to water the plants".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(reply.reply.contains("water the plants"));
        assert_eq!(reply.actions.len(), 1);

        let history = chat.history(user_id, &reply.conversation_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn send_continues_existing_conversation() {
        let (chat, user_id, _dir) = test_chat().await;

        let first = chat
            .send(
                user_id,
                SendMessage {
                    conversation_id: None,
                    message: "add a task to buy stamps".to_string(),
                },
            )
            .await
            .unwrap();

        let second = chat
            .send(
                user_id,
                SendMessage {
                    conversation_id: Some(first.conversation_id.clone()),
                    message: "list my tasks".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(second.conversation_id, first.conversation_id);

        let history = chat.history(user_id, &first.conversation_id).await.unwrap();
        assert_eq!(history.len(), 4);

        let conversations = chat.list_conversations(user_id).await.unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(
            conversations[0].title.as_deref(),
            Some("add a task to buy stamps")
        );
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (chat, user_id, _dir) = test_chat().await;

        let err = chat
            .send(
                user_id,
                SendMessage {
                    conversation_id: None,
                    message: "   ".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let (chat, user_id, _dir) = test_chat().await;

        let err = chat
            .send(
                user_id,
                SendMessage {
                    conversation_id: Some("missing".to_string()),
                    message: "hello".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::ConversationNotFound));
    }

    #[test]
    fn long_titles_are_truncated() {
        let long = "a".repeat(100);
        let title = derive_title(&long);
        assert!(title.chars().count() <= 61);
        assert!(title.ends_with('…'));
    }
}
