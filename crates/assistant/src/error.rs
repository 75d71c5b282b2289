use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("provider http request failed: {0}")]
    ProviderHttp(#[from] reqwest::Error),

    #[error("invalid provider response: {0}")]
    ProviderResponse(String),

    #[error("tool {0} is not registered")]
    ToolNotFound(String),

    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error(transparent)]
    Todo(#[from] tasklane_todos::TodoError),

    #[error(transparent)]
    Database(#[from] tasklane_database::DatabaseError),
}

pub type AssistantResult<T> = Result<T, AssistantError>;
