use thiserror::Error;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("todo not found")]
    NotFound,

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title must be at most {0} characters")]
    TitleTooLong(usize),

    #[error("unknown priority {0:?}, expected low, medium, or high")]
    InvalidPriority(String),

    #[error("unknown status {0:?}, expected pending, in_progress, or completed")]
    InvalidStatus(String),

    #[error("due date must be an RFC 3339 timestamp")]
    InvalidDueDate,

    #[error(transparent)]
    Database(#[from] tasklane_database::DatabaseError),
}

pub type TodoResult<T> = Result<T, TodoError>;
