//! Repository implementations over the SQLite pool.

pub mod conversation_repository;
pub mod message_repository;
pub mod operation_repository;
pub mod todo_repository;

pub use conversation_repository::ConversationRepository;
pub use message_repository::MessageRepository;
pub use operation_repository::OperationRepository;
pub use todo_repository::TodoRepository;
