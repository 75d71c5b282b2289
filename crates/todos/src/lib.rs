//! Todo domain service: validation, CRUD, and the mutation audit log.

pub mod error;
pub mod service;
pub mod validation;

pub use error::{TodoError, TodoResult};
pub use service::TodoService;
