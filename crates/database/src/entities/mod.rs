//! Entity definitions shared across the repositories and services.

pub mod conversation;
pub mod message;
pub mod operation;
pub mod todo;
