//! Shared result and error types for the persistence layer.

pub mod errors;

pub type DatabaseResult<T> = Result<T, errors::DatabaseError>;
