// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("User {user} is not allowed to modify note {note}")]
    Permission { user: String, note: String },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Unsupported query: {0}")]
    BackendQuery(String),
    #[error("Sign-in cancelled")]
    AuthCancelled,
    #[error("Backend error: {0}")]
    Backend(String),
}
