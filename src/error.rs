//! Error types for sem-engine

use thiserror::Error;

/// Main error type for sem-engine operations
#[derive(Error, Debug)]
pub enum SemError {
    #[error("Not a git repository")]
    NotARepo,

    #[error("Git error: {message}")]
    Git { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Query error: {message}")]
    Query { message: String },

    #[error("Entity not found: {query}")]
    EntityNotFound { query: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for SemError {
    fn from(e: rusqlite::Error) -> Self {
        SemError::Database {
            message: e.to_string(),
        }
    }
}

/// Result type alias for sem-engine operations
pub type Result<T> = std::result::Result<T, SemError>;
