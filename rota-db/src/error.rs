//! Error types for database setup
//!
//! Repository operations report through [`rota_core::Error`]; this type only
//! covers opening the pool and applying the schema.

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DbError>;
