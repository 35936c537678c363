//! Storage errors.

use super::error_code::{self, HarkErrorCode};

/// Errors that can occur in the SQLite persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration to version {version} failed: {message}")]
    MigrationFailed { version: i32, message: String },

    #[error("Invalid pagination cursor: {message}")]
    InvalidCursor { message: String },
}

impl HarkErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        error_code::STORAGE_ERROR
    }
}
