//! Storage Layer
//!
//! Provides SQLite persistence for weather readings with repository pattern.

mod repository;

pub use repository::Repository;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    ConnectionFailed(String),
    #[error("Failed to write readings: {0}")]
    WriteFailed(String),
    #[error("Failed to read readings: {0}")]
    ReadFailed(String),
}
