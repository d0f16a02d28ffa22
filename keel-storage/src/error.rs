//! Storage error types

use keel_core::{CoreError, EntityRef};
use sea_orm::DbErr;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Errors reported by the database driver
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A domain rule was violated
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// A polymorphic or parent reference points at no live row
    #[error("{0} does not exist in this tenant")]
    TargetNotFound(EntityRef),

    /// The referenced row exists but is suspended or deleted
    #[error("{0} is suspended or deleted and cannot take new children")]
    TargetUnavailable(EntityRef),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
