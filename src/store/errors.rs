//! Record store errors

use thiserror::Error;

use crate::storage::StorageError;
use crate::student::{StudentId, ValidationErrors};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// One or more field constraints violated
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Well-formed id with no matching record
    #[error("student not found: {0}")]
    NotFound(StudentId),

    /// Data file failure
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// A record could not be encoded or decoded
    #[error("record encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A previous writer panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,
}
