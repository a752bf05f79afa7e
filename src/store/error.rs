//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The database could not be opened or the schema could not be ensured.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An insert failed (constraint violation, lost connection, timeout).
    #[error("store write failed: {0}")]
    Write(String),

    /// A select failed (lost connection, timeout).
    #[error("store read failed: {0}")]
    Read(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
