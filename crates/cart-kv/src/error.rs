//! Persistence adapter error types.

use thiserror::Error;

/// Errors that can occur when talking to a key-value backend.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    Open(String),

    /// Failed to serialize or deserialize a value.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Backend rejected or failed the operation.
    #[error("Store operation failed: {0}")]
    Store(String),

    /// Filesystem error from a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
