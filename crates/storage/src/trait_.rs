//! Storage trait abstraction.

use async_trait::async_trait;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key cannot be used as a storage name
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Key-value storage holding serialized documents.
///
/// Each key maps to one whole document; writes replace the document.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the document stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document stored under `key`.
    async fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

