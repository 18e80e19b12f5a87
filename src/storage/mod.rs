//! Key-value storage backing the persisted cart.
//!
//! The cart only needs string values under string keys, mirroring the
//! device-local stores mobile apps persist to. [`InMemoryStore`] serves tests
//! and session-only carts; [`FileStore`] keeps the values in a JSON file on
//! local disk.

mod file;
mod in_memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use in_memory::InMemoryStore;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backing store cannot be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The backing store refused the write for lack of space.
    #[error("storage quota exceeded writing {key}")]
    QuotaExceeded { key: String },
    /// Filesystem error from a disk-backed store.
    #[error("storage io error: {0}")]
    Io(String),
    /// The store's own container format could not be read or written.
    #[error("storage serialization error: {0}")]
    Serde(String),
    #[error("storage lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serde(err.to_string())
    }
}

/// Asynchronous string key-value store.
///
/// Implementations must be cheap to clone when shared; the cart store keeps
/// one handle for its initial load and hands another to its write worker.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Load the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete the value under `key`. Returns true if one existed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;
}
