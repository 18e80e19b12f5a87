use thiserror::Error;

use crate::config::ConfigError;
use crate::persisted::PersistError;
use crate::storage::StorageError;

/// Crate-level error surfaced by [`CartStore::flush`](crate::CartStore::flush)
/// and configuration loading.
///
/// Cart mutations themselves never fail; storage and decode problems are
/// logged and the in-memory cart stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The background write worker is gone, so pending writes cannot be
    /// confirmed.
    #[error("cart persistence worker stopped")]
    WorkerStopped,
}
