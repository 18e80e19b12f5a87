use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use super::{KeyValueStore, StorageError};
use crate::config::{ConfigError, STORAGE_PATH_ENV};

/// Key-value store persisted as a single JSON object file on local disk.
///
/// Every write rewrites the whole file through a temporary sibling followed by
/// a rename, so a crash mid-write leaves the previous contents intact. A
/// missing file reads as an empty store. A file that does not parse fails
/// reads with [`StorageError::Serde`]; the next write moves it aside to
/// `<name>.corrupt` and starts a fresh file. Clones share one write lock.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Store at the path named by `CART_STORAGE_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(STORAGE_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Ok(Self::new(path)),
            Ok(_) => Err(ConfigError::InvalidEnvVar(
                STORAGE_PATH_ENV.to_string(),
                "path is empty".to_string(),
            )),
            Err(_) => Err(ConfigError::MissingEnvVar(STORAGE_PATH_ENV.to_string())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read(self.path.as_path()).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Like `read_all`, but a corrupt file is moved aside and read as empty
    /// so writes can start over.
    async fn read_for_update(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_all().await {
            Err(StorageError::Serde(err)) => {
                let aside = self.sibling(".corrupt");
                warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    error = %err,
                    "store file is unreadable; starting a fresh one"
                );
                tokio::fs::rename(self.path.as_path(), &aside).await?;
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    /// `path` with `suffix` appended to its file name.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec(entries)?;
        let tmp = self.sibling(".tmp");
        tokio::fs::write(&tmp, bytes).await.map_err(map_write_error)?;
        tokio::fs::rename(&tmp, self.path.as_path()).await?;
        Ok(())
    }
}

fn map_write_error(err: std::io::Error) -> StorageError {
    // ENOSPC
    if err.raw_os_error() == Some(28) {
        StorageError::QuotaExceeded {
            key: String::from("*"),
        }
    } else {
        err.into()
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_for_update().await?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries).await.map_err(|err| match err {
            StorageError::QuotaExceeded { .. } => StorageError::QuotaExceeded {
                key: key.to_string(),
            },
            other => other,
        })
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_for_update().await?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.write_all(&entries).await?;
        Ok(true)
    }
}
