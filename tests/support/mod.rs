//! Shared fixtures and storage doubles for the integration suites.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cart_store::{InMemoryStore, KeyValueStore, Product, StorageError};
use tokio::sync::Notify;

pub fn product(id: &str) -> Product {
    Product::new(id, format!("Product {id}"), format!("https://img/{id}.png"), 10.0)
}

pub fn quantities(items: &[cart_store::LineItem]) -> Vec<(String, u32)> {
    items.iter().map(|i| (i.id.clone(), i.quantity)).collect()
}

/// In-memory store whose reads and writes can be switched to fail.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::QuotaExceeded { key: key.into() });
        }
        self.inner.set(key, value).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.remove(key).await
    }
}

/// In-memory store whose reads block until [`GatedStore::open_gate`] is called.
#[derive(Clone, Default)]
pub struct GatedStore {
    pub inner: InMemoryStore,
    gate: Arc<Notify>,
}

impl GatedStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            gate: Arc::new(Notify::new()),
        }
    }

    pub fn open_gate(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl KeyValueStore for GatedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.gate.notified().await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.remove(key).await
    }
}

/// In-memory store whose reads panic.
#[derive(Clone, Default)]
pub struct PanickingReadStore {
    pub inner: InMemoryStore,
}

#[async_trait]
impl KeyValueStore for PanickingReadStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        panic!("storage read panicked");
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.remove(key).await
    }
}
