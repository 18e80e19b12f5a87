//! Background worker that mirrors the cart into a key-value store.
//!
//! Writes arrive over an unbounded channel in mutation order and are applied
//! one at a time, so the last mutation's cart is always the last value
//! written. Failures are logged and remembered until the next flush; nothing
//! is retried and the in-memory cart is never rolled back.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::CartError;
use crate::storage::{KeyValueStore, StorageError};

enum WriteCommand {
    Write(String),
    Flush(oneshot::Sender<Option<StorageError>>),
}

/// Handle to the write worker task. The task exits once every handle is
/// dropped and the queue has drained.
pub(crate) struct PersistWriter {
    tx: mpsc::UnboundedSender<WriteCommand>,
}

impl PersistWriter {
    /// Spawn the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub(crate) fn spawn<S>(storage: S, key: String) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(storage, key, rx));
        Self { tx }
    }

    /// Queue a serialized cart. Never blocks.
    pub(crate) fn enqueue(&self, raw: String) {
        if self.tx.send(WriteCommand::Write(raw)).is_err() {
            warn!("cart persistence worker stopped; write dropped");
        }
    }

    /// Wait for every write queued so far and report the latest failure
    /// since the previous flush.
    pub(crate) async fn flush(&self) -> Result<(), CartError> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(WriteCommand::Flush(reply))
            .map_err(|_| CartError::WorkerStopped)?;
        match done.await {
            Ok(None) => Ok(()),
            Ok(Some(err)) => Err(err.into()),
            Err(_) => Err(CartError::WorkerStopped),
        }
    }
}

async fn run<S: KeyValueStore>(
    storage: S,
    key: String,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
) {
    let mut last_error: Option<StorageError> = None;
    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Write(raw) => {
                let bytes = raw.len();
                match storage.set(&key, raw).await {
                    Ok(()) => debug!(key = %key, bytes, "persisted cart"),
                    Err(err) => {
                        warn!(key = %key, error = %err, "failed to persist cart; in-memory cart kept");
                        last_error = Some(err);
                    }
                }
            }
            WriteCommand::Flush(reply) => {
                let _ = reply.send(last_error.take());
            }
        }
    }
    debug!(key = %key, "cart persistence worker stopped");
}
