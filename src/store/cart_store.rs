use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
#[cfg(feature = "emitter")]
use std::sync::Mutex;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::writer::PersistWriter;
use crate::cart::{Cart, CartAction, CartChange, LineItem, Product};
use crate::config::CartConfig;
#[cfg(feature = "emitter")]
use crate::emitter::CartEmitter;
use crate::error::CartError;
use crate::persisted;
use crate::storage::KeyValueStore;

/// Receiver side of the published cart. `borrow()` reads the latest cart,
/// `changed().await` waits for the next publish.
pub type CartSubscription = watch::Receiver<Cart>;

struct Inner {
    state: watch::Sender<Cart>,
    ready: watch::Sender<bool>,
    mutated: AtomicBool,
    writer: PersistWriter,
    config: CartConfig,
    #[cfg(feature = "emitter")]
    emitter: Mutex<CartEmitter>,
}

/// The authoritative cart for an app session.
///
/// A `CartStore` is a cheap, cloneable handle; every clone sees and mutates
/// the same cart. The only way to get one is [`open`](Self::open) or
/// [`spawn`](Self::spawn), so there is no uninitialized handle to guard
/// against.
///
/// Each mutation applies a [`CartAction`] to the latest published cart,
/// publishes the result to subscribers, then queues the whole cart for a
/// background write under [`CartConfig::storage_key`]. Mutations never fail:
/// storage errors are logged and reported by [`flush`](Self::flush) while the
/// in-memory cart stays authoritative.
///
/// # Example
///
/// ```ignore
/// use cart_store::{CartConfig, CartStore, InMemoryStore, Product};
///
/// let store = CartStore::open(InMemoryStore::new(), CartConfig::default()).await;
/// store.add_to_cart(Product::new("A", "Tee", "https://img/a.png", 10.0));
/// store.increment("A");
/// assert_eq!(store.cart().get("A").unwrap().quantity, 2);
/// store.flush().await?;
/// ```
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl CartStore {
    /// Load the persisted cart and return a ready store.
    ///
    /// A missing entry starts an empty cart. A storage failure or an
    /// unreadable entry also starts an empty cart, with a warning.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub async fn open<S>(storage: S, config: CartConfig) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let cart = load_persisted(&storage, &config.storage_key).await;
        let store = Self::build(storage, config, cart);
        store.inner.ready.send_replace(true);
        store
    }

    /// Return immediately with an empty cart and load the persisted cart in
    /// the background.
    ///
    /// Reads see an empty cart until the load lands. If the cart is mutated
    /// before then, the loaded cart is discarded and the local one kept.
    /// [`ready`](Self::ready) resolves once the load has finished either way,
    /// including when the storage read panics.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn<S>(storage: S, config: CartConfig) -> Self
    where
        S: KeyValueStore + Clone + 'static,
    {
        let store = Self::build(storage.clone(), config, Cart::new());
        let guard = ReadyOnDrop(Arc::clone(&store.inner));
        tokio::spawn(async move {
            let inner = &guard.0;
            let key = inner.config.storage_key.clone();
            let loaded = load_persisted(&storage, &key).await;
            let applied = inner.state.send_if_modified(|cart| {
                if inner.mutated.load(Ordering::Acquire) {
                    return false;
                }
                *cart = loaded;
                true
            });
            if !applied {
                warn!(key = %key, "cart mutated before persisted cart loaded; keeping in-memory cart");
            }
        });
        store
    }

    fn build<S>(storage: S, config: CartConfig, cart: Cart) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let writer = PersistWriter::spawn(storage, config.storage_key.clone());
        let (state, _) = watch::channel(cart);
        let (ready, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state,
                ready,
                mutated: AtomicBool::new(false),
                writer,
                config,
                #[cfg(feature = "emitter")]
                emitter: Mutex::new(CartEmitter::new()),
            }),
        }
    }

    /// Wait until the initial load has finished.
    pub async fn ready(&self) {
        let mut ready = self.inner.ready.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let _ = ready.wait_for(|loaded| *loaded).await;
    }

    pub fn is_ready(&self) -> bool {
        *self.inner.ready.borrow()
    }

    pub fn config(&self) -> &CartConfig {
        &self.inner.config
    }

    /// Snapshot of the current cart.
    pub fn cart(&self) -> Cart {
        self.inner.state.borrow().clone()
    }

    /// Snapshot of the current line items, in cart order.
    pub fn items(&self) -> Vec<LineItem> {
        self.inner.state.borrow().items().to_vec()
    }

    pub fn get(&self, id: &str) -> Option<LineItem> {
        self.inner.state.borrow().get(id).cloned()
    }

    /// Subscribe to published carts. Every mutation publishes, including
    /// ones that leave the cart unchanged.
    pub fn subscribe(&self) -> CartSubscription {
        self.inner.state.subscribe()
    }

    /// Add one unit of `product`, appending it with quantity 1 if the cart
    /// does not hold its id yet.
    pub fn add_to_cart(&self, product: Product) -> CartChange {
        self.dispatch(CartAction::Add(product))
    }

    /// Add one unit of the item with `id`. Unknown ids leave the cart as is
    /// and are not an error.
    pub fn increment(&self, id: &str) -> CartChange {
        self.dispatch(CartAction::Increment(id.to_string()))
    }

    /// Remove one unit of the item with `id`, dropping it from the cart when
    /// its quantity falls below one. Unknown ids are not an error.
    pub fn decrement(&self, id: &str) -> CartChange {
        self.dispatch(CartAction::Decrement(id.to_string()))
    }

    /// Apply `action` to the latest cart, publish, and queue the write.
    ///
    /// Apply, publish, enqueue and event emission happen under the watch
    /// channel's write lock, so mutations are serialized and writes and
    /// events are issued in mutation order.
    pub fn dispatch(&self, action: CartAction) -> CartChange {
        let name = action.name();
        let id = action.id().to_string();
        let inner = &self.inner;
        let mut change = CartChange::Unchanged;
        let mut len = 0;

        inner.state.send_modify(|cart| {
            change = cart.apply(action);
            len = cart.len();
            inner.mutated.store(true, Ordering::Release);
            match persisted::encode(cart) {
                Ok(raw) => inner.writer.enqueue(raw),
                Err(err) => warn!(action = name, error = %err, "failed to encode cart; write skipped"),
            }
            #[cfg(feature = "emitter")]
            self.emit_change(&change);
        });

        debug!(action = name, id = %id, items = len, unchanged = change.is_unchanged(), "cart published");

        change
    }

    /// Wait for every write queued so far to reach storage.
    ///
    /// Returns the most recent write failure since the previous flush, if
    /// any. The in-memory cart is unaffected either way.
    pub async fn flush(&self) -> Result<(), CartError> {
        self.inner.writer.flush().await
    }
}

#[cfg(feature = "emitter")]
impl CartStore {
    /// Register a listener for a cart event
    /// ([`ITEM_ADDED`](crate::emitter::ITEM_ADDED),
    /// [`QUANTITY_CHANGED`](crate::emitter::QUANTITY_CHANGED),
    /// [`ITEM_REMOVED`](crate::emitter::ITEM_REMOVED)). Listeners receive the
    /// affected line item as JSON. Returns the listener id.
    ///
    /// Events are emitted in mutation order, but each listener call runs on
    /// its own emitter thread, so listeners may observe them out of order.
    pub fn on<F>(&self, event: &str, listener: F) -> String
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        match self.inner.emitter.lock() {
            Ok(mut emitter) => emitter.on(event, listener),
            Err(poisoned) => poisoned.into_inner().on(event, listener),
        }
    }

    pub fn remove_listener(&self, id: &str) -> bool {
        match self.inner.emitter.lock() {
            Ok(mut emitter) => emitter.remove_listener(id),
            Err(poisoned) => poisoned.into_inner().remove_listener(id),
        }
    }

    fn emit_change(&self, change: &CartChange) {
        match self.inner.emitter.lock() {
            Ok(mut emitter) => emitter.emit_change(change),
            Err(_) => warn!("cart emitter lock poisoned; event dropped"),
        }
    }
}

/// Marks the store ready when dropped, so `ready()` resolves even if the
/// load task unwinds.
struct ReadyOnDrop(Arc<Inner>);

impl Drop for ReadyOnDrop {
    fn drop(&mut self) {
        self.0.ready.send_replace(true);
    }
}

async fn load_persisted<S: KeyValueStore>(storage: &S, key: &str) -> Cart {
    match storage.get(key).await {
        Ok(Some(raw)) => match persisted::decode(&raw) {
            Ok(cart) => {
                debug!(key = %key, items = cart.len(), "loaded persisted cart");
                cart
            }
            Err(err) => {
                warn!(key = %key, error = %err, "discarding unreadable persisted cart");
                Cart::new()
            }
        },
        Ok(None) => Cart::new(),
        Err(err) => {
            warn!(key = %key, error = %err, "failed to load persisted cart; starting empty");
            Cart::new()
        }
    }
}
