use event_emitter_rs::EventEmitter;

use crate::cart::CartChange;

/// Fired with the new line item as JSON when a product enters the cart.
pub const ITEM_ADDED: &str = "ItemAdded";
/// Fired with the updated line item as JSON when a quantity moves.
pub const QUANTITY_CHANGED: &str = "QuantityChanged";
/// Fired with the removed line item as JSON when an item leaves the cart.
pub const ITEM_REMOVED: &str = "ItemRemoved";

/// Named cart events on top of `event_emitter_rs`.
///
/// Listeners run on the emitter's own threads, after the cart has already
/// been published, so they always observe a complete cart.
///
/// # Example
///
/// ```ignore
/// use cart_store::emitter::{CartEmitter, ITEM_ADDED};
///
/// let mut emitter = CartEmitter::new();
/// emitter.on(ITEM_ADDED, |item| {
///     println!("added: {}", item);
/// });
/// ```
pub struct CartEmitter {
    event_emitter: EventEmitter,
}

impl Default for CartEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl CartEmitter {
    pub fn new() -> Self {
        Self {
            event_emitter: EventEmitter::new(),
        }
    }

    /// Register a listener for an event type. Returns the listener id.
    pub fn on<F>(&mut self, event: &str, listener: F) -> String
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.event_emitter.on(event, listener)
    }

    /// Remove a listener by the id [`on`](Self::on) returned.
    pub fn remove_listener(&mut self, id: &str) -> bool {
        self.event_emitter.remove_listener(id).is_some()
    }

    /// Emit an event immediately.
    pub fn emit(&mut self, event: &str, data: impl Into<String>) {
        self.event_emitter.emit(event, data.into());
    }

    /// Emit the event matching `change`. Unchanged carts emit nothing.
    pub fn emit_change(&mut self, change: &CartChange) {
        let (event, item) = match change {
            CartChange::Added(item) => (ITEM_ADDED, item),
            CartChange::QuantityChanged(item) => (QUANTITY_CHANGED, item),
            CartChange::Removed(item) => (ITEM_REMOVED, item),
            CartChange::Unchanged => return,
        };
        match serde_json::to_string(item) {
            Ok(payload) => self.emit(event, payload),
            Err(err) => tracing::warn!(event = event, error = %err, "failed to encode cart event"),
        }
    }
}
