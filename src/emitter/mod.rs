//! Listener events for cart changes (`emitter` feature).

mod cart_emitter;

pub use cart_emitter::{CartEmitter, ITEM_ADDED, ITEM_REMOVED, QUANTITY_CHANGED};
