//! Client-side shopping cart state for storefront apps.
//!
//! A [`CartStore`] holds the session's authoritative [`Cart`]: an ordered,
//! id-unique list of [`LineItem`]s mutated through `add_to_cart`,
//! `increment` and `decrement`. Every mutation is published to subscribers
//! immediately and mirrored in the background to a [`KeyValueStore`] under a
//! single key, so the cart survives app restarts.

pub mod cart;
pub mod config;
#[cfg(feature = "emitter")]
pub mod emitter;
mod error;
pub mod persisted;
pub mod storage;
mod store;

pub use cart::{Cart, CartAction, CartChange, LineItem, Product};
pub use config::{CartConfig, ConfigError, DEFAULT_STORAGE_KEY};
pub use error::CartError;
pub use persisted::PersistError;
pub use storage::{FileStore, InMemoryStore, KeyValueStore, StorageError};
pub use store::{CartStore, CartSubscription};

// Re-export the async_trait macro so downstream stores can implement KeyValueStore
pub use async_trait::async_trait;
