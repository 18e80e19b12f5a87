//! The cart store: authoritative session cart plus its persisted mirror.

mod cart_store;
mod writer;

pub use cart_store::{CartStore, CartSubscription};
