//! Cart - the id-keyed line item list and the reducer that mutates it.
//!
//! All mutation goes through [`Cart::apply`] with a [`CartAction`]; the
//! convenience methods (`add`, `increment`, `decrement`) return a new cart and
//! leave the original untouched.
//!
//! ## Example
//!
//! ```
//! use cart_store::{Cart, Product};
//!
//! let cart = Cart::new()
//!     .add(Product::new("A", "Tee", "https://img/a.png", 10.0))
//!     .add(Product::new("A", "Tee", "https://img/a.png", 10.0));
//! assert_eq!(cart.get("A").unwrap().quantity, 2);
//!
//! let cart = cart.decrement("A").decrement("A");
//! assert!(cart.is_empty());
//! ```

#[allow(clippy::module_inception)]
mod cart;
mod line_item;

pub use cart::{Cart, CartAction, CartChange};
pub use line_item::{LineItem, Product};
