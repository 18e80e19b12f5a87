use std::collections::HashSet;

use super::{LineItem, Product};

/// A single cart mutation, expressed as a value.
///
/// Every change to a [`Cart`] goes through [`Cart::apply`], so the same
/// transformation can be replayed against whatever the latest cart is.
#[derive(Clone, Debug, PartialEq)]
pub enum CartAction {
    /// Add one unit of a product, appending it if the cart doesn't hold it yet.
    Add(Product),
    /// Add one unit of an item already in the cart.
    Increment(String),
    /// Remove one unit of an item, dropping it when it reaches zero.
    Decrement(String),
}

impl CartAction {
    /// Name used for logging and listener events.
    pub fn name(&self) -> &'static str {
        match self {
            CartAction::Add(_) => "add_to_cart",
            CartAction::Increment(_) => "increment",
            CartAction::Decrement(_) => "decrement",
        }
    }

    /// The product id this action targets.
    pub fn id(&self) -> &str {
        match self {
            CartAction::Add(product) => &product.id,
            CartAction::Increment(id) | CartAction::Decrement(id) => id,
        }
    }
}

/// What an applied [`CartAction`] did to the cart.
#[derive(Clone, Debug, PartialEq)]
pub enum CartChange {
    /// A new item was appended with quantity 1.
    Added(LineItem),
    /// An existing item's quantity moved; carries the item after the change.
    QuantityChanged(LineItem),
    /// The item dropped below quantity 1 and left the cart; carries the item
    /// as it was before removal.
    Removed(LineItem),
    /// The targeted id is not in the cart.
    Unchanged,
}

impl CartChange {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, CartChange::Unchanged)
    }
}

/// Ordered, id-unique collection of line items.
///
/// Items keep the order in which they were first added. No item is ever held
/// with a quantity below one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from stored items.
    ///
    /// Items with a zero quantity are dropped, and only the first occurrence
    /// of each id is kept.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| item.quantity >= 1)
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Apply `action` in place and report what changed.
    pub fn apply(&mut self, action: CartAction) -> CartChange {
        match action {
            CartAction::Add(product) => match self.items.iter_mut().find(|i| i.id == product.id) {
                Some(item) => {
                    item.quantity = item.quantity.saturating_add(1);
                    CartChange::QuantityChanged(item.clone())
                }
                None => {
                    let item = LineItem::from_product(product);
                    self.items.push(item.clone());
                    CartChange::Added(item)
                }
            },
            CartAction::Increment(id) => match self.items.iter_mut().find(|i| i.id == id) {
                Some(item) => {
                    item.quantity = item.quantity.saturating_add(1);
                    CartChange::QuantityChanged(item.clone())
                }
                None => CartChange::Unchanged,
            },
            CartAction::Decrement(id) => {
                let Some(index) = self.position(&id) else {
                    return CartChange::Unchanged;
                };
                let Some(item) = self.items.get_mut(index) else {
                    return CartChange::Unchanged;
                };
                if item.quantity > 1 {
                    item.quantity -= 1;
                    CartChange::QuantityChanged(item.clone())
                } else {
                    // Vec::remove shifts the tail left, keeping relative order.
                    CartChange::Removed(self.items.remove(index))
                }
            }
        }
    }

    /// The cart after applying `action`, leaving `self` untouched.
    pub fn applied(&self, action: CartAction) -> Cart {
        let mut next = self.clone();
        next.apply(action);
        next
    }

    pub fn add(&self, product: Product) -> Cart {
        self.applied(CartAction::Add(product))
    }

    pub fn increment(&self, id: &str) -> Cart {
        self.applied(CartAction::Increment(id.to_string()))
    }

    pub fn decrement(&self, id: &str) -> Cart {
        self.applied(CartAction::Decrement(id.to_string()))
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
