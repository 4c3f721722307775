use serde::Serialize;

use super::{LineItem, NewLineItem};

/// Ordered, id-unique list of line items.
///
/// Pure data: the mutation methods only touch memory and report what changed.
/// Persisting and publishing the result is the cart service's job.
///
/// Serializes as a bare array of line items. There is no `Deserialize`; a
/// decoded list has to go through [`Cart::from_items`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

/// What a single mutation did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// Target id not in the cart; nothing happened.
    Unchanged,
    /// A new line was appended with quantity 1.
    Added,
    /// Quantity went up; holds the new value.
    Incremented(u32),
    /// Quantity went down but the line stays; holds the new value.
    Decremented(u32),
    /// Quantity reached zero and the line was dropped.
    Removed,
}

impl CartChange {
    pub fn is_changed(&self) -> bool {
        !matches!(self, CartChange::Unchanged)
    }
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from an untrusted list, e.g. a decoded snapshot.
    ///
    /// Lines with a zero quantity are dropped and a repeated id keeps its
    /// first occurrence.
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity == 0 || cart.position(&item.id).is_some() {
                continue;
            }
            cart.items.push(item);
        }
        cart
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Sum of all quantities, i.e. the badge count on a cart icon.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Appends `item` with quantity 1, or bumps the existing line with the same id.
    ///
    /// An existing line keeps its title, image and price.
    pub fn add(&mut self, item: NewLineItem) -> CartChange {
        match self.position(&item.id) {
            Some(index) => self.bump(index),
            None => {
                self.items.push(item.into());
                CartChange::Added
            }
        }
    }

    pub fn increment(&mut self, id: &str) -> CartChange {
        match self.position(id) {
            Some(index) => self.bump(index),
            None => CartChange::Unchanged,
        }
    }

    /// Lowers the quantity by one, removing the line when it hits zero.
    pub fn decrement(&mut self, id: &str) -> CartChange {
        let Some(index) = self.position(id) else {
            return CartChange::Unchanged;
        };

        let quantity = self.items[index].quantity.saturating_sub(1);
        if quantity == 0 {
            self.items.remove(index);
            CartChange::Removed
        } else {
            self.items[index].quantity = quantity;
            CartChange::Decremented(quantity)
        }
    }

    fn bump(&mut self, index: usize) -> CartChange {
        let item = &mut self.items[index];
        item.quantity = item.quantity.saturating_add(1);
        CartChange::Incremented(item.quantity)
    }
}

/// Immutable view handed to subscribers.
///
/// `version` starts at 0 for the empty cart and goes up by one for every
/// published change, hydration included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSnapshot {
    pub version: u64,
    pub cart: Cart,
}
