use serde::{Deserialize, Serialize};

/// One product entry in the cart.
///
/// `quantity` is at least 1 while the item is in a [`Cart`](super::Cart);
/// the cart removes an item instead of storing a zero count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
}

/// Product descriptor passed to `add_to_cart`. Same as [`LineItem`] minus the quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
}

impl NewLineItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

impl From<NewLineItem> for LineItem {
    fn from(item: NewLineItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: 1,
        }
    }
}
