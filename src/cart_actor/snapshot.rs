//! Text encoding of the persisted cart: a JSON array of line item records.

use serde_json::Value;
use tracing::warn;

use crate::domain::{Cart, LineItem};

use super::CartError;

pub fn encode(cart: &Cart) -> Result<String, CartError> {
    serde_json::to_string(cart).map_err(|e| CartError::Codec(e.to_string()))
}

/// Decodes a stored blob and normalizes it with [`Cart::from_items`].
///
/// Only a blob that is not a JSON array is an error. Entries that do not
/// parse as a line item are dropped one by one, so a single bad record never
/// costs the rest of the cart.
pub fn decode(blob: &str) -> Result<Cart, serde_json::Error> {
    let entries: Vec<Value> = serde_json::from_str(blob)?;
    let total = entries.len();

    let items: Vec<LineItem> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();

    if items.len() < total {
        warn!(dropped = total - items.len(), "Skipped unreadable cart entries");
    }
    Ok(Cart::from_items(items))
}
