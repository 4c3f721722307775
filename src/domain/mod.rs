//! Cart data model: line items, the cart itself and the snapshots subscribers see.

pub mod cart;
pub mod line_item;

pub use cart::*;
pub use line_item::*;
