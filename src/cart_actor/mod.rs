//! The cart service actor: owns the cart, persists and publishes every change.

mod error;
mod service;
pub mod snapshot;

pub use error::*;
pub use service::*;
