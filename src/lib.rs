//! # Cart Store
//!
//! Shopping-cart state for a storefront app: an ordered list of line items,
//! the three mutations a product screen needs (add, increment, decrement),
//! durable persistence of the whole list after every change, and change
//! notifications for whatever renders the cart.
//!
//! ## Terminology
//!
//! - **Service** ([`CartService`]) is the actor that owns the cart
//! - **Client** ([`CartClient`]) is the cloneable handle that sends it requests
//! - **System** ([`CartSystem`]) starts the service and shuts it down
//!
//! ## Example Usage
//!
//! ```no_run
//! use cart_store::{CartConfig, CartSystem, NewLineItem};
//!
//! # async fn demo() -> Result<(), cart_store::CartError> {
//! let system = CartSystem::in_memory(&CartConfig::default());
//! let cart = system.cart_client.clone();
//!
//! cart.add_to_cart(NewLineItem::new("A", "Apple", "a.png", 10.0)).await?;
//! cart.decrement("A".to_string()).await?;
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod app_system;
pub mod cart_actor;
pub mod clients;
pub mod domain;
pub mod messages;
pub mod storage;

#[cfg(test)]
mod mock_framework;

pub use app_system::{setup_tracing, CartConfig, CartSystem, ConfigError};
pub use cart_actor::{CartError, CartService};
pub use clients::CartClient;
pub use domain::{Cart, CartChange, CartSnapshot, LineItem, NewLineItem};
pub use messages::MutationOutcome;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
