use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::cart_actor::{CartError, CartService};
use crate::clients::CartClient;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

use super::CartConfig;

/// Owns the running cart service and hands out its client.
///
/// This is the provisioning scope for the cart: build it at application
/// start, pass `cart_client` (or clones of it) to the views, and call
/// [`shutdown`](Self::shutdown) on exit. Clients used after shutdown get
/// [`CartError::OutOfScope`].
///
/// Must be created from within a tokio runtime.
pub struct CartSystem {
    pub cart_client: CartClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl CartSystem {
    /// Starts the cart service over `store`.
    #[instrument(name = "cart_system", skip(store))]
    pub fn new(config: &CartConfig, store: Arc<dyn KeyValueStore>) -> Self {
        info!("Starting cart system");

        let (cart_service, cart_client) = CartService::new(config, store);
        let handles = vec![tokio::spawn(cart_service.run())];

        info!("Cart system started successfully");

        Self {
            cart_client,
            handles,
        }
    }

    /// Cart persisted as files under `config.data_dir`.
    pub fn with_file_store(config: &CartConfig) -> Self {
        Self::new(config, Arc::new(FileStore::new(config.data_dir.clone())))
    }

    /// Cart that lives only as long as the process.
    pub fn in_memory(config: &CartConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Stops the service and waits for it to finish.
    ///
    /// Mutations already queued ahead of the shutdown message are still applied.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), CartError> {
        info!("Shutting down cart system");

        if let Err(e) = self.cart_client.shutdown().await {
            info!(error = %e, "Cart service already stopped");
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Service shutdown error");
                return Err(CartError::ActorCommunicationError(format!(
                    "cart service task failed: {e}"
                )));
            }
        }

        info!("Cart system shutdown complete");
        Ok(())
    }
}
