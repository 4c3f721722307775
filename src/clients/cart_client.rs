use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, instrument};

use crate::cart_actor::CartError;
use crate::domain::{CartSnapshot, LineItem, NewLineItem};
use crate::messages::{CartRequest, MutationOutcome};

/// Handle views use to read and change the cart.
///
/// Cheap to clone; every clone talks to the same cart service. Reads through
/// [`current`](Self::current) and [`subscribe`](Self::subscribe) never touch
/// the mailbox.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
    snapshots: watch::Receiver<Arc<CartSnapshot>>,
}

impl CartClient {
    pub fn new(
        sender: mpsc::Sender<CartRequest>,
        snapshots: watch::Receiver<Arc<CartSnapshot>>,
    ) -> Self {
        Self { sender, snapshots }
    }

    /// Latest published snapshot.
    pub fn current(&self) -> Arc<CartSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every published change. Call `changed()` on it
    /// and re-render from `borrow()`.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CartSnapshot>> {
        self.snapshots.clone()
    }

    /// `false` once the service has stopped.
    pub fn is_in_scope(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Stops the service for every clone. Reserved for [`CartSystem::shutdown`](crate::CartSystem::shutdown).
    #[instrument(skip(self))]
    pub(crate) async fn shutdown(&self) -> Result<(), CartError> {
        debug!("Sending shutdown request");
        self.sender
            .send(CartRequest::Shutdown)
            .await
            .map_err(|_| CartError::OutOfScope("cart service is not running".to_string()))
    }
}

client_method!(CartClient => fn add_to_cart(item: NewLineItem) -> MutationOutcome as CartRequest::AddToCart);
client_method!(CartClient => fn increment(id: String) -> MutationOutcome as CartRequest::Increment);
client_method!(CartClient => fn decrement(id: String) -> MutationOutcome as CartRequest::Decrement);
client_method!(CartClient => fn products() -> Vec<LineItem> as CartRequest::GetProducts);
