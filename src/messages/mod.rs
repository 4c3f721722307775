use std::sync::Arc;

use tokio::sync::oneshot;

use crate::cart_actor::CartError;
use crate::domain::{CartChange, CartSnapshot, LineItem, NewLineItem};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Reply to a mutation once it has been persisted and published.
///
/// `snapshot` is the state after the call. For an [`CartChange::Unchanged`]
/// result it is the snapshot that was already current.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub change: CartChange,
    pub snapshot: Arc<CartSnapshot>,
}

impl MutationOutcome {
    pub fn changed(&self) -> bool {
        self.change.is_changed()
    }

    pub fn items(&self) -> &[LineItem] {
        self.snapshot.cart.items()
    }
}

/// Messages understood by the cart service. Each variant carries its
/// parameters and a oneshot channel for the reply.
#[derive(Debug)]
pub enum CartRequest {
    AddToCart {
        item: NewLineItem,
        respond_to: ServiceResponse<MutationOutcome, CartError>,
    },
    Increment {
        id: String,
        respond_to: ServiceResponse<MutationOutcome, CartError>,
    },
    Decrement {
        id: String,
        respond_to: ServiceResponse<MutationOutcome, CartError>,
    },
    GetProducts {
        respond_to: ServiceResponse<Vec<LineItem>, CartError>,
    },
    Shutdown,
}
