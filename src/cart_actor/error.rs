use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Cart store is not in scope: {0}")]
    OutOfScope(String),
    #[error("Invalid line item: {0}")]
    InvalidItem(String),
    #[error("Cart storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Cart codec error: {0}")]
    Codec(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
