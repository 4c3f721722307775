//! Key-value persistence backends for the serialized cart.
//!
//! The cart service only needs `get` and `set` on a single string key, so the
//! contract is deliberately small. Two backends ship with the crate:
//!
//! - [`MemoryStore`] keeps blobs in a shared map (tests, non-durable carts)
//! - [`FileStore`] writes one file per key under a data directory

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// Async string-keyed blob storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the stored value, or `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
