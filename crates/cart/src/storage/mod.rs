//! Durable key-value slot holding the serialized cart.
//!
//! The cart is read once when the store opens and overwritten in full after
//! every successful mutation. [`CartStorage`] is the seam; two adapters are
//! provided:
//!
//! - [`FileStorage`] - a JSON object file mapping keys to string values,
//!   the on-disk counterpart of browser local storage
//! - [`MemoryStorage`] - process-local slot for tests and throwaway sessions

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when reading or writing the storage slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing store exists but is not in the expected format.
    #[error("Malformed storage: {0}")]
    Malformed(String),

    /// The cart could not be serialized.
    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A single durable slot.
///
/// The cart store is the only writer of its slot.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Read the slot. `Ok(None)` if nothing has been written yet.
    async fn load(&self) -> Result<Option<String>, StorageError>;

    /// Overwrite the slot with `value`.
    async fn save(&self, value: &str) -> Result<(), StorageError>;
}
