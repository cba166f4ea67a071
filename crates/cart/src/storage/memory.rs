//! In-memory storage slot.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CartStorage, StorageError};

/// Storage slot kept in process memory.
///
/// Clones share the same slot, so a test can keep a handle and inspect what
/// the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<RwLock<Option<String>>>,
}

impl MemoryStorage {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot that already holds `value`.
    #[must_use]
    pub fn with_contents(value: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(value.into()))),
        }
    }

    /// Current slot contents.
    pub async fn contents(&self) -> Option<String> {
        self.slot.read().await.clone()
    }
}

#[async_trait]
impl CartStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.contents().await)
    }

    async fn save(&self, value: &str) -> Result<(), StorageError> {
        *self.slot.write().await = Some(value.to_string());
        Ok(())
    }
}
