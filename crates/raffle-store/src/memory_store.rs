//! In-memory `KeyValueStore`, used when no database is available.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use raffle_core::error::StorageError;
use raffle_core::store::KeyValueStore;

fn poisoned() -> StorageError {
    StorageError::Backend("memory store lock poisoned".to_owned())
}

/// Process-local key-value store. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.entries.write().map_err(|_| poisoned())?.clear();
        Ok(())
    }
}
