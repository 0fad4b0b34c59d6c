//! Key-value persistence abstraction.

use async_trait::async_trait;

use crate::error::StorageError;

/// A durable string key-value store.
///
/// Implementations own their namespacing: `clear` removes every key the
/// store wrote, and nothing outside that namespace.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes every stored key.
    async fn clear(&self) -> Result<(), StorageError>;
}
