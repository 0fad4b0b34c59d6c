//! Test stores: mock `KeyValueStore` implementations for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use raffle_core::error::StorageError;
use raffle_core::store::KeyValueStore;

/// An in-memory store that records every `set` and `clear` call.
///
/// Can be preloaded with entries, and can be told to fail reads and writes
/// of a single key to exercise per-key recovery.
#[derive(Debug, Default)]
pub struct RecordingStore {
    entries: Mutex<BTreeMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
    clears: Mutex<usize>,
    failing_key: Option<String>,
}

impl RecordingStore {
    /// Create an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with `entries`.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
            ..Self::default()
        }
    }

    /// Make every read and write of `key` fail with a backend error.
    #[must_use]
    pub fn failing_on(mut self, key: impl Into<String>) -> Self {
        self.failing_key = Some(key.into());
        self
    }

    /// Returns the current value stored under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Returns a snapshot of all stored entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries.lock().unwrap().clone()
    }

    /// Returns every `(key, value)` written, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }

    /// Returns how many times `clear` was called.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear_count(&self) -> usize {
        *self.clears.lock().unwrap()
    }

    fn check(&self, key: &str) -> Result<(), StorageError> {
        if self.failing_key.as_deref() == Some(key) {
            return Err(StorageError::Backend(format!("key `{key}` is unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check(key)?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.writes
            .lock()
            .unwrap()
            .push((key.to_owned(), value.to_owned()));
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.clears.lock().unwrap() += 1;
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

/// A store that always returns a backend error. Useful for testing that the
/// session stays usable without any persistence.
#[derive(Debug)]
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Backend("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Backend("connection refused".into()))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        Err(StorageError::Backend("connection refused".into()))
    }
}
