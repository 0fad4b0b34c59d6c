//! `SQLite` implementation of the `KeyValueStore` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{debug, info};

use raffle_core::error::StorageError;
use raffle_core::store::KeyValueStore;

use crate::schema::CREATE_KV_TABLE;

fn backend(err: &sqlx::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

/// SQLite-backed key-value store scoped to a single namespace.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
    namespace: String,
}

impl SqliteKeyValueStore {
    /// Creates a store over an existing pool. The schema must already exist;
    /// see [`SqliteKeyValueStore::ensure_schema`].
    #[must_use]
    pub fn new(pool: SqlitePool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    /// Opens `database_url`, creates the schema if needed and returns a store
    /// scoped to `namespace`.
    ///
    /// # Errors
    ///
    /// Returns the underlying `sqlx::Error` if the database cannot be opened
    /// or the schema cannot be created.
    pub async fn connect(
        database_url: &str,
        namespace: impl Into<String>,
    ) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(database_url)
            .await?;
        let store = Self::new(pool, namespace);
        store.ensure_schema().await?;
        info!(namespace = %store.namespace, "sqlite key-value store ready");
        Ok(store)
    }

    /// Creates the key-value table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying `sqlx::Error` if the statement fails.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_KV_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Returns the namespace this store reads and writes.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        sqlx::query_scalar::<_, String>(
            "SELECT value FROM raffle_kv WHERE namespace = ?1 AND key = ?2",
        )
        .bind(&self.namespace)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend(&e))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO raffle_kv (namespace, key, value) VALUES (?1, ?2, ?3) \
             ON CONFLICT (namespace, key) DO UPDATE \
             SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| backend(&e))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM raffle_kv WHERE namespace = ?1")
            .bind(&self.namespace)
            .execute(&self.pool)
            .await
            .map_err(|e| backend(&e))?;
        debug!(
            namespace = %self.namespace,
            removed = result.rows_affected(),
            "cleared stored keys"
        );
        Ok(())
    }
}
