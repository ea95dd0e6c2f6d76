//! SQLite-backed key-value store

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::database::{Database, DatabaseConfig};
use super::kv::KeyValueStore;
use crate::error::{Error, Result};

/// Durable store keeping one row per key in `kv_entries`
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    db: Database,
}

impl SqliteKeyValueStore {
    /// Wrap an already opened database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (and migrate) the database described by `config`
    pub async fn open(config: DatabaseConfig) -> Result<Self> {
        let db = Database::new(config)
            .await
            .map_err(|e| Error::Storage(format!("{e:#}")))?;
        Ok(Self::new(db))
    }

    /// Open an in-memory database (useful for testing)
    pub async fn in_memory() -> Result<Self> {
        Self::open(DatabaseConfig::in_memory()).await
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// List every stored key, sorted
    pub async fn keys(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT key FROM kv_entries ORDER BY key")
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows.into_iter().map(|(key,)| key).collect())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(self.db.pool())
        .await?;

        debug!(key, bytes = value.len(), "Stored key-value entry");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
