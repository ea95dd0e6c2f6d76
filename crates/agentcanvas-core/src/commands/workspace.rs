//! Opening an agent store from configuration, and checking its health

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::domain::agents::{AgentStore, snapshot};
use crate::domain::workflow::WorkflowGraph;
use crate::storage::{Database, DatabaseConfig, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};

/// Where the agent snapshot lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite database file
    Sqlite(PathBuf),
    /// Process memory; nothing survives the process
    Memory,
}

impl StoreLocation {
    pub fn from_config(config: &Config) -> Self {
        StoreLocation::Sqlite(config.storage.resolved_database_path())
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreLocation::Sqlite(path) => write!(f, "{}", path.display()),
            StoreLocation::Memory => f.write_str(":memory:"),
        }
    }
}

/// An opened agent store together with the configuration it was opened with
pub struct Workspace {
    config: Config,
    location: StoreLocation,
    backend: Arc<dyn KeyValueStore>,
    database: Option<Database>,
    store: AgentStore,
}

impl Workspace {
    /// Open the store at `location` using the key from `config`
    pub async fn open(config: Config, location: StoreLocation) -> Result<Self> {
        config.validate()?;

        let (backend, database): (Arc<dyn KeyValueStore>, Option<Database>) = match &location {
            StoreLocation::Sqlite(path) => {
                let kv = SqliteKeyValueStore::open(DatabaseConfig::with_path(path))
                    .await
                    .with_context(|| format!("Failed to open agent database at {}", path.display()))?;
                let database = kv.database().clone();
                (Arc::new(kv), Some(database))
            }
            StoreLocation::Memory => (Arc::new(MemoryKeyValueStore::new()), None),
        };

        let store = AgentStore::builder(backend.clone())
            .key(config.storage.storage_key.clone())
            .open()
            .await
            .context("Failed to load agents")?;

        Ok(Self {
            config,
            location,
            backend,
            database,
            store,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn store(&self) -> &AgentStore {
        &self.store
    }

    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    /// Inspect storage without changing it
    pub async fn doctor(&self) -> Result<DoctorReport> {
        let mut report = DoctorReport {
            location: self.location.to_string(),
            backend: self.backend.backend_name(),
            storage_key: self.config.storage.storage_key.clone(),
            schema_version: None,
            target_schema_version: None,
            database_healthy: None,
            snapshot: SnapshotHealth::Missing,
            agent_count: self.store.len().await,
            dangling_edges: 0,
            corrupt_backup: None,
        };

        if let Some(db) = &self.database {
            report.database_healthy = Some(db.health_check().await.is_ok());
            let status = db.migration_status().await?;
            report.schema_version = Some(status.current_version);
            report.target_schema_version = Some(status.target_version);
        }

        report.snapshot = match self.backend.get(&self.config.storage.storage_key).await? {
            None => SnapshotHealth::Missing,
            Some(raw) => match snapshot::decode(&raw) {
                Ok(decoded) if decoded.is_lossy() => SnapshotHealth::Partial {
                    bytes: raw.len(),
                    skipped: decoded.skipped,
                },
                Ok(_) => SnapshotHealth::Ok { bytes: raw.len() },
                Err(e) => SnapshotHealth::Unreadable {
                    reason: e.to_string(),
                },
            },
        };

        report.corrupt_backup = self
            .backend
            .get(&self.store.backup_key())
            .await?
            .map(|raw| raw.len());

        for agent in self.store.list_agents().await {
            let graph = WorkflowGraph::new(agent.nodes, agent.edges);
            report.dangling_edges += graph.dangling_edges().len();
        }

        Ok(report)
    }

    /// Close the database pool, if any
    pub async fn close(self) {
        if let Some(db) = self.database {
            db.close().await;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SnapshotHealth {
    Ok { bytes: usize },
    /// Readable, but some records could not be loaded
    Partial { bytes: usize, skipped: Vec<String> },
    Missing,
    Unreadable { reason: String },
}

/// Findings of [`Workspace::doctor`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorReport {
    pub location: String,
    pub backend: &'static str,
    pub storage_key: String,
    pub schema_version: Option<i32>,
    pub target_schema_version: Option<i32>,
    pub database_healthy: Option<bool>,
    pub snapshot: SnapshotHealth,
    pub agent_count: usize,
    pub dangling_edges: usize,
    /// Size of the copy kept from an unreadable snapshot, if one exists
    pub corrupt_backup: Option<usize>,
}

impl DoctorReport {
    pub fn is_healthy(&self) -> bool {
        self.database_healthy != Some(false)
            && !matches!(
                self.snapshot,
                SnapshotHealth::Unreadable { .. } | SnapshotHealth::Partial { .. }
            )
            && self.schema_version == self.target_schema_version
    }
}
