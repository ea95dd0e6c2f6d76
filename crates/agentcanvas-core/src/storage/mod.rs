//! Storage layer - key-value persistence over SQLite
//!
//! The agent store writes its whole state as one JSON document under a single
//! key. Any [`KeyValueStore`] can hold it; the SQLite backend is the durable
//! default and [`MemoryKeyValueStore`] serves tests and `--memory` sessions.
//!
//! # Architecture
//!
//! - `database`: Connection pool management and initialization
//! - `migrations`: Schema versioning and automatic migration
//! - `kv`: The key-value port and its in-memory implementation
//! - `sqlite`: Key-value port backed by the `kv_entries` table
//!
//! # Usage
//!
//! ```ignore
//! use agentcanvas_core::storage::{KeyValueStore, SqliteKeyValueStore, STORAGE_KEY};
//!
//! let kv = SqliteKeyValueStore::in_memory().await?;
//! kv.set(STORAGE_KEY, "{}").await?;
//! ```

pub mod database;
pub mod kv;
pub mod migrations;
pub mod sqlite;

/// Key the agent snapshot is stored under
pub const STORAGE_KEY: &str = "agent-storage";

pub use database::{Database, DatabaseConfig, default_database_path};
pub use kv::{KeyValueStore, MemoryKeyValueStore};
pub use migrations::{CURRENT_VERSION, MigrationStatus, migration_status, run_migrations};
pub use sqlite::SqliteKeyValueStore;
