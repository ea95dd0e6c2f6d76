//! AgentCanvas Core Library
//!
//! This crate provides the core functionality for AgentCanvas, including:
//! - Agent store (single source of truth, persisted as one JSON snapshot)
//! - Workflow graphs and the editor with debounced autosave
//! - Agent creation wizard and its catalog
//! - Storage (key-value port, SQLite and in-memory backends)
//! - Commands shared by front ends (dashboard cards, workspace, doctor)

pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::agents::{Agent, AgentStatus, AgentStore, AgentUpdate, NewAgent};
    pub use crate::domain::workflow::{Edge, Node, NodeKind, Position, WorkflowEditor, WorkflowGraph};
    pub use crate::error::{Error, Result};
    pub use crate::storage::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
}
