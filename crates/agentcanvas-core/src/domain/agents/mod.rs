//! Agent records and the store that owns them
//!
//! # Architecture
//!
//! - **Entity**: `Agent`, `NewAgent`, `AgentUpdate`, `AgentStatus`
//! - **Store**: `AgentStore`, the shared handle every caller mutates through
//! - **Snapshot**: the versioned JSON envelope written after each mutation
//! - **Clock**: time port so timestamp ordering can be tested
//!
//! # Example
//!
//! ```ignore
//! use agentcanvas_core::domain::agents::{AgentStore, NewAgent};
//!
//! let store = AgentStore::in_memory().await?;
//! let id = store.create_agent(NewAgent::new("Tracker", "Tracks prices", "finance")).await?;
//! assert_eq!(store.current_agent_id().await, Some(id));
//! ```

pub mod clock;
pub mod entity;
pub mod snapshot;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock, next_timestamp};
pub use entity::{Agent, AgentStatus, AgentUpdate, NewAgent};
pub use snapshot::{Decoded, SNAPSHOT_VERSION, StoreSnapshot};
pub use store::{AgentStore, AgentStoreBuilder};
