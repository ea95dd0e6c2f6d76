//! Commands module - operations shared by every front end
//!
//! These are used by the CLI; they sit on top of the domain layer and own
//! nothing the domain does not already model.

pub mod dashboard;
pub mod workspace;

pub use dashboard::{AgentCard, StatusAction, agent_cards, format_date};
pub use workspace::{DoctorReport, SnapshotHealth, StoreLocation, Workspace};
