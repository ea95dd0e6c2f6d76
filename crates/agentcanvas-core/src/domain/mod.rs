//! Domain layer
//!
//! Contains the core business logic and domain models.

pub mod agents;
pub mod wizard;
pub mod workflow;
