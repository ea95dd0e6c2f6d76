//! Guided agent creation
//!
//! - `catalog`: the domains, capabilities, integrations and description
//!   suggestions a user picks from
//! - `draft`: `AgentWizard`, the five-step form that ends in `create_agent`

pub mod catalog;
pub mod draft;

pub use catalog::{
    CAPABILITIES, CUSTOM_DOMAIN, CapabilityOption, DESCRIPTION_SUGGESTIONS, DOMAINS, DomainOption,
    INTEGRATIONS, IntegrationOption,
};
pub use draft::{Advance, AgentDraft, AgentWizard, WizardField, WizardStep};
