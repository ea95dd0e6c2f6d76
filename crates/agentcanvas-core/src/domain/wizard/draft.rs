//! Step-by-step agent creation

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use super::catalog::{self, CUSTOM_DOMAIN};
use crate::domain::agents::{AgentStore, NewAgent};
use crate::error::Result;

/// Wizard pages, in the order they are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Domain,
    Requirements,
    Capabilities,
    Integrations,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Domain,
        WizardStep::Requirements,
        WizardStep::Capabilities,
        WizardStep::Integrations,
        WizardStep::Review,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Domain => "Domain",
            WizardStep::Requirements => "Requirements",
            WizardStep::Capabilities => "Capabilities",
            WizardStep::Integrations => "Integrations",
            WizardStep::Review => "Review",
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<WizardStep> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Draft fields that can carry a validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardField {
    Name,
    Description,
    Domain,
    Capabilities,
}

/// Values collected so far
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AgentDraft {
    pub name: String,
    pub description: String,
    pub domain: String,
    pub subdomains: Vec<String>,
    pub capabilities: Vec<String>,
    pub integrations: Vec<String>,
}

impl AgentDraft {
    pub fn to_new_agent(&self) -> NewAgent {
        NewAgent::new(&self.name, &self.description, &self.domain)
            .with_subdomains(self.subdomains.iter().cloned())
            .with_capabilities(self.capabilities.iter().cloned())
            .with_integrations(self.integrations.iter().cloned())
    }
}

/// Outcome of [`AgentWizard::next`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to this step
    Moved(WizardStep),
    /// The current step has errors; see [`AgentWizard::errors`]
    Invalid,
    /// The agent was created with this id and the wizard was reset
    Created(String),
}

/// Multi-step form that ends in [`AgentStore::create_agent`]
#[derive(Debug, Clone)]
pub struct AgentWizard {
    step: WizardStep,
    draft: AgentDraft,
    errors: BTreeMap<WizardField, String>,
}

impl Default for AgentWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Domain,
            draft: AgentDraft::default(),
            errors: BTreeMap::new(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &AgentDraft {
        &self.draft
    }

    pub fn errors(&self) -> &BTreeMap<WizardField, String> {
        &self.errors
    }

    pub fn error(&self, field: WizardField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    fn edited(&mut self, field: WizardField) {
        self.errors.remove(&field);
    }

    // ========== Field edits ==========

    /// Choose a domain; its sub-domains become the selection
    ///
    /// The custom domain and ids outside the catalog start with none.
    pub fn select_domain(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.draft.subdomains = match catalog::domain(&id) {
            Some(domain) if domain.id != CUSTOM_DOMAIN => {
                domain.subdomains.iter().map(|s| s.to_string()).collect()
            }
            _ => Vec::new(),
        };
        self.draft.domain = id;
        self.edited(WizardField::Domain);
    }

    pub fn toggle_subdomain(&mut self, subdomain: &str) {
        toggle(&mut self.draft.subdomains, subdomain);
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
        self.edited(WizardField::Name);
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
        self.edited(WizardField::Description);
    }

    /// Append a suggestion to the description, space-separated
    pub fn append_suggestion(&mut self, suggestion: &str) {
        if !self.draft.description.is_empty() {
            self.draft.description.push(' ');
        }
        self.draft.description.push_str(suggestion);
        self.edited(WizardField::Description);
    }

    pub fn toggle_capability(&mut self, id: &str) {
        toggle(&mut self.draft.capabilities, id);
        self.edited(WizardField::Capabilities);
    }

    pub fn toggle_integration(&mut self, id: &str) {
        toggle(&mut self.draft.integrations, id);
    }

    // ========== Navigation ==========

    /// Check the current step, replacing the error set
    pub fn validate(&mut self) -> bool {
        let mut errors = BTreeMap::new();
        match self.step {
            WizardStep::Domain => {
                if self.draft.domain.is_empty() {
                    errors.insert(WizardField::Domain, "Domain is required".to_string());
                }
            }
            WizardStep::Requirements => {
                if self.draft.name.trim().is_empty() {
                    errors.insert(WizardField::Name, "Name is required".to_string());
                }
                if self.draft.description.trim().is_empty() {
                    errors.insert(WizardField::Description, "Description is required".to_string());
                }
            }
            WizardStep::Capabilities => {
                if self.draft.capabilities.is_empty() {
                    errors.insert(
                        WizardField::Capabilities,
                        "Select at least one capability".to_string(),
                    );
                }
            }
            WizardStep::Integrations | WizardStep::Review => {}
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Advance past a valid step, creating the agent from the last one
    pub async fn next(&mut self, store: &AgentStore) -> Result<Advance> {
        if !self.validate() {
            debug!(step = %self.step, errors = self.errors.len(), "Wizard step is invalid");
            return Ok(Advance::Invalid);
        }

        match self.step.next() {
            Some(step) => {
                self.step = step;
                Ok(Advance::Moved(step))
            }
            None => {
                let id = store.create_agent(self.draft.to_new_agent()).await?;
                self.reset();
                Ok(Advance::Created(id))
            }
        }
    }

    /// Go back one step; returns `false` on the first step
    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Discard everything and return to the first step
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

fn toggle(values: &mut Vec<String>, value: &str) {
    match values.iter().position(|v| v == value) {
        Some(index) => {
            values.remove(index);
        }
        None => values.push(value.to_string()),
    }
}
