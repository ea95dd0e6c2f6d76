//! Dashboard projection of the agent collection

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::agents::{Agent, AgentStatus, AgentStore};

/// Primary action offered for an agent, driven by its status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusAction {
    Build,
    Building,
    Deploy,
    Pause,
}

impl StatusAction {
    pub fn for_status(status: AgentStatus) -> Self {
        match status {
            AgentStatus::Draft => StatusAction::Build,
            AgentStatus::Building => StatusAction::Building,
            AgentStatus::Ready => StatusAction::Deploy,
            AgentStatus::Deployed => StatusAction::Pause,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusAction::Build => "Build",
            StatusAction::Building => "Building...",
            StatusAction::Deploy => "Deploy",
            StatusAction::Pause => "Pause",
        }
    }

    /// Only an in-progress build cannot be acted on
    pub fn is_enabled(&self) -> bool {
        !matches!(self, StatusAction::Building)
    }
}

/// One card on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub domain: String,
    pub status: AgentStatus,
    pub status_label: &'static str,
    pub updated: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub action: StatusAction,
    pub action_enabled: bool,
    /// Whether this agent is the current selection
    pub current: bool,
}

impl AgentCard {
    pub fn from_agent(agent: &Agent, current_id: Option<&str>) -> Self {
        let action = StatusAction::for_status(agent.status);
        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            description: agent.description.clone(),
            domain: agent.domain.clone(),
            status: agent.status,
            status_label: agent.status.label(),
            updated: format_date(agent.updated_at),
            node_count: agent.nodes.len(),
            edge_count: agent.edges.len(),
            action,
            action_enabled: action.is_enabled(),
            current: current_id == Some(agent.id.as_str()),
        }
    }
}

/// Short calendar date such as `Mar 7, 2025`
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// Cards for every agent, in creation order
pub async fn agent_cards(store: &AgentStore) -> Vec<AgentCard> {
    let snapshot = store.snapshot().await;
    let current = snapshot.current_agent_id.as_deref();
    snapshot
        .agents
        .iter()
        .map(|agent| AgentCard::from_agent(agent, current))
        .collect()
}
