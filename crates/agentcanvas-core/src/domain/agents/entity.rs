//! Agent entity and its partial-update payloads

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::workflow::{Edge, Node};

/// Lifecycle status of an agent
///
/// Transitions are not constrained; any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Draft,
    Building,
    Ready,
    Deployed,
}

impl AgentStatus {
    pub const ALL: [AgentStatus; 4] = [
        AgentStatus::Draft,
        AgentStatus::Building,
        AgentStatus::Ready,
        AgentStatus::Deployed,
    ];

    /// Convert to string for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Draft => "draft",
            AgentStatus::Building => "building",
            AgentStatus::Ready => "ready",
            AgentStatus::Deployed => "deployed",
        }
    }

    /// Parse from storage string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(AgentStatus::Draft),
            "building" => Some(AgentStatus::Building),
            "ready" => Some(AgentStatus::Ready),
            "deployed" => Some(AgentStatus::Deployed),
            _ => None,
        }
    }

    /// Capitalized label for display
    pub fn label(&self) -> &'static str {
        match self {
            AgentStatus::Draft => "Draft",
            AgentStatus::Building => "Building",
            AgentStatus::Ready => "Ready",
            AgentStatus::Deployed => "Deployed",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ISO 8601 timestamps with millisecond precision and a `Z` suffix
pub(crate) mod timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

/// A user-defined agent configuration owning a workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub subdomains: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub integrations: Vec<String>,
    #[serde(default, with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Agent {
    pub fn has_graph(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Apply the supplied fields of `update`; timestamps are the caller's job
    pub(crate) fn apply(&mut self, update: AgentUpdate) {
        let AgentUpdate {
            name,
            description,
            domain,
            subdomains,
            capabilities,
            integrations,
            status,
            nodes,
            edges,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(domain) = domain {
            self.domain = domain;
        }
        if let Some(subdomains) = subdomains {
            self.subdomains = subdomains;
        }
        if let Some(capabilities) = capabilities {
            self.capabilities = capabilities;
        }
        if let Some(integrations) = integrations {
            self.integrations = integrations;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(nodes) = nodes {
            self.nodes = nodes;
        }
        if let Some(edges) = edges {
            self.edges = edges;
        }
    }
}

/// Attributes supplied when creating an agent
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewAgent {
    pub name: String,
    pub description: String,
    pub domain: String,
    pub subdomains: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub integrations: Vec<String>,
}

impl NewAgent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            domain: domain.into(),
            ..Default::default()
        }
    }

    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_integrations<I, S>(mut self, integrations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.integrations = integrations.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update: only `Some` fields are replaced
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub subdomains: Option<Vec<String>>,
    pub capabilities: Option<Vec<String>>,
    pub integrations: Option<Vec<String>>,
    pub status: Option<AgentStatus>,
    pub nodes: Option<Vec<Node>>,
    pub edges: Option<Vec<Edge>>,
}

impl AgentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole workflow graph
    pub fn graph(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes: Some(nodes),
            edges: Some(edges),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn subdomains(mut self, subdomains: Vec<String>) -> Self {
        self.subdomains = Some(subdomains);
        self
    }

    pub fn status(mut self, status: AgentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
