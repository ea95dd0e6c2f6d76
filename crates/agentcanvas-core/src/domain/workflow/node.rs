//! Workflow graph vertices

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Component every agent node is rendered with on the canvas
pub const AGENT_NODE_COMPONENT: &str = "agentNode";

/// Id of the node seeded into an empty graph
pub const MAIN_NODE_ID: &str = "main-agent";

/// Functional kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Main,
    Data,
    Web,
    Search,
    Chat,
    Integration,
    Code,
    Document,
    /// Any kind this build does not know about
    Custom,
}

impl NodeKind {
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Main,
        NodeKind::Data,
        NodeKind::Web,
        NodeKind::Search,
        NodeKind::Chat,
        NodeKind::Integration,
        NodeKind::Code,
        NodeKind::Document,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Main => "main",
            NodeKind::Data => "data",
            NodeKind::Web => "web",
            NodeKind::Search => "search",
            NodeKind::Chat => "chat",
            NodeKind::Integration => "integration",
            NodeKind::Code => "code",
            NodeKind::Document => "document",
            NodeKind::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        NodeKind::ALL
            .into_iter()
            .chain(std::iter::once(NodeKind::Custom))
            .find(|kind| kind.as_str() == s)
    }

    /// Human-readable name shown in the settings panel header
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeKind::Main => "Main Agent",
            NodeKind::Data => "Data Source",
            NodeKind::Web => "Web Agent",
            NodeKind::Search => "Search Agent",
            NodeKind::Chat => "Chat Agent",
            NodeKind::Integration => "API Connector",
            NodeKind::Code => "Code Agent",
            NodeKind::Document => "Document Processor",
            NodeKind::Custom => "Node",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Node properties in insertion order
pub type Properties = IndexMap<String, String>;

/// Editable payload of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    /// Raw type tag; tags outside [`NodeKind`] are kept verbatim
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "lenient_properties")]
    pub properties: Properties,
    /// Keys this build does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            label: String::new(),
            kind: default_kind(),
            description: String::new(),
            domain: None,
            properties: Properties::new(),
            extra: Map::new(),
        }
    }
}

fn default_kind() -> String {
    NodeKind::Main.as_str().to_string()
}

/// Accept any JSON value for a property, keeping strings as they are
fn lenient_properties<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<IndexMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, property_text(value)))
        .collect())
}

fn property_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A vertex in an agent's workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default = "default_component")]
    pub component: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
    /// Canvas keys this build does not model (size, selection flags)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_component() -> String {
    AGENT_NODE_COMPONENT.to_string()
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        label: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            component: default_component(),
            position,
            data: NodeData {
                label: label.into(),
                kind: kind.as_str().to_string(),
                ..Default::default()
            },
            extra: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.data.description = description.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.data.domain = Some(domain.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.properties.insert(key.into(), value.into());
        self
    }

    /// Typed kind; unknown tags read as [`NodeKind::Custom`]
    pub fn kind(&self) -> NodeKind {
        NodeKind::parse(&self.data.kind).unwrap_or(NodeKind::Custom)
    }

    /// The type tag exactly as stored
    pub fn type_tag(&self) -> &str {
        &self.data.kind
    }

    pub fn label(&self) -> &str {
        &self.data.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_kind_parse_and_display() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NodeKind::parse("custom"), Some(NodeKind::Custom));
        assert_eq!(NodeKind::parse("teleporter"), None);
        assert_eq!(NodeKind::Integration.display_name(), "API Connector");
        assert_eq!(NodeKind::Custom.display_name(), "Node");
    }

    #[test]
    fn test_node_serializes_canvas_shape() {
        let node = Node::new(MAIN_NODE_ID, NodeKind::Main, "Main Agent", Position::new(250.0, 100.0))
            .with_description("Tracks prices")
            .with_domain("finance");

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "main-agent",
                "type": "agentNode",
                "position": { "x": 250.0, "y": 100.0 },
                "data": {
                    "label": "Main Agent",
                    "type": "main",
                    "description": "Tracks prices",
                    "domain": "finance",
                    "properties": {}
                }
            })
        );
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let node: Node = serde_json::from_value(json!({
            "id": "n-1",
            "position": { "x": 1.0, "y": 2.0 },
            "data": { "label": "Bare" }
        }))
        .unwrap();

        assert_eq!(node.kind(), NodeKind::Main);
        assert_eq!(node.component, AGENT_NODE_COMPONENT);
        assert!(node.data.properties.is_empty());
        assert_eq!(node.data.domain, None);
        assert!(node.extra.is_empty());
    }

    #[test]
    fn test_unknown_type_tag_round_trips() {
        let stored = json!({
            "id": "analytics-1",
            "type": "agentNode",
            "position": { "x": 1.0, "y": 2.0 },
            "data": {
                "label": "Analytics",
                "type": "analytics",
                "description": "",
                "properties": {}
            }
        });
        let node: Node = serde_json::from_value(stored.clone()).unwrap();

        assert_eq!(node.kind(), NodeKind::Custom);
        assert_eq!(node.kind().display_name(), "Node");
        assert_eq!(node.type_tag(), "analytics");
        assert_eq!(serde_json::to_value(&node).unwrap(), stored);
    }

    #[test]
    fn test_extra_keys_round_trip() {
        let stored = json!({
            "id": "web-1",
            "type": "agentNode",
            "position": { "x": 0.0, "y": 0.0 },
            "data": {
                "label": "Web Agent",
                "type": "web",
                "description": "",
                "properties": {},
                "icon": "globe",
                "config": { "retries": 3 }
            },
            "width": 180,
            "selected": false
        });
        let node: Node = serde_json::from_value(stored.clone()).unwrap();

        assert_eq!(node.data.extra["icon"], "globe");
        assert_eq!(node.extra["width"], 180);
        assert_eq!(serde_json::to_value(&node).unwrap(), stored);
    }

    #[test]
    fn test_non_string_properties_are_rendered_as_text() {
        let node: Node = serde_json::from_value(json!({
            "id": "web-1",
            "data": {
                "type": "web",
                "properties": { "depth": 2, "follow": true, "note": null, "url": "https://a.example" }
            }
        }))
        .unwrap();

        let props = &node.data.properties;
        assert_eq!(props.get("depth").map(String::as_str), Some("2"));
        assert_eq!(props.get("follow").map(String::as_str), Some("true"));
        assert_eq!(props.get("note").map(String::as_str), Some(""));
        assert_eq!(props.get("url").map(String::as_str), Some("https://a.example"));
    }

    #[test]
    fn test_properties_keep_insertion_order() {
        let mut node = Node::new("web-1", NodeKind::Web, "Web Agent", Position::default());
        for n in [2, 10, 1] {
            node = node.with_property(format!("property_{n}"), "");
        }
        let keys: Vec<&str> = node.data.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["property_2", "property_10", "property_1"]);

        let value = serde_json::to_string(&node.data.properties).unwrap();
        assert_eq!(value, r#"{"property_2":"","property_10":"","property_1":""}"#);
    }
}
