//! Workflow graph connectors

use serde::{Deserialize, Serialize};

/// Edge component used for every connection
pub const CUSTOM_EDGE_COMPONENT: &str = "custom";

/// Accent colour shared by edge strokes and arrow heads
pub const EDGE_COLOR: &str = "#6366F1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerType {
    Arrow,
    #[default]
    ArrowClosed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMarker {
    #[serde(rename = "type")]
    pub marker_type: MarkerType,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
}

/// A directed connector between two nodes of the same agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default)]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<EdgeMarker>,
}

impl Edge {
    /// Build an edge with the uniform connection styling
    pub fn styled(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            component: Some(CUSTOM_EDGE_COMPONENT.to_string()),
            animated: true,
            style: Some(EdgeStyle {
                stroke: EDGE_COLOR.to_string(),
                stroke_width: 2.0,
            }),
            marker_end: Some(EdgeMarker {
                marker_type: MarkerType::ArrowClosed,
                color: EDGE_COLOR.to_string(),
            }),
        }
    }

    pub fn with_handles(mut self, source_handle: Option<String>, target_handle: Option<String>) -> Self {
        self.source_handle = source_handle;
        self.target_handle = target_handle;
        self
    }

    /// Base id for a connection, before any de-duplication suffix
    pub fn connection_id(
        source: &str,
        source_handle: Option<&str>,
        target: &str,
        target_handle: Option<&str>,
    ) -> String {
        format!(
            "reactflow__edge-{}{}-{}{}",
            source,
            source_handle.unwrap_or_default(),
            target,
            target_handle.unwrap_or_default()
        )
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}
