//! In-memory workflow graph of one agent
//!
//! Graph operations never validate topology: self-loops, parallel edges and
//! edges whose endpoints were removed out-of-band are all representable.
//! [`WorkflowGraph::check`] reports such shapes without changing anything.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;
use uuid::Uuid;

use super::edge::Edge;
use super::node::{MAIN_NODE_ID, Node, NodeKind, Position};
use super::settings::NodeSettings;
use crate::domain::agents::Agent;
use crate::error::{Error, Result};

/// Range new nodes are scattered over when no position is given
pub const RANDOM_PLACEMENT: Range<f64> = 100.0..400.0;

/// Where a loaded graph came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphOrigin {
    /// Nodes and edges were taken verbatim from the agent
    Stored,
    /// The agent had no nodes; a main node was synthesized
    Seeded,
}

/// Nodes and edges of one agent, in insertion order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowGraph {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

/// Read-only findings from [`WorkflowGraph::check`]
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GraphReport {
    pub node_count: usize,
    pub edge_count: usize,
    /// Edge ids whose source or target is not a node of the graph
    pub dangling_edges: Vec<String>,
    pub self_loops: Vec<String>,
    /// Edge ids that repeat an earlier edge's source and target
    pub parallel_edges: Vec<String>,
}

impl GraphReport {
    pub fn is_clean(&self) -> bool {
        self.dangling_edges.is_empty() && self.self_loops.is_empty() && self.parallel_edges.is_empty()
    }
}

impl WorkflowGraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// The node synthesized for an agent without a graph
    pub fn main_node(agent: &Agent, position: Position) -> Node {
        Node::new(MAIN_NODE_ID, NodeKind::Main, "Main Agent", position)
            .with_description(agent.description.clone())
            .with_domain(agent.domain.clone())
    }

    /// Build the editing graph for `agent`
    ///
    /// An agent with no nodes gets exactly one main node at `main_position`;
    /// otherwise the stored nodes and edges are used unchanged.
    pub fn load(agent: &Agent, main_position: Position) -> (Self, GraphOrigin) {
        if agent.nodes.is_empty() {
            let graph = Self::new(vec![Self::main_node(agent, main_position)], Vec::new());
            (graph, GraphOrigin::Seeded)
        } else {
            let graph = Self::new(agent.nodes.clone(), agent.edges.clone());
            (graph, GraphOrigin::Stored)
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }

    // ========== Mutations ==========

    /// Add a node of `kind` and return its generated id
    ///
    /// Without an explicit position the node is dropped somewhere in
    /// [`RANDOM_PLACEMENT`] on both axes.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        label: impl Into<String>,
        description: impl Into<String>,
        position: Option<Position>,
    ) -> String {
        let id = format!("{}-{}", kind.as_str(), Uuid::new_v4());
        let position = position.unwrap_or_else(random_position);
        self.nodes
            .push(Node::new(id.clone(), kind, label, position).with_description(description));
        id
    }

    /// Append a fully built node as-is
    pub fn insert_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<()> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Connect `source` to `target` with the uniform edge styling
    ///
    /// Always succeeds. A connection that repeats an existing one gets a
    /// numeric suffix so edge ids stay unique.
    pub fn connect(
        &mut self,
        source: &str,
        source_handle: Option<&str>,
        target: &str,
        target_handle: Option<&str>,
    ) -> String {
        let base = Edge::connection_id(source, source_handle, target, target_handle);
        let mut id = base.clone();
        let mut n = 1;
        while self.edge(&id).is_some() {
            n += 1;
            id = format!("{base}-{n}");
        }

        let edge = Edge::styled(id.clone(), source, target).with_handles(
            source_handle.map(str::to_string),
            target_handle.map(str::to_string),
        );
        self.edges.push(edge);
        id
    }

    /// Editable form for node `id`
    pub fn settings(&self, id: &str) -> Result<NodeSettings> {
        self.node(id)
            .map(NodeSettings::from_node)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    /// Overwrite label, description and properties from a settings form
    pub fn apply_settings(&mut self, settings: &NodeSettings) -> Result<()> {
        let node = self.node_mut(&settings.node_id)?;
        settings.apply_to(node);
        Ok(())
    }

    pub fn set_property(&mut self, id: &str, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.node_mut(id)?
            .data
            .properties
            .insert(key.into(), value.into());
        Ok(())
    }

    pub fn remove_property(&mut self, id: &str, key: &str) -> Result<bool> {
        Ok(self.node_mut(id)?.data.properties.shift_remove(key).is_some())
    }

    /// Remove node `id` together with every edge touching it
    ///
    /// Returns the number of edges removed alongside the node.
    pub fn remove_node(&mut self, id: &str) -> Result<usize> {
        let index = self
            .nodes
            .iter()
            .position(|node| node.id == id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        self.nodes.remove(index);

        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(id));
        Ok(before - self.edges.len())
    }

    pub fn remove_edge(&mut self, id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|edge| edge.id != id);
        self.edges.len() != before
    }

    // ========== Diagnostics ==========

    /// Edges whose source or target does not exist
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|node| node.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|edge| !ids.contains(edge.source.as_str()) || !ids.contains(edge.target.as_str()))
            .collect()
    }

    pub fn check(&self) -> GraphReport {
        let mut seen = HashSet::new();
        let parallel_edges = self
            .edges
            .iter()
            .filter(|edge| !seen.insert((edge.source.as_str(), edge.target.as_str())))
            .map(|edge| edge.id.clone())
            .collect();

        GraphReport {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            dangling_edges: self.dangling_edges().into_iter().map(|edge| edge.id.clone()).collect(),
            self_loops: self
                .edges
                .iter()
                .filter(|edge| edge.is_self_loop())
                .map(|edge| edge.id.clone())
                .collect(),
            parallel_edges,
        }
    }
}

fn random_position() -> Position {
    let mut rng = rand::thread_rng();
    Position::new(
        rng.gen_range(RANDOM_PLACEMENT),
        rng.gen_range(RANDOM_PLACEMENT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agents::AgentStatus;
    use chrono::Utc;

    fn agent_with(nodes: Vec<Node>, edges: Vec<Edge>) -> Agent {
        let now = Utc::now();
        Agent {
            id: "agent-1".to_string(),
            name: "Tracker".to_string(),
            description: "Tracks prices".to_string(),
            domain: "finance".to_string(),
            subdomains: vec![],
            capabilities: vec![],
            integrations: vec![],
            created_at: now,
            updated_at: now,
            status: AgentStatus::Draft,
            nodes,
            edges,
        }
    }

    fn origin() -> Position {
        Position::new(250.0, 100.0)
    }

    #[test]
    fn test_empty_agent_is_seeded_with_main_node() {
        let (graph, source) = WorkflowGraph::load(&agent_with(vec![], vec![]), origin());

        assert_eq!(source, GraphOrigin::Seeded);
        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.edges().is_empty());

        let main = &graph.nodes()[0];
        assert_eq!(main.id, MAIN_NODE_ID);
        assert_eq!(main.kind(), NodeKind::Main);
        assert_eq!(main.label(), "Main Agent");
        assert_eq!(main.position, origin());
        assert_eq!(main.data.description, "Tracks prices");
        assert_eq!(main.data.domain.as_deref(), Some("finance"));
    }

    #[test]
    fn test_stored_graph_is_loaded_verbatim() {
        let nodes = vec![
            Node::new("data-1", NodeKind::Data, "Data Source", Position::new(1.0, 1.0)),
            Node::new("web-1", NodeKind::Web, "Web Agent", Position::new(2.0, 2.0)),
        ];
        let edges = vec![Edge::styled("e1", "data-1", "web-1")];

        let (graph, source) = WorkflowGraph::load(&agent_with(nodes.clone(), edges.clone()), origin());

        assert_eq!(source, GraphOrigin::Stored);
        assert_eq!(graph.nodes(), nodes.as_slice());
        assert_eq!(graph.edges(), edges.as_slice());
        assert!(graph.node(MAIN_NODE_ID).is_none());
    }

    #[test]
    fn test_add_node_generates_kind_prefixed_id() {
        let mut graph = WorkflowGraph::default();
        let id = graph.add_node(NodeKind::Search, "Search Agent", "Searches", None);

        assert!(id.starts_with("search-"));
        let node = graph.node(&id).unwrap();
        assert!(RANDOM_PLACEMENT.contains(&node.position.x));
        assert!(RANDOM_PLACEMENT.contains(&node.position.y));
        assert_eq!(node.data.description, "Searches");

        let other = graph.add_node(NodeKind::Search, "Search Agent", "", Some(Position::new(5.0, 6.0)));
        assert_ne!(id, other);
        assert_eq!(graph.node(&other).unwrap().position, Position::new(5.0, 6.0));
    }

    #[test]
    fn test_move_node() {
        let mut graph = WorkflowGraph::default();
        let id = graph.add_node(NodeKind::Code, "Code Agent", "", None);

        graph.move_node(&id, Position::new(10.0, 20.0)).unwrap();
        assert_eq!(graph.node(&id).unwrap().position, Position::new(10.0, 20.0));
        assert!(matches!(
            graph.move_node("nope", Position::default()),
            Err(Error::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_connect_accepts_self_loops_and_repeats() {
        let mut graph = WorkflowGraph::default();
        graph.insert_node(Node::new("a", NodeKind::Main, "A", Position::default()));

        let first = graph.connect("a", None, "a", None);
        let second = graph.connect("a", None, "a", None);
        let third = graph.connect("a", None, "a", None);

        assert_eq!(first, "reactflow__edge-a-a");
        assert_eq!(second, "reactflow__edge-a-a-2");
        assert_eq!(third, "reactflow__edge-a-a-3");
        assert_eq!(graph.edges().len(), 3);
        assert!(graph.edges().iter().all(|edge| edge.animated));

        let report = graph.check();
        assert_eq!(report.self_loops.len(), 3);
        assert_eq!(report.parallel_edges, vec![second, third]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_connect_keeps_handles() {
        let mut graph = WorkflowGraph::default();
        let id = graph.connect("a", Some("out"), "b", Some("in"));

        let edge = graph.edge(&id).unwrap();
        assert_eq!(edge.source_handle.as_deref(), Some("out"));
        assert_eq!(edge.target_handle.as_deref(), Some("in"));
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = WorkflowGraph::default();
        for id in ["a", "b", "c"] {
            graph.insert_node(Node::new(id, NodeKind::Web, id, Position::default()));
        }
        graph.connect("a", None, "b", None);
        graph.connect("b", None, "c", None);
        graph.connect("a", None, "c", None);

        assert_eq!(graph.remove_node("b").unwrap(), 2);
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.edges().len(), 1);
        assert!(graph.check().is_clean());
        assert!(graph.remove_node("b").is_err());
    }

    #[test]
    fn test_remove_edge() {
        let mut graph = WorkflowGraph::default();
        let id = graph.connect("a", None, "b", None);

        assert!(graph.remove_edge(&id));
        assert!(!graph.remove_edge(&id));
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_dangling_edges_are_reported() {
        let graph = WorkflowGraph::new(
            vec![Node::new("a", NodeKind::Main, "A", Position::default())],
            vec![Edge::styled("e1", "a", "ghost"), Edge::styled("e2", "a", "a")],
        );

        let dangling: Vec<_> = graph.dangling_edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(dangling, vec!["e1"]);
        assert_eq!(graph.check().dangling_edges, vec!["e1".to_string()]);
    }

    #[test]
    fn test_settings_roundtrip_through_graph() {
        let mut graph = WorkflowGraph::default();
        let id = graph.add_node(NodeKind::Document, "Document Processor", "Reads PDFs", None);

        let mut form = graph.settings(&id).unwrap();
        form.set_label("Invoice Reader");
        let key = form.add_property();
        form.set_property(key.clone(), "ocr");
        graph.apply_settings(&form).unwrap();

        let node = graph.node(&id).unwrap();
        assert_eq!(node.label(), "Invoice Reader");
        assert_eq!(node.data.properties.get(&key).map(String::as_str), Some("ocr"));
        assert!(graph.settings("missing").is_err());
    }

    #[test]
    fn test_property_helpers() {
        let mut graph = WorkflowGraph::default();
        let id = graph.add_node(NodeKind::Integration, "API Connector", "", None);

        graph.set_property(&id, "endpoint", "https://api.example.com").unwrap();
        assert!(graph.remove_property(&id, "endpoint").unwrap());
        assert!(!graph.remove_property(&id, "endpoint").unwrap());
        assert!(graph.set_property("missing", "k", "v").is_err());
    }
}
