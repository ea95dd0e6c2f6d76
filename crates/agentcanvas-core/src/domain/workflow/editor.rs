//! Editing session over one agent's workflow graph
//!
//! The editor owns a working copy of the graph. Each mutation is applied to
//! the copy immediately and handed to the autosave task, which writes the
//! latest copy back to the [`AgentStore`] after a quiet period.

use tracing::{debug, info};

use super::autosave::Autosave;
use super::graph::{GraphOrigin, GraphReport, WorkflowGraph};
use super::node::{Node, NodeKind, Position};
use super::palette::PaletteItem;
use super::settings::NodeSettings;
use crate::config::EditorConfig;
use crate::domain::agents::{Agent, AgentStore};
use crate::error::{Error, Result};

/// Open editing session for one agent
///
/// Dropping the editor without [`WorkflowEditor::close`] still writes any
/// pending graph, as long as the tokio runtime is alive.
#[derive(Debug)]
pub struct WorkflowEditor {
    agent: Agent,
    graph: WorkflowGraph,
    origin: GraphOrigin,
    selected: Option<NodeSettings>,
    autosave: Autosave,
}

impl WorkflowEditor {
    /// Load agent `agent_id` for editing
    ///
    /// A seeded graph is scheduled for write-back straight away.
    pub async fn open(store: &AgentStore, agent_id: &str, config: &EditorConfig) -> Result<Self> {
        let agent = store
            .get_agent(agent_id)
            .await
            .ok_or_else(|| Error::AgentNotFound(agent_id.to_string()))?;

        let main_position = Position::new(config.default_node_x, config.default_node_y);
        let (graph, origin) = WorkflowGraph::load(&agent, main_position);
        let autosave = Autosave::spawn(store.clone(), agent.id.clone(), config.autosave_delay());

        info!(
            agent_id = %agent.id,
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            seeded = origin == GraphOrigin::Seeded,
            "Opened workflow editor"
        );

        let editor = Self {
            agent,
            graph,
            origin,
            selected: None,
            autosave,
        };
        if origin == GraphOrigin::Seeded {
            editor.changed()?;
        }
        Ok(editor)
    }

    /// The agent as it was when the editor opened
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn agent_id(&self) -> &str {
        &self.agent.id
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn origin(&self) -> GraphOrigin {
        self.origin
    }

    pub fn check(&self) -> GraphReport {
        self.graph.check()
    }

    fn changed(&self) -> Result<()> {
        self.autosave.schedule(self.graph.clone())
    }

    // ========== Mutations ==========

    pub fn add_node(
        &mut self,
        kind: NodeKind,
        label: impl Into<String>,
        description: impl Into<String>,
        position: Option<Position>,
    ) -> Result<String> {
        let id = self.graph.add_node(kind, label, description, position);
        debug!(agent_id = %self.agent.id, node_id = %id, "Added node");
        self.changed()?;
        Ok(id)
    }

    /// Drop a palette entry onto the canvas
    pub fn add_palette_item(&mut self, item: &PaletteItem, position: Option<Position>) -> Result<String> {
        self.add_node(item.kind, item.name, item.description, position)
    }

    pub fn insert_node(&mut self, node: Node) -> Result<()> {
        self.graph.insert_node(node);
        self.changed()
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<()> {
        self.graph.move_node(id, position)?;
        self.changed()
    }

    pub fn connect(
        &mut self,
        source: &str,
        source_handle: Option<&str>,
        target: &str,
        target_handle: Option<&str>,
    ) -> Result<String> {
        let id = self.graph.connect(source, source_handle, target, target_handle);
        debug!(agent_id = %self.agent.id, edge_id = %id, "Connected nodes");
        self.changed()?;
        Ok(id)
    }

    pub fn set_property(&mut self, id: &str, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.graph.set_property(id, key, value)?;
        self.changed()
    }

    pub fn remove_property(&mut self, id: &str, key: &str) -> Result<bool> {
        let removed = self.graph.remove_property(id, key)?;
        if removed {
            self.changed()?;
        }
        Ok(removed)
    }

    /// Remove a node and its incident edges; returns the edges removed
    pub fn remove_node(&mut self, id: &str) -> Result<usize> {
        let removed_edges = self.graph.remove_node(id)?;
        if self.selected.as_ref().is_some_and(|form| form.node_id == id) {
            self.selected = None;
        }
        debug!(agent_id = %self.agent.id, node_id = %id, removed_edges, "Removed node");
        self.changed()?;
        Ok(removed_edges)
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<bool> {
        let removed = self.graph.remove_edge(id);
        if removed {
            self.changed()?;
        }
        Ok(removed)
    }

    // ========== Selection ==========

    /// Select node `id` and open a settings form for it
    pub fn select_node(&mut self, id: &str) -> Result<&mut NodeSettings> {
        let form = self.graph.settings(id)?;
        Ok(self.selected.insert(form))
    }

    pub fn selected(&self) -> Option<&NodeSettings> {
        self.selected.as_ref()
    }

    pub fn selected_mut(&mut self) -> Option<&mut NodeSettings> {
        self.selected.as_mut()
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Apply the open settings form to its node
    pub fn save_settings(&mut self) -> Result<()> {
        let form = self
            .selected
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("no node is selected".to_string()))?;
        self.graph.apply_settings(form)?;
        self.changed()
    }

    /// Apply an externally built settings form
    pub fn apply_settings(&mut self, settings: &NodeSettings) -> Result<()> {
        self.graph.apply_settings(settings)?;
        self.changed()
    }

    // ========== Persistence ==========

    /// Write the graph now and cancel any pending autosave
    pub async fn save(&self) -> Result<()> {
        self.autosave.flush_now(self.graph.clone()).await?;
        info!(agent_id = %self.agent.id, "Saved workflow graph");
        Ok(())
    }

    /// Write anything pending and stop the autosave task
    pub async fn close(self) -> Result<()> {
        let agent_id = self.agent.id;
        self.autosave.shutdown().await?;
        debug!(%agent_id, "Closed workflow editor");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agents::{AgentUpdate, NewAgent};
    use crate::domain::workflow::{Edge, MAIN_NODE_ID, palette};
    use tokio::time::{Duration, sleep};

    async fn store_with_agent() -> (AgentStore, String) {
        let store = AgentStore::in_memory().await.unwrap();
        let id = store
            .create_agent(NewAgent::new("Tracker", "Tracks prices", "finance"))
            .await
            .unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_open_unknown_agent() {
        let store = AgentStore::in_memory().await.unwrap();
        let err = WorkflowEditor::open(&store, "missing", &EditorConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AgentNotFound(id) if id == "missing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_graph_is_written_back() {
        let (store, id) = store_with_agent().await;
        let editor = WorkflowEditor::open(&store, &id, &EditorConfig::default())
            .await
            .unwrap();
        assert_eq!(editor.origin(), GraphOrigin::Seeded);
        assert_eq!(editor.graph().nodes().len(), 1);

        sleep(Duration::from_secs(2)).await;

        let stored = store.get_agent(&id).await.unwrap();
        assert_eq!(stored.nodes.len(), 1);
        assert_eq!(stored.nodes[0].id, MAIN_NODE_ID);
        assert_eq!(stored.nodes[0].data.domain.as_deref(), Some("finance"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_main_node_uses_configured_position() {
        let (store, id) = store_with_agent().await;
        let config = EditorConfig {
            default_node_x: 10.0,
            default_node_y: 20.0,
            ..EditorConfig::default()
        };
        let editor = WorkflowEditor::open(&store, &id, &config).await.unwrap();
        assert_eq!(editor.graph().nodes()[0].position, Position::new(10.0, 20.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stored_graph_is_not_rewritten_on_open() {
        let (store, id) = store_with_agent().await;
        let nodes = vec![
            Node::new("a", NodeKind::Data, "Data Source", Position::default()),
            Node::new("b", NodeKind::Chat, "Chat Agent", Position::default()),
        ];
        store
            .update_agent(&id, AgentUpdate::graph(nodes, vec![Edge::styled("e", "a", "b")]))
            .await
            .unwrap();
        let updated_at = store.get_agent(&id).await.unwrap().updated_at;

        let editor = WorkflowEditor::open(&store, &id, &EditorConfig::default())
            .await
            .unwrap();
        assert_eq!(editor.origin(), GraphOrigin::Stored);
        assert_eq!(editor.graph().nodes().len(), 2);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(store.get_agent(&id).await.unwrap().updated_at, updated_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutations_are_autosaved() {
        let (store, id) = store_with_agent().await;
        let mut editor = WorkflowEditor::open(&store, &id, &EditorConfig::default())
            .await
            .unwrap();

        let search = palette::find_item("search-agent").unwrap();
        let node = editor.add_palette_item(search, None).unwrap();
        let edge = editor.connect(MAIN_NODE_ID, None, &node, None).unwrap();
        editor.move_node(&node, Position::new(300.0, 300.0)).unwrap();

        sleep(Duration::from_secs(2)).await;

        let stored = store.get_agent(&id).await.unwrap();
        assert_eq!(stored.nodes.len(), 2);
        assert_eq!(stored.edges.len(), 1);
        assert_eq!(stored.edges[0].id, edge);
        let added = stored.nodes.iter().find(|n| n.id == node).unwrap();
        assert_eq!(added.label(), "Search Agent");
        assert_eq!(added.position, Position::new(300.0, 300.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_settings_updates_selected_node() {
        let (store, id) = store_with_agent().await;
        let mut editor = WorkflowEditor::open(&store, &id, &EditorConfig::default())
            .await
            .unwrap();

        let form = editor.select_node(MAIN_NODE_ID).unwrap();
        form.set_label("Coordinator");
        let key = form.add_property();
        form.set_property(key.clone(), "gpt");
        editor.save_settings().unwrap();
        editor.save().await.unwrap();

        let stored = store.get_agent(&id).await.unwrap();
        assert_eq!(stored.nodes[0].label(), "Coordinator");
        assert_eq!(stored.nodes[0].data.properties.get(&key).map(String::as_str), Some("gpt"));
    }

    #[tokio::test]
    async fn test_save_settings_requires_selection() {
        let (store, id) = store_with_agent().await;
        let mut editor = WorkflowEditor::open(&store, &id, &EditorConfig::default())
            .await
            .unwrap();
        assert!(matches!(editor.save_settings(), Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_remove_selected_node_clears_selection() {
        let (store, id) = store_with_agent().await;
        let mut editor = WorkflowEditor::open(&store, &id, &EditorConfig::default())
            .await
            .unwrap();
        let other = editor.add_node(NodeKind::Code, "Code Agent", "", None).unwrap();
        editor.connect(MAIN_NODE_ID, None, &other, None).unwrap();

        editor.select_node(&other).unwrap();
        assert_eq!(editor.remove_node(&other).unwrap(), 1);
        assert!(editor.selected().is_none());
        assert!(editor.graph().edges().is_empty());
    }

    #[tokio::test]
    async fn test_close_flushes_pending_changes() {
        let (store, id) = store_with_agent().await;
        let mut editor = WorkflowEditor::open(&store, &id, &EditorConfig::default())
            .await
            .unwrap();
        editor.add_node(NodeKind::Web, "Web Agent", "", None).unwrap();
        editor.close().await.unwrap();

        assert_eq!(store.get_agent(&id).await.unwrap().nodes.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_node_type_survives_edit_and_save() {
        use crate::storage::{KeyValueStore, MemoryKeyValueStore, STORAGE_KEY};
        use serde_json::{Value, json};
        use std::sync::Arc;

        let raw = json!({
            "state": {
                "agents": [{
                    "id": "legacy",
                    "name": "Legacy",
                    "createdAt": "2024-05-01T10:00:00.000Z",
                    "updatedAt": "2024-05-01T10:00:00.000Z",
                    "nodes": [
                        {
                            "id": "main-agent",
                            "type": "agentNode",
                            "position": { "x": 250, "y": 100 },
                            "data": { "label": "Main Agent", "type": "main", "properties": {} }
                        },
                        {
                            "id": "analytics-1",
                            "type": "agentNode",
                            "position": { "x": 10, "y": 10 },
                            "data": { "label": "Funnel", "type": "analytics", "icon": "chart", "properties": {} }
                        }
                    ],
                    "edges": []
                }],
                "currentAgentId": "legacy"
            },
            "version": 0
        });
        let backend = Arc::new(MemoryKeyValueStore::new());
        backend.set(STORAGE_KEY, &raw.to_string()).await.unwrap();
        let store = AgentStore::open(backend.clone()).await.unwrap();

        let mut editor = WorkflowEditor::open(&store, "legacy", &EditorConfig::default())
            .await
            .unwrap();
        assert_eq!(editor.graph().node("analytics-1").unwrap().type_tag(), "analytics");
        editor.move_node(MAIN_NODE_ID, Position::new(1.0, 1.0)).unwrap();
        editor.save().await.unwrap();
        editor.close().await.unwrap();

        let written: Value =
            serde_json::from_str(&backend.get(STORAGE_KEY).await.unwrap().unwrap()).unwrap();
        let node = &written["state"]["agents"][0]["nodes"][1];
        assert_eq!(node["data"]["type"], "analytics");
        assert_eq!(node["data"]["icon"], "chart");
    }
}
