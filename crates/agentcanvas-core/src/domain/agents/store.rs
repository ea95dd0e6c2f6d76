//! Agent store: the single source of truth for agent records
//!
//! The store keeps every [`Agent`] plus the current-selection pointer in memory
//! and rewrites the whole snapshot through its [`KeyValueStore`] after every
//! mutation. Mutations are applied in memory first; if the write fails the
//! error is returned but the in-memory state keeps the change.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::clock::{Clock, SystemClock, next_timestamp};
use super::entity::{Agent, AgentStatus, AgentUpdate, NewAgent};
use super::snapshot::{self, StoreSnapshot};
use crate::error::{Error, Result};
use crate::storage::{KeyValueStore, MemoryKeyValueStore, STORAGE_KEY};

/// Shared handle to the agent collection
///
/// Cloning is cheap; clones observe the same state and storage.
#[derive(Clone)]
pub struct AgentStore {
    state: Arc<RwLock<StoreSnapshot>>,
    backend: Arc<dyn KeyValueStore>,
    key: Arc<str>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AgentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentStore")
            .field("backend", &self.backend.backend_name())
            .field("key", &self.key)
            .finish()
    }
}

/// Builder for [`AgentStore`]
pub struct AgentStoreBuilder {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    clock: Arc<dyn Clock>,
}

impl AgentStoreBuilder {
    /// Store the snapshot under a different key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Load the persisted snapshot (once) and build the store
    ///
    /// Agent records that do not parse are skipped and the rest load; a
    /// document that cannot be read at all leaves the store empty. In both
    /// cases the stored text is copied to [`snapshot::backup_key`] before
    /// anything overwrites it. A snapshot written by a newer version is
    /// refused.
    pub async fn open(self) -> Result<AgentStore> {
        let initial = match self.backend.get(&self.key).await? {
            None => StoreSnapshot::default(),
            Some(raw) => {
                let (initial, lossy) = match snapshot::decode(&raw) {
                    Ok(decoded) => {
                        for reason in &decoded.skipped {
                            warn!(key = %self.key, %reason, "Skipping unreadable agent record");
                        }
                        let lossy = decoded.is_lossy();
                        (decoded.snapshot, lossy)
                    }
                    Err(Error::CorruptSnapshot(reason)) => {
                        warn!(key = %self.key, %reason, "Discarding unreadable agent snapshot");
                        (StoreSnapshot::default(), true)
                    }
                    Err(other) => return Err(other),
                };
                if lossy {
                    let backup = snapshot::backup_key(&self.key);
                    self.backend.set(&backup, &raw).await?;
                    warn!(key = %backup, bytes = raw.len(), "Saved a copy of the stored snapshot");
                }
                initial
            }
        };

        info!(
            key = %self.key,
            backend = self.backend.backend_name(),
            agents = initial.agents.len(),
            "Opened agent store"
        );

        Ok(AgentStore {
            state: Arc::new(RwLock::new(initial)),
            backend: self.backend,
            key: Arc::from(self.key),
            clock: self.clock,
        })
    }
}

impl AgentStore {
    /// Start building a store over `backend`
    pub fn builder(backend: Arc<dyn KeyValueStore>) -> AgentStoreBuilder {
        AgentStoreBuilder {
            backend,
            key: STORAGE_KEY.to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Open a store over `backend` with the default key and clock
    pub async fn open(backend: Arc<dyn KeyValueStore>) -> Result<Self> {
        Self::builder(backend).open().await
    }

    /// Fresh store over an in-memory backend
    pub async fn in_memory() -> Result<Self> {
        Self::open(Arc::new(MemoryKeyValueStore::new())).await
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Key an unreadable snapshot is copied to on open
    pub fn backup_key(&self) -> String {
        snapshot::backup_key(&self.key)
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    // ========== Mutations ==========

    /// Create a draft agent with an empty graph and make it current
    pub async fn create_agent(&self, new_agent: NewAgent) -> Result<String> {
        let mut state = self.state.write().await;

        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if !state.contains(&candidate) {
                break candidate;
            }
        };

        let now = next_timestamp(self.clock.as_ref(), None);
        let NewAgent {
            name,
            description,
            domain,
            subdomains,
            capabilities,
            integrations,
        } = new_agent;

        state.agents.push(Agent {
            id: id.clone(),
            name,
            description,
            domain,
            subdomains,
            capabilities,
            integrations,
            created_at: now,
            updated_at: now,
            status: AgentStatus::Draft,
            nodes: Vec::new(),
            edges: Vec::new(),
        });
        state.current_agent_id = Some(id.clone());

        info!(agent_id = %id, "Created agent");
        self.persist(&state).await?;
        Ok(id)
    }

    /// Replace the supplied fields on agent `id`
    ///
    /// Returns `false` without writing anything if no agent matches.
    pub async fn update_agent(&self, id: &str, update: AgentUpdate) -> Result<bool> {
        let mut state = self.state.write().await;

        let Some(agent) = state.find_mut(id) else {
            debug!(agent_id = %id, "Skipping update for unknown agent");
            return Ok(false);
        };

        agent.apply(update);
        agent.updated_at = next_timestamp(self.clock.as_ref(), Some(agent.updated_at));
        debug!(agent_id = %id, updated_at = %agent.updated_at, "Updated agent");

        self.persist(&state).await?;
        Ok(true)
    }

    /// Remove agent `id`, clearing the selection if it pointed there
    ///
    /// Returns `false` without writing anything if no agent matches.
    pub async fn delete_agent(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;

        let before = state.agents.len();
        state.agents.retain(|agent| agent.id != id);
        if state.agents.len() == before {
            debug!(agent_id = %id, "Skipping delete for unknown agent");
            return Ok(false);
        }

        if state.current_agent_id.as_deref() == Some(id) {
            state.current_agent_id = None;
        }

        info!(agent_id = %id, "Deleted agent");
        self.persist(&state).await?;
        Ok(true)
    }

    /// Point the current selection at `id`
    ///
    /// The id is not checked; [`AgentStore::current_agent`] resolves it lazily.
    pub async fn set_current_agent(&self, id: impl Into<String>) -> Result<()> {
        let id = id.into();
        let mut state = self.state.write().await;

        if !state.contains(&id) {
            warn!(agent_id = %id, "Selecting an agent that does not exist");
        }
        state.current_agent_id = Some(id);

        self.persist(&state).await
    }

    // ========== Queries ==========

    /// The agent the selection points at, if it exists
    pub async fn current_agent(&self) -> Option<Agent> {
        self.state.read().await.current().cloned()
    }

    pub async fn current_agent_id(&self) -> Option<String> {
        self.state.read().await.current_agent_id.clone()
    }

    pub async fn get_agent(&self, id: &str) -> Option<Agent> {
        self.state.read().await.find(id).cloned()
    }

    /// All agents in creation order
    pub async fn list_agents(&self) -> Vec<Agent> {
        self.state.read().await.agents.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.agents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.agents.is_empty()
    }

    /// Copy of the full in-memory state
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }

    /// Rewrite the persisted snapshot from memory
    pub async fn flush(&self) -> Result<()> {
        let state = self.state.read().await;
        self.persist(&state).await
    }

    async fn persist(&self, state: &StoreSnapshot) -> Result<()> {
        let raw = snapshot::encode(state)?;
        self.backend.set(&self.key, &raw).await.inspect_err(|e| {
            warn!(key = %self.key, error = %e, "Failed to persist agent snapshot");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agents::clock::ManualClock;
    use crate::domain::workflow::{Node, NodeKind, Position};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn tracker() -> NewAgent {
        NewAgent::new("Tracker", "Tracks prices", "finance")
            .with_subdomains(["Smart Portfolio Optimizer Agent"])
    }

    /// Backend whose writes can be switched off
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryKeyValueStore,
        failing: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Storage("quota exceeded".to_string()));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key).await
        }

        fn backend_name(&self) -> &'static str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn test_create_agent_scenario() {
        let store = AgentStore::in_memory().await.unwrap();

        let id = store.create_agent(tracker()).await.unwrap();
        let current = store.current_agent().await.expect("current agent");

        assert_eq!(current.id, id);
        assert_eq!(current.status, AgentStatus::Draft);
        assert!(current.nodes.is_empty());
        assert!(current.edges.is_empty());
        assert_eq!(current.name, "Tracker");
        assert_eq!(current.description, "Tracks prices");
        assert_eq!(current.domain, "finance");
        assert_eq!(current.subdomains, vec!["Smart Portfolio Optimizer Agent"]);
        assert_eq!(current.created_at, current.updated_at);
    }

    #[tokio::test]
    async fn test_create_agent_ids_are_fresh() {
        let store = AgentStore::in_memory().await.unwrap();

        let mut ids = Vec::new();
        for _ in 0..25 {
            ids.push(store.create_agent(tracker()).await.unwrap());
        }
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();

        assert_eq!(unique.len(), ids.len());
        assert_eq!(store.current_agent_id().await.as_deref(), ids.last().map(String::as_str));
    }

    #[tokio::test]
    async fn test_update_strictly_advances_timestamp() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        ));
        let store = AgentStore::builder(Arc::new(MemoryKeyValueStore::new()))
            .clock(clock.clone())
            .open()
            .await
            .unwrap();

        let id = store.create_agent(tracker()).await.unwrap();
        let mut last = store.get_agent(&id).await.unwrap().updated_at;

        // The clock never moves, so every update must bump on its own
        for n in 0..5 {
            assert!(store
                .update_agent(&id, AgentUpdate::new().name(format!("v{n}")))
                .await
                .unwrap());
            let agent = store.get_agent(&id).await.unwrap();
            assert!(agent.updated_at > last);
            last = agent.updated_at;
        }

        let agent = store.get_agent(&id).await.unwrap();
        assert_eq!(agent.name, "v4");
        assert!(agent.created_at < agent.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_agent_is_noop() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = AgentStore::open(backend.clone()).await.unwrap();

        assert!(!store
            .update_agent("missing", AgentUpdate::new().name("x"))
            .await
            .unwrap());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_replaces_graph() {
        let store = AgentStore::in_memory().await.unwrap();
        let id = store.create_agent(tracker()).await.unwrap();

        let node = Node::new("data-1", NodeKind::Data, "Data Source", Position::new(3.0, 4.0));
        store
            .update_agent(&id, AgentUpdate::graph(vec![node.clone()], vec![]))
            .await
            .unwrap();

        let agent = store.get_agent(&id).await.unwrap();
        assert_eq!(agent.nodes, vec![node]);
        assert_eq!(agent.name, "Tracker");
    }

    #[tokio::test]
    async fn test_delete_current_clears_selection() {
        let store = AgentStore::in_memory().await.unwrap();
        let first = store.create_agent(tracker()).await.unwrap();
        let second = store.create_agent(tracker()).await.unwrap();

        assert_eq!(store.current_agent_id().await.as_deref(), Some(second.as_str()));
        assert!(store.delete_agent(&second).await.unwrap());

        assert_eq!(store.current_agent_id().await, None);
        assert!(store.current_agent().await.is_none());
        assert_eq!(store.len().await, 1);
        assert!(store.get_agent(&first).await.is_some());
    }

    #[tokio::test]
    async fn test_delete_other_keeps_selection() {
        let store = AgentStore::in_memory().await.unwrap();
        let first = store.create_agent(tracker()).await.unwrap();
        let second = store.create_agent(tracker()).await.unwrap();

        assert!(store.delete_agent(&first).await.unwrap());
        assert_eq!(store.current_agent_id().await.as_deref(), Some(second.as_str()));

        assert!(!store.delete_agent(&first).await.unwrap());
        assert_eq!(store.current_agent_id().await.as_deref(), Some(second.as_str()));
    }

    #[tokio::test]
    async fn test_set_current_accepts_unknown_id() {
        let store = AgentStore::in_memory().await.unwrap();
        let id = store.create_agent(tracker()).await.unwrap();

        store.set_current_agent("nobody").await.unwrap();
        assert_eq!(store.current_agent_id().await.as_deref(), Some("nobody"));
        assert!(store.current_agent().await.is_none());

        store.set_current_agent(id.clone()).await.unwrap();
        assert_eq!(store.current_agent().await.map(|a| a.id), Some(id));
    }

    #[tokio::test]
    async fn test_reopen_restores_collection_and_selection() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = AgentStore::open(backend.clone()).await.unwrap();

        let first = store.create_agent(tracker()).await.unwrap();
        store
            .create_agent(NewAgent::new("Coach", "Plans study time", "education"))
            .await
            .unwrap();
        store.set_current_agent(first.clone()).await.unwrap();
        store
            .update_agent(&first, AgentUpdate::new().status(AgentStatus::Ready))
            .await
            .unwrap();
        let before = store.snapshot().await;
        drop(store);

        let reopened = AgentStore::open(backend).await.unwrap();
        assert_eq!(reopened.snapshot().await, before);
        assert_eq!(reopened.current_agent().await.map(|a| a.id), Some(first));
    }

    #[tokio::test]
    async fn test_custom_key_is_used() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = AgentStore::builder(backend.clone())
            .key("other-agents")
            .open()
            .await
            .unwrap();
        store.create_agent(tracker()).await.unwrap();

        assert!(backend.get("other-agents").await.unwrap().is_some());
        assert!(backend.get(STORAGE_KEY).await.unwrap().is_none());
        assert_eq!(store.storage_key(), "other-agents");
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_empty() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        backend.set(STORAGE_KEY, "{{{").await.unwrap();

        let store = AgentStore::open(backend.clone()).await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(
            backend.get(&store.backup_key()).await.unwrap().as_deref(),
            Some("{{{")
        );
    }

    #[tokio::test]
    async fn test_clean_snapshot_writes_no_backup() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = AgentStore::open(backend.clone()).await.unwrap();
        store.create_agent(tracker()).await.unwrap();

        let reopened = AgentStore::open(backend.clone()).await.unwrap();
        assert_eq!(reopened.len().await, 1);
        assert!(backend.get(&reopened.backup_key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_numeric_property_survives_reopen_and_create() {
        let raw = serde_json::json!({
            "state": {
                "agents": [{
                    "id": "legacy",
                    "name": "Legacy",
                    "updatedAt": "2024-05-01T10:00:00.000Z",
                    "nodes": [{
                        "id": "web-1",
                        "type": "agentNode",
                        "position": { "x": 0, "y": 0 },
                        "data": { "label": "Crawler", "type": "web", "properties": { "depth": 2 } }
                    }],
                    "edges": []
                }],
                "currentAgentId": "legacy"
            },
            "version": 0
        })
        .to_string();
        let backend = Arc::new(MemoryKeyValueStore::new());
        backend.set(STORAGE_KEY, &raw).await.unwrap();

        let store = AgentStore::open(backend.clone()).await.unwrap();
        store.create_agent(tracker()).await.unwrap();

        let reopened = AgentStore::open(backend.clone()).await.unwrap();
        assert_eq!(reopened.len().await, 2);
        let legacy = reopened.get_agent("legacy").await.expect("legacy agent kept");
        assert_eq!(
            legacy.nodes[0].data.properties.get("depth").map(String::as_str),
            Some("2")
        );
        assert!(backend.get(&reopened.backup_key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_agent_is_skipped_and_backed_up() {
        let raw = serde_json::json!({
            "state": {
                "agents": [
                    { "id": "good", "name": "Kept", "updatedAt": "2024-05-01T10:00:00.000Z" },
                    { "id": "bad", "name": "Broken", "nodes": "oops" }
                ],
                "currentAgentId": "good"
            },
            "version": 0
        })
        .to_string();
        let backend = Arc::new(MemoryKeyValueStore::new());
        backend.set(STORAGE_KEY, &raw).await.unwrap();

        let store = AgentStore::open(backend.clone()).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.current_agent_id().await.as_deref(), Some("good"));
        assert_eq!(
            backend.get(&store.backup_key()).await.unwrap().as_deref(),
            Some(raw.as_str())
        );

        store.create_agent(tracker()).await.unwrap();
        let reopened = AgentStore::open(backend.clone()).await.unwrap();
        assert_eq!(reopened.len().await, 2);
        assert_eq!(
            backend.get(&reopened.backup_key()).await.unwrap().as_deref(),
            Some(raw.as_str())
        );
    }

    #[tokio::test]
    async fn test_backup_failure_aborts_open() {
        let backend = Arc::new(FlakyStore::default());
        backend.inner.set(STORAGE_KEY, "not json").await.unwrap();
        backend.failing.store(true, Ordering::SeqCst);

        let err = AgentStore::open(backend.clone()).await.unwrap_err();
        assert!(err.is_storage());
        assert_eq!(
            backend.get(STORAGE_KEY).await.unwrap().as_deref(),
            Some("not json")
        );
    }

    #[tokio::test]
    async fn test_newer_snapshot_version_is_refused() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        backend
            .set(STORAGE_KEY, r#"{"state":{"agents":[]},"version":99}"#)
            .await
            .unwrap();

        let result = AgentStore::open(backend).await;
        assert!(matches!(
            result,
            Err(Error::UnsupportedSnapshotVersion { found: 99, .. })
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_but_keeps_memory() {
        let backend = Arc::new(FlakyStore::default());
        let store = AgentStore::open(backend.clone()).await.unwrap();
        let id = store.create_agent(tracker()).await.unwrap();

        backend.failing.store(true, Ordering::SeqCst);
        let err = store
            .update_agent(&id, AgentUpdate::new().name("Renamed"))
            .await
            .unwrap_err();
        assert!(err.is_storage());
        assert_eq!(store.get_agent(&id).await.unwrap().name, "Renamed");

        backend.failing.store(false, Ordering::SeqCst);
        store.flush().await.unwrap();
        let reopened = AgentStore::open(backend).await.unwrap();
        assert_eq!(reopened.get_agent(&id).await.unwrap().name, "Renamed");
    }
}
