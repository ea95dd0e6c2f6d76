//! Debounced write-back of an editor's graph
//!
//! Every mutation hands the autosave task a copy of the whole graph. The task
//! keeps only the latest copy and writes it through [`AgentStore::update_agent`]
//! once no further copy has arrived for the configured quiet period.
//!
//! # Lifecycle
//!
//! - `schedule`: replace the pending graph and restart the quiet period
//! - `flush_now`: write a graph immediately and cancel anything pending
//! - `shutdown`: write whatever is pending, then stop the task
//! - dropping the handle closes the channel; the task writes what is pending
//!   and exits on its own

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, sleep_until};
use tracing::{debug, warn};

use super::graph::WorkflowGraph;
use crate::domain::agents::{AgentStore, AgentUpdate};
use crate::error::{Error, Result};

/// When the next write is due
///
/// Touching the schedule moves the deadline to `now + delay`, so a steady
/// stream of touches keeps postponing the write.
#[derive(Debug, Clone)]
pub struct FlushSchedule {
    delay: Duration,
    deadline: Option<Instant>,
}

impl FlushSchedule {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Record a change at `now`
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

enum Command {
    Changed(WorkflowGraph),
    FlushNow(WorkflowGraph, oneshot::Sender<Result<()>>),
    Shutdown(oneshot::Sender<Result<()>>),
}

/// Handle to a running autosave task for one agent
#[derive(Debug)]
pub struct Autosave {
    tx: mpsc::UnboundedSender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl Autosave {
    /// Spawn the task on the current tokio runtime
    pub fn spawn(store: AgentStore, agent_id: impl Into<String>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Worker {
            store,
            agent_id: agent_id.into(),
            schedule: FlushSchedule::new(delay),
            pending: None,
        };
        let handle = tokio::spawn(worker.run(rx));

        Self {
            tx,
            handle: Some(handle),
        }
    }

    /// Replace the pending graph and restart the quiet period
    pub fn schedule(&self, graph: WorkflowGraph) -> Result<()> {
        self.tx
            .send(Command::Changed(graph))
            .map_err(|_| Error::Autosave("autosave task has stopped".to_string()))
    }

    /// Write `graph` now, dropping any pending write
    pub async fn flush_now(&self, graph: WorkflowGraph) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::FlushNow(graph, reply))
            .map_err(|_| Error::Autosave("autosave task has stopped".to_string()))?;
        rx.await
            .map_err(|_| Error::Autosave("autosave task dropped the request".to_string()))?
    }

    /// Write anything pending and wait for the task to exit
    pub async fn shutdown(mut self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Shutdown(reply)).is_err() {
            return Ok(());
        }
        let result = rx
            .await
            .map_err(|_| Error::Autosave("autosave task dropped the request".to_string()))?;

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .map_err(|e| Error::Autosave(format!("autosave task panicked: {e}")))?;
        }
        result
    }
}

struct Worker {
    store: AgentStore,
    agent_id: String,
    schedule: FlushSchedule,
    pending: Option<WorkflowGraph>,
}

impl Worker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        loop {
            let command = match self.schedule.deadline() {
                Some(deadline) => tokio::select! {
                    command = rx.recv() => command,
                    _ = sleep_until(deadline) => {
                        self.flush_pending("quiet period elapsed").await;
                        continue;
                    }
                },
                None => rx.recv().await,
            };

            match command {
                Some(Command::Changed(graph)) => {
                    self.pending = Some(graph);
                    self.schedule.touch(Instant::now());
                }
                Some(Command::FlushNow(graph, reply)) => {
                    self.pending = None;
                    self.schedule.cancel();
                    let _ = reply.send(self.write(graph).await);
                }
                Some(Command::Shutdown(reply)) => {
                    self.schedule.cancel();
                    let result = match self.pending.take() {
                        Some(graph) => self.write(graph).await,
                        None => Ok(()),
                    };
                    let _ = reply.send(result);
                    break;
                }
                None => {
                    self.flush_pending("editor dropped").await;
                    break;
                }
            }
        }
        debug!(agent_id = %self.agent_id, "Autosave task stopped");
    }

    async fn flush_pending(&mut self, reason: &str) {
        self.schedule.cancel();
        if let Some(graph) = self.pending.take() {
            if let Err(e) = self.write(graph).await {
                warn!(agent_id = %self.agent_id, reason, error = %e, "Background graph write failed");
            }
        }
    }

    async fn write(&self, graph: WorkflowGraph) -> Result<()> {
        let (nodes, edges) = graph.into_parts();
        debug!(
            agent_id = %self.agent_id,
            nodes = nodes.len(),
            edges = edges.len(),
            "Writing workflow graph"
        );

        if self
            .store
            .update_agent(&self.agent_id, AgentUpdate::graph(nodes, edges))
            .await?
        {
            Ok(())
        } else {
            Err(Error::AgentNotFound(self.agent_id.clone()))
        }
    }
}
