//! Persisted form of the agent store
//!
//! The whole collection and the current-selection pointer are written as one
//! JSON document:
//!
//! ```text
//! {"state":{"agents":[...],"currentAgentId":"..."},"version":0}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::Agent;
use crate::error::{Error, Result};

/// Envelope version written by this build
pub const SNAPSHOT_VERSION: u32 = 0;

/// In-memory state of the agent store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub current_agent_id: Option<String>,
}

impl StoreSnapshot {
    pub fn find(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|agent| agent.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn current(&self) -> Option<&Agent> {
        self.current_agent_id
            .as_deref()
            .and_then(|id| self.find(id))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<S> {
    state: S,
    #[serde(default)]
    version: u32,
}

/// Serialize a snapshot into its stored form
pub fn encode(snapshot: &StoreSnapshot) -> Result<String> {
    let envelope = Envelope {
        state: snapshot,
        version: SNAPSHOT_VERSION,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// A decoded snapshot plus the records that had to be left out
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decoded {
    pub snapshot: StoreSnapshot,
    /// One reason per skipped record
    pub skipped: Vec<String>,
}

impl Decoded {
    /// Whether anything in the stored document was dropped
    pub fn is_lossy(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Parse a stored document back into a snapshot
///
/// Agents are read one at a time: a record that does not parse is reported
/// in [`Decoded::skipped`] and the rest still load. Only a document whose
/// envelope or agent list cannot be read at all is a [`Error::CorruptSnapshot`].
pub fn decode(raw: &str) -> Result<Decoded> {
    let envelope: Envelope<Value> =
        serde_json::from_str(raw).map_err(|e| Error::CorruptSnapshot(e.to_string()))?;

    if envelope.version > SNAPSHOT_VERSION {
        return Err(Error::UnsupportedSnapshotVersion {
            found: envelope.version,
            supported: SNAPSHOT_VERSION,
        });
    }

    let Value::Object(mut state) = envelope.state else {
        return Err(Error::CorruptSnapshot("state is not an object".to_string()));
    };

    let records = match state.remove("agents") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(records)) => records,
        Some(other) => {
            return Err(Error::CorruptSnapshot(format!(
                "agents must be an array, found {}",
                json_type(&other)
            )));
        }
    };

    let mut decoded = Decoded::default();
    for (index, record) in records.into_iter().enumerate() {
        match decode_agent(record) {
            Ok(agent) => decoded.snapshot.agents.push(agent),
            Err(reason) => decoded.skipped.push(format!("agent #{index}: {reason}")),
        }
    }

    decoded.snapshot.current_agent_id = match state.remove("currentAgentId") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id),
        Some(other) => {
            decoded.skipped.push(format!(
                "currentAgentId must be a string, found {}",
                json_type(&other)
            ));
            None
        }
    };

    Ok(decoded)
}

fn decode_agent(mut record: Value) -> std::result::Result<Agent, String> {
    let id = record
        .get("id")
        .and_then(Value::as_str)
        .map(|id| format!(" ({id})"))
        .unwrap_or_default();

    // Older records may lack a creation time; fall back to the last update
    if let Value::Object(fields) = &mut record {
        if !fields.contains_key("createdAt") {
            if let Some(updated) = fields.get("updatedAt").cloned() {
                fields.insert("createdAt".to_string(), updated);
            }
        }
    }

    serde_json::from_value(record).map_err(|e| format!("{e}{id}"))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Side key holding an unreadable snapshot before it is first overwritten
pub fn backup_key(key: &str) -> String {
    format!("{key}.corrupt")
}
