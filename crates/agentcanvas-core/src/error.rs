//! Error types for AgentCanvas

use thiserror::Error;

/// Result type alias using AgentCanvas's Error
pub type Result<T> = std::result::Result<T, Error>;

/// AgentCanvas error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("Agent '{0}' not found. Run `agentcanvas agents list` to see all agents.")]
    AgentNotFound(String),

    #[error("Node '{0}' not found. Run `agentcanvas graph show` to see the agent's nodes.")]
    NodeNotFound(String),

    // Storage errors (E400-E499)
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored agent snapshot is corrupt: {0}")]
    CorruptSnapshot(String),

    #[error("Stored agent snapshot has version {found}, but this build only understands up to {supported}")]
    UnsupportedSnapshotVersion { found: u32, supported: u32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Editor errors (E1000-E1099)
    #[error("Autosave failed: {0}")]
    Autosave(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::AgentNotFound(_) => "E001",
            Self::NodeNotFound(_) => "E002",
            Self::Storage(_) => "E400",
            Self::Database(_) => "E401",
            Self::CorruptSnapshot(_) => "E402",
            Self::UnsupportedSnapshotVersion { .. } => "E403",
            Self::Serialization(_) => "E404",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Autosave(_) => "E1000",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::AgentNotFound(_) => Some("agentcanvas agents list".to_string()),
            Self::NodeNotFound(_) => Some("agentcanvas graph show <agent-id>".to_string()),
            Self::Storage(_) | Self::Database(_) => Some("agentcanvas doctor".to_string()),
            Self::UnsupportedSnapshotVersion { .. } => {
                Some("Upgrade agentcanvas to read this data".to_string())
            }
            Self::ConfigError(_) => Some("agentcanvas config list".to_string()),
            _ => None,
        }
    }

    /// Whether the error came from the storage port rather than from the caller
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Storage(_)
                | Self::Database(_)
                | Self::CorruptSnapshot(_)
                | Self::UnsupportedSnapshotVersion { .. }
                | Self::Io(_)
        )
    }
}
