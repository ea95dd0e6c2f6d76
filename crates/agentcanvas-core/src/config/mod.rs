//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage::STORAGE_KEY;

/// AgentCanvas configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file holding the key-value store; `None` means the platform data dir
    pub database_path: Option<PathBuf>,
    /// Key the agent snapshot is stored under
    pub storage_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Quiet period before the editor writes its graph back
    pub autosave_delay_ms: u64,
    pub default_node_x: f64,
    pub default_node_y: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            editor: EditorConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            storage_key: STORAGE_KEY.to_string(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: 1000,
            default_node_x: 250.0,
            default_node_y: 100.0,
        }
    }
}

impl StorageConfig {
    /// Resolve the database path, falling back to the platform data directory
    pub fn resolved_database_path(&self) -> PathBuf {
        match &self.database_path {
            Some(path) => path.clone(),
            None => crate::storage::default_database_path(),
        }
    }
}

impl EditorConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("AGENTCANVAS_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("agentcanvas")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or return defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.storage.storage_key.trim().is_empty() {
            return Err(anyhow!("storage.storage_key must not be empty"));
        }
        if self.editor.autosave_delay_ms == 0 {
            return Err(anyhow!("editor.autosave_delay_ms must be greater than zero"));
        }
        if !self.editor.default_node_x.is_finite() || !self.editor.default_node_y.is_finite() {
            return Err(anyhow!("editor default node position must be finite"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            // Storage settings
            "storage.database_path" => Ok(self
                .storage
                .resolved_database_path()
                .display()
                .to_string()),
            "storage.storage_key" => Ok(self.storage.storage_key.clone()),

            // Editor settings
            "editor.autosave_delay_ms" => Ok(self.editor.autosave_delay_ms.to_string()),
            "editor.default_node_x" => Ok(self.editor.default_node_x.to_string()),
            "editor.default_node_y" => Ok(self.editor.default_node_y.to_string()),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `agentcanvas config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "storage.database_path" => {
                let value = value.trim();
                self.storage.database_path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "storage.storage_key" => {
                if value.trim().is_empty() {
                    return Err(anyhow!("Storage key must not be empty"));
                }
                self.storage.storage_key = value.trim().to_string();
            }
            "editor.autosave_delay_ms" => {
                let delay: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid autosave_delay_ms value: {}", value))?;
                if delay == 0 {
                    return Err(anyhow!("Autosave delay must be greater than zero"));
                }
                self.editor.autosave_delay_ms = delay;
            }
            "editor.default_node_x" => {
                self.editor.default_node_x = parse_coordinate(value)?;
            }
            "editor.default_node_y" => {
                self.editor.default_node_y = parse_coordinate(value)?;
            }
            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `agentcanvas config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec![
            "storage.database_path",
            "storage.storage_key",
            "editor.autosave_delay_ms",
            "editor.default_node_x",
            "editor.default_node_y",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

fn parse_coordinate(value: &str) -> anyhow::Result<f64> {
    let coordinate: f64 = value
        .parse()
        .with_context(|| format!("Invalid coordinate value: {}", value))?;
    if !coordinate.is_finite() {
        return Err(anyhow!("Coordinate must be a finite number"));
    }
    Ok(coordinate)
}
