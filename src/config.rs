//! Configuration loading and management
//!
//! Handles parsing of `taskboard.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::query::DEFAULT_SORT;

/// File looked for in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "taskboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Where tasks live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Listing defaults
    #[serde(default)]
    pub tasks: TasksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file on disk
    #[default]
    File,
    /// Seeded list held in the process
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Task file for the `file` backend
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Write through a temp file and rename
    #[serde(default)]
    pub atomic_write: bool,

    /// Hold `<path>.lock` across each read-modify-write
    #[serde(default)]
    pub lock: bool,

    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_path() -> PathBuf {
    PathBuf::from("tasks.json")
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_path(),
            atomic_write: false,
            lock: false,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Sort key used when the request has no `sort_by`
    #[serde(default = "default_sort")]
    pub default_sort: String,
}

fn default_sort() -> String {
    DEFAULT_SORT.to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_sort: default_sort(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `taskboard.toml` from `dir`, or return defaults when it is absent.
    ///
    /// A file that exists but does not parse is an error: the config picks the
    /// task file, so falling back would send writes somewhere else.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(&config_path)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.server.bind.trim().is_empty() {
            return Err(Error::InvalidConfig("server.bind must not be empty".to_string()));
        }
        if self.storage.backend == StorageBackend::File && self.storage.path.as_os_str().is_empty()
        {
            return Err(Error::InvalidConfig(
                "storage.path must not be empty for the file backend".to_string(),
            ));
        }
        if self.tasks.default_sort.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "tasks.default_sort must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
