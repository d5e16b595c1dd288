//! Configuration loading and management
//!
//! Handles parsing of the taskpad `config.toml`, looked up in the platform
//! config directory unless a path is given explicitly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::task::Filter;

const QUALIFIER: &str = "";
const ORGANIZATION: &str = "";
const APPLICATION: &str = "taskpad";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Input boundary configuration
    #[serde(default)]
    pub input: InputConfig,

    /// Presentation defaults
    #[serde(default)]
    pub ui: UiConfig,
}

/// Storage-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the task storage file; defaults to the platform data dir
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Input boundary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Maximum task text length in UTF-16 code units
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,
}

fn default_max_text_len() -> usize {
    200
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_text_len: default_max_text_len(),
        }
    }
}

/// Presentation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Filter applied when none is requested: all, active, or completed
    #[serde(default = "default_filter")]
    pub default_filter: String,
}

fn default_filter() -> String {
    "all".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_filter: default_filter(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default config location, or return defaults when the
    /// file is absent or unreadable
    pub fn load_default() -> Self {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the task storage file path
    pub fn storage_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.storage.path {
            return Ok(path.clone());
        }
        let dirs = directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or_else(|| {
                Error::OperationFailed("could not resolve a platform data directory".to_string())
            })?;
        Ok(dirs.data_dir().join("tasks.json"))
    }

    /// The validated default filter
    pub fn default_filter(&self) -> Filter {
        Filter::parse(&self.ui.default_filter).unwrap_or_default()
    }

    fn validate(&self) -> Result<()> {
        if self.input.max_text_len == 0 {
            return Err(Error::InvalidConfig(
                "input.max_text_len must be > 0".to_string(),
            ));
        }
        if Filter::parse(&self.ui.default_filter).is_err() {
            return Err(Error::InvalidConfig(format!(
                "ui.default_filter '{}' is not one of all|active|completed",
                self.ui.default_filter
            )));
        }
        Ok(())
    }
}

/// Path to the default config file, when the platform exposes one
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
