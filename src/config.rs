// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Shell configuration.
//!
//! Stored as JSON in `~/.cmdtree/config.json`. Every field has a default, so
//! a missing file or a partial file are both fine.
//!
//! ```json
//! {
//!   "history_size": 100,
//!   "history_file": "/home/me/.cmdtree/history.txt",
//!   "max_stored_history": 1000,
//!   "persist_history": true
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ShellError;
use crate::history::storage::{
    FileHistoryStorage, HistoryStorage, VolatileHistoryStorage, DEFAULT_MAX_STORED,
};
use crate::history::DEFAULT_HISTORY_SIZE;

/// Name of the per-user configuration directory.
const CONFIG_DIR_NAME: &str = ".cmdtree";

/// Config file name in the configuration directory.
const CONFIG_FILE: &str = "config.json";

/// History file name in the configuration directory.
const HISTORY_FILE: &str = "history.txt";

/// Shell configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Entries kept by each session's history
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// History file (default: `~/.cmdtree/history.txt`)
    #[serde(default)]
    pub history_file: Option<PathBuf>,
    /// Entries kept by the persistent history
    #[serde(default = "default_max_stored_history")]
    pub max_stored_history: usize,
    /// Save history across runs (default: true)
    #[serde(default = "default_persist_history")]
    pub persist_history: bool,
}

fn default_history_size() -> usize {
    DEFAULT_HISTORY_SIZE
}

fn default_max_stored_history() -> usize {
    DEFAULT_MAX_STORED
}

fn default_persist_history() -> bool {
    true
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            history_file: None,
            max_stored_history: default_max_stored_history(),
            persist_history: default_persist_history(),
        }
    }
}

/// Per-user configuration directory (`~/.cmdtree`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(CONFIG_DIR_NAME))
}

impl ShellConfig {
    /// Load `~/.cmdtree/config.json`, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?.join(CONFIG_FILE))
    }

    /// Load a config file, falling back to defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Self = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            tracing::debug!("No config file at {:?}, using defaults", path);
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Reject values the shell cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.history_size == 0 {
            return Err(ShellError::InvalidConfig("history_size must be greater than zero".into()).into());
        }
        if self.persist_history && self.max_stored_history == 0 {
            return Err(ShellError::InvalidConfig(
                "max_stored_history must be greater than zero when persist_history is on".into(),
            )
            .into());
        }
        Ok(())
    }

    /// History file in use, if persistence is on and a location is known.
    pub fn history_path(&self) -> Option<PathBuf> {
        if !self.persist_history {
            return None;
        }
        self.history_file
            .clone()
            .or_else(|| config_dir().ok().map(|dir| dir.join(HISTORY_FILE)))
    }

    /// Build the configured history backend.
    pub fn history_storage(&self) -> Box<dyn HistoryStorage> {
        match self.history_path() {
            Some(path) => Box::new(FileHistoryStorage::new(path, self.max_stored_history)),
            None => Box::new(VolatileHistoryStorage::new(self.max_stored_history)),
        }
    }
}
