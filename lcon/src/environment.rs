//! Configuration and XDG paths.

use anyhow::{Context as _, Result};
use lcon_types::log::DEFAULT_MAX_LINES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const APP_NAME: &str = "lcon";
pub const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "lcon.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Commands kept for recall
    pub history_capacity: usize,
    /// Lines kept in the console log
    pub max_log_lines: usize,
    /// Lua file in the config directory run at start-up
    pub init_script: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            history_capacity: crate::history::DEFAULT_CAPACITY,
            max_log_lines: DEFAULT_MAX_LINES,
            init_script: "init.lua".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Load `config.json` from the XDG config directory; defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self> {
        match find_config_file(CONFIG_FILE)? {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("no {} found, using defaults", CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ConsoleConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("loaded config {:?}", config);
        Ok(config)
    }

    /// Path of the init script, if it exists.
    pub fn init_script_path(&self) -> Result<Option<PathBuf>> {
        find_config_file(&self.init_script)
    }
}

fn base_dirs() -> Result<xdg::BaseDirectories> {
    xdg::BaseDirectories::with_prefix(APP_NAME).context("failed get xdg directory")
}

/// Find an existing configuration file.
pub fn find_config_file(name: &str) -> Result<Option<PathBuf>> {
    Ok(base_dirs()?.find_config_file(name))
}

/// Get the path to a state file (e.g. logs).
pub fn get_state_file(name: &str) -> Result<PathBuf> {
    base_dirs()?
        .place_state_file(name)
        .context("failed get path")
}
