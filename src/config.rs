//! Global eventbuddy configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration at ~/.config/eventbuddy/config.toml
///
/// Everything has a default, so a missing file is fine.
#[derive(Deserialize, Clone, Default)]
pub struct Config {
    /// Store document location. Defaults to the platform data dir.
    pub data_path: Option<PathBuf>,

    /// Feed document used by `sync` when no --feed is given.
    pub feed_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Could not parse {}", path.display()))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("eventbuddy").join("config.toml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.data_path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().context("Could not determine data directory")?;
        Ok(data_dir.join("eventbuddy").join("store.json"))
    }

    pub fn feed_path(&self) -> Option<PathBuf> {
        self.feed_path.clone()
    }
}
