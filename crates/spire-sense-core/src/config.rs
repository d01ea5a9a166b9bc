//! Listener configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Tunables for the stability detector and wait-condition engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Seconds a visual-stability wait may run before it is force-resolved
    pub visual_stable_timeout_secs: u64,
    /// Room and event wait timers at or below this value count as settled
    pub wait_timer_epsilon: f32,
    /// Gold value the change snapshot starts from after a reset
    pub initial_gold: i32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            visual_stable_timeout_secs: 30,
            wait_timer_epsilon: 0.1,
            initial_gold: 99,
        }
    }
}

impl ListenerConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("spire-sense").join("config.json"))
    }

    /// Load config from disk, falling back to defaults if missing or invalid
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Load config from an explicit path, reporting what went wrong
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the user config directory
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        self.save_to(&path)
    }

    /// Save config to the given path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.visual_stable_timeout_secs == 0 {
            return Err(Error::Config(
                "visual_stable_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if !self.wait_timer_epsilon.is_finite() || self.wait_timer_epsilon < 0.0 {
            return Err(Error::Config(format!(
                "wait_timer_epsilon must be a non-negative number, got {}",
                self.wait_timer_epsilon
            )));
        }
        Ok(())
    }

    pub fn visual_stable_timeout(&self) -> Duration {
        Duration::from_secs(self.visual_stable_timeout_secs)
    }
}
