// Player configuration

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// Per-player settings. Hosts may supply them as JSON; missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Minimum spacing between buffering notifications to host callbacks
    pub buffering_throttle_ms: u64,
    /// Maximum log level: "off", "error", "warn", "info", "debug" or "trace"
    pub log_level: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            buffering_throttle_ms: 250,
            log_level: "debug".to_string(),
        }
    }
}

impl PlayerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.log_level_filter()?;
        Ok(config)
    }

    pub fn log_level_filter(&self) -> Result<log::LevelFilter> {
        self.log_level
            .parse::<log::LevelFilter>()
            .map_err(|_| PlaybackError::Config(format!("unknown log level '{}'", self.log_level)))
    }
}
