//! Dashboard settings, read from `dashboard.json` when present.

use crate::data::{STATE_THRESHOLD, TYPE_THRESHOLD};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{name} must be between 0 and 1 (exclusive), got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV source, read once at startup.
    pub data_path: PathBuf,
    /// States rarer than this are merged into "Other".
    pub state_threshold: f64,
    /// Pollutant types rarer than this are merged into "Other".
    pub type_threshold: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/data.csv"),
            state_threshold: STATE_THRESHOLD,
            type_threshold: TYPE_THRESHOLD,
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Use `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            log::info!("Reading settings from {}", path.display());
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("state_threshold", self.state_threshold),
            ("type_threshold", self.type_threshold),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        Ok(())
    }
}
