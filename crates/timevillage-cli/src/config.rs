//! RON configuration for the command-line front end

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use timevillage_rules::FetchConfig;
use timevillage_session::SessionConfig;
use timevillage_sync::CloudConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database file; `None` keeps everything in memory
    pub database_path: Option<PathBuf>,
    pub session: SessionConfig,
    pub rules: FetchConfig,
    /// Cloud sync; `None` disables it
    pub cloud: Option<CloudConfig>,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl AppConfig {
    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a RON string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }
}
