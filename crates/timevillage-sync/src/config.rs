//! Cloud sync configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote user document settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Base URL of the document store; documents live at `{base_url}/users/{id}`
    pub base_url: String,
    /// Signed-in user; `None` means signed out
    pub user_id: Option<String>,
    /// Bearer token sent with every request
    pub auth_token: Option<String>,
    pub timeout_ms: u64,
    /// Push after every village change
    pub auto_push: bool,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            user_id: None,
            auth_token: None,
            timeout_ms: 10_000,
            auto_push: true,
        }
    }
}

impl CloudConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
