//! Session configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use timevillage_core::PolicyKind;

/// Settings fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Progression policy used for build / upgrade gating
    pub policy: PolicyKind,
    /// Nickname written to a fresh ledger row
    pub default_nickname: String,
    /// Ticker period; each period counts as one second
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            default_nickname: "Player".to_string(),
            tick_interval_ms: 1000,
        }
    }
}

impl SessionConfig {
    /// Configuration with a specific policy
    pub fn with_policy(policy: PolicyKind) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Ticker period, never zero
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
