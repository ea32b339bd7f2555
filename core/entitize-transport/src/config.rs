use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the save transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Base URL that relative update endpoints (e.g. `/Tables/UpdateTable`)
    /// are joined onto. Absolute `http(s)://` endpoints ignore it.
    pub base_url: Option<String>,
    /// Per-request timeout (in seconds). Must be non-zero.
    pub timeout_secs: u64,
    /// Extra attempts after a transport error or 5xx response.
    pub max_retries: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            max_retries: 0,
        }
    }
}

impl TransportConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
