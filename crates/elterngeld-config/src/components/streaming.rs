//! Stream flusher configuration

use crate::defaults::DEFAULT_FLUSH_INTERVAL_MS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cadence of the visible reveal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Fixed period between two flusher ticks
    pub flush_interval_ms: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
        }
    }
}

impl StreamingConfig {
    /// Tick period as a `Duration`
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}
