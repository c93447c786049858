//! Chat transport configuration

use crate::defaults::DEFAULT_CHAT_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where live answers are streamed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Chat function URL accepting `{messages, context}` and answering with SSE
    pub endpoint: String,
    /// Bearer token sent with every request
    pub api_key: Option<String>,
    /// Overall request timeout. Unset means the core waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: None,
        }
    }
}

impl TransportConfig {
    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
