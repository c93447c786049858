//! Scroll anchoring configuration

use crate::defaults::{
    DEFAULT_MAX_MOUNT_ATTEMPTS, DEFAULT_NOISE_THRESHOLD, DEFAULT_TOP_OFFSET, DEFAULT_ZERO_STREAK,
};
use serde::{Deserialize, Serialize};

/// Geometry and debounce settings of the scroll anchor controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Margin between the top of the viewport and an anchored user message
    pub top_offset: f64,
    /// Animation frames to wait for the message pair to mount, counted after
    /// the synchronous attempt that follows the append
    pub max_mount_attempts: u32,
    /// Spacer changes smaller than this are not applied
    pub noise_threshold: f64,
    /// Consecutive non-positive readings needed to stop tracking
    pub zero_streak: u32,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            top_offset: DEFAULT_TOP_OFFSET,
            max_mount_attempts: DEFAULT_MAX_MOUNT_ATTEMPTS,
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            zero_streak: DEFAULT_ZERO_STREAK,
        }
    }
}
