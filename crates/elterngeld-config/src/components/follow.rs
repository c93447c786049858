//! Auto-follow hysteresis configuration

use crate::defaults::{DEFAULT_DISENGAGE_DISTANCE, DEFAULT_ENGAGE_DISTANCE};
use serde::{Deserialize, Serialize};

/// Distances from the bottom that toggle auto-follow
///
/// `engage_distance` must stay below `disengage_distance`; the gap between the
/// two is what keeps the flag from flickering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowConfig {
    /// Scrolling up beyond this distance turns auto-follow off
    pub disengage_distance: f64,
    /// Coming closer than this distance turns auto-follow back on
    pub engage_distance: f64,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            disengage_distance: DEFAULT_DISENGAGE_DISTANCE,
            engage_distance: DEFAULT_ENGAGE_DISTANCE,
        }
    }
}
