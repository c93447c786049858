//! Auto-follow tracking
//!
//! Decides from user scroll events whether new content should be revealed
//! automatically. Scrolling up far from the bottom turns following off; coming
//! close to the bottom turns it back on. The gap between the two distances
//! keeps the flag from flickering.
//!
//! Programmatic scrolls go through [`AutoFollowTracker::scroll_programmatically`],
//! which holds the [`ScrollToken`] while the resulting scroll event is
//! delivered, so that event only refreshes the position baseline.

use crate::scroll::ScrollToken;
use crate::viewport::{ScrollMetrics, Viewport};
use elterngeld_config::FollowConfig;
use tracing::debug;

/// What a scroll event did to the auto-follow flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowChange {
    /// Event came from a programmatic scroll
    Suppressed,
    Unchanged,
    Engaged,
    Disengaged,
}

/// Tracks whether the user wants new content revealed
#[derive(Debug, Clone)]
pub struct AutoFollowTracker {
    config: FollowConfig,
    auto_follow: bool,
    token: ScrollToken,
    last_scroll_top: f64,
}

impl AutoFollowTracker {
    pub fn new(config: FollowConfig) -> Self {
        Self {
            config,
            auto_follow: true,
            token: ScrollToken::Free,
            last_scroll_top: 0.0,
        }
    }

    pub fn auto_follow(&self) -> bool {
        self.auto_follow
    }

    /// Whether the host should offer a "jump to bottom" control
    pub fn show_jump_to_bottom(&self) -> bool {
        !self.auto_follow
    }

    pub fn token(&self) -> ScrollToken {
        self.token
    }

    /// Turn following on unconditionally (new submission, jump to bottom)
    pub fn engage(&mut self) {
        self.auto_follow = true;
    }

    /// Handle a scroll event reported by the container
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> FollowChange {
        let upward = metrics.scroll_top < self.last_scroll_top;
        self.last_scroll_top = metrics.scroll_top;

        if self.token.is_held() {
            return FollowChange::Suppressed;
        }

        let distance = metrics.distance_from_bottom();
        let was_following = self.auto_follow;

        if upward && distance > self.config.disengage_distance {
            self.auto_follow = false;
        }
        if distance < self.config.engage_distance {
            self.auto_follow = true;
        }

        match (was_following, self.auto_follow) {
            (true, false) => {
                debug!(distance, "User scrolled away, auto-follow off");
                FollowChange::Disengaged
            }
            (false, true) => {
                debug!(distance, "User returned to bottom, auto-follow on");
                FollowChange::Engaged
            }
            _ => FollowChange::Unchanged,
        }
    }

    /// Scroll on behalf of the application without it counting as user intent
    pub fn scroll_programmatically<V: Viewport + ?Sized>(&mut self, viewport: &mut V, top: f64) {
        self.token.hold();
        if let Some(event) = viewport.scroll_to(top) {
            self.on_scroll(event);
        }
        self.token.release();
    }

    /// Refresh the position baseline after the container moved on its own,
    /// e.g. when a shrinking spacer clamped the scroll offset.
    pub fn resync(&mut self, metrics: ScrollMetrics) {
        self.last_scroll_top = metrics.scroll_top;
    }
}

impl Default for AutoFollowTracker {
    fn default() -> Self {
        Self::new(FollowConfig::default())
    }
}
