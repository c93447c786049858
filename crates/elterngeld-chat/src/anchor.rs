//! Scroll anchor controller
//!
//! Keeps a just-sent user message pinned near the top of the viewport while
//! the answer streams in below it.
//!
//! ```text
//!   Idle --begin--> Anchoring --elements mounted--> Tracking --spacer at 0--> Settled
//!                      |  ^                            |                       |
//!                      |  '-- animation frame retry    '---- stream ended -----'
//!                      '-- gave up after N frames --> Idle
//! ```
//!
//! A settle requested while still anchoring is remembered: the anchor is
//! applied once the elements mount and then settles right away.
//!
//! Anchoring computes a synthetic spacer after the assistant message so the
//! user message can be scrolled to the top even when little content follows
//! it. While tracking, the spacer shrinks as the answer grows.

use crate::follow::AutoFollowTracker;
use crate::scroll::ScrollMath;
use crate::viewport::{SpacerTransition, Viewport};
use elterngeld_config::AnchorConfig;
use elterngeld_core::MessageId;
use tracing::{debug, trace};

/// The message pair whose scroll position still has to be established
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnchor {
    pub user_id: MessageId,
    pub assistant_id: MessageId,
    /// Failed attempts to find both elements
    failures: u32,
    /// Streaming ended before the anchor could be applied
    settle_requested: bool,
}

/// An applied anchor whose spacer follows the growing answer
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingAnchor {
    pub user_id: MessageId,
    pub assistant_id: MessageId,
    /// Spacer height last applied
    pub spacer: f64,
    /// Consecutive readings with no spacer required
    zero_streak: u32,
    /// Assistant height at the previous reading
    assistant_height: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnchorState {
    #[default]
    Idle,
    Anchoring(PendingAnchor),
    Tracking(TrackingAnchor),
    Settled,
}

/// Result of an anchoring attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorOutcome {
    Anchored { scroll_top: f64, spacer: f64 },
    /// Elements are not mounted yet; retry on the next animation frame
    Deferred,
    /// Elements never appeared; the anchor was dropped
    GaveUp,
    /// Nothing to anchor
    NotAnchoring,
}

/// Result of a follow or resize step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowOutcome {
    /// Spacer set to a new height
    Shrunk(f64),
    /// Change below the noise threshold
    Unchanged,
    /// Spacer reached zero; tracking stopped
    Cleared,
    /// Scrolled to the end to reveal new content
    Revealed,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct AnchorController {
    config: AnchorConfig,
    state: AnchorState,
}

impl AnchorController {
    pub fn new(config: AnchorConfig) -> Self {
        Self {
            config,
            state: AnchorState::Idle,
        }
    }

    pub fn state(&self) -> &AnchorState {
        &self.state
    }

    /// Inside the critical section between appending a pair and applying its
    /// scroll position. Spacer resets are suppressed while this holds.
    pub fn is_anchoring(&self) -> bool {
        matches!(self.state, AnchorState::Anchoring(_))
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, AnchorState::Tracking(_))
    }

    /// Register a freshly appended pair. Replaces any previous anchor.
    pub fn begin(&mut self, user_id: MessageId, assistant_id: MessageId) {
        debug!(%user_id, %assistant_id, "Anchoring new turn");
        self.state = AnchorState::Anchoring(PendingAnchor {
            user_id,
            assistant_id,
            failures: 0,
            settle_requested: false,
        });
    }

    /// Try to apply the pending anchor against the current layout.
    ///
    /// Call synchronously right after the pair was committed to the viewport,
    /// then once per animation frame while it returns [`AnchorOutcome::Deferred`].
    pub fn try_anchor<V: Viewport + ?Sized>(
        &mut self,
        viewport: &mut V,
        follow: &mut AutoFollowTracker,
    ) -> AnchorOutcome {
        let AnchorState::Anchoring(pending) = &mut self.state else {
            return AnchorOutcome::NotAnchoring;
        };

        let rects = viewport
            .element_rect(&pending.user_id)
            .zip(viewport.element_rect(&pending.assistant_id));
        let Some((user, assistant)) = rects else {
            pending.failures += 1;
            if pending.failures > self.config.max_mount_attempts {
                debug!(
                    failures = pending.failures,
                    "Message elements never mounted, dropping anchor"
                );
                self.state = AnchorState::Idle;
                return AnchorOutcome::GaveUp;
            }
            trace!(failures = pending.failures, "Message elements not mounted yet");
            return AnchorOutcome::Deferred;
        };

        let viewport_height = viewport.metrics().viewport_height;
        let spacer =
            ScrollMath::required_spacer(user, assistant, viewport_height, self.config.top_offset);

        // Resize first so the scroll bound below already includes the spacer
        let metrics = viewport.apply_spacer_and_measure(spacer);
        let target = ScrollMath::anchor_target(user.top, self.config.top_offset, &metrics);
        follow.scroll_programmatically(viewport, target);
        viewport.observe_resize(&pending.assistant_id);

        let scroll_top = viewport.metrics().scroll_top;
        debug!(spacer, scroll_top, "Anchor applied");

        let pending = pending.clone();
        self.state = AnchorState::Tracking(TrackingAnchor {
            user_id: pending.user_id,
            assistant_id: pending.assistant_id,
            spacer,
            zero_streak: 0,
            assistant_height: assistant.height,
        });
        if pending.settle_requested {
            debug!("Streaming already ended, settling applied anchor");
            self.release(viewport, follow);
        }
        AnchorOutcome::Anchored { scroll_top, spacer }
    }

    /// Shrink step, run when the observed assistant element changed size.
    ///
    /// Only acts while tracking and while the user is following.
    pub fn on_resize<V: Viewport + ?Sized>(
        &mut self,
        viewport: &mut V,
        follow: &mut AutoFollowTracker,
    ) -> FollowOutcome {
        if !follow.auto_follow() {
            return FollowOutcome::Skipped;
        }
        let AnchorState::Tracking(tracking) = &mut self.state else {
            return FollowOutcome::Skipped;
        };

        let rects = viewport
            .element_rect(&tracking.user_id)
            .zip(viewport.element_rect(&tracking.assistant_id));
        let Some((user, assistant)) = rects else {
            return FollowOutcome::Skipped;
        };

        let viewport_height = viewport.metrics().viewport_height;
        let raw = ScrollMath::raw_spacer(user, assistant, viewport_height, self.config.top_offset);
        let required = raw.ceil().max(0.0);

        // Only a reading taken after the answer actually changed size counts
        let resized = assistant.height != tracking.assistant_height;
        tracking.assistant_height = assistant.height;
        if raw > 0.0 {
            tracking.zero_streak = 0;
        } else if resized {
            tracking.zero_streak += 1;
        }

        if tracking.zero_streak >= self.config.zero_streak {
            if viewport.spacer_height() != 0.0 {
                viewport.set_spacer_height(0.0, SpacerTransition::Animated);
            }
            viewport.unobserve_resize();
            follow.resync(viewport.metrics());
            debug!("Answer outgrew the viewport, spacer cleared");
            self.state = AnchorState::Settled;
            return FollowOutcome::Cleared;
        }

        if (required - tracking.spacer).abs() < self.config.noise_threshold {
            return FollowOutcome::Unchanged;
        }

        tracking.spacer = required;
        viewport.set_spacer_height(required, SpacerTransition::Animated);
        follow.resync(viewport.metrics());
        trace!(spacer = required, "Spacer shrunk");
        FollowOutcome::Shrunk(required)
    }

    /// Follow step after the flusher committed new content.
    ///
    /// While tracking this is the shrink step. Once settled, new content is
    /// revealed by scrolling to the end.
    pub fn follow<V: Viewport + ?Sized>(
        &mut self,
        viewport: &mut V,
        follow: &mut AutoFollowTracker,
    ) -> FollowOutcome {
        if !follow.auto_follow() {
            return FollowOutcome::Skipped;
        }
        match self.state {
            AnchorState::Tracking(_) => self.on_resize(viewport, follow),
            AnchorState::Anchoring(_) => FollowOutcome::Skipped,
            AnchorState::Idle | AnchorState::Settled => {
                let metrics = viewport.metrics();
                if metrics.distance_from_bottom() > 0.0 {
                    follow.scroll_programmatically(viewport, metrics.max_scroll_top());
                    FollowOutcome::Revealed
                } else {
                    FollowOutcome::Unchanged
                }
            }
        }
    }

    /// Streaming ended: stop observing and drop the spacer.
    ///
    /// Inside the anchoring critical section the request is deferred until
    /// the anchor is applied or dropped. Returns whether the controller
    /// settled now.
    pub fn settle<V: Viewport + ?Sized>(
        &mut self,
        viewport: &mut V,
        follow: &mut AutoFollowTracker,
    ) -> bool {
        if let AnchorState::Anchoring(pending) = &mut self.state {
            debug!("Settle requested while anchoring, deferring");
            pending.settle_requested = true;
            return false;
        }
        self.release(viewport, follow);
        true
    }

    fn release<V: Viewport + ?Sized>(&mut self, viewport: &mut V, follow: &mut AutoFollowTracker) {
        if self.is_tracking() {
            viewport.unobserve_resize();
        }
        if viewport.spacer_height() != 0.0 {
            viewport.set_spacer_height(0.0, SpacerTransition::Animated);
            follow.resync(viewport.metrics());
        }
        self.state = AnchorState::Settled;
    }

    /// Forget any anchor immediately (reset, jump to bottom)
    pub fn clear<V: Viewport + ?Sized>(&mut self, viewport: &mut V) {
        viewport.unobserve_resize();
        if viewport.spacer_height() != 0.0 {
            viewport.set_spacer_height(0.0, SpacerTransition::Immediate);
        }
        self.state = AnchorState::Idle;
    }
}

impl Default for AnchorController {
    fn default() -> Self {
        Self::new(AnchorConfig::default())
    }
}
