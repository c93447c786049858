//! Layout measurement surface
//!
//! The anchor controller and the auto-follow tracker never talk to a renderer
//! directly. They read and write scroll state through [`Viewport`], which a
//! host implements on top of its real scroll container. [`HeadlessViewport`]
//! is a deterministic implementation for tests and terminals.
//!
//! Two operations carry ordering guarantees:
//! - [`Viewport::commit`] lays the messages out synchronously, so any
//!   measurement taken afterwards reflects them.
//! - [`Viewport::apply_spacer_and_measure`] resizes the spacer without a
//!   transition and measures in the same step.

mod headless;

pub use headless::HeadlessViewport;

use elterngeld_core::{Message, MessageId};

/// Position of a rendered message inside the scrollable content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRect {
    /// Offset from the origin of the scrollable content
    pub top: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Scroll state of the container at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    /// Largest valid `scroll_top`
    pub fn max_scroll_top(&self) -> f64 {
        crate::scroll::ScrollMath::max_scroll(self.scroll_height, self.viewport_height)
    }

    /// `scroll_height - scroll_top - viewport_height`
    pub fn distance_from_bottom(&self) -> f64 {
        crate::scroll::ScrollMath::distance_from_bottom(
            self.scroll_top,
            self.scroll_height,
            self.viewport_height,
        )
    }
}

/// How a spacer height change is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacerTransition {
    /// Applied at once; the next measurement sees the final size
    Immediate,
    /// The host may animate towards the new size
    Animated,
}

/// A scroll container holding the conversation followed by a trailing spacer
pub trait Viewport {
    /// Lay out `messages` synchronously.
    fn commit(&mut self, messages: &[Message]);

    /// Rectangle of a message element, or `None` while it is not mounted.
    fn element_rect(&self, id: &MessageId) -> Option<ElementRect>;

    fn metrics(&self) -> ScrollMetrics;

    /// Set the scroll position, clamped by the container.
    ///
    /// Returns the scroll event the container fired synchronously, if the
    /// position changed.
    fn scroll_to(&mut self, top: f64) -> Option<ScrollMetrics>;

    fn spacer_height(&self) -> f64;

    fn set_spacer_height(&mut self, height: f64, transition: SpacerTransition);

    /// Resize the spacer without transition, then measure.
    fn apply_spacer_and_measure(&mut self, height: f64) -> ScrollMetrics {
        self.set_spacer_height(height, SpacerTransition::Immediate);
        self.metrics()
    }

    /// Start delivering size changes of `id` to the host's resize handler.
    fn observe_resize(&mut self, _id: &MessageId) {}

    fn unobserve_resize(&mut self) {}

    /// Called once at the start of every animation frame.
    fn next_frame(&mut self) {}
}
