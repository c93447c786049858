//! Scroll calculation utilities
//!
//! Pure functions for the scroll bounds and spacer geometry shared by the
//! anchor controller and the auto-follow tracker, plus the token that tells
//! the tracker a scroll was issued by code rather than by the user.

use crate::viewport::{ElementRect, ScrollMetrics};

/// Scroll calculation utilities
pub struct ScrollMath;

impl ScrollMath {
    /// Largest scroll offset for content of the given height.
    ///
    /// Returns 0 if the content fits in the viewport.
    ///
    /// # Examples
    /// ```
    /// use elterngeld_chat::scroll::ScrollMath;
    ///
    /// assert_eq!(ScrollMath::max_scroll(300.0, 500.0), 0.0);
    /// assert_eq!(ScrollMath::max_scroll(800.0, 500.0), 300.0);
    /// ```
    #[inline]
    pub fn max_scroll(content_height: f64, viewport_height: f64) -> f64 {
        (content_height - viewport_height).max(0.0)
    }

    /// Clamp a scroll offset to `[0, max_scroll]`
    ///
    /// # Examples
    /// ```
    /// use elterngeld_chat::scroll::ScrollMath;
    ///
    /// assert_eq!(ScrollMath::clamp_scroll(120.0, 800.0, 500.0), 120.0);
    /// assert_eq!(ScrollMath::clamp_scroll(450.0, 800.0, 500.0), 300.0);
    /// assert_eq!(ScrollMath::clamp_scroll(-20.0, 800.0, 500.0), 0.0);
    /// ```
    #[inline]
    pub fn clamp_scroll(scroll_top: f64, content_height: f64, viewport_height: f64) -> f64 {
        scroll_top.clamp(0.0, Self::max_scroll(content_height, viewport_height))
    }

    /// How far the bottom edge of the viewport is from the end of the content
    ///
    /// # Examples
    /// ```
    /// use elterngeld_chat::scroll::ScrollMath;
    ///
    /// assert_eq!(ScrollMath::distance_from_bottom(300.0, 800.0, 500.0), 0.0);
    /// assert_eq!(ScrollMath::distance_from_bottom(100.0, 800.0, 500.0), 200.0);
    /// ```
    #[inline]
    pub fn distance_from_bottom(scroll_top: f64, content_height: f64, viewport_height: f64) -> f64 {
        content_height - scroll_top - viewport_height
    }

    /// Spacer needed below the assistant message so that `user` can be
    /// scrolled to `top_offset` below the top edge of the viewport.
    ///
    /// `ceil((user.top - top_offset + viewport_height) - assistant.bottom)`,
    /// never negative. Use [`ScrollMath::raw_spacer`] for the signed value.
    ///
    /// # Examples
    /// ```
    /// use elterngeld_chat::scroll::ScrollMath;
    /// use elterngeld_chat::viewport::ElementRect;
    ///
    /// let user = ElementRect { top: 1000.0, height: 40.0 };
    /// let assistant = ElementRect { top: 1052.0, height: 40.0 };
    /// assert_eq!(ScrollMath::required_spacer(user, assistant, 600.0, 16.0), 492.0);
    ///
    /// let long_answer = ElementRect { top: 1052.0, height: 900.0 };
    /// assert_eq!(ScrollMath::required_spacer(user, long_answer, 600.0, 16.0), 0.0);
    /// ```
    #[inline]
    pub fn required_spacer(
        user: ElementRect,
        assistant: ElementRect,
        viewport_height: f64,
        top_offset: f64,
    ) -> f64 {
        Self::raw_spacer(user, assistant, viewport_height, top_offset)
            .ceil()
            .max(0.0)
    }

    /// Signed spacer requirement before rounding and clamping
    #[inline]
    pub fn raw_spacer(
        user: ElementRect,
        assistant: ElementRect,
        viewport_height: f64,
        top_offset: f64,
    ) -> f64 {
        (user.top - top_offset + viewport_height) - assistant.bottom()
    }

    /// Scroll offset that puts `user_top` at `top_offset` below the top edge,
    /// clamped to what the content allows.
    #[inline]
    pub fn anchor_target(user_top: f64, top_offset: f64, metrics: &ScrollMetrics) -> f64 {
        (user_top - top_offset).min(metrics.max_scroll_top()).max(0.0)
    }
}

/// Marks scrolls issued by code so they are not read as user intent.
///
/// Held immediately before a programmatic scroll and released immediately
/// after the scroll event it fired has been delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollToken {
    #[default]
    Free,
    Held,
}

impl ScrollToken {
    pub fn hold(&mut self) {
        *self = ScrollToken::Held;
    }

    pub fn release(&mut self) {
        *self = ScrollToken::Free;
    }

    pub fn is_held(self) -> bool {
        self == ScrollToken::Held
    }
}
