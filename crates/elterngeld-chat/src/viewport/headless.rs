//! Deterministic viewport without a renderer
//!
//! Messages are stacked vertically. Each one is as tall as its text wrapped to
//! a fixed column count, times the line height, plus padding. The spacer sits
//! after the last message.

use super::{ElementRect, ScrollMetrics, SpacerTransition, Viewport};
use crate::scroll::ScrollMath;
use elterngeld_core::{Message, MessageId};

const DEFAULT_LINE_HEIGHT: f64 = 24.0;
const DEFAULT_MESSAGE_PADDING: f64 = 8.0;
const DEFAULT_GAP: f64 = 12.0;
const DEFAULT_CONTENT_PADDING: f64 = 16.0;

/// In-memory scroll container
#[derive(Debug, Clone)]
pub struct HeadlessViewport {
    viewport_height: f64,
    columns: usize,
    line_height: f64,
    message_padding: f64,
    gap: f64,
    content_padding: f64,
    rects: Vec<(MessageId, ElementRect)>,
    messages_bottom: f64,
    spacer: f64,
    scroll_top: f64,
    observed: Option<MessageId>,
    unmounted_frames: u32,
    spacer_history: Vec<(f64, SpacerTransition)>,
}

impl HeadlessViewport {
    /// Viewport `viewport_height` units tall wrapping text at `columns`
    pub fn new(viewport_height: f64, columns: usize) -> Self {
        Self {
            viewport_height,
            columns: columns.max(1),
            line_height: DEFAULT_LINE_HEIGHT,
            message_padding: DEFAULT_MESSAGE_PADDING,
            gap: DEFAULT_GAP,
            content_padding: DEFAULT_CONTENT_PADDING,
            rects: Vec::new(),
            messages_bottom: DEFAULT_CONTENT_PADDING,
            spacer: 0.0,
            scroll_top: 0.0,
            observed: None,
            unmounted_frames: 0,
            spacer_history: Vec::new(),
        }
    }

    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = line_height;
        self
    }

    /// Report no elements until `frames` animation frames have passed
    pub fn defer_mount(&mut self, frames: u32) {
        self.unmounted_frames = frames;
    }

    /// Simulate the user dragging the scroll position; returns the event fired
    pub fn user_scroll_to(&mut self, top: f64) -> ScrollMetrics {
        self.set_scroll_top(top);
        self.metrics()
    }

    /// Element whose size changes are being observed
    pub fn observed(&self) -> Option<&MessageId> {
        self.observed.as_ref()
    }

    /// Every spacer height that was applied, oldest first
    pub fn spacer_history(&self) -> &[(f64, SpacerTransition)] {
        &self.spacer_history
    }

    /// Number of wrapped text lines of `content`
    pub fn line_count(&self, content: &str) -> usize {
        textwrap::wrap(content, self.columns).len().max(1)
    }

    fn scroll_height(&self) -> f64 {
        (self.messages_bottom + self.spacer + self.content_padding).max(self.viewport_height)
    }

    fn set_scroll_top(&mut self, top: f64) {
        self.scroll_top = ScrollMath::clamp_scroll(top, self.scroll_height(), self.viewport_height);
    }
}

impl Viewport for HeadlessViewport {
    fn commit(&mut self, messages: &[Message]) {
        self.rects.clear();
        let mut y = self.content_padding;
        for (index, message) in messages.iter().enumerate() {
            if index > 0 {
                y += self.gap;
            }
            let lines = self.line_count(&message.content) as f64;
            let height = lines * self.line_height + 2.0 * self.message_padding;
            self.rects.push((message.id.clone(), ElementRect { top: y, height }));
            y += height;
        }
        self.messages_bottom = y;

        if let Some(observed) = &self.observed {
            if !self.rects.iter().any(|(id, _)| id == observed) {
                self.observed = None;
            }
        }
        self.set_scroll_top(self.scroll_top);
    }

    fn element_rect(&self, id: &MessageId) -> Option<ElementRect> {
        if self.unmounted_frames > 0 {
            return None;
        }
        self.rects
            .iter()
            .find(|(rect_id, _)| rect_id == id)
            .map(|(_, rect)| *rect)
    }

    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.scroll_top,
            scroll_height: self.scroll_height(),
            viewport_height: self.viewport_height,
        }
    }

    fn scroll_to(&mut self, top: f64) -> Option<ScrollMetrics> {
        let before = self.scroll_top;
        self.set_scroll_top(top);
        (self.scroll_top != before).then(|| self.metrics())
    }

    fn spacer_height(&self) -> f64 {
        self.spacer
    }

    fn set_spacer_height(&mut self, height: f64, transition: SpacerTransition) {
        self.spacer = height.max(0.0);
        self.spacer_history.push((self.spacer, transition));
        self.set_scroll_top(self.scroll_top);
    }

    fn observe_resize(&mut self, id: &MessageId) {
        self.observed = Some(id.clone());
    }

    fn unobserve_resize(&mut self) {
        self.observed = None;
    }

    fn next_frame(&mut self) {
        self.unmounted_frames = self.unmounted_frames.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_messages() -> Vec<Message> {
        vec![Message::user("hi"), Message::assistant("")]
    }

    #[test]
    fn test_commit_stacks_messages() {
        let mut viewport = HeadlessViewport::new(400.0, 40);
        let messages = two_messages();
        viewport.commit(&messages);

        let user = viewport.element_rect(&messages[0].id).unwrap();
        let assistant = viewport.element_rect(&messages[1].id).unwrap();
        assert_eq!(user.top, 16.0);
        assert_eq!(user.height, 40.0);
        assert_eq!(assistant.top, 16.0 + 40.0 + 12.0);
        // Content fits, so the container is exactly one viewport tall
        assert_eq!(viewport.metrics().scroll_height, 400.0);
    }

    #[test]
    fn test_wrapped_text_grows_element() {
        let mut viewport = HeadlessViewport::new(400.0, 10);
        let mut messages = two_messages();
        messages[1].content = "one two three four five six".to_string();
        viewport.commit(&messages);

        let assistant = viewport.element_rect(&messages[1].id).unwrap();
        assert_eq!(viewport.line_count(&messages[1].content), 3);
        assert_eq!(assistant.height, 3.0 * 24.0 + 16.0);
    }

    #[test]
    fn test_spacer_extends_scroll_height_and_scroll_clamps() {
        let mut viewport = HeadlessViewport::new(100.0, 40);
        viewport.commit(&two_messages());
        let before = viewport.metrics().scroll_height;

        let metrics = viewport.apply_spacer_and_measure(300.0);
        assert_eq!(before, 16.0 + 40.0 + 12.0 + 40.0 + 16.0);
        assert_eq!(metrics.scroll_height, before + 300.0);

        assert!(viewport.scroll_to(10_000.0).is_some());
        assert_eq!(viewport.metrics().scroll_top, viewport.metrics().max_scroll_top());
        // Same position again fires no event
        assert!(viewport.scroll_to(10_000.0).is_none());

        viewport.set_spacer_height(0.0, SpacerTransition::Animated);
        assert_eq!(viewport.metrics().scroll_top, viewport.metrics().max_scroll_top());
        assert_eq!(viewport.spacer_history().len(), 2);
    }

    #[test]
    fn test_deferred_mount_hides_elements() {
        let mut viewport = HeadlessViewport::new(400.0, 40);
        let messages = two_messages();
        viewport.defer_mount(2);
        viewport.commit(&messages);

        assert!(viewport.element_rect(&messages[0].id).is_none());
        viewport.next_frame();
        assert!(viewport.element_rect(&messages[0].id).is_none());
        viewport.next_frame();
        assert!(viewport.element_rect(&messages[0].id).is_some());
    }
}
