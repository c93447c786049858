//! Stream flusher
//!
//! Turns bursty input into a steady reveal. Text from the token source lands
//! in a [`StreamingBuffer`]; every tick of the flush interval moves exactly one
//! unit (a run of whitespace or a word) into the visible content.

use tracing::trace;

/// Compact the consumed prefix once it grows past this many bytes
const COMPACT_THRESHOLD: usize = 4096;

/// Byte length of the unit at the front of `text`.
///
/// A unit is a maximal run of whitespace or a maximal run of non-whitespace.
/// Falls back to the first character, and returns 0 only for empty input.
pub fn next_unit_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    let Some((_, first)) = chars.next() else {
        return 0;
    };
    let whitespace = first.is_whitespace();
    chars
        .find(|(_, c)| c.is_whitespace() != whitespace)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// Text received for the active turn but not yet shown
#[derive(Debug, Clone, Default)]
pub struct StreamingBuffer {
    text: String,
    /// Byte offset of the first pending character
    read: usize,
    exhausted: bool,
}

impl StreamingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer holding a complete text whose source is already exhausted
    pub fn complete(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            read: 0,
            exhausted: true,
        }
    }

    pub fn push(&mut self, delta: &str) {
        self.text.push_str(delta);
    }

    /// The source will deliver nothing more
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn pending(&self) -> &str {
        &self.text[self.read..]
    }

    pub fn is_empty(&self) -> bool {
        self.read >= self.text.len()
    }

    /// Drained and exhausted: the turn can complete
    pub fn is_finished(&self) -> bool {
        self.is_empty() && self.exhausted
    }

    /// Remove the next unit from the front
    pub fn pop_unit(&mut self) -> Option<String> {
        let len = next_unit_len(self.pending());
        if len == 0 {
            return None;
        }
        let unit = self.text[self.read..self.read + len].to_string();
        self.read += len;
        self.compact();
        Some(unit)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.read = 0;
    }

    fn compact(&mut self) {
        if self.read == self.text.len() {
            self.text.clear();
            self.read = 0;
        } else if self.read > COMPACT_THRESHOLD {
            self.text.drain(..self.read);
            self.read = 0;
        }
    }
}

/// What one tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushStep {
    /// Nothing buffered yet, source still open
    Wait,
    /// Buffer drained and source exhausted; stop ticking
    Complete,
    /// A unit was appended; the new full visible content
    Commit(String),
}

/// Per-turn reveal state: buffered text plus what is already visible
#[derive(Debug, Clone, Default)]
pub struct StreamFlusher {
    buffer: StreamingBuffer,
    visible: String,
}

impl StreamFlusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flusher for a canned answer: everything is enqueued up front
    pub fn with_complete(text: impl Into<String>) -> Self {
        Self {
            buffer: StreamingBuffer::complete(text),
            visible: String::new(),
        }
    }

    pub fn push(&mut self, delta: &str) {
        self.buffer.push(delta);
    }

    pub fn mark_exhausted(&mut self) {
        self.buffer.mark_exhausted();
    }

    pub fn buffer(&self) -> &StreamingBuffer {
        &self.buffer
    }

    pub fn visible(&self) -> &str {
        &self.visible
    }

    /// Advance by one unit
    pub fn tick(&mut self) -> FlushStep {
        match self.buffer.pop_unit() {
            Some(unit) => {
                trace!(unit_len = unit.len(), "Flushing unit");
                self.visible.push_str(&unit);
                FlushStep::Commit(self.visible.clone())
            }
            None if self.buffer.is_exhausted() => FlushStep::Complete,
            None => FlushStep::Wait,
        }
    }

    /// Drop anything not yet shown
    pub fn discard(&mut self) {
        self.buffer.clear();
    }
}
