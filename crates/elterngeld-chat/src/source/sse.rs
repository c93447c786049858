//! Incremental decoder for the chat function's event stream
//!
//! Each record is one `data: <json>` line; `data: [DONE]` ends the stream.
//! Bytes are buffered until a full line is available, so records and
//! multi-byte characters may be split across network chunks arbitrarily.
//!
//! A data line that does not parse is kept and retried joined with the next
//! data line, which covers a record broken by a stray newline. If the next line
//! parses on its own the kept one is dropped with a warning. A record that is
//! still incomplete when the body ends fails the stream.

use super::SourceEvent;
use elterngeld_core::{ChatResult, TransportError};
use serde::Deserialize;
use tracing::{trace, warn};

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// One JSON payload of the stream
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StreamRecord {
    content: Option<String>,
    suggestions: Option<Vec<String>>,
    /// OpenAI-compatible framing
    choices: Vec<RecordChoice>,
    error: Option<RecordError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecordChoice {
    delta: RecordDelta,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecordDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordError {
    Text(String),
    Detailed { message: String },
}

impl RecordError {
    fn into_message(self) -> String {
        match self {
            RecordError::Text(message) | RecordError::Detailed { message } => message,
        }
    }
}

impl StreamRecord {
    fn into_events(self) -> Vec<ChatResult<SourceEvent>> {
        if let Some(error) = self.error {
            return vec![Err(TransportError::Remote(error.into_message()))];
        }

        let mut events = Vec::new();
        let deltas = self
            .content
            .into_iter()
            .chain(self.choices.into_iter().filter_map(|c| c.delta.content));
        for delta in deltas {
            if !delta.is_empty() {
                events.push(Ok(SourceEvent::Delta(delta)));
            }
        }
        if let Some(suggestions) = self.suggestions {
            events.push(Ok(SourceEvent::Suggestions(suggestions)));
        }
        events
    }
}

/// Line-buffered decoder for one response body
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Data payload that failed to parse, waiting for its continuation
    deferred: Option<String>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the end sentinel was seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Decode all complete lines in `bytes` plus what was buffered before
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ChatResult<SourceEvent>> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }
        self.buffer.extend_from_slice(bytes);

        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&line);
            self.process_line(&line, &mut events);
            if self.done {
                self.buffer.clear();
                break;
            }
        }
        events
    }

    /// The body ended: decode the unterminated last line and close the stream
    pub fn finish(&mut self) -> Vec<ChatResult<SourceEvent>> {
        let mut events = Vec::new();
        if !self.done && !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest);
            self.process_line(&line, &mut events);
        }
        if self.done {
            return events;
        }
        self.done = true;

        if let Some(deferred) = self.deferred.take() {
            events.push(Err(TransportError::MalformedStream(truncate(&deferred))));
        } else {
            events.push(Ok(SourceEvent::End));
        }
        events
    }

    fn process_line(&mut self, line: &str, events: &mut Vec<ChatResult<SourceEvent>>) {
        let line = line.trim_end_matches(['\n', '\r']);
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            // Blank separators, comments and other fields carry no content
            if !line.is_empty() && !line.starts_with(':') {
                trace!(line, "Ignoring non-data line");
            }
            return;
        };
        let payload = payload.strip_prefix(' ').unwrap_or(payload);

        if payload.trim() == DONE_SENTINEL {
            if let Some(deferred) = self.deferred.take() {
                warn!(payload = %truncate(&deferred), "Dropping unparseable record before end of stream");
            }
            self.done = true;
            events.push(Ok(SourceEvent::End));
            return;
        }

        if let Some(deferred) = self.deferred.take() {
            let joined = format!("{deferred}{payload}");
            if let Ok(record) = serde_json::from_str::<StreamRecord>(&joined) {
                events.extend(record.into_events());
                return;
            }
            warn!(payload = %truncate(&deferred), "Dropping unparseable record");
        }

        match serde_json::from_str::<StreamRecord>(payload) {
            Ok(record) => events.extend(record.into_events()),
            Err(error) => {
                trace!(%error, "Record incomplete, waiting for more data");
                self.deferred = Some(payload.to_string());
            }
        }
    }
}

fn truncate(text: &str) -> String {
    const MAX: usize = 120;
    match text.char_indices().nth(MAX) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}
