//! Channel-based delivery of source events
//!
//! A token source stream is moved into a spawned task that forwards its items
//! as typed events. The runtime receives them in its select loop and hands
//! them to the session together with the turn they belong to.
//!
//! ```text
//! TokenSource::into_stream() -> SourceStream
//!            |
//!            v (ownership transfer)
//!     StreamingTask::spawn(turn)
//!            |
//!            v (TurnEvent)
//!     ChatRuntime select loop
//! ```

use crate::source::{SourceEvent, SourceStream};
use crate::turn::TurnId;
use elterngeld_core::TransportError;
use futures::StreamExt;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Events sent from the streaming task to the runtime
#[derive(Debug, Clone, PartialEq)]
pub enum StreamingEvent {
    /// Text delta from the source
    Delta { text: String, seq: u64 },
    /// Out-of-band follow-up suggestions
    Suggestions { items: Vec<String> },
    /// Source exhausted
    Done { full_response: String },
    /// Source failed; no further events follow
    Error { error: TransportError },
}

/// A streaming event tagged with the turn that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct TurnEvent {
    pub turn: TurnId,
    pub event: StreamingEvent,
}

pub type StreamingSender = UnboundedSender<TurnEvent>;
pub type StreamingReceiver = UnboundedReceiver<TurnEvent>;

/// Create a channel pair for streaming events
pub fn create_streaming_channel() -> (StreamingSender, StreamingReceiver) {
    unbounded_channel()
}

/// Wraps streaming task spawning (zero-sized type, just namespace)
pub struct StreamingTask;

impl StreamingTask {
    /// Spawn a task that drains `stream` into `tx`
    pub fn spawn(tx: StreamingSender, turn: TurnId, mut stream: SourceStream) -> JoinHandle<()> {
        tokio::spawn(async move {
            let send = |event: StreamingEvent| tx.send(TurnEvent { turn, event }).is_ok();
            let mut full_response = String::new();
            let mut seq = 0u64;

            debug!(%turn, "StreamingTask started");

            while let Some(result) = stream.next().await {
                let delivered = match result {
                    Ok(SourceEvent::Delta(text)) => {
                        full_response.push_str(&text);
                        let delivered = send(StreamingEvent::Delta { text, seq });
                        seq += 1;
                        delivered
                    }
                    Ok(SourceEvent::Suggestions(items)) => {
                        send(StreamingEvent::Suggestions { items })
                    }
                    Ok(SourceEvent::End) => break,
                    Err(error) => {
                        warn!(%turn, error = %error, "Stream error");
                        send(StreamingEvent::Error { error });
                        return;
                    }
                };
                if !delivered {
                    debug!(%turn, "Receiver gone, stopping stream");
                    return;
                }
            }

            if full_response.is_empty() {
                warn!(%turn, "Stream completed with empty response");
            }
            debug!(%turn, deltas = seq, response_len = full_response.len(), "Stream done");
            send(StreamingEvent::Done { full_response });
        })
    }
}
