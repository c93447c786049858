//! Token sources
//!
//! Both answer paths produce the same [`SourceStream`]: a finite, ordered
//! sequence of text deltas and out-of-band suggestions closed by
//! [`SourceEvent::End`]. The canned variant yields its whole answer at once
//! and leaves the pacing to the flusher. The live variant decodes the chat
//! function's event stream as bytes arrive.

mod sse;

pub use sse::SseDecoder;

use crate::matcher::CannedAnswer;
use async_stream::stream;
use elterngeld_core::{ChatRequest, ChatResult, ChatTransport};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tracing::debug;

/// One item produced by a token source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// Text to append to the streaming buffer
    Delta(String),
    /// Follow-up questions for the suggestion list
    Suggestions(Vec<String>),
    /// No more events follow
    End,
}

pub type SourceStream = BoxStream<'static, ChatResult<SourceEvent>>;

/// Which source answers a submission
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePlan {
    Canned(CannedAnswer),
    Live(ChatRequest),
}

impl SourcePlan {
    pub fn is_canned(&self) -> bool {
        matches!(self, SourcePlan::Canned(_))
    }

    /// Bind the plan to a transport
    pub fn into_source(self, transport: &Arc<dyn ChatTransport>) -> TokenSource {
        match self {
            SourcePlan::Canned(answer) => TokenSource::Canned(answer),
            SourcePlan::Live(request) => TokenSource::Live {
                transport: Arc::clone(transport),
                request,
            },
        }
    }
}

/// Where the text of one assistant turn comes from. Not restartable.
pub enum TokenSource {
    Canned(CannedAnswer),
    Live {
        transport: Arc<dyn ChatTransport>,
        request: ChatRequest,
    },
}

impl TokenSource {
    pub fn into_stream(self) -> SourceStream {
        match self {
            TokenSource::Canned(answer) => canned_stream(answer),
            TokenSource::Live { transport, request } => live_stream(transport, request),
        }
    }
}

fn canned_stream(answer: CannedAnswer) -> SourceStream {
    let mut events = vec![Ok(SourceEvent::Delta(answer.answer))];
    if !answer.suggestions.is_empty() {
        events.push(Ok(SourceEvent::Suggestions(answer.suggestions)));
    }
    events.push(Ok(SourceEvent::End));
    stream::iter(events).boxed()
}

fn live_stream(transport: Arc<dyn ChatTransport>, request: ChatRequest) -> SourceStream {
    Box::pin(stream! {
        let mut body = match transport.open_stream(request).await {
            Ok(body) => body,
            Err(error) => {
                yield Err(error);
                return;
            }
        };
        debug!(transport = transport.name(), "Response stream opened");

        let mut decoder = SseDecoder::new();
        while let Some(chunk) = body.next().await {
            let events = match chunk {
                Ok(bytes) => decoder.feed(&bytes),
                Err(error) => vec![Err(error)],
            };
            for event in events {
                let last = matches!(event, Ok(SourceEvent::End) | Err(_));
                yield event;
                if last {
                    return;
                }
            }
        }

        for event in decoder.finish() {
            yield event;
        }
    })
}
