//! Contract with the external chat function
//!
//! A transport accepts the history plus the calculation context and answers
//! with a raw byte stream of SSE records. Decoding those records is the job of
//! the live token source, not of the transport.

use crate::context::CalculationContext;
use crate::message::{Message, Role};
use async_trait::async_trait;
use elterngeld_config::Language;
use futures::stream::BoxStream;
use serde::Serialize;
use thiserror::Error;

/// Result type for transport and stream operations
pub type ChatResult<T> = Result<T, TransportError>;

/// Response body as it arrives from the network
pub type ByteStream = BoxStream<'static, ChatResult<Vec<u8>>>;

/// Failures of the live answer path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("rate limited by the chat function")]
    RateLimited,

    #[error("chat function temporarily unavailable (HTTP {0})")]
    Unavailable(u16),

    #[error("chat function returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("malformed stream: {0}")]
    MalformedStream(String),

    #[error("chat function reported an error: {0}")]
    Remote(String),
}

impl TransportError {
    /// Map a non-2xx status to its error class
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            429 => TransportError::RateLimited,
            502..=504 => TransportError::Unavailable(status),
            _ => TransportError::Http {
                status,
                body: body.into(),
            },
        }
    }
}

/// One history entry as sent over the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

/// Body of a chat request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
    pub context: CalculationContext,
    pub language: Language,
}

impl ChatRequest {
    /// Build a request from the conversation, leaving out empty placeholders
    pub fn new(messages: &[Message], context: CalculationContext, language: Language) -> Self {
        let messages = messages
            .iter()
            .filter(|m| !(m.is_assistant() && m.content.is_empty()))
            .map(|m| WireMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();

        Self {
            messages,
            context,
            language,
        }
    }
}

/// Source of live answer streams
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the request and return the response body.
    ///
    /// Status failures are reported here; failures while reading the body are
    /// items of the returned stream.
    async fn open_stream(&self, request: ChatRequest) -> ChatResult<ByteStream>;

    /// Name used in logs
    fn name(&self) -> &str {
        "chat"
    }
}
