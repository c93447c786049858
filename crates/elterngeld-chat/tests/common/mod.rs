//! Shared fixtures for the chat integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use elterngeld_chat::{AnswerMatcher, ChatRuntime, HeadlessViewport};
use elterngeld_config::{AnswerEntry, AnswerTableFile, Config};
use elterngeld_core::{ByteStream, ChatRequest, ChatResult, ChatTransport, TransportError};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ELIGIBLE_ANSWER: &str = "Yes, if your income is below the limit.";

/// Transport replaying a fixed script and counting how often it was used
pub struct ScriptedTransport {
    calls: AtomicUsize,
    refusal: Option<TransportError>,
    chunks: Vec<ChatResult<Vec<u8>>>,
    hang_after: bool,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    /// Answers with the given SSE body, split into the given chunks
    pub fn streaming(chunks: &[&str]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            refusal: None,
            chunks: chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect(),
            hang_after: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Rejects every request with `error`
    pub fn refusing(error: TransportError) -> Self {
        Self {
            refusal: Some(error),
            ..Self::streaming(&[])
        }
    }

    /// Keep the body open forever after the scripted chunks
    pub fn hanging(mut self) -> Self {
        self.hang_after = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn open_stream(&self, request: ChatRequest) -> ChatResult<ByteStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if let Some(error) = &self.refusal {
            return Err(error.clone());
        }
        let body = stream::iter(self.chunks.clone());
        if self.hang_after {
            Ok(body.chain(stream::pending()).boxed())
        } else {
            Ok(body.boxed())
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// SSE body carrying `text` as one content record per word
pub fn sse_body(text: &str) -> String {
    let mut body = String::new();
    for word in text.split_inclusive(' ') {
        body.push_str(&format!(
            "data: {}\n\n",
            serde_json::json!({ "content": word })
        ));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

pub fn answer_table() -> AnswerTableFile {
    AnswerTableFile {
        de: vec![],
        en: vec![AnswerEntry {
            question: "Am I eligible?".into(),
            answer: ELIGIBLE_ANSWER.into(),
            suggestions: vec!["How much?".into(), "How long?".into()],
        }],
    }
}

pub fn runtime(
    transport: Arc<ScriptedTransport>,
    viewport: HeadlessViewport,
) -> ChatRuntime<HeadlessViewport> {
    runtime_with_table(transport, viewport, &answer_table())
}

pub fn runtime_with_table(
    transport: Arc<ScriptedTransport>,
    viewport: HeadlessViewport,
    table: &AnswerTableFile,
) -> ChatRuntime<HeadlessViewport> {
    runtime_with_config(transport, viewport, table, &Config::default())
}

pub fn runtime_with_config(
    transport: Arc<ScriptedTransport>,
    viewport: HeadlessViewport,
    table: &AnswerTableFile,
    config: &Config,
) -> ChatRuntime<HeadlessViewport> {
    ChatRuntime::new(
        config,
        Arc::new(AnswerMatcher::new(table)),
        transport,
        viewport,
    )
}
