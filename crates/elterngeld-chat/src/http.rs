//! HTTP transport for the live chat function

use async_trait::async_trait;
use elterngeld_config::TransportConfig;
use elterngeld_core::{ByteStream, ChatRequest, ChatResult, ChatTransport, TransportError};
use futures::StreamExt;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::{debug, warn};

/// Posts the conversation to the chat function and streams the SSE body back
#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl HttpChatTransport {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn open_stream(&self, request: ChatRequest) -> ChatResult<ByteStream> {
        debug!(
            endpoint = %self.endpoint,
            messages = request.messages.len(),
            language = %request.language,
            "Requesting live answer"
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "text/event-stream")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Chat function rejected request");
            return Err(TransportError::from_status(status.as_u16(), body));
        }

        let body = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| TransportError::Connection(e.to_string()))
        });
        Ok(body.boxed())
    }

    fn name(&self) -> &str {
        "http"
    }
}
