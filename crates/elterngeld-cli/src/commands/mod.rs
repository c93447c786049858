pub mod ask;
pub mod chat;

use anyhow::{Context, Result};
use elterngeld_chat::{AnswerMatcher, ChatRuntime, HeadlessViewport, HttpChatTransport};
use elterngeld_config::Config;
use elterngeld_core::{CalculationContext, ChatTransport};
use std::sync::Arc;
use tracing::debug;

/// Layout used for scroll bookkeeping in the terminal
const TERMINAL_COLUMNS: usize = 80;
const TERMINAL_HEIGHT: f64 = 24.0 * 24.0;

/// Runtime wired to the configured answer table and chat function
pub async fn build_runtime(
    config: &Config,
    context: CalculationContext,
) -> Result<ChatRuntime<HeadlessViewport>> {
    let table = config
        .answer_table()
        .await
        .context("Failed to load predefined answers")?;
    let matcher = Arc::new(AnswerMatcher::new(&table));
    let transport: Arc<dyn ChatTransport> = Arc::new(HttpChatTransport::new(&config.transport));
    debug!(
        answers = matcher.len(),
        endpoint = %config.transport.endpoint,
        "Chat runtime ready"
    );

    let viewport = HeadlessViewport::new(TERMINAL_HEIGHT, TERMINAL_COLUMNS);
    Ok(ChatRuntime::new(config, matcher, transport, viewport).with_context(context))
}
