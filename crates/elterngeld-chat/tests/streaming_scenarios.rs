//! End-to-end turns through the runtime: canned answers, live streams,
//! failures and cancellation.

mod common;

use common::{runtime, sse_body, ScriptedTransport, ELIGIBLE_ANSWER};
use elterngeld_chat::{HeadlessViewport, RuntimeStep, TickOutcome};
use elterngeld_config::Config;
use elterngeld_core::{Role, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_canned_answer_end_to_end() {
    let transport = Arc::new(ScriptedTransport::streaming(&[]));
    let mut runtime = runtime(transport.clone(), HeadlessViewport::new(400.0, 40));

    assert!(runtime.submit("Am I eligible?"));
    let mut updates = Vec::new();
    runtime
        .run_until_idle(|session| {
            if let Some(last) = session.conversation().last() {
                updates.push(last.content.clone());
            }
        })
        .await;

    let view = runtime.view();
    assert_eq!(view.messages.len(), 2);
    assert_eq!(view.messages[0].role, Role::User);
    assert_eq!(view.messages[1].content, ELIGIBLE_ANSWER);
    assert_eq!(view.suggestions, vec!["How much?", "How long?"]);
    assert!(!view.is_loading);
    assert_eq!(transport.calls(), 0);

    // Revealed word by word, never shrinking
    assert!(updates.windows(2).all(|w| w[1].starts_with(w[0].as_str())));
    assert!(updates.iter().any(|u| u == "Yes,"));
}

#[tokio::test(start_paused = true)]
async fn test_flush_cadence_is_one_unit_per_interval() {
    let transport = Arc::new(ScriptedTransport::streaming(&[]));
    let mut runtime = runtime(transport, HeadlessViewport::new(400.0, 40));
    let started = Instant::now();

    runtime.submit("Am I eligible?");
    let mut commits = 0u32;
    loop {
        match runtime.step().await {
            RuntimeStep::Tick(TickOutcome::Committed) => commits += 1,
            RuntimeStep::Tick(TickOutcome::Completed) => break,
            _ => {}
        }
    }

    // "Yes, if your income is below the limit." has 15 units
    assert_eq!(commits, 15);
    let interval = Config::default().streaming.flush_interval();
    assert_eq!(started.elapsed(), interval * 16);
}

#[tokio::test(start_paused = true)]
async fn test_live_answer_end_to_end() {
    let body = sse_body("Das Elterngeld beträgt bis zu 1.800 Euro.");
    let middle = (body.len() / 2..)
        .find(|&i| body.is_char_boundary(i))
        .unwrap();
    let (head, tail) = body.split_at(middle);
    let transport = Arc::new(ScriptedTransport::streaming(&[
        head,
        tail,
        "data: {\"suggestions\":[\"Was ist ElterngeldPlus?\"]}\n\n",
    ]));
    let mut runtime = runtime(transport.clone(), HeadlessViewport::new(400.0, 40));

    assert!(runtime.submit("Wie viel Elterngeld bekomme ich?"));
    runtime.run_until_idle(|_| {}).await;

    let view = runtime.view();
    assert_eq!(view.messages[1].content, "Das Elterngeld beträgt bis zu 1.800 Euro.");
    assert!(view.suggestions.is_empty(), "records after [DONE] are ignored");
    assert!(!view.is_loading);
    assert_eq!(transport.calls(), 1);

    let request = &transport.requests()[0];
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].content, "Wie viel Elterngeld bekomme ich?");
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_end_to_end() {
    let transport = Arc::new(ScriptedTransport::refusing(TransportError::RateLimited));
    let mut runtime = runtime(transport, HeadlessViewport::new(400.0, 40));

    assert!(runtime.submit("How is the allowance calculated?"));
    runtime.run_until_idle(|_| {}).await;

    let view = runtime.view();
    assert_eq!(view.messages.len(), 2);
    assert_eq!(view.messages[1].content, Config::default().messages.en.rate_limited);
    assert!(!view.is_loading);
    assert_eq!(runtime.session().pending_text(), "");
    assert!(runtime.active_turn().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_uses_german_text() {
    let transport = Arc::new(ScriptedTransport::refusing(TransportError::Unavailable(503)));
    let mut runtime = runtime(transport, HeadlessViewport::new(400.0, 40));

    runtime.submit("Wann muss ich den Antrag stellen?");
    runtime.run_until_idle(|_| {}).await;

    assert_eq!(
        runtime.view().messages[1].content,
        Config::default().messages.de.unavailable
    );
}

#[tokio::test(start_paused = true)]
async fn test_failure_mid_stream_replaces_partial_answer() {
    let transport = Arc::new(ScriptedTransport::streaming(&[
        "data: {\"content\":\"Partial \"}\n\n",
        "data: {\"error\":\"upstream model failed\"}\n\n",
    ]));
    let mut runtime = runtime(transport, HeadlessViewport::new(400.0, 40));

    runtime.submit("How is the allowance calculated?");
    runtime.run_until_idle(|_| {}).await;

    let view = runtime.view();
    assert_eq!(view.messages[1].content, Config::default().messages.en.generic);
    assert!(!view.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_submit_while_streaming_is_rejected() {
    let transport = Arc::new(ScriptedTransport::streaming(&[]).hanging());
    let mut runtime = runtime(transport.clone(), HeadlessViewport::new(400.0, 40));

    assert!(runtime.submit("How is the allowance calculated?"));
    runtime.step().await;
    assert!(!runtime.submit("Another question"));
    assert_eq!(runtime.view().messages.len(), 2);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_regenerate_leaves_one_ticker() {
    let transport = Arc::new(
        ScriptedTransport::streaming(&["data: {\"content\":\"one two three\"}\n\n"]).hanging(),
    );
    let mut runtime = runtime(transport.clone(), HeadlessViewport::new(400.0, 40));

    runtime.submit("How is the allowance calculated?");
    let first = runtime.active_turn().unwrap();
    while runtime.step().await != RuntimeStep::Tick(TickOutcome::Committed) {}
    assert_eq!(runtime.view().messages[1].content, "one");

    assert!(runtime.regenerate());
    let second = runtime.active_turn().unwrap();
    assert_ne!(first, second);
    assert_eq!(runtime.view().messages.len(), 2);
    assert_eq!(runtime.view().messages[1].content, "");

    // Every later step belongs to the new turn: the answer restarts from the
    // beginning and is never interleaved with leftovers of the first one.
    let mut seen = Vec::new();
    for _ in 0..20 {
        if let RuntimeStep::Tick(outcome) = runtime.step().await {
            assert_ne!(outcome, TickOutcome::Stale);
        }
        seen.push(runtime.view().messages[1].content.clone());
    }
    assert!(seen.iter().all(|c| "one two three".starts_with(c.as_str())));
    assert_eq!(seen.last().unwrap(), "one two three");
    assert_eq!(runtime.active_turn(), Some(second));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reset_stops_streaming() {
    let transport = Arc::new(ScriptedTransport::streaming(&[]).hanging());
    let mut runtime = runtime(transport, HeadlessViewport::new(400.0, 40));

    runtime.submit("How is the allowance calculated?");
    runtime.step().await;
    runtime.reset();

    assert!(runtime.active_turn().is_none());
    assert!(runtime.view().messages.is_empty());
    let idle = tokio::time::timeout(Duration::from_secs(1), runtime.step()).await;
    assert_eq!(idle.unwrap(), RuntimeStep::Idle);
}
