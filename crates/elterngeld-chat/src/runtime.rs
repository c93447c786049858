//! Async driver for a [`ChatSession`]
//!
//! Owns the session, the viewport and the transport. For the active turn it
//! keeps one streaming task and one flush interval; both are replaced together
//! when a turn is cancelled, so at most one ticker mutates the conversation.
//!
//! ```text
//!  submit() ──> ChatSession::submit ──> TurnStart ──> StreamingTask::spawn
//!                                                        │ TurnEvent
//!  step():  select! { biased;                            v
//!             events_rx.recv()  ──> ChatSession::on_source_event
//!             frame interval    ──> ChatSession::on_animation_frame
//!             ticker.tick()     ──> ChatSession::tick
//!           }
//! ```

use crate::anchor::AnchorOutcome;
use crate::follow::FollowChange;
use crate::matcher::AnswerMatcher;
use crate::session::{ChatSession, ChatView, TickOutcome, TurnStart};
use crate::streaming::{create_streaming_channel, StreamingReceiver, StreamingSender, StreamingTask};
use crate::turn::TurnId;
use crate::viewport::{ScrollMetrics, Viewport};
use elterngeld_config::Config;
use elterngeld_core::{CalculationContext, ChatTransport};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace};

/// Delay between animation frames while an anchor waits for layout
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// What one [`ChatRuntime::step`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuntimeStep {
    /// A source event was applied
    Event,
    /// The flush interval ticked
    Tick(TickOutcome),
    /// An animation frame ran
    Frame(AnchorOutcome),
    /// Nothing is streaming and no anchor is pending
    Idle,
}

struct ActiveTurn {
    turn: TurnId,
    task: JoinHandle<()>,
    ticker: Interval,
}

impl ActiveTurn {
    fn cancel(self) {
        self.task.abort();
        debug!(turn = %self.turn, "Stopped streaming task and ticker");
    }
}

pub struct ChatRuntime<V: Viewport> {
    session: ChatSession,
    viewport: V,
    transport: Arc<dyn ChatTransport>,
    flush_interval: Duration,
    events_tx: StreamingSender,
    events_rx: StreamingReceiver,
    active: Option<ActiveTurn>,
    /// Animation frame clock, running only while an anchor is pending
    frames: Option<Interval>,
}

impl<V: Viewport> ChatRuntime<V> {
    pub fn new(
        config: &Config,
        matcher: Arc<AnswerMatcher>,
        transport: Arc<dyn ChatTransport>,
        viewport: V,
    ) -> Self {
        let (events_tx, events_rx) = create_streaming_channel();
        Self {
            session: ChatSession::new(config, matcher),
            viewport,
            transport,
            flush_interval: config.streaming.flush_interval(),
            events_tx,
            events_rx,
            active: None,
            frames: None,
        }
    }

    pub fn with_context(mut self, context: CalculationContext) -> Self {
        self.session.set_context(context);
        self
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn view(&self) -> ChatView {
        self.session.view()
    }

    /// Turn whose ticker is running
    pub fn active_turn(&self) -> Option<TurnId> {
        self.active.as_ref().map(|a| a.turn)
    }

    /// Send a question. Returns whether a turn was started.
    pub fn submit(&mut self, text: &str) -> bool {
        let start = self.session.submit(text, &mut self.viewport);
        self.apply(start)
    }

    pub fn regenerate(&mut self) -> bool {
        let start = self.session.regenerate(&mut self.viewport);
        self.apply(start)
    }

    pub fn reset(&mut self) {
        self.session.reset(&mut self.viewport);
        self.sync_active();
    }

    pub fn scroll_to_bottom_requested(&mut self) {
        self.session.scroll_to_bottom_requested(&mut self.viewport);
    }

    /// Forward a user scroll event from the host
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> FollowChange {
        self.session.on_scroll(metrics)
    }

    /// Wait for and process the next event, tick or animation frame
    pub async fn step(&mut self) -> RuntimeStep {
        let needs_frame = self.session.needs_animation_frame();
        if !needs_frame {
            self.frames = None;
        } else if self.frames.is_none() {
            self.frames = Some(frame_clock());
        }

        let Some(active) = self.active.as_mut() else {
            if needs_frame {
                next_frame(&mut self.frames).await;
                return RuntimeStep::Frame(self.session.on_animation_frame(&mut self.viewport));
            }
            return RuntimeStep::Idle;
        };
        let turn = active.turn;

        tokio::select! {
            biased;

            Some(event) = self.events_rx.recv() => {
                self.session.on_source_event(event.turn, event.event, &mut self.viewport);
                self.sync_active();
                RuntimeStep::Event
            }
            _ = next_frame(&mut self.frames), if needs_frame => {
                RuntimeStep::Frame(self.session.on_animation_frame(&mut self.viewport))
            }
            _ = active.ticker.tick() => {
                let outcome = self.session.tick(turn, &mut self.viewport);
                trace!(%turn, ?outcome, "Flush tick");
                self.sync_active();
                RuntimeStep::Tick(outcome)
            }
        }
    }

    /// Step until idle, calling `on_update` whenever the conversation changed
    pub async fn run_until_idle<F>(&mut self, mut on_update: F)
    where
        F: FnMut(&ChatSession),
    {
        loop {
            match self.step().await {
                RuntimeStep::Idle => break,
                RuntimeStep::Event
                | RuntimeStep::Tick(TickOutcome::Committed | TickOutcome::Completed) => {
                    on_update(&self.session)
                }
                RuntimeStep::Tick(_) | RuntimeStep::Frame(_) => {}
            }
        }
    }

    fn apply(&mut self, start: Option<TurnStart>) -> bool {
        self.sync_active();
        let Some(start) = start else {
            return false;
        };
        if let Some(previous) = self.active.take() {
            previous.cancel();
        }

        let stream = start.plan.into_source(&self.transport).into_stream();
        let task = StreamingTask::spawn(self.events_tx.clone(), start.turn, stream);
        let mut ticker = interval_at(Instant::now() + self.flush_interval, self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(turn = %start.turn, interval = ?self.flush_interval, "Ticker started");
        self.frames = None;
        self.active = Some(ActiveTurn {
            turn: start.turn,
            task,
            ticker,
        });
        true
    }

    /// Drop the ticker and task once the session no longer runs their turn
    fn sync_active(&mut self) {
        let current = self.session.active_turn();
        if self.active.as_ref().is_some_and(|a| Some(a.turn) != current) {
            if let Some(previous) = self.active.take() {
                previous.cancel();
            }
        }
    }
}

fn frame_clock() -> Interval {
    let mut frames = interval_at(Instant::now() + FRAME_INTERVAL, FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
    frames
}

async fn next_frame(frames: &mut Option<Interval>) {
    match frames {
        Some(frames) => {
            frames.tick().await;
        }
        None => std::future::pending().await,
    }
}

impl<V: Viewport> Drop for ChatRuntime<V> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
        }
    }
}
