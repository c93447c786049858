//! Chat session state machine
//!
//! [`ChatSession`] owns the conversation and the scroll controllers and
//! implements the host-facing actions. It performs no I/O and never waits:
//! the caller feeds it source events, flush ticks, animation frames and scroll
//! events, and passes the viewport to every call that touches layout.
//! [`crate::ChatRuntime`] is the async driver that does this on tokio.

use crate::anchor::{AnchorController, AnchorOutcome, FollowOutcome};
use crate::flusher::{FlushStep, StreamFlusher};
use crate::follow::{AutoFollowTracker, FollowChange};
use crate::matcher::AnswerMatcher;
use crate::source::SourcePlan;
use crate::streaming::StreamingEvent;
use crate::turn::{TurnContext, TurnId};
use crate::viewport::{ScrollMetrics, Viewport};
use elterngeld_config::{Config, Language, MessagesConfig};
use elterngeld_core::{CalculationContext, ChatRequest, Conversation, Message, TransportError};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// A turn the caller has to start a token source for
#[derive(Debug, Clone, PartialEq)]
pub struct TurnStart {
    pub turn: TurnId,
    pub plan: SourcePlan,
}

/// Result of one flush tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belongs to a turn that is no longer active
    Stale,
    /// Buffer empty, source still open
    Waiting,
    /// One unit was committed to the assistant message
    Committed,
    /// The turn finished; no more ticks are needed
    Completed,
}

/// Read-only projection rendered by the host
#[derive(Debug, Clone, PartialEq)]
pub struct ChatView {
    pub messages: Vec<Message>,
    pub suggestions: Vec<String>,
    pub is_loading: bool,
    pub show_jump_to_bottom: bool,
}

pub struct ChatSession {
    conversation: Conversation,
    anchor: AnchorController,
    follow: AutoFollowTracker,
    matcher: Arc<AnswerMatcher>,
    context: CalculationContext,
    messages: MessagesConfig,
    turn: Option<TurnContext>,
    next_turn: TurnId,
}

impl ChatSession {
    pub fn new(config: &Config, matcher: Arc<AnswerMatcher>) -> Self {
        Self {
            conversation: Conversation::new(),
            anchor: AnchorController::new(config.anchor.clone()),
            follow: AutoFollowTracker::new(config.follow.clone()),
            matcher,
            context: CalculationContext::default(),
            messages: config.messages.clone(),
            turn: None,
            next_turn: TurnId::first(),
        }
    }

    pub fn with_context(mut self, context: CalculationContext) -> Self {
        self.context = context;
        self
    }

    /// Replace the calculation context sent with later live requests
    pub fn set_context(&mut self, context: CalculationContext) {
        self.context = context;
    }

    pub fn context(&self) -> &CalculationContext {
        &self.context
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn anchor(&self) -> &AnchorController {
        &self.anchor
    }

    pub fn follow(&self) -> &AutoFollowTracker {
        &self.follow
    }

    pub fn is_loading(&self) -> bool {
        self.turn.is_some()
    }

    pub fn active_turn(&self) -> Option<TurnId> {
        self.turn.as_ref().map(|t| t.id)
    }

    /// Text received but not yet revealed
    pub fn pending_text(&self) -> &str {
        self.turn
            .as_ref()
            .map(|t| t.flusher.buffer().pending())
            .unwrap_or("")
    }

    pub fn view(&self) -> ChatView {
        ChatView {
            messages: self.conversation.messages().to_vec(),
            suggestions: self.conversation.suggestions().to_vec(),
            is_loading: self.is_loading(),
            show_jump_to_bottom: self.follow.show_jump_to_bottom(),
        }
    }

    /// Send a question.
    ///
    /// Ignored while an answer is still streaming or when `text` is blank.
    pub fn submit<V: Viewport + ?Sized>(&mut self, text: &str, viewport: &mut V) -> Option<TurnStart> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(turn) = self.active_turn() {
            debug!(%turn, "Submission ignored while answering");
            return None;
        }
        Some(self.start_turn(text.to_string(), viewport))
    }

    /// Drop the last answer and ask its question again.
    ///
    /// Cancels a streaming answer first. Returns `None` when there is no
    /// question to repeat.
    pub fn regenerate<V: Viewport + ?Sized>(&mut self, viewport: &mut V) -> Option<TurnStart> {
        self.cancel_turn(viewport);

        if self.conversation.last().is_some_and(Message::is_assistant) {
            self.conversation.truncate_last();
        }
        if !self.conversation.last().is_some_and(Message::is_user) {
            viewport.commit(self.conversation.messages());
            return None;
        }
        let question = self.conversation.truncate_last()?;
        info!("Regenerating answer");
        Some(self.start_turn(question.content, viewport))
    }

    /// Cancel any answer and empty the conversation
    pub fn reset<V: Viewport + ?Sized>(&mut self, viewport: &mut V) {
        self.cancel_turn(viewport);
        self.conversation.clear();
        self.anchor.clear(viewport);
        viewport.commit(self.conversation.messages());
        self.follow.engage();
        self.follow.resync(viewport.metrics());
        info!("Conversation reset");
    }

    /// The "jump to bottom" control was used
    pub fn scroll_to_bottom_requested<V: Viewport + ?Sized>(&mut self, viewport: &mut V) {
        self.follow.engage();
        self.anchor.clear(viewport);
        let bottom = viewport.metrics().max_scroll_top();
        self.follow.scroll_programmatically(viewport, bottom);
    }

    /// A scroll event not caused by [`ChatSession`] itself
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> FollowChange {
        self.follow.on_scroll(metrics)
    }

    /// The observed assistant element changed size
    pub fn on_resize<V: Viewport + ?Sized>(&mut self, viewport: &mut V) -> FollowOutcome {
        self.anchor.on_resize(viewport, &mut self.follow)
    }

    /// Whether an anchor is waiting for its elements to mount
    pub fn needs_animation_frame(&self) -> bool {
        self.anchor.is_anchoring()
    }

    /// Start of an animation frame: retry a pending anchor
    pub fn on_animation_frame<V: Viewport + ?Sized>(&mut self, viewport: &mut V) -> AnchorOutcome {
        viewport.next_frame();
        self.anchor.try_anchor(viewport, &mut self.follow)
    }

    /// Feed an event from the token source of `turn`
    pub fn on_source_event<V: Viewport + ?Sized>(
        &mut self,
        turn: TurnId,
        event: StreamingEvent,
        viewport: &mut V,
    ) {
        if self.active_turn() != Some(turn) {
            trace!(%turn, "Dropping event of inactive turn");
            return;
        }
        match event {
            StreamingEvent::Delta { text, .. } => {
                if let Some(active) = self.turn.as_mut() {
                    active.flusher.push(&text);
                }
            }
            StreamingEvent::Suggestions { items } => {
                debug!(%turn, count = items.len(), "Suggestions received");
                if let Err(e) = self.conversation.set_last_suggestions(items) {
                    warn!(%turn, error = %e, "Could not attach suggestions");
                }
            }
            StreamingEvent::Done { .. } => {
                if let Some(active) = self.turn.as_mut() {
                    active.flusher.mark_exhausted();
                }
            }
            StreamingEvent::Error { error } => self.fail_turn(error, viewport),
        }
    }

    /// One tick of the flush interval of `turn`
    pub fn tick<V: Viewport + ?Sized>(&mut self, turn: TurnId, viewport: &mut V) -> TickOutcome {
        if self.active_turn() != Some(turn) {
            return TickOutcome::Stale;
        }
        let Some(active) = self.turn.as_mut() else {
            return TickOutcome::Stale;
        };

        match active.flusher.tick() {
            FlushStep::Wait => TickOutcome::Waiting,
            FlushStep::Complete => {
                self.complete_turn(viewport);
                TickOutcome::Completed
            }
            FlushStep::Commit(content) => {
                if let Err(e) = self.conversation.mutate_last(content) {
                    warn!(%turn, error = %e, "Could not update answer");
                }
                viewport.commit(self.conversation.messages());
                if self.follow.auto_follow() {
                    self.anchor.follow(viewport, &mut self.follow);
                }
                TickOutcome::Committed
            }
        }
    }

    fn start_turn<V: Viewport + ?Sized>(&mut self, text: String, viewport: &mut V) -> TurnStart {
        let language = Language::detect(&text);
        let canned = self.matcher.lookup(&text, language).cloned();

        let (user_id, assistant_id) = self.conversation.append_pair(text);
        viewport.commit(self.conversation.messages());

        let plan = match canned {
            Some(answer) => SourcePlan::Canned(answer),
            None => SourcePlan::Live(ChatRequest::new(
                self.conversation.messages(),
                self.context.clone(),
                language,
            )),
        };

        let id = self.next_turn;
        self.next_turn = id.next();
        info!(turn = %id, %language, canned = plan.is_canned(), "Turn started");

        self.follow.engage();
        self.anchor.begin(user_id.clone(), assistant_id.clone());
        self.anchor.try_anchor(viewport, &mut self.follow);

        self.turn = Some(TurnContext::new(
            id,
            user_id,
            assistant_id,
            language,
            StreamFlusher::new(),
        ));
        TurnStart { turn: id, plan }
    }

    fn cancel_turn<V: Viewport + ?Sized>(&mut self, viewport: &mut V) {
        if let Some(active) = self.turn.take() {
            debug!(
                turn = %active.id,
                discarded = active.flusher.buffer().pending().len(),
                "Turn cancelled"
            );
            self.anchor.clear(viewport);
        }
    }

    fn complete_turn<V: Viewport + ?Sized>(&mut self, viewport: &mut V) {
        if let Some(active) = self.turn.take() {
            info!(turn = %active.id, answer_len = active.flusher.visible().len(), "Turn completed");
        }
        self.anchor.settle(viewport, &mut self.follow);
    }

    /// Replace the placeholder with a short explanation and end the turn
    fn fail_turn<V: Viewport + ?Sized>(&mut self, error: TransportError, viewport: &mut V) {
        let Some(active) = self.turn.take() else {
            return;
        };
        let texts = self.messages.for_language(active.language);
        let text = match error {
            TransportError::RateLimited => &texts.rate_limited,
            TransportError::Unavailable(_) => &texts.unavailable,
            _ => &texts.generic,
        };
        warn!(turn = %active.id, error = %error, "Answer failed");

        if let Err(e) = self.conversation.mutate_last(text.clone()) {
            warn!(turn = %active.id, error = %e, "Could not show error message");
        }
        viewport.commit(self.conversation.messages());
        self.anchor.settle(viewport, &mut self.follow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::CannedAnswer;
    use crate::viewport::HeadlessViewport;
    use elterngeld_config::{AnswerEntry, AnswerTableFile};
    use elterngeld_core::Role;

    fn session() -> ChatSession {
        let table = AnswerTableFile {
            de: vec![],
            en: vec![AnswerEntry {
                question: "Am I eligible?".into(),
                answer: "Yes, if your income is below the limit.".into(),
                suggestions: vec!["How much?".into(), "How long?".into()],
            }],
        };
        ChatSession::new(&Config::default(), Arc::new(AnswerMatcher::new(&table)))
    }

    fn drain<V: Viewport>(session: &mut ChatSession, turn: TurnId, viewport: &mut V) -> usize {
        let mut ticks = 0;
        while session.tick(turn, viewport) != TickOutcome::Completed {
            ticks += 1;
            assert!(ticks < 1000, "turn never completed");
        }
        ticks
    }

    #[test]
    fn test_submit_selects_canned_source() {
        let mut viewport = HeadlessViewport::new(400.0, 40);
        let mut session = session();

        let start = session.submit("  am i eligible? ", &mut viewport).unwrap();
        assert_eq!(
            start.plan,
            SourcePlan::Canned(CannedAnswer {
                answer: "Yes, if your income is below the limit.".into(),
                suggestions: vec!["How much?".into(), "How long?".into()],
            })
        );
        let messages = session.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "am i eligible?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[1].content.is_empty());
        assert!(session.is_loading());
    }

    #[test]
    fn test_submit_selects_live_source_with_history() {
        let mut viewport = HeadlessViewport::new(400.0, 40);
        let mut session = session().with_context(CalculationContext {
            monthly_net_income: Some(2400.0),
            ..Default::default()
        });

        let start = session
            .submit("Wie viel Elterngeld bekomme ich mit Teilzeit?", &mut viewport)
            .unwrap();
        let SourcePlan::Live(request) = start.plan else {
            panic!("expected live plan");
        };
        assert_eq!(request.language, Language::De);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.context.monthly_net_income, Some(2400.0));
    }

    #[test]
    fn test_submit_while_loading_is_ignored() {
        let mut viewport = HeadlessViewport::new(400.0, 40);
        let mut session = session();
        session.submit("Am I eligible?", &mut viewport).unwrap();

        assert!(session.submit("How much?", &mut viewport).is_none());
        assert!(session.submit("   ", &mut viewport).is_none());
        assert_eq!(session.conversation().len(), 2);
    }

    #[test]
    fn test_events_and_ticks_complete_turn() {
        let mut viewport = HeadlessViewport::new(400.0, 40);
        let mut session = session();
        let turn = session.submit("Am I eligible?", &mut viewport).unwrap().turn;

        assert_eq!(session.tick(turn, &mut viewport), TickOutcome::Waiting);
        session.on_source_event(
            turn,
            StreamingEvent::Delta { text: "Yes, you are.".into(), seq: 0 },
            &mut viewport,
        );
        session.on_source_event(
            turn,
            StreamingEvent::Suggestions { items: vec!["How much?".into()] },
            &mut viewport,
        );
        assert_eq!(session.tick(turn, &mut viewport), TickOutcome::Committed);
        assert_eq!(session.conversation().last().unwrap().content, "Yes,");
        assert_eq!(session.pending_text(), " you are.");

        session.on_source_event(
            turn,
            StreamingEvent::Done { full_response: "Yes, you are.".into() },
            &mut viewport,
        );
        // Remaining units: " ", "you", " ", "are."
        assert_eq!(drain(&mut session, turn, &mut viewport), 4);

        let view = session.view();
        assert!(!view.is_loading);
        assert_eq!(view.messages[1].content, "Yes, you are.");
        assert_eq!(view.suggestions, vec!["How much?"]);
        assert_eq!(viewport.spacer_height(), 0.0);
        assert_eq!(session.pending_text(), "");
    }

    #[test]
    fn test_rate_limit_replaces_placeholder() {
        let mut viewport = HeadlessViewport::new(400.0, 40);
        let mut session = session();
        let turn = session
            .submit("How is the allowance calculated?", &mut viewport)
            .unwrap()
            .turn;
        session.on_source_event(
            turn,
            StreamingEvent::Error { error: TransportError::RateLimited },
            &mut viewport,
        );

        let view = session.view();
        assert!(!view.is_loading);
        assert_eq!(view.messages.len(), 2);
        assert_eq!(
            view.messages[1].content,
            Config::default().messages.en.rate_limited
        );
        assert_eq!(session.tick(turn, &mut viewport), TickOutcome::Stale);
    }

    #[test]
    fn test_regenerate_cancels_and_resends() {
        let mut viewport = HeadlessViewport::new(400.0, 40);
        let mut session = session();
        let first = session.submit("Am I eligible?", &mut viewport).unwrap().turn;
        session.on_source_event(
            first,
            StreamingEvent::Delta { text: "partial answer".into(), seq: 0 },
            &mut viewport,
        );
        session.tick(first, &mut viewport);

        let second = session.regenerate(&mut viewport).unwrap();
        assert!(second.turn > first);
        assert_eq!(session.active_turn(), Some(second.turn));

        // Leftovers of the first turn change nothing
        assert_eq!(session.tick(first, &mut viewport), TickOutcome::Stale);
        session.on_source_event(
            first,
            StreamingEvent::Delta { text: "late".into(), seq: 1 },
            &mut viewport,
        );
        let messages = session.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "Am I eligible?");
        assert!(messages[1].content.is_empty());
        assert_eq!(session.pending_text(), "");
    }

    #[test]
    fn test_regenerate_without_question() {
        let mut viewport = HeadlessViewport::new(400.0, 40);
        let mut session = session();
        assert!(session.regenerate(&mut viewport).is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut viewport = HeadlessViewport::new(400.0, 40);
        let mut session = session();
        let turn = session.submit("Am I eligible?", &mut viewport).unwrap().turn;
        session.reset(&mut viewport);

        assert!(session.conversation().is_empty());
        assert!(!session.is_loading());
        assert_eq!(viewport.spacer_height(), 0.0);
        assert_eq!(session.tick(turn, &mut viewport), TickOutcome::Stale);
        assert!(session.submit("Am I eligible?", &mut viewport).is_some());
    }

    #[test]
    fn test_jump_to_bottom_reengages_follow() {
        let mut viewport = HeadlessViewport::new(200.0, 40);
        let mut session = session();
        for _ in 0..4 {
            let turn = session.submit("Am I eligible?", &mut viewport).unwrap().turn;
            session.on_source_event(
                turn,
                StreamingEvent::Delta { text: "Yes. ".repeat(20), seq: 0 },
                &mut viewport,
            );
            session.on_source_event(
                turn,
                StreamingEvent::Done { full_response: String::new() },
                &mut viewport,
            );
            drain(&mut session, turn, &mut viewport);
        }

        session.on_scroll(viewport.user_scroll_to(0.0));
        assert!(session.view().show_jump_to_bottom);

        session.scroll_to_bottom_requested(&mut viewport);
        assert!(!session.view().show_jump_to_bottom);
        let metrics = viewport.metrics();
        assert_eq!(metrics.scroll_top, metrics.max_scroll_top());
    }
}
