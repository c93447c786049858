//! Chat streaming and scroll anchoring for the Elterngeld assistant
//!
//! ## Streaming
//!
//! A submission selects a token source: a predefined answer when the question
//! matches the answer table exactly, the live chat function otherwise. Source
//! events are buffered and revealed one word or whitespace run per flush tick.
//!
//! ## Scrolling
//!
//! - `AnchorController` pins the new question near the top of the viewport
//!   with a trailing spacer that shrinks as the answer grows
//! - `AutoFollowTracker` decides from user scrolls whether new content is
//!   revealed automatically
//!
//! `ChatSession` ties both together without I/O; `ChatRuntime` drives it on
//! tokio.

pub mod anchor;
pub mod flusher;
pub mod follow;
pub mod http;
pub mod matcher;
pub mod runtime;
pub mod scroll;
pub mod session;
pub mod source;
pub mod streaming;
pub mod turn;
pub mod viewport;

pub use anchor::{AnchorController, AnchorOutcome, AnchorState, FollowOutcome};
pub use flusher::{FlushStep, StreamFlusher, StreamingBuffer};
pub use follow::{AutoFollowTracker, FollowChange};
pub use http::HttpChatTransport;
pub use matcher::{AnswerMatcher, CannedAnswer};
pub use runtime::{ChatRuntime, RuntimeStep};
pub use scroll::{ScrollMath, ScrollToken};
pub use session::{ChatSession, ChatView, TickOutcome, TurnStart};
pub use source::{SourceEvent, SourcePlan, SourceStream, TokenSource};
pub use streaming::{StreamingEvent, StreamingTask, TurnEvent};
pub use turn::{TurnContext, TurnId};
pub use viewport::{ElementRect, HeadlessViewport, ScrollMetrics, SpacerTransition, Viewport};
