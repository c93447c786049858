//! Per-turn state
//!
//! Everything that lives only while one assistant answer is being produced is
//! held in a [`TurnContext`]. Events and ticks carry the [`TurnId`] they were
//! created for, so leftovers of a cancelled turn are recognised and dropped.

use crate::flusher::StreamFlusher;
use elterngeld_config::Language;
use elterngeld_core::MessageId;
use std::fmt;

/// Identifies one submission; increases monotonically within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TurnId(u64);

impl TurnId {
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn-{}", self.0)
    }
}

/// State of the turn whose answer is streaming
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub id: TurnId,
    pub user_id: MessageId,
    pub assistant_id: MessageId,
    pub language: Language,
    pub flusher: StreamFlusher,
}

impl TurnContext {
    pub fn new(
        id: TurnId,
        user_id: MessageId,
        assistant_id: MessageId,
        language: Language,
        flusher: StreamFlusher,
    ) -> Self {
        Self {
            id,
            user_id,
            assistant_id,
            language,
            flusher,
        }
    }
}
