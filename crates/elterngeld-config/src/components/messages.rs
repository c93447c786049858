//! User-facing texts shown in place of a failed answer

use crate::Language;
use serde::{Deserialize, Serialize};

/// Error texts for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorTexts {
    /// Shown when the chat function reports too many requests
    pub rate_limited: String,
    /// Shown when the chat function is temporarily unavailable
    pub unavailable: String,
    /// Shown for every other failure
    pub generic: String,
}

/// Error texts for every supported language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// German texts
    pub de: ErrorTexts,
    /// English texts
    pub en: ErrorTexts,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            de: ErrorTexts {
                rate_limited: "Es gehen gerade sehr viele Anfragen ein. Bitte versuche es in einer Minute noch einmal.".to_string(),
                unavailable: "Der Assistent ist vorübergehend nicht erreichbar. Bitte versuche es später erneut.".to_string(),
                generic: "Entschuldigung, bei der Antwort ist ein Fehler aufgetreten. Bitte sende deine Frage erneut.".to_string(),
            },
            en: ErrorTexts {
                rate_limited: "We are receiving a lot of requests right now. Please try again in a minute.".to_string(),
                unavailable: "The assistant is temporarily unavailable. Please try again later.".to_string(),
                generic: "Sorry, something went wrong while answering. Please send your question again.".to_string(),
            },
        }
    }
}

impl MessagesConfig {
    /// Texts for the given language
    pub fn for_language(&self, language: Language) -> &ErrorTexts {
        match language {
            Language::De => &self.de,
            Language::En => &self.en,
        }
    }
}
