//! Language tags for the bilingual answer table and user-facing texts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the assistant answers in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// German
    #[default]
    De,
    /// English
    En,
}

/// Frequent German words that rarely occur in English questions
const GERMAN_MARKERS: &[&str] = &[
    "ich", "bin", "wie", "viel", "lange", "wann", "wer", "was", "mein", "meine", "mir", "und",
    "oder", "nicht", "bekomme", "kann", "habe", "ist", "der", "die", "das", "ein", "eine",
    "für", "mit", "elterngeld", "elternzeit", "kind", "monate", "einkommen", "anspruch",
];

/// Frequent English words that rarely occur in German questions
const ENGLISH_MARKERS: &[&str] = &[
    "i", "am", "is", "are", "how", "much", "long", "when", "who", "what", "my", "the", "and",
    "or", "not", "can", "do", "does", "get", "eligible", "child", "months", "income", "allowance",
    "parental",
];

impl Language {
    /// Guess the language of a question.
    ///
    /// Umlauts and ß decide immediately. Otherwise the words are scored against
    /// two small marker lists; ties fall back to German, the primary audience.
    pub fn detect(text: &str) -> Self {
        if text.chars().any(|c| matches!(c, 'ä' | 'ö' | 'ü' | 'Ä' | 'Ö' | 'Ü' | 'ß')) {
            return Language::De;
        }

        let mut german = 0usize;
        let mut english = 0usize;
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            if GERMAN_MARKERS.contains(&word.as_str()) {
                german += 1;
            }
            if ENGLISH_MARKERS.contains(&word.as_str()) {
                english += 1;
            }
        }

        if english > german {
            Language::En
        } else {
            Language::De
        }
    }

    /// ISO 639-1 code
    pub fn code(self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
