//! Predefined-answer lookup
//!
//! Exact matching only: a question matches an entry when both are equal after
//! trimming and lowercasing. A hit is played back locally without contacting
//! the chat function.

use elterngeld_config::{AnswerTableFile, Language};
use std::collections::HashMap;
use tracing::debug;

/// A complete answer with its follow-up suggestions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedAnswer {
    pub answer: String,
    pub suggestions: Vec<String>,
}

/// Index over the bilingual answer table
#[derive(Debug, Clone, Default)]
pub struct AnswerMatcher {
    entries: HashMap<(Language, String), CannedAnswer>,
}

fn normalize(question: &str) -> String {
    question.trim().to_lowercase()
}

impl AnswerMatcher {
    pub fn new(table: &AnswerTableFile) -> Self {
        let mut entries = HashMap::new();
        for language in [Language::De, Language::En] {
            for entry in table.entries(language) {
                entries
                    .entry((language, normalize(&entry.question)))
                    .or_insert_with(|| CannedAnswer {
                        answer: entry.answer.clone(),
                        suggestions: entry.suggestions.clone(),
                    });
            }
        }
        debug!(entries = entries.len(), "Built answer index");
        Self { entries }
    }

    /// A matcher that never matches
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Answer for `question` in `language`, if the table has one
    pub fn lookup(&self, question: &str, language: Language) -> Option<&CannedAnswer> {
        self.entries.get(&(language, normalize(question)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elterngeld_config::AnswerEntry;
    use test_case::test_case;

    fn table() -> AnswerTableFile {
        AnswerTableFile {
            de: vec![AnswerEntry {
                question: "Habe ich Anspruch auf Elterngeld?".into(),
                answer: "Ja.".into(),
                suggestions: vec![],
            }],
            en: vec![AnswerEntry {
                question: "Am I eligible?".into(),
                answer: "Yes, if your income is below the limit.".into(),
                suggestions: vec!["How much?".into(), "How long?".into()],
            }],
        }
    }

    #[test_case("Am I eligible?"; "exact")]
    #[test_case("  am i ELIGIBLE?\n"; "case and whitespace")]
    fn test_lookup_matches(question: &str) {
        let matcher = AnswerMatcher::new(&table());
        let hit = matcher.lookup(question, Language::En).unwrap();
        assert_eq!(hit.answer, "Yes, if your income is below the limit.");
        assert_eq!(hit.suggestions, vec!["How much?", "How long?"]);
    }

    #[test_case("Am I eligible", Language::En; "missing punctuation")]
    #[test_case("Am I really eligible?", Language::En; "extra word")]
    #[test_case("Am I eligible?", Language::De; "other language")]
    fn test_lookup_misses(question: &str, language: Language) {
        let matcher = AnswerMatcher::new(&table());
        assert!(matcher.lookup(question, language).is_none());
    }

    #[test]
    fn test_builtin_table_indexes_both_languages() {
        let matcher = AnswerMatcher::new(&AnswerTableFile::builtin().unwrap());
        assert!(matcher
            .lookup("Habe ich Anspruch auf Elterngeld?", Language::De)
            .is_some());
        assert!(matcher.lookup("Am I eligible?", Language::En).is_some());
        assert!(AnswerMatcher::empty().is_empty());
    }
}
