//! On-disk format of the bilingual predefined-answer table

use crate::{ConfigError, ConfigResult, Language};
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_ANSWERS: &str = include_str!("../data/answers.toml");

/// One canned question with its answer and follow-up suggestions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    /// Question text as a user would type it
    pub question: String,
    /// Complete answer played back by the canned token source
    pub answer: String,
    /// Follow-up questions offered after the answer
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Predefined answers grouped by language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerTableFile {
    /// German entries
    pub de: Vec<AnswerEntry>,
    /// English entries
    pub en: Vec<AnswerEntry>,
}

impl AnswerTableFile {
    /// The table shipped with the crate
    pub fn builtin() -> ConfigResult<Self> {
        Self::parse(BUILTIN_ANSWERS)
    }

    /// Parse a table from TOML text
    pub fn parse(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a table from a TOML file
    pub async fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let table = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            de = table.de.len(),
            en = table.en.len(),
            "Loaded predefined answers"
        );
        Ok(table)
    }

    /// Entries for one language
    pub fn entries(&self, language: Language) -> &[AnswerEntry] {
        match language {
            Language::De => &self.de,
            Language::En => &self.en,
        }
    }
}
