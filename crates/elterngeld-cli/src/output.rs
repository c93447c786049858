//! Incremental terminal rendering of a streaming answer

use elterngeld_chat::ChatSession;
use std::io::{self, Write};

/// Writes the growing assistant message as it is revealed.
///
/// Only the new suffix is written on each update. When the content is
/// replaced rather than extended (a failed answer), the replacement is
/// written on a fresh line.
pub struct AnswerPrinter<W: Write> {
    out: W,
    printed: String,
}

impl AnswerPrinter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AnswerPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: String::new(),
        }
    }

    /// Start a new answer
    pub fn reset(&mut self) {
        self.printed.clear();
    }

    pub fn update(&mut self, session: &ChatSession) -> io::Result<()> {
        let Some(last) = session.conversation().last().filter(|m| m.is_assistant()) else {
            return Ok(());
        };
        let content = last.content.as_str();
        if content == self.printed {
            return Ok(());
        }

        if let Some(suffix) = content.strip_prefix(self.printed.as_str()) {
            write!(self.out, "{suffix}")?;
        } else {
            if !self.printed.is_empty() {
                writeln!(self.out)?;
            }
            write!(self.out, "{content}")?;
        }
        self.printed = content.to_string();
        self.out.flush()
    }

    /// Close the answer and list follow-up suggestions
    pub fn finish(&mut self, session: &ChatSession) -> io::Result<()> {
        self.update(session)?;
        writeln!(self.out)?;
        let suggestions = session.conversation().suggestions();
        if !suggestions.is_empty() {
            writeln!(self.out)?;
            for suggestion in suggestions {
                writeln!(self.out, "  > {suggestion}")?;
            }
        }
        self.printed.clear();
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
