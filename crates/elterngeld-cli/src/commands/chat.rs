use crate::output::AnswerPrinter;
use anyhow::Result;
use elterngeld_chat::{ChatRuntime, Viewport};
use elterngeld_config::Config;
use elterngeld_core::CalculationContext;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// A line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Question(String),
    Regenerate,
    Reset,
    Bottom,
    Quit,
    Empty,
    Unknown(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => Input::Empty,
            "/regenerate" | "/r" => Input::Regenerate,
            "/reset" => Input::Reset,
            "/bottom" | "/b" => Input::Bottom,
            "/quit" | "/q" | "/exit" => Input::Quit,
            command if command.starts_with('/') => Input::Unknown(command.to_string()),
            question => Input::Question(question.to_string()),
        }
    }
}

/// Interactive question loop on stdin
pub async fn execute(config: Config, context: CalculationContext) -> Result<()> {
    let mut runtime = super::build_runtime(&config, context).await?;
    let mut printer = AnswerPrinter::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Elterngeld assistant. Ask a question, or /quit to leave.");
    loop {
        print!("\n? ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let started = match Input::parse(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Question(question) => runtime.submit(&question),
            Input::Regenerate => {
                let started = runtime.regenerate();
                if !started {
                    println!("Nothing to regenerate yet.");
                }
                started
            }
            Input::Reset => {
                runtime.reset();
                println!("Conversation cleared.");
                false
            }
            Input::Bottom => {
                runtime.scroll_to_bottom_requested();
                let metrics = runtime.viewport().metrics();
                debug!(scroll_top = metrics.scroll_top, "Jumped to bottom");
                false
            }
            Input::Unknown(command) => {
                println!("Unknown command {command}. Try /regenerate, /reset, /bottom or /quit.");
                false
            }
        };

        if started {
            answer(&mut runtime, &mut printer).await?;
        }
    }
    Ok(())
}

async fn answer<V: Viewport>(
    runtime: &mut ChatRuntime<V>,
    printer: &mut AnswerPrinter<std::io::Stdout>,
) -> Result<()> {
    printer.reset();
    let mut write_error = None;
    runtime
        .run_until_idle(|session| {
            if let Err(e) = printer.update(session) {
                write_error.get_or_insert(e);
            }
        })
        .await;
    if let Some(e) = write_error {
        return Err(e.into());
    }
    printer.finish(runtime.session())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(Input::parse("  "), Input::Empty);
        assert_eq!(Input::parse("/quit"), Input::Quit);
        assert_eq!(Input::parse("/r"), Input::Regenerate);
        assert_eq!(Input::parse("/reset"), Input::Reset);
        assert_eq!(Input::parse("/bottom"), Input::Bottom);
        assert_eq!(Input::parse("/foo"), Input::Unknown("/foo".into()));
        assert_eq!(
            Input::parse(" Am I eligible? \n"),
            Input::Question("Am I eligible?".into())
        );
    }
}
