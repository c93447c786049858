use crate::output::AnswerPrinter;
use anyhow::{bail, Result};
use elterngeld_config::Config;
use elterngeld_core::CalculationContext;

/// Stream the answer to one question
pub async fn execute(config: Config, context: CalculationContext, question: String) -> Result<()> {
    let mut runtime = super::build_runtime(&config, context).await?;
    if !runtime.submit(&question) {
        bail!("The question is empty");
    }

    let mut printer = AnswerPrinter::stdout();
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
