use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use elterngeld_cli::{
    cli::{Cli, Commands},
    commands,
};
use elterngeld_config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so answers on stdout stay clean
    let env_filter = EnvFilter::builder()
        .with_default_directive(cli.level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load_or_default(cli.config.clone())
        .await
        .context("Failed to load configuration")?;
    if let Some(endpoint) = cli.endpoint.clone() {
        config.transport.endpoint = endpoint;
    }
    config.validate().context("Invalid configuration")?;
    debug!(endpoint = %config.transport.endpoint, "Configuration loaded");

    let context = cli.context.into();
    match cli.command {
        Some(Commands::Ask { question }) => {
            commands::ask::execute(config, context, question.join(" ")).await?
        }
        Some(Commands::Chat) | None => commands::chat::execute(config, context).await?,
    }

    Ok(())
}
