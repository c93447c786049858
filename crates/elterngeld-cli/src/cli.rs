use clap::{Args, Parser, Subcommand, ValueEnum};
use elterngeld_core::CalculationContext;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "elterngeld")]
#[command(about = "elterngeld - ask questions about German parental allowance")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute (defaults to chat if not provided)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Set log level (off, error, warn, info, debug, trace). Defaults to warn.
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/elterngeld/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Chat function URL (overrides config file)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[command(flatten)]
    pub context: ContextArgs,
}

impl Cli {
    /// Effective log level: `--log-level` wins over `--verbose`
    pub fn level_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::WARN,
        }
    }
}

/// Benefit figures forwarded to the chat function with every question
#[derive(Debug, Clone, Default, Args)]
pub struct ContextArgs {
    /// Average monthly net income before the birth, in euros
    #[arg(long, global = true, value_name = "EUROS")]
    pub income: Option<f64>,

    /// Another young child lives in the household
    #[arg(long, global = true)]
    pub sibling_bonus: bool,

    /// Twins, triplets or more
    #[arg(long, global = true)]
    pub multiple_birth: bool,
}

impl From<ContextArgs> for CalculationContext {
    fn from(args: ContextArgs) -> Self {
        CalculationContext {
            monthly_net_income: args.income,
            sibling_bonus: args.sibling_bonus,
            multiple_birth: args.multiple_birth,
            ..Default::default()
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ask a single question and stream the answer to stdout
    Ask {
        /// The question; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Interactive conversation (/regenerate, /reset, /bottom, /quit)
    Chat,
}
