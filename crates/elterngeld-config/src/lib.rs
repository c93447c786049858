//! # Elterngeld Assistant Configuration
//!
//! Typed configuration for the chat core: streaming cadence, scroll anchoring,
//! auto-follow thresholds, the chat transport and the per-language error texts.
//! Also owns the on-disk format of the bilingual predefined-answer table.
//!
//! ```rust,no_run
//! use elterngeld_config::Config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_default(None).await?;
//! assert_eq!(config.streaming.flush_interval_ms, 25);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod answers;
pub mod components;
pub mod defaults;
mod language;
mod loader;

pub use answers::{AnswerEntry, AnswerTableFile};
pub use components::*;
pub use language::Language;
pub use loader::{Config, ConfigError, ConfigResult};
