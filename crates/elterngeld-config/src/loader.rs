//! Top-level configuration and file loading

use crate::components::{AnchorConfig, FollowConfig, MessagesConfig, StreamingConfig, TransportConfig};
use crate::defaults::{APP_DIR_NAME, CONFIG_FILE_NAME};
use crate::AnswerTableFile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted path of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete assistant configuration
///
/// Every section is optional in the file; missing sections take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Flusher cadence
    pub streaming: StreamingConfig,
    /// Scroll anchoring geometry
    pub anchor: AnchorConfig,
    /// Auto-follow hysteresis
    pub follow: FollowConfig,
    /// Live chat transport
    pub transport: TransportConfig,
    /// Error texts per language
    pub messages: MessagesConfig,
    /// Replacement for the built-in predefined-answer table
    pub answers_path: Option<PathBuf>,
}

impl Config {
    /// Default location: `<config dir>/elterngeld/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub async fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, else the default path if it exists, else defaults.
    ///
    /// An explicitly given path must exist.
    pub async fn load_or_default(path: Option<PathBuf>) -> ConfigResult<Self> {
        if let Some(path) = path {
            return Self::load(path).await;
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path).await,
            _ => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.streaming.flush_interval_ms == 0 {
            return Err(invalid("streaming.flush_interval_ms", "must be greater than zero"));
        }
        if !(self.anchor.top_offset >= 0.0) {
            return Err(invalid("anchor.top_offset", "must not be negative"));
        }
        if !(self.anchor.noise_threshold >= 0.0) {
            return Err(invalid("anchor.noise_threshold", "must not be negative"));
        }
        if self.anchor.zero_streak == 0 {
            return Err(invalid("anchor.zero_streak", "must be at least 1"));
        }
        if !(self.follow.engage_distance >= 0.0) {
            return Err(invalid("follow.engage_distance", "must not be negative"));
        }
        if self.follow.engage_distance >= self.follow.disengage_distance {
            return Err(invalid(
                "follow.engage_distance",
                "must be smaller than follow.disengage_distance",
            ));
        }
        if self.transport.endpoint.trim().is_empty() {
            return Err(invalid("transport.endpoint", "must not be empty"));
        }
        Ok(())
    }

    /// The configured answer table, or the built-in one
    pub async fn answer_table(&self) -> ConfigResult<AnswerTableFile> {
        match &self.answers_path {
            Some(path) => AnswerTableFile::load(path).await,
            None => AnswerTableFile::builtin(),
        }
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
