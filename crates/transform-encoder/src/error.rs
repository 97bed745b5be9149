//! Error types for provisioning and record serialization.
//!
//! Rendering itself has no error type: a placeholder that resolves to nothing
//! is replaced by the default value. Failures only happen while building the
//! encoder from configuration ([`ConfigError`]) or inside the structured
//! record serializer ([`SerializeError`]).

use std::io;

use thiserror::Error;

/// Errors raised while loading or provisioning a transform configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A template was configured but is empty.
    #[error("missing template for transform log encoder")]
    MissingTemplate,

    /// An option has a value the encoder cannot use.
    #[error("invalid value for '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    /// The directive dialect could not be parsed.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// JSON configuration could not be parsed.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration could not be parsed.
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Reading a configuration file failed.
    #[error("failed to read configuration: {0}")]
    Io(#[from] io::Error),
}

impl ConfigError {
    /// Create an invalid-option error.
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a syntax error for the given 1-based line.
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Failure of the JSON record serializer.
#[derive(Debug, Error)]
#[error("failed to serialize log record: {0}")]
pub struct SerializeError(#[from] serde_json::Error);

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
