//! Encoder configuration and provisioning.
//!
//! [`TransformConfig`] is what users write: the generic [`EncoderOptions`]
//! flattened together with the template-specific fields. It can be
//! deserialized from JSON or YAML, or parsed from the directive dialect:
//!
//! ```text
//! transform "{request>method} {request>uri} {status}" {
//!     placeholder n/a
//!     unescape_strings
//!     time_format rfc3339
//! }
//! ```
//!
//! [`TransformConfig::provision`] applies the defaults exactly once and yields
//! an immutable [`RenderConfig`]:
//!
//! - no template: the Common Log Format template
//! - template `{common_log}`: the same
//! - Common Log Format template: the matching time format
//! - no placeholder (or an empty one): `-`
//!
//! An empty template is a configuration error.

mod directive;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::options::{EncoderOptions, COMMON_LOG_TIME_FORMAT};
use crate::template::{Template, COMMON_LOG_FORMAT, COMMON_LOG_SHORTCUT, DEFAULT_PLACEHOLDER};

pub use directive::parse_directive;

/// User-facing configuration of the transform encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    #[serde(flatten)]
    pub options: EncoderOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unescape_strings: bool,
}

impl TransformConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses the directive dialect, see [`parse_directive`].
    pub fn from_directive(input: &str) -> Result<Self> {
        parse_directive(input)
    }

    /// Loads a configuration file.
    ///
    /// `.json` files are JSON, `.yaml`/`.yml` files are YAML, anything else is
    /// read as the directive dialect.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml" | "yml") => Self::from_yaml(&content),
            _ => Self::from_directive(&content),
        }
    }

    /// Applies defaults and validates the options.
    pub fn provision(self) -> Result<RenderConfig> {
        let template = match self.template.as_deref() {
            None | Some(COMMON_LOG_SHORTCUT) => COMMON_LOG_FORMAT,
            Some("") => return Err(ConfigError::MissingTemplate),
            Some(template) => template,
        };
        let template = Template::parse(template);

        let mut options = self.options;
        if template.is_common_log() {
            options.time_format = Some(COMMON_LOG_TIME_FORMAT.to_string());
        }
        options.formats()?;

        let placeholder = match self.placeholder {
            Some(placeholder) if !placeholder.is_empty() => placeholder,
            _ => DEFAULT_PLACEHOLDER.to_string(),
        };

        tracing::debug!(
            template = template.as_str(),
            placeholder = placeholder.as_str(),
            unescape_strings = self.unescape_strings,
            time_format = options.time_format.as_deref().unwrap_or("unix_seconds_float"),
            "provisioned transform encoder"
        );

        Ok(RenderConfig {
            options,
            template,
            placeholder,
            unescape_strings: self.unescape_strings,
        })
    }
}

/// Provisioned, immutable render configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    options: EncoderOptions,
    template: Template,
    placeholder: String,
    unescape_strings: bool,
}

impl RenderConfig {
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Value substituted for placeholders that resolve to nothing.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn unescape_strings(&self) -> bool {
        self.unescape_strings
    }

    /// Renders the template against a structured record.
    pub fn render(&self, record: &[u8]) -> String {
        self.template
            .render(record, self.unescape_strings, &self.placeholder)
    }
}
