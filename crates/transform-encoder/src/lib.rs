//! Transform Encoder - template-driven rendering of structured log records.
//!
//! Instead of writing a log event as JSON, the encoder serializes it into a
//! structured record and renders a user-defined template against it. It
//! supports:
//!
//! - Nested paths: `{request>headers>X-Forwarded-For>[0]}`
//! - Fallback chains: `{user_id:username:client_ip}`
//! - A default value for placeholders that resolve to nothing
//! - Raw or JSON-decoded string values
//! - The Common Log Format as a built-in template
//!
//! # Quick Start
//!
//! ```rust
//! use transform_encoder::{Entry, Field, TransformConfig, TransformEncoder};
//! use serde_json::json;
//!
//! let encoder = TransformEncoder::provision(TransformConfig {
//!     template: Some("{request>method} {request>uri} {status} {user_id}".into()),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let line = encoder
//!     .encode_entry(
//!         &Entry::new(tracing::Level::INFO, "handled request"),
//!         &[
//!             Field::json("request", json!({"method": "GET", "uri": "/"})),
//!             Field::u64("status", 200),
//!         ],
//!     )
//!     .unwrap();
//!
//! assert_eq!(line, b"GET / 200 -\n");
//! ```
//!
//! # Pipeline
//!
//! ```text
//! Entry + Fields --RecordSerializer--> record bytes --Template--> line
//! ```
//!
//! 1. The [`RecordSerializer`] (by default [`JsonSerializer`]) writes the entry
//!    and its fields as one nested record, honoring [`EncoderOptions`].
//! 2. Each placeholder is resolved against the record with the
//!    [`path`] resolver. Globals like `{env.HOME}` are tried first.
//! 3. `\"` is normalized to `"` and the line is newline-terminated.
//!
//! Rendering never fails. Configuration errors surface once, from
//! [`TransformConfig::provision`].
//!
//! # Configuration
//!
//! | Field | Default | Meaning |
//! |-------|---------|---------|
//! | `template` | Common Log Format | template text, `{common_log}` is a shortcut |
//! | `placeholder` | `-` | value for unresolved placeholders |
//! | `unescape_strings` | `false` | decode JSON escapes in string values |
//! | encoder options | see [`EncoderOptions`] | record keys and formats |

pub mod config;
mod encoder;
mod error;
pub mod options;
pub mod path;
pub mod record;
pub mod template;

// Re-export public API
pub use config::{RenderConfig, TransformConfig};
pub use encoder::TransformEncoder;
pub use error::{ConfigError, Result, SerializeError};
pub use options::EncoderOptions;
pub use record::{Entry, Field, FieldValue, JsonSerializer, RecordSerializer};
pub use template::Template;
