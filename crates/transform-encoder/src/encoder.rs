//! The transform encoder.
//!
//! [`TransformEncoder`] pairs a provisioned [`RenderConfig`] with a
//! [`RecordSerializer`]. Each call to [`encode_entry`](TransformEncoder::encode_entry)
//! serializes the event into a fresh record buffer, renders the template
//! against it, then reuses the same buffer for the rendered line. The buffer
//! never outlives the call, so one encoder can be shared across threads.

use crate::config::{RenderConfig, TransformConfig};
use crate::error::Result;
use crate::record::{Entry, Field, JsonSerializer, RecordSerializer};

/// Renders log events through a user-defined template.
///
/// # Example
///
/// ```rust
/// use transform_encoder::{Entry, Field, TransformConfig, TransformEncoder};
///
/// let encoder = TransformEncoder::provision(TransformConfig {
///     template: Some("{msg} {username}".into()),
///     ..Default::default()
/// })
/// .unwrap();
///
/// let line = encoder
///     .encode_entry(
///         &Entry::new(tracing::Level::INFO, "lob\nlaw"),
///         &[Field::string("username", "john\ndoe")],
///     )
///     .unwrap();
/// assert_eq!(line, b"lob\\nlaw john\\ndoe\n");
/// ```
#[derive(Debug, Clone)]
pub struct TransformEncoder<S = JsonSerializer> {
    config: RenderConfig,
    serializer: S,
}

impl TransformEncoder<JsonSerializer> {
    /// Provisions the encoder with a JSON serializer built from the options.
    pub fn provision(config: TransformConfig) -> Result<Self> {
        let config = config.provision()?;
        let serializer = JsonSerializer::new(config.options().clone())?;
        Ok(Self { config, serializer })
    }
}

impl<S: RecordSerializer> TransformEncoder<S> {
    /// Provisions the encoder on top of another serializer.
    ///
    /// The encoder options in `config` are still validated but only the
    /// serializer decides the record layout.
    pub fn with_serializer(config: TransformConfig, serializer: S) -> Result<Self> {
        Ok(Self {
            config: config.provision()?,
            serializer,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    /// Returns a clone that writes `field` into every record.
    pub fn with_field(&self, field: Field) -> Self {
        let mut encoder = self.clone();
        encoder.serializer.add_field(field);
        encoder
    }

    /// Encodes one event as a rendered, newline-terminated line.
    ///
    /// Serializer errors are returned as-is and nothing is rendered.
    pub fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> std::result::Result<Vec<u8>, S::Error> {
        let mut buf = self.serializer.encode(entry, fields)?;
        let line = self.config.render(&buf);
        buf.clear();
        buf.extend_from_slice(line.as_bytes());
        Ok(buf)
    }
}
