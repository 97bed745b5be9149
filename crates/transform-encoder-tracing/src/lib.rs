//! Transform Encoder for `tracing` - renders events through a template.
//!
//! [`TransformFormat`] plugs a [`TransformEncoder`] into `tracing-subscriber`
//! as a [`FormatEvent`]. Each event becomes an [`Entry`] plus [`Field`]s:
//!
//! | Event data | Record key |
//! |------------|------------|
//! | level | `level` |
//! | target | `logger` |
//! | `file:line` | `caller` |
//! | `message` field | `msg` |
//! | other fields | their own names |
//! | enclosing span names, root first | `spans` |
//!
//! Keys follow the encoder options, so a renamed `message_key` applies here too.
//!
//! ```rust,no_run
//! use transform_encoder::TransformConfig;
//! use transform_encoder_tracing::TransformFormat;
//!
//! let format = TransformFormat::from_config(TransformConfig {
//!     template: Some("{level} {logger} {msg} user={user}".into()),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! tracing_subscriber::fmt().event_format(format).init();
//! tracing::info!(user = "john", "signed in");
//! ```

use std::fmt::{self, Write as _};

use serde_json::Value;
use tracing::field::{Field as EventField, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use transform_encoder::{
    Entry, Field, FieldValue, JsonSerializer, RecordSerializer, TransformConfig, TransformEncoder,
};

/// Name of the field holding the enclosing span names.
pub const SPANS_KEY: &str = "spans";

/// Event formatter that renders through a [`TransformEncoder`].
///
/// Events the serializer fails to encode produce no output at all.
#[derive(Debug, Clone)]
pub struct TransformFormat<S = JsonSerializer> {
    encoder: TransformEncoder<S>,
}

impl TransformFormat<JsonSerializer> {
    /// Provisions an encoder from `config` and wraps it.
    pub fn from_config(config: TransformConfig) -> transform_encoder::Result<Self> {
        TransformEncoder::provision(config).map(Self::new)
    }
}

impl<S: RecordSerializer> TransformFormat<S> {
    pub fn new(encoder: TransformEncoder<S>) -> Self {
        Self { encoder }
    }

    pub fn encoder(&self) -> &TransformEncoder<S> {
        &self.encoder
    }
}

impl<S, Sub, N> FormatEvent<Sub, N> for TransformFormat<S>
where
    S: RecordSerializer,
    Sub: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, Sub, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);

        let mut entry =
            Entry::new(*meta.level(), visitor.message.unwrap_or_default()).with_logger(meta.target());
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            entry = entry.with_caller(format!("{}:{}", file, line));
        }

        let mut fields = visitor.fields;
        if let Some(scope) = ctx.event_scope() {
            let names: Vec<Value> = scope
                .from_root()
                .map(|span| Value::from(span.name()))
                .collect();
            if !names.is_empty() {
                fields.push(Field::json(SPANS_KEY, Value::Array(names)));
            }
        }

        // A failed record is dropped; returning an error would make the fmt
        // layer write its own diagnostic line into the same sink.
        match self.encoder.encode_entry(&entry, &fields) {
            Ok(line) => writer.write_str(&String::from_utf8_lossy(&line)),
            Err(_) => Ok(()),
        }
    }
}

/// Collects event fields, keeping `message` apart.
#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: Vec<Field>,
}

impl FieldCollector {
    fn push(&mut self, field: &EventField, value: FieldValue) {
        if field.name() != "message" {
            self.fields.push(Field::new(field.name(), value));
            return;
        }
        self.message = Some(match value {
            FieldValue::String(s) => s,
            FieldValue::I64(n) => n.to_string(),
            FieldValue::U64(n) => n.to_string(),
            FieldValue::F64(n) => n.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Duration(d) => format!("{:?}", d),
            FieldValue::Json(v) => v.to_string(),
            FieldValue::Null => String::new(),
        });
    }
}

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &EventField, value: f64) {
        self.push(field, FieldValue::F64(value));
    }

    fn record_i64(&mut self, field: &EventField, value: i64) {
        self.push(field, FieldValue::I64(value));
    }

    fn record_u64(&mut self, field: &EventField, value: u64) {
        self.push(field, FieldValue::U64(value));
    }

    fn record_bool(&mut self, field: &EventField, value: bool) {
        self.push(field, FieldValue::Bool(value));
    }

    fn record_str(&mut self, field: &EventField, value: &str) {
        self.push(field, FieldValue::String(value.to_string()));
    }

    fn record_error(&mut self, field: &EventField, value: &(dyn std::error::Error + 'static)) {
        self.push(field, FieldValue::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &EventField, value: &dyn fmt::Debug) {
        self.push(field, FieldValue::String(format!("{:?}", value)));
    }
}
