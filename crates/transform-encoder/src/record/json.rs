use serde_json::Value;

use super::{Entry, Field, FieldValue, RecordSerializer};
use crate::error::{Result, SerializeError};
use crate::options::{EncoderOptions, Formats};

/// Writes entries as one JSON object per record.
///
/// Entry fields come first (level, time, logger, caller, message, stack trace),
/// each under its configured key, followed by context fields and then the
/// event's own fields, in insertion order. Keys are written as given, so a
/// field named like an entry key produces a duplicate key; readers take the
/// first one.
///
/// # Example
///
/// ```rust
/// use transform_encoder::{Entry, EncoderOptions, Field, JsonSerializer, RecordSerializer};
///
/// let serializer = JsonSerializer::new(EncoderOptions {
///     time_key: Some(String::new()),
///     ..Default::default()
/// })
/// .unwrap();
///
/// let entry = Entry::new(tracing::Level::INFO, "started");
/// let record = serializer.encode(&entry, &[Field::u64("port", 8080)]).unwrap();
/// assert_eq!(record, b"{\"level\":\"info\",\"msg\":\"started\",\"port\":8080}\n");
/// ```
#[derive(Debug, Clone)]
pub struct JsonSerializer {
    options: EncoderOptions,
    formats: Formats,
    context: Vec<Field>,
}

impl JsonSerializer {
    /// Creates a serializer, validating the format names in `options`.
    pub fn new(options: EncoderOptions) -> Result<Self> {
        let formats = options.formats()?;
        Ok(Self {
            options,
            formats,
            context: Vec::new(),
        })
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Context fields added with [`RecordSerializer::add_field`].
    pub fn context(&self) -> &[Field] {
        &self.context
    }

    fn field_value(&self, value: &FieldValue) -> Value {
        match value {
            FieldValue::String(s) => Value::from(s.as_str()),
            FieldValue::I64(n) => Value::from(*n),
            FieldValue::U64(n) => Value::from(*n),
            FieldValue::F64(n) => Value::from(*n),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Duration(d) => self.formats.duration.format(*d),
            FieldValue::Json(v) => v.clone(),
            FieldValue::Null => Value::Null,
        }
    }
}

struct ObjectWriter {
    buf: Vec<u8>,
    empty: bool,
}

impl ObjectWriter {
    fn new() -> Self {
        Self {
            buf: vec![b'{'],
            empty: true,
        }
    }

    fn entry(&mut self, key: &str, value: &Value) -> serde_json::Result<()> {
        if !self.empty {
            self.buf.push(b',');
        }
        self.empty = false;
        serde_json::to_writer(&mut self.buf, key)?;
        self.buf.push(b':');
        serde_json::to_writer(&mut self.buf, value)
    }

    fn finish(mut self, line_ending: &str) -> Vec<u8> {
        self.buf.push(b'}');
        self.buf.extend_from_slice(line_ending.as_bytes());
        self.buf
    }
}

impl RecordSerializer for JsonSerializer {
    type Error = SerializeError;

    fn encode(&self, entry: &Entry, fields: &[Field]) -> std::result::Result<Vec<u8>, SerializeError> {
        let opts = &self.options;
        let mut out = ObjectWriter::new();

        if let Some(key) = opts.level_key() {
            out.entry(key, &Value::from(self.formats.level.format(entry.level)))?;
        }
        if let Some(key) = opts.time_key() {
            out.entry(key, &self.formats.time(&entry.time))?;
        }
        if let (Some(key), Some(name)) = (opts.name_key(), entry.logger_name.as_deref()) {
            out.entry(key, &Value::from(name))?;
        }
        if let (Some(key), Some(caller)) = (opts.caller_key(), entry.caller.as_deref()) {
            out.entry(key, &Value::from(caller))?;
        }
        if let Some(key) = opts.message_key() {
            out.entry(key, &Value::from(entry.message.as_str()))?;
        }
        if let (Some(key), Some(stack)) = (opts.stacktrace_key(), entry.stack.as_deref()) {
            out.entry(key, &Value::from(stack))?;
        }

        for field in self.context.iter().chain(fields) {
            out.entry(&field.key, &self.field_value(&field.value))?;
        }

        Ok(out.finish(opts.line_ending()))
    }

    fn add_field(&mut self, field: Field) {
        self.context.push(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::time::Duration;
    use tracing::Level;

    fn fixed_entry(message: &str) -> Entry {
        Entry::new(Level::INFO, message).with_time(Utc.with_ymd_and_hms(2000, 10, 10, 13, 55, 36).unwrap())
    }

    fn encode_str(serializer: &JsonSerializer, entry: &Entry, fields: &[Field]) -> String {
        String::from_utf8(serializer.encode(entry, fields).unwrap()).unwrap()
    }

    #[test]
    fn test_default_layout() {
        let serializer = JsonSerializer::new(EncoderOptions::default()).unwrap();
        let out = encode_str(&serializer, &fixed_entry("hello"), &[]);
        assert_eq!(out, "{\"level\":\"info\",\"ts\":971186136.0,\"msg\":\"hello\"}\n");
    }

    #[test]
    fn test_message_is_json_escaped() {
        let serializer = JsonSerializer::new(EncoderOptions::default()).unwrap();
        let out = encode_str(&serializer, &fixed_entry("lob\nlaw"), &[]);
        assert!(out.contains(r#""msg":"lob\nlaw""#));
    }

    #[test]
    fn test_optional_entry_fields() {
        let serializer = JsonSerializer::new(EncoderOptions {
            time_key: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        let entry = fixed_entry("m")
            .with_logger("http.log.access")
            .with_caller("main.rs:10")
            .with_stack("trace");
        let out = encode_str(&serializer, &entry, &[]);
        assert_eq!(
            out,
            "{\"level\":\"info\",\"logger\":\"http.log.access\",\"caller\":\"main.rs:10\",\"msg\":\"m\",\"stacktrace\":\"trace\"}\n"
        );
    }

    #[test]
    fn test_fields_in_order_after_context() {
        let mut serializer = JsonSerializer::new(EncoderOptions {
            time_key: Some(String::new()),
            level_key: Some(String::new()),
            message_key: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        serializer.add_field(Field::string("service", "api"));

        let out = encode_str(
            &serializer,
            &fixed_entry("m"),
            &[
                Field::i64("status", 200),
                Field::bool("cached", false),
                Field::null("user_id"),
                Field::json("request", json!({"method": "GET"})),
            ],
        );
        assert_eq!(
            out,
            "{\"service\":\"api\",\"status\":200,\"cached\":false,\"user_id\":null,\"request\":{\"method\":\"GET\"}}\n"
        );
        assert_eq!(serializer.context().len(), 1);
    }

    #[test]
    fn test_duration_uses_configured_format() {
        let serializer = JsonSerializer::new(EncoderOptions {
            duration_format: Some("string".into()),
            ..Default::default()
        })
        .unwrap();
        let out = encode_str(
            &serializer,
            &fixed_entry("m"),
            &[Field::duration("elapsed", Duration::from_millis(250))],
        );
        assert!(out.contains(r#""elapsed":"250ms""#));
    }

    #[test]
    fn test_custom_line_ending() {
        let serializer = JsonSerializer::new(EncoderOptions {
            line_ending: Some("\r\n".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(encode_str(&serializer, &fixed_entry("m"), &[]).ends_with("}\r\n"));
    }

    #[test]
    fn test_invalid_format_rejected() {
        let result = JsonSerializer::new(EncoderOptions {
            level_format: Some("sparkly".into()),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_clone_owns_context() {
        let mut parent = JsonSerializer::new(EncoderOptions::default()).unwrap();
        parent.add_field(Field::string("a", "1"));
        let mut child = parent.clone();
        child.add_field(Field::string("b", "2"));
        assert_eq!(parent.context().len(), 1);
        assert_eq!(child.context().len(), 2);
    }
}
