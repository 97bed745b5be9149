//! Log events and the structured records built from them.
//!
//! An [`Entry`] carries what every log event has (level, time, message, ...);
//! [`Field`]s carry the rest. A [`RecordSerializer`] turns both into one
//! nested-key byte record that the path resolver can read.

mod json;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::Level;

pub use json::JsonSerializer;

/// One log event.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub level: Level,
    pub time: DateTime<Utc>,
    pub logger_name: Option<String>,
    pub message: String,
    /// Source location, usually `file:line`.
    pub caller: Option<String>,
    pub stack: Option<String>,
}

impl Entry {
    /// Creates an entry stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            time: Utc::now(),
            logger_name: None,
            message: message.into(),
            caller: None,
            stack: None,
        }
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    pub fn with_logger(mut self, name: impl Into<String>) -> Self {
        self.logger_name = Some(name.into());
        self
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

/// Value carried by a [`Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    /// Written according to the configured duration format.
    Duration(Duration),
    /// Any JSON value, used for nested objects and arrays.
    Json(Value),
    Null,
}

/// A key/value pair attached to a log event.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: FieldValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn i64(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, FieldValue::I64(value))
    }

    pub fn u64(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, FieldValue::U64(value))
    }

    pub fn f64(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, FieldValue::F64(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, FieldValue::Duration(value))
    }

    /// A field holding arbitrary JSON, e.g. a nested `request` object.
    pub fn json(key: impl Into<String>, value: Value) -> Self {
        Self::new(key, FieldValue::Json(value))
    }

    pub fn null(key: impl Into<String>) -> Self {
        Self::new(key, FieldValue::Null)
    }
}

/// Produces the structured record that templates are resolved against.
///
/// Implementations must be cheap to clone: every clone of an encoder owns its
/// own serializer, and therefore its own context fields.
pub trait RecordSerializer: Clone + Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Encodes one event into a freshly allocated record.
    fn encode(&self, entry: &Entry, fields: &[Field]) -> Result<Vec<u8>, Self::Error>;

    /// Adds a context field written into every subsequent record.
    fn add_field(&mut self, field: Field);
}
