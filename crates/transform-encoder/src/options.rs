//! Generic encoder options shared by every structured log encoder.
//!
//! [`EncoderOptions`] controls how the [`JsonSerializer`](crate::JsonSerializer)
//! lays out a record: the keys used for the entry's own fields, the line ending,
//! and how timestamps, durations and levels are written. It is embedded by value
//! inside [`TransformConfig`](crate::TransformConfig), with the template-specific
//! fields layered on top.
//!
//! All fields are optional. An unset key falls back to its default; a key set to
//! the empty string omits that entry field from the record entirely.
//!
//! # Time formats
//!
//! | Name | Output |
//! |------|--------|
//! | `unix_seconds_float` (default) | `1700000000.123` |
//! | `unix_milli_float` | `1700000000123.0` |
//! | `unix_nano` | `1700000000123000000` |
//! | `iso8601` | `2023-11-14T22:13:20.123+0000` |
//! | `rfc3339` | `2023-11-14T22:13:20Z` |
//! | `rfc3339_nano` | `2023-11-14T22:13:20.123000000Z` |
//! | `wall` | `2023/11/14 22:13:20` |
//! | `wall_milli` | `2023/11/14 22:13:20.123` |
//! | `wall_nano` | `2023/11/14 22:13:20.123000000` |
//! | `common_log` | `14/Nov/2023:22:13:20 +0000` |
//!
//! Any other value is used as a chrono `strftime` layout.

use std::fmt::Display;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Level;

use crate::error::{ConfigError, Result};

/// `strftime` layout of the Common Log Format timestamp.
pub const COMMON_LOG_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Options common to structured log encoders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacktrace_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_ending: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub time_local: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_format: Option<String>,
}

fn key_or<'a>(key: &'a Option<String>, default: &'static str) -> Option<&'a str> {
    match key.as_deref() {
        None => Some(default),
        Some("") => None,
        Some(key) => Some(key),
    }
}

impl EncoderOptions {
    /// Key of the log message, `None` when omitted.
    pub fn message_key(&self) -> Option<&str> {
        key_or(&self.message_key, "msg")
    }

    pub fn level_key(&self) -> Option<&str> {
        key_or(&self.level_key, "level")
    }

    pub fn time_key(&self) -> Option<&str> {
        key_or(&self.time_key, "ts")
    }

    pub fn name_key(&self) -> Option<&str> {
        key_or(&self.name_key, "logger")
    }

    pub fn caller_key(&self) -> Option<&str> {
        key_or(&self.caller_key, "caller")
    }

    pub fn stacktrace_key(&self) -> Option<&str> {
        key_or(&self.stacktrace_key, "stacktrace")
    }

    /// Line ending appended after each record. Defaults to `\n`.
    pub fn line_ending(&self) -> &str {
        self.line_ending.as_deref().unwrap_or("\n")
    }

    /// Resolves the named formats, failing on names the encoder does not know.
    pub fn formats(&self) -> Result<Formats> {
        Ok(Formats {
            time: TimeFormat::parse(self.time_format.as_deref())?,
            time_local: self.time_local,
            duration: DurationFormat::parse(self.duration_format.as_deref())?,
            level: LevelFormat::parse(self.level_format.as_deref())?,
        })
    }
}

/// Validated value formats derived from [`EncoderOptions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formats {
    pub time: TimeFormat,
    pub time_local: bool,
    pub duration: DurationFormat,
    pub level: LevelFormat,
}

impl Formats {
    pub fn time(&self, ts: &DateTime<Utc>) -> Value {
        if self.time_local {
            self.time.format(&ts.with_timezone(&Local))
        } else {
            self.time.format(ts)
        }
    }
}

/// How timestamps are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    UnixSecondsFloat,
    UnixMilliFloat,
    UnixNano,
    Rfc3339,
    Rfc3339Nano,
    /// A chrono `strftime` layout.
    Layout(String),
}

impl TimeFormat {
    fn parse(name: Option<&str>) -> Result<Self> {
        let format = match name.unwrap_or("") {
            "" | "unix_seconds_float" => Self::UnixSecondsFloat,
            "unix_milli_float" => Self::UnixMilliFloat,
            "unix_nano" => Self::UnixNano,
            "rfc3339" => Self::Rfc3339,
            "rfc3339_nano" => Self::Rfc3339Nano,
            "iso8601" => Self::Layout("%Y-%m-%dT%H:%M:%S%.3f%z".into()),
            "wall" => Self::Layout("%Y/%m/%d %H:%M:%S".into()),
            "wall_milli" => Self::Layout("%Y/%m/%d %H:%M:%S%.3f".into()),
            "wall_nano" => Self::Layout("%Y/%m/%d %H:%M:%S%.9f".into()),
            "common_log" => Self::Layout(COMMON_LOG_TIME_FORMAT.into()),
            layout => {
                if StrftimeItems::new(layout).any(|item| item == Item::Error) {
                    return Err(ConfigError::invalid(
                        "time_format",
                        format!("'{}' is not a known format or a valid strftime layout", layout),
                    ));
                }
                Self::Layout(layout.to_string())
            }
        };
        Ok(format)
    }

    pub fn format<Tz>(&self, ts: &DateTime<Tz>) -> Value
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match self {
            Self::UnixSecondsFloat => {
                Value::from(ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_nanos()) / 1e9)
            }
            Self::UnixMilliFloat => Value::from(
                ts.timestamp_millis() as f64 + f64::from(ts.timestamp_subsec_nanos() % 1_000_000) / 1e6,
            ),
            Self::UnixNano => ts.timestamp_nanos_opt().map_or(Value::Null, Value::from),
            Self::Rfc3339 => Value::from(ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::Rfc3339Nano => Value::from(ts.to_rfc3339_opts(SecondsFormat::Nanos, true)),
            Self::Layout(layout) => Value::from(ts.format(layout).to_string()),
        }
    }
}

/// How duration fields are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationFormat {
    /// Floating-point seconds.
    Seconds,
    /// Integer nanoseconds.
    Nanos,
    /// Floating-point milliseconds.
    Millis,
    /// Human-readable, e.g. `1.5s`.
    String,
}

impl DurationFormat {
    fn parse(name: Option<&str>) -> Result<Self> {
        match name.unwrap_or("") {
            "" | "s" | "second" | "seconds" => Ok(Self::Seconds),
            "ns" | "nano" | "nanos" => Ok(Self::Nanos),
            "ms" | "milli" | "millis" => Ok(Self::Millis),
            "string" => Ok(Self::String),
            other => Err(ConfigError::invalid(
                "duration_format",
                format!("unknown format '{}'", other),
            )),
        }
    }

    pub fn format(self, duration: Duration) -> Value {
        match self {
            Self::Seconds => Value::from(duration.as_secs_f64()),
            Self::Nanos => Value::from(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)),
            Self::Millis => Value::from(duration.as_secs_f64() * 1e3),
            Self::String => Value::from(format!("{:?}", duration)),
        }
    }
}

/// Letter case of the level name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFormat {
    Lower,
    Upper,
}

impl LevelFormat {
    fn parse(name: Option<&str>) -> Result<Self> {
        match name.unwrap_or("") {
            "" | "lower" | "lowercase" => Ok(Self::Lower),
            "upper" | "uppercase" => Ok(Self::Upper),
            other => Err(ConfigError::invalid(
                "level_format",
                format!("unknown format '{}'", other),
            )),
        }
    }

    pub fn format(self, level: Level) -> &'static str {
        match self {
            Self::Upper => level.as_str(),
            Self::Lower => match level {
                Level::TRACE => "trace",
                Level::DEBUG => "debug",
                Level::INFO => "info",
                Level::WARN => "warn",
                _ => "error",
            },
        }
    }
}
