//! Path resolution inside a structured record.
//!
//! A path names a location in a JSON record as a sequence of segments joined by
//! `>`. A segment is either an object key or, in bracket notation, a decimal
//! array index:
//!
//! ```text
//! request>headers>User-Agent>[0]
//! ```
//!
//! Several paths joined by `:` form a fallback chain; the first one that
//! resolves wins.
//!
//! Resolution is total. A missing key, an out-of-range index, a segment applied
//! to a scalar, a malformed path and a malformed record all give `None`. There is
//! no separate error for a path that could never match.
//!
//! The record is never parsed into a tree. Each step deserializes only the
//! current container as raw JSON spans and keeps the matching span, so values
//! come back as borrowed slices of the record.
//!
//! # Example
//!
//! ```rust
//! use transform_encoder::path::{resolve, resolve_chain, ValueKind};
//!
//! let record = br#"{"request":{"method":"GET","headers":{"Accept":["text/html"]}}}"#;
//!
//! let method = resolve(record, "request>method", false).unwrap();
//! assert_eq!(method.kind(), ValueKind::String);
//! assert_eq!(method.as_str(), "GET");
//!
//! let accept = resolve(record, "request>headers>Accept>[0]", false).unwrap();
//! assert_eq!(accept.as_str(), "text/html");
//!
//! let first = resolve_chain(record, "request>uri:request>method", false).unwrap();
//! assert_eq!(first.as_str(), "GET");
//! ```

use std::borrow::Cow;
use std::fmt;

use serde::de::{DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::value::RawValue;

/// Separator between the segments of one path.
pub const SEGMENT_SEPARATOR: char = '>';

/// Separator between the paths of a fallback chain.
pub const FALLBACK_SEPARATOR: char = ':';

/// JSON type of a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Null,
    Array,
    Object,
    Unknown,
}

impl ValueKind {
    fn of(raw: &str) -> Self {
        match raw.trim_start().as_bytes().first() {
            Some(b'"') => Self::String,
            Some(b'{') => Self::Object,
            Some(b'[') => Self::Array,
            Some(b't' | b'f') => Self::Boolean,
            Some(b'n') => Self::Null,
            Some(b'-' | b'0'..=b'9') => Self::Number,
            _ => Self::Unknown,
        }
    }
}

/// A value found in a record.
///
/// Strings are either the raw encoded content between the quotes (escape
/// sequences kept as written) or, when unescaping was requested, the decoded
/// text. Every other kind is the raw JSON text of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    kind: ValueKind,
    text: Cow<'a, str>,
}

impl<'a> Resolved<'a> {
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> Cow<'a, str> {
        self.text
    }
}

/// One step of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'p> {
    Key(&'p str),
    /// `[n]`; matches the literal key `[n]` when applied to an object.
    Index(usize, &'p str),
}

impl<'p> Segment<'p> {
    pub fn parse(raw: &'p str) -> Self {
        raw.strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
            .map_or(Segment::Key(raw), |index| Segment::Index(index, raw))
    }

    fn key(&self) -> &'p str {
        match *self {
            Segment::Key(key) | Segment::Index(_, key) => key,
        }
    }
}

/// Splits a path into its segments.
pub fn segments(path: &str) -> impl Iterator<Item = Segment<'_>> {
    path.split(SEGMENT_SEPARATOR).map(Segment::parse)
}

/// Resolves `path` against `record`.
///
/// With `unescape`, string values have their JSON escape sequences decoded.
/// Without it the encoded bytes are returned untouched, which avoids an
/// allocation but leaves sequences such as `\n` as two characters.
pub fn resolve<'a>(record: &'a [u8], path: &str, unescape: bool) -> Option<Resolved<'a>> {
    let text = std::str::from_utf8(record).ok()?;
    let mut current: &'a RawValue = serde_json::from_str(text).ok()?;

    for segment in segments(path) {
        current = descend(current, segment)?;
    }

    Some(value_of(current, unescape))
}

/// Resolves a placeholder key that may be a `:`-separated fallback chain.
pub fn resolve_chain<'a>(record: &'a [u8], key: &str, unescape: bool) -> Option<Resolved<'a>> {
    resolve_chain_by(record, key, FALLBACK_SEPARATOR, unescape)
}

/// Like [`resolve_chain`] with a custom fallback separator.
pub fn resolve_chain_by<'a>(
    record: &'a [u8],
    key: &str,
    separator: char,
    unescape: bool,
) -> Option<Resolved<'a>> {
    if key.contains(separator) {
        key.split(separator)
            .find_map(|path| resolve(record, path, unescape))
    } else {
        resolve(record, key, unescape)
    }
}

fn value_of(raw: &RawValue, unescape: bool) -> Resolved<'_> {
    let json = raw.get().trim();
    let kind = ValueKind::of(json);

    let text = match kind {
        ValueKind::String if unescape => serde_json::from_str::<String>(json)
            .map(Cow::Owned)
            .unwrap_or_else(|_| Cow::Borrowed(string_content(json))),
        ValueKind::String => Cow::Borrowed(string_content(json)),
        ValueKind::Number
        | ValueKind::Boolean
        | ValueKind::Null
        | ValueKind::Array
        | ValueKind::Object
        | ValueKind::Unknown => Cow::Borrowed(json),
    };

    Resolved { kind, text }
}

fn string_content(json: &str) -> &str {
    json.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(json)
}

fn descend<'a>(current: &'a RawValue, segment: Segment<'_>) -> Option<&'a RawValue> {
    let json = current.get();
    let mut de = serde_json::Deserializer::from_str(json);
    match (ValueKind::of(json), segment) {
        (ValueKind::Object, segment) => FindKey(segment.key()).deserialize(&mut de).ok()?,
        (ValueKind::Array, Segment::Index(index, _)) => FindIndex(index).deserialize(&mut de).ok()?,
        _ => None,
    }
}

/// Scans an object for the first entry with the given key.
struct FindKey<'k>(&'k str);

impl<'de, 'k> DeserializeSeed<'de> for FindKey<'k> {
    type Value = Option<&'de RawValue>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de, 'k> Visitor<'de> for FindKey<'k> {
    type Value = Option<&'de RawValue>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut found = None;
        while let Some(key) = map.next_key::<String>()? {
            let value: &'de RawValue = map.next_value()?;
            if found.is_none() && key == self.0 {
                found = Some(value);
            }
        }
        Ok(found)
    }
}

/// Picks the element at an index of an array.
struct FindIndex(usize);

impl<'de> DeserializeSeed<'de> for FindIndex {
    type Value = Option<&'de RawValue>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for FindIndex {
    type Value = Option<&'de RawValue>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON array")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut found = None;
        let mut index = 0;
        while let Some(value) = seq.next_element::<&'de RawValue>()? {
            if index == self.0 {
                found = Some(value);
            }
            index += 1;
        }
        Ok(found)
    }
}
