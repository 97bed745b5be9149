use std::borrow::Cow;
use std::collections::HashMap;

use super::{globals, Piece, Template};
use crate::path::{resolve_chain_by, Resolved, FALLBACK_SEPARATOR};

impl Template {
    /// Renders the template against a JSON record.
    ///
    /// Placeholders that resolve to nothing, or to an empty value, become
    /// `default`. String values keep their JSON escapes unless `unescape` is set.
    pub fn render(&self, record: &[u8], unescape: bool, default: &str) -> String {
        self.render_with_separator(record, FALLBACK_SEPARATOR, unescape, default)
    }

    /// Like [`render`](Self::render) with a custom fallback separator.
    pub fn render_with_separator(
        &self,
        record: &[u8],
        separator: char,
        unescape: bool,
        default: &str,
    ) -> String {
        let mut resolved: HashMap<&str, Option<Cow<'_, str>>> = HashMap::new();
        let mut out = String::with_capacity(self.source.len() * 2);

        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Placeholder(key) => {
                    let value = resolved
                        .entry(key.as_str())
                        .or_insert_with(|| lookup(record, key, separator, unescape));
                    match value.as_deref() {
                        Some(value) if !value.is_empty() => out.push_str(value),
                        _ => out.push_str(default),
                    }
                }
            }
        }

        finish(out)
    }
}

/// Renders `template` against `record` in one step.
///
/// For repeated rendering parse once with [`Template::parse`].
///
/// # Example
///
/// ```rust
/// use transform_encoder::template::render;
///
/// let record = br#"{"msg":"lob\nlaw","username":"john\ndoe"}"#;
///
/// let raw = render("{msg} {username}", record, ':', false, "-");
/// assert_eq!(raw, "lob\\nlaw john\\ndoe\n");
///
/// let decoded = render("{msg} {username}", record, ':', true, "-");
/// assert_eq!(decoded, "lob\nlaw john\ndoe\n");
///
/// let missing = render("{user_id:username}|{nope:neither}", record, ':', false, "-");
/// assert_eq!(missing, "john\\ndoe|-\n");
/// ```
pub fn render(
    template: &str,
    record: &[u8],
    fallback_separator: char,
    unescape: bool,
    default: &str,
) -> String {
    Template::parse(template).render_with_separator(record, fallback_separator, unescape, default)
}

fn lookup<'a>(record: &'a [u8], key: &str, separator: char, unescape: bool) -> Option<Cow<'a, str>> {
    globals::lookup(key)
        .map(Cow::Owned)
        .or_else(|| resolve_chain_by(record, key, separator, unescape).map(Resolved::into_text))
}

/// Normalizes escaped quotes and terminates the line.
fn finish(substituted: String) -> String {
    let mut out = if substituted.contains("\\\"") {
        substituted.replace("\\\"", "\"")
    } else {
        substituted
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
