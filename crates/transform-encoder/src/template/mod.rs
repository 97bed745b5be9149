//! Placeholder templates.
//!
//! A template is plain text with `{...}` placeholders. Each placeholder names a
//! path into the structured record (see [`crate::path`]), optionally as a
//! fallback chain:
//!
//! ```text
//! {request>client_ip} - {user_id} [{ts}] "{request>method} {request>uri}"
//! {request>headers>X-Forwarded-For>[0]:request>remote_ip}
//! ```
//!
//! # Syntax
//!
//! - `{path}` - value at `path`, or the default placeholder value if absent
//! - `{a:b:c}` - first of `a`, `b`, `c` that resolves
//! - `{env.NAME}`, `{system.os}` - global values, see below
//! - `\{` and `\}` - literal braces
//! - An unclosed `{` is kept as text; an escaped `}` with no later `}`
//!   still closes the placeholder
//!
//! There are no loops, conditionals or filters; substitution is flat.
//!
//! # Global placeholders
//!
//! These are looked up before the record:
//!
//! | Placeholder | Value |
//! |-------------|-------|
//! | `{env.NAME}` | environment variable `NAME` |
//! | `{system.os}` | operating system, e.g. `linux` |
//! | `{system.arch}` | CPU architecture, e.g. `x86_64` |
//! | `{system.slash}` | path separator |
//! | `{system.wd}` | current working directory |
//!
//! A global without a value (an unset variable, say) falls through to the
//! record and then to the default.
//!
//! # Output
//!
//! After substitution the output gets one normalization pass: every `\"` becomes
//! `"`. A trailing newline is appended unless the output already ends with one.

mod globals;
mod renderer;

pub use renderer::render;

/// The built-in template: Common Log Format over an HTTP access-log record.
pub const COMMON_LOG_FORMAT: &str = concat!(
    "{request>client_ip} - {user_id} [{ts}] ",
    "\"{request>method} {request>uri} {request>proto}\" {status} {size}"
);

/// Template value that stands for [`COMMON_LOG_FORMAT`].
pub const COMMON_LOG_SHORTCUT: &str = "{common_log}";

/// Placeholder value used when none is configured.
pub const DEFAULT_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Placeholder(String),
}

/// A template split into text and placeholders, ready for repeated rendering.
///
/// Parsing never fails: anything that is not a well-formed placeholder is text.
///
/// # Example
///
/// ```rust
/// use transform_encoder::Template;
///
/// let template = Template::parse("{msg} from {user:client_ip}");
/// assert_eq!(template.placeholders().collect::<Vec<_>>(), ["msg", "user:client_ip"]);
///
/// let out = template.render(br#"{"msg":"hello","client_ip":"10.0.0.1"}"#, false, "-");
/// assert_eq!(out, "hello from 10.0.0.1\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        Self {
            source: source.to_string(),
            pieces: parse_pieces(source),
        }
    }

    /// The template text as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder keys in order of appearance, repeats included.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Placeholder(key) => Some(key.as_str()),
            Piece::Text(_) => None,
        })
    }

    pub fn is_common_log(&self) -> bool {
        self.source == COMMON_LOG_FORMAT
    }
}

fn parse_pieces(source: &str) -> Vec<Piece> {
    let bytes = source.as_bytes();
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if matches!(bytes.get(i + 1), Some(b'{' | b'}')) => {
                // Drop the backslash; the brace starts the next literal run.
                text.push_str(&source[literal_start..i]);
                literal_start = i + 1;
                i += 2;
            }
            b'{' => match find_close(bytes, i + 1) {
                Some(end) => {
                    text.push_str(&source[literal_start..i]);
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(Piece::Placeholder(source[i + 1..end].to_string()));
                    i = end + 1;
                    literal_start = i;
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }

    text.push_str(&source[literal_start..]);
    if !text.is_empty() {
        pieces.push(Piece::Text(text));
    }
    pieces
}

/// Index of the `}` closing a placeholder whose key starts at `from`.
///
/// An escaped `}` is skipped only while another `}` follows it. When it is
/// the last brace in the source it closes the placeholder, backslash
/// included in the key.
fn find_close(bytes: &[u8], from: usize) -> Option<usize> {
    let next = |start: usize| (start..bytes.len()).find(|&j| bytes[j] == b'}');
    let mut end = next(from)?;
    while bytes[end - 1] == b'\\' {
        match next(end + 1) {
            Some(later) => end = later,
            None => break,
        }
    }
    Some(end)
}
