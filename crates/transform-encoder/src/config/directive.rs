//! The block-directive configuration dialect.
//!
//! ```text
//! transform [<template>...] [{
//!     placeholder <value>
//!     unescape_strings
//!     <encoder option> <value>
//! }]
//! ```
//!
//! Template arguments are joined with single spaces. With no arguments the
//! Common Log Format template is used. Words are separated by whitespace and
//! may be quoted with `"..."` (where `\"` and `\\` are escapes) or with
//! backticks (raw). A `#` at the start of a word comments out the rest of the
//! line. `{` and `}` open and close the block only as bare words, so `{msg}`
//! is an ordinary word.

use crate::error::{ConfigError, Result};
use crate::template::COMMON_LOG_FORMAT;

use super::TransformConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Open,
    Close,
}

#[derive(Debug)]
struct Line {
    number: usize,
    tokens: Vec<Token>,
}

/// Parses a `transform` directive into a [`TransformConfig`].
///
/// `formatted` is accepted as an alias of `transform`.
///
/// # Example
///
/// ```rust
/// use transform_encoder::config::parse_directive;
///
/// let cfg = parse_directive(r#"
/// transform "{msg} {username}" {
///     placeholder ?
///     unescape_strings
/// }
/// "#).unwrap();
///
/// assert_eq!(cfg.template.as_deref(), Some("{msg} {username}"));
/// assert_eq!(cfg.placeholder.as_deref(), Some("?"));
/// assert!(cfg.unescape_strings);
/// ```
pub fn parse_directive(input: &str) -> Result<TransformConfig> {
    let mut lines = tokenize(input)?.into_iter();
    let first = lines
        .next()
        .ok_or_else(|| ConfigError::syntax(1, "expected 'transform' directive"))?;

    match first.tokens.first() {
        Some(Token::Word(name)) if name == "transform" || name == "formatted" => {}
        _ => {
            return Err(ConfigError::syntax(
                first.number,
                "expected 'transform' directive",
            ))
        }
    }

    let args = &first.tokens[1..];
    let opens_block = args.last() == Some(&Token::Open);
    let template_args = if opens_block {
        &args[..args.len() - 1]
    } else {
        args
    };

    let mut words = Vec::with_capacity(template_args.len());
    for token in template_args {
        match token {
            Token::Word(word) => words.push(word.as_str()),
            Token::Open | Token::Close => {
                return Err(ConfigError::syntax(first.number, "unexpected brace"))
            }
        }
    }

    let mut config = TransformConfig {
        template: Some(if words.is_empty() {
            COMMON_LOG_FORMAT.to_string()
        } else {
            words.join(" ")
        }),
        ..Default::default()
    };

    if opens_block {
        let mut last_line = first.number;
        loop {
            let line = lines.next().ok_or_else(|| {
                ConfigError::syntax(last_line, "unexpected end of input, expected '}'")
            })?;
            last_line = line.number;
            if line.tokens == [Token::Close] {
                break;
            }
            apply_subdirective(&mut config, &line)?;
        }
    }

    if let Some(extra) = lines.next() {
        return Err(ConfigError::syntax(
            extra.number,
            "unexpected input after transform directive",
        ));
    }

    tracing::trace!(?config, "parsed transform directive");
    Ok(config)
}

fn apply_subdirective(config: &mut TransformConfig, line: &Line) -> Result<()> {
    let name = match line.tokens.first() {
        Some(Token::Word(name)) => name.as_str(),
        _ => return Err(ConfigError::syntax(line.number, "unexpected brace")),
    };
    let args = &line.tokens[1..];
    let opts = &mut config.options;

    match name {
        "placeholder" => config.placeholder = Some(single_arg(line, name, args)?),
        "unescape_strings" => {
            no_args(line, name, args)?;
            config.unescape_strings = true;
        }
        "time_local" => {
            no_args(line, name, args)?;
            opts.time_local = true;
        }
        "message_key" => opts.message_key = Some(single_arg(line, name, args)?),
        "level_key" => opts.level_key = Some(single_arg(line, name, args)?),
        "time_key" => opts.time_key = Some(single_arg(line, name, args)?),
        "name_key" => opts.name_key = Some(single_arg(line, name, args)?),
        "caller_key" => opts.caller_key = Some(single_arg(line, name, args)?),
        "stacktrace_key" => opts.stacktrace_key = Some(single_arg(line, name, args)?),
        "line_ending" => opts.line_ending = Some(single_arg(line, name, args)?),
        "time_format" => opts.time_format = Some(single_arg(line, name, args)?),
        "duration_format" => opts.duration_format = Some(single_arg(line, name, args)?),
        "level_format" => opts.level_format = Some(single_arg(line, name, args)?),
        other => {
            return Err(ConfigError::syntax(
                line.number,
                format!("unrecognized subdirective '{}'", other),
            ))
        }
    }
    Ok(())
}

fn single_arg(line: &Line, name: &str, args: &[Token]) -> Result<String> {
    match args {
        [Token::Word(value)] => Ok(value.clone()),
        _ => Err(ConfigError::syntax(
            line.number,
            format!("'{}' takes exactly one argument", name),
        )),
    }
}

fn no_args(line: &Line, name: &str, args: &[Token]) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::syntax(
            line.number,
            format!("'{}' takes no arguments", name),
        ))
    }
}

fn tokenize(input: &str) -> Result<Vec<Line>> {
    let mut lines = Vec::new();
    let mut current = Line {
        number: 1,
        tokens: Vec::new(),
    };
    let mut line_no = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                line_no += 1;
                let done = std::mem::replace(
                    &mut current,
                    Line {
                        number: line_no,
                        tokens: Vec::new(),
                    },
                );
                if !done.tokens.is_empty() {
                    lines.push(done);
                }
            }
            c if c.is_whitespace() => {}
            '#' => {
                while chars.peek().is_some_and(|&next| next != '\n') {
                    chars.next();
                }
            }
            '"' => {
                let start = line_no;
                let mut word = String::new();
                loop {
                    match chars.next() {
                        None => {
                            return Err(ConfigError::syntax(start, "unterminated quoted string"))
                        }
                        Some('"') => break,
                        Some('\\') => match chars.peek() {
                            Some(&next) if next == '"' || next == '\\' => {
                                chars.next();
                                word.push(next);
                            }
                            _ => word.push('\\'),
                        },
                        Some(other) => {
                            if other == '\n' {
                                line_no += 1;
                            }
                            word.push(other);
                        }
                    }
                }
                current.tokens.push(Token::Word(word));
            }
            '`' => {
                let start = line_no;
                let mut word = String::new();
                loop {
                    match chars.next() {
                        None => {
                            return Err(ConfigError::syntax(start, "unterminated backtick string"))
                        }
                        Some('`') => break,
                        Some(other) => {
                            if other == '\n' {
                                line_no += 1;
                            }
                            word.push(other);
                        }
                    }
                }
                current.tokens.push(Token::Word(word));
            }
            first => {
                let mut word = String::from(first);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                current.tokens.push(match word.as_str() {
                    "{" => Token::Open,
                    "}" => Token::Close,
                    _ => Token::Word(word),
                });
            }
        }
    }

    if !current.tokens.is_empty() {
        lines.push(current);
    }
    Ok(lines)
}
