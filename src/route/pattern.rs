//! Path templates such as `/:locale/posts/:slug`.
//!
//! # Syntax
//!
//! | Token          | Meaning                                        |
//! |----------------|------------------------------------------------|
//! | `:name`        | required segment                               |
//! | `:name?`       | optional segment (its leading `/` or `.` too)  |
//! | `:name*`       | zero or more segments from an array value      |
//! | `:name+`       | one or more segments from an array value       |
//! | `:name(\d+)`   | value must match the given regex               |
//! | `\:`           | literal character                              |
//!
//! Built URLs are percent-encoded; use [`decode`] to get the readable form.

use super::params::ParameterSet;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

/// Same character set `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid pattern `{pattern}`: {message}")]
    Syntax { pattern: String, message: String },

    #[error("missing value for parameter `{0}`")]
    MissingParam(String),

    #[error("invalid value for parameter `{name}`: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    One,
    Optional,
    ZeroOrMore,
    OneOrMore,
}

impl Modifier {
    fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::ZeroOrMore)
    }

    fn is_repeat(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }
}

#[derive(Debug, Clone)]
struct Param {
    name: String,
    /// Delimiter consumed from the preceding literal (`/`, `.` or empty).
    prefix: String,
    modifier: Modifier,
    constraint: Option<Regex>,
}

#[derive(Debug, Clone)]
enum Token {
    Literal(String),
    Param(Param),
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    tokens: Vec<Token>,
}

impl PathPattern {
    /// Parse `pattern` into tokens.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let syntax = |message: String| PatternError::Syntax {
            pattern: pattern.to_string(),
            message,
        };

        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut seen = BTreeSet::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => literal.push(escaped),
                    None => return Err(syntax("trailing escape".into())),
                },
                ':' if chars.peek().is_some_and(|&n| is_name_char(n)) => {
                    let mut name = String::new();
                    while let Some(&n) = chars.peek().filter(|&&n| is_name_char(n)) {
                        name.push(n);
                        chars.next();
                    }

                    let constraint = if chars.peek() == Some(&'(') {
                        chars.next();
                        let group = take_group(&mut chars)
                            .ok_or_else(|| syntax(format!("unbalanced group after `:{name}`")))?;
                        let regex = Regex::new(&format!("^(?:{group})$"))
                            .map_err(|e| syntax(format!("bad constraint for `:{name}`: {e}")))?;
                        Some(regex)
                    } else {
                        None
                    };

                    let modifier = match chars.peek() {
                        Some('?') => Modifier::Optional,
                        Some('*') => Modifier::ZeroOrMore,
                        Some('+') => Modifier::OneOrMore,
                        _ => Modifier::One,
                    };
                    if modifier != Modifier::One {
                        chars.next();
                    }

                    if !seen.insert(name.clone()) {
                        return Err(syntax(format!("duplicate parameter `:{name}`")));
                    }

                    let prefix = match literal.chars().last() {
                        Some(d @ ('/' | '.')) => {
                            literal.pop();
                            d.to_string()
                        }
                        _ => String::new(),
                    };
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }

                    tokens.push(Token::Param(Param {
                        name,
                        prefix,
                        modifier,
                        constraint,
                    }));
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self {
            source: pattern.to_string(),
            tokens,
        })
    }

    /// Names that must resolve to a value for [`to_path`](Self::to_path) to succeed.
    pub fn required_params(&self) -> BTreeSet<&str> {
        self.params()
            .filter(|p| !p.modifier.is_optional())
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Every parameter name the pattern declares.
    pub fn param_names(&self) -> BTreeSet<&str> {
        self.params().map(|p| p.name.as_str()).collect()
    }

    fn params(&self) -> impl Iterator<Item = &Param> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Param(p) => Some(p),
            Token::Literal(_) => None,
        })
    }

    /// Build a percent-encoded path from `params`.
    pub fn to_path(&self, params: &ParameterSet) -> Result<String, PatternError> {
        let mut path = String::with_capacity(self.source.len() + 16);

        for token in &self.tokens {
            let param = match token {
                Token::Literal(text) => {
                    path.push_str(text);
                    continue;
                }
                Token::Param(param) => param,
            };

            let segments = param_segments(param, params.get(&param.name))?;
            if segments.is_empty() {
                if param.modifier.is_optional() {
                    continue;
                }
                return Err(PatternError::MissingParam(param.name.clone()));
            }

            let delimiter = if param.prefix.is_empty() { "/" } else { param.prefix.as_str() };
            for (i, segment) in segments.iter().enumerate() {
                if let Some(re) = &param.constraint
                    && !re.is_match(segment)
                {
                    return Err(PatternError::InvalidValue {
                        name: param.name.clone(),
                        reason: format!("`{segment}` does not match `{}`", re.as_str()),
                    });
                }
                path.push_str(if i == 0 { param.prefix.as_str() } else { delimiter });
                path.extend(utf8_percent_encode(segment, COMPONENT));
            }
        }

        Ok(path)
    }
}

/// Text segments for one parameter; empty when the value is absent.
fn param_segments(param: &Param, value: Option<&Value>) -> Result<Vec<String>, PatternError> {
    let invalid = |reason: &str| PatternError::InvalidValue {
        name: param.name.clone(),
        reason: reason.to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            if !param.modifier.is_repeat() {
                return Err(invalid("expected a single value, got an array"));
            }
            items
                .iter()
                .map(|item| scalar_segment(item).ok_or_else(|| invalid("array items must be scalars")))
                .filter(|s| !matches!(s, Ok(s) if s.is_empty()))
                .collect()
        }
        Some(Value::Object(_)) => Err(invalid("objects cannot be used as path segments")),
        Some(scalar) => Ok(scalar_segment(scalar)
            .filter(|s| !s.is_empty())
            .into_iter()
            .collect()),
    }
}

fn scalar_segment(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read up to the matching `)`; the opening paren is already consumed.
fn take_group(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut depth = 1usize;
    let mut group = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                group.push(c);
                group.push(chars.next()?);
                continue;
            }
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(group);
                }
            }
            _ => {}
        }
        group.push(c);
    }
    None
}

#[inline]
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Percent-decode a built path for display and sitemap output.
pub fn decode(path: &str) -> String {
    percent_decode_str(path)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
