//! Decide whether a content item can produce a URL for a template.

use super::params::{ParameterSet, extract_params, is_truthy, lookup};
use super::pattern::PathPattern;
use crate::config::RouteTemplate;
use serde_json::Value;
use std::fmt;

/// Reason an item was filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotRecord,
    Empty,
    /// A declared `params` field path is absent or falsy.
    MissingField { name: String, path: String },
    /// A parameter the pattern requires did not resolve.
    MissingParam(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRecord => write!(f, "item is not a record"),
            Self::Empty => write!(f, "item is empty"),
            Self::MissingField { name, path } => {
                write!(f, "field `{path}` for param `{name}` is missing or empty")
            }
            Self::MissingParam(name) => write!(f, "pattern param `{name}` did not resolve"),
        }
    }
}

/// Check `item` against `template` and return the parameters it resolves to.
///
/// Both checks must pass:
/// - every declared `params` field path is present and truthy
/// - every name the pattern requires is present and truthy after extraction
pub fn check_entry(
    item: &Value,
    template: &RouteTemplate,
    pattern: &PathPattern,
    base: &ParameterSet,
) -> Result<ParameterSet, Rejection> {
    let record = match item {
        Value::Object(map) => map,
        _ => return Err(Rejection::NotRecord),
    };
    if record.is_empty() {
        return Err(Rejection::Empty);
    }

    for (name, path) in template.params.iter().flatten() {
        if !lookup(item, path).is_some_and(is_truthy) {
            return Err(Rejection::MissingField {
                name: name.clone(),
                path: path.clone(),
            });
        }
    }

    let params = extract_params(item, template.params.as_ref(), base);
    if let Some(name) = pattern
        .required_params()
        .into_iter()
        .find(|name| !params.is_satisfied(name))
    {
        return Err(Rejection::MissingParam(name.to_string()));
    }

    Ok(params)
}

/// Boolean form of [`check_entry`].
pub fn is_route_satisfiable(
    item: &Value,
    template: &RouteTemplate,
    pattern: &PathPattern,
    base: &ParameterSet,
) -> bool {
    check_entry(item, template, pattern, base).is_ok()
}
