//! Parameter extraction from content items.
//!
//! Field paths are dotted (`fields.slug`, `sys.updatedAt`) and may index into
//! arrays either with a numeric segment (`fields.tags.0`) or brackets
//! (`fields.tags[0].slug`).

use serde_json::Value;
use std::collections::BTreeMap;

/// Named parameters fed to a [`PathPattern`](super::PathPattern).
///
/// Absent values are simply not present in the map; there is no
/// "empty" placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet(BTreeMap<String, Value>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Copy of this set with `name` overridden.
    pub fn with(&self, name: &str, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.insert(name, value);
        next
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// True if `name` holds a truthy value.
    pub fn is_satisfied(&self, name: &str) -> bool {
        self.get(name).is_some_and(is_truthy)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Build the parameter set for one item.
///
/// `base` seeds the result and always wins over extracted values. Declared
/// paths that are missing or `null` on the item are left out.
pub fn extract_params(
    item: &Value,
    declared: Option<&BTreeMap<String, String>>,
    base: &ParameterSet,
) -> ParameterSet {
    let mut params = base.clone();

    for (name, path) in declared.into_iter().flatten() {
        if params.contains(name) {
            continue;
        }
        if let Some(value) = lookup(item, path).filter(|v| !v.is_null()) {
            params.insert(name.as_str(), value.clone());
        }
    }

    params
}

/// Read a dotted field path out of `item`.
///
/// A key that literally contains dots is matched before the path is split.
pub fn lookup<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    if let Value::Object(map) = item
        && let Some(value) = map.get(path)
    {
        return Some(value);
    }

    let mut current = item;
    for segment in split_path(path) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// `a.b[0].c` -> `["a", "b", "0", "c"]`
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split(['.', '[', ']']).filter(|s| !s.is_empty())
}

/// Truthiness of a field value: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a scalar field value as text (used for lastmod values).
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
