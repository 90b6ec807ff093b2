//! In-memory content source.
//!
//! Serves a fixed set of items with Contentful-style listing semantics. Used
//! by the CLI to resolve against a JSON content dump, and by tests.
//!
//! # Dump format
//!
//! ```json
//! {
//!   "items": [{ "sys": { "id": "p1", "contentType": { "sys": { "id": "post" } } }, "fields": {} }],
//!   "locales": [{ "code": "en-US", "default": true }],
//!   "page_size": 100
//! }
//! ```
//!
//! # Query keys
//!
//! - `content_type`: matches `sys.contentType.sys.id`
//! - `limit`: page size for this query
//! - `<path>[exists]`: `true` requires the field, `false` requires its absence
//!   (`"true"`/`"false"` strings too; anything else is malformed)
//! - `<path>[ne]`: field must differ
//! - `<path>`: field must equal the value
//! - `skip`, `select`, `order`, `include`, `locale`: ignored

use super::{
    Capabilities, ContentItem, ContentSource, ItemPage, Locale, LocaleList, Query, SourceError,
};
use crate::route::lookup;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const DEFAULT_PAGE_SIZE: usize = 100;
const IGNORED_KEYS: &[&str] = &["skip", "select", "order", "include", "locale", "limit"];

#[derive(Debug, Deserialize)]
struct Dump {
    items: Vec<ContentItem>,
    #[serde(default)]
    locales: Option<Vec<Locale>>,
    #[serde(default)]
    page_size: Option<usize>,
}

/// A recorded `list_items` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub query: Query,
    pub skip: usize,
}

#[derive(Debug)]
pub struct MemorySource {
    items: Vec<ContentItem>,
    locales: Option<LocaleList>,
    page_size: usize,
    /// Content types whose listing fails, for exercising error paths.
    failing: Vec<String>,
    requests: Mutex<Vec<ListRequest>>,
}

impl MemorySource {
    /// Source without locale support; see [`with_locales`](Self::with_locales).
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self {
            items,
            locales: None,
            page_size: DEFAULT_PAGE_SIZE,
            failing: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_locales(mut self, locales: Vec<Locale>) -> Self {
        self.locales = Some(LocaleList { items: locales });
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Make every listing of `content_type` fail.
    pub fn failing_on(mut self, content_type: impl Into<String>) -> Self {
        self.failing.push(content_type.into());
        self
    }

    /// Parse a JSON dump.
    pub fn from_json(content: &str) -> Result<Self, SourceError> {
        let dump: Dump =
            serde_json::from_str(content).map_err(|e| SourceError::Malformed(e.to_string()))?;

        let mut source = Self::new(dump.items);
        if let Some(locales) = dump.locales {
            source = source.with_locales(locales);
        }
        if let Some(page_size) = dump.page_size {
            source = source.with_page_size(page_size);
        }
        Ok(source)
    }

    /// Load a JSON dump from disk.
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// Every `list_items` call so far, in order.
    pub fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().clone()
    }

    fn matches(item: &ContentItem, query: &Query) -> Result<bool, SourceError> {
        for (key, expected) in query {
            if IGNORED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let matched = if key == "content_type" {
                lookup(item, "sys.contentType.sys.id") == Some(expected)
            } else if let Some(path) = key.strip_suffix("[exists]") {
                let present = lookup(item, path).is_some_and(|v| !v.is_null());
                exists_flag(key, expected)? == present
            } else if let Some(path) = key.strip_suffix("[ne]") {
                lookup(item, path) != Some(expected)
            } else {
                lookup(item, key) == Some(expected)
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// `[exists]` takes a bool, or its string form as sent in query strings.
fn exists_flag(key: &str, value: &Value) -> Result<bool, SourceError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        other => Err(SourceError::Malformed(format!(
            "`{key}` expects true or false, got {other}"
        ))),
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn list_items(&self, query: &Query, skip: usize) -> Result<ItemPage, SourceError> {
        self.requests.lock().push(ListRequest {
            query: query.clone(),
            skip,
        });

        if let Some(Value::String(content_type)) = query.get("content_type")
            && self.failing.contains(content_type)
        {
            return Err(SourceError::Unavailable(format!(
                "listing `{content_type}` failed"
            )));
        }

        let limit = query
            .get("limit")
            .and_then(Value::as_u64)
            .map_or(self.page_size, |l| l as usize)
            .max(1);

        let mut matched: Vec<&ContentItem> = Vec::new();
        for item in &self.items {
            if Self::matches(item, query)? {
                matched.push(item);
            }
        }

        Ok(ItemPage {
            items: matched.iter().skip(skip).take(limit).map(|&i| i.clone()).collect(),
            skip,
            limit,
            total: matched.len(),
        })
    }

    async fn get_item(&self, id: &str) -> Result<ContentItem, SourceError> {
        self.items
            .iter()
            .find(|item| lookup(item, "sys.id").and_then(Value::as_str) == Some(id))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }

    async fn list_locales(&self) -> Result<LocaleList, SourceError> {
        self.locales
            .clone()
            .ok_or(SourceError::Unsupported("list_locales"))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            list_locales: self.locales.is_some(),
            ..Capabilities::ALL
        }
    }
}
