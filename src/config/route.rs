//! Route template definitions (`[[routes]]`).

use crate::source::Query;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How frequently a page is likely to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

/// A configured rule describing how to turn content into one or more URLs.
///
/// Exactly one of `url` (static) or `pattern` (dynamic) is expected. A
/// dynamic route is bound either to a single entry (`id`) or to a listing
/// (`query`), never both.
///
/// ```toml
/// [[routes]]
/// pattern = "/:locale/posts/:slug"
/// params = { slug = "fields.slug" }
/// query = { content_type = "post" }
/// changefreq = "weekly"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTemplate {
    pub url: Option<String>,
    pub changefreq: Option<ChangeFreq>,
    pub lastmod: Option<String>,
    pub priority: f32,
    pub id: Option<String>,
    pub pattern: Option<String>,
    /// Parameter name -> dotted field path on the content item.
    pub params: Option<BTreeMap<String, String>>,
    pub query: Option<Query>,
}

impl Default for RouteTemplate {
    fn default() -> Self {
        Self {
            url: None,
            changefreq: None,
            lastmod: None,
            priority: 1.0,
            id: None,
            pattern: None,
            params: None,
            query: None,
        }
    }
}

impl RouteTemplate {
    /// Static route with a fixed URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Dynamic route built from a path pattern.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), path.into());
        self
    }

    /// Bind to a listing query. Non-object values are ignored.
    pub fn with_query(mut self, query: serde_json::Value) -> Self {
        if let serde_json::Value::Object(map) = query {
            self.query = Some(map);
        }
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_changefreq(mut self, changefreq: ChangeFreq) -> Self {
        self.changefreq = Some(changefreq);
        self
    }

    pub fn with_lastmod(mut self, lastmod: impl Into<String>) -> Self {
        self.lastmod = Some(lastmod.into());
        self
    }

    /// Short human-readable name for logs and diagnostics.
    pub fn label(&self) -> String {
        match (&self.pattern, &self.url, &self.id) {
            (Some(pattern), _, _) => format!("`{pattern}`"),
            (None, Some(url), _) => format!("`{url}`"),
            (None, None, Some(id)) => format!("entry `{id}`"),
            (None, None, None) => "unnamed route".to_string(),
        }
    }
}
