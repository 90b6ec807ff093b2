//! Content source abstraction.
//!
//! The pipeline only needs three operations from a headless CMS:
//!
//! - paginated listing of items matching a query
//! - fetching a single item by id
//! - listing the locales the space supports
//!
//! A source advertises which of these it supports through [`Capabilities`];
//! [`SitemapPipeline::new`](crate::pipeline::SitemapPipeline::new) rejects a
//! source that cannot serve all three.

mod memory;
mod paginate;

pub use memory::{ListRequest, MemorySource};
pub use paginate::load_all_items;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A content item: an opaque JSON record addressed by dotted field paths.
pub type ContentItem = serde_json::Value;

/// Query passed through to the source verbatim (`content_type`, `select`, filters...).
pub type Query = serde_json::Map<String, serde_json::Value>;

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPage {
    pub items: Vec<ContentItem>,
    pub skip: usize,
    pub limit: usize,
    pub total: usize,
}

/// A locale as reported by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub code: String,
    #[serde(default)]
    pub default: bool,
}

/// Response of [`ContentSource::list_locales`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleList {
    pub items: Vec<Locale>,
}

/// Errors a content source can report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("content source unavailable: {0}")]
    Unavailable(String),

    #[error("item `{0}` not found")]
    NotFound(String),

    #[error("operation `{0}` is not supported by this source")]
    Unsupported(&'static str),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Operations a source can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub list_items: bool,
    pub get_item: bool,
    pub list_locales: bool,
}

impl Capabilities {
    pub const ALL: Self = Self {
        list_items: true,
        get_item: true,
        list_locales: true,
    };

    /// Names of the operations this set lacks.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (self.list_items, "list_items"),
            (self.get_item, "get_item"),
            (self.list_locales, "list_locales"),
        ]
        .into_iter()
        .filter(|(supported, _)| !supported)
        .map(|(_, name)| name)
        .collect()
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::ALL
    }
}

/// Remote content backend.
///
/// Implementations embed their own transport, auth and timeout behavior.
/// The pipeline never retries a failed call.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// List items matching `query`, starting at offset `skip`.
    async fn list_items(&self, query: &Query, skip: usize) -> Result<ItemPage, SourceError>;

    /// Fetch one item by id.
    async fn get_item(&self, id: &str) -> Result<ContentItem, SourceError>;

    /// List the locales the backend supports.
    async fn list_locales(&self) -> Result<LocaleList, SourceError>;

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }
}
