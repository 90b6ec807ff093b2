//! Pipeline error types.

use crate::config::ConfigError;
use crate::source::SourceError;
use thiserror::Error;

/// Errors surfaced by the resolution pipeline.
///
/// Pattern/parameter mismatches are not here: they are recorded as
/// [`SkipNote`](crate::route::SkipNote)s and never fail a resolution.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// The configured content source does not support every required operation.
    #[error("content source is missing required operations: {}", .missing.join(", "))]
    InvalidClientCapability { missing: Vec<&'static str> },

    /// A remote listing or fetch failed while resolving `scope`.
    #[error("failed to fetch content for {scope}")]
    SourceFetch {
        scope: String,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A resolution task panicked or was cancelled.
    #[error("resolution task for {scope} did not complete")]
    Task { scope: String },
}

impl SitemapError {
    pub(crate) fn fetch(scope: impl Into<String>, source: SourceError) -> Self {
        Self::SourceFetch {
            scope: scope.into(),
            source,
        }
    }
}
