//! Resolve route templates against headless CMS content into a flat list of
//! localized sitemap URLs.
//!
//! ```text
//! sitemap.toml ─► SitemapConfig ─► SitemapPipeline ─► RouteResolver (per template)
//!                                        │                 ├─ load_all_items
//!                                        │                 ├─ check_entry / extract_params
//!                                        │                 └─ expand_locales
//!                                        └─► Resolution ─► generator::sitemap
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logger;
pub mod pipeline;
pub mod route;
pub mod source;

pub use config::{ChangeFreq, FailurePolicy, Options, RouteTemplate, SitemapConfig};
pub use error::SitemapError;
pub use pipeline::SitemapPipeline;
pub use route::{LocaleLink, Resolution, ResolvedRoute, SkipNote};
pub use source::{ContentSource, MemorySource};
