//! Route resolution: turning templates plus content into concrete URLs.
//!
//! ```text
//! RouteTemplate ──► PathPattern ──┐
//!                                 ├─► check_entry ─► ParameterSet ─► ResolvedRoute
//! ContentItem ──► extract_params ─┘                        └─► expand_locales ─► links
//! ```

mod filter;
mod locale;
mod params;
mod pattern;
mod resolve;
mod resolved;

pub use filter::{Rejection, check_entry, is_route_satisfiable};
pub use locale::{LocaleLinks, LocaleSet, expand_locales};
pub use params::{ParameterSet, extract_params, is_truthy, lookup, scalar_text};
pub use pattern::{PathPattern, PatternError, decode};
pub use resolve::RouteResolver;
pub use resolved::{LocaleLink, Resolution, ResolvedRoute, SkipNote};
