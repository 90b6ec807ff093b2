//! Resolution output types.

use crate::config::ChangeFreq;
use serde::Serialize;
use std::fmt;

/// One alternate-language link of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleLink {
    pub url: String,
    pub lang: String,
}

/// A concrete, ready-to-serialize URL record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRoute {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<ChangeFreq>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
    pub priority: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LocaleLink>,
}

/// Why a template, item or locale link produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipNote {
    /// Template label, see [`RouteTemplate::label`](crate::config::RouteTemplate::label).
    pub route: String,
    pub reason: String,
}

impl SkipNote {
    pub fn new(route: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SkipNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.route, self.reason)
    }
}

/// Routes and skip notes produced for one template or a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub routes: Vec<ResolvedRoute>,
    pub skipped: Vec<SkipNote>,
}

impl Resolution {
    pub fn skip(&mut self, route: &str, reason: impl fmt::Display) {
        let note = SkipNote::new(route, reason.to_string());
        crate::debug!("skip"; "{}", note);
        self.skipped.push(note);
    }

    /// Append `other`, keeping order.
    pub fn extend(&mut self, other: Resolution) {
        self.routes.extend(other.routes);
        self.skipped.extend(other.skipped);
    }
}
