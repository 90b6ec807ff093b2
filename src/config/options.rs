//! Pipeline options (`[options]`).

use serde::{Deserialize, Serialize};

/// What to do when a content fetch fails while resolving one template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail the whole resolution.
    #[default]
    Abort,
    /// Drop the failing template's contribution and keep going.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Origin prepended to every URL in the sitemap (e.g. `https://example.com`).
    pub origin: String,
    /// Static locale codes, used unless `dynamic_locales` is set.
    pub locales: Vec<String>,
    /// Load locales from the content source and emit alternate links.
    pub dynamic_locales: bool,
    /// Take lastmod from the content item instead of the route template.
    pub dynamic_lastmod: bool,
    /// Field path holding the last-modified timestamp.
    pub lastmod_param: String,
    /// Pattern parameter that receives the locale code.
    pub locale_param: String,
    /// Locale used for the primary URL of each route.
    pub default_locale: Option<String>,
    pub on_error: FailurePolicy,
    /// Emit alternate links from static `locales` too.
    pub links: bool,
    /// Maximum number of templates resolved at once.
    pub concurrency: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            origin: String::new(),
            locales: Vec::new(),
            dynamic_locales: false,
            dynamic_lastmod: false,
            lastmod_param: "sys.updatedAt".into(),
            locale_param: "locale".into(),
            default_locale: None,
            on_error: FailurePolicy::Abort,
            links: false,
            concurrency: 8,
        }
    }
}

impl Options {
    /// Whether resolved routes carry per-locale alternate links.
    pub fn emits_links(&self) -> bool {
        self.dynamic_locales || self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options: Options = toml::from_str("").unwrap();
        assert_eq!(options, Options::default());
        assert_eq!(options.lastmod_param, "sys.updatedAt");
        assert_eq!(options.locale_param, "locale");
        assert_eq!(options.on_error, FailurePolicy::Abort);
        assert!(!options.emits_links());
    }

    #[test]
    fn test_partial_override() {
        let options: Options = toml::from_str(
            r#"
            origin = "https://example.com"
            locales = ["en", "fr"]
            dynamic_lastmod = true
            on_error = "skip"
            links = true
            "#,
        )
        .unwrap();

        assert_eq!(options.locales, vec!["en", "fr"]);
        assert!(options.dynamic_lastmod);
        assert_eq!(options.on_error, FailurePolicy::Skip);
        assert!(options.emits_links());
        assert_eq!(options.concurrency, 8);
    }
}
