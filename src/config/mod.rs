//! Sitemap configuration (`sitemap.toml`).
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error      # ConfigError, ConfigDiagnostics
//! ├── options    # [options]
//! ├── route      # [[routes]]
//! └── mod.rs     # SitemapConfig (this file)
//! ```
//!
//! # Example
//!
//! ```toml
//! source = "content.json"
//!
//! [options]
//! origin = "https://example.com"
//! dynamic_locales = true
//! dynamic_lastmod = true
//!
//! [[routes]]
//! url = "/"
//!
//! [[routes]]
//! pattern = "/:locale/posts/:slug"
//! params = { slug = "fields.slug" }
//! query = { content_type = "post" }
//! ```

mod error;
mod options;
mod route;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use options::{FailurePolicy, Options};
pub use route::{ChangeFreq, RouteTemplate};

use crate::log;
use crate::route::PathPattern;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing sitemap.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// JSON content dump, relative to the config file.
    #[serde(default)]
    pub source: Option<PathBuf>,

    #[serde(default)]
    pub options: Options,

    #[serde(default)]
    pub routes: Vec<RouteTemplate>,
}

impl SitemapConfig {
    /// Load and validate configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.config_path = path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Content dump path resolved against the config file's directory.
    pub fn source_path(&self) -> Option<PathBuf> {
        let source = self.source.as_ref()?;
        let root = self.config_path.parent().unwrap_or(Path::new(""));
        Some(root.join(source))
    }

    /// Check options and every route, collecting all problems.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        validate_options(&self.options, &mut diag);
        for (index, route) in self.routes.iter().enumerate() {
            validate_route(route, &format!("routes[{index}]"), &mut diag);
        }
        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

fn validate_options(options: &Options, diag: &mut ConfigDiagnostics) {
    if !options.origin.is_empty() {
        match url::Url::parse(&options.origin) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => diag.error(
                "options.origin",
                format!("unsupported scheme `{}`", url.scheme()),
            ),
            Err(e) => diag.error_with_hint(
                "options.origin",
                format!("not an absolute URL: {e}"),
                "use a full origin such as \"https://example.com\"",
            ),
        }
    }

    if options.lastmod_param.is_empty() {
        diag.error("options.lastmod_param", "must not be empty");
    }
    if options.locale_param.is_empty() {
        diag.error("options.locale_param", "must not be empty");
    }
    if options.concurrency == 0 {
        diag.error("options.concurrency", "must be at least 1");
    }

    if let Some(default) = &options.default_locale
        && !options.dynamic_locales
        && !options.locales.is_empty()
        && !options.locales.contains(default)
    {
        diag.error_with_hint(
            "options.default_locale",
            format!("`{default}` is not listed in `locales`"),
            format!("add it: locales = [{:?}, ...]", default),
        );
    }
}

fn validate_route(route: &RouteTemplate, field: &str, diag: &mut ConfigDiagnostics) {
    match (&route.url, &route.pattern) {
        (Some(_), Some(_)) => diag.error_with_hint(
            field,
            "both `url` and `pattern` are set",
            "a route is either static (`url`) or dynamic (`pattern`)",
        ),
        (None, None) => diag.error(field, "one of `url` or `pattern` is required"),
        _ => {}
    }

    if route.id.is_some() && route.query.is_some() {
        diag.error(field, "`id` and `query` are mutually exclusive");
    }
    if route.query.is_some() && route.pattern.is_none() {
        diag.error(format!("{field}.query"), "`query` requires a `pattern`");
    }
    if route.params.is_some() && route.pattern.is_none() {
        diag.error(format!("{field}.params"), "`params` requires a `pattern`");
    }
    if !(0.0..=1.0).contains(&route.priority) {
        diag.error(
            format!("{field}.priority"),
            format!("{} is outside 0.0..=1.0", route.priority),
        );
    }
    if let Some(pattern) = &route.pattern
        && let Err(e) = PathPattern::compile(pattern)
    {
        diag.error(format!("{field}.pattern"), e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
source = "content.json"

[options]
origin = "https://example.com"
locales = ["en", "fr"]
default_locale = "en"

[[routes]]
url = "/"
changefreq = "daily"

[[routes]]
pattern = "/:locale/posts/:slug"
params = { slug = "fields.slug" }
query = { content_type = "post" }
"#;

    #[test]
    fn test_from_str() {
        let config = SitemapConfig::from_str(SAMPLE).unwrap();
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.options.origin, "https://example.com");
        assert_eq!(config.routes[0].changefreq, Some(ChangeFreq::Daily));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = SitemapConfig::from_str("").unwrap();
        assert!(config.routes.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) =
            SitemapConfig::parse_with_ignored("[options]\norigin = \"https://a.b\"\nfoo = 1\n")
                .unwrap();
        assert_eq!(ignored, vec!["options.foo"]);
    }

    #[test]
    fn test_validate_route_conflicts() {
        let config = SitemapConfig {
            routes: vec![
                RouteTemplate {
                    url: Some("/".into()),
                    pattern: Some("/x".into()),
                    ..RouteTemplate::default()
                },
                RouteTemplate::default(),
                RouteTemplate::pattern("/posts/:slug")
                    .with_id("abc")
                    .with_query(serde_json::json!({ "content_type": "post" })),
                RouteTemplate::url("/a").with_priority(1.5),
                RouteTemplate::pattern("/:id(\\d+"),
            ],
            ..SitemapConfig::default()
        };

        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("expected diagnostics");
        };
        let fields: Vec<_> = diag.errors().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "routes[0]",
                "routes[1]",
                "routes[2]",
                "routes[3].priority",
                "routes[4].pattern"
            ]
        );
    }

    #[test]
    fn test_validate_query_without_pattern() {
        let route = RouteTemplate::url("/").with_query(serde_json::json!({ "a": 1 }));
        let mut diag = ConfigDiagnostics::new();
        validate_route(&route, "routes[0]", &mut diag);
        assert_eq!(diag.errors()[0].field, "routes[0].query");
    }

    #[test]
    fn test_validate_options() {
        let options = Options {
            origin: "example.com".into(),
            concurrency: 0,
            locales: vec!["en".into()],
            default_locale: Some("de".into()),
            ..Options::default()
        };
        let mut diag = ConfigDiagnostics::new();
        validate_options(&options, &mut diag);
        let fields: Vec<_> = diag.errors().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["options.origin", "options.concurrency", "options.default_locale"]
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitemap.toml");
        fs::File::create(&path)
            .unwrap()
            .write_all(SAMPLE.as_bytes())
            .unwrap();

        let config = SitemapConfig::load(&path).unwrap();
        assert_eq!(config.config_path, path);
        assert_eq!(config.source_path(), Some(dir.path().join("content.json")));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SitemapConfig::load(Path::new("/nonexistent/sitemap.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
