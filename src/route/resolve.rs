//! Per-template route resolution.
//!
//! Each template is resolved independently into zero or more routes:
//!
//! ```text
//! no pattern            -> the static url as-is
//! pattern, no query     -> one url from the base params (skipped on mismatch)
//! pattern + query       -> one url per listed item that passes the filter
//! ```
//!
//! With `dynamic_lastmod`, an `id`-bound template first fetches its entry and
//! takes lastmod from `lastmod_param`.

use super::filter::check_entry;
use super::locale::{LocaleSet, expand_locales};
use super::params::{ParameterSet, lookup, scalar_text};
use super::pattern::{PathPattern, decode};
use super::resolved::{LocaleLink, Resolution, ResolvedRoute};
use crate::config::{Options, RouteTemplate};
use crate::error::SitemapError;
use crate::source::{ContentItem, ContentSource, Query, load_all_items};
use crate::debug;
use std::sync::Arc;

/// Resolves templates against one content source.
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct RouteResolver {
    source: Arc<dyn ContentSource>,
    options: Arc<Options>,
    locales: Arc<LocaleSet>,
}

impl RouteResolver {
    pub fn new(source: Arc<dyn ContentSource>, options: Arc<Options>, locales: Arc<LocaleSet>) -> Self {
        Self {
            source,
            options,
            locales,
        }
    }

    /// Resolve one template.
    ///
    /// Parameter mismatches become skip notes; only source failures are errors.
    pub async fn resolve(&self, template: &RouteTemplate) -> Result<Resolution, SitemapError> {
        let label = template.label();
        let mut out = Resolution::default();

        let mut lastmod = template.lastmod.clone();
        if self.options.dynamic_lastmod
            && let Some(id) = &template.id
        {
            let item = self
                .source
                .get_item(id)
                .await
                .map_err(|e| SitemapError::fetch(&label, e))?;
            lastmod = self.lastmod_of(&item).or(lastmod);
        }

        let Some(pattern) = &template.pattern else {
            match &template.url {
                Some(url) => out.routes.push(ResolvedRoute {
                    url: url.clone(),
                    changefreq: template.changefreq,
                    lastmod,
                    priority: template.priority,
                    links: Vec::new(),
                }),
                None => out.skip(&label, "neither `url` nor `pattern` is set"),
            }
            return Ok(out);
        };

        let pattern = match PathPattern::compile(pattern) {
            Ok(pattern) => pattern,
            Err(e) => {
                out.skip(&label, e);
                return Ok(out);
            }
        };
        let base = self.locales.base_params(&self.options.locale_param);

        if let Some(query) = &template.query {
            return self.resolve_query(template, &label, &pattern, &base, query).await;
        }

        match pattern.to_path(&base) {
            Ok(path) => {
                let links = self.links(&pattern, &base, &label, &mut out);
                out.routes.push(ResolvedRoute {
                    url: decode(&path),
                    changefreq: template.changefreq,
                    lastmod,
                    priority: template.priority,
                    links,
                });
            }
            Err(e) => out.skip(&label, e),
        }

        Ok(out)
    }

    async fn resolve_query(
        &self,
        template: &RouteTemplate,
        label: &str,
        pattern: &PathPattern,
        base: &ParameterSet,
        query: &Query,
    ) -> Result<Resolution, SitemapError> {
        let query = self.effective_query(query);
        let items = load_all_items(self.source.as_ref(), &query)
            .await
            .map_err(|e| SitemapError::fetch(label, e))?;
        debug!("fetch"; "{}: {} items", label, items.len());

        let mut out = Resolution::default();
        for item in &items {
            let params = match check_entry(item, template, pattern, base) {
                Ok(params) => params,
                Err(rejection) => {
                    out.skip(label, format!("{} ({})", rejection, item_id(item)));
                    continue;
                }
            };

            let path = match pattern.to_path(&params) {
                Ok(path) => path,
                Err(e) => {
                    out.skip(label, format!("{} ({})", e, item_id(item)));
                    continue;
                }
            };

            let lastmod = if self.options.dynamic_lastmod {
                self.lastmod_of(item).or_else(|| template.lastmod.clone())
            } else {
                template.lastmod.clone()
            };
            let links = self.links(pattern, &params, label, &mut out);

            out.routes.push(ResolvedRoute {
                url: decode(&path),
                changefreq: template.changefreq,
                lastmod,
                priority: template.priority,
                links,
            });
        }

        Ok(out)
    }

    /// Query with the lastmod field added to an explicit `select`.
    fn effective_query(&self, query: &Query) -> Query {
        let mut query = query.clone();
        if !self.options.dynamic_lastmod {
            return query;
        }

        let field = self.options.lastmod_param.as_str();
        if let Some(serde_json::Value::String(select)) = query.get_mut("select")
            && !select.split(',').any(|s| s.trim() == field)
        {
            if !select.is_empty() {
                select.push(',');
            }
            select.push_str(field);
        }
        query
    }

    fn links(
        &self,
        pattern: &PathPattern,
        params: &ParameterSet,
        label: &str,
        out: &mut Resolution,
    ) -> Vec<LocaleLink> {
        if !self.options.emits_links() {
            return Vec::new();
        }

        let expanded = expand_locales(pattern, params, &self.locales.codes, &self.options.locale_param);
        for (locale, e) in expanded.failed {
            out.skip(label, format!("no `{locale}` link: {e}"));
        }
        expanded.links
    }

    fn lastmod_of(&self, item: &ContentItem) -> Option<String> {
        lookup(item, &self.options.lastmod_param).and_then(scalar_text)
    }
}

/// `sys.id` of an item for diagnostics, if it has one.
fn item_id(item: &ContentItem) -> String {
    lookup(item, "sys.id")
        .and_then(scalar_text)
        .map(|id| format!("item `{id}`"))
        .unwrap_or_else(|| "item without id".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChangeFreq;
    use crate::source::{MemorySource, SourceError};
    use serde_json::json;

    fn post(id: &str, slug: &str, updated: &str) -> ContentItem {
        json!({
            "sys": {
                "id": id,
                "updatedAt": updated,
                "contentType": { "sys": { "id": "post" } }
            },
            "fields": { "slug": slug }
        })
    }

    fn source() -> Arc<MemorySource> {
        Arc::new(
            MemorySource::new(vec![
                post("p1", "hello", "2024-01-01T00:00:00.000Z"),
                post("p2", "", "2024-01-02T00:00:00.000Z"),
                post("p3", "world", "2024-01-03T00:00:00.000Z"),
                json!({ "sys": { "id": "home", "updatedAt": "2024-02-01T00:00:00.000Z" } }),
            ])
            .with_page_size(2),
        )
    }

    fn resolver(source: Arc<MemorySource>, options: Options, locales: LocaleSet) -> RouteResolver {
        RouteResolver::new(source, Arc::new(options), Arc::new(locales))
    }

    fn posts_route() -> RouteTemplate {
        RouteTemplate::pattern("/posts/:slug")
            .with_param("slug", "fields.slug")
            .with_query(json!({ "content_type": "post" }))
            .with_changefreq(ChangeFreq::Weekly)
            .with_priority(0.7)
    }

    #[tokio::test]
    async fn test_static_route_passthrough() {
        let resolver = resolver(source(), Options::default(), LocaleSet::default());
        let template = RouteTemplate::url("/about")
            .with_lastmod("2024-03-01")
            .with_changefreq(ChangeFreq::Monthly);

        let out = resolver.resolve(&template).await.unwrap();
        assert_eq!(
            out.routes,
            vec![ResolvedRoute {
                url: "/about".into(),
                changefreq: Some(ChangeFreq::Monthly),
                lastmod: Some("2024-03-01".into()),
                priority: 1.0,
                links: vec![],
            }]
        );
    }

    #[tokio::test]
    async fn test_static_pattern_seeded_from_default_locale() {
        let locales = LocaleSet {
            codes: vec!["en".into()],
            default: Some("en".into()),
        };
        let resolver = resolver(source(), Options::default(), locales);

        let out = resolver.resolve(&RouteTemplate::pattern("/:locale/about")).await.unwrap();
        assert_eq!(out.routes.len(), 1);
        assert_eq!(out.routes[0].url, "/en/about");
    }

    #[tokio::test]
    async fn test_pattern_filled_from_item_fields() {
        let resolver = resolver(source(), Options::default(), LocaleSet::default());
        let template = RouteTemplate::pattern("/posts/:slug")
            .with_param("slug", "fields.slug")
            .with_query(json!({ "sys.id": "p1" }));

        let out = resolver.resolve(&template).await.unwrap();
        let urls: Vec<_> = out.routes.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["/posts/hello"]);
        assert!(out.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_pattern_item_without_fields_is_dropped() {
        let resolver = resolver(source(), Options::default(), LocaleSet::default());
        let template = RouteTemplate::pattern("/posts/:slug")
            .with_param("slug", "fields.slug")
            .with_query(json!({ "sys.id": "home" }));

        let out = resolver.resolve(&template).await.unwrap();
        assert!(out.routes.is_empty());
        assert_eq!(out.skipped.len(), 1);
    }

    #[tokio::test]
    async fn test_static_pattern_mismatch_is_dropped() {
        let resolver = resolver(source(), Options::default(), LocaleSet::default());
        let out = resolver.resolve(&RouteTemplate::pattern("/posts/:slug")).await.unwrap();
        assert!(out.routes.is_empty());
        assert_eq!(out.skipped.len(), 1);
        assert!(out.skipped[0].reason.contains("slug"));
    }

    #[tokio::test]
    async fn test_query_route_filters_and_orders() {
        let resolver = resolver(source(), Options::default(), LocaleSet::default());
        let out = resolver.resolve(&posts_route()).await.unwrap();

        let urls: Vec<_> = out.routes.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["/posts/hello", "/posts/world"]);
        assert!(out.routes.iter().all(|r| r.changefreq == Some(ChangeFreq::Weekly)));
        assert!(out.routes.iter().all(|r| r.priority == 0.7));
        assert!(out.routes.iter().all(|r| r.lastmod.is_none()));
        assert_eq!(out.skipped.len(), 1);
        assert!(out.skipped[0].reason.contains("item `p2`"));
    }

    #[tokio::test]
    async fn test_query_route_dynamic_lastmod() {
        let options = Options {
            dynamic_lastmod: true,
            ..Options::default()
        };
        let resolver = resolver(source(), options, LocaleSet::default());
        let out = resolver.resolve(&posts_route()).await.unwrap();

        let lastmods: Vec<_> = out.routes.iter().map(|r| r.lastmod.as_deref()).collect();
        assert_eq!(
            lastmods,
            vec![Some("2024-01-01T00:00:00.000Z"), Some("2024-01-03T00:00:00.000Z")]
        );
    }

    #[tokio::test]
    async fn test_id_bound_dynamic_lastmod() {
        let options = Options {
            dynamic_lastmod: true,
            ..Options::default()
        };
        let resolver = resolver(source(), options, LocaleSet::default());
        let template = RouteTemplate::url("/").with_id("home").with_lastmod("1999-01-01");

        let out = resolver.resolve(&template).await.unwrap();
        assert_eq!(out.routes[0].lastmod.as_deref(), Some("2024-02-01T00:00:00.000Z"));
    }

    #[tokio::test]
    async fn test_id_ignored_without_dynamic_lastmod() {
        let resolver = resolver(source(), Options::default(), LocaleSet::default());
        let template = RouteTemplate::url("/").with_id("missing");
        let out = resolver.resolve(&template).await.unwrap();
        assert_eq!(out.routes.len(), 1);
        assert!(out.routes[0].lastmod.is_none());
    }

    #[tokio::test]
    async fn test_id_fetch_failure_propagates() {
        let options = Options {
            dynamic_lastmod: true,
            ..Options::default()
        };
        let resolver = resolver(source(), options, LocaleSet::default());
        let template = RouteTemplate::url("/").with_id("missing");

        let err = resolver.resolve(&template).await.unwrap_err();
        assert!(matches!(
            err,
            SitemapError::SourceFetch {
                source: SourceError::NotFound(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_locale_links_with_dynamic_locales() {
        let options = Options {
            dynamic_locales: true,
            ..Options::default()
        };
        let locales = LocaleSet {
            codes: vec!["en".into(), "fr".into()],
            default: Some("en".into()),
        };
        let resolver = resolver(source(), options, locales);
        let template = RouteTemplate::pattern("/:locale/posts/:slug")
            .with_param("slug", "fields.slug")
            .with_query(json!({ "content_type": "post" }));

        let out = resolver.resolve(&template).await.unwrap();
        assert_eq!(out.routes[0].url, "/en/posts/hello");
        let links: Vec<_> = out.routes[0]
            .links
            .iter()
            .map(|l| (l.lang.as_str(), l.url.as_str()))
            .collect();
        assert_eq!(links, vec![("en", "/en/posts/hello"), ("fr", "/fr/posts/hello")]);
    }

    #[tokio::test]
    async fn test_no_links_without_flag() {
        let locales = LocaleSet {
            codes: vec!["en".into(), "fr".into()],
            default: Some("en".into()),
        };
        let resolver = resolver(source(), Options::default(), locales);
        let out = resolver.resolve(&RouteTemplate::pattern("/:locale")).await.unwrap();
        assert_eq!(out.routes[0].url, "/en");
        assert!(out.routes[0].links.is_empty());
    }

    #[tokio::test]
    async fn test_effective_query_appends_lastmod() {
        let options = Options {
            dynamic_lastmod: true,
            ..Options::default()
        };
        let resolver = resolver(source(), options, LocaleSet::default());

        let query = json!({ "select": "fields.slug" });
        let query = resolver.effective_query(query.as_object().unwrap());
        assert_eq!(query["select"], json!("fields.slug,sys.updatedAt"));

        let already = json!({ "select": "fields.slug, sys.updatedAt" });
        let already = resolver.effective_query(already.as_object().unwrap());
        assert_eq!(already["select"], json!("fields.slug, sys.updatedAt"));

        let none = json!({ "content_type": "post" });
        assert!(!resolver.effective_query(none.as_object().unwrap()).contains_key("select"));
    }

    #[tokio::test]
    async fn test_resolving_twice_is_identical() {
        let resolver = resolver(source(), Options::default(), LocaleSet::default());
        let template = RouteTemplate::url("/contact");
        let first = resolver.resolve(&template).await.unwrap();
        let second = resolver.resolve(&template).await.unwrap();
        assert_eq!(first, second);
    }
}
