//! Sitemap generation.
//!
//! Serializes resolved routes into a sitemap document. Locale links become
//! `xhtml:link` alternates.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml">
//!   <url>
//!     <loc>https://example.com/en/posts/hello</loc>
//!     <lastmod>2025-01-01T00:00:00.000Z</lastmod>
//!     <changefreq>weekly</changefreq>
//!     <priority>0.8</priority>
//!     <xhtml:link rel="alternate" hreflang="fr" href="https://example.com/fr/posts/hello"/>
//!   </url>
//! </urlset>
//! ```

use crate::{
    config::ChangeFreq,
    generator::minify_xml,
    log,
    route::ResolvedRoute,
};
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Write a sitemap for `routes` to `path`.
pub fn build_sitemap(routes: &[ResolvedRoute], origin: &str, path: &Path, minify: bool) -> Result<()> {
    Sitemap::build(routes, origin).write(path, minify)
}

pub struct Sitemap {
    urls: Vec<UrlEntry>,
}

struct UrlEntry {
    loc: String,
    lastmod: Option<String>,
    changefreq: Option<ChangeFreq>,
    priority: f32,
    /// `(hreflang, href)`
    alternates: Vec<(String, String)>,
}

impl Sitemap {
    pub fn build(routes: &[ResolvedRoute], origin: &str) -> Self {
        let base_url = origin.trim_end_matches('/');

        let urls = routes
            .iter()
            .map(|route| UrlEntry {
                loc: absolute(base_url, &route.url),
                lastmod: route.lastmod.clone(),
                changefreq: route.changefreq,
                priority: route.priority,
                alternates: route
                    .links
                    .iter()
                    .map(|link| (link.lang.clone(), absolute(base_url, &link.url)))
                    .collect(),
            })
            .collect();

        Self { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        if self.urls.iter().any(|u| !u.alternates.is_empty()) {
            xml.push_str("\" xmlns:xhtml=\"");
            xml.push_str(XHTML_NS);
        }
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n");
            if let Some(lastmod) = entry.lastmod {
                xml.push_str("    <lastmod>");
                xml.push_str(&escape_xml(&lastmod));
                xml.push_str("</lastmod>\n");
            }
            if let Some(changefreq) = entry.changefreq {
                xml.push_str("    <changefreq>");
                xml.push_str(changefreq.as_str());
                xml.push_str("</changefreq>\n");
            }
            xml.push_str("    <priority>");
            xml.push_str(&format_priority(entry.priority));
            xml.push_str("</priority>\n");
            for (lang, href) in &entry.alternates {
                xml.push_str("    <xhtml:link rel=\"alternate\" hreflang=\"");
                xml.push_str(&escape_xml(lang));
                xml.push_str("\" href=\"");
                xml.push_str(&escape_xml(href));
                xml.push_str("\"/>\n");
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    pub fn write(self, path: &Path, minify: bool) -> Result<()> {
        let count = self.len();
        let xml = self.into_xml();
        let xml = minify_xml(xml.as_bytes(), minify);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, &*xml)
            .with_context(|| format!("Failed to write sitemap to {}", path.display()))?;

        log!("sitemap"; "{} ({} urls)", path.display(), count);
        Ok(())
    }
}

/// Join a site-relative URL onto the origin; absolute URLs pass through.
fn absolute(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    if url.starts_with('/') {
        format!("{base_url}{url}")
    } else {
        format!("{base_url}/{url}")
    }
}

/// `1.0`, `0.5`, `0.85`: at least one decimal, no trailing zeros beyond it.
fn format_priority(priority: f32) -> String {
    let fixed = format!("{:.2}", priority.clamp(0.0, 1.0));
    match fixed.strip_suffix('0') {
        Some(trimmed) => trimmed.to_string(),
        None => fixed,
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
