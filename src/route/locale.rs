//! Locale sets and per-locale link expansion.

use super::params::ParameterSet;
use super::pattern::{PathPattern, PatternError, decode};
use super::resolved::LocaleLink;
use crate::config::Options;
use crate::source::LocaleList;

/// Active locales for one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleSet {
    pub codes: Vec<String>,
    pub default: Option<String>,
}

impl LocaleSet {
    /// Locales from static configuration.
    pub fn from_options(options: &Options) -> Self {
        Self {
            codes: options.locales.clone(),
            default: options.default_locale.clone(),
        }
    }

    /// Locales reported by the content source.
    ///
    /// A configured default wins; otherwise the first locale the source
    /// flags as default is adopted.
    pub fn from_source(list: &LocaleList, configured_default: Option<&str>) -> Self {
        let default = configured_default.map(str::to_string).or_else(|| {
            list.items
                .iter()
                .find(|locale| locale.default)
                .map(|locale| locale.code.clone())
        });

        Self {
            codes: list.items.iter().map(|locale| locale.code.clone()).collect(),
            default,
        }
    }

    /// Parameters every route starts from: the default locale, if any.
    pub fn base_params(&self, locale_param: &str) -> ParameterSet {
        let mut params = ParameterSet::new();
        if let Some(default) = &self.default {
            params.insert(locale_param, default.as_str());
        }
        params
    }
}

/// Links built for one route, plus the locales that could not be built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleLinks {
    pub links: Vec<LocaleLink>,
    pub failed: Vec<(String, PatternError)>,
}

/// Build one decoded link per locale, in configured order.
///
/// Duplicate codes yield duplicate links. A locale whose URL cannot be built
/// is left out of `links` and reported in `failed`.
pub fn expand_locales(
    pattern: &PathPattern,
    base: &ParameterSet,
    locales: &[String],
    locale_param: &str,
) -> LocaleLinks {
    let mut out = LocaleLinks::default();

    for locale in locales {
        let params = base.with(locale_param, locale.as_str());
        match pattern.to_path(&params) {
            Ok(path) => out.links.push(LocaleLink {
                url: decode(&path),
                lang: locale.clone(),
            }),
            Err(e) => out.failed.push((locale.clone(), e)),
        }
    }

    out
}
