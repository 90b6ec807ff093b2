//! Pipeline driver.
//!
//! Resolves the active locale set, runs every template through the
//! [`RouteResolver`] concurrently, and flattens the results in registration
//! order.

use crate::config::{FailurePolicy, Options, RouteTemplate, SitemapConfig};
use crate::error::SitemapError;
use crate::route::{LocaleSet, Resolution, RouteResolver};
use crate::source::ContentSource;
use crate::{debug, log};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};

pub struct SitemapPipeline {
    source: Arc<dyn ContentSource>,
    routes: Vec<RouteTemplate>,
    options: Options,
}

impl SitemapPipeline {
    /// Create a pipeline, rejecting sources that cannot serve every operation.
    pub fn new(
        source: Arc<dyn ContentSource>,
        routes: Vec<RouteTemplate>,
        options: Options,
    ) -> Result<Self, SitemapError> {
        let missing = source.capabilities().missing();
        if !missing.is_empty() {
            return Err(SitemapError::InvalidClientCapability { missing });
        }

        Ok(Self {
            source,
            routes,
            options,
        })
    }

    /// Create a pipeline from a loaded config file.
    pub fn from_config(
        source: Arc<dyn ContentSource>,
        config: SitemapConfig,
    ) -> Result<Self, SitemapError> {
        config.validate()?;
        Self::new(source, config.routes, config.options)
    }

    /// Register another template after construction.
    pub fn add_route(&mut self, route: RouteTemplate) -> &mut Self {
        self.routes.push(route);
        self
    }

    pub fn routes(&self) -> &[RouteTemplate] {
        &self.routes
    }

    /// Locales for this run: static config, or the source's list when
    /// `dynamic_locales` is set.
    pub async fn resolve_locales(&self) -> Result<LocaleSet, SitemapError> {
        if !self.options.dynamic_locales {
            return Ok(LocaleSet::from_options(&self.options));
        }

        let list = self
            .source
            .list_locales()
            .await
            .map_err(|e| SitemapError::fetch("locales", e))?;
        let locales = LocaleSet::from_source(&list, self.options.default_locale.as_deref());
        debug!(
            "locales";
            "{} (default: {})",
            locales.codes.join(", "),
            locales.default.as_deref().unwrap_or("none")
        );
        Ok(locales)
    }

    /// Resolve every template into routes.
    ///
    /// Templates are cloned into the resolution tasks, so the registered
    /// templates are never modified and repeated runs are independent.
    pub async fn resolve_all(&self) -> Result<Resolution, SitemapError> {
        let locales = Arc::new(self.resolve_locales().await?);
        let resolver = RouteResolver::new(
            Arc::clone(&self.source),
            Arc::new(self.options.clone()),
            locales,
        );
        let limit = Arc::new(Semaphore::new(self.options.concurrency.max(1)));

        let mut tasks = JoinSet::new();
        let mut spawned: HashMap<Id, (usize, String)> = HashMap::new();
        for (index, template) in self.routes.iter().cloned().enumerate() {
            let resolver = resolver.clone();
            let limit = Arc::clone(&limit);
            let label = template.label();
            let handle = tasks.spawn(async move {
                let _permit = limit.acquire_owned().await.ok();
                resolver.resolve(&template).await
            });
            spawned.insert(handle.id(), (index, label));
        }

        let mut slots: Vec<Resolution> = vec![Resolution::default(); self.routes.len()];
        while let Some(joined) = tasks.join_next_with_id().await {
            let id = match &joined {
                Ok((id, _)) => *id,
                Err(e) => e.id(),
            };
            let Some((index, label)) = spawned.remove(&id) else {
                continue;
            };
            let result = match joined {
                Ok((_, result)) => result,
                Err(e) => {
                    debug!("task"; "{}: {}", label, e);
                    Err(SitemapError::Task {
                        scope: label.clone(),
                    })
                }
            };

            match (result, self.options.on_error) {
                (Ok(resolution), _) => slots[index] = resolution,
                (Err(e), FailurePolicy::Skip) => {
                    log!("skip"; "{}: {}", label, e);
                    slots[index].skip(&label, e);
                }
                (Err(e), FailurePolicy::Abort) => {
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        let mut resolution = Resolution::default();
        for slot in slots {
            resolution.extend(slot);
        }
        debug!(
            "routes";
            "{} routes from {} templates ({} skipped)",
            resolution.routes.len(),
            self.routes.len(),
            resolution.skipped.len()
        );
        Ok(resolution)
    }
}
