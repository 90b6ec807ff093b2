//! CLI entry points.

mod args;

pub use args::{Cli, Commands};

use crate::config::SitemapConfig;
use crate::generator::sitemap::build_sitemap;
use crate::pipeline::SitemapPipeline;
use crate::route::Resolution;
use crate::source::MemorySource;
use crate::{debug, log};
use anyhow::{Context, Result, bail};
use std::sync::Arc;

/// Run the parsed command.
pub async fn run(cli: &Cli) -> Result<()> {
    let mut config = SitemapConfig::load(&cli.config)?;

    if let Commands::Build {
        origin: Some(origin),
        ..
    } = &cli.command
    {
        config.options.origin = origin.clone();
        config.validate()?;
    }

    let Some(source_path) = cli.source.clone().or_else(|| config.source_path()) else {
        bail!("no content source: pass --source or set `source` in {}", cli.config.display());
    };
    let source = MemorySource::from_file(&source_path)
        .with_context(|| format!("Failed to load content from {}", source_path.display()))?;
    debug!("source"; "{}", source_path.display());

    let origin = config.options.origin.clone();
    let pipeline = SitemapPipeline::from_config(Arc::new(source), config)?;
    let resolution = pipeline.resolve_all().await?;
    report(&resolution);

    match &cli.command {
        Commands::Build { output, minify, .. } => {
            build_sitemap(&resolution.routes, &origin, output, *minify)
        }
        Commands::Routes { pretty, skipped } => print_routes(&resolution, *pretty, *skipped),
    }
}

fn report(resolution: &Resolution) {
    log!(
        "routes";
        "{} resolved, {} skipped",
        resolution.routes.len(),
        resolution.skipped.len()
    );
}

fn print_routes(resolution: &Resolution, pretty: bool, skipped: bool) -> Result<()> {
    let value = if skipped {
        serde_json::to_value(resolution)?
    } else {
        serde_json::to_value(&resolution.routes)?
    };
    let json = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{json}");
    Ok(())
}
