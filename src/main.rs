//! cms-sitemap - resolve CMS content into a localized sitemap.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cms_sitemap::{
    cli::{self, Cli},
    logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    cli::run(&cli).await
}
