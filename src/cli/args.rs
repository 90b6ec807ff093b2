//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Resolve CMS content into a localized sitemap
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sitemap.toml)
    #[arg(short = 'C', long, global = true, default_value = "sitemap.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// JSON content dump to resolve against (overrides `source` in config)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub source: Option<PathBuf>,

    /// Print fetch and skip details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve routes and write the sitemap
    #[command(visible_alias = "b")]
    Build {
        /// Output file path
        #[arg(short, long, default_value = "sitemap.xml", value_hint = clap::ValueHint::FilePath)]
        output: PathBuf,

        /// Minify the XML output
        #[arg(short, long)]
        minify: bool,

        /// Override `options.origin`
        #[arg(long)]
        origin: Option<String>,
    },

    /// Resolve routes and print them as JSON
    #[command(visible_alias = "r")]
    Routes {
        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,

        /// Include skipped templates/items in the output
        #[arg(long)]
        skipped: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from([
            "cms-sitemap",
            "-C",
            "site/sitemap.toml",
            "build",
            "--output",
            "public/sitemap.xml",
            "--minify",
        ]);
        assert_eq!(cli.config, PathBuf::from("site/sitemap.toml"));
        let Commands::Build { output, minify, origin } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(output, PathBuf::from("public/sitemap.xml"));
        assert!(minify);
        assert!(origin.is_none());
    }

    #[test]
    fn test_parse_routes_with_global_flags() {
        let cli = Cli::parse_from(["cms-sitemap", "routes", "--pretty", "-v", "-s", "dump.json"]);
        assert!(cli.verbose);
        assert_eq!(cli.source, Some(PathBuf::from("dump.json")));
        assert!(matches!(cli.command, Commands::Routes { pretty: true, skipped: false }));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
