//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Sitewerk static marketing-site build pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Source directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Base URL override (e.g. https://example.de)
    #[arg(short = 'U', long)]
    pub base_url: Option<String>,

    /// Config file path (default: sitewerk.toml)
    #[arg(short = 'C', long, default_value = "sitewerk.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Copy the source tree to the output directory and run every stage
    #[command(visible_alias = "b")]
    Build,

    /// Inject shared fragments into their placeholders
    #[command(visible_alias = "i")]
    Inject {
        /// Run only the partial with this fragment stem or placeholder id
        partial: Option<String>,
    },

    /// Build the articles database
    #[command(visible_alias = "a")]
    Articles,

    /// Inject related-article cards and FAQ blocks
    #[command(visible_alias = "r")]
    Related,

    /// Generate the knowledge base
    #[command(visible_alias = "k")]
    Knowledge,

    /// Generate sitemap.xml and sitemap.html
    #[command(visible_alias = "s")]
    Sitemap,

    /// Add lazy loading to images
    #[command(visible_alias = "l")]
    Lazy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_alias() {
        let cli = Cli::parse_from(["sitewerk", "b"]);
        assert!(matches!(cli.command, Commands::Build));
    }

    #[test]
    fn test_inject_partial() {
        let cli = Cli::parse_from(["sitewerk", "inject", "footer"]);
        match cli.command {
            Commands::Inject { partial } => assert_eq!(partial.as_deref(), Some("footer")),
            _ => panic!("expected inject"),
        }
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "sitewerk",
            "-o",
            "dist",
            "-U",
            "https://example.de",
            "build",
        ]);
        assert_eq!(cli.output.as_deref(), Some(std::path::Path::new("dist")));
        assert_eq!(cli.base_url.as_deref(), Some("https://example.de"));
    }
}
