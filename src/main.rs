//! Sitewerk - a build pipeline for static marketing sites.

mod articles;
mod cli;
mod config;
mod generator;
mod knowledge;
mod logger;
mod page;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build::run_build};
use config::SiteConfig;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(cli)?;

    match &cli.command {
        Commands::Build => run_build(&config),
        Commands::Inject { partial } => {
            let report = match partial {
                Some(name) => pipeline::inject::run_named(&config, name)?,
                None => pipeline::inject::run_all(&config)?,
            };
            report.log_summary("inject");
            Ok(())
        }
        Commands::Articles => stage(&config, "articles", articles::run),
        Commands::Related => stage(&config, "related", pipeline::related::run),
        Commands::Knowledge => stage(&config, "knowledge", knowledge::run),
        Commands::Sitemap => stage(&config, "sitemap", generator::sitemap::run),
        Commands::Lazy => stage(&config, "lazy", pipeline::lazy::run),
    }
}

/// Run a single stage standalone and log its summary.
fn stage(
    config: &SiteConfig,
    name: &str,
    run: fn(&SiteConfig) -> Result<pipeline::StageReport>,
) -> Result<()> {
    let report = run(config)?;
    report.log_summary(name);
    Ok(())
}
