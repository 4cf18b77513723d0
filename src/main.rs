//! folio - builds a static site from Markdown documents with an external
//! converter, copies passthrough assets, and writes an index page.

mod build;
mod cli;
mod compiler;
mod config;
mod error;
mod generator;
mod graph;
mod init;
mod utils;

use anyhow::{Result, bail};
use build::{build_site, clean_site};
use clap::Parser;
use cli::{Cli, Commands};
use compiler::converter::CommandConverter;
use config::SiteConfig;
use init::new_site;
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Some(Commands::Init { .. }) => new_site(config),
        Some(Commands::Clean) => clean_site(config),
        Some(Commands::Build { .. }) | None => {
            let converter = CommandConverter::new(&config.build.converter.command, config.get_root());
            build_site(config, &converter, cli.build_args().force).map(|_| ())
        }
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let root = cli.root_dir().unwrap_or_else(|| PathBuf::from("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() && !cli.is_init() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);

    // Validate config state based on command
    let config_exists = config.config_path.exists();
    match (cli.is_init(), config_exists) {
        (true, true) => {
            bail!("Config file already exists. Remove it manually or init in a different path.")
        }
        (false, false) => bail!("Config file not found."),
        _ => {}
    }

    if matches!(cli.command, Some(Commands::Build { .. }) | None) {
        config.validate()?;
    }

    Ok(config)
}
