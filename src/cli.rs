//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// folio site builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Content directory path (relative to project root)
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Config file name (default: folio.toml)
    #[arg(short = 'C', long, default_value = "folio.toml")]
    pub config: PathBuf,

    /// Log every converted and copied file
    #[arg(short, long)]
    pub verbose: bool,

    /// subcommands (default: build)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Arguments of the build command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Rebuild every target, ignoring timestamps
    #[arg(short, long)]
    pub force: bool,

    /// Worker threads (0 = number of CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Skip packaging the output tree
    #[arg(long)]
    pub no_archive: bool,

    /// Minify the html content
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Init a site skeleton
    Init {
        /// the name(path) of site directory, related to `root`
        name: Option<PathBuf>,
    },

    /// Build pages, copy assets, write the index and package the output
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Delete the output directory and the archive
    Clean,
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Commands::Init { .. }))
    }

    /// Project root with a leading `~` expanded, if `--root` was given.
    pub fn root_dir(&self) -> Option<PathBuf> {
        self.root.as_deref().map(expand_tilde)
    }

    /// Build arguments, defaulting when no subcommand was given.
    pub fn build_args(&self) -> BuildArgs {
        match &self.command {
            Some(Commands::Build { build_args }) => build_args.clone(),
            _ => BuildArgs::default(),
        }
    }
}

/// Expand a leading `~` in a user-supplied path.
fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    }
}
