//! Site configuration management for `folio.toml`.
//!
//! # Sections
//!
//! | Section              | Purpose                                       |
//! |----------------------|-----------------------------------------------|
//! | `[build]`            | Content/output trees, footer, stylesheet      |
//! | `[build.documents]`  | Convertible source extension                  |
//! | `[build.assets]`     | Passthrough extensions, collision precedence  |
//! | `[build.converter]`  | External converter command                    |
//! | `[build.index]`      | Generated index page                          |
//! | `[build.archive]`    | Output tree packaging                         |
//!
//! # Example
//!
//! ```toml
//! [build]
//! content = "content"
//! output = "public"
//! footer = "footer.html"
//!
//! [build.index]
//! exclude = ["index.html"]
//! ```

mod build;
pub mod defaults;
mod error;

pub use build::BuildConfig;
pub use error::ConfigError;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing folio.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Log each converted and copied file
    #[serde(skip)]
    pub verbose: bool,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Absolute path of the index page, if the index is enabled.
    pub fn index_path(&self) -> Option<PathBuf> {
        self.build
            .index
            .enable
            .then(|| self.build.output.join(&self.build.index.path))
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let base = cli.root_dir().unwrap_or_else(|| self.get_root().to_owned());

        let root = match &cli.command {
            Some(Commands::Init { name: Some(name) }) => base.join(name),
            _ => base,
        };

        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        if let Some(Commands::Build { build_args }) = &cli.command {
            Self::update_option(&mut self.build.minify, build_args.minify.as_ref());
            Self::update_option(&mut self.build.jobs, build_args.jobs.as_ref());
            if build_args.no_archive {
                self.build.archive.enable = false;
            }
        }

        self.verbose = cli.verbose;
        self.resolve_paths(&root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Make every path absolute, relative to `root`.
    ///
    /// The index path stays relative to the output tree.
    pub fn resolve_paths(&mut self, root: &Path, config_file: &Path) {
        let root = normalize_path(root);
        self.set_root(&root);

        self.config_path = normalize_path(&root.join(config_file));
        self.build.content = normalize_path(&root.join(&self.build.content));
        self.build.output = normalize_path(&root.join(&self.build.output));
        self.build.footer = normalize_path(&root.join(&self.build.footer));
        self.build.archive.path = normalize_path(&root.join(&self.build.archive.path));
    }

    /// Validate configuration before a build
    pub fn validate(&self) -> Result<()> {
        if !self.config_path.exists() {
            bail!("Config file not found.");
        }

        Self::check_command_installed("[build.converter.command]", &self.build.converter.command)?;

        let build = &self.build;

        if !build.content.is_dir() {
            bail!(ConfigError::Validation(format!(
                "[build.content] `{}` is not a directory",
                build.content.display()
            )));
        }

        if !build.footer.is_file() {
            bail!(ConfigError::Validation(format!(
                "[build.footer] `{}` not found",
                build.footer.display()
            )));
        }

        if build.output == build.content || build.content.starts_with(&build.output) {
            bail!(ConfigError::Validation(
                "[build.output] must not contain [build.content]".into()
            ));
        }

        if build.archive.enable && build.archive.path.starts_with(&build.output) {
            bail!(ConfigError::Validation(
                "[build.archive.path] must be outside [build.output]".into()
            ));
        }

        if !(0..=22).contains(&build.archive.level) {
            bail!(ConfigError::Validation(
                "[build.archive.level] must be between 0 and 22".into()
            ));
        }

        if build.documents.extension.is_empty() || build.documents.output_extension.is_empty() {
            bail!(ConfigError::Validation(
                "[build.documents] extensions must not be empty".into()
            ));
        }

        if build.index.path.is_absolute() {
            bail!(ConfigError::Validation(
                "[build.index.path] must be relative to [build.output]".into()
            ));
        }

        if build.index.enable
            && build
                .index
                .path
                .extension()
                .is_some_and(|ext| ext == build.documents.output_extension.as_str())
        {
            let document = build
                .content
                .join(build.index.path.with_extension(&build.documents.extension));
            if document.is_file() {
                bail!(ConfigError::Validation(format!(
                    "[build.index.path] `{}` is also the page of `{}`",
                    build.index.path.display(),
                    document.display()
                )));
            }
        }

        Ok(())
    }

    /// Check if a command is installed and available
    fn check_command_installed(field: &str, command: &[String]) -> Result<()> {
        let Some(cmd) = command.first() else {
            bail!(ConfigError::Validation(format!(
                "{field} must have at least one element"
            )));
        };

        which::which(cmd)
            .with_context(|| format!("`{cmd}` not found. Please install it first."))?;

        Ok(())
    }
}

/// Normalize a path to absolute, using canonicalize if the path exists
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        // For non-existent paths, manually make them absolute
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn site_with_footer() -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        fs::write(dir.path().join("footer.html"), "<footer/>").unwrap();
        fs::write(dir.path().join("folio.toml"), "").unwrap();

        let mut config = SiteConfig::default();
        config.build.converter.command = vec!["sh".into()];
        config.resolve_paths(dir.path(), Path::new("folio.toml"));
        (dir, config)
    }

    #[test]
    fn test_from_str() {
        let config = SiteConfig::from_str(
            r#"
            [build]
            content = "essays"
            output = "site"
        "#,
        )
        .unwrap();

        assert_eq!(config.build.content, PathBuf::from("essays"));
        assert_eq!(config.build.output, PathBuf::from("site"));
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SiteConfig::from_str("[build\ncontent = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let result = SiteConfig::from_str("[serve]\nport = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = SiteConfig::from_path(Path::new("/nonexistent/folio.toml")).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_get_root_default() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_resolve_paths_makes_absolute() {
        let (dir, config) = site_with_footer();
        let root = normalize_path(dir.path());

        assert_eq!(config.get_root(), root);
        assert_eq!(config.build.content, root.join("content"));
        assert_eq!(config.build.output, root.join("public"));
        assert_eq!(config.build.archive.path, root.join("site.tar.zst"));
        assert_eq!(config.build.index.path, PathBuf::from("contents.html"));
    }

    #[test]
    fn test_index_path() {
        let (_dir, mut config) = site_with_footer();
        assert_eq!(
            config.index_path(),
            Some(config.build.output.join("contents.html"))
        );

        config.build.index.enable = false;
        assert_eq!(config.index_path(), None);
    }

    #[test]
    fn test_update_with_cli_overrides() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from([
            "folio", "-r", root, "-o", "out", "build", "--jobs", "3", "--no-archive", "--minify",
        ]);

        let mut config = SiteConfig::default();
        config.update_with_cli(&cli);

        assert_eq!(config.build.output, normalize_path(dir.path()).join("out"));
        assert_eq!(config.build.jobs, 3);
        assert!(config.build.minify);
        assert!(!config.build.archive.enable);
    }

    #[test]
    fn test_validate_ok() {
        let (_dir, config) = site_with_footer();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_missing_footer() {
        let (dir, config) = site_with_footer();
        fs::remove_file(dir.path().join("footer.html")).unwrap();

        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("[build.footer]"));
    }

    #[test]
    fn test_validate_archive_inside_output() {
        let (_dir, mut config) = site_with_footer();
        config.build.archive.path = config.build.output.join("site.tar.zst");

        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("[build.archive.path]"));
    }

    #[test]
    fn test_validate_output_contains_content() {
        let (_dir, mut config) = site_with_footer();
        config.build.output = config.get_root().to_path_buf();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_index_path_shadowing_a_document() {
        let (dir, mut config) = site_with_footer();
        fs::write(dir.path().join("content/contents.md"), "# Contents").unwrap();

        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("[build.index.path]"));

        config.build.index.enable = false;
        config.validate().unwrap();

        config.build.index.enable = true;
        config.build.index.path = "toc.html".into();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_empty_converter_command() {
        let (_dir, mut config) = site_with_footer();
        config.build.converter.command.clear();

        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("at least one element"));
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&SiteConfig::default()).unwrap();
        let parsed = SiteConfig::from_str(&text).unwrap();
        assert_eq!(parsed.build.index.title, "Contents");
        assert_eq!(parsed.build.converter.command, vec!["pandoc".to_string()]);
    }
}
