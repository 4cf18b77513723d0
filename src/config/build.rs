//! `[build]` section configuration.
//!
//! Contains the content/output layout, file classification rules, the
//! converter command, and the index/archive generators.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Main BuildConfig
// ============================================================================

/// `[build]` section in folio.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"      # Source tree
/// output = "public"        # Output tree
/// footer = "footer.html"   # Appended to every converted page
///
/// [build.converter]
/// command = ["pandoc"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root", skip_serializing_if = "Option::is_none")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content source tree (documents and assets).
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Build output tree.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Footer fragment appended to every converted page.
    #[serde(default = "defaults::build::footer")]
    #[educe(Default = defaults::build::footer())]
    pub footer: PathBuf,

    /// Stylesheet href (relative to the output root) injected into pages
    /// that carry no `<style>` block of their own.
    #[serde(default = "defaults::build::stylesheet")]
    #[educe(Default = defaults::build::stylesheet())]
    pub stylesheet: Option<String>,

    /// Minify converted pages and the index.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Worker threads for the conversion level (0 = number of CPUs).
    #[serde(default = "defaults::build::jobs")]
    #[educe(Default = defaults::build::jobs())]
    pub jobs: usize,

    /// Document classification.
    #[serde(default)]
    pub documents: DocumentsConfig,

    /// Asset classification.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// External converter.
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Generated index page.
    #[serde(default)]
    pub index: IndexConfig,

    /// Output tree archive.
    #[serde(default)]
    pub archive: ArchiveConfig,
}

// ============================================================================
// Sub-configurations
// ============================================================================

/// `[build.documents]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct DocumentsConfig {
    /// Extension of convertible sources (without the dot).
    #[serde(default = "defaults::build::documents::extension")]
    #[educe(Default = defaults::build::documents::extension())]
    pub extension: String,

    /// Extension given to rendered pages.
    #[serde(default = "defaults::build::documents::output_extension")]
    #[educe(Default = defaults::build::documents::output_extension())]
    pub output_extension: String,
}

/// `[build.assets]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct AssetsConfig {
    /// Extensions copied verbatim into the output tree.
    #[serde(default = "defaults::build::assets::extensions")]
    #[educe(Default = defaults::build::assets::extensions())]
    pub extensions: Vec<String>,

    /// When an asset would land on a generated output path, drop the asset
    /// instead of failing discovery.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub prefer_generated: bool,
}

/// `[build.converter]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ConverterConfig {
    /// Converter command and leading arguments
    #[serde(default = "defaults::build::converter::command")]
    #[educe(Default = defaults::build::converter::command())]
    pub command: Vec<String>,
}

/// `[build.index]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Generate the index page
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Output-relative path of the index page
    #[serde(default = "defaults::build::index::path")]
    #[educe(Default = defaults::build::index::path())]
    pub path: PathBuf,

    /// Page title and heading
    #[serde(default = "defaults::build::index::title")]
    #[educe(Default = defaults::build::index::title())]
    pub title: String,

    /// Output-relative page paths never listed (hand-authored front pages).
    #[serde(default = "defaults::build::index::exclude")]
    #[educe(Default = defaults::build::index::exclude())]
    pub exclude: Vec<String>,
}

/// `[build.archive]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Package the output tree after a successful build
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Archive path (relative to the project root)
    #[serde(default = "defaults::build::archive::path")]
    #[educe(Default = defaults::build::archive::path())]
    pub path: PathBuf,

    /// zstd compression level
    #[serde(default = "defaults::build::archive::level")]
    #[educe(Default = defaults::build::archive::level())]
    pub level: i32,
}

// ============================================================================
// Tests
// ============================================================================
