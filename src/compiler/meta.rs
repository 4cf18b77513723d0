//! Output path metadata for pages and assets.
//!
//! | Field      | Page example                  | Asset example             |
//! |------------|-------------------------------|---------------------------|
//! | `source`   | `content/essays/guide.md`     | `content/img/logo.png`    |
//! | `dest`     | `public/essays/guide.html`    | `public/img/logo.png`     |
//! | `relative` | `essays/guide.html`           | `img/logo.png`            |
//!
//! `relative` is always the output-relative path with `/` separators, so it
//! doubles as the link target in the index page.

use crate::config::BuildConfig;
use anyhow::{Result, anyhow};
use std::path::{Component, Path, PathBuf};

/// Source and output paths of a converted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub relative: String,
}

/// Source and output paths of a copied asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMeta {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub relative: String,
}

impl PageMeta {
    /// Map `content/a/b.md` to `output/a/b.html`.
    pub fn from_source(source: PathBuf, build: &BuildConfig) -> Result<Self> {
        let rel = source_relative(&source, &build.content)?;
        let rel_out = rel.with_extension(&build.documents.output_extension);
        Ok(Self {
            dest: build.output.join(&rel_out),
            relative: to_url_path(&rel_out)?,
            source,
        })
    }

    /// Page title synthesized from the file name: `java-records` → `java records`.
    pub fn title(&self) -> String {
        let stem = self
            .source
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        humanize(&stem)
    }

    /// Href of an output-root-relative file as seen from this page.
    ///
    /// `style.css` from `essays/guide.html` is `../style.css`.
    pub fn href_to(&self, target: &str) -> String {
        format!("{}{target}", "../".repeat(depth(&self.relative)))
    }
}

impl AssetMeta {
    /// Map `content/a/b.png` to `output/a/b.png`.
    pub fn from_source(source: PathBuf, build: &BuildConfig) -> Result<Self> {
        let rel = source_relative(&source, &build.content)?;
        Ok(Self {
            dest: build.output.join(&rel),
            relative: to_url_path(&rel)?,
            source,
        })
    }
}

/// Strip the content root from a discovered path.
fn source_relative(source: &Path, content: &Path) -> Result<PathBuf> {
    source
        .strip_prefix(content)
        .map(Path::to_path_buf)
        .map_err(|_| anyhow!("File is not in content directory: {}", source.display()))
}

/// Relative path as a `/`-separated string.
pub fn to_url_path(rel: &Path) -> Result<String> {
    let parts = rel
        .components()
        .map(|c| match c {
            Component::Normal(s) => s
                .to_str()
                .ok_or_else(|| anyhow!("Invalid path encoding: {}", rel.display())),
            _ => Err(anyhow!("Unexpected path component in {}", rel.display())),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

/// Number of directories above a `/`-separated relative path.
pub fn depth(relative: &str) -> usize {
    relative.matches('/').count()
}

/// Replace word separators with spaces and collapse runs of whitespace.
pub fn humanize(stem: &str) -> String {
    stem.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> BuildConfig {
        BuildConfig {
            content: PathBuf::from("/site/content"),
            output: PathBuf::from("/site/public"),
            ..BuildConfig::default()
        }
    }

    #[test]
    fn test_page_paths() {
        let page = PageMeta::from_source("/site/content/guide.md".into(), &build()).unwrap();
        assert_eq!(page.dest, PathBuf::from("/site/public/guide.html"));
        assert_eq!(page.relative, "guide.html");
    }

    #[test]
    fn test_nested_page_paths() {
        let page =
            PageMeta::from_source("/site/content/essays/records.md".into(), &build()).unwrap();
        assert_eq!(page.dest, PathBuf::from("/site/public/essays/records.html"));
        assert_eq!(page.relative, "essays/records.html");
    }

    #[test]
    fn test_asset_paths() {
        let asset = AssetMeta::from_source("/site/content/img/logo.png".into(), &build()).unwrap();
        assert_eq!(asset.dest, PathBuf::from("/site/public/img/logo.png"));
        assert_eq!(asset.relative, "img/logo.png");
    }

    #[test]
    fn test_source_outside_content() {
        assert!(PageMeta::from_source("/elsewhere/guide.md".into(), &build()).is_err());
        assert!(AssetMeta::from_source("/elsewhere/logo.png".into(), &build()).is_err());
    }

    #[test]
    fn test_title() {
        let page = PageMeta::from_source("/site/content/guide.md".into(), &build()).unwrap();
        assert_eq!(page.title(), "guide");

        let page =
            PageMeta::from_source("/site/content/string_templates-v2.md".into(), &build()).unwrap();
        assert_eq!(page.title(), "string templates v2");
    }

    #[test]
    fn test_href_to() {
        let top = PageMeta::from_source("/site/content/guide.md".into(), &build()).unwrap();
        assert_eq!(top.href_to("style.css"), "style.css");

        let nested = PageMeta::from_source("/site/content/a/b/c.md".into(), &build()).unwrap();
        assert_eq!(nested.href_to("style.css"), "../../style.css");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("guide"), "guide");
        assert_eq!(humanize("pattern-matching"), "pattern matching");
        assert_eq!(humanize("__weird--name__"), "weird name");
        assert_eq!(humanize(""), "");
    }
}
