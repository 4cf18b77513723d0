//! File discovery and routing.
//!
//! Walks the content tree, classifies every file by extension, and maps
//! documents and assets to their output paths. When an asset would land on
//! a generated path (a converted page or the index), the generated artifact
//! wins and the asset is dropped, or discovery fails when
//! `[build.assets] prefer_generated = false`. A document whose page would
//! land on the index path always fails discovery.

use super::meta::{AssetMeta, PageMeta};
use crate::{
    config::BuildConfig,
    error::BuildError,
    utils::category::{FileCategory, categorize_path},
};
use anyhow::Result;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// A classified file under the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub category: FileCategory,
}

/// Routed sources of one build.
#[derive(Debug, Default)]
pub struct Sources {
    /// Documents, sorted by path.
    pub pages: Vec<PageMeta>,
    /// Assets to copy, sorted by path.
    pub assets: Vec<AssetMeta>,
    /// Assets shadowed by a generated output.
    pub suppressed: Vec<AssetMeta>,
    /// Files that matched no category.
    pub ignored: usize,
}

/// Collect and classify every file under `build.content`, in file-name order.
///
/// The output tree is skipped when it lives inside the content tree.
/// Symlinks are followed and classified by the file they point to.
pub fn collect_sources(build: &BuildConfig) -> Result<Vec<SourceFile>, BuildError> {
    let output = build.output.as_path();

    WalkDir::new(&build.content)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.path() != output)
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() => Some(Ok(SourceFile {
                category: categorize_path(e.path(), build),
                path: e.into_path(),
            })),
            Ok(_) => None,
            Err(err) => Some(Err(BuildError::Discovery(build.content.clone(), err))),
        })
        .collect()
}

/// Discover and route all sources. `index` is the absolute index path, if
/// an index is generated.
pub fn discover(build: &BuildConfig, index: Option<&Path>) -> Result<Sources> {
    let files = collect_sources(build)?;
    route(files, build, index)
}

/// Turn classified files into page and asset targets.
pub fn route(files: Vec<SourceFile>, build: &BuildConfig, index: Option<&Path>) -> Result<Sources> {
    let mut sources = Sources::default();
    let mut asset_files = Vec::new();

    for file in files {
        match file.category {
            FileCategory::Document => sources.pages.push(PageMeta::from_source(file.path, build)?),
            FileCategory::Asset => asset_files.push(file.path),
            FileCategory::Ignored => sources.ignored += 1,
        }
    }

    if let Some(index) = index
        && let Some(page) = sources.pages.iter().find(|p| p.dest == index)
    {
        return Err(BuildError::Collision(page.source.clone(), page.relative.clone()).into());
    }

    let generated: HashSet<&Path> = sources
        .pages
        .iter()
        .map(|p| p.dest.as_path())
        .chain(index)
        .collect();

    for path in asset_files {
        let asset = AssetMeta::from_source(path, build)?;
        if !generated.contains(asset.dest.as_path()) {
            sources.assets.push(asset);
        } else if build.assets.prefer_generated {
            sources.suppressed.push(asset);
        } else {
            return Err(BuildError::Collision(asset.source, asset.relative).into());
        }
    }

    Ok(sources)
}
