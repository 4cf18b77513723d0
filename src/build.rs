//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── discover()          ──► pages, assets (fatal on error)
//!     ├── BuildGraph::levels()
//!     │
//!     ├── level 0 (parallel)  ──► process_page() / process_asset()
//!     │       one failure fails one target, the rest keep going
//!     │
//!     ├── level 1             ──► build_index() over the pages that succeeded
//!     │
//!     └── build_archive()     ──► only when every target succeeded
//! ```

use crate::{
    compiler::{
        Outcome, assets::process_asset, converter::Converter, discover::discover,
        pages::process_page,
    },
    config::SiteConfig,
    error::BuildError,
    generator::{archive::build_archive, index::build_index},
    graph::{BuildGraph, NodeId, Target},
    log,
    utils::log::ProgressBars,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs,
    sync::{
        OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Counts of one build run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages written by the converter.
    pub converted: usize,
    pub copied: usize,
    /// Pages and assets skipped as up to date.
    pub fresh: usize,
    pub failed: usize,
    /// Targets in the graph (pages, assets, index).
    pub total: usize,
    /// Assets shadowed by a generated page.
    pub suppressed: usize,
    /// Content files that are neither documents nor assets.
    pub ignored: usize,
    pub index: Option<Outcome>,
    pub archive: Option<Outcome>,
}

/// Shared counters while levels run.
#[derive(Default)]
struct Tally {
    converted: AtomicUsize,
    copied: AtomicUsize,
    fresh: AtomicUsize,
    failed: AtomicUsize,
}

/// Build the site: convert documents, copy assets, write the index and
/// package the output tree.
///
/// Fails with [`BuildError::Failed`] after the whole graph has been
/// evaluated if any target failed.
pub fn build_site(config: &SiteConfig, converter: &dyn Converter, force: bool) -> Result<BuildReport> {
    let build = &config.build;
    let index_path = config.index_path();

    let sources = discover(build, index_path.as_deref())?;
    for asset in &sources.suppressed {
        log!("build"; "{} is generated, skipping copy of {}", asset.relative, asset.source.display());
    }

    let shared = [build.footer.as_path(), config.config_path.as_path()];
    let graph = BuildGraph::new(&sources, &shared, index_path.as_deref());
    let levels = graph.levels()?;
    if sources.pages.is_empty() && sources.assets.is_empty() {
        log!("build"; "nothing to build under {}", build.content.display());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(build.jobs)
        .build()
        .context("Failed to start worker pool")?;

    let done: Vec<OnceLock<Outcome>> = (0..graph.len()).map(|_| OnceLock::new()).collect();
    let tally = Tally::default();
    let worker = Worker {
        config,
        converter,
        graph: &graph,
        done: &done,
        tally: &tally,
        force,
    };

    let progress = ProgressBars::new(&[("pages", sources.pages.len()), ("assets", sources.assets.len())]);
    for level in &levels {
        pool.install(|| level.par_iter().for_each(|&id| worker.run(id, &progress)));
    }
    progress.finish();

    let failed = tally.failed.load(Ordering::Relaxed);
    let mut report = BuildReport {
        converted: tally.converted.load(Ordering::Relaxed),
        copied: tally.copied.load(Ordering::Relaxed),
        fresh: tally.fresh.load(Ordering::Relaxed),
        failed,
        total: graph.len(),
        suppressed: sources.suppressed.len(),
        ignored: sources.ignored,
        index: graph_index(&graph).and_then(|id| done[id].get().copied()),
        archive: None,
    };

    log!(
        "build";
        "{} converted, {} copied, {} up to date, {} failed",
        report.converted, report.copied, report.fresh, report.failed
    );

    if failed > 0 {
        return Err(BuildError::Failed {
            failed,
            total: report.total,
        }
        .into());
    }

    if build.archive.enable {
        let path = &build.archive.path;
        let outcome = build_archive(config, force)
            .map_err(|e| BuildError::Archive(path.clone(), e))?;
        if outcome == Outcome::Built {
            log!("archive"; "{}", path.display());
        }
        report.archive = Some(outcome);
    }

    Ok(report)
}

fn graph_index(graph: &BuildGraph) -> Option<NodeId> {
    (0..graph.len()).find(|&id| graph.node(id).target == Target::Index)
}

/// Everything a worker needs to evaluate one node.
struct Worker<'a> {
    config: &'a SiteConfig,
    converter: &'a dyn Converter,
    graph: &'a BuildGraph,
    done: &'a [OnceLock<Outcome>],
    tally: &'a Tally,
    force: bool,
}

impl Worker<'_> {
    fn run(&self, id: NodeId, progress: &ProgressBars) {
        let node = self.graph.node(id);
        let build = &self.config.build;
        let verbose = self.config.verbose;

        let result: Result<Outcome> = match &node.target {
            Target::Page(page) => {
                let result = process_page(
                    page,
                    build,
                    self.converter,
                    self.graph.shared_mtime(id),
                    self.force,
                );
                progress.inc_by_name("pages");
                if verbose && matches!(result, Ok(Outcome::Built)) {
                    log!("convert"; "{}", page.relative);
                }
                result.map_err(Into::into)
            }
            Target::Asset(asset) => {
                let result = process_asset(asset, self.force);
                progress.inc_by_name("assets");
                if verbose && matches!(result, Ok(Outcome::Built)) {
                    log!("copy"; "{}", asset.relative);
                }
                result.map_err(Into::into)
            }
            Target::Index => self.run_index(id),
        };

        match result {
            Ok(outcome) => {
                let counter = match (&node.target, outcome) {
                    (Target::Index, _) => None,
                    (_, Outcome::Fresh) => Some(&self.tally.fresh),
                    (Target::Page(_), Outcome::Built) => Some(&self.tally.converted),
                    (Target::Asset(_), Outcome::Built) => Some(&self.tally.copied),
                };
                if let Some(counter) = counter {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                let _ = self.done[id].set(outcome);
            }
            Err(e) => {
                self.tally.failed.fetch_add(1, Ordering::Relaxed);
                log!("error"; "{:#}", e);
            }
        }
    }

    /// Index over every page that finished, fresh or rebuilt.
    fn run_index(&self, id: NodeId) -> Result<Outcome> {
        let node = self.graph.node(id);
        let pages: Vec<String> = node
            .deps
            .iter()
            .filter(|&&dep| self.done[dep].get().is_some())
            .filter_map(|&dep| match &self.graph.node(dep).target {
                Target::Page(page) => Some(page.relative.clone()),
                _ => None,
            })
            .collect();

        let stale = self.force || !self.graph.is_fresh(id);
        let outcome = build_index(self.config, &node.output, &pages, stale).map_err(BuildError::Index)?;
        if outcome == Outcome::Built {
            log!("index"; "{} pages", pages.len());
        }
        Ok(outcome)
    }
}

/// Remove the output tree and the archive.
pub fn clean_site(config: &SiteConfig) -> Result<()> {
    let output = &config.build.output;
    let archive = &config.build.archive.path;

    if output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to remove {}", output.display()))?;
        log!("clean"; "{}", output.display());
    }
    if archive.exists() {
        fs::remove_file(archive)
            .with_context(|| format!("Failed to remove {}", archive.display()))?;
        log!("clean"; "{}", archive.display());
    }
    Ok(())
}
