//! In-process dependency graph.
//!
//! ```text
//!   source.md ─┐
//!   footer    ─┼─► page ──┐
//!   folio.toml─┘          ├─► index
//!   source.md ──► page ───┘
//!   logo.png  ──► asset
//! ```
//!
//! Nodes are build targets, edges point from a target to what it depends on:
//! files on disk and other targets. [`BuildGraph::levels`] layers the nodes so
//! every level only depends on earlier ones; each level runs in parallel and
//! joins before the next.

use crate::compiler::{
    discover::Sources,
    meta::{AssetMeta, PageMeta},
    mtime,
};
use anyhow::{Result, bail};
use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

pub type NodeId = usize;

/// What a node produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Page(PageMeta),
    Asset(AssetMeta),
    Index,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub target: Target,
    /// Artifact this node writes.
    pub output: PathBuf,
    /// Files read by this node.
    pub files: Vec<PathBuf>,
    /// Nodes whose artifacts this node reads.
    pub deps: Vec<NodeId>,
}

impl Node {
    /// Short label for logs.
    pub fn label(&self) -> &str {
        match &self.target {
            Target::Page(page) => &page.relative,
            Target::Asset(asset) => &asset.relative,
            Target::Index => "index",
        }
    }
}

#[derive(Debug, Default)]
pub struct BuildGraph {
    nodes: Vec<Node>,
}

impl BuildGraph {
    /// Graph for one build.
    ///
    /// Every page depends on its source plus `shared` (footer, config file).
    /// The index, if any, depends on every page.
    pub fn new(sources: &Sources, shared: &[&Path], index: Option<&Path>) -> Self {
        let mut graph = Self::default();

        let pages: Vec<NodeId> = sources
            .pages
            .iter()
            .map(|page| {
                let mut files = vec![page.source.clone()];
                files.extend(shared.iter().map(|p| p.to_path_buf()));
                graph.add(Target::Page(page.clone()), page.dest.clone(), files, vec![])
            })
            .collect();

        for asset in &sources.assets {
            graph.add(
                Target::Asset(asset.clone()),
                asset.dest.clone(),
                vec![asset.source.clone()],
                vec![],
            );
        }

        if let Some(index) = index {
            graph.add(Target::Index, index.to_path_buf(), vec![], pages);
        }

        graph
    }

    pub fn add(
        &mut self,
        target: Target,
        output: PathBuf,
        files: Vec<PathBuf>,
        deps: Vec<NodeId>,
    ) -> NodeId {
        self.nodes.push(Node {
            target,
            output,
            files,
            deps,
        });
        self.nodes.len() - 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Kahn layering: level `n` holds nodes whose deps all sit below `n`.
    ///
    /// Ids within a level keep insertion order.
    pub fn levels(&self) -> Result<Vec<Vec<NodeId>>> {
        let mut indegree: Vec<usize> = self.nodes.iter().map(|n| n.deps.len()).collect();
        let mut dependents: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            for &dep in &node.deps {
                if dep >= self.nodes.len() {
                    bail!("`{}` depends on unknown node {dep}", node.label());
                }
                dependents[dep].push(id);
            }
        }

        let mut levels = Vec::new();
        let mut current: Vec<NodeId> = (0..self.nodes.len()).filter(|&i| indegree[i] == 0).collect();
        let mut placed = 0;

        while !current.is_empty() {
            placed += current.len();
            let mut next = Vec::new();
            for &id in &current {
                for &dependent in &dependents[id] {
                    indegree[dependent] -= 1;
                    if indegree[dependent] == 0 {
                        next.push(dependent);
                    }
                }
            }
            next.sort_unstable();
            levels.push(current);
            current = next;
        }

        if placed != self.nodes.len() {
            bail!("dependency cycle among {} targets", self.nodes.len() - placed);
        }
        Ok(levels)
    }

    /// Newest modification time among the node's inputs.
    ///
    /// A missing input file counts as "now", so the node is rebuilt and the
    /// failure surfaces from the node itself. Dependency nodes without an
    /// artifact are skipped: a failed page is not listed by the index anyway.
    pub fn inputs_mtime(&self, id: NodeId) -> Option<SystemTime> {
        let node = &self.nodes[id];
        let files = node
            .files
            .iter()
            .map(|f| Some(mtime(f).unwrap_or_else(SystemTime::now)));
        let deps = node.deps.iter().map(|&d| mtime(&self.nodes[d].output));
        files.chain(deps).flatten().max()
    }

    /// Newest shared input of a page, excluding its own source.
    pub fn shared_mtime(&self, id: NodeId) -> Option<SystemTime> {
        self.nodes[id]
            .files
            .iter()
            .skip(1)
            .filter_map(|f| mtime(f))
            .max()
    }

    /// Output exists and is not older than any input.
    pub fn is_fresh(&self, id: NodeId) -> bool {
        let Some(output) = mtime(&self.nodes[id].output) else {
            return false;
        };
        self.inputs_mtime(id).is_none_or(|input| input <= output)
    }
}
