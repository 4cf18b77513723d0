//! Build error types.
//!
//! `Discovery` aborts the whole build. Every other variant is scoped to one
//! target, logged when it happens, and folded into `Failed` at the end.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot read content tree `{0}`")]
    Discovery(PathBuf, #[source] walkdir::Error),

    #[error("`{0}` and a generated page both produce `{1}`")]
    Collision(PathBuf, String),

    #[error("cannot read document `{0}`")]
    Sniff(PathBuf, #[source] std::io::Error),

    #[error("converting `{0}` failed")]
    Convert(PathBuf, #[source] anyhow::Error),

    #[error("copying `{0}` failed")]
    Copy(PathBuf, #[source] std::io::Error),

    #[error("writing `{0}` failed")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("writing the index failed")]
    Index(#[source] anyhow::Error),

    #[error("packaging `{0}` failed")]
    Archive(PathBuf, #[source] anyhow::Error),

    #[error("{failed} of {total} targets failed")]
    Failed { failed: usize, total: usize },
}
