//! Artifacts derived from the whole build: the index page and the archive.

pub mod archive;
pub mod index;
