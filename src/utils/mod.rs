//! Shared helpers: file classification, external commands, terminal logging.

pub mod category;
pub mod exec;
pub mod log;
