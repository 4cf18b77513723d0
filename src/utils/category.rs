//! File classification by extension.
//!
//! | Category   | Handling               | Example Files                 |
//! |------------|------------------------|-------------------------------|
//! | Document   | Converted to a page    | `content/*.md`                |
//! | Asset      | Copied verbatim        | `*.png`, `*.svg`, `*.html`    |
//! | Ignored    | Left out of the build  | `Makefile`, `.DS_Store`       |
//!
//! The decision looks at the extension only: never the content, never the
//! directory depth.

use crate::config::BuildConfig;
use std::path::Path;

/// Role of a file under the content root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    /// Convertible source
    Document,
    /// Passthrough payload
    Asset,
    /// Neither; silently skipped
    Ignored,
}

/// Classify a path. The document extension takes precedence when it is also
/// listed as an asset extension.
pub fn categorize_path(path: &Path, build: &BuildConfig) -> FileCategory {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FileCategory::Ignored;
    };

    if ext == build.documents.extension {
        FileCategory::Document
    } else if build.assets.extensions.iter().any(|e| e == ext) {
        FileCategory::Asset
    } else {
        FileCategory::Ignored
    }
}
