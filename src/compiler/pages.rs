//! Document conversion.
//!
//! ```text
//! process_page()
//!     │
//!     ├── is_up_to_date()?  ──► Fresh
//!     ├── read + BuildOptions::sniff()
//!     ├── conversion_request() ──► Converter::convert()
//!     └── minify (optional) ──► write_output() ──► Built
//! ```

use super::{
    Outcome,
    converter::{ConversionRequest, Converter},
    is_up_to_date,
    meta::PageMeta,
    sniff::BuildOptions,
    write_output,
};
use crate::{config::BuildConfig, error::BuildError};
use std::{fs, time::SystemTime};

/// Assemble the converter invocation for a sniffed document.
pub fn conversion_request(
    page: &PageMeta,
    options: &BuildOptions,
    build: &BuildConfig,
) -> ConversionRequest {
    let stylesheet = match &build.stylesheet {
        Some(href) if !options.has_embedded_style => Some(page.href_to(href)),
        _ => None,
    };
    let title = (!options.has_embedded_title).then(|| page.title());

    ConversionRequest {
        source: page.source.clone(),
        standalone: true,
        footer: build.footer.clone(),
        stylesheet,
        title,
        extra_args: options.extra_args(),
    }
}

/// Convert one document unless its page is fresh.
///
/// `deps_mtime` is the newest shared dependency (footer, config file).
pub fn process_page(
    page: &PageMeta,
    build: &BuildConfig,
    converter: &dyn Converter,
    deps_mtime: Option<SystemTime>,
    force: bool,
) -> Result<Outcome, BuildError> {
    if !force && is_up_to_date(&page.source, &page.dest, deps_mtime) {
        return Ok(Outcome::Fresh);
    }

    let content =
        fs::read(&page.source).map_err(|e| BuildError::Sniff(page.source.clone(), e))?;
    let options = BuildOptions::sniff_bytes(&content);
    let request = conversion_request(page, &options, build);

    let html = converter
        .convert(&request)
        .map_err(|e| BuildError::Convert(page.source.clone(), e))?;

    let html = if build.minify {
        minify_html::minify(&html, &minify_html::Cfg::new())
    } else {
        html
    };

    write_output(&page.dest, &html)?;
    Ok(Outcome::Built)
}
