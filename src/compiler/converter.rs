//! The external document converter.
//!
//! folio never interprets markup itself. A [`ConversionRequest`] describes
//! one invocation and a [`Converter`] turns it into page bytes. The default
//! [`CommandConverter`] runs Pandoc (or anything accepting Pandoc's flags)
//! and captures stdout.

use crate::utils::exec::{self, EMPTY_FILTER};
use anyhow::Result;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Everything the converter is told about one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Document to convert.
    pub source: PathBuf,
    /// Produce a complete page rather than a fragment. Always set.
    pub standalone: bool,
    /// Fragment appended after the body. Always set.
    pub footer: PathBuf,
    /// Stylesheet href, unless the document embeds its own style.
    pub stylesheet: Option<String>,
    /// Page title, unless the document declares its own.
    pub title: Option<String>,
    /// Arguments taken from the document's flags directive.
    pub extra_args: Vec<String>,
}

impl ConversionRequest {
    /// Pandoc command-line arguments for this request, source last.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(6 + self.extra_args.len());

        if self.standalone {
            args.push("--standalone".into());
        }

        let mut footer = OsString::from("--include-after-body=");
        footer.push(&self.footer);
        args.push(footer);

        if let Some(href) = &self.stylesheet {
            args.push(format!("--css={href}").into());
        }
        if let Some(title) = &self.title {
            args.push(format!("--metadata=pagetitle:{title}").into());
        }

        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(self.source.clone().into_os_string());
        args
    }
}

/// Renders one document into page bytes.
///
/// Implementations must not write the output file; the caller does, so a
/// failed conversion leaves the previous artifact untouched.
pub trait Converter: Sync {
    fn convert(&self, request: &ConversionRequest) -> Result<Vec<u8>>;
}

/// Converter backed by an external command.
pub struct CommandConverter {
    command: Vec<OsString>,
    root: PathBuf,
}

impl CommandConverter {
    /// `command` is the configured program plus leading arguments; the
    /// process runs in `root`.
    pub fn new(command: &[String], root: &Path) -> Self {
        Self {
            command: exec::to_cmd_vec(command),
            root: root.to_path_buf(),
        }
    }
}

impl Converter for CommandConverter {
    fn convert(&self, request: &ConversionRequest) -> Result<Vec<u8>> {
        let output = exec::exec(
            Some(&self.root),
            &self.command,
            &request.to_args(),
            &EMPTY_FILTER,
        )?;
        Ok(output.stdout)
    }
}
