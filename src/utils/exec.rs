//! External command execution utilities.
//!
//! Runs a command with captured output, logs its warnings, and turns a
//! nonzero exit into an error that carries the command's own diagnostics.

use crate::log;
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::{
    borrow::Cow,
    ffi::OsString,
    path::Path,
    process::{Command, Output},
    sync::LazyLock,
};

// ============================================================================
// Argument Conversion
// ============================================================================

/// Convert a configured command (`["pandoc", "--from", "gfm"]`) to `OsString`s.
pub fn to_cmd_vec(cmd: &[String]) -> Vec<OsString> {
    cmd.iter().map(OsString::from).collect()
}

/// Filter out empty args.
pub fn filter_args(args: &[OsString]) -> Vec<OsString> {
    args.iter().filter(|a| !a.is_empty()).cloned().collect()
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute a command and capture its output.
///
/// `cmd[0]` is the program, `cmd[1..]` its leading arguments, followed by
/// `args` with empty entries dropped.
///
/// # Errors
/// Returns error if the command fails to start or exits with non-zero code.
pub fn exec(
    root: Option<&Path>,
    cmd: &[OsString],
    args: &[OsString],
    filter: &FilterRule,
) -> Result<Output> {
    let (name, mut command) = prepare(root, cmd, &filter_args(args))?;

    let output = command
        .output()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    log_output(&name, &output, filter)?;
    Ok(output)
}

/// Prepare a Command from components.
fn prepare(root: Option<&Path>, cmd: &[OsString], args: &[OsString]) -> Result<(String, Command)> {
    let Some((program, leading)) = cmd.split_first() else {
        bail!("Empty command");
    };
    let name = program.to_string_lossy().into_owned();

    let mut command = Command::new(program);
    command.args(leading).args(args);

    if let Some(dir) = root {
        command.current_dir(dir);
    }

    Ok((name, command))
}

// ============================================================================
// Output Filtering
// ============================================================================

static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI pattern"));

fn strip_ansi(s: &str) -> Cow<'_, str> {
    ANSI_RE.replace_all(s, "")
}

/// Filter rule for skipping known noise in command output.
pub struct FilterRule {
    /// Prefixes to match at the start of output lines.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log the lines of `output` that survive the filter as one message.
    fn log(&self, name: &str, output: &str) {
        let lines: Vec<&str> = output
            .lines()
            .filter(|line| !self.should_skip(strip_ansi(line).trim()))
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Stdout filter: skip rendered HTML.
const STDOUT_FILTER: FilterRule = FilterRule::new(&["<!DOCTYPE", "<html"]);

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Log command output, filtering known noise.
fn log_output(name: &str, output: &Output, filter: &FilterRule) -> Result<()> {
    if !output.status.success() {
        bail!(format_error(name, output));
    }

    // On success only stderr (warnings) is interesting
    let stderr = String::from_utf8_lossy(&output.stderr);
    filter.log(name, stderr.trim());

    Ok(())
}

/// Format a failed command's status and diagnostics verbatim.
fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("Command `{name}` failed with {}", output.status);

    let stderr = stderr.trim();
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(stderr);
    }

    let stdout = stdout.trim();
    if !stdout.is_empty() && !STDOUT_FILTER.should_skip(stdout) {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================
