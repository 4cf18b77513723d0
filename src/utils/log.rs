//! Terminal logging with colored module prefixes and progress bars.
//!
//! ```ignore
//! log!("convert"; "{}", page.relative);
//!
//! let progress = ProgressBars::new(&[("pages", 12), ("assets", 40)]);
//! progress.inc_by_name("pages");
//! progress.finish();
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{IsTerminal, Write, stdout},
    sync::{
        Mutex, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Progress bar width bounds, in cells.
const BAR_WIDTH: (usize, usize) = (10, 40);

/// Get terminal width, falling back to 120 columns.
fn terminal_width() -> usize {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120)) as usize
}

/// Display length of `"[module] "`.
#[inline]
const fn prefix_len(module: &str) -> usize {
    module.len() + 3
}

/// Log a message with a colored module prefix.
///
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::utils::log::log($module, &format!($($arg)*))
    }};
}

/// Write one prefixed line, truncated to the terminal width.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let max_len = terminal_width().saturating_sub(prefix_len(module));

    let mut out = stdout().lock();
    if out.is_terminal() {
        execute!(out, Clear(ClearType::UntilNewLine)).ok();
    }

    // Multi-line diagnostics (converter stderr) are kept whole.
    let message = if message.contains('\n') {
        message
    } else {
        truncate_str(message, max_len)
    };

    writeln!(out, "{prefix} {message}").ok();
    out.flush().ok();
}

/// Apply color to a module prefix based on module name.
fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "error" => prefix.bright_red().bold(),
        "build" | "index" | "archive" => prefix.bright_green().bold(),
        "clean" => prefix.bright_blue().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to at most `max_len` bytes on a char boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Progress Bars
// ============================================================================

/// Several progress bars redrawn in place, one terminal line each.
///
/// Drawing is skipped entirely when stdout is not a terminal, so the bars
/// never pollute piped output or test runs.
pub struct ProgressBars {
    bars: Vec<ProgressBar>,
    enabled: bool,
    lock: Mutex<()>,
}

struct ProgressBar {
    name: &'static str,
    prefix: ColoredString,
    total: usize,
    current: AtomicUsize,
    row: usize,
}

impl ProgressBars {
    /// Reserve one line per `(name, total)` pair.
    pub fn new(modules: &[(&'static str, usize)]) -> Self {
        let enabled = stdout().is_terminal();
        if enabled {
            let mut out = stdout().lock();
            for _ in modules {
                writeln!(out).ok();
            }
            out.flush().ok();
        }

        let bars = modules
            .iter()
            .enumerate()
            .map(|(row, (name, total))| ProgressBar {
                name: *name,
                prefix: colorize_prefix(name),
                total: *total,
                current: AtomicUsize::new(0),
                row,
            })
            .collect();

        Self {
            bars,
            enabled,
            lock: Mutex::new(()),
        }
    }

    /// Advance the bar called `name` by one.
    pub fn inc_by_name(&self, name: &str) {
        if let Some(bar) = self.bars.iter().find(|b| b.name == name) {
            let current = bar.current.fetch_add(1, Ordering::Relaxed) + 1;
            if self.enabled {
                self.draw(bar, current);
            }
        }
    }

    fn draw(&self, bar: &ProgressBar, current: usize) {
        let _guard = self.lock.lock().ok();

        let count = format!("{current}/{}", bar.total);
        let overhead = prefix_len(bar.name) + 3 + 1 + count.len();
        let width = terminal_width()
            .saturating_sub(overhead)
            .clamp(BAR_WIDTH.0, BAR_WIDTH.1);
        let filled = (current * width).checked_div(bar.total).unwrap_or(0).min(width);
        let line = "█".repeat(filled) + &"░".repeat(width - filled);

        let mut out = stdout().lock();
        let up = (self.bars.len() - bar.row) as u16;
        execute!(out, cursor::MoveUp(up), Clear(ClearType::CurrentLine)).ok();
        write!(out, "{} [{line}] {count}", bar.prefix).ok();
        execute!(out, cursor::MoveDown(up)).ok();
        write!(out, "\r").ok();
        out.flush().ok();
    }

    /// Erase the bars and put the cursor back where they started.
    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        let _guard = self.lock.lock().ok();

        let mut out = stdout().lock();
        let rows = self.bars.len() as u16;
        execute!(out, cursor::MoveUp(rows)).ok();
        for _ in &self.bars {
            execute!(out, Clear(ClearType::CurrentLine), cursor::MoveDown(1)).ok();
        }
        execute!(out, cursor::MoveUp(rows)).ok();
        out.flush().ok();
    }
}
