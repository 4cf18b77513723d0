//! Content sniffing: derive per-document build options from raw text.
//!
//! This is plain line matching, not a markup parse. Three directives are
//! recognized anywhere in a document (first match wins):
//!
//! | Directive                          | Effect                          |
//! |------------------------------------|---------------------------------|
//! | `<style>` / `<style ...>`          | no stylesheet link is injected  |
//! | `% Title` on the first line        | no page title is injected       |
//! | `<title>...</title>`               | no page title is injected       |
//! | `<meta pandoc-flags="--toc -N">`   | extra converter arguments       |
//!
//! The result depends on the document bytes only.

use regex::Regex;
use std::sync::LazyLock;

static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<style(?:\s|>|$)").expect("valid style pattern"));

static TITLE_SHORTHAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^%\s*\S").expect("valid title block pattern"));

static TITLE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title(\s[^>]*)?>").expect("valid title pattern"));

static FLAGS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+pandoc-flags\s*=\s*"((?:[^"\\]|\\.)*)"\s*/?>"#)
        .expect("valid flags pattern")
});

/// Options derived from a document's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// The document carries its own `<style>` block.
    pub has_embedded_style: bool,
    /// The document declares its own title.
    pub has_embedded_title: bool,
    /// Unescaped argument of the first `pandoc-flags` directive.
    pub extra_flags: Option<String>,
}

impl BuildOptions {
    /// Scan `content` once, stopping as soon as every option is decided.
    pub fn sniff(content: &str) -> Self {
        let mut style = None;
        let mut title = None;
        let mut flags = None;

        for (i, line) in content.lines().enumerate() {
            if i == 0 && TITLE_SHORTHAND_RE.is_match(line.trim_start_matches('\u{feff}')) {
                title = Some(true);
            }
            if style.is_none() && STYLE_RE.is_match(line) {
                style = Some(true);
            }
            if title.is_none() && TITLE_TAG_RE.is_match(line) {
                title = Some(true);
            }
            if flags.is_none()
                && let Some(caps) = FLAGS_RE.captures(line)
            {
                flags = Some(unescape(&caps[1]));
            }

            if style.is_some() && title.is_some() && flags.is_some() {
                break;
            }
        }

        Self {
            has_embedded_style: style.unwrap_or(false),
            has_embedded_title: title.unwrap_or(false),
            extra_flags: flags,
        }
    }

    /// Sniff raw bytes; invalid UTF-8 is replaced, never rejected.
    pub fn sniff_bytes(bytes: &[u8]) -> Self {
        Self::sniff(&String::from_utf8_lossy(bytes))
    }

    /// Extra flags split into converter arguments.
    pub fn extra_args(&self) -> Vec<String> {
        self.extra_flags.as_deref().map(split_args).unwrap_or_default()
    }
}

/// Undo backslash escapes and the common HTML entities of an attribute value.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            _ => out.push(c),
        }
    }

    out.replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Split a flag string on whitespace; single and double quotes group words.
fn split_args(s: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in s.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        args.push(current);
    }
    args
}
