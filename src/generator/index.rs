//! Index page generation.
//!
//! Lists every generated page in one standalone HTML document:
//!
//! ```html
//! <h1>Contents</h1>
//! <ul>
//! <li><a href="essays/guide.html">essays/guide.html</a></li>
//! </ul>
//! ```
//!
//! The page is rewritten only when it is missing, older than one of the
//! pages it lists, or when its rendered bytes changed (a document was added
//! or removed). The timestamp half is decided by [`crate::graph`].

use crate::{
    compiler::{Outcome, meta::depth, write_output},
    config::SiteConfig,
};
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Rendered index page.
struct IndexPage<'a> {
    title: &'a str,
    /// `../` prefix from the index location to the output root
    up: String,
    stylesheet: Option<&'a str>,
    entries: Vec<&'a str>,
    footer: String,
}

impl<'a> IndexPage<'a> {
    /// Collect entries: sorted, deduplicated, index and reserved names removed.
    fn new(config: &'a SiteConfig, pages: &'a [String], footer: String) -> Self {
        let index = &config.build.index;
        let own = index.path.to_string_lossy();

        let mut entries: Vec<&str> = pages
            .iter()
            .map(String::as_str)
            .filter(|rel| *rel != own)
            .filter(|rel| !index.exclude.iter().any(|name| name.as_str() == *rel))
            .collect();
        entries.sort_unstable();
        entries.dedup();

        Self {
            title: &index.title,
            up: "../".repeat(depth(&own)),
            stylesheet: config.build.stylesheet.as_deref(),
            entries,
            footer,
        }
    }

    fn into_html(self) -> String {
        let mut html = String::with_capacity(512 + self.entries.len() * 64);
        let title = escape_html(self.title);

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        );
        html.push_str(&format!("<title>{title}</title>\n"));
        if let Some(href) = self.stylesheet {
            html.push_str(&format!(
                "<link rel=\"stylesheet\" href=\"{}{}\">\n",
                self.up,
                escape_html(href)
            ));
        }
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("<h1>{title}</h1>\n<ul>\n"));

        for rel in self.entries {
            html.push_str(&format!(
                "<li><a href=\"{}{}\">{}</a></li>\n",
                self.up,
                encode_href(rel),
                escape_html(rel)
            ));
        }

        html.push_str("</ul>\n");
        html.push_str(&self.footer);
        if !self.footer.ends_with('\n') {
            html.push('\n');
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Render the index for the given output-relative page paths.
///
/// Input order does not matter; the result is byte-identical for equal sets.
pub fn render_index(config: &SiteConfig, pages: &[String]) -> Result<Vec<u8>> {
    let footer_path = &config.build.footer;
    let footer = fs::read_to_string(footer_path)
        .with_context(|| format!("Failed to read footer {}", footer_path.display()))?;

    let html = IndexPage::new(config, pages, footer).into_html();

    Ok(if config.build.minify {
        minify_html::minify(html.as_bytes(), &minify_html::Cfg::new())
    } else {
        html.into_bytes()
    })
}

/// Write the index at `index` unless it is current.
///
/// `stale` is the timestamp verdict from the build graph. A timestamp-fresh
/// index is still rewritten when its rendered bytes differ from the file on
/// disk, which is how added and removed documents show up.
pub fn build_index(config: &SiteConfig, index: &Path, pages: &[String], stale: bool) -> Result<Outcome> {
    let rendered = render_index(config, pages)?;

    if !stale && matches_on_disk(index, &rendered) {
        return Ok(Outcome::Fresh);
    }

    write_output(index, &rendered)?;
    Ok(Outcome::Built)
}

fn matches_on_disk(index: &Path, rendered: &[u8]) -> bool {
    fs::read(index).is_ok_and(|existing| blake3::hash(&existing) == blake3::hash(rendered))
}

/// Percent-encode each path segment, keeping `/` separators.
fn encode_href(relative: &str) -> String {
    relative
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Escape special HTML characters.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site() -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("footer.html"), "<footer>bye</footer>\n").unwrap();
        let mut config = SiteConfig::default();
        config.resolve_paths(dir.path(), Path::new("folio.toml"));
        (dir, config)
    }

    fn render(config: &SiteConfig, pages: &[&str]) -> String {
        let pages: Vec<String> = pages.iter().map(|s| s.to_string()).collect();
        String::from_utf8(render_index(config, &pages).unwrap()).unwrap()
    }

    #[test]
    fn test_render_structure() {
        let (_dir, config) = site();
        let html = render(&config, &["guide.html"]);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Contents</title>"));
        assert!(html.contains("<h1>Contents</h1>"));
        assert!(html.contains("<link rel=\"stylesheet\" href=\"style.css\">"));
        assert!(html.contains("<li><a href=\"guide.html\">guide.html</a></li>"));
        assert!(html.contains("<footer>bye</footer>"));
    }

    #[test]
    fn test_order_independent() {
        let (_dir, config) = site();
        let a = render(&config, &["b.html", "a/z.html", "c.html"]);
        let b = render(&config, &["c.html", "b.html", "a/z.html"]);
        assert_eq!(a, b);

        let first = a.find("a/z.html").unwrap();
        let second = a.find("b.html").unwrap();
        let third = a.find("c.html").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_exclusions() {
        let (_dir, config) = site();
        let html = render(&config, &["index.html", "contents.html", "guide.html", "sub/index.html"]);

        assert!(!html.contains("href=\"index.html\""));
        assert!(!html.contains("href=\"contents.html\""));
        assert!(html.contains("href=\"sub/index.html\""));
        assert_eq!(html.matches("<li>").count(), 2);
    }

    #[test]
    fn test_escaping_and_encoding() {
        let (_dir, config) = site();
        let html = render(&config, &["my notes/a&b.html"]);
        assert!(html.contains("href=\"my%20notes/a%26b.html\""));
        assert!(html.contains(">my notes/a&amp;b.html</a>"));
    }

    #[test]
    fn test_nested_index_location() {
        let (_dir, mut config) = site();
        config.build.index.path = "nav/contents.html".into();
        let html = render(&config, &["guide.html"]);

        assert!(html.contains("href=\"../style.css\""));
        assert!(html.contains("href=\"../guide.html\""));
    }

    #[test]
    fn test_empty_site() {
        let (_dir, config) = site();
        let html = render(&config, &[]);
        assert!(html.contains("<ul>\n</ul>"));
    }

    #[test]
    fn test_missing_footer() {
        let (dir, config) = site();
        fs::remove_file(dir.path().join("footer.html")).unwrap();
        assert!(render_index(&config, &[]).is_err());
    }

    #[test]
    fn test_build_index_rewrites_on_content_change() {
        let (_dir, config) = site();
        let index = config.index_path().unwrap();
        let pages = vec!["guide.html".to_string()];

        assert_eq!(build_index(&config, &index, &pages, false).unwrap(), Outcome::Built);
        assert_eq!(build_index(&config, &index, &pages, false).unwrap(), Outcome::Fresh);

        // removed document: timestamps say fresh, bytes differ
        assert_eq!(build_index(&config, &index, &[], false).unwrap(), Outcome::Built);
        assert!(!fs::read_to_string(&index).unwrap().contains("guide.html"));

        assert_eq!(build_index(&config, &index, &[], true).unwrap(), Outcome::Built);
    }
}
