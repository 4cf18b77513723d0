//! Site initialization.
//!
//! Lays out a new project:
//!
//! ```text
//! folio.toml
//! footer.html
//! content/
//!     style.css
//! ```

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Default config filename
const CONFIG_FILE: &str = "folio.toml";

const FOOTER: &str = r#"<footer>
<hr>
<p><a href="contents.html">Contents</a></p>
</footer>
"#;

const STYLESHEET: &str = r#"body {
  max-width: 42rem;
  margin: 2rem auto;
  padding: 0 1rem;
  font-family: system-ui, sans-serif;
  line-height: 1.6;
}

pre {
  overflow-x: auto;
  padding: 0.75rem;
  background: #f5f5f5;
}
"#;

/// Create a new site under the configured root.
///
/// Without a name the current directory must not hold any of the files
/// written here; nothing is ever overwritten.
pub fn new_site(config: &SiteConfig) -> Result<()> {
    let root = config.get_root();
    let defaults = SiteConfig::default();
    let content = root.join(&defaults.build.content);

    let files = [
        (root.join(CONFIG_FILE), toml::to_string_pretty(&defaults)?),
        (root.join(&defaults.build.footer), FOOTER.to_string()),
        (content.join("style.css"), STYLESHEET.to_string()),
    ];

    for (path, _) in &files {
        if path.exists() {
            bail!(
                "Path `{}` already exists. Try `folio init <NAME>` instead.",
                path.display()
            );
        }
    }

    fs::create_dir_all(&content)
        .with_context(|| format!("Failed to create {}", content.display()))?;
    for (path, body) in &files {
        fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    init_ignored_files(
        root,
        &[defaults.build.output.as_path(), defaults.build.archive.path.as_path()],
    )?;

    log!("init"; "{}", root.display());
    Ok(())
}

/// Write a `.gitignore` listing build products, unless one exists.
fn init_ignored_files(root: &Path, paths: &[&Path]) -> Result<()> {
    let path = root.join(".gitignore");
    if path.exists() {
        return Ok(());
    }

    let mut content = paths
        .iter()
        .filter_map(|p| p.to_str())
        .collect::<Vec<_>>()
        .join("\n");
    content.push('\n');

    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
}
