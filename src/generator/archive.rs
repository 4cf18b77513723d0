//! Output tree packaging.
//!
//! ```text
//! public/**  ──► tar (sorted, mtime 0, mode 0644) ──► zstd ──► site.tar.zst
//! ```
//!
//! Headers carry no timestamps or ownership, so two identical output trees
//! always produce the same archive bytes.

use crate::{
    compiler::{Outcome, latest_mtime, meta::to_url_path, mtime, write_output},
    config::SiteConfig,
};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Package the output tree unless the archive is already newer than it.
pub fn build_archive(config: &SiteConfig, force: bool) -> Result<Outcome> {
    let output = &config.build.output;
    let archive = &config.build.archive.path;

    if !force && is_current(output, archive) {
        return Ok(Outcome::Fresh);
    }

    let bytes = pack(output, config.build.archive.level)?;
    write_output(archive, &bytes)?;
    Ok(Outcome::Built)
}

/// Archive exists and no output file is newer.
fn is_current(output: &Path, archive: &Path) -> bool {
    match (mtime(archive), latest_mtime(output)) {
        (Some(archive), Some(newest)) => newest <= archive,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Tar and compress every file under `root`.
pub fn pack(root: &Path, level: i32) -> Result<Vec<u8>> {
    let mut files = collect_files(root)?;
    files.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let encoder = zstd::Encoder::new(Vec::new(), level).context("Failed to start zstd stream")?;
    let mut builder = tar::Builder::new(encoder);
    builder.mode(tar::HeaderMode::Deterministic);

    for (relative, path) in &files {
        let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();

        builder
            .append_data(&mut header, relative, data.as_slice())
            .with_context(|| format!("Failed to add {relative} to archive"))?;
    }

    let encoder = builder.into_inner().context("Failed to finish tar stream")?;
    encoder.finish().context("Failed to finish zstd stream")
}

/// `(relative, absolute)` for every regular file under `root`.
fn collect_files(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(root)?;
        files.push((to_url_path(rel)?, entry.into_path()));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        fs::File,
        io::Read,
        time::{Duration, SystemTime},
    };
    use tempfile::TempDir;

    fn tree(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (rel, body) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        dir
    }

    fn unpack(bytes: &[u8]) -> Vec<(String, u64, u32, String)> {
        let decoder = zstd::Decoder::new(bytes).unwrap();
        let mut archive = tar::Archive::new(decoder);
        archive
            .entries()
            .unwrap()
            .map(|e| {
                let mut e = e.unwrap();
                let path = e.path().unwrap().to_string_lossy().into_owned();
                let mtime = e.header().mtime().unwrap();
                let mode = e.header().mode().unwrap();
                let mut body = String::new();
                e.read_to_string(&mut body).unwrap();
                (path, mtime, mode, body)
            })
            .collect()
    }

    #[test]
    fn test_pack_sorted_and_normalized() {
        let dir = tree(&[("z.html", "z"), ("a/b.html", "b"), ("logo.png", "png")]);
        let entries = unpack(&pack(dir.path(), 3).unwrap());

        let names: Vec<&str> = entries.iter().map(|e| e.0.as_str()).collect();
        assert_eq!(names, vec!["a/b.html", "logo.png", "z.html"]);
        assert!(entries.iter().all(|e| e.1 == 0 && e.2 == 0o644));
        assert_eq!(entries[0].3, "b");
    }

    #[test]
    fn test_pack_ignores_timestamps() {
        let dir = tree(&[("a.html", "a"), ("b.html", "b")]);
        let first = pack(dir.path(), 3).unwrap();

        let later = SystemTime::now() + Duration::from_secs(3600);
        File::options()
            .write(true)
            .open(dir.path().join("a.html"))
            .unwrap()
            .set_modified(later)
            .unwrap();

        assert_eq!(first, pack(dir.path(), 3).unwrap());
    }

    #[test]
    fn test_empty_tree() {
        let dir = TempDir::new().unwrap();
        assert!(unpack(&pack(dir.path(), 3).unwrap()).is_empty());
    }

    #[test]
    fn test_build_archive_skips_when_current() {
        let site = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.resolve_paths(site.path(), Path::new("folio.toml"));
        fs::create_dir_all(&config.build.output).unwrap();
        fs::write(config.build.output.join("guide.html"), "guide").unwrap();

        assert_eq!(build_archive(&config, false).unwrap(), Outcome::Built);
        assert!(config.build.archive.path.exists());
        assert_eq!(build_archive(&config, false).unwrap(), Outcome::Fresh);
        assert_eq!(build_archive(&config, true).unwrap(), Outcome::Built);
    }
}
