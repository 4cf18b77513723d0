//! Per-file work: discovery, sniffing, conversion and copying.

pub mod assets;
pub mod converter;
pub mod discover;
pub mod meta;
pub mod pages;
pub mod sniff;

use crate::error::BuildError;
use std::{ffi::OsString, fs, path::Path, time::SystemTime};
use walkdir::WalkDir;

/// What happened to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Output already newer than every dependency.
    Fresh,
    /// Output (re)written.
    Built,
}

/// Write `bytes` to `dest`, creating parent directories.
///
/// Goes through a sibling temp file and a rename, so readers never see a
/// half-written page and a failed write leaves the old one in place.
pub fn write_output(dest: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    let err = |e| BuildError::Write(dest.to_path_buf(), e);

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(err)?;
    }

    let mut tmp_name = OsString::from(".");
    tmp_name.push(dest.file_name().unwrap_or_default());
    tmp_name.push(".tmp");
    let tmp = dest.with_file_name(tmp_name);

    fs::write(&tmp, bytes).map_err(err)?;
    fs::rename(&tmp, dest).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        err(e)
    })
}

/// Modification time of a file, if it exists.
pub fn mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Check if destination is up-to-date compared to source and dependencies
pub fn is_up_to_date(src: &Path, dst: &Path, deps_mtime: Option<SystemTime>) -> bool {
    let Some(src_time) = mtime(src) else {
        return false;
    };
    let Some(dst_time) = mtime(dst) else {
        return false;
    };

    if src_time > dst_time {
        return false;
    }

    if let Some(deps) = deps_mtime
        && deps > dst_time
    {
        return false;
    }

    true
}

/// Newest modification time under `path`, recursing into directories.
pub fn latest_mtime(path: &Path) -> Option<SystemTime> {
    if path.is_file() {
        return mtime(path);
    }

    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .filter_map(|m| m.modified().ok())
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, fs::File, time::Duration};
    use tempfile::TempDir;

    fn set_mtime(path: &Path, secs: u64) {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn test_is_up_to_date() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.md");
        let dst = dir.path().join("a.html");
        fs::write(&src, "a").unwrap();

        assert!(!is_up_to_date(&src, &dst, None), "missing output is stale");

        fs::write(&dst, "a").unwrap();
        set_mtime(&src, 1_000);
        set_mtime(&dst, 2_000);
        assert!(is_up_to_date(&src, &dst, None));
        assert!(is_up_to_date(&src, &dst, Some(SystemTime::UNIX_EPOCH)));

        let newer_dep = SystemTime::UNIX_EPOCH + Duration::from_secs(3_000);
        assert!(!is_up_to_date(&src, &dst, Some(newer_dep)));

        set_mtime(&src, 2_500);
        assert!(!is_up_to_date(&src, &dst, None));
    }

    #[test]
    fn test_equal_mtime_is_fresh() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.md");
        let dst = dir.path().join("a.html");
        fs::write(&src, "a").unwrap();
        fs::write(&dst, "a").unwrap();
        set_mtime(&src, 1_000);
        set_mtime(&dst, 1_000);

        assert!(is_up_to_date(&src, &dst, None));
    }

    #[test]
    fn test_write_output_creates_parents_and_replaces() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("a/b/page.html");

        write_output(&dest, b"one").unwrap();
        write_output(&dest, b"two").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"two");
        let leftovers: Vec<_> = fs::read_dir(dest.parent().unwrap()).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "temp file must not linger");
    }

    #[test]
    fn test_latest_mtime() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("sub/b");
        fs::create_dir_all(b.parent().unwrap()).unwrap();
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        set_mtime(&a, 1_000);
        set_mtime(&b, 5_000);

        assert_eq!(
            latest_mtime(dir.path()),
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(5_000))
        );
        assert_eq!(
            latest_mtime(&a),
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000))
        );
        assert_eq!(latest_mtime(&dir.path().join("missing")), None);
    }
}
