use super::{Outcome, is_up_to_date, meta::AssetMeta};
use crate::error::BuildError;
use std::fs;

/// Copy one asset into the output tree unless the copy is already current.
///
/// Assets depend on nothing but themselves.
pub fn process_asset(asset: &AssetMeta, force: bool) -> Result<Outcome, BuildError> {
    if !force && is_up_to_date(&asset.source, &asset.dest, None) {
        return Ok(Outcome::Fresh);
    }

    let err = |e| BuildError::Copy(asset.source.clone(), e);

    if let Some(parent) = asset.dest.parent() {
        fs::create_dir_all(parent).map_err(err)?;
    }

    fs::copy(&asset.source, &asset.dest).map_err(err)?;
    Ok(Outcome::Built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn asset(dir: &TempDir, rel: &str) -> AssetMeta {
        let source = dir.path().join("content").join(rel);
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, [0x89, b'P', b'N', b'G']).unwrap();
        AssetMeta {
            dest: dir.path().join("public").join(rel),
            relative: rel.to_string(),
            source,
        }
    }

    #[test]
    fn test_copies_byte_identical() {
        let dir = TempDir::new().unwrap();
        let asset = asset(&dir, "img/logo.png");

        assert_eq!(process_asset(&asset, false).unwrap(), Outcome::Built);
        assert_eq!(fs::read(&asset.dest).unwrap(), fs::read(&asset.source).unwrap());
    }

    #[test]
    fn test_second_pass_is_fresh() {
        let dir = TempDir::new().unwrap();
        let asset = asset(&dir, "logo.png");

        process_asset(&asset, false).unwrap();
        assert_eq!(process_asset(&asset, false).unwrap(), Outcome::Fresh);
        assert_eq!(process_asset(&asset, true).unwrap(), Outcome::Built);
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let mut asset = asset(&dir, "logo.png");
        asset.source = PathBuf::from("/nonexistent/logo.png");

        let err = process_asset(&asset, false).unwrap_err();
        assert!(matches!(err, BuildError::Copy(..)));
    }
}
