use crate::error::MoveLightsError;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn validate_source_dir(path: &Path) -> Result<(), MoveLightsError> {
    if !path.is_dir() {
        return Err(MoveLightsError::SourceNotFound(path.to_path_buf()));
    }
    fs::read_dir(path).map_err(|_| MoveLightsError::SourceNotFound(path.to_path_buf()))?;
    Ok(())
}

/// 確認目的根目錄可用；dry-run 時不建立任何資料夾
pub fn prepare_dest_dir(path: &Path, dry_run: bool) -> Result<(), MoveLightsError> {
    let unwritable = |reason: String| MoveLightsError::DestUnwritable {
        path: path.to_path_buf(),
        reason,
    };

    if path.exists() {
        if !path.is_dir() {
            return Err(unwritable("not a directory".to_string()));
        }
        let metadata = fs::metadata(path).map_err(|e| unwritable(e.to_string()))?;
        if metadata.permissions().readonly() {
            return Err(unwritable("directory is read-only".to_string()));
        }
        return Ok(());
    }

    if dry_run {
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| unwritable(e.to_string()))
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("cannot create directory {}", path.display()))?;
    }
    Ok(())
}
