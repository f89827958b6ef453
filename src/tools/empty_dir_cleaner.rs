use anyhow::Result;
use log::{debug, warn};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// 由下而上刪除 `root` 底下的空資料夾，`root` 本身與 `keep` 子樹保留
pub fn remove_empty_directories(root: &Path, keep: Option<&Path>) -> Result<usize> {
    let keep = keep.map(|k| fs::canonicalize(k).unwrap_or_else(|_| k.to_path_buf()));
    let is_kept = |path: &Path| {
        keep.as_ref().is_some_and(|k| {
            path == k.as_path() || fs::canonicalize(path).is_ok_and(|p| p == *k)
        })
    };

    let mut removed = 0;

    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && is_kept(e.path())))
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_dir())
    {
        let is_empty = fs::read_dir(entry.path())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !is_empty {
            continue;
        }

        match fs::remove_dir(entry.path()) {
            Ok(()) => {
                debug!("Removed empty directory {}", entry.path().display());
                removed += 1;
            }
            Err(e) => warn!("Cannot remove {}: {e}", entry.path().display()),
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_removes_nested_empty_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("M31/DATE_2024-01-15/FILTER_Ha")).unwrap();
        fs::create_dir_all(root.join("M42/DATE_2024-02-01")).unwrap();
        fs::write(root.join("M42/DATE_2024-02-01/light.fits"), "x").unwrap();

        let removed = remove_empty_directories(root, None).unwrap();

        assert_eq!(removed, 3);
        assert!(!root.join("M31").exists());
        assert!(root.join("M42/DATE_2024-02-01/light.fits").exists());
        assert!(root.exists());
    }

    #[test]
    fn test_root_is_kept_when_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(remove_empty_directories(temp_dir.path(), None).unwrap(), 0);
        assert!(temp_dir.path().exists());
    }

    #[test]
    fn test_kept_subtree_survives() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("20_Data/empty")).unwrap();
        fs::create_dir_all(root.join("M31")).unwrap();

        let removed = remove_empty_directories(root, Some(root.join("20_Data").as_path())).unwrap();

        assert_eq!(removed, 1);
        assert!(root.join("20_Data/empty").exists());
    }
}
