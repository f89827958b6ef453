//! 目錄走訪器
//!
//! 找出來源根目錄下含有影格檔的資料夾，逐一讀成 `DirectoryGroup`

use crate::error::MoveLightsError;
use crate::frame::{DirectoryGroup, FrameExtractor};
use crate::tools::validate_source_dir;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct DirectoryWalker {
    source_root: PathBuf,
    extractor: FrameExtractor,
    /// 不走訪的資料夾（目的根目錄位於來源底下時）
    excluded: Option<PathBuf>,
}

impl DirectoryWalker {
    pub fn new(
        source_root: impl Into<PathBuf>,
        extractor: FrameExtractor,
    ) -> Result<Self, MoveLightsError> {
        let source_root = source_root.into();
        validate_source_dir(&source_root)?;

        Ok(Self {
            source_root,
            extractor,
            excluded: None,
        })
    }

    #[must_use]
    pub fn with_excluded(mut self, directory: &Path) -> Self {
        self.excluded =
            Some(fs::canonicalize(directory).unwrap_or_else(|_| directory.to_path_buf()));
        self
    }

    /// 含有至少一個影格檔的資料夾，依路徑排序
    #[must_use]
    pub fn candidate_directories(&self) -> Vec<PathBuf> {
        let directories: BTreeSet<PathBuf> = WalkDir::new(&self.source_root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !(e.file_type().is_dir() && self.is_excluded(e.path())))
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file() && self.extractor.is_frame_file(e.path()))
            .filter_map(|e| e.path().parent().map(Path::to_path_buf))
            .collect();

        info!(
            "Found {} directories with frame files under {}",
            directories.len(),
            self.source_root.display()
        );
        directories.into_iter().collect()
    }

    /// 延遲讀取：每次取下一個群組時才解析該資料夾的檔頭。
    /// 重新呼叫會重新走訪目錄樹。
    #[must_use]
    pub fn groups(&self) -> DirectoryGroups<'_> {
        DirectoryGroups {
            walker: self,
            pending: self.candidate_directories().into_iter(),
        }
    }

    pub fn read_group(&self, directory: &Path) -> Result<DirectoryGroup> {
        let mut files: Vec<PathBuf> = fs::read_dir(directory)
            .with_context(|| format!("cannot read directory {}", directory.display()))?
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Cannot read entry in {}: {e}", directory.display());
                    None
                }
            })
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .map(|e| e.path())
            .filter(|p| {
                !p.file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with('.'))
            })
            .collect();
        files.sort();

        let mut frames = Vec::new();
        let mut unreadable = Vec::new();
        let mut ignored = Vec::new();
        for path in files.iter().filter(|p| self.extractor.is_frame_file(p)) {
            match self.extractor.extract(path) {
                Ok(frame) => frames.push(frame),
                Err(e @ MoveLightsError::UnsupportedFrameType { .. }) => {
                    warn!("Ignoring frame: {e}");
                    ignored.push(path.clone());
                }
                Err(e) => {
                    warn!("Skipping frame: {e}");
                    unreadable.push(path.clone());
                }
            }
        }

        let relative_path = directory
            .strip_prefix(&self.source_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| directory.file_name().map(PathBuf::from).unwrap_or_default());

        debug!(
            "{}: {} files, {} frames, {} unreadable, {} ignored",
            directory.display(),
            files.len(),
            frames.len(),
            unreadable.len(),
            ignored.len()
        );

        Ok(DirectoryGroup {
            directory: directory.to_path_buf(),
            relative_path,
            frames,
            files,
            unreadable,
            ignored,
        })
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.as_ref().is_some_and(|excluded| {
            path == excluded.as_path()
                || fs::canonicalize(path).is_ok_and(|p| p == *excluded)
        })
    }
}

/// `DirectoryWalker::groups` 回傳的迭代器
pub struct DirectoryGroups<'a> {
    walker: &'a DirectoryWalker,
    pending: std::vec::IntoIter<PathBuf>,
}

impl DirectoryGroups<'_> {
    /// 尚未讀取的資料夾數
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl Iterator for DirectoryGroups<'_> {
    type Item = DirectoryGroup;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let directory = self.pending.next()?;
            match self.walker.read_group(&directory) {
                Ok(group) => return Some(group),
                // 資料夾可能在走訪後被移走或刪除
                Err(e) => warn!("{e:#}"),
            }
        }
    }
}
