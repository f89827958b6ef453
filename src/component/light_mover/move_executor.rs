//! 搬移執行器
//!
//! 把整個資料夾的檔案搬到目的根目錄下相同的相對路徑。
//! 目的地已有內容相同的檔案時只刪除來源；內容不同則保留來源並回報衝突。
//! 不做交易式還原，部分失敗時資料夾會處於混合狀態。

use crate::error::MoveLightsError;
use crate::frame::DirectoryGroup;
use crate::tools::{ensure_directory_exists, files_identical};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// 單一檔案的處理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Moved,
    /// 目的地已有相同內容，來源已移除
    AlreadyPresent,
    WouldMove,
    WouldSkipDuplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub target: PathBuf,
    pub action: FileAction,
}

/// 一個資料夾的搬移結果
#[derive(Debug, Default)]
pub struct DirectoryMoveResult {
    pub target_dir: PathBuf,
    pub completed: Vec<PlannedMove>,
    /// `MoveConflict` 或 `MoveFailed`
    pub failures: Vec<MoveLightsError>,
}

impl DirectoryMoveResult {
    #[must_use]
    pub fn conflicts(&self) -> usize {
        self.failures
            .iter()
            .filter(|e| matches!(e, MoveLightsError::MoveConflict { .. }))
            .count()
    }

    #[must_use]
    pub fn errors(&self) -> usize {
        self.failures.len() - self.conflicts()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// 有些檔案已處理、有些失敗
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty() && !self.completed.is_empty()
    }
}

pub struct MoveExecutor {
    dest_root: PathBuf,
    dry_run: bool,
}

impl MoveExecutor {
    pub fn new(dest_root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            dest_root: dest_root.into(),
            dry_run,
        }
    }

    #[must_use]
    pub fn target_dir(&self, group: &DirectoryGroup) -> PathBuf {
        self.dest_root.join(&group.relative_path)
    }

    /// 搬移資料夾內所有檔案；dry-run 只做唯讀檢查
    pub fn execute(&self, group: &DirectoryGroup) -> DirectoryMoveResult {
        let target_dir = self.target_dir(group);
        let mut result = DirectoryMoveResult {
            target_dir: target_dir.clone(),
            ..DirectoryMoveResult::default()
        };

        if !self.dry_run {
            if let Err(e) = ensure_directory_exists(&target_dir) {
                warn!("{e:#}");
                result.failures = group
                    .files
                    .iter()
                    .map(|source| MoveLightsError::MoveFailed {
                        source_path: source.clone(),
                        reason: format!("{e:#}"),
                    })
                    .collect();
                return result;
            }
        }

        for source in &group.files {
            let Some(file_name) = source.file_name() else {
                continue;
            };
            let target = target_dir.join(file_name);

            match self.relocate(source, &target) {
                Ok(action) => result.completed.push(PlannedMove {
                    source: source.clone(),
                    target,
                    action,
                }),
                Err(e) => {
                    warn!("{e}");
                    result.failures.push(e);
                }
            }
        }

        result
    }

    fn relocate(&self, source: &Path, target: &Path) -> Result<FileAction, MoveLightsError> {
        let failed = |e: anyhow::Error| MoveLightsError::MoveFailed {
            source_path: source.to_path_buf(),
            reason: format!("{e:#}"),
        };

        if target.exists() {
            if !files_identical(source, target).map_err(failed)? {
                return Err(MoveLightsError::MoveConflict {
                    source_path: source.to_path_buf(),
                    target_path: target.to_path_buf(),
                });
            }
            if self.dry_run {
                return Ok(FileAction::WouldSkipDuplicate);
            }
            fs::remove_file(source)
                .with_context(|| format!("cannot remove duplicate {}", source.display()))
                .map_err(failed)?;
            debug!("Removed duplicate {} (already at {})", source.display(), target.display());
            return Ok(FileAction::AlreadyPresent);
        }

        if self.dry_run {
            return Ok(FileAction::WouldMove);
        }

        match fs::rename(source, target) {
            Ok(()) => {
                debug!("Moved {} -> {}", source.display(), target.display());
                Ok(FileAction::Moved)
            }
            Err(rename_err) => {
                // rename 跨檔案系統會失敗，改用複製後刪除
                debug!("rename failed ({rename_err}), falling back to copy");
                copy_and_delete(source, target).map_err(failed)?;
                Ok(FileAction::Moved)
            }
        }
    }
}

/// 複製檔案後刪除原檔案
fn copy_and_delete(source: &Path, target: &Path) -> Result<()> {
    copy_or_discard(source, target, |from, to| fs::copy(from, to))?;

    fs::remove_file(source).with_context(|| format!("cannot remove {}", source.display()))?;

    Ok(())
}

/// 複製失敗時移除寫到一半的目標檔，避免下次執行被當成衝突
fn copy_or_discard<F>(source: &Path, target: &Path, copy: F) -> Result<()>
where
    F: FnOnce(&Path, &Path) -> std::io::Result<u64>,
{
    if let Err(e) = copy(source, target) {
        if target.exists() {
            if let Err(cleanup) = fs::remove_file(target) {
                warn!("Cannot remove partial copy {}: {cleanup}", target.display());
            }
        }
        return Err(e).with_context(|| {
            format!("cannot copy {} -> {}", source.display(), target.display())
        });
    }
    Ok(())
}
