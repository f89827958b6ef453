//! 錯誤分類
//!
//! 只有 `SourceNotFound` 與 `DestUnwritable` 會中止整次執行，
//! 其餘皆為單一檔案層級的錯誤，記錄後繼續處理下一個項目

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoveLightsError {
    /// 來源根目錄不存在、不是資料夾或無法讀取
    #[error("source directory not found or not readable: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// 目的根目錄無法建立或無法寫入
    #[error("destination directory is not writable: {} ({reason})", .path.display())]
    DestUnwritable { path: PathBuf, reason: String },

    /// 無法從檔頭判斷影格類型或必要欄位
    #[error("unreadable metadata in {}: {reason}", .path.display())]
    UnreadableMetadata { path: PathBuf, reason: String },

    /// 檔頭可讀，但影格類型不在比對範圍內（如 `DARKFLAT`、`SNAPSHOT`）
    #[error("unsupported frame type '{frame_type}' in {}", .path.display())]
    UnsupportedFrameType { path: PathBuf, frame_type: String },

    /// 目的地已有同名但內容不同的檔案
    #[error("destination already holds a different file: {}", .target_path.display())]
    MoveConflict {
        source_path: PathBuf,
        target_path: PathBuf,
    },

    /// 搬移過程中的 I/O 失敗
    #[error("failed to move {}: {reason}", .source_path.display())]
    MoveFailed { source_path: PathBuf, reason: String },
}

impl MoveLightsError {
    /// 是否為必須中止整次執行的設定錯誤
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::SourceNotFound(_) | Self::DestUnwritable { .. })
    }
}
