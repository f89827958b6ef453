use super::calibration_matcher::MissingCalibration;
use std::path::PathBuf;

/// 資料夾未搬移的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoLights,
    Missing(MissingCalibration),
    /// 有影格檔的檔頭無法讀取
    UnreadableMetadata(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryOutcome {
    /// dry-run 時代表「將會搬移」
    Moved { files: usize },
    PartiallyMoved {
        moved: usize,
        conflicts: usize,
        errors: usize,
    },
    Skipped(SkipReason),
    /// 沒有任何檔案搬移成功
    Failed { conflicts: usize, errors: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryReport {
    pub relative_path: PathBuf,
    pub outcome: DirectoryOutcome,
}

/// 整次執行的統計
#[derive(Debug, Default)]
pub struct RunSummary {
    pub moved: usize,
    pub partially_moved: usize,
    pub skipped_no_lights: usize,
    pub skipped_no_darks: usize,
    pub skipped_no_flats: usize,
    pub skipped_no_bias: usize,
    pub skipped_unreadable: usize,
    pub failed: usize,
    pub conflicts: usize,
    pub errors: usize,
    /// 收到中斷訊號，提前結束
    pub interrupted: bool,
    pub directories: Vec<DirectoryReport>,
}

impl RunSummary {
    pub fn record(&mut self, report: DirectoryReport) {
        match report.outcome {
            DirectoryOutcome::Moved { .. } => self.moved += 1,
            DirectoryOutcome::PartiallyMoved {
                conflicts, errors, ..
            } => {
                self.partially_moved += 1;
                self.conflicts += conflicts;
                self.errors += errors;
            }
            DirectoryOutcome::Skipped(reason) => match reason {
                SkipReason::NoLights => self.skipped_no_lights += 1,
                SkipReason::Missing(MissingCalibration::Dark) => self.skipped_no_darks += 1,
                SkipReason::Missing(MissingCalibration::Flat) => self.skipped_no_flats += 1,
                SkipReason::Missing(MissingCalibration::Bias) => self.skipped_no_bias += 1,
                SkipReason::UnreadableMetadata(_) => self.skipped_unreadable += 1,
            },
            DirectoryOutcome::Failed { conflicts, errors } => {
                self.failed += 1;
                self.conflicts += conflicts;
                self.errors += errors;
            }
        }
        self.directories.push(report);
    }

    /// 有任何檔案實際離開來源目錄
    #[must_use]
    pub const fn touched_source(&self) -> bool {
        self.moved + self.partially_moved > 0
    }

    pub fn partial_directories(&self) -> impl Iterator<Item = &DirectoryReport> {
        self.directories.iter().filter(|r| {
            matches!(
                r.outcome,
                DirectoryOutcome::PartiallyMoved { .. } | DirectoryOutcome::Failed { .. }
            )
        })
    }
}
