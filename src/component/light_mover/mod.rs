//! 亮場搬移元件
//!
//! 來源目錄中每個資料夾的亮場都具備同資料夾的暗場、平場
//! （以及必要時的偏置場）時，整個資料夾搬到目的目錄的相同相對路徑

pub mod calibration_matcher;
pub mod directory_walker;
mod main;
pub mod move_executor;
pub mod report;

pub use calibration_matcher::{
    CalibrationCounts, DirectoryVerdict, LightVerdict, MatchCriteria, MatchResult,
    MissingCalibration, count_calibration, evaluate, evaluate_directory,
};
pub use directory_walker::{DirectoryGroups, DirectoryWalker};
pub use main::{LightMover, RunOptions};
pub use move_executor::{DirectoryMoveResult, FileAction, MoveExecutor, PlannedMove};
pub use report::{DirectoryOutcome, DirectoryReport, RunSummary, SkipReason};
