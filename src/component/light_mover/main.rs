use super::calibration_matcher::{
    CalibrationCounts, DirectoryVerdict, LightVerdict, MatchResult, count_calibration,
    evaluate_directory,
};
use super::directory_walker::DirectoryWalker;
use super::move_executor::{DirectoryMoveResult, FileAction, MoveExecutor};
use super::report::{DirectoryOutcome, DirectoryReport, RunSummary, SkipReason};
use crate::config::Config;
use crate::error::MoveLightsError;
use crate::frame::{DirectoryGroup, FrameExtractor};
use crate::tools::{prepare_dest_dir, remove_empty_directories};
use anyhow::Result;
use console::style;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 單次執行的參數
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub debug: bool,
    pub dry_run: bool,
}

/// 亮場搬移元件
pub struct LightMover {
    config: Config,
    options: RunOptions,
    shutdown_signal: Arc<AtomicBool>,
}

impl LightMover {
    pub const fn new(config: Config, options: RunOptions, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            options,
            shutdown_signal,
        }
    }

    /// 走訪來源目錄，把校正齊全的資料夾搬到目的目錄
    ///
    /// 只有 `SourceNotFound` 與 `DestUnwritable` 會回傳錯誤；
    /// 單一資料夾或檔案的問題都記錄在 `RunSummary` 中
    pub fn run(&self) -> Result<RunSummary> {
        let source = &self.options.source_dir;
        let dest = &self.options.dest_dir;

        println!("{} {}", style("Source directory:").bold(), source.display());
        println!("{} {}", style("Destination directory:").bold(), dest.display());
        println!("{}", style("Calibration frames must be co-located with lights").dim());
        if self.options.dry_run {
            println!(
                "\n{}\n",
                style("*** DRY RUN - No files will be moved ***").yellow().bold()
            );
        }
        self.check_stage_names(source, dest);

        let extractor = FrameExtractor::new(&self.config.frame_extensions);
        let walker = DirectoryWalker::new(source.clone(), extractor)?.with_excluded(dest);
        prepare_dest_dir(dest, self.options.dry_run)?;
        let executor = MoveExecutor::new(dest.clone(), self.options.dry_run);

        let mut summary = RunSummary::default();
        let mut groups = walker.groups();

        if groups.remaining() == 0 {
            println!(
                "{}",
                style(format!("No image directories found in {}", source.display())).yellow()
            );
            return Ok(summary);
        }
        println!("Found {} directories to check", groups.remaining());

        loop {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("Interrupted, {} directories left untouched", groups.remaining());
                summary.interrupted = true;
                break;
            }
            let Some(group) = groups.next() else {
                break;
            };

            let outcome = self.process_group(&group, &executor);
            summary.record(DirectoryReport {
                relative_path: group.relative_path.clone(),
                outcome,
            });
        }

        if !self.options.dry_run && self.config.cleanup_empty_dirs && summary.touched_source() {
            println!("\nCleaning up empty directories in {}", source.display());
            match remove_empty_directories(source, Some(dest.as_path())) {
                Ok(removed) => debug!("Removed {removed} empty directories"),
                Err(e) => warn!("Cleanup failed: {e:#}"),
            }
        }

        info!(
            "Run finished - moved: {}, partial: {}, failed: {}",
            summary.moved, summary.partially_moved, summary.failed
        );
        Ok(summary)
    }

    /// 資料夾名稱與慣例不同時只提示，不影響執行
    fn check_stage_names(&self, source: &Path, dest: &Path) {
        let named = |path: &Path, expected: &str| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy() == expected)
        };
        if !named(source, self.config.blink_dir_name.as_str()) {
            debug!(
                "Source {} is not named {}",
                source.display(),
                self.config.blink_dir_name
            );
        }
        if !named(dest, self.config.data_dir_name.as_str()) {
            debug!(
                "Destination {} is not named {}",
                dest.display(),
                self.config.data_dir_name
            );
        }
    }

    fn process_group(&self, group: &DirectoryGroup, executor: &MoveExecutor) -> DirectoryOutcome {
        println!(
            "\n{} {}",
            style("Processing:").cyan().bold(),
            group.display_name()
        );

        let counts = count_calibration(group);
        if self.options.debug {
            print_counts(&counts);
        }

        if !group.unreadable.is_empty() {
            println!(
                "  {} {} frame file(s) with unreadable metadata",
                style("SKIP:").yellow(),
                group.unreadable.len()
            );
            for path in &group.unreadable {
                println!("    {}", style(path.display()).dim());
            }
            return DirectoryOutcome::Skipped(SkipReason::UnreadableMetadata(
                group.unreadable.len(),
            ));
        }

        for path in &group.ignored {
            println!(
                "  {} {} (frame type not used for calibration)",
                style("IGNORED:").dim(),
                path.file_name().unwrap_or_default().to_string_lossy()
            );
        }

        let verdicts = match evaluate_directory(group) {
            None => {
                println!("  {} No light frames found", style("SKIP:").yellow());
                return DirectoryOutcome::Skipped(SkipReason::NoLights);
            }
            Some(DirectoryVerdict::NotReady { light, missing }) => {
                println!(
                    "  {} No matching {missing} for {}",
                    style("SKIP:").yellow(),
                    light.file_name()
                );
                return DirectoryOutcome::Skipped(SkipReason::Missing(missing));
            }
            Some(DirectoryVerdict::Ready(verdicts)) => verdicts,
        };

        log_matches(&verdicts);
        println!(
            "  Calibration complete: {} darks, {} flats{}",
            counts.darks,
            counts.flats,
            if counts.needs_bias {
                format!(", {} bias", counts.bias)
            } else {
                String::new()
            }
        );

        let result = executor.execute(group);
        self.print_move_result(&result);
        outcome_of(&result)
    }

    fn print_move_result(&self, result: &DirectoryMoveResult) {
        if self.options.dry_run || self.options.debug {
            for planned in &result.completed {
                let verb = match planned.action {
                    FileAction::Moved | FileAction::WouldMove => "Moving",
                    FileAction::AlreadyPresent | FileAction::WouldSkipDuplicate => "Duplicate",
                };
                println!("  {verb}: {}", planned.source.display());
                println!("      To: {}", planned.target.display());
            }
        }

        for failure in &result.failures {
            let label = match failure {
                MoveLightsError::MoveConflict { .. } => style("CONFLICT:").red(),
                _ => style("ERROR:").red(),
            };
            println!("  {label} {failure}");
        }

        let target = result.target_dir.display();
        if result.is_complete() {
            if self.options.dry_run {
                println!("  {} {target}", style("WOULD MOVE to").green());
            } else {
                println!("  {} {target}", style("MOVED to").green());
            }
        } else if result.is_partial() {
            println!(
                "  {} {target} ({} conflicts, {} errors)",
                style("PARTIALLY MOVED to").yellow(),
                result.conflicts(),
                result.errors()
            );
        } else {
            println!("  {} nothing was moved", style("FAILED:").red());
        }
    }

    pub fn print_summary(&self, summary: &RunSummary) {
        let rule = "=".repeat(50);
        println!("\n{rule}");
        println!("{}", style("Summary:").bold());
        if self.options.dry_run {
            println!("  (dry run, counts show what would happen)");
        }
        println!("  Moved:                  {}", style(summary.moved).green());
        println!("  Partially moved:        {}", summary.partially_moved);
        println!("  Skipped (no lights):    {}", summary.skipped_no_lights);
        println!("  Skipped (no darks):     {}", summary.skipped_no_darks);
        println!("  Skipped (no flats):     {}", summary.skipped_no_flats);
        println!("  Skipped (no bias):      {}", summary.skipped_no_bias);
        println!("  Skipped (unreadable):   {}", summary.skipped_unreadable);
        println!("  Failed:                 {}", summary.failed);
        println!("  Conflicts:              {}", summary.conflicts);
        println!("  Errors:                 {}", summary.errors);
        println!("{rule}");

        for report in summary.partial_directories() {
            println!(
                "{} {} needs manual attention",
                style("WARNING:").yellow().bold(),
                report.relative_path.display()
            );
        }
        if summary.interrupted {
            println!(
                "{}",
                style("Interrupted: remaining directories were not processed").yellow()
            );
        }
    }
}

fn print_counts(counts: &CalibrationCounts) {
    println!(
        "  Lights: {}, Darks: {}, Flats: {}, Bias: {}",
        counts.lights, counts.darks, counts.flats, counts.bias
    );
    if counts.needs_bias {
        println!("  Note: Bias required (dark exposure != light exposure)");
    }
}

fn log_matches(verdicts: &[LightVerdict<'_>]) {
    for verdict in verdicts {
        if let MatchResult::Ready { dark, flat, bias } = &verdict.result {
            debug!(
                "{}: dark={}, flat={}, bias={}",
                verdict.light.file_name(),
                dark.file_name(),
                flat.file_name(),
                bias.map_or_else(|| "-".to_string(), |b| b.file_name().into_owned())
            );
        }
    }
}

fn outcome_of(result: &DirectoryMoveResult) -> DirectoryOutcome {
    if result.is_complete() {
        DirectoryOutcome::Moved {
            files: result.completed.len(),
        }
    } else if result.is_partial() {
        DirectoryOutcome::PartiallyMoved {
            moved: result.completed.len(),
            conflicts: result.conflicts(),
            errors: result.errors(),
        }
    } else {
        DirectoryOutcome::Failed {
            conflicts: result.conflicts(),
            errors: result.errors(),
        }
    }
}
