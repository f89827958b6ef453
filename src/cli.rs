use clap::Parser;
use std::path::PathBuf;

/// Move light frames to the data directory when calibration frames exist.
///
/// Calibration frames (darks, flats, and bias when the dark exposure differs)
/// must be in the same directory as the light frames.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// Source directory containing lights (usually 10_Blink)
    pub source_dir: String,

    /// Destination directory for lights (usually 20_Data)
    pub dest_dir: String,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Show what would be done without moving any files
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Optional JSON settings file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
