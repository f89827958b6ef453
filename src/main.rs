use anyhow::Result;
use ap_move_lights::cli::Cli;
use ap_move_lights::component::{LightMover, RunOptions};
use ap_move_lights::config::Config;
use ap_move_lights::init;
use ap_move_lights::signal::setup_shutdown_signal;
use ap_move_lights::tools::expand_env_vars;
use clap::Parser;
use console::style;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init::init(cli.debug);

    match run(cli) {
        Ok(()) => {
            info!("Program exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Program error: {e:#}");
            eprintln!("{} {e:#}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let shutdown_signal = setup_shutdown_signal()?;

    let options = RunOptions {
        source_dir: PathBuf::from(expand_env_vars(&cli.source_dir)),
        dest_dir: PathBuf::from(expand_env_vars(&cli.dest_dir)),
        debug: cli.debug,
        dry_run: cli.dry_run,
    };

    let mover = LightMover::new(config, options, shutdown_signal);
    let summary = mover.run()?;
    mover.print_summary(&summary);

    Ok(())
}
