//! Vidloop CLI
//!
//! Command-line interface for looping a video to a target duration.

use clap::Parser;
use env_logger::{Env, Target};
use log::info;

use vidloop::cli::{commands, Cli, Commands, RunArgs};
use vidloop::progress::LogWriter;
use vidloop::Result;

fn main() {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .target(Target::Pipe(Box::new(LogWriter)))
        .init();

    info!("Vidloop v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = handle_command(cli) {
        eprintln!("Error [{}]: {}", e.error_code(), e);
        for suggestion in e.recovery_suggestions() {
            eprintln!("  - {}", suggestion);
        }
        std::process::exit(1);
    }
}

fn handle_command(cli: Cli) -> Result<()> {
    let overrides = cli.tool_overrides();
    match cli.command {
        Some(Commands::Run(args)) => commands::run(args, &overrides),
        Some(Commands::Plan {
            source,
            hours,
            json,
        }) => commands::plan(&source, hours, json, &overrides),
        Some(Commands::Probe { source }) => commands::probe(&source, &overrides),
        // Interactive mode
        None => commands::run(RunArgs::default(), &overrides),
    }
}
