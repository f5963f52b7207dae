//! Cellchain CLI - Command-line interface for running and watching simulations.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Cellchain - cells eating their way along a number chain
#[derive(Parser, Debug)]
#[command(name = "cellchain")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one simulation headless until the cells die out or stall
    Run {
        #[command(flatten)]
        setup: cli::SetupArgs,

        /// Maximum ticks (default: 1000)
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Start from a saved snapshot instead of a random grid
        #[arg(long)]
        load: Option<PathBuf>,

        /// Save the final grid to a snapshot file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print the final grid
        #[arg(short, long)]
        grid: bool,

        /// Suppress tick-by-tick output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Interactive TUI to watch a simulation in real time
    Watch {
        #[command(flatten)]
        setup: cli::SetupArgs,

        /// Tick delay in milliseconds (default: from settings, 200)
        #[arg(short, long)]
        delay: Option<u64>,
    },

    /// Run many seeded simulations in parallel and aggregate statistics
    Batch {
        #[command(flatten)]
        setup: cli::SetupArgs,

        /// Number of runs (default: 100)
        #[arg(short, long, default_value = "100")]
        runs: u64,

        /// Maximum ticks per run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            setup,
            ticks,
            format,
            load,
            save,
            grid,
            quiet,
        } => cli::run::execute(setup, ticks, format, load, save, grid, quiet),

        Commands::Watch { setup, delay } => cli::watch::execute(setup, delay),

        Commands::Batch {
            setup,
            runs,
            ticks,
            threads,
            format,
            progress,
        } => cli::batch::execute(setup, runs, ticks, threads, format, progress),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
