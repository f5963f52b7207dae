//! Run command implementation.

use super::output::{JsonRunResult, RunRecord, format_text};
use super::{CliError, OutputFormat, SetupArgs};
use cellchain::render::{render_grid, render_report, render_summary};
use cellchain::config::SimulationConfig;
use cellchain::{Grid, GridSnapshot, SimulationEngine};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the settings are invalid or a snapshot cannot be
/// read or written.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn execute(
    setup: SetupArgs,
    ticks: u64,
    format: OutputFormat,
    load: Option<PathBuf>,
    save: Option<PathBuf>,
    show_grid: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let config = setup.resolve()?;
    let seed = setup.seed();

    let (grid, start_tick) = starting_grid(&config, load.as_deref(), seed)?;

    let verbose = format == OutputFormat::Text && !quiet;
    if verbose {
        println!("Running {}x{} grid with seed {seed}...", grid.width(), grid.height());
        println!("{}", render_summary(&grid, start_tick));
    }

    let mut engine = SimulationEngine::seeded(grid, config.rules, seed)?.starting_at(start_tick);
    if verbose {
        engine = engine.with_update(|grid, tick| println!("{}", render_summary(grid, tick)));
    }

    let outcome = engine.run_until_extinct(ticks);
    if verbose && let Some(report) = engine.last_report() {
        println!("{}", render_report(&report));
    }
    let record = RunRecord::new(seed, outcome, engine.grid().census());

    if let Some(path) = save {
        GridSnapshot::capture(engine.grid(), engine.tick_count()).save(&path)?;
        if verbose {
            println!("Snapshot saved to: {}", path.display());
        }
    }

    match format {
        OutputFormat::Text => {
            if !quiet {
                println!();
            }
            if show_grid {
                print!("{}", render_grid(engine.grid()));
                println!();
            }
            print!("{}", format_text(&record));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonRunResult::from(&record))
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}

/// The grid to run and the tick it starts from.
///
/// A loaded snapshot resumes at its saved tick; a fresh grid starts at 0.
fn starting_grid(
    config: &SimulationConfig,
    load: Option<&Path>,
    seed: u64,
) -> Result<(Grid, u64), CliError> {
    match load {
        Some(path) => {
            let snapshot = GridSnapshot::load(path)?;
            let tick = snapshot.tick;
            log::info!("resuming {} at tick {tick}", path.display());
            Ok((snapshot.into_grid()?, tick))
        }
        None => Ok((config.build_grid(&mut StdRng::seed_from_u64(seed))?, 0)),
    }
}
