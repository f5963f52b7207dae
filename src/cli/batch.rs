//! Batch command implementation.

use super::output::{
    BatchStats, JsonBatchResult, RunRecord, format_batch_csv, format_batch_text,
};
use super::{BatchFormat, CliError, SetupArgs};
use cellchain::config::SimulationConfig;
use cellchain::{SimResult, SimulationEngine};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::time::Instant;

/// Execute the batch command.
///
/// # Errors
///
/// Returns an error if the settings are invalid.
#[allow(clippy::needless_pass_by_value, clippy::cast_precision_loss)]
pub(crate) fn execute(
    setup: SetupArgs,
    runs: u64,
    ticks: u64,
    threads: Option<usize>,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    let config = setup.resolve()?;
    let base_seed = setup.seed();

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if progress {
        let pb = ProgressBar::new(runs);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} runs ({per_sec})")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each simulation stays on one thread; runs are spread across the pool.
    let mut stats = (0..runs)
        .into_par_iter()
        .map(|i| simulate(&config, base_seed.wrapping_add(i), ticks))
        .inspect(|_| {
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        })
        .try_fold(BatchStats::default, |mut local, record| {
            local.add_record(record?);
            SimResult::Ok(local)
        })
        .try_reduce(BatchStats::default, |mut a, b| {
            a.merge(b);
            Ok(a)
        })?;
    stats.sort();

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let runs_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.runs() as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        BatchFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats));
            println!();
            println!(
                "Duration: {:.2}s ({:.0} runs/sec)",
                duration.as_secs_f64(),
                runs_per_sec
            );
        }
        BatchFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonBatchResult::from_stats(&stats))
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats));
        }
    }

    Ok(())
}

fn simulate(config: &SimulationConfig, seed: u64, ticks: u64) -> SimResult<RunRecord> {
    let grid = config.build_grid(&mut StdRng::seed_from_u64(seed))?;
    let mut engine = SimulationEngine::seeded(grid, config.rules, seed)?;
    let outcome = engine.run_until_extinct(ticks);
    log::debug!("seed {seed}: {outcome:?}");
    Ok(RunRecord::new(seed, outcome, engine.grid().census()))
}
