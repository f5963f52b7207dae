//! Output formatting utilities for CLI.

// Averages over run counts
#![allow(clippy::cast_precision_loss)]

use cellchain::RunOutcome;
use cellchain::world::Census;
use serde::Serialize;

/// Result of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RunRecord {
    /// Seed the run used.
    pub(super) seed: u64,
    /// How the run ended.
    pub(super) outcome: RunOutcome,
    /// Food left on the grid.
    pub(super) food: usize,
    /// Energy summed over surviving cells.
    pub(super) total_energy: u64,
}

impl RunRecord {
    pub(super) fn new(seed: u64, outcome: RunOutcome, census: Census) -> Self {
        Self {
            seed,
            outcome,
            food: census.food,
            total_energy: census.total_energy,
        }
    }

    const fn ending(&self) -> &'static str {
        if self.outcome.extinct {
            "extinct"
        } else if self.outcome.stalled {
            "stalled"
        } else {
            "running"
        }
    }
}

/// JSON-serializable run result.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunResult {
    /// Random seed used.
    pub(super) seed: u64,
    /// Ticks run.
    pub(super) ticks: u64,
    /// Live cells at the end.
    pub(super) population: usize,
    /// Food left at the end.
    pub(super) food: usize,
    /// Energy summed over surviving cells.
    pub(super) total_energy: u64,
    /// "extinct", "stalled", or "running".
    pub(super) ending: &'static str,
}

impl From<&RunRecord> for JsonRunResult {
    fn from(record: &RunRecord) -> Self {
        Self {
            seed: record.seed,
            ticks: record.outcome.ticks,
            population: record.outcome.population,
            food: record.food,
            total_energy: record.total_energy,
            ending: record.ending(),
        }
    }
}

/// Format a run result as human-readable text.
pub(super) fn format_text(record: &RunRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Run Result (seed: {})\n", record.seed));
    output.push_str(&format!("  Ticks: {}\n", record.outcome.ticks));
    output.push_str(&format!("  Cells: {}\n", record.outcome.population));
    output.push_str(&format!("  Food: {}\n", record.food));
    output.push_str(&format!("  Energy: {}\n", record.total_energy));
    output.push_str(&format!("  Ending: {}\n", record.ending()));

    output
}

/// Aggregated results across a batch of runs.
#[derive(Debug, Default)]
pub(super) struct BatchStats {
    /// Individual runs, in completion order until [`sort`](Self::sort).
    pub(super) records: Vec<RunRecord>,
    /// Runs that ended with no cells.
    pub(super) extinctions: u64,
    /// Runs that reached a state no tick could change.
    pub(super) stalls: u64,
    total_ticks: u64,
    total_population: u64,
    population_sq_sum: f64,
}

impl BatchStats {
    /// Add a run to the stats.
    pub(super) fn add_record(&mut self, record: RunRecord) {
        if record.outcome.extinct {
            self.extinctions += 1;
        } else if record.outcome.stalled {
            self.stalls += 1;
        }
        self.total_ticks += record.outcome.ticks;
        let population = record.outcome.population as u64;
        self.total_population += population;
        self.population_sq_sum += (population * population) as f64;
        self.records.push(record);
    }

    /// Fold another partial result into this one.
    pub(super) fn merge(&mut self, other: Self) {
        self.extinctions += other.extinctions;
        self.stalls += other.stalls;
        self.total_ticks += other.total_ticks;
        self.total_population += other.total_population;
        self.population_sq_sum += other.population_sq_sum;
        self.records.extend(other.records);
    }

    /// Order runs by seed.
    pub(super) fn sort(&mut self) {
        self.records.sort_by_key(|record| record.seed);
    }

    /// Number of runs recorded.
    pub(super) fn runs(&self) -> u64 {
        self.records.len() as u64
    }

    /// Fraction of runs that died out (0.0-1.0).
    pub(super) fn extinction_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.extinctions as f64 / self.runs() as f64
    }

    /// Average ticks per run.
    pub(super) fn avg_ticks(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.total_ticks as f64 / self.runs() as f64
    }

    /// Average surviving population.
    pub(super) fn avg_population(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.total_population as f64 / self.runs() as f64
    }

    /// Standard deviation of the surviving population.
    pub(super) fn population_std_dev(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let mean = self.avg_population();
        let variance = self.population_sq_sum / self.runs() as f64 - mean * mean;
        if variance < 0.0 { 0.0 } else { variance.sqrt() }
    }
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    /// Runs completed.
    runs: u64,
    /// Runs that died out.
    extinctions: u64,
    /// Runs that stalled.
    stalls: u64,
    /// Fraction of runs that died out.
    extinction_rate: f64,
    /// Average ticks per run.
    avg_ticks: f64,
    /// Average surviving population.
    avg_population: f64,
    /// Surviving population standard deviation.
    population_std_dev: f64,
    /// Per-run results.
    results: Vec<JsonRunResult>,
}

impl JsonBatchResult {
    /// Create from batch stats.
    pub(super) fn from_stats(stats: &BatchStats) -> Self {
        Self {
            runs: stats.runs(),
            extinctions: stats.extinctions,
            stalls: stats.stalls,
            extinction_rate: stats.extinction_rate(),
            avg_ticks: stats.avg_ticks(),
            avg_population: stats.avg_population(),
            population_std_dev: stats.population_std_dev(),
            results: stats.records.iter().map(JsonRunResult::from).collect(),
        }
    }
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats) -> String {
    let mut output = String::new();

    output.push_str(&format!("Batch Results ({} runs)\n", stats.runs()));
    output.push_str("========================================\n\n");
    output.push_str(&format!(
        "  Extinct: {} ({:.1}%)\n",
        stats.extinctions,
        stats.extinction_rate() * 100.0
    ));
    output.push_str(&format!("  Stalled: {}\n", stats.stalls));
    output.push_str(&format!("  Average Length: {:.0} ticks\n", stats.avg_ticks()));
    output.push_str(&format!(
        "  Average Survivors: {:.1} (+/- {:.1})\n",
        stats.avg_population(),
        stats.population_std_dev()
    ));

    output
}

/// Format batch runs as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats) -> String {
    let mut output = String::new();

    output.push_str("seed,ticks,population,food,total_energy,ending\n");
    for record in &stats.records {
        output.push_str(&format!(
            "{},{},{},{},{},{}\n",
            record.seed,
            record.outcome.ticks,
            record.outcome.population,
            record.food,
            record.total_energy,
            record.ending()
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seed: u64, population: usize, extinct: bool) -> RunRecord {
        RunRecord {
            seed,
            outcome: RunOutcome {
                ticks: 10,
                population,
                extinct,
                stalled: false,
            },
            food: 3,
            total_energy: 6,
        }
    }

    #[test]
    fn test_batch_stats_merge() {
        let mut a = BatchStats::default();
        a.add_record(record(2, 0, true));
        let mut b = BatchStats::default();
        b.add_record(record(1, 4, false));
        a.merge(b);
        a.sort();

        assert_eq!(a.runs(), 2);
        assert_eq!(a.extinctions, 1);
        assert_eq!(a.records[0].seed, 1);
        assert!((a.avg_population() - 2.0).abs() < f64::EPSILON);
        assert!((a.population_std_dev() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = BatchStats::default();
        assert!(stats.extinction_rate().abs() < f64::EPSILON);
        assert!(stats.avg_ticks().abs() < f64::EPSILON);
    }

    #[test]
    fn test_csv_rows() {
        let mut stats = BatchStats::default();
        stats.add_record(record(5, 0, true));
        assert_eq!(
            format_batch_csv(&stats),
            "seed,ticks,population,food,total_energy,ending\n5,10,0,3,6,extinct\n"
        );
    }

    #[test]
    fn test_text_names_ending() {
        let text = format_text(&record(9, 2, false));
        assert!(text.contains("seed: 9"));
        assert!(text.contains("Ending: running"));
    }
}
