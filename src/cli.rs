//! CLI command implementations for Cellchain.

pub(crate) mod batch;
pub(crate) mod run;
pub(crate) mod watch;

mod output;

use cellchain::config::SimulationConfig;
use cellchain::world::SnapshotError;
use cellchain::{ConfigError, SimError};
use clap::{Args, ValueEnum};
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `batch` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BatchFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format, one row per run.
    Csv,
}

/// Grid and rule settings shared by every command.
///
/// Flags override values loaded from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct SetupArgs {
    /// JSON settings file
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Grid width in tiles
    #[arg(long)]
    pub(crate) width: Option<u16>,

    /// Grid height in tiles
    #[arg(long)]
    pub(crate) height: Option<u16>,

    /// Food placed at start
    #[arg(long)]
    pub(crate) food: Option<usize>,

    /// Cells placed at start
    #[arg(long)]
    pub(crate) cells: Option<usize>,

    /// Largest value in the number chain
    #[arg(short, long)]
    pub(crate) max_value: Option<u8>,

    /// Starting energy, also restored on eating
    #[arg(short, long)]
    pub(crate) energy: Option<u32>,

    /// Cells starve when they fail to eat
    #[arg(long)]
    pub(crate) cells_die: bool,

    /// Cells that cannot eat wander to a free neighbor
    #[arg(long)]
    pub(crate) random_move: bool,

    /// Cells may eat each other
    #[arg(long)]
    pub(crate) cannibal: bool,

    /// Random seed (default: random)
    #[arg(short, long)]
    pub(crate) seed: Option<u64>,
}

impl SetupArgs {
    /// Merge the settings file, defaults, and flags, then validate.
    pub(crate) fn resolve(&self) -> Result<SimulationConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(food) = self.food {
            config.food_count = food;
        }
        if let Some(cells) = self.cells {
            config.cell_count = cells;
        }
        if let Some(max_value) = self.max_value {
            config.max_value = max_value;
        }
        if let Some(energy) = self.energy {
            config.energy = energy;
            config.rules.initial_energy = energy;
        }
        config.rules.cells_die |= self.cells_die;
        config.rules.allow_random_move |= self.random_move;
        config.rules.cannibal_mode |= self.cannibal;

        config.validate()?;
        Ok(config)
    }

    /// The seed to use, drawn from the clock when none was given.
    pub(crate) fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(clock_seed)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SimError> for CliError {
    fn from(e: SimError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SnapshotError> for CliError {
    fn from(e: SnapshotError) -> Self {
        Self::new(e.to_string())
    }
}
