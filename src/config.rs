//! Simulation settings.

use crate::error::{SimError, SimResult};
use crate::rng::RandomSource;
use crate::world::Grid;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Rules the engine applies every tick. Fixed for the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cells lose one energy per tick they fail to eat and die at zero.
    pub cells_die: bool,
    /// Energy a cell is restored to when it eats.
    pub initial_energy: u32,
    /// Cells that cannot eat wander to a random free neighbor.
    pub allow_random_move: bool,
    /// Cells may eat other cells, and leave cells behind instead of food.
    pub cannibal_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cells_die: false,
            initial_energy: 3,
            allow_random_move: false,
            cannibal_mode: false,
        }
    }
}

impl EngineConfig {
    /// Check the rules an engine is about to run with.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ZeroEnergy`] if `initial_energy` is 0. Eating
    /// would restore cells to zero energy and leave starved cells on the
    /// grid.
    pub fn validate(&self) -> SimResult<()> {
        if self.initial_energy == 0 {
            return Err(SimError::ZeroEnergy);
        }
        Ok(())
    }
}

/// Valid ranges for user-facing settings.
pub mod limits {
    /// Smallest grid side.
    pub const MIN_SIDE: u16 = 1;
    /// Largest grid side.
    pub const MAX_SIDE: u16 = 100;
    /// Smallest chain maximum.
    pub const MIN_MAX_VALUE: u8 = 1;
    /// Largest chain maximum.
    pub const MAX_MAX_VALUE: u8 = 99;
    /// Smallest starting energy.
    pub const MIN_ENERGY: u32 = 1;
    /// Largest starting energy.
    pub const MAX_ENERGY: u32 = 100;
    /// Shortest delay between scheduled ticks, in milliseconds.
    pub const MIN_DELAY_MS: u64 = 10;
}

/// Everything needed to set up a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid width in tiles.
    pub width: u16,
    /// Grid height in tiles.
    pub height: u16,
    /// Food placed at initialization.
    pub food_count: usize,
    /// Cells placed at initialization.
    pub cell_count: usize,
    /// Largest number in the chain; values run `0..=max_value`.
    pub max_value: u8,
    /// Energy cells start with.
    pub energy: u32,
    /// Delay between scheduled ticks, in milliseconds.
    pub delay_ms: u64,
    /// Tick rules.
    pub rules: EngineConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let rules = EngineConfig::default();
        Self {
            width: 20,
            height: 20,
            food_count: 100,
            cell_count: 20,
            max_value: 9,
            energy: rules.initial_energy,
            delay_ms: 200,
            rules,
        }
    }
}

/// A setting outside its allowed range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Description of the problem.
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration error: {}", self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl SimulationConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|e| ConfigError {
            reason: format!("failed to read {}: {e}", path.display()),
        })?;
        serde_json::from_str(&data).map_err(|e| ConfigError {
            reason: format!("failed to parse {}: {e}", path.display()),
        })
    }

    /// Check every setting against [`limits`].
    ///
    /// # Errors
    ///
    /// Returns the first setting found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        use limits::{
            MAX_ENERGY, MAX_MAX_VALUE, MAX_SIDE, MIN_DELAY_MS, MIN_ENERGY, MIN_MAX_VALUE, MIN_SIDE,
        };

        let fail = |reason: String| Err(ConfigError { reason });

        if !(MIN_SIDE..=MAX_SIDE).contains(&self.width) {
            return fail(format!("width must be between {MIN_SIDE} and {MAX_SIDE}"));
        }
        if !(MIN_SIDE..=MAX_SIDE).contains(&self.height) {
            return fail(format!("height must be between {MIN_SIDE} and {MAX_SIDE}"));
        }
        if !(MIN_MAX_VALUE..=MAX_MAX_VALUE).contains(&self.max_value) {
            return fail(format!(
                "max value must be between {MIN_MAX_VALUE} and {MAX_MAX_VALUE}"
            ));
        }
        if !(MIN_ENERGY..=MAX_ENERGY).contains(&self.energy) {
            return fail(format!("energy must be between {MIN_ENERGY} and {MAX_ENERGY}"));
        }
        if !(MIN_ENERGY..=MAX_ENERGY).contains(&self.rules.initial_energy) {
            return fail(format!(
                "initial energy must be between {MIN_ENERGY} and {MAX_ENERGY}"
            ));
        }
        if self.delay_ms < MIN_DELAY_MS {
            return fail(format!("delay must be at least {MIN_DELAY_MS}ms"));
        }
        let area = usize::from(self.width) * usize::from(self.height);
        if self.food_count.saturating_add(self.cell_count) > area {
            return fail(format!(
                "{} food and {} cells do not fit on a {}x{} grid",
                self.food_count, self.cell_count, self.width, self.height
            ));
        }
        Ok(())
    }

    /// Create a grid and populate it with this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CapacityExceeded`] if the entities do not fit, or
    /// [`SimError::ZeroEnergy`] if cells would start with no energy.
    pub fn build_grid<R: RandomSource + ?Sized>(&self, rng: &mut R) -> SimResult<Grid> {
        let mut grid = Grid::new(self.width, self.height);
        grid.initialize(
            rng,
            self.food_count,
            self.cell_count,
            self.max_value,
            self.energy,
        )?;
        Ok(grid)
    }
}
