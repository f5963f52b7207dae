// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Cellchain: a grid simulation of cells that eat their way along a number
//! chain.
//!
//! Every tile of a rectangular grid is empty, holds food, or holds a cell.
//! Food and cells carry a value in `0..=max`. A cell eats a neighbor whose
//! value is exactly one below its own (cyclically, so `0` eats `max`),
//! moves onto it, and leaves food one above its own value behind.
//!
//! - Deterministic ticks for a given seed
//! - Optional starvation, random wandering, and cannibalism
//! - Recurring run loop with a cancel token and extinction callback
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI (run / watch / batch)         │
//! ├─────────────────────────────────────┤
//! │   SimulationEngine + Scheduler      │
//! ├─────────────────────────────────────┤
//! │   Grid, Entity, chain rule          │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use cellchain::{EngineConfig, SimulationConfig, SimulationEngine};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let setup = SimulationConfig::default();
//! let grid = setup.build_grid(&mut StdRng::seed_from_u64(7)).unwrap();
//! let mut engine = SimulationEngine::seeded(grid, EngineConfig::default(), 7).unwrap();
//! engine.tick();
//! assert_eq!(engine.tick_count(), 1);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod render;
pub mod rng;
pub mod world;

pub use config::{ConfigError, EngineConfig, SimulationConfig};
pub use engine::{CancelToken, RunOutcome, RunState, SimulationEngine, TickReport};
pub use error::{SimError, SimResult};
pub use rng::{RandomSource, ScriptedRandom};
pub use world::{Cell, CellId, Entity, Food, Grid, GridSnapshot, Position};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_build_a_simulation() {
        let grid = Grid::new(4, 4);
        let engine = SimulationEngine::new(grid, EngineConfig::default(), ScriptedRandom::default()).unwrap();
        assert_eq!(engine.run_state(), RunState::Idle);
        assert!(engine.last_report().is_none());
    }
}
