//! Simulation engine: tick orchestration and the continuous run loop.
//!
//! The engine owns the grid. Renderers read it between ticks through
//! [`SimulationEngine::grid`] or the update callback, which receives a
//! shared reference once per tick.

mod scheduler;
mod tick;

pub use scheduler::{CancelToken, RunState};

use crate::config::EngineConfig;
use crate::error::SimResult;
use crate::rng::RandomSource;
use crate::world::{Grid, check_invariants};
use rand::SeedableRng;
use rand::rngs::StdRng;
use scheduler::Scheduler;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

/// Called once per tick with the grid and the new tick count.
pub type UpdateCallback = Box<dyn FnMut(&Grid, u64)>;

/// Called when a scheduled run stops because no cells are left.
pub type NoMovesCallback = Box<dyn FnMut(u64)>;

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick count after this tick.
    pub tick: u64,
    /// Food eaten.
    pub food_eaten: usize,
    /// Cells eaten by other cells.
    pub cells_eaten: usize,
    /// Cells that wandered to a neighboring tile.
    pub random_moves: usize,
    /// Cells removed by starvation.
    pub starved: usize,
    /// Live cells after the tick.
    pub population: usize,
}

impl TickReport {
    /// Whether any cell ate or moved.
    #[must_use]
    pub const fn progressed(&self) -> bool {
        self.food_eaten + self.cells_eaten + self.random_moves > 0
    }
}

/// How a multi-tick run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Engine tick count when the run ended.
    pub ticks: u64,
    /// Live cells left.
    pub population: usize,
    /// Every cell died.
    pub extinct: bool,
    /// The grid reached a state no further tick can change.
    pub stalled: bool,
}

/// Drives the simulation one tick at a time.
///
/// Generic over the randomness source so tests can replay fixed draws;
/// production code uses a seeded [`StdRng`].
pub struct SimulationEngine<R = StdRng> {
    grid: Grid,
    config: EngineConfig,
    rng: R,
    tick_count: u64,
    scheduler: Scheduler,
    last_report: Option<TickReport>,
    on_update: Option<UpdateCallback>,
    on_no_moves: Option<NoMovesCallback>,
}

impl<R> fmt::Debug for SimulationEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("grid", &self.grid)
            .field("config", &self.config)
            .field("tick_count", &self.tick_count)
            .field("scheduler", &self.scheduler)
            .field("last_report", &self.last_report)
            .finish_non_exhaustive()
    }
}

impl SimulationEngine<StdRng> {
    /// Create an engine whose randomness is fixed by `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`EngineConfig::validate`].
    pub fn seeded(grid: Grid, config: EngineConfig, seed: u64) -> SimResult<Self> {
        Self::new(grid, config, StdRng::seed_from_u64(seed))
    }

    /// Create an engine seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`EngineConfig::validate`].
    pub fn from_entropy(grid: Grid, config: EngineConfig) -> SimResult<Self> {
        Self::new(grid, config, StdRng::from_entropy())
    }
}

impl<R: RandomSource> SimulationEngine<R> {
    /// Create an engine over `grid` drawing randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`EngineConfig::validate`].
    pub fn new(grid: Grid, config: EngineConfig, rng: R) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            grid,
            config,
            rng,
            tick_count: 0,
            scheduler: Scheduler::default(),
            last_report: None,
            on_update: None,
            on_no_moves: None,
        })
    }

    /// Continue counting ticks from `tick`, as when resuming a saved grid.
    #[must_use]
    pub fn starting_at(mut self, tick: u64) -> Self {
        self.tick_count = tick;
        self
    }

    /// Register the callback invoked once after every tick.
    #[must_use]
    pub fn with_update(mut self, callback: impl FnMut(&Grid, u64) + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Register the callback invoked when a scheduled run ends because the
    /// population died out.
    #[must_use]
    pub fn with_no_moves(mut self, callback: impl FnMut(u64) + 'static) -> Self {
        self.on_no_moves = Some(Box::new(callback));
        self
    }

    /// The grid, for reading between ticks.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Give up the engine and keep its grid.
    #[must_use]
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// Replace the grid and restart the tick count.
    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.tick_count = 0;
        self.last_report = None;
    }

    /// The rules this engine applies.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ticks run since construction or the last reset, counted on from
    /// [`starting_at`](Self::starting_at) when given.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Report of the most recent tick.
    #[must_use]
    pub const fn last_report(&self) -> Option<TickReport> {
        self.last_report
    }

    /// Run one tick. Returns `true` if any cell ate or moved.
    pub fn tick(&mut self) -> bool {
        self.step().progressed()
    }

    /// Run one tick and report what happened.
    pub fn step(&mut self) -> TickReport {
        let tally = tick::process_tick(&mut self.grid, &self.config, &mut self.rng);
        self.tick_count += 1;

        let report = TickReport {
            tick: self.tick_count,
            food_eaten: tally.food_eaten,
            cells_eaten: tally.cells_eaten,
            random_moves: tally.random_moves,
            starved: tally.starved,
            population: self.grid.cell_count(),
        };
        log::debug!(
            "tick {}: {} food eaten, {} cells eaten, {} wandered, {} starved, {} alive",
            report.tick,
            report.food_eaten,
            report.cells_eaten,
            report.random_moves,
            report.starved,
            report.population
        );

        if cfg!(debug_assertions) {
            for violation in check_invariants(&self.grid, self.config.cells_die) {
                log::warn!("tick {}: {violation}", self.tick_count);
            }
        }

        self.last_report = Some(report);
        if let Some(callback) = self.on_update.as_mut() {
            callback(&self.grid, self.tick_count);
        }
        report
    }

    /// Start ticking every `delay`. Does nothing if already running.
    ///
    /// Ticks fire from [`run_pending`](Self::run_pending) or
    /// [`run_blocking`](Self::run_blocking).
    pub fn start(&mut self, delay: Duration) {
        if self.scheduler.start(delay, Instant::now()) {
            log::info!("run started with {}ms delay", delay.as_millis());
        }
    }

    /// Stop the run loop. Does nothing if idle.
    pub fn stop(&mut self) {
        if self.scheduler.stop() {
            log::info!("run stopped at tick {}", self.tick_count);
        }
    }

    /// Whether the run loop is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Current run state.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        if self.is_running() {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    /// Delay between scheduled ticks of the active run.
    #[must_use]
    pub fn delay(&self) -> Option<Duration> {
        self.scheduler.delay()
    }

    /// When the next scheduled tick is due.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Token that stops the active run from another thread.
    #[must_use]
    pub fn cancel_token(&self) -> Option<CancelToken> {
        self.scheduler.token()
    }

    /// Fire the scheduled tick if one is due at `now`.
    ///
    /// After the tick, a run with no cells left stops and the no-moves
    /// callback fires.
    pub fn run_pending(&mut self, now: Instant) -> Option<TickReport> {
        if !self.scheduler.is_due(now) {
            return None;
        }

        let report = self.step();
        self.scheduler.reschedule(now);

        if report.population == 0 {
            self.scheduler.stop();
            log::info!("no cells left after tick {}, run stopped", self.tick_count);
            if let Some(callback) = self.on_no_moves.as_mut() {
                callback(self.tick_count);
            }
        }
        Some(report)
    }

    /// Drive the active run on this thread until it stops.
    ///
    /// Sleeps between ticks. The run ends on extinction, cancellation, or
    /// after `max_ticks` ticks when given. Returns immediately if idle.
    pub fn run_blocking(&mut self, max_ticks: Option<u64>) -> RunOutcome {
        let started_at = self.tick_count;

        while let Some(due) = self.scheduler.next_due() {
            if max_ticks.is_some_and(|max| self.tick_count - started_at >= max) {
                self.stop();
                break;
            }
            let now = Instant::now();
            if due > now {
                thread::sleep(due - now);
            }
            self.run_pending(Instant::now());
        }

        self.outcome(false)
    }

    /// Tick without delay until the cells die out or `max_ticks` ticks ran.
    ///
    /// Without starvation, a tick in which nothing ate or moved leaves the
    /// grid exactly as it was, so the run ends there as stalled.
    pub fn run_until_extinct(&mut self, max_ticks: u64) -> RunOutcome {
        let mut stalled = false;
        for _ in 0..max_ticks {
            if self.grid.cell_count() == 0 {
                break;
            }
            let report = self.step();
            if !report.progressed() && !self.config.cells_die {
                stalled = true;
                break;
            }
        }
        self.outcome(stalled)
    }

    fn outcome(&self, stalled: bool) -> RunOutcome {
        let population = self.grid.cell_count();
        RunOutcome {
            ticks: self.tick_count,
            population,
            extinct: population == 0,
            stalled,
        }
    }

    /// Stop the run loop and restart the tick count. The grid is kept.
    pub fn reset(&mut self) {
        self.stop();
        self.tick_count = 0;
        self.last_report = None;
    }
}
