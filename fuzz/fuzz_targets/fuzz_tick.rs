#![no_main]

//! Tick sequence fuzzer.
//!
//! Builds a grid tile by tile from fuzzer input, then runs ticks under
//! fuzzer-chosen rules with a scripted random source. After every tick the
//! grid must pass the invariant checks and hold no more entities than
//! before.

use arbitrary::Arbitrary;
use cellchain::world::check_invariants;
use cellchain::{EngineConfig, Food, Grid, Position, ScriptedRandom, SimulationEngine};
use libfuzzer_sys::fuzz_target;

/// What to put on one tile.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzTile {
    Empty,
    Food(u8),
    Cell { value: u8, energy: u8 },
}

/// Structured input for tick fuzzing.
#[derive(Arbitrary, Debug)]
struct TickInput {
    width: u8,
    height: u8,
    max_value: u8,
    cells_die: bool,
    allow_random_move: bool,
    cannibal_mode: bool,
    initial_energy: u8,
    tiles: Vec<FuzzTile>,
    draws: Vec<u16>,
    ticks: u8,
}

fuzz_target!(|input: TickInput| {
    let width = u16::from(input.width % 16) + 1;
    let height = u16::from(input.height % 16) + 1;
    let max_value = input.max_value % 99 + 1;
    let modulus = max_value + 1;
    let initial_energy = u32::from(input.initial_energy % 10) + 1;

    let mut grid = Grid::new(width, height);
    let positions = (0..height).flat_map(|y| (0..width).map(move |x| Position::new(x, y)));
    for (pos, tile) in positions.zip(input.tiles.iter()) {
        match *tile {
            FuzzTile::Empty => {}
            FuzzTile::Food(value) => {
                let food = Food::new(value % modulus, max_value).unwrap();
                grid.set(pos, food);
            }
            FuzzTile::Cell { value, energy } => {
                let energy = u32::from(energy % 10) + 1;
                let cell = grid.new_cell(value % modulus, max_value, energy).unwrap();
                grid.set(pos, cell);
            }
        }
    }

    let config = EngineConfig {
        cells_die: input.cells_die,
        initial_energy,
        allow_random_move: input.allow_random_move,
        cannibal_mode: input.cannibal_mode,
    };
    let rng = ScriptedRandom::new(input.draws.iter().map(|&d| usize::from(d)));
    let mut engine = SimulationEngine::new(grid, config, rng).unwrap();

    let mut occupied = engine.grid().census().occupied();
    for _ in 0..input.ticks % 32 {
        engine.step();

        let violations = check_invariants(engine.grid(), config.cells_die);
        assert!(violations.is_empty(), "{violations:?}");

        let now = engine.grid().census().occupied();
        assert!(now <= occupied, "entities appeared: {occupied} -> {now}");
        occupied = now;
    }
});
