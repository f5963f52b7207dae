//! Per-tick cell resolution.
//!
//! One pass visits every cell that was alive when the tick began, in a
//! shuffled order. Each visit re-reads the grid, so a cell that was eaten
//! or displaced earlier in the same pass is skipped rather than processed
//! from stale data.

use crate::config::EngineConfig;
use crate::rng::{RandomSource, choose, shuffle};
use crate::world::{Cell, CellId, Entity, Grid, Position};
use std::collections::HashSet;

/// What happened during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TickTally {
    pub(crate) food_eaten: usize,
    pub(crate) cells_eaten: usize,
    pub(crate) random_moves: usize,
    pub(crate) starved: usize,
}

/// Run one pass over every cell on the grid.
pub(crate) fn process_tick<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    config: &EngineConfig,
    rng: &mut R,
) -> TickTally {
    let mut order = grid.all_cells();
    shuffle(&mut order, rng);

    let mut consumed: HashSet<CellId> = HashSet::new();
    let mut tally = TickTally::default();

    for (origin, snapshot) in order {
        if consumed.contains(&snapshot.id()) {
            log::trace!("cell {} was eaten this tick, skipping", snapshot.id());
            continue;
        }

        // The occupant may have moved or been eaten since the snapshot.
        let Entity::Cell(cell) = grid.get(origin) else {
            continue;
        };
        if cell.id() != snapshot.id() {
            continue;
        }

        if let Some((target, prey)) = pick_target(grid, config, &cell, origin, rng) {
            eat(grid, config, cell, origin, target);
            match prey {
                Entity::Cell(eaten) => {
                    consumed.insert(eaten.id());
                    tally.cells_eaten += 1;
                }
                Entity::Food(_) => tally.food_eaten += 1,
                Entity::Empty => {}
            }
            log::trace!("cell {} at {origin} ate {prey:?} at {target}", cell.id());
            continue;
        }

        let mut position = origin;
        if config.allow_random_move
            && cell.is_alive()
            && let Some(dest) = random_move(grid, &cell, origin, rng)
        {
            log::trace!("cell {} wandered from {origin} to {dest}", cell.id());
            position = dest;
            tally.random_moves += 1;
        }

        if config.cells_die && starve(grid, cell.id(), position) {
            log::trace!("cell {} starved at {position}", cell.id());
            tally.starved += 1;
        }
    }

    tally
}

/// Choose a neighbor the cell can eat, uniformly among all candidates.
fn pick_target<R: RandomSource + ?Sized>(
    grid: &Grid,
    config: &EngineConfig,
    cell: &Cell,
    origin: Position,
    rng: &mut R,
) -> Option<(Position, Entity)> {
    let candidates: Vec<(Position, Entity)> = grid
        .adjacent(origin)
        .iter()
        .map(|pos| (pos, grid.get(pos)))
        .filter(|(_, entity)| match entity {
            Entity::Food(food) => cell.can_consume(food.value()),
            Entity::Cell(other) => {
                config.cannibal_mode && other.id() != cell.id() && cell.can_consume(other.value())
            }
            Entity::Empty => false,
        })
        .collect();

    choose(&candidates, rng).copied()
}

/// Move `cell` onto `target` and leave food (or a new cell) behind.
fn eat(grid: &mut Grid, config: &EngineConfig, mut cell: Cell, origin: Position, target: Position) {
    cell.restore_energy(config.initial_energy);

    let left_behind = if config.cannibal_mode {
        match grid.left_behind_cell(&cell, config.initial_energy) {
            Ok(offspring) => Entity::Cell(offspring),
            Err(e) => {
                log::warn!("cell {} at {origin}: {e}, leaving food", cell.id());
                Entity::Food(cell.left_behind_food())
            }
        }
    } else {
        Entity::Food(cell.left_behind_food())
    };

    grid.set(target, cell);
    grid.set(origin, left_behind);
}

/// Move the cell to a random free neighbor, swapping with uneatable food.
///
/// Cells are never swap targets. Returns the new position, or `None` if
/// every neighbor is blocked.
fn random_move<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    cell: &Cell,
    origin: Position,
    rng: &mut R,
) -> Option<Position> {
    let candidates: Vec<Position> = grid
        .adjacent(origin)
        .iter()
        .filter(|&pos| match grid.get(pos) {
            Entity::Empty => true,
            Entity::Food(food) => !cell.can_consume(food.value()),
            Entity::Cell(_) => false,
        })
        .collect();

    let dest = *choose(&candidates, rng)?;
    let displaced = grid.get(dest);
    grid.set(dest, *cell);
    grid.set(origin, displaced);
    Some(dest)
}

/// Take one energy from cell `id` at `position`, removing it at zero.
///
/// Does nothing if `position` no longer holds that cell. Returns `true` if
/// the cell died.
pub(crate) fn starve(grid: &mut Grid, id: CellId, position: Position) -> bool {
    let Entity::Cell(mut cell) = grid.get(position) else {
        return false;
    };
    if cell.id() != id {
        return false;
    }

    if cell.drain() == 0 {
        grid.clear_at(position);
        true
    } else {
        grid.set(position, cell);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;
    use crate::world::Food;

    fn rules() -> EngineConfig {
        EngineConfig::default()
    }

    fn place_cell(grid: &mut Grid, x: u16, y: u16, value: u8, energy: u32) -> Cell {
        let cell = grid.new_cell(value, 9, energy).unwrap();
        grid.set(Position::new(x, y), cell);
        cell
    }

    fn place_food(grid: &mut Grid, x: u16, y: u16, value: u8) {
        grid.set(Position::new(x, y), Food::new(value, 9).unwrap());
    }

    #[test]
    fn test_eats_matching_food() {
        let mut grid = Grid::new(2, 1);
        let cell = place_cell(&mut grid, 0, 0, 1, 3);
        place_food(&mut grid, 1, 0, 0);

        let tally = process_tick(&mut grid, &rules(), &mut ScriptedRandom::default());

        assert_eq!(tally.food_eaten, 1);
        assert_eq!(grid.get(Position::new(1, 0)).cell_id(), Some(cell.id()));
        assert_eq!(
            grid.get(Position::new(0, 0)),
            Entity::Food(Food::new(2, 9).unwrap())
        );
    }

    #[test]
    fn test_ignores_non_matching_food() {
        let mut grid = Grid::new(2, 1);
        place_cell(&mut grid, 0, 0, 5, 3);
        place_food(&mut grid, 1, 0, 5);
        let before = grid.clone();

        let tally = process_tick(&mut grid, &rules(), &mut ScriptedRandom::default());

        assert_eq!(tally, TickTally::default());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_tie_break_uses_rng() {
        // Cell in the middle with matching food on the left and right.
        let mut grid = Grid::new(3, 1);
        let cell = place_cell(&mut grid, 1, 0, 4, 3);
        place_food(&mut grid, 0, 0, 3);
        place_food(&mut grid, 2, 0, 3);

        // Candidates are ordered right, left; draw 1 picks left.
        process_tick(&mut grid, &rules(), &mut ScriptedRandom::new([1]));
        assert_eq!(grid.get(Position::new(0, 0)).cell_id(), Some(cell.id()));
        assert_eq!(grid.get(Position::new(2, 0)).value(), Some(3));
    }

    #[test]
    fn test_eating_restores_energy() {
        let mut grid = Grid::new(2, 1);
        let cell = place_cell(&mut grid, 0, 0, 1, 1);
        place_food(&mut grid, 1, 0, 0);
        let config = EngineConfig {
            cells_die: true,
            initial_energy: 7,
            ..rules()
        };

        process_tick(&mut grid, &config, &mut ScriptedRandom::default());

        let moved = *grid.get(Position::new(1, 0)).as_cell().unwrap();
        assert_eq!(moved.id(), cell.id());
        assert_eq!(moved.energy(), 7);
    }

    #[test]
    fn test_cells_not_eaten_without_cannibal_mode() {
        let mut grid = Grid::new(2, 1);
        place_cell(&mut grid, 0, 0, 1, 3);
        place_cell(&mut grid, 1, 0, 0, 3);
        let before = grid.clone();

        process_tick(&mut grid, &rules(), &mut ScriptedRandom::default());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_random_move_into_empty() {
        let mut grid = Grid::new(2, 1);
        let cell = place_cell(&mut grid, 0, 0, 3, 2);
        let config = EngineConfig {
            allow_random_move: true,
            ..rules()
        };

        let tally = process_tick(&mut grid, &config, &mut ScriptedRandom::default());

        assert_eq!(tally.random_moves, 1);
        assert_eq!(grid.get(Position::new(1, 0)).cell_id(), Some(cell.id()));
        assert!(grid.get(Position::new(0, 0)).is_empty());
        // Wandering does not touch energy.
        assert_eq!(grid.get(Position::new(1, 0)).as_cell().unwrap().energy(), 2);
    }

    #[test]
    fn test_random_move_swaps_uneatable_food() {
        let mut grid = Grid::new(2, 1);
        let cell = place_cell(&mut grid, 0, 0, 3, 2);
        place_food(&mut grid, 1, 0, 7);
        let config = EngineConfig {
            allow_random_move: true,
            ..rules()
        };

        process_tick(&mut grid, &config, &mut ScriptedRandom::default());

        assert_eq!(grid.get(Position::new(1, 0)).cell_id(), Some(cell.id()));
        assert_eq!(grid.get(Position::new(0, 0)).value(), Some(7));
    }

    #[test]
    fn test_random_move_never_swaps_with_cells() {
        let mut grid = Grid::new(2, 1);
        place_cell(&mut grid, 0, 0, 3, 2);
        place_cell(&mut grid, 1, 0, 3, 2);
        let config = EngineConfig {
            allow_random_move: true,
            cannibal_mode: true,
            ..rules()
        };
        let before = grid.clone();

        let tally = process_tick(&mut grid, &config, &mut ScriptedRandom::default());
        assert_eq!(tally.random_moves, 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_starvation_after_random_move_uses_new_position() {
        let mut grid = Grid::new(2, 1);
        let cell = place_cell(&mut grid, 0, 0, 3, 2);
        let config = EngineConfig {
            allow_random_move: true,
            cells_die: true,
            ..rules()
        };

        process_tick(&mut grid, &config, &mut ScriptedRandom::default());

        let moved = *grid.get(Position::new(1, 0)).as_cell().unwrap();
        assert_eq!(moved.id(), cell.id());
        assert_eq!(moved.energy(), 1);
    }

    #[test]
    fn test_starve_skips_different_occupant() {
        let mut grid = Grid::new(1, 1);
        let cell = place_cell(&mut grid, 0, 0, 3, 1);
        let before = grid.clone();

        assert!(!starve(&mut grid, CellId(cell.id().0 + 100), Position::new(0, 0)));
        assert_eq!(grid, before);
        assert!(!starve(&mut grid, cell.id(), Position::new(4, 4)));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_starve_removes_at_zero() {
        let mut grid = Grid::new(1, 1);
        let cell = place_cell(&mut grid, 0, 0, 3, 2);

        assert!(!starve(&mut grid, cell.id(), Position::new(0, 0)));
        assert_eq!(grid.get(Position::new(0, 0)).as_cell().unwrap().energy(), 1);
        assert!(starve(&mut grid, cell.id(), Position::new(0, 0)));
        assert!(grid.get(Position::new(0, 0)).is_empty());
    }

    #[test]
    fn test_eaten_cell_does_not_act() {
        // A(1) eats B(0); B would otherwise eat the food 9 beside it.
        let mut grid = Grid::new(3, 1);
        let a = place_cell(&mut grid, 0, 0, 1, 3);
        let b = place_cell(&mut grid, 1, 0, 0, 3);
        place_food(&mut grid, 2, 0, 9);
        let config = EngineConfig {
            cannibal_mode: true,
            initial_energy: 5,
            ..rules()
        };

        // Snapshot is [A, B]; draw 1 keeps that order.
        let tally = process_tick(&mut grid, &config, &mut ScriptedRandom::new([1]));

        assert_eq!(tally.cells_eaten, 1);
        assert_eq!(tally.food_eaten, 0);
        assert_eq!(grid.get(Position::new(1, 0)).cell_id(), Some(a.id()));
        assert_eq!(grid.get(Position::new(2, 0)).value(), Some(9));

        let left = *grid.get(Position::new(0, 0)).as_cell().unwrap();
        assert_ne!(left.id(), a.id());
        assert_ne!(left.id(), b.id());
        assert_eq!(left.value(), 2);
        assert_eq!(left.energy(), 5);
    }

    #[test]
    fn test_cannibal_eat_with_exhausted_ids_leaves_food() {
        let cell = Cell::with_id(CellId(0), 1, 9, 3).unwrap();
        let tiles = vec![Entity::Cell(cell), Entity::Food(Food::new(0, 9).unwrap())];
        let mut grid = Grid::from_parts(2, 1, tiles, u64::MAX);
        let config = EngineConfig {
            cannibal_mode: true,
            ..rules()
        };

        let tally = process_tick(&mut grid, &config, &mut ScriptedRandom::default());
        assert_eq!(tally.food_eaten, 1);
        assert_eq!(grid.get(Position::new(1, 0)).cell_id(), Some(CellId(0)));
        assert_eq!(
            grid.get(Position::new(0, 0)),
            Entity::Food(Food::new(2, 9).unwrap())
        );
        assert_eq!(grid.next_cell_id(), u64::MAX);
    }
}
