//! Grid invariants - sanity checks that detect bugs.
//!
//! These should never trigger for a grid that was only mutated by the
//! engine. If they do, it indicates a bug in tick processing.

use crate::world::{Entity, Grid};
use std::collections::HashSet;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all grid invariants.
///
/// `cells_die` adds the starvation invariant: no cell may sit on the grid
/// with zero energy.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(grid: &Grid, cells_die: bool) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    let expected = usize::from(grid.width()) * usize::from(grid.height());
    if grid.tiles().len() != expected {
        violations.push(InvariantViolation {
            message: format!(
                "grid holds {} tiles, expected {expected}",
                grid.tiles().len()
            ),
        });
    }

    let mut seen = HashSet::new();
    for (pos, entity) in grid.iter() {
        if !entity.is_valid() {
            violations.push(InvariantViolation {
                message: format!("entity at {pos} has value outside its range: {entity:?}"),
            });
        }

        let Entity::Cell(cell) = entity else {
            continue;
        };

        if !seen.insert(cell.id()) {
            violations.push(InvariantViolation {
                message: format!("cell {} appears more than once (again at {pos})", cell.id()),
            });
        }
        if cell.id().0 >= grid.next_cell_id() {
            violations.push(InvariantViolation {
                message: format!(
                    "cell {} at {pos} has an id the grid has not issued yet",
                    cell.id()
                ),
            });
        }
        if cells_die && cell.energy() == 0 {
            violations.push(InvariantViolation {
                message: format!("starved cell {} still on the grid at {pos}", cell.id()),
            });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Cell, CellId, Position};

    #[test]
    fn test_fresh_grid_is_clean() {
        let grid = Grid::new(4, 4);
        assert!(check_invariants(&grid, true).is_empty());
    }

    #[test]
    fn test_duplicate_cell_detected() {
        let mut grid = Grid::new(2, 1);
        let cell = grid.new_cell(1, 9, 1).unwrap();
        grid.set(Position::new(0, 0), cell);
        grid.set(Position::new(1, 0), cell);
        let violations = check_invariants(&grid, false);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("more than once"));
    }

    #[test]
    fn test_starved_cell_only_flagged_when_cells_die() {
        let mut grid = Grid::new(1, 1);
        let cell = grid.new_cell(1, 9, 0).unwrap();
        grid.set(Position::new(0, 0), cell);
        assert!(check_invariants(&grid, false).is_empty());
        assert_eq!(check_invariants(&grid, true).len(), 1);
    }

    #[test]
    fn test_unissued_id_detected() {
        let mut grid = Grid::new(1, 1);
        grid.set(
            Position::new(0, 0),
            Cell::with_id(CellId(40), 1, 9, 1).unwrap(),
        );
        assert_eq!(check_invariants(&grid, false).len(), 1);
    }
}
