//! Plain-text rendering of a grid.
//!
//! Every tile takes the same width: cells are bracketed (`[3]`), food is
//! bare (` 3 `), and empty tiles show a dot. Values are right-aligned to
//! the widest value any entity on the grid can hold.

use crate::engine::TickReport;
use crate::world::{Entity, Grid};

fn value_width(grid: &Grid) -> usize {
    let widest = grid
        .tiles()
        .iter()
        .filter_map(|entity| match entity {
            Entity::Empty => None,
            Entity::Food(food) => Some(food.max_value()),
            Entity::Cell(cell) => Some(cell.max_value()),
        })
        .max()
        .unwrap_or(0);
    widest.to_string().len()
}

fn tile_text(entity: &Entity, width: usize) -> String {
    match entity {
        Entity::Empty => format!(" {:>width$} ", "."),
        Entity::Food(food) => format!(" {:>width$} ", food.value()),
        Entity::Cell(cell) => format!("[{:>width$}]", cell.value()),
    }
}

/// Render the grid as text, one line per row.
#[must_use]
pub fn render_grid(grid: &Grid) -> String {
    let width = value_width(grid);
    let mut out = String::with_capacity(grid.area() * (width + 2) + usize::from(grid.height()));

    for (i, entity) in grid.tiles().iter().enumerate() {
        out.push_str(&tile_text(entity, width));
        if (i + 1) % usize::from(grid.width()) == 0 {
            out.push('\n');
        }
    }
    out
}

/// One-line summary of the grid after `tick` ticks.
#[must_use]
pub fn render_summary(grid: &Grid, tick: u64) -> String {
    let census = grid.census();
    format!(
        "tick {tick}: {} cells, {} food, {} empty, {} total energy",
        census.cells, census.food, census.empty, census.total_energy
    )
}

/// One-line description of a tick report.
#[must_use]
pub fn render_report(report: &TickReport) -> String {
    format!(
        "tick {}: ate {} food, {} cells; {} moved; {} starved; {} alive",
        report.tick,
        report.food_eaten,
        report.cells_eaten,
        report.random_moves,
        report.starved,
        report.population
    )
}
