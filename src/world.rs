//! World layer: entities and the grid that owns them.
//!
//! - Entities (empty tiles, food, cells) and the number-chain rule
//! - Dense grid with bounded access and 4-neighbor adjacency
//! - Invariant checks and serializable snapshots

mod entity;
mod grid;
mod invariants;
mod snapshot;

pub use entity::{Cell, CellId, Entity, Food, Position, can_consume, left_behind_value};
pub use grid::{Census, Grid, MAX_NEXT_CELL_ID, Neighbors};
pub use invariants::{InvariantViolation, check_invariants};
pub use snapshot::{GridSnapshot, SnapshotError};
