//! Owned, serializable copies of a grid.

use crate::error::{SimError, SimResult};
use crate::world::{Entity, Grid, MAX_NEXT_CELL_ID, check_invariants};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Error type for snapshot file I/O.
#[derive(Debug)]
pub enum SnapshotError {
    /// Reading or writing the file failed.
    Io(std::io::Error),
    /// The file is not a valid snapshot document.
    Format(serde_json::Error),
    /// The document parsed but does not describe a valid grid.
    Invalid(SimError),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "snapshot I/O error: {e}"),
            SnapshotError::Format(e) => write!(f, "snapshot format error: {e}"),
            SnapshotError::Invalid(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        Self::Format(e)
    }
}

impl From<SimError> for SnapshotError {
    fn from(e: SimError) -> Self {
        Self::Invalid(e)
    }
}

/// A point-in-time copy of a grid that renderers and files can own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Width in tiles.
    pub width: u16,
    /// Height in tiles.
    pub height: u16,
    /// Tick count at the time the snapshot was taken.
    #[serde(default)]
    pub tick: u64,
    /// Id the next created cell will receive.
    pub next_cell_id: u64,
    /// Entities in row-major order.
    pub tiles: Vec<Entity>,
}

impl GridSnapshot {
    /// Capture a grid.
    #[must_use]
    pub fn capture(grid: &Grid, tick: u64) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            tick,
            next_cell_id: grid.next_cell_id(),
            tiles: grid.tiles().to_vec(),
        }
    }

    /// Turn the snapshot back into a grid.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidSnapshot`] if the tile count does not
    /// match the dimensions, an entity value is out of range, a cell id
    /// is repeated or was never issued, or `next_cell_id` is above
    /// [`MAX_NEXT_CELL_ID`].
    pub fn into_grid(self) -> SimResult<Grid> {
        let expected = usize::from(self.width) * usize::from(self.height);
        if self.tiles.len() != expected {
            return Err(SimError::InvalidSnapshot {
                reason: format!(
                    "{}x{} grid needs {expected} tiles, found {}",
                    self.width,
                    self.height,
                    self.tiles.len()
                ),
            });
        }

        if self.next_cell_id > MAX_NEXT_CELL_ID {
            return Err(SimError::InvalidSnapshot {
                reason: format!(
                    "next cell id {} leaves no room for new cells (limit {MAX_NEXT_CELL_ID})",
                    self.next_cell_id
                ),
            });
        }

        let grid = Grid::from_parts(self.width, self.height, self.tiles, self.next_cell_id);
        // Starvation is a rule setting, not a property of the snapshot.
        if let Some(violation) = check_invariants(&grid, false).into_iter().next() {
            return Err(SimError::InvalidSnapshot {
                reason: violation.message,
            });
        }
        Ok(grid)
    }

    /// Write the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Food, Position};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_capture_and_restore() {
        let mut grid = Grid::new(6, 4);
        grid.initialize(&mut StdRng::seed_from_u64(5), 8, 4, 9, 3)
            .unwrap();
        let snapshot = GridSnapshot::capture(&grid, 12);
        assert_eq!(snapshot.tick, 12);
        let restored = snapshot.into_grid().unwrap();
        assert_eq!(restored, grid);
    }

    #[test]
    fn test_tile_count_mismatch_rejected() {
        let snapshot = GridSnapshot {
            width: 2,
            height: 2,
            tick: 0,
            next_cell_id: 0,
            tiles: vec![Entity::Empty; 3],
        };
        let err = snapshot.into_grid().unwrap_err();
        assert!(matches!(err, SimError::InvalidSnapshot { .. }));
    }

    #[test]
    fn test_out_of_range_value_rejected() {
        let json = r#"{
            "width": 1, "height": 1, "next_cell_id": 0,
            "tiles": [{"kind": "food", "value": 12, "max_value": 9}]
        }"#;
        let snapshot: GridSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.into_grid().is_err());
    }

    #[test]
    fn test_exhausted_id_counter_rejected() {
        let json = r#"{
            "width": 2, "height": 1, "next_cell_id": 18446744073709551615,
            "tiles": [
                {"kind": "cell", "id": 0, "value": 1, "max_value": 9, "energy": 3},
                {"kind": "food", "value": 0, "max_value": 9}
            ]
        }"#;
        let snapshot: GridSnapshot = serde_json::from_str(json).unwrap();
        let err = snapshot.into_grid().unwrap_err();
        assert!(matches!(err, SimError::InvalidSnapshot { .. }));

        let at_limit = GridSnapshot {
            width: 1,
            height: 1,
            tick: 0,
            next_cell_id: MAX_NEXT_CELL_ID,
            tiles: vec![Entity::Empty],
        };
        assert_eq!(at_limit.into_grid().unwrap().next_cell_id(), MAX_NEXT_CELL_ID);
    }

    #[test]
    fn test_json_shape() {
        let mut grid = Grid::new(2, 1);
        grid.set(Position::new(0, 0), Food::new(3, 9).unwrap());
        let json = serde_json::to_string(&GridSnapshot::capture(&grid, 0)).unwrap();
        assert!(json.contains(r#""kind":"food""#));
        assert!(json.contains(r#""kind":"empty""#));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");

        let mut grid = Grid::new(3, 3);
        grid.initialize(&mut StdRng::seed_from_u64(8), 2, 2, 5, 4)
            .unwrap();
        GridSnapshot::capture(&grid, 3).save(&path).unwrap();

        let loaded = GridSnapshot::load(&path).unwrap();
        assert_eq!(loaded.tick, 3);
        assert_eq!(loaded.into_grid().unwrap(), grid);
    }
}
