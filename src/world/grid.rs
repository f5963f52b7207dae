//! The grid that owns every entity.

use crate::error::{SimError, SimResult};
use crate::rng::{RandomSource, shuffle};
use crate::world::{Cell, CellId, Entity, Food, Position};

/// Largest `next_cell_id` a grid takes from outside, such as a snapshot.
///
/// Keeps half of the id space free for cells created during play.
pub const MAX_NEXT_CELL_ID: u64 = u64::MAX / 2;

/// In-bounds neighbors of a position.
///
/// Holds up to four positions in the order up, right, down, left, with
/// out-of-bounds neighbors left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    slots: [Position; 4],
    len: u8,
}

impl Neighbors {
    fn push(&mut self, pos: Position) {
        self.slots[usize::from(self.len)] = pos;
        self.len += 1;
    }

    /// The neighbors as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Position] {
        &self.slots[..usize::from(self.len)]
    }

    /// Number of in-bounds neighbors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether there are no in-bounds neighbors (a 1x1 grid).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the neighbors.
    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.as_slice().iter().copied()
    }
}

/// Tallies of a grid's contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    /// Number of food tiles.
    pub food: usize,
    /// Number of live cells.
    pub cells: usize,
    /// Number of empty tiles.
    pub empty: usize,
    /// Sum of all cells' energy.
    pub total_energy: u64,
}

impl Census {
    /// Number of non-empty tiles.
    #[must_use]
    pub const fn occupied(&self) -> usize {
        self.food + self.cells
    }
}

/// A dense rectangular grid of entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Width in tiles.
    width: u16,
    /// Height in tiles.
    height: u16,
    /// Entities stored in row-major order.
    tiles: Vec<Entity>,
    /// Id handed to the next cell this grid creates.
    next_cell_id: u64,
}

impl Grid {
    /// Create an empty grid.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            tiles: vec![Entity::Empty; size],
            next_cell_id: 0,
        }
    }

    /// Rebuild a grid from raw parts. Used by snapshot loading.
    pub(crate) fn from_parts(
        width: u16,
        height: u16,
        tiles: Vec<Entity>,
        next_cell_id: u64,
    ) -> Self {
        Self {
            width,
            height,
            tiles,
            next_cell_id,
        }
    }

    /// Get the width of the grid.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the height of the grid.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Total number of tiles.
    #[must_use]
    pub fn area(&self) -> usize {
        self.tiles.len()
    }

    /// Id the next created cell will receive.
    #[must_use]
    pub const fn next_cell_id(&self) -> u64 {
        self.next_cell_id
    }

    /// All tiles in row-major order.
    #[must_use]
    #[inline]
    pub fn tiles(&self) -> &[Entity] {
        &self.tiles
    }

    /// Check if a position is within the grid.
    #[must_use]
    pub const fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(usize::from(pos.y) * usize::from(self.width) + usize::from(pos.x))
        } else {
            None
        }
    }

    // idx < width * height, so both quotients fit in u16.
    #[allow(clippy::cast_possible_truncation)]
    fn position(&self, idx: usize) -> Position {
        let width = usize::from(self.width);
        Position::new((idx % width) as u16, (idx / width) as u16)
    }

    /// Get the entity at a position.
    ///
    /// Out-of-range positions read as [`Entity::Empty`].
    #[must_use]
    pub fn get(&self, pos: Position) -> Entity {
        self.index(pos).map_or(Entity::Empty, |idx| self.tiles[idx])
    }

    /// Set the entity at a position.
    ///
    /// Returns `false` and leaves the grid unchanged if the position is out
    /// of bounds.
    pub fn set(&mut self, pos: Position, entity: impl Into<Entity>) -> bool {
        if let Some(idx) = self.index(pos) {
            self.tiles[idx] = entity.into();
            true
        } else {
            false
        }
    }

    /// Empty the tile at a position.
    pub fn clear_at(&mut self, pos: Position) -> bool {
        self.set(pos, Entity::Empty)
    }

    /// In-bounds neighbors of a position, in the order up, right, down, left.
    #[must_use]
    pub fn adjacent(&self, pos: Position) -> Neighbors {
        let mut result = Neighbors {
            slots: [Position::new(0, 0); 4],
            len: 0,
        };
        if !self.in_bounds(pos) {
            return result;
        }

        if pos.y > 0 {
            result.push(Position::new(pos.x, pos.y - 1)); // up
        }
        if pos.x + 1 < self.width {
            result.push(Position::new(pos.x + 1, pos.y)); // right
        }
        if pos.y + 1 < self.height {
            result.push(Position::new(pos.x, pos.y + 1)); // down
        }
        if pos.x > 0 {
            result.push(Position::new(pos.x - 1, pos.y)); // left
        }

        result
    }

    /// Iterate over all positions and entities in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Entity)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(idx, entity)| (self.position(idx), *entity))
    }

    /// Every cell with its position, in row-major order.
    #[must_use]
    pub fn all_cells(&self) -> Vec<(Position, Cell)> {
        self.iter()
            .filter_map(|(pos, entity)| entity.as_cell().map(|cell| (pos, *cell)))
            .collect()
    }

    /// Every food with its position, in row-major order.
    #[must_use]
    pub fn all_food(&self) -> Vec<(Position, Food)> {
        self.iter()
            .filter_map(|(pos, entity)| entity.as_food().map(|food| (pos, *food)))
            .collect()
    }

    /// Number of live cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|e| matches!(e, Entity::Cell(_)))
            .count()
    }

    /// Count food, cells and empty tiles in one pass.
    #[must_use]
    pub fn census(&self) -> Census {
        let mut census = Census::default();
        for entity in &self.tiles {
            match entity {
                Entity::Empty => census.empty += 1,
                Entity::Food(_) => census.food += 1,
                Entity::Cell(cell) => {
                    census.cells += 1;
                    census.total_energy += u64::from(cell.energy());
                }
            }
        }
        census
    }

    /// Create a cell with a fresh id. The cell is not placed.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidValue`] if `value > max_value`, or
    /// [`SimError::CellIdsExhausted`] if no id is left.
    pub fn new_cell(&mut self, value: u8, max_value: u8, energy: u32) -> SimResult<Cell> {
        let cell = Cell::with_id(CellId(self.next_cell_id), value, max_value, energy)?;
        self.allocate_id()?;
        Ok(cell)
    }

    /// Create the cell `parent` leaves behind when it eats in cannibal mode.
    /// The cell is not placed.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CellIdsExhausted`] if no id is left.
    pub fn left_behind_cell(&mut self, parent: &Cell, energy: u32) -> SimResult<Cell> {
        let id = self.allocate_id()?;
        Ok(parent.offspring(id, energy))
    }

    fn allocate_id(&mut self) -> SimResult<CellId> {
        let id = self.next_cell_id;
        self.next_cell_id = id.checked_add(1).ok_or(SimError::CellIdsExhausted)?;
        Ok(CellId(id))
    }

    /// Remove every entity. Cell ids keep counting up.
    pub fn clear(&mut self) {
        self.tiles.fill(Entity::Empty);
    }

    /// Fill the grid with randomly placed food and cells.
    ///
    /// Picks `food_count + cell_count` distinct positions, places food on
    /// the first `food_count` of them and cells with `energy` on the rest.
    /// Every value is drawn uniformly from `0..=max_value`. Anything
    /// previously on the grid is removed.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CapacityExceeded`] if the grid has fewer than
    /// `food_count + cell_count` tiles, or [`SimError::ZeroEnergy`] if
    /// cells would be placed with no energy. The grid is left untouched.
    pub fn initialize<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        food_count: usize,
        cell_count: usize,
        max_value: u8,
        energy: u32,
    ) -> SimResult<()> {
        if cell_count > 0 && energy == 0 {
            return Err(SimError::ZeroEnergy);
        }
        let requested = food_count.saturating_add(cell_count);
        if requested > self.area() {
            return Err(SimError::CapacityExceeded {
                requested,
                capacity: self.area(),
            });
        }

        self.clear();

        let mut positions: Vec<usize> = (0..self.area()).collect();
        shuffle(&mut positions, rng);

        let bound = usize::from(max_value) + 1;
        for &idx in &positions[..food_count] {
            let food = Food::new(random_value(rng, bound), max_value)?;
            self.tiles[idx] = Entity::Food(food);
        }
        for &idx in &positions[food_count..requested] {
            let cell = self.new_cell(random_value(rng, bound), max_value, energy)?;
            self.tiles[idx] = Entity::Cell(cell);
        }

        log::debug!(
            "initialized {}x{} grid with {food_count} food and {cell_count} cells",
            self.width,
            self.height
        );
        Ok(())
    }
}

fn random_value<R: RandomSource + ?Sized>(rng: &mut R, bound: usize) -> u8 {
    // bound <= 256, so the draw fits in u8.
    #[allow(clippy::cast_possible_truncation)]
    let value = rng.below(bound) as u8;
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn food(value: u8) -> Food {
        Food::new(value, 9).unwrap()
    }

    #[test]
    fn test_adjacent_order() {
        let grid = Grid::new(10, 10);
        let adj = grid.adjacent(Position::new(5, 5));
        assert_eq!(
            adj.as_slice(),
            &[
                Position::new(5, 4), // up
                Position::new(6, 5), // right
                Position::new(5, 6), // down
                Position::new(4, 5), // left
            ]
        );
    }

    #[test]
    fn test_adjacent_corner() {
        let grid = Grid::new(10, 10);
        let adj = grid.adjacent(Position::new(0, 0));
        assert_eq!(adj.as_slice(), &[Position::new(1, 0), Position::new(0, 1)]);

        let adj = grid.adjacent(Position::new(9, 9));
        assert_eq!(adj.as_slice(), &[Position::new(9, 8), Position::new(8, 9)]);
    }

    #[test]
    fn test_adjacent_single_tile() {
        let grid = Grid::new(1, 1);
        assert!(grid.adjacent(Position::new(0, 0)).is_empty());
    }

    #[test]
    fn test_get_out_of_range_is_empty() {
        let mut grid = Grid::new(3, 3);
        grid.set(Position::new(2, 2), food(4));
        assert_eq!(grid.get(Position::new(3, 0)), Entity::Empty);
        assert_eq!(grid.get(Position::new(0, 3)), Entity::Empty);
        assert_eq!(grid.get(Position::new(2, 2)), Entity::Food(food(4)));
    }

    #[test]
    fn test_set_out_of_range_is_noop() {
        let mut grid = Grid::new(2, 2);
        let before = grid.clone();
        assert!(!grid.set(Position::new(5, 5), food(1)));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_all_cells_row_major() {
        let mut grid = Grid::new(3, 2);
        let a = grid.new_cell(1, 9, 3).unwrap();
        let b = grid.new_cell(2, 9, 3).unwrap();
        grid.set(Position::new(0, 1), a);
        grid.set(Position::new(2, 0), b);
        grid.set(Position::new(1, 0), food(0));

        let cells = grid.all_cells();
        assert_eq!(cells, vec![(Position::new(2, 0), b), (Position::new(0, 1), a)]);
        assert_eq!(grid.all_food(), vec![(Position::new(1, 0), food(0))]);
    }

    #[test]
    fn test_new_cell_ids_are_unique() {
        let mut grid = Grid::new(1, 1);
        let a = grid.new_cell(0, 9, 1).unwrap();
        let b = grid.new_cell(0, 9, 1).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(grid.new_cell(10, 9, 1).is_err());
    }

    #[test]
    fn test_left_behind_cell() {
        let mut grid = Grid::new(1, 1);
        let parent = grid.new_cell(9, 9, 1).unwrap();
        let child = grid.left_behind_cell(&parent, 4).unwrap();
        assert_ne!(child.id(), parent.id());
        assert_eq!(child.value(), 0);
        assert_eq!(child.max_value(), 9);
        assert_eq!(child.energy(), 4);
    }

    #[test]
    fn test_initialize_counts() {
        let mut grid = Grid::new(10, 10);
        let mut rng = StdRng::seed_from_u64(3);
        grid.initialize(&mut rng, 30, 12, 9, 5).unwrap();

        let census = grid.census();
        assert_eq!(census.food, 30);
        assert_eq!(census.cells, 12);
        assert_eq!(census.empty, 58);
        assert_eq!(census.total_energy, 60);
        for (_, entity) in grid.iter() {
            assert!(entity.value().is_none_or(|v| v <= 9));
        }
    }

    #[test]
    fn test_initialize_fills_whole_grid() {
        let mut grid = Grid::new(3, 3);
        let mut rng = StdRng::seed_from_u64(11);
        grid.initialize(&mut rng, 4, 5, 9, 1).unwrap();
        assert_eq!(grid.census().empty, 0);
    }

    #[test]
    fn test_ids_run_out_without_wrapping() {
        let mut grid = Grid::from_parts(1, 1, vec![Entity::Empty], u64::MAX);
        let parent = Cell::with_id(CellId(0), 3, 9, 1).unwrap();
        assert_eq!(
            grid.left_behind_cell(&parent, 2),
            Err(SimError::CellIdsExhausted)
        );
        assert_eq!(grid.new_cell(3, 9, 1), Err(SimError::CellIdsExhausted));
        assert_eq!(grid.next_cell_id(), u64::MAX);
    }

    #[test]
    fn test_initialize_rejects_zero_energy() {
        let mut grid = Grid::new(3, 3);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            grid.initialize(&mut rng, 2, 2, 9, 0),
            Err(SimError::ZeroEnergy)
        );
        assert_eq!(grid.census().empty, 9);

        // Food-only grids need no energy.
        grid.initialize(&mut rng, 4, 0, 9, 0).unwrap();
        assert_eq!(grid.census().food, 4);
    }

    #[test]
    fn test_initialize_capacity_exceeded() {
        let mut grid = Grid::new(3, 3);
        let mut rng = StdRng::seed_from_u64(0);
        let err = grid.initialize(&mut rng, 5, 5, 9, 3).unwrap_err();
        assert_eq!(
            err,
            SimError::CapacityExceeded {
                requested: 10,
                capacity: 9
            }
        );
        assert_eq!(grid.census().empty, 9);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut grid = Grid::new(2, 1);
        let cell = grid.new_cell(4, 9, 2).unwrap();
        grid.set(Position::new(0, 0), cell);
        let copy = grid.clone();
        grid.clear();
        assert_eq!(copy.get(Position::new(0, 0)), Entity::Cell(cell));
        assert_eq!(copy.next_cell_id(), grid.next_cell_id());
    }
}
