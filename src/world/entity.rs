//! Entity types and the number-chain consumption rule.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Stable identity of a cell, assigned by the grid that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u64);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Check whether a cell of value `cell_value` can eat something of value
/// `target_value`.
///
/// The target must be exactly one less, with 0 wrapping around to eat
/// `max_value`.
#[must_use]
pub const fn can_consume(cell_value: u8, target_value: u8, max_value: u8) -> bool {
    let modulus = max_value as u16 + 1;
    let wanted = (cell_value as u16 + modulus - 1) % modulus;
    target_value as u16 == wanted
}

/// Value of the entity a cell leaves on its origin tile after eating.
///
/// One more than the cell's value, with `max_value` wrapping to 0.
#[must_use]
pub const fn left_behind_value(cell_value: u8, max_value: u8) -> u8 {
    let modulus = max_value as u16 + 1;
    // Result is below modulus <= 256, so it fits in u8.
    #[allow(clippy::cast_possible_truncation)]
    let value = ((cell_value as u16 + 1) % modulus) as u8;
    value
}

fn check_value(value: u8, max_value: u8) -> SimResult<()> {
    if value > max_value {
        return Err(SimError::InvalidValue { value, max_value });
    }
    Ok(())
}

/// A unit of food waiting to be eaten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    value: u8,
    max_value: u8,
}

impl Food {
    /// Create food with the given value.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidValue`] if `value > max_value`.
    pub fn new(value: u8, max_value: u8) -> SimResult<Self> {
        check_value(value, max_value)?;
        Ok(Self { value, max_value })
    }

    /// The food's number.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// Largest number in this food's chain.
    #[must_use]
    pub const fn max_value(&self) -> u8 {
        self.max_value
    }
}

/// A living cell.
///
/// Cells are created through [`Grid::new_cell`](crate::Grid::new_cell) so
/// that every cell gets a fresh [`CellId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    id: CellId,
    value: u8,
    max_value: u8,
    energy: u32,
}

impl Cell {
    /// Create a cell with an explicit id.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidValue`] if `value > max_value`.
    pub fn with_id(id: CellId, value: u8, max_value: u8, energy: u32) -> SimResult<Self> {
        check_value(value, max_value)?;
        Ok(Self {
            id,
            value,
            max_value,
            energy,
        })
    }

    /// The cell's identity.
    #[must_use]
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// The cell's number.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// Largest number in this cell's chain.
    #[must_use]
    pub const fn max_value(&self) -> u8 {
        self.max_value
    }

    /// Remaining energy.
    #[must_use]
    pub const fn energy(&self) -> u32 {
        self.energy
    }

    /// Whether the cell still has energy left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.energy > 0
    }

    /// Whether this cell can eat something of value `target_value`.
    #[must_use]
    pub const fn can_consume(&self, target_value: u8) -> bool {
        can_consume(self.value, target_value, self.max_value)
    }

    /// Value of the entity this cell leaves behind when it moves to eat.
    #[must_use]
    pub const fn left_behind_value(&self) -> u8 {
        left_behind_value(self.value, self.max_value)
    }

    /// Food this cell leaves behind when it moves to eat.
    #[must_use]
    pub const fn left_behind_food(&self) -> Food {
        Food {
            value: self.left_behind_value(),
            max_value: self.max_value,
        }
    }

    /// Cell this cell leaves behind when it moves to eat in cannibal mode.
    pub(crate) const fn offspring(&self, id: CellId, energy: u32) -> Cell {
        Cell {
            id,
            value: self.left_behind_value(),
            max_value: self.max_value,
            energy,
        }
    }

    /// Set energy to `energy`.
    pub const fn restore_energy(&mut self, energy: u32) {
        self.energy = energy;
    }

    /// Take one unit of energy, never going below zero.
    ///
    /// Returns the remaining energy.
    pub const fn drain(&mut self) -> u32 {
        self.energy = self.energy.saturating_sub(1);
        self.energy
    }
}

/// Content of a single grid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    /// Nothing here.
    #[default]
    Empty,
    /// A unit of food.
    Food(Food),
    /// A living cell.
    Cell(Cell),
}

impl Entity {
    /// Whether this slot is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Entity::Empty)
    }

    /// The cell in this slot, if any.
    #[must_use]
    pub const fn as_cell(&self) -> Option<&Cell> {
        match self {
            Entity::Cell(cell) => Some(cell),
            Entity::Empty | Entity::Food(_) => None,
        }
    }

    /// The food in this slot, if any.
    #[must_use]
    pub const fn as_food(&self) -> Option<&Food> {
        match self {
            Entity::Food(food) => Some(food),
            Entity::Empty | Entity::Cell(_) => None,
        }
    }

    /// Id of the cell in this slot, if any.
    #[must_use]
    pub const fn cell_id(&self) -> Option<CellId> {
        match self {
            Entity::Cell(cell) => Some(cell.id),
            Entity::Empty | Entity::Food(_) => None,
        }
    }

    /// Number carried by this slot's entity.
    #[must_use]
    pub const fn value(&self) -> Option<u8> {
        match self {
            Entity::Empty => None,
            Entity::Food(food) => Some(food.value),
            Entity::Cell(cell) => Some(cell.value),
        }
    }

    /// Whether the entity's value is within its own `0..=max_value`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        match self {
            Entity::Empty => true,
            Entity::Food(food) => food.value <= food.max_value,
            Entity::Cell(cell) => cell.value <= cell.max_value,
        }
    }
}

impl From<Food> for Entity {
    fn from(food: Food) -> Self {
        Entity::Food(food)
    }
}

impl From<Cell> for Entity {
    fn from(cell: Cell) -> Self {
        Entity::Cell(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_consume_one_less() {
        assert!(can_consume(5, 4, 9));
        assert!(!can_consume(5, 5, 9));
        assert!(!can_consume(5, 6, 9));
    }

    #[test]
    fn test_can_consume_wraps_at_zero() {
        assert!(can_consume(0, 9, 9));
        assert!(!can_consume(0, 8, 9));
        assert!(can_consume(0, 99, 99));
    }

    #[test]
    fn test_left_behind_wraps_at_max() {
        assert_eq!(left_behind_value(3, 9), 4);
        assert_eq!(left_behind_value(9, 9), 0);
        assert_eq!(left_behind_value(0, 9), 1);
        assert_eq!(left_behind_value(255, 255), 0);
    }

    #[test]
    fn test_food_rejects_out_of_range() {
        assert!(Food::new(9, 9).is_ok());
        assert_eq!(
            Food::new(10, 9),
            Err(SimError::InvalidValue {
                value: 10,
                max_value: 9
            })
        );
    }

    #[test]
    fn test_cell_drain_floors_at_zero() {
        let mut cell = Cell::with_id(CellId(0), 1, 9, 1).unwrap();
        assert_eq!(cell.drain(), 0);
        assert_eq!(cell.drain(), 0);
        assert!(!cell.is_alive());
        cell.restore_energy(3);
        assert_eq!(cell.energy(), 3);
    }

    #[test]
    fn test_left_behind_food_keeps_max() {
        let cell = Cell::with_id(CellId(4), 0, 5, 2).unwrap();
        let food = cell.left_behind_food();
        assert_eq!(food.value(), 1);
        assert_eq!(food.max_value(), 5);
    }

    #[test]
    fn test_entity_accessors() {
        let cell = Cell::with_id(CellId(2), 3, 9, 1).unwrap();
        let entity = Entity::from(cell);
        assert_eq!(entity.cell_id(), Some(CellId(2)));
        assert_eq!(entity.value(), Some(3));
        assert!(entity.as_food().is_none());
        assert!(Entity::default().is_empty());
    }
}
