//! Error types for grid construction, rule checks, and snapshot loading.

use std::fmt;

/// Errors raised while building entities, populating a grid, or checking
/// rules before an engine is built.
///
/// Tick processing never produces these; stale reads inside a tick are
/// skipped instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// An entity value outside `0..=max_value`.
    InvalidValue {
        /// The rejected value.
        value: u8,
        /// The maximum allowed value.
        max_value: u8,
    },
    /// More entities requested than the grid has slots.
    CapacityExceeded {
        /// Food plus cell count that was requested.
        requested: usize,
        /// Number of slots in the grid.
        capacity: usize,
    },
    /// A starting or restored energy of zero, which would leave cells that
    /// are already starved on the grid.
    ZeroEnergy,
    /// The grid has handed out every cell id it can.
    CellIdsExhausted,
    /// A grid snapshot could not be turned back into a grid.
    InvalidSnapshot {
        /// What was wrong with the snapshot.
        reason: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidValue { value, max_value } => {
                write!(f, "value {value} is outside 0..={max_value}")
            }
            SimError::CapacityExceeded { requested, capacity } => {
                write!(
                    f,
                    "too many entities for grid size: requested {requested}, capacity {capacity}"
                )
            }
            SimError::ZeroEnergy => write!(f, "energy must be at least 1"),
            SimError::CellIdsExhausted => write!(f, "no cell ids left to allocate"),
            SimError::InvalidSnapshot { reason } => write!(f, "invalid grid snapshot: {reason}"),
        }
    }
}

impl std::error::Error for SimError {}

/// Result type for fallible grid, entity, and engine construction.
pub type SimResult<T> = Result<T, SimError>;
