//! Trait for entities that occupy a lattice position.
//!
//! Implemented by [`Cell`](super::cell::Cell) and [`Food`](super::food::Food)
//! so the occupancy index and snapshots can treat them uniformly.

use super::position::Position;

/// Anything with a position on the lattice.
pub trait Locatable {
    /// Returns the entity's current position, which is also its index key.
    fn position(&self) -> Position;
}
