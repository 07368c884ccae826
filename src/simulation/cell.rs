//! Cells, the unit building blocks of organisms.

use serde::{Deserialize, Serialize};

use super::locatable::Locatable;
use super::position::Position;
use super::propulsion::Propulsion;

/// Identifier of a cell, unique for the lifetime of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u64);

/// A single 1x1 square of an organism.
///
/// A cell is owned by exactly one organism. `prev_position` remembers where
/// the cell was before its last shift, per axis, so food passed over by fast
/// movers can be found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Unique identifier.
    pub id: CellId,
    /// Current position.
    pub position: Position,
    /// Position before the last shift on each axis.
    pub prev_position: Position,
    /// Movement directive.
    pub propulsion: Propulsion,
}

impl Cell {
    /// Creates a cell that has not moved yet.
    pub fn new(id: CellId, position: Position, propulsion: Propulsion) -> Self {
        Self {
            id,
            position,
            prev_position: position,
            propulsion,
        }
    }

    /// Shifts the cell horizontally, remembering the old x.
    pub fn shift_x(&mut self, dx: i32) {
        self.prev_position.x = self.position.x;
        self.position.x += dx;
    }

    /// Shifts the cell vertically, remembering the old y.
    pub fn shift_y(&mut self, dy: i32) {
        self.prev_position.y = self.position.y;
        self.position.y += dy;
    }
}

impl Locatable for Cell {
    fn position(&self) -> Position {
        self.position
    }
}

/// An ordered group of cells.
///
/// Organisms keep their cells in groups; the size of the first group feeds
/// into the organism's force.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellGroup {
    /// Cells in this group.
    pub cells: Vec<Cell>,
}

impl CellGroup {
    /// Wraps a list of cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Number of cells in the group.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the group has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
