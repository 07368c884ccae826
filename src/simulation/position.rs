//! Integer grid coordinates.
//!
//! Every cell and food item lives on an integer lattice. A [`Position`] is also
//! the key of the per-tick occupancy index and of the food position index, so
//! it is `Hash + Eq` and cheap to copy.

use std::fmt;

use geo::{Distance, Euclidean, Point};
use serde::{Deserialize, Serialize};

/// A point on the simulation lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate, growing to the right.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Position {
    /// Creates a position from its coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two positions.
    pub fn distance(self, other: Position) -> f64 {
        Euclidean.distance(self.to_point(), other.to_point())
    }

    /// Returns this position shifted by the given offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    fn to_point(self) -> Point<f64> {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

impl fmt::Display for Position {
    /// Formats as the `x-y` key used by the position indices.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.x, self.y)
    }
}
