//! Movement directives carried by cells.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::context::SharedRng;

/// The side of a cell its propulsion is fitted to, which is the way it pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Moves towards smaller x.
    Left,
    /// Moves towards larger y.
    Up,
    /// Moves towards smaller y.
    Down,
    /// Moves towards larger x.
    Right,
    /// Wanders: follows a rolled current direction that changes periodically.
    Random,
    /// Stationary.
    None,
}

impl Direction {
    /// The four axis directions.
    pub const AXES: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Down,
        Direction::Right,
    ];

    /// Draws any of the six directions with equal weight.
    pub fn random(rng: &SharedRng) -> Self {
        match rng.range(0, 6) {
            0 => Direction::Down,
            1 => Direction::Left,
            2 => Direction::Right,
            3 => Direction::Up,
            4 => Direction::Random,
            _ => Direction::None,
        }
    }

    /// Draws one of the four axis directions.
    pub fn random_axis(rng: &SharedRng) -> Self {
        loop {
            let direction = Self::random(rng);
            if direction.is_axis() {
                return direction;
            }
        }
    }

    /// Draws an axis direction different from `current`.
    pub fn random_axis_except(rng: &SharedRng, current: Direction) -> Self {
        loop {
            let direction = Self::random_axis(rng);
            if direction != current {
                return direction;
            }
        }
    }

    /// Whether this is one of LEFT, UP, DOWN, RIGHT.
    pub fn is_axis(self) -> bool {
        !matches!(self, Direction::Random | Direction::None)
    }

    /// The geometric opposite; RANDOM and NONE have none and map to themselves.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            other => other,
        }
    }

    /// Unit step for this direction in movement coordinates.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Random | Direction::None => (0, 0),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Direction::Left => "LEFT",
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Right => "RIGHT",
            Direction::Random => "RANDOM",
            Direction::None => "NONE",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a direction name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction '{0}'")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LEFT" => Ok(Direction::Left),
            "UP" => Ok(Direction::Up),
            "DOWN" => Ok(Direction::Down),
            "RIGHT" => Ok(Direction::Right),
            "RANDOM" => Ok(Direction::Random),
            "NONE" => Ok(Direction::None),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// A cell's movement directive.
///
/// `current` only matters when `assigned` is [`Direction::Random`]; it holds
/// the direction the wandering cell is following right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Propulsion {
    /// The fitted direction.
    pub assigned: Direction,
    /// The rolled direction followed in RANDOM mode.
    pub current: Direction,
}

impl Propulsion {
    /// Creates a propulsion; wandering cells start out heading right.
    pub fn new(assigned: Direction) -> Self {
        let current = if assigned == Direction::Random {
            Direction::Right
        } else {
            Direction::None
        };
        Self { assigned, current }
    }

    /// Whether the cell wanders.
    pub fn is_random(&self) -> bool {
        self.assigned == Direction::Random
    }

    /// The direction actually followed this step.
    pub fn effective(&self) -> Direction {
        if self.is_random() {
            self.current
        } else {
            self.assigned
        }
    }

    /// Flips whichever of `assigned` or `current` is in effect.
    pub fn reverse(&mut self) {
        if self.is_random() {
            self.current = self.current.opposite();
        } else {
            self.assigned = self.assigned.opposite();
        }
    }
}
