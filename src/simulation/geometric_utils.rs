//! Geometric helpers for boundary tests, organism extents and food sweeps.

use serde::{Deserialize, Serialize};

use super::context::SharedRng;
use super::position::Position;

/// Margin kept between random start positions and the world boundary.
pub const PLACEMENT_MARGIN: i32 = 5;

/// The playable region of the world, already shrunk by the border thickness.
///
/// A coordinate collides with the boundary when it touches either edge, so the
/// open interior is `1..width` by `1..height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Inner width.
    pub width: i32,
    /// Inner height.
    pub height: i32,
}

impl Bounds {
    /// Creates bounds from the full world size and the border thickness.
    pub fn from_world(world_width: i32, world_height: i32, border_thickness: i32) -> Self {
        Self {
            width: world_width - border_thickness * 2,
            height: world_height - border_thickness * 2,
        }
    }

    /// Checks whether a position touches or crosses the world boundary.
    pub fn collides(&self, pos: Position) -> bool {
        pos.x <= 0 || pos.x >= self.width || pos.y >= self.height || pos.y <= 0
    }

    /// Draws a start position at least [`PLACEMENT_MARGIN`] away from every edge.
    pub fn random_position(&self, rng: &SharedRng) -> Position {
        Position::new(
            rng.range(PLACEMENT_MARGIN, self.width - PLACEMENT_MARGIN),
            rng.range(PLACEMENT_MARGIN, self.height - PLACEMENT_MARGIN),
        )
    }

    /// Number of distinct positions [`Bounds::random_position`] can return.
    pub fn placement_capacity(&self) -> usize {
        let span = |extent: i32| (extent - PLACEMENT_MARGIN * 2).max(0) as usize;
        span(self.width) * span(self.height)
    }
}

/// Horizontal extent of a set of positions, counted in cells.
///
/// Returns 0 for an empty slice.
pub fn width_of(positions: &[Position]) -> i32 {
    extent(positions.iter().map(|p| p.x))
}

/// Vertical extent of a set of positions, counted in cells.
///
/// Returns 0 for an empty slice.
pub fn height_of(positions: &[Position]) -> i32 {
    extent(positions.iter().map(|p| p.y))
}

fn extent(values: impl Iterator<Item = i32>) -> i32 {
    let (min, max) = values.fold((i32::MAX, i32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max { 0 } else { max - min + 1 }
}

/// Keys passed over by a cell that jumped from `prev` to `current`.
///
/// X is stepped across the whole delta, strictly between the two positions.
/// Y only ever contributes the single key one unit from `prev` towards
/// `current`, whatever the vertical distance travelled. Fast vertical movers
/// therefore skip food further along their path.
pub fn sweep_keys(prev: Position, current: Position) -> Vec<Position> {
    let mut keys = Vec::new();

    let dx = current.x - prev.x;
    let step_x = dx.signum();
    for i in 1..dx.abs() {
        keys.push(prev.offset(step_x * i, 0));
    }

    let dy = current.y - prev.y;
    if dy != 0 {
        keys.push(prev.offset(0, dy.signum()));
    }

    keys
}
