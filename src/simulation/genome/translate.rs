use super::Gene;
use crate::simulation::error::GenomeError;
use crate::simulation::geometric_utils::{Bounds, height_of, width_of};
use crate::simulation::position::Position;

/// Walks a genome body and emits one position per cell marker.
///
/// Without a parent the walk starts at (0, 0) and nothing is pruned, which is
/// how replay shapes are drawn. With a parent the walk starts one parent
/// bounding box up and to the left of the parent's first cell so the child
/// does not land on top of it. Positions touching the world boundary are
/// pruned; if none survive, the walk is retried from two boxes down and to
/// the right. If that also leaves nothing, [`GenomeError::NoRoom`] is
/// returned instead of looping.
pub fn translate(
    body: &[Gene],
    parent: Option<(&[Position], &Bounds)>,
) -> Result<Vec<Position>, GenomeError> {
    let Some((parent, bounds)) = parent.filter(|(cells, _)| !cells.is_empty()) else {
        return Ok(walk(body, Position::default()));
    };

    let origin = parent[0];
    let width = width_of(parent);
    let height = height_of(parent);
    let anchors = [
        origin.offset(-width, -height),
        origin.offset(width * 2, height * 2),
    ];

    for anchor in anchors {
        let kept: Vec<Position> = walk(body, anchor)
            .into_iter()
            .filter(|pos| !bounds.collides(*pos))
            .collect();
        if !kept.is_empty() {
            return Ok(kept);
        }
    }

    Err(GenomeError::NoRoom {
        cells: body.iter().filter(|g| **g == Gene::Cell).count(),
    })
}

fn walk(body: &[Gene], mut anchor: Position) -> Vec<Position> {
    let mut positions = Vec::new();
    for gene in body {
        match gene {
            Gene::Left => anchor.x -= 1,
            Gene::Right => anchor.x += 1,
            Gene::Up => anchor.y -= 1,
            Gene::Down => anchor.y += 1,
            Gene::Cell => positions.push(anchor),
        }
    }
    positions
}
