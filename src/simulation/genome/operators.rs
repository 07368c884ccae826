//! Mutation operators over genome bodies.
//!
//! Every operator takes a well-formed body (cell markers at even indices,
//! direction symbols at odd indices) and returns a well-formed body.

use super::{Gene, Genome, GenomeMeta, MAX_SPEED, MIN_SPEED};
use crate::simulation::context::SharedRng;
use crate::simulation::error::GenomeError;
use crate::simulation::propulsion::Direction;

/// Exclusive upper bound of a rolled movement cadence.
const MAX_STEPS_BEFORE_DIRECTION_CHANGE: i32 = 500;

/// Runs the full mutation pipeline over a parent body.
///
/// Six coin flips are drawn up front (double, reverse whole, snip and
/// replace, reverse half, halve, change movement) and the operators are then
/// applied in fixed order. Doubling suppresses halving and reversing one half
/// suppresses reversing the whole.
pub(super) fn mutate(
    parent: &[Gene],
    inherited: Direction,
    rng: &SharedRng,
) -> Result<Genome, GenomeError> {
    let should_double = rng.coin();
    let should_reverse = rng.coin();
    let should_snip = rng.coin();
    let should_reverse_half = rng.coin();
    let should_halve = rng.coin();
    let should_change_movement = rng.range(1, 3) == 2;

    let (propulsion, steps_before_direction_change) = if should_change_movement {
        let direction = Direction::random(rng);
        let steps = (direction == Direction::Random)
            .then(|| rng.range(1, MAX_STEPS_BEFORE_DIRECTION_CHANGE).unsigned_abs());
        (direction, steps)
    } else {
        (inherited, None)
    };

    let mut body = parent.to_vec();

    if should_double {
        body = double(&body, rng);
    }

    if should_snip {
        body = snip_and_replace(&body, rng);
    }

    if should_reverse_half {
        let up_down = rng.coin();
        let left_right = rng.coin();
        body = reverse_half(&body, up_down, left_right, rng);
    }

    if !should_double && should_halve {
        body = halve(&body, rng);
    }

    if !should_reverse_half && should_reverse {
        body = reverse(&body, true, true);
    }

    body = clean(&body);

    let meta = GenomeMeta {
        speed: rng.range(MIN_SPEED, MAX_SPEED),
        mutation_chance_percent: rng.range(1, 3).unsigned_abs(),
        propulsion,
        steps_before_direction_change,
    };

    Genome::new(body, meta)
}

/// Concatenates the body with itself, joined by a random direction.
///
/// Half of the time the doubled body then has its up/down and/or left/right
/// symbols inverted.
pub fn double(body: &[Gene], rng: &SharedRng) -> Vec<Gene> {
    let mut doubled = Vec::with_capacity(body.len() * 2 + 1);
    doubled.extend_from_slice(body);
    doubled.push(Gene::random_step(rng));
    doubled.extend_from_slice(body);

    if rng.coin() {
        let up_down = rng.coin();
        let left_right = rng.coin();
        doubled = reverse(&doubled, up_down, left_right);
    }

    if doubled.len() == 2 {
        return vec![doubled[0], Gene::random_step(rng), doubled[1]];
    }
    doubled
}

/// Splits at the midpoint and re-rolls every direction in one half.
///
/// Both halves are trimmed so they start and end on a cell marker, then
/// rejoined with a fresh random direction. Bodies of three symbols or fewer
/// are returned unchanged.
pub fn snip_and_replace(body: &[Gene], rng: &SharedRng) -> Vec<Gene> {
    if body.len() <= 3 {
        return body.to_vec();
    }

    let halfway = body.len() / 2;
    let mut first = &body[..halfway];
    let mut second = &body[halfway..];
    if first.last().is_some_and(|g| g.is_step()) {
        first = &first[..first.len() - 1];
    }
    if second.first().is_some_and(|g| g.is_step()) {
        second = &second[1..];
    }

    let reroll = |half: &[Gene]| -> Vec<Gene> {
        half.iter()
            .map(|g| if g.is_step() { Gene::random_step(rng) } else { *g })
            .collect()
    };

    let (first, second) = if rng.coin() {
        (reroll(first), second.to_vec())
    } else {
        (first.to_vec(), reroll(second))
    };

    let mut joined = first;
    joined.push(Gene::random_step(rng));
    joined.extend(second);
    joined
}

/// Inverts symbols on the selected axes across the whole body.
///
/// When neither axis is selected both are inverted. Bodies of one or three
/// symbols are returned unchanged.
pub fn reverse(body: &[Gene], up_down: bool, left_right: bool) -> Vec<Gene> {
    if body.len() <= 1 || body.len() == 3 {
        return body.to_vec();
    }
    let (up_down, left_right) = both_if_neither(up_down, left_right);
    flip(body, up_down, left_right)
}

/// Inverts one randomly chosen half and rejoins with a random direction.
///
/// The split point is the midpoint moved forward onto a cell marker. Bodies
/// of one or three symbols are returned unchanged.
pub fn reverse_half(body: &[Gene], up_down: bool, left_right: bool, rng: &SharedRng) -> Vec<Gene> {
    if body.len() <= 1 || body.len() == 3 {
        return body.to_vec();
    }
    let (up_down, left_right) = both_if_neither(up_down, left_right);

    let reverse_first = rng.coin();
    let midway = cell_aligned_midway(body);
    let first = &body[..midway - 1];
    let end = &body[midway..];

    let (first, end) = if reverse_first {
        (flip(first, up_down, left_right), end.to_vec())
    } else {
        (first.to_vec(), flip(end, up_down, left_right))
    };

    let mut joined = first;
    joined.push(Gene::random_step(rng));
    joined.extend(end);
    joined
}

/// Keeps a cell-aligned first or second half, chosen at random.
///
/// Bodies of one or three symbols are returned unchanged.
pub fn halve(body: &[Gene], rng: &SharedRng) -> Vec<Gene> {
    if body.len() <= 1 || body.len() == 3 {
        return body.to_vec();
    }
    let keep_first = rng.coin();
    let midway = cell_aligned_midway(body);
    if keep_first {
        body[..midway - 1].to_vec()
    } else {
        body[midway..].to_vec()
    }
}

/// Drops every direction that would immediately undo the last kept one.
///
/// The result is rebuilt as a strict marker/direction alternation. Bodies of
/// three symbols or fewer are returned unchanged.
pub fn clean(body: &[Gene]) -> Vec<Gene> {
    if body.len() <= 3 {
        return body.to_vec();
    }

    let mut cleaned = vec![Gene::Cell];
    let mut last: Option<Gene> = None;
    for &step in body.iter().skip(1).step_by(2) {
        if last.is_some_and(|l| step.is_opposite_of(l)) {
            continue;
        }
        last = Some(step);
        cleaned.push(step);
        cleaned.push(Gene::Cell);
    }
    cleaned
}

fn both_if_neither(up_down: bool, left_right: bool) -> (bool, bool) {
    if up_down || left_right {
        (up_down, left_right)
    } else {
        (true, true)
    }
}

fn flip(body: &[Gene], up_down: bool, left_right: bool) -> Vec<Gene> {
    body.iter().map(|g| g.flipped(up_down, left_right)).collect()
}

/// Midpoint index, nudged forward when it lands on a direction symbol.
fn cell_aligned_midway(body: &[Gene]) -> usize {
    let mut midway = body.len() / 2;
    if body[midway].is_step() {
        midway += 1;
    }
    midway
}
