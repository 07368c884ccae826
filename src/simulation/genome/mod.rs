//! String-encoded genomes.
//!
//! The external form is a body of alternating cell markers and direction
//! symbols followed by a `|`-delimited metadata suffix:
//!
//! ```text
//! c>cvc|1|2|RIGHT|-1
//! ^^^^^ ^ ^ ^^^^^ ^^
//! body  | | |     steps before direction change (-1: not applicable)
//!       | | propulsion direction
//!       | mutation chance percent
//!       speed
//! ```
//!
//! The body is decoded once into [`Gene`] tokens; mutation operators and
//! translation work on tokens and the string is only rebuilt at the edge.

mod operators;
mod translate;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::context::SharedRng;
use super::error::GenomeError;
use super::geometric_utils::Bounds;
use super::position::Position;
use super::propulsion::Direction;

pub use operators::{clean, double, halve, reverse, reverse_half, snip_and_replace};
pub use translate::translate;

/// Separator between the body and each metadata field.
pub const DELIMITER: char = '|';

/// Lowest speed a genome can roll (inclusive).
pub const MIN_SPEED: i32 = 0;
/// Highest speed a genome can roll (exclusive).
pub const MAX_SPEED: i32 = 3;

/// One symbol of a genome body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gene {
    /// `c`: emit a cell at the current anchor.
    Cell,
    /// `<`: anchor x - 1.
    Left,
    /// `>`: anchor x + 1.
    Right,
    /// `^`: anchor y - 1.
    Up,
    /// `v`: anchor y + 1.
    Down,
}

impl Gene {
    /// Decodes a body character.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'c' => Some(Gene::Cell),
            '<' => Some(Gene::Left),
            '>' => Some(Gene::Right),
            '^' => Some(Gene::Up),
            'v' => Some(Gene::Down),
            _ => None,
        }
    }

    /// Encodes back to the body character.
    pub fn symbol(self) -> char {
        match self {
            Gene::Cell => 'c',
            Gene::Left => '<',
            Gene::Right => '>',
            Gene::Up => '^',
            Gene::Down => 'v',
        }
    }

    /// Whether this is a direction symbol rather than a cell marker.
    pub fn is_step(self) -> bool {
        self != Gene::Cell
    }

    /// Draws one of the four direction symbols.
    pub fn random_step(rng: &SharedRng) -> Self {
        match rng.range(0, 4) {
            0 => Gene::Left,
            1 => Gene::Down,
            2 => Gene::Right,
            _ => Gene::Up,
        }
    }

    /// Whether `self` directly undoes `other`.
    pub fn is_opposite_of(self, other: Gene) -> bool {
        matches!(
            (self, other),
            (Gene::Left, Gene::Right)
                | (Gene::Right, Gene::Left)
                | (Gene::Up, Gene::Down)
                | (Gene::Down, Gene::Up)
        )
    }

    /// Inverts the symbol on the selected axes.
    #[must_use]
    pub fn flipped(self, up_down: bool, left_right: bool) -> Self {
        match self {
            Gene::Up if up_down => Gene::Down,
            Gene::Down if up_down => Gene::Up,
            Gene::Left if left_right => Gene::Right,
            Gene::Right if left_right => Gene::Left,
            other => other,
        }
    }
}

/// The `|`-delimited suffix of a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeMeta {
    /// Speed rolled for this genome.
    pub speed: i32,
    /// Mutation chance percent rolled for this genome.
    pub mutation_chance_percent: u32,
    /// Propulsion direction given to every cell.
    pub propulsion: Direction,
    /// Movement cadence override; only set for RANDOM propulsion.
    pub steps_before_direction_change: Option<u32>,
}

/// A decoded genome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genome {
    body: Vec<Gene>,
    meta: GenomeMeta,
}

impl Genome {
    /// Builds a genome, checking that the body alternates correctly.
    pub fn new(body: Vec<Gene>, meta: GenomeMeta) -> Result<Self, GenomeError> {
        validate_body(&body)?;
        Ok(Self { body, meta })
    }

    /// The single-cell genome of a seed organism.
    pub fn seed(speed: i32, mutation_chance_percent: u32, propulsion: Direction) -> Self {
        Self {
            body: vec![Gene::Cell],
            meta: GenomeMeta {
                speed,
                mutation_chance_percent,
                propulsion,
                steps_before_direction_change: None,
            },
        }
    }

    /// Decodes a body on its own, e.g. the prefix kept in a history record.
    pub fn parse_body(text: &str) -> Result<Vec<Gene>, GenomeError> {
        let body = text
            .chars()
            .enumerate()
            .map(|(index, symbol)| {
                Gene::from_symbol(symbol).ok_or(GenomeError::UnknownSymbol { symbol, index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        validate_body(&body)?;
        Ok(body)
    }

    /// The body tokens.
    pub fn body(&self) -> &[Gene] {
        &self.body
    }

    /// The metadata suffix.
    pub fn meta(&self) -> &GenomeMeta {
        &self.meta
    }

    /// The body encoded as symbols, without metadata.
    pub fn prefix(&self) -> String {
        encode_body(&self.body)
    }

    /// Number of cell markers in the body.
    pub fn cell_count(&self) -> usize {
        self.body.iter().filter(|g| **g == Gene::Cell).count()
    }

    /// Produces a mutated child genome.
    ///
    /// `inherited` is the propulsion kept when the movement coin does not
    /// call for a new direction.
    pub fn mutate(&self, inherited: Direction, rng: &SharedRng) -> Result<Self, GenomeError> {
        operators::mutate(&self.body, inherited, rng)
    }

    /// Lays the body out as cell positions; see [`translate`].
    pub fn translate(
        &self,
        parent: Option<(&[Position], &Bounds)>,
    ) -> Result<Vec<Position>, GenomeError> {
        translate(&self.body, parent)
    }
}

/// Encodes a token body as symbols.
pub fn encode_body(body: &[Gene]) -> String {
    body.iter().map(|g| g.symbol()).collect()
}

fn validate_body(body: &[Gene]) -> Result<(), GenomeError> {
    if body.is_empty() {
        return Err(GenomeError::Empty);
    }
    if let Some(index) = body
        .iter()
        .enumerate()
        .position(|(i, g)| g.is_step() != (i % 2 == 1))
    {
        return Err(GenomeError::Misaligned(index));
    }
    if body.len() % 2 == 0 {
        return Err(GenomeError::Misaligned(body.len() - 1));
    }
    Ok(())
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps = self
            .meta
            .steps_before_direction_change
            .map_or(-1, i64::from);
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}",
            encode_body(&self.body),
            self.meta.speed,
            self.meta.mutation_chance_percent,
            self.meta.propulsion,
            steps
        )
    }
}

impl FromStr for Genome {
    type Err = GenomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(DELIMITER);
        let body = Genome::parse_body(parts.next().unwrap_or_default())?;

        let speed = parts.next().ok_or(GenomeError::MissingMetadata)?;
        let speed = speed.trim().parse().map_err(|_| GenomeError::BadField {
            field: "speed",
            value: speed.to_string(),
        })?;

        let percent = parts.next().ok_or(GenomeError::MissingMetadata)?;
        let mutation_chance_percent =
            percent.trim().parse().map_err(|_| GenomeError::BadField {
                field: "mutation chance percent",
                value: percent.to_string(),
            })?;

        let direction = parts.next().ok_or(GenomeError::MissingMetadata)?;
        let propulsion = direction.parse().map_err(|_| GenomeError::BadField {
            field: "propulsion",
            value: direction.to_string(),
        })?;

        // Seed genomes written without the cadence field are treated as -1.
        let steps_before_direction_change = match parts.next() {
            None => None,
            Some(raw) => {
                let steps: i64 = raw.trim().parse().map_err(|_| GenomeError::BadField {
                    field: "steps before direction change",
                    value: raw.to_string(),
                })?;
                u32::try_from(steps).ok().filter(|s| *s > 0)
            }
        };

        Genome::new(
            body,
            GenomeMeta {
                speed,
                mutation_chance_percent,
                propulsion,
                steps_before_direction_change,
            },
        )
    }
}
