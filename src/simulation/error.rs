//! Error types for the simulation.
//!
//! Genome and history codecs have their own error enums; everything else
//! surfaces as a [`SimulationError`].

use thiserror::Error;

use super::organism::OrganismId;
use super::runner::RunState;

/// Errors raised while decoding, mutating or placing a genome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenomeError {
    /// The symbol body is empty.
    #[error("genome body is empty")]
    Empty,

    /// A character that is not a cell marker or direction symbol.
    #[error("unknown genome symbol '{symbol}' at index {index}")]
    UnknownSymbol {
        /// The offending character.
        symbol: char,
        /// Index within the body.
        index: usize,
    },

    /// Cell markers and direction symbols do not alternate.
    #[error("cell markers and directions do not alternate at index {0}")]
    Misaligned(usize),

    /// The `|`-delimited metadata suffix is missing.
    #[error("genome has no metadata suffix")]
    MissingMetadata,

    /// A metadata field could not be parsed.
    #[error("invalid genome metadata field {field}: '{value}'")]
    BadField {
        /// Field name.
        field: &'static str,
        /// Raw text.
        value: String,
    },

    /// Every translated cell fell outside the world, from both anchors.
    #[error("no in-bounds placement for a genome with {cells} cells")]
    NoRoom {
        /// Number of cells the genome describes.
        cells: usize,
    },
}

/// Errors raised by the history record codec.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// A line does not have exactly three fields.
    #[error("line {line}: expected 3 fields, found {found}")]
    FieldCount {
        /// One-based line number.
        line: usize,
        /// Number of fields present.
        found: usize,
    },

    /// A numeric field failed to parse.
    #[error("line {line}: invalid {field} '{value}'")]
    BadNumber {
        /// One-based line number.
        line: usize,
        /// Field name.
        field: &'static str,
        /// Raw text.
        value: String,
    },

    /// The genome prefix failed to decode.
    #[error("line {line}: {source}")]
    Genome {
        /// One-based line number.
        line: usize,
        /// Underlying genome error.
        source: GenomeError,
    },

    /// File system errors.
    #[error("history file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main error type for simulation operations.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// The injected configuration cannot describe a workable world.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The boundary reversal loop did not settle.
    ///
    /// This only happens when an organism cannot fit between the borders in
    /// either direction, which means the world is too small for it.
    #[error("organism {organism:?} still collides with the boundary after {attempts} reversals")]
    BoundaryDeadlock {
        /// The organism that could not move.
        organism: OrganismId,
        /// Reversal passes attempted.
        attempts: u32,
    },

    /// A run-state command that is not valid in the current state.
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        /// State the simulation was in.
        from: RunState,
        /// The rejected command.
        action: &'static str,
    },

    /// Genome errors.
    #[error("genome error: {0}")]
    Genome(#[from] GenomeError),

    /// History errors.
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// File system errors.
    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    /// Creates a configuration error.
    #[must_use]
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimulationError>;
