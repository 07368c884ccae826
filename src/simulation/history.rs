//! Replay history of a lineage.
//!
//! A history is an ordered list of records, one per ancestor, written one
//! per line with the fields joined by `$`:
//!
//! ```text
//! c>cvc$4$1
//! c$0$0
//! ```
//!
//! The first field is the genome body without its metadata suffix, followed
//! by the generation and the mutation count.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{GenomeError, HistoryError};
use super::genome::{Genome, translate};
use super::position::Position;

/// Field separator within a record line.
pub const RECORD_DELIMITER: char = '$';
/// File extension used for history files.
pub const HISTORY_EXTENSION: &str = "evohistory";

/// One ancestor in a lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Genome body, metadata stripped.
    pub genome_prefix: String,
    /// Generation of the ancestor.
    pub generation: u32,
    /// Mutations accumulated by the ancestor.
    pub mutation_count: u32,
}

impl HistoryRecord {
    /// Builds a record from a genome and its owner's counters.
    pub fn new(genome: &Genome, generation: u32, mutation_count: u32) -> Self {
        Self {
            genome_prefix: genome.prefix(),
            generation,
            mutation_count,
        }
    }

    /// Number of cells the recorded genome describes.
    pub fn cell_count(&self) -> usize {
        self.genome_prefix.chars().filter(|c| *c == 'c').count()
    }

    /// Cell positions of the recorded genome, laid out from (0, 0).
    pub fn shape(&self) -> Result<Vec<Position>, GenomeError> {
        let body = Genome::parse_body(&self.genome_prefix)?;
        translate(&body, None)
    }

    fn parse_line(line: usize, text: &str) -> Result<Self, HistoryError> {
        let fields: Vec<&str> = text.split(RECORD_DELIMITER).collect();
        let &[prefix, generation, mutation_count] = fields.as_slice() else {
            return Err(HistoryError::FieldCount {
                line,
                found: fields.len(),
            });
        };

        Genome::parse_body(prefix).map_err(|source| HistoryError::Genome { line, source })?;
        let number = |field: &'static str, value: &str| {
            value.trim().parse::<u32>().map_err(|_| HistoryError::BadNumber {
                line,
                field,
                value: value.to_string(),
            })
        };

        Ok(Self {
            genome_prefix: prefix.to_string(),
            generation: number("generation", generation)?,
            mutation_count: number("mutation count", mutation_count)?,
        })
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{RECORD_DELIMITER}{}{RECORD_DELIMITER}{}",
            self.genome_prefix, self.generation, self.mutation_count
        )
    }
}

/// An ordered lineage, most recent organism first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    /// Wraps an ordered list of records.
    pub fn new(records: Vec<HistoryRecord>) -> Self {
        Self { records }
    }

    /// The records in order.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Encodes every record, one per line.
    pub fn to_text(&self) -> String {
        self.records
            .iter()
            .map(|r| format!("{r}\n"))
            .collect()
    }

    /// Decodes a text produced by [`History::to_text`].
    ///
    /// Blank lines are skipped; line numbers in errors are one-based.
    pub fn parse(text: &str) -> Result<Self, HistoryError> {
        let records = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| HistoryRecord::parse_line(i + 1, line.trim_end_matches('\r')))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    /// Writes the history to a file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), HistoryError> {
        std::fs::write(path, self.to_text())?;
        Ok(())
    }

    /// Reads a history file.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}
