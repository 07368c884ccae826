//! Spatial indexing for collision lookups.
//!
//! The occupancy index maps a lattice position to every organism with a cell
//! there. It is filled during the move phase of a tick, read during the
//! collision phase and cleared before the next tick, so it never carries
//! positions over from a previous tick.

use std::collections::HashMap;

use super::locatable::Locatable;
use super::organism::OrganismId;
use super::position::Position;

/// Per-tick map from position to the organisms occupying it.
#[derive(Debug, Default)]
pub struct OccupancyIndex {
    occupants: HashMap<Position, Vec<OrganismId>>,
}

impl OccupancyIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `owner` at the position of every item.
    pub fn insert_all<'a, L, I>(&mut self, owner: OrganismId, items: I)
    where
        L: Locatable + 'a,
        I: IntoIterator<Item = &'a L>,
    {
        for item in items {
            self.occupants
                .entry(item.position())
                .or_default()
                .push(owner);
        }
    }

    /// Organisms recorded at `key`, in insertion order.
    pub fn occupants(&self, key: Position) -> &[OrganismId] {
        self.occupants.get(&key).map_or(&[], Vec::as_slice)
    }

    /// Number of occupied positions.
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.occupants.clear();
    }
}
