//! Process-wide mutable state made explicit.
//!
//! The shared random generator, id allocators and the highest generation seen
//! so far all live in one [`SimulationContext`] that is passed by reference to
//! every operation that needs them.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::cell::CellId;
use super::food::FoodId;
use super::organism::OrganismId;

/// A random generator shared by all worker threads.
///
/// Each draw takes the lock for exactly one sample, so two callers can never
/// interleave inside a single draw. Drawing never fails: a poisoned lock is
/// recovered because the generator state is always valid.
#[derive(Debug)]
pub struct SharedRng {
    inner: Mutex<StdRng>,
}

impl SharedRng {
    /// Creates a generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            inner: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draws an integer from `min..max`.
    ///
    /// Returns `min` when the range is empty.
    pub fn range(&self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let mut rng = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_range(min..max)
    }

    /// A fair coin flip.
    pub fn coin(&self) -> bool {
        self.range(0, 2) == 1
    }
}

/// Shared state threaded through every simulation operation.
#[derive(Debug)]
pub struct SimulationContext {
    rng: SharedRng,
    next_organism: AtomicU64,
    next_cell: AtomicU64,
    next_food: AtomicU64,
    highest_generation: AtomicU32,
}

impl SimulationContext {
    /// Creates a context, seeded when `seed` is given.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(SharedRng::from_entropy, SharedRng::seeded);
        Self {
            rng,
            next_organism: AtomicU64::new(0),
            next_cell: AtomicU64::new(0),
            next_food: AtomicU64::new(0),
            highest_generation: AtomicU32::new(0),
        }
    }

    /// The shared random generator.
    pub fn rng(&self) -> &SharedRng {
        &self.rng
    }

    /// Allocates a fresh organism id.
    pub fn next_organism_id(&self) -> OrganismId {
        OrganismId(self.next_organism.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocates a fresh cell id.
    pub fn next_cell_id(&self) -> CellId {
        CellId(self.next_cell.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocates a fresh food id.
    pub fn next_food_id(&self) -> FoodId {
        FoodId(self.next_food.fetch_add(1, Ordering::Relaxed))
    }

    /// Raises the highest generation counter to `generation` if it is larger.
    pub fn record_generation(&self, generation: u32) {
        self.highest_generation.fetch_max(generation, Ordering::Relaxed);
    }

    /// Highest generation reached by any organism since the last reset.
    pub fn highest_generation(&self) -> u32 {
        self.highest_generation.load(Ordering::Relaxed)
    }

    /// Forgets the highest generation.
    pub fn reset_generation(&self) {
        self.highest_generation.store(0, Ordering::Relaxed);
    }
}
