use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::simulation::cell::{Cell, CellGroup};
use crate::simulation::context::SimulationContext;
use crate::simulation::genome::Genome;
use crate::simulation::position::Position;
use crate::simulation::propulsion::{Direction, Propulsion};

/// Energy a seed organism starts with.
pub const SEED_ENERGY: f64 = 5.0;
/// Mutation chance percent given to seed organisms.
pub const DEFAULT_MUTATION_CHANCE_PERCENT: u32 = 2;
/// Steps a wandering organism follows one direction before rerolling it.
pub const DEFAULT_STEPS_BEFORE_DIRECTION_CHANGE: u32 = 20;
/// Energy per cell needed before an organism replicates.
pub const REPLICATION_ENERGY_PER_CELL: f64 = 10.0;

/// Identifier of an organism, unique for the lifetime of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganismId(pub u64);

/// What an organism did during its last step.
///
/// Recomputed on every move and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeState {
    /// Still alive, nothing else to do.
    Alive,
    /// Out of energy or killed in a collision.
    Dead,
    /// Has enough energy to split.
    Replicating,
}

/// A living, multi-cell organism.
///
/// Organisms are owned by the environment's table and address their relatives
/// by id only: `parent` is a weak back-reference that may point to an organism
/// that has already died, and `children` lists every id this organism has
/// produced.
#[derive(Debug)]
pub struct Organism {
    /// Unique identifier.
    pub id: OrganismId,
    /// Genome the current layout was derived from.
    pub genome: Genome,
    /// Cells grouped as laid out; never empty while alive.
    pub cell_groups: Vec<CellGroup>,
    /// Remaining energy.
    pub energy: f64,
    /// Combat strength, fixed at birth.
    pub force: u32,
    /// Number of replications between this organism and its seed.
    pub generation: u32,
    /// Number of successful mutations along the lineage.
    pub mutation_count: u32,
    /// Trials run by the mutation gate on replication.
    pub mutation_chance_percent: u32,
    /// Cells moved per step.
    pub speed: i32,
    /// The organism this one split from, if any.
    pub parent: Option<OrganismId>,
    /// Organisms this one has split into.
    pub children: Vec<OrganismId>,
    /// Steps taken since the wandering direction was last rolled.
    pub(super) steps_taken: u32,
    /// Steps before a wandering organism rerolls its direction.
    pub steps_before_direction_change: u32,
    killed: AtomicBool,
}

impl Organism {
    /// Creates a single-cell seed organism with no parent.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Context used to allocate ids
    /// * `position` - Where the only cell starts
    /// * `direction` - Propulsion fitted to the cell
    /// * `speed` - Cells moved per step
    pub fn seed(
        ctx: &SimulationContext,
        position: Position,
        direction: Direction,
        speed: i32,
    ) -> Self {
        let cell = Cell::new(ctx.next_cell_id(), position, Propulsion::new(direction));
        let genome = Genome::seed(speed, DEFAULT_MUTATION_CHANCE_PERCENT, direction);
        let mut organism = Self {
            id: ctx.next_organism_id(),
            genome,
            cell_groups: vec![CellGroup::new(vec![cell])],
            energy: SEED_ENERGY,
            force: 0,
            generation: 0,
            mutation_count: 0,
            mutation_chance_percent: DEFAULT_MUTATION_CHANCE_PERCENT,
            speed,
            parent: None,
            children: Vec::new(),
            steps_taken: 0,
            steps_before_direction_change: DEFAULT_STEPS_BEFORE_DIRECTION_CHANGE,
            killed: AtomicBool::new(false),
        };
        organism.force = organism.compute_force();
        organism
    }

    /// Replaces the starting energy.
    #[must_use]
    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = energy;
        self
    }

    /// Replaces the mutation chance percent.
    #[must_use]
    pub fn with_mutation_chance_percent(mut self, percent: u32) -> Self {
        self.mutation_chance_percent = percent;
        self
    }

    /// Builds an organism from its parts; used by replication.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn from_parts(
        id: OrganismId,
        genome: Genome,
        cell_groups: Vec<CellGroup>,
        energy: f64,
        generation: u32,
        mutation_count: u32,
        mutation_chance_percent: u32,
        speed: i32,
        parent: OrganismId,
    ) -> Self {
        Self {
            id,
            genome,
            cell_groups,
            energy,
            force: 0,
            generation,
            mutation_count,
            mutation_chance_percent,
            speed,
            parent: Some(parent),
            children: Vec::new(),
            steps_taken: 0,
            steps_before_direction_change: DEFAULT_STEPS_BEFORE_DIRECTION_CHANGE,
            killed: AtomicBool::new(false),
        }
    }

    /// Size of the first cell group times the speed, with speed 0 counted as 1.
    pub(super) fn compute_force(&self) -> u32 {
        let first_group = self.cell_groups.first().map_or(0, CellGroup::len) as u32;
        first_group * self.speed.max(1).unsigned_abs()
    }

    /// Iterates over every cell in every group.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cell_groups.iter().flat_map(|g| g.cells.iter())
    }

    /// Mutable iteration over every cell.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cell_groups.iter_mut().flat_map(|g| g.cells.iter_mut())
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cell_groups.iter().map(CellGroup::len).sum()
    }

    /// Current positions of every cell.
    pub fn cell_positions(&self) -> Vec<Position> {
        self.cells().map(|c| c.position).collect()
    }

    /// Energy needed before this organism replicates.
    pub fn replication_threshold(&self) -> f64 {
        self.cell_count() as f64 * REPLICATION_ENERGY_PER_CELL
    }

    /// Adds the nutrition of a food item.
    pub fn consume(&mut self, amount: f64) {
        self.energy += amount;
    }

    /// Marks the organism as killed in a collision.
    ///
    /// Takes `&self` so the collision phase can mark organisms while other
    /// workers are reading them.
    pub fn mark_killed(&self) {
        self.killed.store(true, Ordering::Release);
    }

    /// Whether the organism lost a collision.
    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::Acquire)
    }

    /// Classifies the organism by its current energy.
    pub fn life_state(&self) -> LifeState {
        if self.energy <= 0.0 {
            LifeState::Dead
        } else if self.energy >= self.replication_threshold() {
            LifeState::Replicating
        } else {
            LifeState::Alive
        }
    }
}
