//! Splitting an organism in two.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::Organism;
use crate::simulation::cell::{Cell, CellGroup};
use crate::simulation::context::{SharedRng, SimulationContext};
use crate::simulation::error::GenomeError;
use crate::simulation::geometric_utils::Bounds;
use crate::simulation::propulsion::{Direction, Propulsion};

/// Exclusive upper bound of each draw made by the mutation gate.
const MUTATION_DRAW_RANGE: i32 = 200;

/// Rules a replication needs from the world it happens in.
#[derive(Debug, Clone, Copy)]
pub struct ReplicationRules {
    /// World interior, used to place mutated children.
    pub bounds: Bounds,
    /// Whether children may mutate at all.
    pub mutation_allowed: bool,
}

impl Organism {
    /// Rolls the mutation gate.
    ///
    /// Runs `mutation_chance_percent` trials; each draws two fresh numbers
    /// from `0..200` and succeeds if they are equal. The resulting chance is
    /// well below the nominal percent.
    pub fn should_mutate(&self, rng: &SharedRng) -> bool {
        (0..self.mutation_chance_percent)
            .any(|_| rng.range(0, MUTATION_DRAW_RANGE) == rng.range(0, MUTATION_DRAW_RANGE))
    }

    /// Splits off a child organism.
    ///
    /// Energy is halved and shared equally. The child copies the parent's
    /// layout cell for cell under fresh ids, inherits speed, mutation chance
    /// and mutation count, and sits one generation deeper. A child of a
    /// fixed-direction parent is given a different axis direction; wandering
    /// and stationary parents pass theirs through.
    ///
    /// When mutation is allowed and the gate fires, the genome is mutated and
    /// laid out again away from the parent. A mutation that fails is logged
    /// and the child keeps the copied layout.
    pub fn replicate(&mut self, ctx: &SimulationContext, rules: &ReplicationRules) -> Organism {
        let rng = ctx.rng();
        let generation = self.generation + 1;
        ctx.record_generation(generation);

        let energy = self.energy / 2.0;
        self.energy = energy;

        let inherited = self
            .cells()
            .next()
            .map_or(Direction::None, |c| c.propulsion.assigned);
        let assigned = if inherited.is_axis() {
            Direction::random_axis_except(rng, inherited)
        } else {
            inherited
        };

        let cell_groups = self
            .cell_groups
            .iter()
            .map(|group| {
                CellGroup::new(
                    group
                        .cells
                        .iter()
                        .map(|cell| {
                            let mut copy = Cell::new(ctx.next_cell_id(), cell.position, cell.propulsion);
                            copy.prev_position = cell.prev_position;
                            copy.propulsion.assigned = assigned;
                            copy
                        })
                        .collect(),
                )
            })
            .collect();

        let mut child = Organism::from_parts(
            ctx.next_organism_id(),
            self.genome.clone(),
            cell_groups,
            energy,
            generation,
            self.mutation_count,
            self.mutation_chance_percent,
            self.speed,
            self.id,
        );

        if rules.mutation_allowed && child.should_mutate(rng) {
            match child.apply_mutation(ctx, self, inherited, &rules.bounds) {
                Ok(()) => {
                    child.mutation_count += 1;
                    debug!(
                        parent = self.id.0,
                        child = child.id.0,
                        genome = %child.genome,
                        "mutated on replication"
                    );
                }
                Err(e) => warn!(parent = self.id.0, error = %e, "mutation failed, keeping parent layout"),
            }
        }

        child.force = child.compute_force();
        self.children.push(child.id);
        child
    }

    /// Replaces the child's genome and cells with a mutated layout.
    ///
    /// Leaves the child untouched on error.
    fn apply_mutation(
        &mut self,
        ctx: &SimulationContext,
        parent: &Organism,
        inherited: Direction,
        bounds: &Bounds,
    ) -> Result<(), GenomeError> {
        let genome = parent.genome.mutate(inherited, ctx.rng())?;
        let parent_positions = parent.cell_positions();
        let positions = genome.translate(Some((parent_positions.as_slice(), bounds)))?;

        let meta = *genome.meta();
        let mut seen = HashSet::new();
        let cells = positions
            .into_iter()
            .filter(|p| seen.insert(*p))
            .map(|p| Cell::new(ctx.next_cell_id(), p, Propulsion::new(meta.propulsion)))
            .collect();

        self.cell_groups = vec![CellGroup::new(cells)];
        if let Some(steps) = meta.steps_before_direction_change {
            self.steps_before_direction_change = steps;
        }
        self.genome = genome;
        Ok(())
    }
}
