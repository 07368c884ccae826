//! One step of organism movement.

use super::{LifeState, Organism};
use crate::simulation::context::SharedRng;
use crate::simulation::error::{Result, SimulationError};
use crate::simulation::geometric_utils::Bounds;
use crate::simulation::propulsion::Direction;

/// Energy burnt per cell per step, on top of the speed-dependent part.
const BASE_ENERGY_COST: f64 = 0.001;
/// Energy burnt per cell per unit of speed.
const SPEED_ENERGY_COST: f64 = 0.001;

impl Organism {
    /// Moves every cell one step and reports the resulting state.
    ///
    /// A killed organism reports [`LifeState::Dead`] without paying energy.
    /// Otherwise each cell shifts by `speed` along its effective direction.
    /// If any cell lands on the world boundary, every cell's direction is
    /// reversed and the pass is repeated from where the cells ended up. The
    /// loop is bounded by `max_retries`; exceeding it means the organism
    /// cannot fit in the world in either direction and is reported as
    /// [`SimulationError::BoundaryDeadlock`].
    ///
    /// Wandering cells reroll a shared axis direction once the organism has
    /// taken `steps_before_direction_change` steps. The step costs
    /// `(0.001 * speed + 0.001)` per cell, so even stationary organisms starve.
    ///
    /// # Arguments
    ///
    /// * `bounds` - World interior
    /// * `max_retries` - Reversal passes allowed before giving up
    /// * `rng` - Shared generator used when rerolling a wandering direction
    pub fn advance(&mut self, bounds: &Bounds, max_retries: u32, rng: &SharedRng) -> Result<LifeState> {
        if self.is_killed() {
            return Ok(LifeState::Dead);
        }

        self.steps_taken += 1;
        let speed = self.speed;
        let mut attempts = 0;

        loop {
            let mut collided = false;
            let mut wandering = false;
            let mut fixed = false;

            for cell in self.cells_mut() {
                if cell.propulsion.is_random() {
                    wandering = true;
                } else {
                    fixed = true;
                }
                let (dx, dy) = cell.propulsion.effective().delta();
                if dx != 0 {
                    cell.shift_x(dx * speed);
                }
                if dy != 0 {
                    cell.shift_y(dy * speed);
                }
                collided |= bounds.collides(cell.position);
            }

            if fixed {
                self.steps_taken = 0;
            }

            if !collided {
                if wandering && self.steps_taken >= self.steps_before_direction_change {
                    let heading = Direction::random_axis(rng);
                    for cell in self.cells_mut() {
                        cell.propulsion.current = heading;
                    }
                    self.steps_taken = 0;
                }
                break;
            }

            attempts += 1;
            if attempts > max_retries {
                return Err(SimulationError::BoundaryDeadlock {
                    organism: self.id,
                    attempts,
                });
            }
            for cell in self.cells_mut() {
                cell.propulsion.reverse();
            }
        }

        let speed_cost = SPEED_ENERGY_COST * f64::from(speed);
        self.energy -= (speed_cost + BASE_ENERGY_COST) * self.cell_count() as f64;
        Ok(self.life_state())
    }
}
