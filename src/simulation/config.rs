//! Simulation configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{Result, SimulationError};
use super::geometric_utils::{Bounds, PLACEMENT_MARGIN};

/// Read-only parameters injected when a simulation is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Full world width, border included.
    pub world_width: i32,
    /// Full world height, border included.
    pub world_height: i32,
    /// Border shaved off each side of the world.
    pub border_thickness: i32,
    /// Whether children may mutate on replication.
    pub mutation_allowed: bool,
    /// Energy gained from one food item.
    pub food_value: f64,
    /// Seconds a food item lives before expiring.
    pub food_expiry_seconds: u64,
    /// Food items dropped per batch.
    pub food_rate: usize,
    /// Ticks the food-drop loop waits between batches.
    pub ticks_per_food_drop: u32,
    /// Seed organisms placed on start.
    pub initial_organisms: usize,
    /// Food items placed on start.
    pub initial_food: usize,
    /// Whether organisms sharing a position fight.
    pub collision_detection: bool,
    /// Seed for the shared generator; drawn from the OS when absent.
    pub seed: Option<u64>,
    /// Reversal passes a move may take before it is treated as stuck.
    pub max_boundary_retries: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_width: 500,
            world_height: 500,
            border_thickness: 5,
            mutation_allowed: true,
            food_value: 1.0,
            food_expiry_seconds: 60,
            food_rate: 10,
            ticks_per_food_drop: 100,
            initial_organisms: 20,
            initial_food: 200,
            collision_detection: true,
            seed: None,
            max_boundary_retries: 8,
        }
    }
}

impl SimulationConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// The world interior, border removed.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_world(self.world_width, self.world_height, self.border_thickness)
    }

    /// Lifetime of a food item.
    pub fn food_ttl(&self) -> Duration {
        Duration::from_secs(self.food_expiry_seconds)
    }

    /// Rejects configurations that cannot describe a workable world.
    pub fn validate(&self) -> Result<()> {
        let bounds = self.bounds();
        if bounds.width <= PLACEMENT_MARGIN * 2 || bounds.height <= PLACEMENT_MARGIN * 2 {
            return Err(SimulationError::invalid_config(format!(
                "world interior {}x{} leaves no room for random placement",
                bounds.width, bounds.height
            )));
        }
        if self.border_thickness < 0 {
            return Err(SimulationError::invalid_config(
                "border thickness must not be negative",
            ));
        }
        if self.ticks_per_food_drop == 0 {
            return Err(SimulationError::invalid_config(
                "ticks_per_food_drop must be at least 1",
            ));
        }
        if self.max_boundary_retries == 0 {
            return Err(SimulationError::invalid_config(
                "max_boundary_retries must be at least 1",
            ));
        }
        if !self.food_value.is_finite() {
            return Err(SimulationError::invalid_config("food_value must be finite"));
        }
        Ok(())
    }
}
