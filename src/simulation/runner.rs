//! Run-state machine driving the environment.
//!
//! ```text
//! RESET --start--> RUNNING <--pause/resume--> PAUSED
//!                  RUNNING <--fast_forward--> FASTFORWARD
//! RUNNING/FASTFORWARD --last organism dies--> EXTINCT --reset--> RESET
//! RUNNING/FASTFORWARD --tick fails--> HALTED --reset--> RESET
//! ```
//!
//! Pausing from FASTFORWARD resumes into FASTFORWARD. Starting from EXTINCT
//! or HALTED resets first. Every transition is broadcast to subscribers.

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::config::SimulationConfig;
use super::environment::{Census, Environment};
use super::error::{Result, SimulationError};
use super::food_drop::FoodDropper;
use super::history::History;

/// Delay between ticks when running at normal speed.
pub const FRAME_DELAY: Duration = Duration::from_millis(16);

/// Where the simulation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// Empty world, waiting to start.
    Reset,
    /// Ticking at normal speed.
    Running,
    /// Not ticking; food drops suspended.
    Paused,
    /// Ticking without frame delay.
    FastForward,
    /// Every organism has died.
    Extinct,
    /// A tick failed; the world is kept for inspection but never ticks again.
    Halted,
}

impl RunState {
    /// Whether ticks advance the world in this state.
    pub fn is_ticking(self) -> bool {
        matches!(self, RunState::Running | RunState::FastForward)
    }

    /// Pause a driver should leave between ticks in this state.
    pub fn frame_delay(self) -> Duration {
        match self {
            RunState::Running => FRAME_DELAY,
            _ => Duration::ZERO,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Reset => "RESET",
            RunState::Running => "RUNNING",
            RunState::Paused => "PAUSED",
            RunState::FastForward => "FASTFORWARD",
            RunState::Extinct => "EXTINCT",
            RunState::Halted => "HALTED",
        };
        f.write_str(name)
    }
}

/// A simulation: an environment, its food-drop loop and its run state.
#[derive(Debug)]
pub struct Simulation {
    environment: Environment,
    state: RunState,
    resume_state: RunState,
    dropper: Option<FoodDropper>,
    subscribers: Vec<Sender<RunState>>,
}

impl Simulation {
    /// Creates a simulation in the RESET state.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Ok(Self {
            environment: Environment::new(config)?,
            state: RunState::Reset,
            resume_state: RunState::Running,
            dropper: None,
            subscribers: Vec::new(),
        })
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Receives every subsequent state transition.
    pub fn subscribe(&mut self) -> Receiver<RunState> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// The environment being simulated.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Mutable access to the environment.
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// Live counts.
    pub fn census(&self) -> Census {
        self.environment.census()
    }

    /// Ancestry of the last organism to die, after extinction.
    pub fn ancestry(&self) -> Option<History> {
        self.environment.extinction_history()
    }

    /// Populates the world, starts the food-drop loop and begins running.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            RunState::Reset => {}
            RunState::Extinct | RunState::Halted => self.reset(),
            from => {
                return Err(SimulationError::InvalidTransition {
                    from,
                    action: "start",
                });
            }
        }

        self.environment.populate();
        let env = &self.environment;
        self.dropper = Some(FoodDropper::spawn(
            Arc::clone(env.context()),
            Arc::clone(env.food_store()),
            Arc::clone(env.pacer()),
            env.drop_settings(),
        ));
        self.transition(RunState::Running);
        Ok(())
    }

    /// Stops ticking and suspends food drops.
    pub fn pause(&mut self) -> Result<()> {
        if !self.state.is_ticking() {
            return Err(SimulationError::InvalidTransition {
                from: self.state,
                action: "pause",
            });
        }
        self.resume_state = self.state;
        self.set_food_drop(false);
        self.transition(RunState::Paused);
        Ok(())
    }

    /// Resumes ticking at the speed it was paused at.
    pub fn resume(&mut self) -> Result<()> {
        if self.state != RunState::Paused {
            return Err(SimulationError::InvalidTransition {
                from: self.state,
                action: "resume",
            });
        }
        self.set_food_drop(true);
        self.transition(self.resume_state);
        Ok(())
    }

    /// Switches between RUNNING and FASTFORWARD.
    pub fn toggle_fast_forward(&mut self) -> Result<()> {
        let next = match self.state {
            RunState::Running => RunState::FastForward,
            RunState::FastForward => RunState::Running,
            from => {
                return Err(SimulationError::InvalidTransition {
                    from,
                    action: "fast forward",
                });
            }
        };
        self.transition(next);
        Ok(())
    }

    /// Stops the food-drop loop and empties the world.
    ///
    /// Valid from any state.
    pub fn reset(&mut self) {
        self.stop_food_drop();
        self.environment.clear();
        self.resume_state = RunState::Running;
        self.transition(RunState::Reset);
    }

    /// Advances one tick if the simulation is ticking.
    ///
    /// Returns the state after the tick. A tick that leaves no organisms moves
    /// the simulation to EXTINCT and stops the food-drop loop. A tick that
    /// fails moves it to HALTED, stops the food-drop loop and returns the
    /// error.
    pub fn tick(&mut self) -> Result<RunState> {
        if !self.state.is_ticking() {
            return Ok(self.state);
        }

        if let Err(e) = self.environment.tick() {
            error!(error = %e, "tick failed, halting");
            self.stop_food_drop();
            self.transition(RunState::Halted);
            return Err(e);
        }

        if self.environment.organism_count() == 0 {
            self.stop_food_drop();
            let census = self.environment.census();
            info!(
                tick = census.tick,
                highest_generation = census.highest_generation,
                last = ?self.environment.last_to_die(),
                "extinct"
            );
            self.transition(RunState::Extinct);
        }
        Ok(self.state)
    }

    /// Ticks until extinction or until `max_ticks` ticks have run.
    ///
    /// Returns the number of ticks run.
    pub fn run_for(&mut self, max_ticks: u64) -> Result<u64> {
        let mut ran = 0;
        while ran < max_ticks && self.state.is_ticking() {
            self.tick()?;
            ran += 1;
        }
        Ok(ran)
    }

    /// Whether the food-drop loop is running and allowed to drop.
    pub fn food_drop_active(&self) -> bool {
        self.dropper.as_ref().is_some_and(FoodDropper::is_allowed)
    }

    fn set_food_drop(&self, allowed: bool) {
        if let Some(dropper) = &self.dropper {
            dropper.set_allowed(allowed);
        }
    }

    fn stop_food_drop(&mut self) {
        if let Some(mut dropper) = self.dropper.take() {
            dropper.stop();
        }
    }

    fn transition(&mut self, next: RunState) {
        if self.state == next {
            return;
        }
        info!(from = %self.state, to = %next, "run state changed");
        self.state = next;
        self.subscribers.retain(|tx| tx.send(next).is_ok());
    }
}
