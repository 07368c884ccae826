//! Event system for thread-safe simulation state updates.
//!
//! Organisms move in parallel and may only touch themselves while doing so.
//! Anything that changes the organism table (a birth or a death) is pushed
//! to an event queue and applied serially once every organism has moved.

use tracing::debug;

use super::environment::Environment;
use super::organism::{Organism, OrganismId};

/// Events that modify the organism table.
#[derive(Debug)]
pub enum SimulationEvent {
    /// A replicating organism produced a child.
    Born(Box<Organism>),
    /// An organism ran out of energy or lost a collision.
    Died {
        /// ID of the organism that died.
        organism_id: OrganismId,
    },
}

/// Queue for collecting simulation events from parallel updates.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<SimulationEvent>,
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Adds an event to the queue.
    pub fn push(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drains all events from the queue.
    pub fn drain(&mut self) -> std::vec::Drain<'_, SimulationEvent> {
        self.events.drain(..)
    }
}

/// Applies all queued events to the environment.
///
/// Births are applied before deaths so that a tick in which the last parent
/// dies while its child is born never reports extinction.
pub fn apply_events(env: &mut Environment, mut queue: EventQueue) {
    let mut deaths = Vec::new();
    let mut births = 0;

    for event in queue.drain() {
        match event {
            SimulationEvent::Born(child) => {
                env.insert_organism(*child);
                births += 1;
            }
            SimulationEvent::Died { organism_id } => deaths.push(organism_id),
        }
    }

    for organism_id in &deaths {
        env.remove_dead(*organism_id);
    }

    if births > 0 || !deaths.is_empty() {
        debug!(births, deaths = deaths.len(), "applied organism events");
    }
}
