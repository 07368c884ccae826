//! The world and its tick engine.
//!
//! The environment owns every organism and food item and advances them one
//! tick at a time in three phases separated by full barriers:
//!
//! 1. Every organism moves in parallel. Dead organisms and newborn children
//!    are queued as events and applied serially once all organisms have
//!    moved. Living organisms eat and, with collision detection on, record
//!    their cells in the occupancy index.
//! 2. With collision detection on, every organism checks its cells against
//!    the occupancy index in parallel and the weaker party of each overlap is
//!    marked killed. The index is cleared afterwards.
//! 3. The tick counter advances, the food-drop loop is told about the tick
//!    and expired food is swept.
//!
//! When both the organism table and the food store are needed, the table is
//! held first. Phase 1 workers never hold two locks at once.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::cell::CellId;
use super::config::SimulationConfig;
use super::context::SimulationContext;
use super::error::{Result, SimulationError};
use super::events::{EventQueue, SimulationEvent, apply_events};
use super::food::{ExpiryHook, Food, FoodId, FoodStore};
use super::food_drop::{DropSettings, TickPacer, place_food};
use super::genome::{MAX_SPEED, MIN_SPEED};
use super::geometric_utils::{Bounds, sweep_keys};
use super::history::{History, HistoryRecord};
use super::locatable::Locatable;
use super::organism::{LifeState, Organism, OrganismId, ReplicationRules};
use super::position::Position;
use super::propulsion::Direction;
use super::spatial::OccupancyIndex;

/// Live counts exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    /// Ticks completed since the last reset.
    pub tick: u64,
    /// Living organisms.
    pub organisms: usize,
    /// Food items on the ground.
    pub food: usize,
    /// Cell count of the largest living organism.
    pub largest_organism: usize,
    /// Highest generation reached since the last reset.
    pub highest_generation: u32,
}

/// A cell as seen by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    /// Cell id.
    pub id: CellId,
    /// Owning organism.
    pub organism: OrganismId,
    /// Current position.
    pub position: Position,
}

/// A food item as seen by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodView {
    /// Food id.
    pub id: FoodId,
    /// Position.
    pub position: Position,
}

/// Everything a renderer needs to draw one tick incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Tick the snapshot was taken after.
    pub tick: u64,
    /// Every living cell.
    pub cells: Vec<CellView>,
    /// Every food item.
    pub food: Vec<FoodView>,
    /// Cells removed since the previous snapshot.
    pub removed_cells: Vec<CellId>,
    /// Food removed since the previous snapshot.
    pub removed_food: Vec<FoodId>,
}

/// What the lineage archive remembers about every organism ever born.
#[derive(Debug, Clone)]
struct LineageEntry {
    record: HistoryRecord,
    parent: Option<OrganismId>,
}

/// The simulated world.
pub struct Environment {
    config: SimulationConfig,
    bounds: Bounds,
    ctx: Arc<SimulationContext>,
    organisms: HashMap<OrganismId, Organism>,
    food: Arc<Mutex<FoodStore>>,
    occupancy: Mutex<OccupancyIndex>,
    removed_cells: Vec<CellId>,
    lineage: HashMap<OrganismId, LineageEntry>,
    last_to_die: Option<OrganismId>,
    pacer: Arc<TickPacer>,
    expiry_hook: ExpiryHook,
    tick: u64,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bounds", &self.bounds)
            .field("tick", &self.tick)
            .field("organisms", &self.organisms.len())
            .field("last_to_die", &self.last_to_die)
            .finish_non_exhaustive()
    }
}

impl Environment {
    /// Creates an empty world with its own context.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let ctx = Arc::new(SimulationContext::new(config.seed));
        Self::with_context(config, ctx)
    }

    /// Creates an empty world sharing an existing context.
    pub fn with_context(config: SimulationConfig, ctx: Arc<SimulationContext>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            bounds: config.bounds(),
            config,
            ctx,
            organisms: HashMap::new(),
            food: Arc::new(Mutex::new(FoodStore::new())),
            occupancy: Mutex::new(OccupancyIndex::new()),
            removed_cells: Vec::new(),
            lineage: HashMap::new(),
            last_to_die: None,
            pacer: Arc::new(TickPacer::new()),
            expiry_hook: Arc::new(|food: &Food| trace!(food = food.id.0, "food expired")),
            tick: 0,
        })
    }

    /// Places the configured seed organisms and starting food.
    ///
    /// Seeds get unique random positions, a random direction and a random
    /// speed. If the world cannot hold that many distinct positions, only as
    /// many seeds as fit are placed.
    pub fn populate(&mut self) {
        let ctx = Arc::clone(&self.ctx);
        let rng = ctx.rng();
        let wanted = self
            .config
            .initial_organisms
            .min(self.bounds.placement_capacity());

        let mut taken = HashSet::with_capacity(wanted);
        while taken.len() < wanted {
            let position = self.bounds.random_position(rng);
            if !taken.insert(position) {
                continue;
            }
            let direction = Direction::random(rng);
            let speed = rng.range(MIN_SPEED, MAX_SPEED);
            self.insert_organism(Organism::seed(&ctx, position, direction, speed));
        }

        for _ in 0..self.config.initial_food {
            let position = self.bounds.random_position(rng);
            self.place_food(position);
        }

        debug!(
            organisms = self.organisms.len(),
            food = self.food_count(),
            "populated world"
        );
    }

    /// Adds an organism to the table and the lineage archive.
    pub fn insert_organism(&mut self, organism: Organism) {
        self.ctx.record_generation(organism.generation);
        self.lineage.insert(
            organism.id,
            LineageEntry {
                record: HistoryRecord::new(
                    &organism.genome,
                    organism.generation,
                    organism.mutation_count,
                ),
                parent: organism.parent,
            },
        );
        self.organisms.insert(organism.id, organism);
    }

    /// Removes a dead organism, leaving food at each of its cells.
    pub(crate) fn remove_dead(&mut self, id: OrganismId) {
        let Some(organism) = self.organisms.remove(&id) else {
            return;
        };

        {
            let mut store = lock(&self.food);
            for cell in organism.cells() {
                let food = Food::new(
                    self.ctx.next_food_id(),
                    cell.position,
                    self.config.food_value,
                    self.config.food_ttl(),
                );
                store.insert(food);
            }
        }

        self.removed_cells.extend(organism.cells().map(|c| c.id));
        if self.organisms.is_empty() {
            self.last_to_die = Some(id);
        }
    }

    /// Places one food item, unless the position already holds food.
    pub fn place_food(&self, position: Position) -> bool {
        place_food(
            &self.ctx,
            &self.food,
            position,
            self.config.food_value,
            self.config.food_ttl(),
        )
    }

    /// Replaces the callback run once for every expired food item.
    pub fn set_expiry_hook(&mut self, hook: ExpiryHook) {
        self.expiry_hook = hook;
    }

    /// Advances the world by one tick.
    ///
    /// A boundary deadlock in any organism fails the tick with an error. Every
    /// other organism still finishes its move, queued births and deaths are
    /// still applied and the occupancy index is emptied, but the collision
    /// phase is skipped and the tick counter does not advance.
    pub fn tick(&mut self) -> Result<()> {
        let (events, failure) = self.move_phase();
        apply_events(self, events);

        if let Some(e) = failure {
            lock(&self.occupancy).clear();
            return Err(e);
        }

        if self.config.collision_detection {
            self.collision_phase();
        }

        self.tick += 1;
        self.pacer.record_tick();
        let expired = self.sweep_expired_food();

        debug!(
            tick = self.tick,
            organisms = self.organisms.len(),
            expired,
            "tick complete"
        );
        Ok(())
    }

    /// Removes expired food and runs the expiry hook once per item.
    ///
    /// Called at the end of every tick and by [`Environment::snapshot`], so
    /// food also expires while the world is not ticking. Returns the number
    /// of items removed.
    pub fn sweep_expired_food(&self) -> usize {
        let expired = lock(&self.food).sweep_expired(Instant::now());
        for food in &expired {
            food.fire_expiry(&self.expiry_hook);
        }
        expired.len()
    }

    /// Moves every organism and collects births and deaths.
    ///
    /// Every organism is visited even after a boundary deadlock; the first
    /// such error is returned alongside the complete queue.
    fn move_phase(&mut self) -> (EventQueue, Option<SimulationError>) {
        let queue = Mutex::new(EventQueue::new());
        let failure = Mutex::new(None);
        let ctx = &*self.ctx;
        let food = &*self.food;
        let occupancy = &self.occupancy;
        let bounds = self.bounds;
        let max_retries = self.config.max_boundary_retries;
        let collision_detection = self.config.collision_detection;
        let rules = ReplicationRules {
            bounds,
            mutation_allowed: self.config.mutation_allowed,
        };

        // parallel phase, only apply updates to the organism itself
        // births and deaths go through the event queue
        self.organisms.par_iter_mut().for_each(|(_, organism)| {
            let state = match organism.advance(&bounds, max_retries, ctx.rng()) {
                Ok(state) => state,
                Err(e) => {
                    warn!(organism = organism.id.0, error = %e, "organism could not move");
                    lock(&failure).get_or_insert(e);
                    return;
                }
            };
            match state {
                LifeState::Dead => {
                    lock(&queue).push(SimulationEvent::Died {
                        organism_id: organism.id,
                    });
                }
                LifeState::Replicating => {
                    let child = organism.replicate(ctx, &rules);
                    if collision_detection {
                        lock(occupancy).insert_all(child.id, child.cells());
                    }
                    lock(&queue).push(SimulationEvent::Born(Box::new(child)));
                }
                LifeState::Alive => {
                    let eaten = eat(organism, food);
                    if eaten > 0 {
                        trace!(organism = organism.id.0, eaten, "ate food");
                    }
                    if collision_detection {
                        lock(occupancy).insert_all(organism.id, organism.cells());
                    }
                }
            }
        });

        (
            queue.into_inner().unwrap_or_else(PoisonError::into_inner),
            failure.into_inner().unwrap_or_else(PoisonError::into_inner),
        )
    }

    fn collision_phase(&mut self) {
        let index = self
            .occupancy
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        let organisms = &self.organisms;
        let shared_index = &*index;

        organisms.par_iter().for_each(|(id, organism)| {
            for cell in organism.cells() {
                let occupants = shared_index.occupants(cell.position);
                if occupants.len() < 2 {
                    continue;
                }
                for other_id in occupants.iter().filter(|other| *other != id) {
                    let Some(other) = organisms.get(other_id) else {
                        continue;
                    };
                    if organism.force > other.force {
                        other.mark_killed();
                    } else if other.force > organism.force {
                        organism.mark_killed();
                    }
                }
            }
        });

        index.clear();
    }

    /// Live counts.
    pub fn census(&self) -> Census {
        Census {
            tick: self.tick,
            organisms: self.organisms.len(),
            food: self.food_count(),
            largest_organism: self
                .organisms
                .values()
                .map(Organism::cell_count)
                .max()
                .unwrap_or(0),
            highest_generation: self.ctx.highest_generation(),
        }
    }

    /// Captures every cell and food position and drains the removal queues.
    ///
    /// Expired food is swept first.
    pub fn snapshot(&mut self) -> WorldSnapshot {
        self.sweep_expired_food();
        let cells = self
            .organisms
            .values()
            .flat_map(|organism| {
                organism.cells().map(|cell| CellView {
                    id: cell.id,
                    organism: organism.id,
                    position: cell.position(),
                })
            })
            .collect();

        let (food, removed_food) = {
            let mut store = lock(&self.food);
            let food = store
                .iter()
                .map(|item| FoodView {
                    id: item.id,
                    position: item.position(),
                })
                .collect();
            (food, store.drain_removed())
        };

        WorldSnapshot {
            tick: self.tick,
            cells,
            food,
            removed_cells: std::mem::take(&mut self.removed_cells),
            removed_food,
        }
    }

    /// The ancestor chain of an organism, itself first and its seed last.
    ///
    /// Works for organisms that have already died. Returns an empty history
    /// for an id that was never born here.
    pub fn ancestry(&self, id: OrganismId) -> History {
        let mut records = Vec::new();
        let mut next = Some(id);
        while let Some(entry) = next.and_then(|id| self.lineage.get(&id)) {
            records.push(entry.record.clone());
            next = entry.parent;
        }
        History::new(records)
    }

    /// The last organism to die, once the world has gone extinct.
    pub fn last_to_die(&self) -> Option<OrganismId> {
        self.last_to_die
    }

    /// Ancestry of the last organism to die.
    pub fn extinction_history(&self) -> Option<History> {
        self.last_to_die.map(|id| self.ancestry(id))
    }

    /// Forgets every organism, food item, queued removal, lineage entry and
    /// the highest generation.
    pub fn clear(&mut self) {
        self.organisms.clear();
        lock(&self.food).clear();
        lock(&self.occupancy).clear();
        self.removed_cells.clear();
        self.lineage.clear();
        self.last_to_die = None;
        self.pacer.reset();
        self.ctx.reset_generation();
        self.tick = 0;
    }

    /// Looks an organism up by id.
    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.get(&id)
    }

    /// Mutable access to an organism.
    pub fn organism_mut(&mut self, id: OrganismId) -> Option<&mut Organism> {
        self.organisms.get_mut(&id)
    }

    /// Iterates over living organisms in no particular order.
    pub fn organisms(&self) -> impl Iterator<Item = &Organism> {
        self.organisms.values()
    }

    /// Number of living organisms.
    pub fn organism_count(&self) -> usize {
        self.organisms.len()
    }

    /// Number of food items.
    pub fn food_count(&self) -> usize {
        lock(&self.food).len()
    }

    /// Whether food sits at `position`.
    pub fn has_food_at(&self, position: Position) -> bool {
        lock(&self.food).is_occupied(position)
    }

    /// The shared food store, locked by the food-drop loop as well.
    pub fn food_store(&self) -> &Arc<Mutex<FoodStore>> {
        &self.food
    }

    /// The tick pacer the food-drop loop waits on.
    pub fn pacer(&self) -> &Arc<TickPacer> {
        &self.pacer
    }

    /// The shared context.
    pub fn context(&self) -> &Arc<SimulationContext> {
        &self.ctx
    }

    /// The injected configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The world interior.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Ticks completed since the last reset.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Settings for the food-drop loop derived from the configuration.
    pub fn drop_settings(&self) -> DropSettings {
        DropSettings {
            bounds: self.bounds,
            rate: self.config.food_rate,
            amount: self.config.food_value,
            ttl: self.config.food_ttl(),
            ticks_per_drop: self.config.ticks_per_food_drop,
        }
    }
}

/// Eats the food under and, for fast movers, passed over by each cell.
///
/// Returns the number of items eaten.
fn eat(organism: &mut Organism, food: &Mutex<FoodStore>) -> usize {
    let mut gained = 0.0;
    let mut eaten = 0;
    {
        let mut store = lock(food);
        for cell in organism.cells() {
            if let Some(item) = store.take_at(cell.position) {
                gained += item.amount;
                eaten += 1;
                continue;
            }
            if cell.prev_position.distance(cell.position) > 1.0 {
                for key in sweep_keys(cell.prev_position, cell.position) {
                    if let Some(item) = store.take_at(key) {
                        gained += item.amount;
                        eaten += 1;
                    }
                }
            }
        }
    }
    organism.consume(gained);
    eaten
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
