//! Free-fall food.
//!
//! Food is dropped in batches by a loop running on its own thread. Between
//! batches the loop waits for the tick engine to report a configured number
//! of ticks, so food supply follows simulation time rather than wall-clock
//! time and fast-forwarding still drops food in proportion to the ticks run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rayon::prelude::*;
use tracing::{debug, error, trace};

use super::context::SimulationContext;
use super::food::{Food, FoodStore};
use super::geometric_utils::Bounds;
use super::position::Position;

/// How long the loop sleeps while food drops are disabled.
const DISABLED_POLL: Duration = Duration::from_millis(200);
/// Upper bound on a single wait for ticks, so cancellation is noticed.
const TICK_WAIT_SLICE: Duration = Duration::from_millis(50);

/// Counts ticks since the last food batch and wakes the food-drop loop.
#[derive(Debug, Default)]
pub struct TickPacer {
    ticks: Mutex<u32>,
    advanced: Condvar,
}

impl TickPacer {
    /// Creates a pacer with no ticks counted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the tick engine once per completed tick.
    pub fn record_tick(&self) {
        let mut ticks = self.ticks.lock().unwrap_or_else(PoisonError::into_inner);
        *ticks = ticks.saturating_add(1);
        self.advanced.notify_all();
    }

    /// Ticks counted since the last reset.
    pub fn ticks(&self) -> u32 {
        *self.ticks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until at least `target` ticks have been counted, then resets
    /// the count.
    ///
    /// Returns `false` without resetting if `cancel` is raised first.
    pub fn wait_for(&self, target: u32, cancel: &AtomicBool) -> bool {
        let mut ticks = self.ticks.lock().unwrap_or_else(PoisonError::into_inner);
        while *ticks < target {
            if cancel.load(Ordering::Acquire) {
                return false;
            }
            ticks = self
                .advanced
                .wait_timeout(ticks, TICK_WAIT_SLICE)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *ticks = 0;
        true
    }

    /// Forgets any counted ticks.
    pub fn reset(&self) {
        *self.ticks.lock().unwrap_or_else(PoisonError::into_inner) = 0;
    }
}

/// What a food drop needs to place items.
#[derive(Debug, Clone, Copy)]
pub struct DropSettings {
    /// World interior.
    pub bounds: Bounds,
    /// Items per batch.
    pub rate: usize,
    /// Nutrition per item.
    pub amount: f64,
    /// Lifetime per item.
    pub ttl: Duration,
    /// Ticks between batches.
    pub ticks_per_drop: u32,
}

/// Places one food item at `position`.
///
/// Returns `false` when the position already holds food.
pub fn place_food(
    ctx: &SimulationContext,
    store: &Mutex<FoodStore>,
    position: Position,
    amount: f64,
    ttl: Duration,
) -> bool {
    let food = Food::new(ctx.next_food_id(), position, amount, ttl);
    store
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(food)
}

/// Drops one batch of food at random positions, in parallel.
///
/// Returns how many items were placed; draws landing on existing food are
/// discarded.
pub fn drop_batch(ctx: &SimulationContext, store: &Mutex<FoodStore>, settings: &DropSettings) -> usize {
    (0..settings.rate)
        .into_par_iter()
        .filter(|_| {
            let position = settings.bounds.random_position(ctx.rng());
            place_food(ctx, store, position, settings.amount, settings.ttl)
        })
        .count()
}

/// Handle to the running food-drop loop.
///
/// Dropping the handle cancels the loop and joins its thread.
#[derive(Debug)]
pub struct FoodDropper {
    allowed: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FoodDropper {
    /// Starts the loop on a new thread.
    pub fn spawn(
        ctx: Arc<SimulationContext>,
        store: Arc<Mutex<FoodStore>>,
        pacer: Arc<TickPacer>,
        settings: DropSettings,
    ) -> Self {
        let allowed = Arc::new(AtomicBool::new(true));
        let cancel = Arc::new(AtomicBool::new(false));

        let handle = {
            let allowed = Arc::clone(&allowed);
            let cancel = Arc::clone(&cancel);
            thread::spawn(move || {
                run_loop(&ctx, &store, &pacer, &settings, &allowed, &cancel);
            })
        };

        Self {
            allowed,
            cancel,
            handle: Some(handle),
        }
    }

    /// Enables or disables drops without stopping the loop.
    pub fn set_allowed(&self, allowed: bool) {
        self.allowed.store(allowed, Ordering::Release);
    }

    /// Whether drops are currently enabled.
    pub fn is_allowed(&self) -> bool {
        self.allowed.load(Ordering::Acquire)
    }

    /// Cancels the loop and waits for its in-flight batch to finish.
    pub fn stop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("food-drop thread panicked");
            }
        }
    }
}

impl Drop for FoodDropper {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    ctx: &SimulationContext,
    store: &Mutex<FoodStore>,
    pacer: &TickPacer,
    settings: &DropSettings,
    allowed: &AtomicBool,
    cancel: &AtomicBool,
) {
    debug!(rate = settings.rate, every = settings.ticks_per_drop, "food drop started");
    while !cancel.load(Ordering::Acquire) {
        if !allowed.load(Ordering::Acquire) {
            thread::sleep(DISABLED_POLL);
            continue;
        }

        let placed = drop_batch(ctx, store, settings);
        trace!(placed, "dropped food batch");

        if !pacer.wait_for(settings.ticks_per_drop, cancel) {
            break;
        }
    }
    debug!("food drop stopped");
}
