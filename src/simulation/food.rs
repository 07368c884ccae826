//! Food items that organisms can consume for energy.
//!
//! Food is either dropped at random positions by the food-drop loop or left
//! behind at the cell positions of an organism that died. Every item has a
//! fixed nutrition value and a one-shot expiry deadline.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::locatable::Locatable;
use super::position::Position;

/// Identifier of a food item, unique for the lifetime of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FoodId(pub u64);

/// Callback invoked once when a food item expires.
pub type ExpiryHook = Arc<dyn Fn(&Food) + Send + Sync>;

/// A food item that organisms can consume for energy.
#[derive(Debug)]
pub struct Food {
    /// Unique identifier.
    pub id: FoodId,
    /// Fixed position, also the key in the position index.
    pub position: Position,
    /// Energy gained by the organism that eats it.
    pub amount: f64,
    /// When the item expires.
    pub expires_at: Instant,
    fired: AtomicBool,
}

impl Food {
    /// Creates a food item expiring `ttl` from now.
    pub fn new(id: FoodId, position: Position, amount: f64, ttl: Duration) -> Self {
        Self {
            id,
            position,
            amount,
            expires_at: Instant::now() + ttl,
            fired: AtomicBool::new(false),
        }
    }

    /// Whether the deadline has passed at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Runs the expiry hook unless it already ran for this item.
    ///
    /// Returns `true` if the hook was invoked by this call.
    pub fn fire_expiry(&self, hook: &ExpiryHook) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        hook(self);
        true
    }
}

impl Locatable for Food {
    fn position(&self) -> Position {
        self.position
    }
}

/// All food in the world, guarded as one unit by the food lock.
///
/// Holds at most one item per position. Ids removed by consumption or expiry
/// are queued until a snapshot drains them.
#[derive(Debug, Default)]
pub struct FoodStore {
    foods: HashMap<FoodId, Food>,
    by_position: HashMap<Position, FoodId>,
    removed: Vec<FoodId>,
}

impl FoodStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item unless its position already holds food.
    ///
    /// Returns `false` and drops the item when the position is taken.
    pub fn insert(&mut self, food: Food) -> bool {
        if self.by_position.contains_key(&food.position) {
            return false;
        }
        self.by_position.insert(food.position, food.id);
        self.foods.insert(food.id, food);
        true
    }

    /// Whether food sits at `key`.
    pub fn is_occupied(&self, key: Position) -> bool {
        self.by_position.contains_key(&key)
    }

    /// Removes and returns the food at `key`, if any.
    ///
    /// Taking under the food lock means an item can only ever be eaten once.
    pub fn take_at(&mut self, key: Position) -> Option<Food> {
        let id = self.by_position.remove(&key)?;
        let food = self.foods.remove(&id)?;
        self.removed.push(id);
        Some(food)
    }

    /// Removes every item whose deadline has passed at `now`.
    ///
    /// The caller fires the expiry hooks after releasing the lock.
    pub fn sweep_expired(&mut self, now: Instant) -> Vec<Food> {
        let expired: Vec<FoodId> = self
            .foods
            .values()
            .filter(|f| f.is_expired(now))
            .map(|f| f.id)
            .collect();

        expired
            .into_iter()
            .filter_map(|id| {
                let food = self.foods.remove(&id)?;
                self.by_position.remove(&food.position);
                self.removed.push(id);
                Some(food)
            })
            .collect()
    }

    /// Looks an item up by id.
    pub fn get(&self, id: FoodId) -> Option<&Food> {
        self.foods.get(&id)
    }

    /// Iterates over every item.
    pub fn iter(&self) -> impl Iterator<Item = &Food> {
        self.foods.values()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.foods.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// Takes the queue of ids removed since the last drain.
    pub fn drain_removed(&mut self) -> Vec<FoodId> {
        std::mem::take(&mut self.removed)
    }

    /// Forgets every item and queued id.
    pub fn clear(&mut self) {
        self.foods.clear();
        self.by_position.clear();
        self.removed.clear();
    }
}
