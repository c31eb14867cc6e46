//! report::cache — caller-owned memoization of Rasch probabilities.
//!
//! Purpose
//! -------
//! Avoid recomputing P(θ, b) for repeated (ability, difficulty) pairs
//! within one analysis pass, without putting any state inside the engine.
//!
//! Key behaviors
//! -------------
//! - Entries are keyed by the exact bit patterns of θ and b, so a hit always
//!   returns the value the engine would compute for those inputs.
//! - `-0.0` is folded into `0.0` so the two zeros share an entry.
//! - Capacity is bounded; once full, the oldest entry is evicted (FIFO).
//! - [`ProbabilityCache::invalidate`] empties the cache; owners call it
//!   whenever the difficulties or abilities behind the keys may have changed.
//!
//! Invariants & assumptions
//! ------------------------
//! - `len() <= capacity()` at all times.
//! - The cache is not `Sync`-shared; each analysis owns its own instance.
use std::collections::{HashMap, VecDeque};

use crate::rasch::{
    errors::{RaschError, RaschResult},
    probability::probability,
};

/// Entries kept by [`ProbabilityCache::default`].
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

type Key = (u64, u64);

fn key(ability: f64, difficulty: f64) -> Key {
    ((ability + 0.0).to_bits(), (difficulty + 0.0).to_bits())
}

/// Bounded FIFO memo of P(θ, b).
#[derive(Debug, Clone)]
pub struct ProbabilityCache {
    capacity: usize,
    values: HashMap<Key, f64>,
    order: VecDeque<Key>,
    hits: u64,
    misses: u64,
}

impl ProbabilityCache {
    /// # Errors
    /// [`RaschError::InvalidCacheCapacity`] if `capacity == 0`.
    pub fn new(capacity: usize) -> RaschResult<Self> {
        if capacity == 0 {
            return Err(RaschError::InvalidCacheCapacity { capacity });
        }
        Ok(Self {
            capacity,
            values: HashMap::with_capacity(capacity.min(DEFAULT_CACHE_CAPACITY)),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        })
    }

    /// P(θ, b), computed on a miss and remembered.
    pub fn get_or_compute(&mut self, ability: f64, difficulty: f64) -> f64 {
        let k = key(ability, difficulty);
        if let Some(&p) = self.values.get(&k) {
            self.hits += 1;
            return p;
        }
        self.misses += 1;
        let p = probability(ability, difficulty);
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.values.remove(&oldest);
            }
        }
        self.values.insert(k, p);
        self.order.push_back(k);
        p
    }

    /// Drop every entry and reset the hit/miss counters.
    pub fn invalidate(&mut self) {
        self.values.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for ProbabilityCache {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            values: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }
}
