//! Greedy-Dual-Size-Frequency eviction order.
//!
//! Every resident entry carries an H-coefficient
//!
//! ```text
//!   H(key, entry) = clock + frequency(key) * cost(key, entry) / total_size(entry)
//! ```
//!
//! and victims are offered in ascending H order: the cheapest-to-reload,
//! least-popular, largest entries go first. Frequency comes from a private
//! counting bloom sketch; `cost` is a caller-supplied model of what a miss
//! on the entry would cost. The `clock` is the largest coefficient ever
//! evicted, so fresh coefficients are computed relative to the current
//! eviction frontier and long-resident entries cannot starve newcomers.
//!
//! A `BTreeSet` of `(coefficient, handle)` pairs is the priority order; a
//! side map from handle to coefficient locates the set entry when a hit,
//! update, or eviction needs to reposition or drop it.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{BuildHasher, Hash};

use rustc_hash::FxHashMap;

use crate::ds::counting_bloom::CountingBloomFilter;
use crate::entry::{Entry, EntrySizes};
use crate::store::EntryId;
use crate::traits::{EvictionPolicy, Victims};

/// Expected key-universe cardinality used when none is configured.
pub const DEFAULT_SKETCH_CARDINALITY: u32 = 2000;

/// Cost model: what a miss on this entry would cost to repair.
///
/// Must return a positive, finite number and be deterministic for an
/// unchanged entry.
pub trait Cost<K, V> {
    /// The cost of reloading `entry` under `key`.
    fn cost(&self, key: &K, entry: &Entry<V>) -> f64;
}

/// Every miss costs the same. H degenerates to frequency over size, which
/// keeps small hot entries and sheds large cold ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantCost;

impl<K, V> Cost<K, V> for ConstantCost {
    fn cost(&self, _key: &K, _entry: &Entry<V>) -> f64 {
        1.0
    }
}

/// A miss costs the entry's total size. H degenerates to plain frequency
/// plus aging, which ignores entry size entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalSizeCost;

impl<K, V> Cost<K, V> for TotalSizeCost {
    fn cost(&self, _key: &K, entry: &Entry<V>) -> f64 {
        entry.total_size() as f64
    }
}

/// H-coefficient ordered by `f64::total_cmp`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coefficient(f64);

impl Eq for Coefficient {}

impl PartialOrd for Coefficient {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coefficient {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Cost-weighted, frequency-aware, size-aware eviction.
#[derive(Debug)]
pub struct GdsfEviction<C = ConstantCost, S = ahash::RandomState> {
    cost: C,
    sketch: CountingBloomFilter<S>,
    priorities: BTreeSet<(Coefficient, EntryId)>,
    coefficients: FxHashMap<EntryId, Coefficient>,
    clock: f64,
}

impl GdsfEviction<ConstantCost, ahash::RandomState> {
    /// Creates the policy with a constant cost model.
    pub fn new() -> Self {
        Self::with_cost(ConstantCost)
    }
}

impl Default for GdsfEviction<ConstantCost, ahash::RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> GdsfEviction<C, ahash::RandomState> {
    /// Creates the policy with a caller-supplied cost model.
    pub fn with_cost(cost: C) -> Self {
        Self {
            cost,
            sketch: CountingBloomFilter::with_cardinality(DEFAULT_SKETCH_CARDINALITY),
            priorities: BTreeSet::new(),
            coefficients: FxHashMap::default(),
            clock: 0.0,
        }
    }

    /// Re-sizes the frequency sketch, discarding accumulated frequencies.
    ///
    /// Coefficients already assigned keep their values; they age out as the
    /// entries are touched or evicted.
    pub fn set_cardinality(&mut self, cardinality: u32) {
        assert!(cardinality > 0, "sketch cardinality must be non-zero");
        self.sketch = CountingBloomFilter::with_cardinality(cardinality);
    }
}

impl<C, S> GdsfEviction<C, S> {
    /// The current inflation clock: the largest coefficient ever evicted.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Number of entries currently tracked.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns `true` if no entries are tracked.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}

impl<C, S: BuildHasher> GdsfEviction<C, S> {
    fn coefficient_for<K, V>(&self, key: &K, entry: &Entry<V>) -> Coefficient
    where
        K: Hash,
        C: Cost<K, V>,
    {
        let frequency = f64::from(self.sketch.estimate(key));
        let cost = self.cost.cost(key, entry);
        let size = entry.total_size().max(1) as f64;
        Coefficient(self.clock + frequency * cost / size)
    }

    fn track<K, V>(&mut self, id: EntryId, key: &K, entry: &Entry<V>)
    where
        K: Hash,
        C: Cost<K, V>,
    {
        self.sketch.add(key);
        let coefficient = self.coefficient_for(key, entry);
        self.priorities.insert((coefficient, id));
        self.coefficients.insert(id, coefficient);
    }

    fn retrack<K, V>(&mut self, id: EntryId, key: &K, entry: &Entry<V>)
    where
        K: Hash,
        C: Cost<K, V>,
    {
        match self.coefficients.remove(&id) {
            Some(coefficient) => {
                self.priorities.remove(&(coefficient, id));
            },
            None => debug_assert!(false, "hit on an entry the policy does not track"),
        }
        // Re-inserting folds the new frequency, cost, and size into one
        // fresh coefficient.
        self.track(id, key, entry);
    }
}

impl<K, V, C, S> EvictionPolicy<K, V> for GdsfEviction<C, S>
where
    K: Hash,
    C: Cost<K, V>,
    S: BuildHasher,
{
    fn on_insert(&mut self, id: EntryId, key: &K, entry: &Entry<V>) {
        debug_assert!(!self.coefficients.contains_key(&id));
        self.track(id, key, entry);
    }

    fn on_cache_hit(&mut self, id: EntryId, key: &K, entry: &Entry<V>) {
        self.retrack(id, key, entry);
    }

    fn on_update(&mut self, id: EntryId, key: &K, _old: EntrySizes, entry: &Entry<V>) {
        self.retrack(id, key, entry);
    }

    fn on_evict(&mut self, id: EntryId, _key: &K, _entry: &Entry<V>) {
        match self.coefficients.remove(&id) {
            Some(coefficient) => {
                self.clock = self.clock.max(coefficient.0);
                self.priorities.remove(&(coefficient, id));
            },
            None => debug_assert!(false, "eviction of an entry the policy does not track"),
        }
    }

    fn clear(&mut self) {
        self.priorities.clear();
        self.coefficients.clear();
        self.sketch.clear();
    }

    fn victims(&self) -> Victims<'_> {
        Box::new(self.priorities.iter().map(|&(_, id)| id))
    }
}
