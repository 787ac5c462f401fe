//! TinyLFU admission policy.
//!
//! ## Architecture
//!
//! ```text
//!   every observation (hit or miss)
//!                 │
//!                 ▼
//!   ┌─────────────────────────┐   not seen    ┌────────────────────┐
//!   │ gatekeeper: BloomFilter │──────────────►│ record in gatekeeper│
//!   │ "seen at least once?"   │               └────────────────────┘
//!   └───────────┬─────────────┘
//!               │ maybe seen
//!               ▼
//!   ┌──────────────────────────────┐  estimate > cardinality ┌────────────┐
//!   │ frequency_sketch: counting   │────────────────────────►│ reset:     │
//!   │ bloom, bumped per touch      │                         │ clear gate,│
//!   └──────────────────────────────┘                         │ decay freq │
//!                                                            └────────────┘
//! ```
//!
//! The gatekeeper suppresses frequency tracking for keys seen only once, so
//! one-hit wonders neither pollute the sketch nor gain admission. The decay
//! on overflow keeps counters bounded and ages out stale popularity.
//!
//! ## Decisions
//!
//! - `should_add(key)`: the key must have been observed at least once (the
//!   gatekeeper may contain it).
//! - `should_replace(victim, candidate)`: the candidate's frequency estimate
//!   must strictly exceed the victim's. The estimate adds one when the
//!   gatekeeper knows the key, crediting the observation the gatekeeper
//!   absorbed.

use std::hash::{BuildHasher, Hash};

use equivalent::Equivalent;

use crate::ds::bloom::BloomFilter;
use crate::ds::counting_bloom::CountingBloomFilter;
use crate::entry::Entry;
use crate::error::ConfigError;
use crate::traits::AdmissionPolicy;

/// Expected key-universe cardinality used when none is configured.
pub const DEFAULT_SKETCH_CARDINALITY: u32 = 2000;

/// Frequency-aware admission in constant memory.
#[derive(Debug)]
pub struct TinyLfuAdmission<S = ahash::RandomState> {
    gatekeeper: BloomFilter<S>,
    frequency_sketch: CountingBloomFilter<S>,
}

impl TinyLfuAdmission<ahash::RandomState> {
    /// Creates the policy sized for [`DEFAULT_SKETCH_CARDINALITY`].
    pub fn new() -> Self {
        Self::with_cardinality(DEFAULT_SKETCH_CARDINALITY)
    }

    /// Creates the policy with both sketches sized for `cardinality`
    /// expected distinct keys.
    ///
    /// The estimate matters: undersizing degrades accuracy through
    /// collisions, oversizing wastes memory.
    pub fn with_cardinality(cardinality: u32) -> Self {
        Self::try_with_cardinality(cardinality).expect("sketch cardinality must be non-zero")
    }

    /// Fallible variant of [`with_cardinality`](Self::with_cardinality).
    pub fn try_with_cardinality(cardinality: u32) -> Result<Self, ConfigError> {
        if cardinality == 0 {
            return Err(ConfigError::new("sketch cardinality must be non-zero"));
        }
        Ok(Self {
            gatekeeper: BloomFilter::with_cardinality(cardinality),
            frequency_sketch: CountingBloomFilter::with_cardinality(cardinality),
        })
    }

    /// Re-sizes both sketches, discarding all frequency state.
    pub fn set_cardinality(&mut self, cardinality: u32) {
        assert!(cardinality > 0, "sketch cardinality must be non-zero");
        self.gatekeeper = BloomFilter::with_cardinality(cardinality);
        self.frequency_sketch = CountingBloomFilter::with_cardinality(cardinality);
    }
}

impl Default for TinyLfuAdmission<ahash::RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BuildHasher> TinyLfuAdmission<S> {
    /// The cardinality both sketches are currently sized for.
    pub fn cardinality(&self) -> u32 {
        self.frequency_sketch.cardinality()
    }

    /// Bytes of heap memory held by the two sketches.
    pub fn memory_used(&self) -> usize {
        self.gatekeeper.memory_used() + self.frequency_sketch.memory_used()
    }

    /// Estimated observation count for a key: the sketch estimate plus one
    /// if the gatekeeper absorbed the first observation.
    pub fn estimate<T: Hash + ?Sized>(&self, key: &T) -> u32 {
        let mut estimate = self.frequency_sketch.estimate(key);
        if self.gatekeeper.maybe_contains(key) {
            estimate += 1;
        }
        estimate
    }

    fn touch<T: Hash + ?Sized>(&mut self, key: &T) {
        if self.gatekeeper.maybe_contains(key) {
            self.frequency_sketch.add(key);
            if self.frequency_sketch.estimate(key) > self.frequency_sketch.cardinality() {
                self.reset();
            }
        } else {
            self.gatekeeper.add(key);
        }
    }

    fn reset(&mut self) {
        self.gatekeeper.clear();
        self.frequency_sketch.decay();
    }
}

impl<K, V, S> AdmissionPolicy<K, V> for TinyLfuAdmission<S>
where
    K: Hash,
    S: BuildHasher,
{
    fn should_add(&self, candidate: &K) -> bool {
        self.gatekeeper.maybe_contains(candidate)
    }

    fn should_replace(&self, victim: &K, candidate: &K) -> bool {
        self.estimate(candidate) > self.estimate(victim)
    }

    fn on_cache_hit(&mut self, key: &K, _entry: &Entry<V>) {
        self.touch(key);
    }

    fn on_cache_miss<Q>(&mut self, key: &Q)
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.touch(key);
    }

    fn clear(&mut self) {
        self.gatekeeper.clear();
        self.frequency_sketch.clear();
    }
}
