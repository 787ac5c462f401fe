//! Counting bloom filter with conservative increment and halving decay.
//!
//! ## Key Components
//! - [`CountingBloomFilter`]: fixed-size frequency sketch
//!
//! Sizing and probing are shared with the plain [`BloomFilter`]: the filter
//! is dimensioned for a caller-estimated cardinality and probed through the
//! LCG mixer. Each slot is a counter instead of a bit.
//!
//! `add` uses the *conservative increment* discipline: of the `k` counters an
//! item maps to, only those equal to the k-probe minimum are bumped. This
//! bounds the over-counting that plain increment would accumulate from
//! collisions. `estimate` returns the k-probe minimum, an upper bound on the
//! item's true add count.
//!
//! [`BloomFilter`]: crate::ds::bloom::BloomFilter

use std::hash::{BuildHasher, Hash};

use crate::ds::bloom::{optimal_filter_size, optimal_num_hashes};
use crate::ds::mixer::HashMixer;

/// Fixed-size frequency sketch over an open-ended key universe.
#[derive(Debug)]
pub struct CountingBloomFilter<S = ahash::RandomState> {
    hasher: S,
    counters: Vec<u32>,
    num_hashes: u32,
    nonzero: usize,
    cardinality: u32,
}

impl CountingBloomFilter<ahash::RandomState> {
    /// Creates a sketch sized for `cardinality` expected distinct items.
    pub fn with_cardinality(cardinality: u32) -> Self {
        Self::with_cardinality_and_hasher(cardinality, ahash::RandomState::new())
    }
}

impl<S: BuildHasher> CountingBloomFilter<S> {
    /// Creates a sketch sized for `cardinality`, hashing items with `hasher`.
    pub fn with_cardinality_and_hasher(cardinality: u32, hasher: S) -> Self {
        let num_slots = optimal_filter_size(cardinality);
        let num_hashes = optimal_num_hashes(cardinality, num_slots);
        Self {
            hasher,
            counters: vec![0; num_slots],
            num_hashes,
            nonzero: 0,
            cardinality,
        }
    }

    /// Records one occurrence of `item`.
    pub fn add<T: Hash + ?Sized>(&mut self, item: &T) {
        let mut mixer = HashMixer::new(self.hasher.hash_one(item), self.counters.len());

        let mut indices = Vec::with_capacity(self.num_hashes as usize);
        let mut minimum = u32::MAX;
        for _ in 0..self.num_hashes {
            let idx = mixer.next_index();
            minimum = minimum.min(self.counters[idx]);
            indices.push(idx);
        }

        for idx in indices {
            if self.counters[idx] == minimum {
                self.counters[idx] += 1;
                if minimum == 0 {
                    self.nonzero += 1;
                }
            }
        }
    }

    /// Upper bound on how many times `item` was added since the last clear.
    pub fn estimate<T: Hash + ?Sized>(&self, item: &T) -> u32 {
        let mut mixer = HashMixer::new(self.hasher.hash_one(item), self.counters.len());
        (0..self.num_hashes)
            .map(|_| self.counters[mixer.next_index()])
            .min()
            .unwrap_or(0)
    }

    /// Halves every counter, keeping the non-zero slot count accurate.
    pub fn decay(&mut self) {
        for counter in &mut self.counters {
            if *counter == 1 {
                self.nonzero -= 1;
            }
            *counter /= 2;
        }
    }

    /// Resets every counter to zero.
    pub fn clear(&mut self) {
        self.counters.fill(0);
        self.nonzero = 0;
    }

    /// Fraction of slots holding a non-zero count, in `[0, 1]`.
    pub fn saturation(&self) -> f64 {
        debug_assert!(!self.counters.is_empty());
        self.nonzero as f64 / self.counters.len() as f64
    }

    /// The cardinality this sketch was sized for.
    pub fn cardinality(&self) -> u32 {
        self.cardinality
    }

    /// Bytes of heap memory held by the counter array.
    pub fn memory_used(&self) -> usize {
        self.counters.len() * std::mem::size_of::<u32>()
    }
}
