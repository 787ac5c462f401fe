//! Plain bloom filter with saturation reporting.
//!
//! ## Key Components
//! - [`BloomFilter`]: fixed-size probabilistic set, no false negatives
//! - [`optimal_filter_size`] / [`optimal_num_hashes`]: shared sizing math
//!
//! The filter is sized for a caller-estimated cardinality at a 1% target
//! false-positive rate. Probe indices come from a [`HashMixer`] seeded with
//! the item's hash, so any probe type that hashes like the stored key type
//! can be queried.

use std::hash::{BuildHasher, Hash};

use crate::ds::mixer::HashMixer;

const BLOCK_BITS: usize = u64::BITS as usize;

/// Number of filter bits for `cardinality` expected items at a 1% target
/// false-positive rate: `m = ceil(-n * ln(0.01) / ln(2)^2)`, at least 1.
pub(crate) fn optimal_filter_size(cardinality: u32) -> usize {
    let multiplier = -(0.01f64.ln()) / 2f64.ln().powi(2);
    let ideal = (f64::from(cardinality) * multiplier).ceil();
    (ideal as usize).max(1)
}

/// Number of hash probes per operation: `k = floor((m / n) * ln 2)`, at
/// least 1.
pub(crate) fn optimal_num_hashes(cardinality: u32, filter_size: usize) -> u32 {
    let hashes = (filter_size as f64 / f64::from(cardinality.max(1))) * 2f64.ln();
    (hashes as u32).max(1)
}

/// Fixed-size probabilistic set.
///
/// `maybe_contains` returns `true` for every item added since the last
/// `clear`; it may also return `true` for items never added, with a
/// probability controlled by the cardinality the filter was sized for.
#[derive(Debug)]
pub struct BloomFilter<S = ahash::RandomState> {
    hasher: S,
    blocks: Vec<u64>,
    num_bits: usize,
    num_hashes: u32,
    ones: usize,
    cardinality: u32,
}

impl BloomFilter<ahash::RandomState> {
    /// Creates a filter sized for `cardinality` expected distinct items.
    pub fn with_cardinality(cardinality: u32) -> Self {
        Self::with_cardinality_and_hasher(cardinality, ahash::RandomState::new())
    }
}

impl<S: BuildHasher> BloomFilter<S> {
    /// Creates a filter sized for `cardinality`, hashing items with `hasher`.
    pub fn with_cardinality_and_hasher(cardinality: u32, hasher: S) -> Self {
        let num_bits = optimal_filter_size(cardinality);
        let num_hashes = optimal_num_hashes(cardinality, num_bits);
        Self {
            hasher,
            blocks: vec![0; num_bits.div_ceil(BLOCK_BITS)],
            num_bits,
            num_hashes,
            ones: 0,
            cardinality,
        }
    }

    /// Adds an item to the filter.
    pub fn add<T: Hash + ?Sized>(&mut self, item: &T) {
        let mut mixer = HashMixer::new(self.hasher.hash_one(item), self.num_bits);
        for _ in 0..self.num_hashes {
            self.set_bit(mixer.next_index());
        }
    }

    /// Returns `false` if the item was definitely never added.
    pub fn maybe_contains<T: Hash + ?Sized>(&self, item: &T) -> bool {
        let mut mixer = HashMixer::new(self.hasher.hash_one(item), self.num_bits);
        (0..self.num_hashes).all(|_| self.test_bit(mixer.next_index()))
    }

    /// Resets the filter to its freshly-constructed state.
    pub fn clear(&mut self) {
        self.blocks.fill(0);
        self.ones = 0;
    }

    /// Fraction of filter bits currently set, in `[0, 1]`.
    pub fn saturation(&self) -> f64 {
        debug_assert!(self.num_bits > 0);
        self.ones as f64 / self.num_bits as f64
    }

    /// The cardinality this filter was sized for.
    pub fn cardinality(&self) -> u32 {
        self.cardinality
    }

    /// Bytes of heap memory held by the bit array.
    pub fn memory_used(&self) -> usize {
        self.blocks.len() * std::mem::size_of::<u64>()
    }

    fn set_bit(&mut self, idx: usize) {
        debug_assert!(idx < self.num_bits);
        let mask = 1u64 << (idx % BLOCK_BITS);
        let block = &mut self.blocks[idx / BLOCK_BITS];
        if *block & mask == 0 {
            *block |= mask;
            self.ones += 1;
        }
    }

    fn test_bit(&self, idx: usize) -> bool {
        debug_assert!(idx < self.num_bits);
        self.blocks[idx / BLOCK_BITS] & (1 << (idx % BLOCK_BITS)) != 0
    }
}
