//! Probe-index generator for the bloom sketches.
//!
//! A filter operation needs `k` indices per item. Instead of hashing the item
//! `k` times, the item is hashed once and the digest seeds a minimal-standard
//! linear congruential generator; each LCG step reduced modulo the filter
//! size yields one probe index. The sketch analysis only needs the probes to
//! be roughly independent and uniform over `[0, m)`.

/// Stream of probe indices in `[0, range)`, seeded from a single hash.
#[derive(Debug)]
pub struct HashMixer {
    state: u32,
    range: usize,
}

impl HashMixer {
    // Minimal-standard LCG (Park-Miller): x <- x * 48271 mod (2^31 - 1).
    const MODULUS: u64 = 0x7FFF_FFFF;
    const MULTIPLIER: u64 = 48_271;

    /// Creates a mixer seeded from `hash`, producing indices below `range`.
    ///
    /// A seed congruent to zero would pin the stream at zero, so it is
    /// coerced to one.
    pub fn new(hash: u64, range: usize) -> Self {
        debug_assert!(range > 0);
        let mut state = (hash % Self::MODULUS) as u32;
        if state == 0 {
            state = 1;
        }
        Self { state, range }
    }

    /// Advances the stream and returns the next probe index.
    pub fn next_index(&mut self) -> usize {
        self.state = ((u64::from(self.state) * Self::MULTIPLIER) % Self::MODULUS) as u32;
        self.state as usize % self.range
    }
}
