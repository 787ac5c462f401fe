#![no_main]

use cachet::ds::CountingBloomFilter;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on CountingBloomFilter
//
// Random add/estimate/decay/clear interleavings, checking that estimates
// stay conservative upper bounds and that saturation stays in [0, 1].
fuzz_target!(|data: &[u8]| {
    let mut sketch = CountingBloomFilter::with_cardinality(64);
    let mut true_counts = std::collections::HashMap::new();

    let mut idx = 0;
    while idx + 1 < data.len() {
        let op = data[idx] % 8;
        let key = u64::from(data[idx + 1] % 32);

        match op {
            0..=4 => {
                sketch.add(&key);
                *true_counts.entry(key).or_insert(0u32) += 1;
            }
            5 => {
                // The estimate is an upper bound on the true count.
                let estimate = sketch.estimate(&key);
                let true_count = true_counts.get(&key).copied().unwrap_or(0);
                assert!(estimate >= true_count);
            }
            6 => {
                sketch.decay();
                for count in true_counts.values_mut() {
                    *count /= 2;
                }
                // A decayed estimate still dominates the halved true count.
                for (key, count) in &true_counts {
                    assert!(sketch.estimate(key) >= *count);
                }
            }
            _ => {
                if key % 8 == 0 {
                    sketch.clear();
                    true_counts.clear();
                    assert_eq!(sketch.saturation(), 0.0);
                }
            }
        }

        let saturation = sketch.saturation();
        assert!((0.0..=1.0).contains(&saturation));
        idx += 2;
    }
});
