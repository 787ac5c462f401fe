// ==============================================
// CROSS-POLICY INVARIANT AND SCENARIO TESTS
// ==============================================
//
// Behaviour of the policy combinations through the public cache surface:
// TinyLFU admission duels, segmented-LRU promotion, GDSF priority flips,
// and budget invariants under randomized workloads.

use cachet::cache::{Cache, DEFAULT_STATISTICS_WINDOW};
use cachet::measure::{Bytes, SizeOf};
use cachet::policy::{
    AlwaysAdmit, ConstantCost, CountConstraint, GdsfEviction, SlruEviction, TinyLfuAdmission,
};
use cachet::presets::{GdsfCache, TinyLfuCache};
use cachet::traits::AdmissionPolicy;

// ==============================================
// TinyLFU admission
// ==============================================

mod tinylfu {
    use super::*;

    #[test]
    fn a_never_observed_key_is_refused() {
        let mut cache: TinyLfuCache<u64, u64> = TinyLfuCache::new(1024);
        assert!(!cache.insert(42, 0));
        assert_eq!(cache.number_of_items(), 0);
    }

    #[test]
    fn one_prior_observation_admits() {
        let mut cache: TinyLfuCache<u64, u64> = TinyLfuCache::new(1024);
        assert_eq!(cache.find(&42), None);
        assert!(cache.insert(42, 0));
        assert_eq!(cache.find(&42), Some(&0));
    }

    #[test]
    fn the_more_frequent_key_wins_the_duel() {
        let mut cache: TinyLfuCache<u64, u64> = TinyLfuCache::new(1024);
        for _ in 0..10 {
            cache.find(&42);
        }
        for _ in 0..5 {
            cache.find(&18);
        }

        let admission = cache.admission_policy();
        assert!(AdmissionPolicy::<u64, u64>::should_replace(admission, &18, &42));
        assert!(!AdmissionPolicy::<u64, u64>::should_replace(admission, &42, &18));
    }

    #[test]
    fn a_hotter_candidate_displaces_a_colder_resident() {
        // Room for a single 16-byte entry.
        let mut cache: TinyLfuCache<u64, u64> = TinyLfuCache::new(16);

        cache.find(&1);
        cache.find(&1);
        assert!(cache.insert(1, 10));

        // Key 2 becomes clearly hotter than the resident key 1.
        for _ in 0..5 {
            cache.find(&2);
        }
        assert!(cache.insert(2, 20));
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
    }

    #[test]
    fn a_colder_candidate_cannot_displace_and_nothing_is_lost() {
        let mut cache: TinyLfuCache<u64, u64> = TinyLfuCache::new(16);
        for _ in 0..6 {
            cache.find(&1);
        }
        assert!(cache.insert(1, 10));

        // Key 2 has been seen, but less often than key 1.
        cache.find(&2);
        cache.find(&2);
        assert!(!cache.insert(2, 20));
        assert!(cache.contains(&1), "failed admission must not evict");
        assert_eq!(cache.number_of_items(), 1);
    }

    #[test]
    fn sketch_overflow_halves_old_frequencies() {
        // Mirrors the counting-bloom reset scenario on a tiny sketch.
        let mut policy = TinyLfuAdmission::with_cardinality(5);

        let touch = |policy: &mut TinyLfuAdmission, key: u64, times: usize| {
            for _ in 0..times {
                AdmissionPolicy::<u64, u64>::on_cache_miss(policy, &key);
            }
        };

        touch(&mut policy, 3, 2);
        touch(&mut policy, 42, 6);
        assert!(AdmissionPolicy::<u64, u64>::should_replace(&policy, &3, &42));

        // The seventh observation overflows the sketch and halves it; four
        // fresh observations of key 3 now out-vote the decayed key 42.
        touch(&mut policy, 42, 1);
        touch(&mut policy, 3, 4);
        assert!(AdmissionPolicy::<u64, u64>::should_replace(&policy, &42, &3));
    }
}

// ==============================================
// Segmented LRU through the cache
// ==============================================

mod slru {
    use super::*;

    type SlruCountCache = Cache<u64, u64, AlwaysAdmit, SlruEviction, CountConstraint>;

    fn cache_with_protected(protected: usize, capacity: usize) -> SlruCountCache {
        Cache::with_parts(
            AlwaysAdmit,
            SlruEviction::with_protected_segment_size(protected),
            CountConstraint::new(capacity),
            SizeOf,
            SizeOf,
            DEFAULT_STATISTICS_WINDOW,
        )
    }

    #[test]
    fn promotion_reorders_the_victim_sequence() {
        let mut cache = cache_with_protected(4, 5);
        for key in [1, 2, 3, 4, 5] {
            cache.insert(key, key);
        }
        // Promote key 1 out of probation.
        cache.find(&1);

        // Shrink one slot at a time: evictions follow the victim sequence
        // [2, 3, 4, 5] (probation, oldest first), then [1] (protected).
        for (remaining, evicted) in [(4u64, 2u64), (3, 3), (2, 4), (1, 5)] {
            cache.update_constraint(remaining as usize);
            assert!(!cache.contains(&evicted), "expected {evicted} evicted");
            assert!(cache.contains(&1), "promoted key must outlive probation");
        }
        assert_eq!(cache.number_of_items(), 1);
    }

    #[test]
    fn protected_overflow_demotes_the_oldest_promotion() {
        let mut cache = cache_with_protected(4, 5);
        for key in [1, 2, 3, 4, 5] {
            cache.insert(key, key);
        }
        // Promote all five in order; the cap of four demotes key 1 back to
        // probation, making it the first victim again.
        for key in [1, 2, 3, 4, 5] {
            cache.find(&key);
        }
        assert_eq!(cache.eviction_policy().protected_len(), 4);
        assert_eq!(cache.eviction_policy().probation_len(), 1);

        cache.update_constraint(4);
        assert!(!cache.contains(&1));

        // Next in line is the coldest protected entry.
        cache.update_constraint(3);
        assert!(!cache.contains(&2));
        assert!(cache.contains(&5));
    }

    #[test]
    fn probation_churn_does_not_touch_the_protected_segment() {
        let mut cache = cache_with_protected(2, 4);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.find(&1);
        cache.find(&2);
        assert_eq!(cache.eviction_policy().protected_len(), 2);

        // A scan of one-shot keys cycles through probation only.
        for key in 100..120 {
            cache.insert(key, key);
        }
        assert!(cache.contains(&1));
        assert!(cache.contains(&2));
        assert_eq!(cache.number_of_items(), 4);
    }

    #[test]
    fn segment_bookkeeping_stays_consistent() {
        let mut cache = cache_with_protected(3, 8);
        for key in 0..8 {
            cache.insert(key, key);
        }
        for key in [0, 2, 4, 6, 0, 2] {
            cache.find(&key);
        }
        cache.remove(&4);
        cache.insert(9, 9);

        cache.eviction_policy().check_invariants().unwrap();
        assert_eq!(
            cache.eviction_policy().probation_len() + cache.eviction_policy().protected_len(),
            cache.number_of_items()
        );
    }
}

// ==============================================
// GDSF priorities through the cache
// ==============================================

mod gdsf {
    use super::*;

    #[test]
    fn constant_cost_evicts_the_large_entry_first() {
        let mut cache: GdsfCache<String, String, ConstantCost, Bytes, Bytes> =
            GdsfCache::new(1024);
        cache.insert("a".to_string(), "v".to_string());
        cache.insert(
            "a-key-that-is-exactly-forty-three-chars-ok".to_string(),
            "v".to_string(),
        );
        assert_eq!(cache.number_of_items(), 2);

        // Equal frequency, equal cost: the larger entry has the smaller
        // H-coefficient and goes first.
        cache.update_constraint(8);
        assert!(cache.contains("a"));
        assert_eq!(cache.number_of_items(), 1);
    }

    // Entry sizes for the two tests below: "a" + 18-byte value = 19 bytes,
    // 43-char key + 8-byte value = 51 bytes.
    const LONG_KEY: &str = "this is supposed to be a much longer string";

    fn two_key_cache() -> GdsfCache<String, String, ConstantCost, Bytes, Bytes> {
        let mut cache = GdsfCache::new(1024);
        cache.insert("a".to_string(), "x".repeat(18));
        cache.insert(LONG_KEY.to_string(), "x".repeat(8));
        cache
    }

    #[test]
    fn repeated_updates_rescue_the_large_entry() {
        let mut cache = two_key_cache();

        // Each update folds a frequency bump into the long key's priority:
        // 11/51 now beats the short key's 1/19.
        for _ in 0..10 {
            cache.insert(LONG_KEY.to_string(), "x".repeat(8));
        }

        cache.update_constraint(60);
        assert!(cache.contains(LONG_KEY));
        assert!(!cache.contains("a"));
    }

    #[test]
    fn cost_per_byte_lets_the_small_entry_catch_up_cheaply() {
        let mut cache = two_key_cache();
        for _ in 0..10 {
            cache.insert(LONG_KEY.to_string(), "x".repeat(8));
        }

        // Four updates of the small entry out-rank ten of the large one:
        // 5/19 > 11/51.
        for _ in 0..4 {
            cache.insert("a".to_string(), "x".repeat(18));
        }

        cache.update_constraint(25);
        assert!(cache.contains("a"));
        assert!(!cache.contains(LONG_KEY));
    }

    #[test]
    fn eviction_inflates_priorities_of_later_inserts() {
        let mut cache: GdsfCache<u64, u64> = GdsfCache::new(1024);
        cache.insert(1, 1);
        let clock_before = cache.eviction_policy().clock();
        cache.remove(&1);
        let clock_after = cache.eviction_policy().clock();
        assert!(clock_after > clock_before);
    }

    #[test]
    fn gdsf_respects_the_insert_protocol() {
        // Budget for two 16-byte entries; a third insert must evict exactly
        // the lowest-priority one.
        let mut cache: GdsfCache<u64, u64> = GdsfCache::new(32);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.find(&1);
        cache.find(&1);

        assert!(cache.insert(3, 3));
        assert!(cache.contains(&1), "hotter entry survives");
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
    }
}

// ==============================================
// Budget invariants under randomized workloads
// ==============================================

mod randomized {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn random_ops<A, E>(mut cache: Cache<u64, u64, A, E, CountConstraint>, seed: u64)
    where
        A: cachet::traits::AdmissionPolicy<u64, u64>,
        E: cachet::traits::EvictionPolicy<u64, u64>,
    {
        let mut rng = SmallRng::seed_from_u64(seed);
        for step in 0..2000 {
            let key = rng.gen_range(0..64);
            match rng.gen_range(0..10) {
                0..=4 => {
                    cache.insert(key, key);
                },
                5..=7 => {
                    cache.find(&key);
                },
                8 => {
                    cache.remove(&key);
                },
                _ => {
                    if rng.gen_bool(0.2) {
                        cache.update_constraint(rng.gen_range(0..24));
                    }
                },
            }

            if step % 250 == 0 {
                assert!(cache.constraint_policy().count() <= cache.constraint_policy().maximum_count());
                assert_eq!(cache.constraint_policy().count(), cache.number_of_items());
                let rate = cache.hit_rate();
                assert!((0.0..=1.0).contains(&rate));
            }
        }
    }

    #[test]
    fn lru_cache_upholds_its_budget_under_churn() {
        let cache = Cache::with_parts(
            AlwaysAdmit,
            cachet::policy::LruEviction::new(),
            CountConstraint::new(16),
            SizeOf,
            SizeOf,
            DEFAULT_STATISTICS_WINDOW,
        );
        random_ops(cache, 1);
    }

    #[test]
    fn slru_cache_upholds_its_budget_under_churn() {
        let cache = Cache::with_parts(
            AlwaysAdmit,
            SlruEviction::with_protected_segment_size(4),
            CountConstraint::new(16),
            SizeOf,
            SizeOf,
            DEFAULT_STATISTICS_WINDOW,
        );
        random_ops(cache, 2);
    }

    #[test]
    fn gdsf_cache_upholds_its_budget_under_churn() {
        let cache = Cache::with_parts(
            AlwaysAdmit,
            GdsfEviction::new(),
            CountConstraint::new(16),
            SizeOf,
            SizeOf,
            DEFAULT_STATISTICS_WINDOW,
        );
        random_ops(cache, 3);
    }

    #[test]
    fn tinylfu_cache_upholds_its_budget_under_churn() {
        let cache = Cache::with_parts(
            TinyLfuAdmission::new(),
            SlruEviction::with_protected_segment_size(4),
            CountConstraint::new(16),
            SizeOf,
            SizeOf,
            DEFAULT_STATISTICS_WINDOW,
        );
        random_ops(cache, 4);
    }
}
