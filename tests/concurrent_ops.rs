// ==============================================
// THREAD-SAFE WRAPPER TESTS (integration)
// ==============================================
//
// The wrapper serialises every operation behind one guard; these tests
// hammer a shared cache from several threads and check that budgets and
// bookkeeping survive, and that two-cache swaps cannot deadlock.

#![cfg(feature = "concurrency")]

use std::sync::Arc;
use std::thread;

use cachet::presets::{ConcurrentCountLruCache, ConcurrentLruCache};

#[test]
fn parallel_inserts_respect_the_count_budget() {
    let cache: Arc<ConcurrentCountLruCache<u64, u64>> =
        Arc::new(ConcurrentCountLruCache::new(64));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..500u64 {
                    let key = t * 1000 + i;
                    cache.insert(key, key);
                    cache.find(&key);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.number_of_items(), 64);
    let guard = cache.lock();
    assert_eq!(guard.constraint_policy().count(), 64);
    assert_eq!(guard.eviction_policy().len(), 64);
}

#[test]
fn mixed_readers_and_writers_keep_statistics_sane() {
    let cache: Arc<ConcurrentLruCache<u64, u64>> = Arc::new(ConcurrentLruCache::new(1 << 16));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..250u64 {
                    if t % 2 == 0 {
                        cache.insert(i, i);
                    } else {
                        cache.find(&i);
                        cache.contains(&i);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let rate = cache.hit_rate();
    assert!((0.0..=1.0).contains(&rate));
    assert!(cache.byte_hit_rate() >= 0.0);
}

#[test]
fn opposing_swaps_do_not_deadlock() {
    let a: Arc<ConcurrentCountLruCache<u64, u64>> = Arc::new(ConcurrentCountLruCache::new(8));
    let b: Arc<ConcurrentCountLruCache<u64, u64>> = Arc::new(ConcurrentCountLruCache::new(8));
    a.insert(1, 1);
    b.insert(2, 2);

    let forward = {
        let (a, b) = (Arc::clone(&a), Arc::clone(&b));
        thread::spawn(move || {
            for _ in 0..1000 {
                a.swap(&b);
            }
        })
    };
    let backward = {
        let (a, b) = (Arc::clone(&a), Arc::clone(&b));
        thread::spawn(move || {
            for _ in 0..1000 {
                b.swap(&a);
            }
        })
    };
    forward.join().unwrap();
    backward.join().unwrap();

    // 2000 swaps happened in some order; whatever the interleaving, the two
    // single-item states were exchanged, never merged or lost.
    assert_eq!(a.number_of_items(), 1);
    assert_eq!(b.number_of_items(), 1);
    assert_eq!(a.contains(&1), !a.contains(&2));
    assert_eq!(b.contains(&1), !b.contains(&2));
    assert_ne!(a.contains(&1), b.contains(&1));
}

#[test]
fn removals_race_inserts_without_corruption() {
    let cache: Arc<ConcurrentCountLruCache<u64, u64>> =
        Arc::new(ConcurrentCountLruCache::new(32));

    let writer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..1000u64 {
                cache.insert(i % 48, i);
            }
        })
    };
    let remover = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..1000u64 {
                cache.remove(&(i % 48));
            }
        })
    };
    writer.join().unwrap();
    remover.join().unwrap();

    let guard = cache.lock();
    assert!(guard.number_of_items() <= 32);
    assert_eq!(guard.constraint_policy().count(), guard.number_of_items());
    assert_eq!(guard.eviction_policy().len(), guard.number_of_items());
}

#[test]
fn retain_and_collect_run_under_one_guard() {
    let cache: Arc<ConcurrentCountLruCache<u64, u64>> =
        Arc::new(ConcurrentCountLruCache::new(16));
    for i in 0..16 {
        cache.insert(i, i);
    }

    cache.retain(|key, _| key % 2 == 0);
    assert_eq!(cache.number_of_items(), 8);

    let mut collected: Vec<(u64, u64)> = Vec::new();
    cache.collect_into(&mut collected);
    collected.sort_unstable();
    assert_eq!(collected.len(), 8);
    assert!(collected.iter().all(|(key, _)| key % 2 == 0));
}

#[test]
fn find_with_gives_a_borrowed_view_for_unclonable_values() {
    #[derive(Debug, PartialEq, Eq)]
    struct Blob(Vec<u8>);

    let cache: ConcurrentCountLruCache<u64, Blob> = ConcurrentCountLruCache::new(4);
    cache.insert(1, Blob(vec![1, 2, 3]));

    let length = cache.find_with(&1, |blob| blob.0.len());
    assert_eq!(length, Some(3));
    assert_eq!(cache.find_with(&2, |blob| blob.0.len()), None);
}
