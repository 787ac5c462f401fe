//! Thread-safe cache wrapper.
//!
//! [`ConcurrentCache`] wraps the single-threaded [`Cache`] core in a
//! `parking_lot::Mutex`. Every public operation holds the guard for its full
//! duration, policy callbacks included, so critical sections observe each
//! other sequentially. User callbacks (`retain`, `for_each`, `find_with`)
//! receive data references rather than the cache itself, which rules out
//! re-entrant calls by construction and keeps the guard non-recursive.
//!
//! `swap` between two caches acquires both guards in memory-address order,
//! which acquires them deadlock-free without a try-and-back-off loop.

use std::hash::{BuildHasher, Hash};

use equivalent::Equivalent;
use parking_lot::{Mutex, MutexGuard};

use crate::cache::{Cache, DEFAULT_STATISTICS_WINDOW};
use crate::measure::{Measure, SizeOf};
use crate::traits::{AdmissionPolicy, ConstraintPolicy, EvictionPolicy};

/// Mutex-guarded [`Cache`] for parallel threads sharing one instance.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cachet::presets::ConcurrentLruCache;
///
/// let cache: Arc<ConcurrentLruCache<u64, u64>> = Arc::new(ConcurrentLruCache::new(1024));
/// let worker = Arc::clone(&cache);
/// std::thread::spawn(move || {
///     worker.insert(1, 100);
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(cache.find(&1), Some(100));
/// ```
pub struct ConcurrentCache<K, V, A, E, C, KM = SizeOf, VM = SizeOf, S = ahash::RandomState>
where
    C: ConstraintPolicy<K, V>,
{
    inner: Mutex<Cache<K, V, A, E, C, KM, VM, S>>,
}

impl<K, V, A, E, C, KM, VM, S> ConcurrentCache<K, V, A, E, C, KM, VM, S>
where
    K: Eq + Hash,
    A: AdmissionPolicy<K, V>,
    E: EvictionPolicy<K, V>,
    C: ConstraintPolicy<K, V>,
    KM: Measure<K>,
    VM: Measure<V>,
    S: BuildHasher,
{
    /// Creates a cache from its constraint parameters; see [`Cache::new`].
    pub fn new(params: C::Params) -> Self
    where
        A: Default,
        E: Default,
        KM: Default,
        VM: Default,
        S: Default,
    {
        Self::with_statistics_window(params, DEFAULT_STATISTICS_WINDOW)
    }

    /// Like [`new`](Self::new), with an explicit statistics window.
    pub fn with_statistics_window(params: C::Params, window: u32) -> Self
    where
        A: Default,
        E: Default,
        KM: Default,
        VM: Default,
        S: Default,
    {
        Self {
            inner: Mutex::new(Cache::with_statistics_window(params, window)),
        }
    }

    /// Wraps an already-configured single-threaded cache.
    pub fn from_cache(cache: Cache<K, V, A, E, C, KM, VM, S>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    /// Import construction; see [`Cache::from_entries`].
    pub fn from_entries<I>(entries: I, params: C::Params) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        A: Default,
        E: Default,
        KM: Default,
        VM: Default,
        S: Default,
    {
        Self {
            inner: Mutex::new(Cache::from_entries(entries, params)),
        }
    }

    /// Locks the cache for a sequence of operations under one guard.
    ///
    /// The guard dereferences to the single-threaded core, including the
    /// policy accessors used for configuration.
    pub fn lock(&self) -> MutexGuard<'_, Cache<K, V, A, E, C, KM, VM, S>> {
        self.inner.lock()
    }

    /// Returns `true` if the probe matches a resident key.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.lock().contains(key)
    }

    /// Looks up a probe, returning a clone of the value.
    pub fn find<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
        V: Clone,
    {
        self.inner.lock().find(key).cloned()
    }

    /// Looks up a probe and runs `f` on a borrowed view of the value under
    /// the guard; the non-copying lookup for values that cannot clone.
    pub fn find_with<Q, R>(&self, key: &Q, f: impl FnOnce(&V) -> R) -> Option<R>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.lock().find(key).map(f)
    }

    /// Inserts or updates a key/value pair; see [`Cache::insert`].
    pub fn insert(&self, key: K, value: V) -> bool {
        self.inner.lock().insert(key, value)
    }

    /// Removes the entry matching the probe. Returns whether it existed.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    /// Drops every entry and resets policies and statistics.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Keeps only entries matching the predicate. The predicate runs under
    /// the guard and must not call back into this cache.
    pub fn retain(&self, predicate: impl FnMut(&K, &V) -> bool) {
        self.inner.lock().retain(predicate);
    }

    /// Visits every resident entry under the guard. The visitor must not
    /// call back into this cache.
    pub fn for_each(&self, f: impl FnMut(&K, &V)) {
        self.inner.lock().for_each(f);
    }

    /// Copies every entry into `container`; see [`Cache::collect_into`].
    pub fn collect_into<T>(&self, container: &mut T)
    where
        T: Extend<(K, V)>,
        K: Clone,
        V: Clone,
    {
        self.inner.lock().collect_into(container);
    }

    /// Exchanges the complete observable state of two caches.
    ///
    /// Both guards are taken in memory-address order, so two threads swapping
    /// the same pair in opposite directions cannot deadlock.
    pub fn swap(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }
        let (first, second) = if (self as *const Self) < (other as *const Self) {
            (self, other)
        } else {
            (other, self)
        };
        let mut first_guard = first.inner.lock();
        let mut second_guard = second.inner.lock();
        first_guard.swap(&mut second_guard);
    }

    /// Re-parameterises the constraint; see [`Cache::update_constraint`].
    pub fn update_constraint(&self, params: C::Params) {
        self.inner.lock().update_constraint(params);
    }

    /// Number of resident entries.
    pub fn number_of_items(&self) -> usize {
        self.inner.lock().number_of_items()
    }

    /// Hit fraction over the most recent statistics window.
    pub fn hit_rate(&self) -> f64 {
        self.inner.lock().hit_rate()
    }

    /// Mean bytes returned per lookup over the most recent window.
    pub fn byte_hit_rate(&self) -> f64 {
        self.inner.lock().byte_hit_rate()
    }

    /// The configured statistics window.
    pub fn statistics_window_size(&self) -> u32 {
        self.inner.lock().statistics_window_size()
    }

    /// Reconfigures the statistics window, resetting both accumulators.
    pub fn set_statistics_window_size(&self, window: u32) {
        self.inner.lock().set_statistics_window_size(window);
    }
}
