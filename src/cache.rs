//! The cache orchestrator.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌───────────────────────────────────────────┐
//!                    │              Cache<K, V, …>               │
//!                    │                                           │
//!   find/insert ────►│  SlabStore<K, V>        RollingMean x2    │
//!   remove/retain    │      │                                    │
//!                    │      │ events + decision queries          │
//!                    │      ▼                                    │
//!                    │  AdmissionPolicy ─► EvictionPolicy ─►     │
//!                    │                        ConstraintPolicy   │
//!                    └───────────────────────────────────────────┘
//! ```
//!
//! The orchestrator owns the store and routes every mutation through the
//! three policies: admission decides whether a key deserves residency,
//! eviction ranks the resident entries, the constraint arbitrates the
//! budget. Events fan out in that fixed order, once per policy.
//!
//! ## The insert protocol
//!
//! An insert that does not fit immediately is *planned* before anything is
//! touched. The constraint is cloned, and candidate victims from
//! `victims()` are applied to the clone one at a time:
//!
//! 1. If the clone already reports the insert satisfiable, stop; no further
//!    victim is taken.
//! 2. Otherwise the admission policy must prefer the candidate over the
//!    victim (`should_replace`); a single veto aborts the whole insert with
//!    the cache untouched.
//! 3. The victim is applied to the clone and recorded in a pending list.
//!
//! Only when the clone is satisfied are the pending victims actually
//! evicted and the new entry installed. Nothing is lost to an insert that
//! ultimately fails, and no victim is evicted unless strictly required.
//!
//! ## Threading
//!
//! `Cache` itself is single-threaded; mutations take `&mut self`. The
//! [`ConcurrentCache`](crate::concurrent::ConcurrentCache) wrapper adds the
//! shared-access guard.

use std::hash::{BuildHasher, Hash};

use equivalent::Equivalent;

use crate::entry::Entry;
use crate::measure::{Measure, SizeOf};
use crate::stats::RollingMean;
use crate::store::{EntryId, SlabStore};
use crate::traits::{AdmissionPolicy, ConstraintPolicy, EvictionPolicy};

/// Statistics window used when none is configured.
pub const DEFAULT_STATISTICS_WINDOW: u32 = 1000;

/// Policy-parameterised cache core.
///
/// # Type Parameters
///
/// - `K`: key type; hashable, comparable, owned by the store
/// - `V`: value type; owned by the store
/// - `A`: [`AdmissionPolicy`]
/// - `E`: [`EvictionPolicy`]
/// - `C`: [`ConstraintPolicy`]
/// - `KM`, `VM`: [`Measure`] implementations for keys and values
/// - `S`: `BuildHasher` shared by the store's index and heterogeneous probes
///
/// # Example
///
/// ```
/// use cachet::presets::LruCache;
///
/// // An LRU cache with a 64-byte budget, sizes measured as size_of.
/// let mut cache: LruCache<u64, u64> = LruCache::new(64);
/// assert!(cache.insert(1, 100));
/// assert_eq!(cache.find(&1), Some(&100));
/// assert_eq!(cache.find(&2), None);
/// ```
pub struct Cache<K, V, A, E, C, KM = SizeOf, VM = SizeOf, S = ahash::RandomState>
where
    C: ConstraintPolicy<K, V>,
{
    store: SlabStore<K, V, S>,
    admission: A,
    eviction: E,
    constraint: C,
    key_measure: KM,
    value_measure: VM,
    hit_rate: RollingMean,
    byte_hit_rate: RollingMean,
}

impl<K, V, A, E, C, KM, VM, S> Cache<K, V, A, E, C, KM, VM, S>
where
    K: Eq + Hash,
    A: AdmissionPolicy<K, V>,
    E: EvictionPolicy<K, V>,
    C: ConstraintPolicy<K, V>,
    KM: Measure<K>,
    VM: Measure<V>,
    S: BuildHasher,
{
    /// Creates a cache from its constraint parameters, with default-built
    /// policies and measurers and the default statistics window.
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
        Self::with_parts(
            A::default(),
            E::default(),
            C::with_limit(params),
            KM::default(),
            VM::default(),
            window,
        )
    }

    /// Creates a cache from explicitly constructed collaborators.
    pub fn with_parts(
        admission: A,
        eviction: E,
        constraint: C,
        key_measure: KM,
        value_measure: VM,
        window: u32,
    ) -> Self
    where
        S: Default,
    {
        assert!(window > 0, "statistics window must be non-zero");
        Self {
            store: SlabStore::with_hasher(S::default()),
            admission,
            eviction,
            constraint,
            key_measure,
            value_measure,
            hit_rate: RollingMean::new(window),
            byte_hit_rate: RollingMean::new(window),
        }
    }

    /// Import construction: inserts pairs in order while the constraint
    /// keeps room, stopping silently at the first rejection.
    ///
    /// Imported entries bypass admission; they fire `on_insert` (or
    /// `on_update` for duplicate keys) like any other residency change.
    pub fn from_entries<I>(entries: I, params: C::Params) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        A: Default,
        E: Default,
        KM: Default,
        VM: Default,
        S: Default,
    {
        let mut cache = Self::new(params);
        for (key, value) in entries {
            let key_size = cache.key_measure.measure(&key);
            let value_size = cache.value_measure.measure(&value);

            if let Some(id) = cache.store.find(&key) {
                let entry = Entry::new(value, key_size, value_size);
                let old = cache.store.entry(id).expect("handle from find is live");
                if !cache.constraint.can_replace(&key, old, &entry) {
                    break;
                }
                cache.apply_update(id, entry);
            } else {
                let entry = Entry::new(value, key_size, value_size);
                if !cache.constraint.can_add(&key, &entry) {
                    break;
                }
                cache.install(key, entry);
            }
        }
        cache
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Returns `true` if the probe matches a resident key.
    ///
    /// Pure query: no statistics sample is recorded and no policy observes
    /// the probe.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.store.find(key).is_some()
    }

    /// Looks up a probe, returning a borrowed view of the value.
    ///
    /// Records one sample in each statistics accumulator and notifies the
    /// policies of the hit or miss.
    pub fn find<Q>(&mut self, key: &Q) -> Option<&V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        match self.store.find(key) {
            Some(id) => {
                let (resident_key, entry) = self.store.get(id).expect("handle from find is live");
                self.hit_rate.record(1);
                self.byte_hit_rate.record(entry.value_size());
                self.admission.on_cache_hit(resident_key, entry);
                self.eviction.on_cache_hit(id, resident_key, entry);
                self.store.entry(id).map(|entry| entry.value())
            },
            None => {
                self.hit_rate.record(0);
                self.byte_hit_rate.record(0);
                self.admission.on_cache_miss(key);
                None
            },
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Inserts or updates a key/value pair.
    ///
    /// Returns `false` when admission vetoes the key or when no admissible
    /// sequence of evictions can make it fit; in that case the cache is
    /// unchanged and no event fires.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let key_size = self.key_measure.measure(&key);
        let value_size = self.value_measure.measure(&value);
        let entry = Entry::new(value, key_size, value_size);

        match self.store.find(&key) {
            Some(id) => {
                let Some(pending) = self.plan_replace(id, &key, &entry) else {
                    return false;
                };
                for victim in pending {
                    self.evict(victim);
                }
                // The planned victims may have included the updated entry
                // itself, turning the update into a fresh insert.
                match self.store.find(&key) {
                    Some(id) => self.apply_update(id, entry),
                    None => self.install(key, entry),
                }
                true
            },
            None => {
                let Some(pending) = self.plan_insert(&key, &entry) else {
                    return false;
                };
                for victim in pending {
                    self.evict(victim);
                }
                self.install(key, entry);
                true
            },
        }
    }

    /// Removes the entry matching the probe. Returns whether it existed.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        match self.store.find(key) {
            Some(id) => {
                self.evict(id);
                true
            },
            None => false,
        }
    }

    /// Drops every entry, clears every policy, and resets both statistics
    /// accumulators.
    pub fn clear(&mut self) {
        self.store.clear();
        self.admission.clear();
        self.eviction.clear();
        self.constraint.clear();
        self.hit_rate.reset();
        self.byte_hit_rate.reset();
    }

    /// Keeps only the entries for which the predicate returns `true`.
    ///
    /// Dropped entries fire `on_evict` exactly like policy evictions. The
    /// predicate must not re-enter the cache.
    pub fn retain(&mut self, mut predicate: impl FnMut(&K, &V) -> bool) {
        let doomed: Vec<EntryId> = self
            .store
            .iter()
            .filter(|(_, key, entry)| !predicate(key, entry.value()))
            .map(|(id, _, _)| id)
            .collect();
        for id in doomed {
            self.evict(id);
        }
    }

    /// Visits every resident entry. The visitor must not re-enter the cache.
    pub fn for_each(&self, mut f: impl FnMut(&K, &V)) {
        for (_, key, entry) in self.store.iter() {
            f(key, entry.value());
        }
    }

    /// Copies every entry into `container`.
    ///
    /// Both sequence targets (`Vec<(K, V)>`) and associative targets
    /// (`HashMap<K, V>`) satisfy `Extend`; the exact entry count flows
    /// through the iterator's `size_hint` so targets can reserve up front.
    pub fn collect_into<T>(&self, container: &mut T)
    where
        T: Extend<(K, V)>,
        K: Clone,
        V: Clone,
    {
        container.extend(
            self.store
                .iter()
                .map(|(_, key, entry)| (key.clone(), entry.value().clone())),
        );
    }

    /// Exchanges the complete observable state of two caches.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Re-parameterises the constraint, then evicts in policy order until it
    /// is satisfied again.
    ///
    /// # Panics
    ///
    /// Panics if the eviction policy exhausts its victim sequence while the
    /// constraint is still violated; `victims()` enumerating every resident
    /// entry is part of the [`EvictionPolicy`] contract.
    pub fn update_constraint(&mut self, params: C::Params) {
        self.constraint.update(params);
        while !self.constraint.is_satisfied() {
            // Evicting invalidates the victim sequence, so it is reopened
            // for every removal.
            let Some(victim) = self.eviction.victims().next() else {
                break;
            };
            self.evict(victim);
        }
        assert!(
            self.constraint.is_satisfied(),
            "constraint still violated after exhausting the eviction policy"
        );
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Number of resident entries.
    pub fn number_of_items(&self) -> usize {
        self.store.len()
    }

    /// Hit fraction over the most recent statistics window.
    pub fn hit_rate(&self) -> f64 {
        self.hit_rate.mean()
    }

    /// Mean bytes returned per lookup over the most recent window.
    pub fn byte_hit_rate(&self) -> f64 {
        self.byte_hit_rate.mean()
    }

    /// The configured statistics window.
    pub fn statistics_window_size(&self) -> u32 {
        self.hit_rate.window()
    }

    /// Reconfigures the statistics window, resetting both accumulators.
    pub fn set_statistics_window_size(&mut self, window: u32) {
        assert!(window > 0, "statistics window must be non-zero");
        self.hit_rate = RollingMean::new(window);
        self.byte_hit_rate = RollingMean::new(window);
    }

    /// The admission policy.
    pub fn admission_policy(&self) -> &A {
        &self.admission
    }

    /// Mutable access to the admission policy, for configuration.
    pub fn admission_policy_mut(&mut self) -> &mut A {
        &mut self.admission
    }

    /// The eviction policy.
    pub fn eviction_policy(&self) -> &E {
        &self.eviction
    }

    /// Mutable access to the eviction policy, for configuration.
    pub fn eviction_policy_mut(&mut self) -> &mut E {
        &mut self.eviction
    }

    /// The constraint policy.
    pub fn constraint_policy(&self) -> &C {
        &self.constraint
    }

    // -----------------------------------------------------------------------
    // Planning and commitment
    // -----------------------------------------------------------------------

    /// Plans the evictions required to admit a new key, or `None` to reject.
    ///
    /// With room available the decision belongs to `should_add` alone; the
    /// victim walk would otherwise commit an empty plan and bypass it.
    fn plan_insert(&self, key: &K, entry: &Entry<V>) -> Option<Vec<EntryId>> {
        if self.constraint.can_add(key, entry) {
            return self.admission.should_add(key).then(Vec::new);
        }

        let mut probe = self.constraint.clone();
        let mut pending = Vec::new();
        for victim in self.eviction.victims() {
            if probe.can_add(key, entry) {
                break;
            }
            let (victim_key, victim_entry) = self
                .store
                .get(victim)
                .expect("eviction policy yielded an entry that is not resident");
            if !self.admission.should_replace(victim_key, key) {
                return None;
            }
            probe.on_evict(victim_key, victim_entry);
            pending.push(victim);
        }
        probe.can_add(key, entry).then_some(pending)
    }

    /// Plans the evictions required to replace the value of a resident key,
    /// or `None` to reject.
    fn plan_replace(&self, id: EntryId, key: &K, new_entry: &Entry<V>) -> Option<Vec<EntryId>> {
        let old_entry = self.store.entry(id).expect("handle from find is live");
        if self.constraint.can_replace(key, old_entry, new_entry) {
            return Some(Vec::new());
        }

        let mut probe = self.constraint.clone();
        let mut pending = Vec::new();
        let mut original_evicted = false;
        let satisfied = |probe: &C, original_evicted: bool| {
            if original_evicted {
                probe.can_add(key, new_entry)
            } else {
                probe.can_replace(key, old_entry, new_entry)
            }
        };

        for victim in self.eviction.victims() {
            if satisfied(&probe, original_evicted) {
                break;
            }
            let (victim_key, victim_entry) = self
                .store
                .get(victim)
                .expect("eviction policy yielded an entry that is not resident");
            if !self.admission.should_replace(victim_key, key) {
                return None;
            }
            probe.on_evict(victim_key, victim_entry);
            if victim == id {
                // The entry under replacement went to the victims itself;
                // from here on the plan is for a fresh insert.
                original_evicted = true;
            }
            pending.push(victim);
        }
        satisfied(&probe, original_evicted).then_some(pending)
    }

    /// Installs a new entry and fires `on_insert` on every policy.
    fn install(&mut self, key: K, entry: Entry<V>) {
        let id = self.store.insert(key, entry);
        let (key, entry) = self.store.get(id).expect("freshly inserted");
        self.admission.on_insert(key, entry);
        self.eviction.on_insert(id, key, entry);
        self.constraint.on_insert(key, entry);
    }

    /// Replaces a resident entry's value in place and fires `on_update`.
    fn apply_update(&mut self, id: EntryId, new_entry: Entry<V>) {
        let value_size = new_entry.value_size();
        let slot = self.store.entry_mut(id).expect("handle from find is live");
        let old_sizes = slot.sizes();
        slot.replace_value(new_entry.into_value(), value_size);

        let (key, entry) = self.store.get(id).expect("handle from find is live");
        self.admission.on_update(key, old_sizes, entry);
        self.eviction.on_update(id, key, old_sizes, entry);
        self.constraint.on_update(key, old_sizes, entry);
    }

    /// Fires `on_evict` on every policy, then erases the entry.
    ///
    /// The policies drop their references while the entry is still resident;
    /// the store erases it afterwards.
    fn evict(&mut self, id: EntryId) {
        let (key, entry) = self
            .store
            .get(id)
            .expect("evicting an entry that is not resident");
        self.admission.on_evict(key, entry);
        self.eviction.on_evict(id, key, entry);
        self.constraint.on_evict(key, entry);
        self.store.remove(id);
    }
}
