//! Policy traits composed by the cache core.
//!
//! A [`Cache`](crate::cache::Cache) coordinates three collaborators:
//!
//! | Trait | Question it answers |
//! |---|---|
//! | [`AdmissionPolicy`] | "is this key worth admitting / keeping over another?" |
//! | [`EvictionPolicy`] | "which resident entry should go first?" |
//! | [`ConstraintPolicy`] | "does the cache still fit its budget?" |
//!
//! Every mutation of the cache fans out to the policies as event hooks, in
//! the fixed order admission, eviction, constraint. Hooks have default no-op
//! bodies so a policy only implements the events it actually tracks; the
//! cache never calls a policy re-entrantly.
//!
//! Policies refer to resident entries through [`EntryId`] handles issued by
//! the store. A handle received via `on_insert` stays valid until the same
//! handle is passed to `on_evict`; the cache guarantees `on_evict` fires
//! exactly once per resident entry, strictly before the entry is erased.

use std::hash::Hash;

use equivalent::Equivalent;

use crate::entry::{Entry, EntrySizes};
use crate::store::EntryId;

/// Lazy sequence of eviction candidates, best victim first.
pub type Victims<'a> = Box<dyn Iterator<Item = EntryId> + 'a>;

/// Decides whether candidate keys may enter the cache, and which of two keys
/// deserves residency when they compete.
pub trait AdmissionPolicy<K, V> {
    /// May `candidate` be admitted when the constraint has room?
    fn should_add(&self, candidate: &K) -> bool;

    /// Is `candidate` preferable to the resident `victim`?
    fn should_replace(&self, victim: &K, candidate: &K) -> bool;

    /// A lookup found `key` resident.
    fn on_cache_hit(&mut self, _key: &K, _entry: &Entry<V>) {}

    /// A lookup missed. The probe is handed through as-is; by the
    /// heterogeneous-lookup contract it hashes identically to the absent key.
    fn on_cache_miss<Q>(&mut self, _key: &Q)
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
    }

    /// `key` became resident.
    fn on_insert(&mut self, _key: &K, _entry: &Entry<V>) {}

    /// `key`'s value was replaced in place.
    fn on_update(&mut self, _key: &K, _old: EntrySizes, _entry: &Entry<V>) {}

    /// `key` is about to be erased.
    fn on_evict(&mut self, _key: &K, _entry: &Entry<V>) {}

    /// Drop all per-key state.
    fn clear(&mut self) {}
}

/// Produces eviction candidates in preferred order and tracks residency
/// events to keep that order current.
///
/// Implementations must enumerate **every** resident entry from `victims()`;
/// the cache relies on this to restore a shrunk constraint.
pub trait EvictionPolicy<K, V> {
    /// `key` became resident under handle `id`.
    fn on_insert(&mut self, id: EntryId, key: &K, entry: &Entry<V>);

    /// A lookup found the entry `id` resident.
    fn on_cache_hit(&mut self, _id: EntryId, _key: &K, _entry: &Entry<V>) {}

    /// The entry `id` had its value replaced in place.
    fn on_update(&mut self, _id: EntryId, _key: &K, _old: EntrySizes, _entry: &Entry<V>) {}

    /// The entry `id` is about to be erased. Any internal reference to `id`
    /// must be dropped before returning.
    fn on_evict(&mut self, id: EntryId, key: &K, entry: &Entry<V>);

    /// Drop all per-entry state.
    fn clear(&mut self);

    /// Resident entries in preferred-eviction order.
    ///
    /// The sequence is lazy and reflects current policy state; it is
    /// invalidated by any mutation of the policy, after which callers
    /// reopen it.
    fn victims(&self) -> Victims<'_>;
}

/// Arbiter of whether the cache still fits its budget.
///
/// The cache clones the constraint to plan speculative evictions: candidate
/// victims are applied to the clone via `on_evict` until the clone reports
/// the pending insert or replacement satisfiable, and only then is anything
/// committed.
pub trait ConstraintPolicy<K, V>: Clone {
    /// Budget parameters accepted by construction and `update`.
    type Params;

    /// Creates the constraint with an initial budget.
    fn with_limit(params: Self::Params) -> Self;

    /// Replaces the budget. The cache follows up with evictions until
    /// `is_satisfied` holds again.
    fn update(&mut self, params: Self::Params);

    /// Would the constraint still hold after admitting this entry?
    fn can_add(&self, key: &K, entry: &Entry<V>) -> bool;

    /// Would it hold after replacing `old` with `new` under the same key?
    fn can_replace(&self, key: &K, old: &Entry<V>, new: &Entry<V>) -> bool;

    /// Does the constraint hold right now?
    fn is_satisfied(&self) -> bool;

    /// `key` became resident.
    fn on_insert(&mut self, _key: &K, _entry: &Entry<V>) {}

    /// `key`'s value was replaced in place.
    fn on_update(&mut self, _key: &K, _old: EntrySizes, _entry: &Entry<V>) {}

    /// `key` is about to be erased.
    fn on_evict(&mut self, _key: &K, _entry: &Entry<V>) {}

    /// Reset usage accounting to empty.
    fn clear(&mut self);
}
