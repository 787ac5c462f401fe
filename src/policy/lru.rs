//! Least-recently-used eviction order.
//!
//! A [`SlotList`] keeps entry handles from most to least recently used; a
//! side map locates each handle's list node for O(1) reordering. Victims are
//! offered from the back of the list.

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::SlotId;
use crate::ds::slot_list::SlotList;
use crate::entry::{Entry, EntrySizes};
use crate::store::EntryId;
use crate::traits::{EvictionPolicy, Victims};

/// Classic LRU: hits and updates refresh recency, victims come coldest
/// first.
#[derive(Debug, Default)]
pub struct LruEviction {
    list: SlotList<EntryId>,
    nodes: FxHashMap<EntryId, SlotId>,
}

impl LruEviction {
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently tracked.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no entries are tracked.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn refresh(&mut self, id: EntryId) {
        match self.nodes.get(&id) {
            Some(&node) => {
                self.list.move_to_front(node);
            },
            // A hit for an untracked entry means the cache and the policy
            // disagree about residency.
            None => debug_assert!(false, "hit on an entry the policy does not track"),
        }
    }
}

impl<K, V> EvictionPolicy<K, V> for LruEviction {
    fn on_insert(&mut self, id: EntryId, _key: &K, _entry: &Entry<V>) {
        debug_assert!(!self.nodes.contains_key(&id));
        let node = self.list.push_front(id);
        self.nodes.insert(id, node);
    }

    fn on_cache_hit(&mut self, id: EntryId, _key: &K, _entry: &Entry<V>) {
        self.refresh(id);
    }

    fn on_update(&mut self, id: EntryId, _key: &K, _old: EntrySizes, _entry: &Entry<V>) {
        self.refresh(id);
    }

    fn on_evict(&mut self, id: EntryId, _key: &K, _entry: &Entry<V>) {
        match self.nodes.remove(&id) {
            Some(node) => {
                self.list.remove(node);
            },
            None => debug_assert!(false, "eviction of an entry the policy does not track"),
        }
    }

    fn clear(&mut self) {
        self.list.clear();
        self.nodes.clear();
    }

    fn victims(&self) -> Victims<'_> {
        Box::new(self.list.iter_from_back().copied())
    }
}
