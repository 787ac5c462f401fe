//! Handle-based primary store.
//!
//! ## Architecture
//!
//! ```text
//!   probe (Q)            index: HashTable<EntryId>        slots: SlotArena
//!     │  hash_one(q)     ┌──────────────────────┐     ┌─────────────────────┐
//!     └─────────────────►│ hash ─► EntryId ─────┼────►│ key: K, entry: E<V> │
//!                        └──────────────────────┘     └─────────────────────┘
//!                                                            ▲
//!                        policies hold EntryId ──────────────┘
//! ```
//!
//! Entries live in a [`SlotArena`]; a raw `hashbrown::HashTable` maps key
//! hashes to [`EntryId`] handles. The key is owned exactly once (inside its
//! slot), handles remain stable across inserts and removals of other keys,
//! and lookups accept any probe `Q: Hash + Equivalent<K>` without
//! materialising a `K`. Policies keep `EntryId`s as back-references and are
//! told via `on_evict` before a handle dies.
//!
//! ## Core Operations
//!
//! | Operation | Description | Complexity |
//! |---|---|---|
//! | `find` | probe to handle | O(1) avg |
//! | `get` / `key` / `entry` | handle to data | O(1) |
//! | `insert` | add a new key (precondition: absent) | O(1) avg |
//! | `remove` | erase by handle | O(1) avg |
//! | `iter` | all `(EntryId, &K, &Entry<V>)`, exact-size | O(slots) |

use std::hash::{BuildHasher, Hash};

use equivalent::Equivalent;
use hashbrown::HashTable;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::entry::Entry;

/// Stable handle to a resident cache entry.
///
/// Issued by [`SlabStore::insert`] and invalidated by the matching
/// `remove`. The numeric slot may be reused afterwards, so holders must
/// drop handles when told to (the cache does this through `on_evict`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(pub(crate) SlotId);

#[derive(Debug)]
struct StoreSlot<K, V> {
    key: K,
    entry: Entry<V>,
}

/// Arena-backed key/entry store with heterogeneous lookup.
#[derive(Debug)]
pub struct SlabStore<K, V, S = ahash::RandomState> {
    slots: SlotArena<StoreSlot<K, V>>,
    index: HashTable<EntryId>,
    hasher: S,
}

impl<K, V, S> SlabStore<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates an empty store hashing keys with `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            slots: SlotArena::new(),
            index: HashTable::new(),
            hasher,
        }
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Looks up the handle for a probe, if resident.
    pub fn find<Q>(&self, probe: &Q) -> Option<EntryId>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let hash = self.hasher.hash_one(probe);
        self.index
            .find(hash, |&id| {
                let slot = self.slots.get(id.0).expect("index entry points at a live slot");
                probe.equivalent(&slot.key)
            })
            .copied()
    }

    /// Returns the key and entry for a handle, if live.
    pub fn get(&self, id: EntryId) -> Option<(&K, &Entry<V>)> {
        self.slots.get(id.0).map(|slot| (&slot.key, &slot.entry))
    }

    /// Returns the key for a handle, if live.
    pub fn key(&self, id: EntryId) -> Option<&K> {
        self.slots.get(id.0).map(|slot| &slot.key)
    }

    /// Returns the entry for a handle, if live.
    pub fn entry(&self, id: EntryId) -> Option<&Entry<V>> {
        self.slots.get(id.0).map(|slot| &slot.entry)
    }

    /// Returns a mutable entry for a handle, if live.
    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut Entry<V>> {
        self.slots.get_mut(id.0).map(|slot| &mut slot.entry)
    }

    /// Inserts a new key. The key must not be resident; updates go through
    /// [`entry_mut`](Self::entry_mut) so handles stay stable.
    pub fn insert(&mut self, key: K, entry: Entry<V>) -> EntryId {
        debug_assert!(self.find(&key).is_none(), "insert of an already-resident key");

        let hash = self.hasher.hash_one(&key);
        let id = EntryId(self.slots.insert(StoreSlot { key, entry }));

        let slots = &self.slots;
        let hasher = &self.hasher;
        self.index.insert_unique(hash, id, |&other| {
            let slot = slots.get(other.0).expect("index entry points at a live slot");
            hasher.hash_one(&slot.key)
        });
        id
    }

    /// Erases the entry for `id`, returning its key and entry.
    pub fn remove(&mut self, id: EntryId) -> Option<(K, Entry<V>)> {
        let hash = {
            let slot = self.slots.get(id.0)?;
            self.hasher.hash_one(&slot.key)
        };
        match self.index.find_entry(hash, |&candidate| candidate == id) {
            Ok(occupied) => {
                occupied.remove();
            },
            Err(_) => debug_assert!(false, "live slot missing from the index"),
        }
        self.slots.remove(id.0).map(|slot| (slot.key, slot.entry))
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    /// Iterates all resident entries. The iterator reports an exact size so
    /// bulk consumers (`Extend`) can reserve in one step.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.slots.iter(),
            remaining: self.slots.len(),
        }
    }
}

/// Exact-size iterator over `(EntryId, &K, &Entry<V>)`.
pub struct Iter<'a, K, V> {
    inner: crate::ds::slot_arena::Iter<'a, StoreSlot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (EntryId, &'a K, &'a Entry<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let (slot_id, slot) = self.inner.next()?;
        self.remaining -= 1;
        Some((EntryId(slot_id), &slot.key, &slot.entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
