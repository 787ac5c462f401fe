//! Segmented LRU eviction order.
//!
//! ## Architecture
//!
//! ```text
//!   insert ──► PROBATION (LRU list)          PROTECTED (LRU list, capped)
//!              front          back           front            back
//!               │ hit/update: promote ─────►  │                 │
//!               │                             │   overflow: demote tail
//!               │ ◄───────────────────────────┴─────────────────┘
//!               ▼
//!   victims: probation back→front, then protected back→front
//! ```
//!
//! New entries must prove themselves in probation; a second access promotes
//! them into the protected segment. The protected segment has a configurable
//! maximum size, and every promotion that overflows it demotes the protected
//! tail back to the front of probation. The result is scan resistance: a
//! burst of one-shot keys churns probation while the proven working set sits
//! in protected.

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::SlotId;
use crate::ds::slot_list::SlotList;
use crate::entry::{Entry, EntrySizes};
use crate::error::InvariantError;
use crate::store::EntryId;
use crate::traits::{EvictionPolicy, Victims};

/// Protected-segment capacity used when none is configured.
pub const DEFAULT_PROTECTED_SEGMENT_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Probation,
    Protected,
}

/// Two-segment LRU with promotion on re-access.
#[derive(Debug)]
pub struct SlruEviction {
    probation: SlotList<EntryId>,
    protected: SlotList<EntryId>,
    nodes: FxHashMap<EntryId, (Segment, SlotId)>,
    protected_segment_size: usize,
}

impl SlruEviction {
    /// Creates the policy with [`DEFAULT_PROTECTED_SEGMENT_SIZE`].
    pub fn new() -> Self {
        Self::with_protected_segment_size(DEFAULT_PROTECTED_SEGMENT_SIZE)
    }

    /// Creates the policy with the given protected-segment capacity.
    pub fn with_protected_segment_size(size: usize) -> Self {
        Self {
            probation: SlotList::new(),
            protected: SlotList::new(),
            nodes: FxHashMap::default(),
            protected_segment_size: size,
        }
    }

    /// Changes the protected-segment capacity.
    ///
    /// An oversized protected segment shrinks lazily: the next promotion
    /// demotes down to the new capacity.
    pub fn set_protected_segment_size(&mut self, size: usize) {
        self.protected_segment_size = size;
    }

    /// The configured protected-segment capacity.
    pub fn protected_segment_size(&self) -> usize {
        self.protected_segment_size
    }

    /// Number of entries currently in probation.
    pub fn probation_len(&self) -> usize {
        self.probation.len()
    }

    /// Number of entries currently protected.
    pub fn protected_len(&self) -> usize {
        self.protected.len()
    }

    fn promote_or_refresh(&mut self, id: EntryId) {
        match self.nodes.get(&id) {
            Some(&(Segment::Protected, node)) => {
                self.protected.move_to_front(node);
            },
            Some(&(Segment::Probation, node)) => {
                self.probation.remove(node);
                let node = self.protected.push_front(id);
                self.nodes.insert(id, (Segment::Protected, node));
            },
            None => debug_assert!(false, "hit on an entry the policy does not track"),
        }

        while self.protected.len() > self.protected_segment_size {
            let Some(demoted) = self.protected.pop_back() else {
                break;
            };
            let node = self.probation.push_front(demoted);
            self.nodes.insert(demoted, (Segment::Probation, node));
        }
    }

    /// Validates segment bookkeeping; intended for tests and debugging.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.nodes.len() != self.probation.len() + self.protected.len() {
            return Err(InvariantError::new(format!(
                "node map holds {} entries but segments hold {} + {}",
                self.nodes.len(),
                self.probation.len(),
                self.protected.len()
            )));
        }
        for (&id, &(segment, node)) in &self.nodes {
            let list = match segment {
                Segment::Probation => &self.probation,
                Segment::Protected => &self.protected,
            };
            if list.get(node) != Some(&id) {
                return Err(InvariantError::new(format!(
                    "entry {:?} is not where its segment map says it is",
                    id
                )));
            }
        }
        Ok(())
    }
}

impl Default for SlruEviction {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> EvictionPolicy<K, V> for SlruEviction {
    fn on_insert(&mut self, id: EntryId, _key: &K, _entry: &Entry<V>) {
        debug_assert!(!self.nodes.contains_key(&id));
        let node = self.probation.push_front(id);
        self.nodes.insert(id, (Segment::Probation, node));
    }

    fn on_cache_hit(&mut self, id: EntryId, _key: &K, _entry: &Entry<V>) {
        self.promote_or_refresh(id);
    }

    fn on_update(&mut self, id: EntryId, _key: &K, _old: EntrySizes, _entry: &Entry<V>) {
        self.promote_or_refresh(id);
    }

    fn on_evict(&mut self, id: EntryId, _key: &K, _entry: &Entry<V>) {
        match self.nodes.remove(&id) {
            Some((Segment::Probation, node)) => {
                self.probation.remove(node);
            },
            Some((Segment::Protected, node)) => {
                self.protected.remove(node);
            },
            None => debug_assert!(false, "eviction of an entry the policy does not track"),
        }
    }

    fn clear(&mut self) {
        self.probation.clear();
        self.protected.clear();
        self.nodes.clear();
    }

    fn victims(&self) -> Victims<'_> {
        Box::new(
            self.probation
                .iter_from_back()
                .chain(self.protected.iter_from_back())
                .copied(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::slot_arena::SlotId;

    fn id(n: usize) -> EntryId {
        EntryId(SlotId::new(n as u32, 0))
    }

    fn entry() -> Entry<u32> {
        Entry::new(0, 1, 4)
    }

    fn insert(policy: &mut SlruEviction, n: usize) {
        policy.on_insert(id(n), &0u32, &entry());
    }

    fn hit(policy: &mut SlruEviction, n: usize) {
        policy.on_cache_hit(id(n), &0u32, &entry());
    }

    fn victim_order(policy: &SlruEviction) -> Vec<EntryId> {
        EvictionPolicy::<u32, u32>::victims(policy).collect()
    }

    #[test]
    fn inserts_land_in_probation() {
        let mut policy = SlruEviction::with_protected_segment_size(4);
        for n in 0..3 {
            insert(&mut policy, n);
        }
        assert_eq!(policy.probation_len(), 3);
        assert_eq!(policy.protected_len(), 0);
        assert_eq!(victim_order(&policy), vec![id(0), id(1), id(2)]);
        policy.check_invariants().unwrap();
    }

    #[test]
    fn a_hit_promotes_out_of_probation() {
        let mut policy = SlruEviction::with_protected_segment_size(4);
        for n in 0..5 {
            insert(&mut policy, n);
        }
        hit(&mut policy, 0);

        assert_eq!(policy.protected_len(), 1);
        // Probation victims first, the promoted entry last.
        assert_eq!(
            victim_order(&policy),
            vec![id(1), id(2), id(3), id(4), id(0)]
        );
        policy.check_invariants().unwrap();
    }

    #[test]
    fn protected_overflow_demotes_its_coldest_entry() {
        let mut policy = SlruEviction::with_protected_segment_size(4);
        for n in 0..5 {
            insert(&mut policy, n);
        }
        // Promote all five; the protected cap is four, so the first
        // promotion (entry 0) is demoted back to probation.
        for n in 0..5 {
            hit(&mut policy, n);
        }

        assert_eq!(policy.protected_len(), 4);
        assert_eq!(policy.probation_len(), 1);
        assert_eq!(
            victim_order(&policy),
            vec![id(0), id(1), id(2), id(3), id(4)]
        );
        policy.check_invariants().unwrap();
    }

    #[test]
    fn hits_inside_protected_reorder_it() {
        let mut policy = SlruEviction::with_protected_segment_size(4);
        for n in 0..2 {
            insert(&mut policy, n);
        }
        hit(&mut policy, 0);
        hit(&mut policy, 1);
        // Both protected; refresh 0 so 1 becomes the colder one.
        hit(&mut policy, 0);

        assert_eq!(victim_order(&policy), vec![id(1), id(0)]);
    }

    #[test]
    fn eviction_removes_from_either_segment() {
        let mut policy = SlruEviction::with_protected_segment_size(4);
        for n in 0..3 {
            insert(&mut policy, n);
        }
        hit(&mut policy, 2);

        policy.on_evict(id(0), &0u32, &entry());
        policy.on_evict(id(2), &0u32, &entry());
        assert_eq!(victim_order(&policy), vec![id(1)]);
        policy.check_invariants().unwrap();
    }

    #[test]
    fn shrinking_the_protected_cap_takes_effect_on_next_promotion() {
        let mut policy = SlruEviction::with_protected_segment_size(4);
        for n in 0..4 {
            insert(&mut policy, n);
        }
        for n in 0..4 {
            hit(&mut policy, n);
        }
        assert_eq!(policy.protected_len(), 4);

        policy.set_protected_segment_size(2);
        hit(&mut policy, 0);
        assert_eq!(policy.protected_len(), 2);
        assert_eq!(policy.probation_len(), 2);
        policy.check_invariants().unwrap();
    }

    #[test]
    fn clear_resets_both_segments() {
        let mut policy = SlruEviction::new();
        insert(&mut policy, 0);
        hit(&mut policy, 0);
        EvictionPolicy::<u32, u32>::clear(&mut policy);

        assert_eq!(policy.probation_len() + policy.protected_len(), 0);
        assert!(victim_order(&policy).is_empty());
    }
}
