//! Budget arbiters: byte budget and item count.
//!
//! Constraint policies answer "does the cache still fit?" and track usage
//! through the same event hooks the other policies receive. They are cheap
//! to clone; the cache clones them to rehearse a sequence of evictions
//! before committing any of them.

use crate::entry::{Entry, EntrySizes};
use crate::traits::ConstraintPolicy;

// ---------------------------------------------------------------------------
// MemoryConstraint
// ---------------------------------------------------------------------------

/// Byte-budget constraint over the measured total size of resident entries.
#[derive(Debug, Clone)]
pub struct MemoryConstraint {
    used: u64,
    maximum: u64,
}

impl MemoryConstraint {
    /// Creates the constraint with a budget of `maximum` bytes.
    pub fn new(maximum: u64) -> Self {
        Self { used: 0, maximum }
    }

    /// Bytes currently used by resident entries.
    pub fn memory(&self) -> u64 {
        self.used
    }

    /// The configured budget, in bytes.
    pub fn maximum_memory(&self) -> u64 {
        self.maximum
    }
}

impl<K, V> ConstraintPolicy<K, V> for MemoryConstraint {
    type Params = u64;

    fn with_limit(maximum: u64) -> Self {
        Self::new(maximum)
    }

    fn update(&mut self, maximum: u64) {
        self.maximum = maximum;
    }

    fn can_add(&self, _key: &K, entry: &Entry<V>) -> bool {
        self.used + entry.total_size() <= self.maximum
    }

    fn can_replace(&self, _key: &K, old: &Entry<V>, new: &Entry<V>) -> bool {
        // Keys are immutable while resident, so only the value delta counts.
        debug_assert_eq!(old.key_size(), new.key_size());
        self.used - old.value_size() + new.value_size() <= self.maximum
    }

    fn is_satisfied(&self) -> bool {
        self.used <= self.maximum
    }

    fn on_insert(&mut self, _key: &K, entry: &Entry<V>) {
        self.used += entry.total_size();
    }

    fn on_update(&mut self, _key: &K, old: EntrySizes, entry: &Entry<V>) {
        self.used = self.used - old.value_size + entry.value_size();
    }

    fn on_evict(&mut self, _key: &K, entry: &Entry<V>) {
        debug_assert!(entry.total_size() <= self.used);
        self.used -= entry.total_size();
    }

    fn clear(&mut self) {
        self.used = 0;
    }
}

// ---------------------------------------------------------------------------
// CountConstraint
// ---------------------------------------------------------------------------

/// Item-count constraint: at most `maximum` resident entries.
#[derive(Debug, Clone)]
pub struct CountConstraint {
    count: usize,
    maximum: usize,
}

impl CountConstraint {
    /// Creates the constraint with room for `maximum` entries.
    pub fn new(maximum: usize) -> Self {
        Self { count: 0, maximum }
    }

    /// Number of resident entries.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The configured entry limit.
    pub fn maximum_count(&self) -> usize {
        self.maximum
    }
}

impl<K, V> ConstraintPolicy<K, V> for CountConstraint {
    type Params = usize;

    fn with_limit(maximum: usize) -> Self {
        Self::new(maximum)
    }

    fn update(&mut self, maximum: usize) {
        self.maximum = maximum;
    }

    fn can_add(&self, _key: &K, _entry: &Entry<V>) -> bool {
        self.count < self.maximum
    }

    fn can_replace(&self, _key: &K, _old: &Entry<V>, _new: &Entry<V>) -> bool {
        debug_assert!(self.count > 0);
        // Replacement does not change the count.
        true
    }

    fn is_satisfied(&self) -> bool {
        self.count <= self.maximum
    }

    fn on_insert(&mut self, _key: &K, _entry: &Entry<V>) {
        self.count += 1;
    }

    fn on_evict(&mut self, _key: &K, _entry: &Entry<V>) {
        debug_assert!(self.count > 0);
        self.count -= 1;
    }

    fn clear(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key_size: u64, value_size: u64) -> Entry<u32> {
        Entry::new(0, key_size, value_size)
    }

    // The hooks are trait methods with generic key/value types; pin them to
    // (u32, u32) once so the tests read cleanly.
    fn can_add(c: &impl ConstraintPolicy<u32, u32>, e: &Entry<u32>) -> bool {
        c.can_add(&0, e)
    }

    fn on_insert(c: &mut impl ConstraintPolicy<u32, u32>, e: &Entry<u32>) {
        c.on_insert(&0, e);
    }

    fn on_evict(c: &mut impl ConstraintPolicy<u32, u32>, e: &Entry<u32>) {
        c.on_evict(&0, e);
    }

    #[test]
    fn memory_constraint_accounts_inserts_and_evictions() {
        let mut constraint = MemoryConstraint::new(10);
        let e = entry(2, 3);

        assert!(can_add(&constraint, &e));
        on_insert(&mut constraint, &e);
        assert_eq!(constraint.memory(), 5);

        on_insert(&mut constraint, &e);
        assert_eq!(constraint.memory(), 10);
        assert!(!can_add(&constraint, &entry(0, 1)));
        assert!(ConstraintPolicy::<u32, u32>::is_satisfied(&constraint));

        on_evict(&mut constraint, &e);
        assert_eq!(constraint.memory(), 5);
    }

    #[test]
    fn memory_constraint_replacement_counts_the_value_delta() {
        let mut constraint = MemoryConstraint::new(10);
        let old = entry(2, 3);
        on_insert(&mut constraint, &old);

        // 5 used; replacing a 3-byte value with an 8-byte one needs 10.
        assert!(constraint.can_replace(&0, &old, &entry(2, 8)));
        assert!(!constraint.can_replace(&0, &old, &entry(2, 9)));

        constraint.on_update(&0, old.sizes(), &entry(2, 8));
        assert_eq!(constraint.memory(), 10);
    }

    #[test]
    fn memory_constraint_update_changes_the_budget_only() {
        let mut constraint = MemoryConstraint::new(10);
        on_insert(&mut constraint, &entry(2, 6));

        ConstraintPolicy::<u32, u32>::update(&mut constraint, 4);
        assert_eq!(constraint.maximum_memory(), 4);
        assert_eq!(constraint.memory(), 8);
        assert!(!ConstraintPolicy::<u32, u32>::is_satisfied(&constraint));
    }

    #[test]
    fn cloned_memory_constraint_diverges_from_the_original() {
        let mut constraint = MemoryConstraint::new(10);
        let e = entry(2, 3);
        on_insert(&mut constraint, &e);

        let mut probe = constraint.clone();
        on_evict(&mut probe, &e);
        assert_eq!(probe.memory(), 0);
        assert_eq!(constraint.memory(), 5);
    }

    #[test]
    fn count_constraint_tracks_entries_not_bytes() {
        let mut constraint = CountConstraint::new(2);
        let huge = entry(1000, 1000);

        assert!(can_add(&constraint, &huge));
        on_insert(&mut constraint, &huge);
        on_insert(&mut constraint, &huge);
        assert!(!can_add(&constraint, &entry(1, 1)));

        // Replacements never change the count.
        assert!(constraint.can_replace(&0u32, &huge, &entry(1000, 9999)));
        on_evict(&mut constraint, &huge);
        assert_eq!(constraint.count(), 1);
        assert!(can_add(&constraint, &entry(1, 1)));
    }

    #[test]
    fn clear_resets_usage_but_not_limits() {
        let mut memory = MemoryConstraint::new(10);
        on_insert(&mut memory, &entry(2, 3));
        ConstraintPolicy::<u32, u32>::clear(&mut memory);
        assert_eq!(memory.memory(), 0);
        assert_eq!(memory.maximum_memory(), 10);

        let mut count = CountConstraint::new(3);
        on_insert(&mut count, &entry(1, 1));
        ConstraintPolicy::<u32, u32>::clear(&mut count);
        assert_eq!(count.count(), 0);
        assert_eq!(count.maximum_count(), 3);
    }
}
