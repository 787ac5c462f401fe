//! Cached item record.
//!
//! For every resident key the store holds an [`Entry`]: the owned value plus
//! the key and value sizes measured when the entry was created or last
//! updated. Sizes are cached so that eviction planning and constraint
//! accounting never re-run the user's measurement functions.

/// Snapshot of an entry's measured sizes.
///
/// Handed to `on_update` hooks so policies can see the pre-update footprint
/// after the stored value has already been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntrySizes {
    /// Measured size of the key, in caller-defined units (typically bytes).
    pub key_size: u64,
    /// Measured size of the value.
    pub value_size: u64,
}

impl EntrySizes {
    /// Combined key + value size.
    pub fn total(&self) -> u64 {
        self.key_size + self.value_size
    }
}

/// A value resident in the cache, together with its measured sizes.
///
/// The total size is always `key_size + value_size` for the currently stored
/// value; `replace_value` keeps that consistent.
#[derive(Debug, PartialEq)]
pub struct Entry<V> {
    value: V,
    key_size: u64,
    value_size: u64,
}

impl<V> Entry<V> {
    /// Wraps a value with its measured sizes.
    pub fn new(value: V, key_size: u64, value_size: u64) -> Self {
        Self {
            value,
            key_size,
            value_size,
        }
    }

    /// The stored value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Measured size of the key, cached at insert time.
    pub fn key_size(&self) -> u64 {
        self.key_size
    }

    /// Measured size of the stored value, cached at insert/update time.
    pub fn value_size(&self) -> u64 {
        self.value_size
    }

    /// Combined key + value size.
    pub fn total_size(&self) -> u64 {
        self.key_size + self.value_size
    }

    /// Snapshot of the current sizes.
    pub fn sizes(&self) -> EntrySizes {
        EntrySizes {
            key_size: self.key_size,
            value_size: self.value_size,
        }
    }

    /// Replaces the stored value and its measured size, returning the old
    /// value. The key size is untouched; keys are immutable while resident.
    pub fn replace_value(&mut self, value: V, value_size: u64) -> V {
        self.value_size = value_size;
        std::mem::replace(&mut self.value, value)
    }

    /// Consumes the entry, yielding the stored value.
    pub fn into_value(self) -> V {
        self.value
    }
}
