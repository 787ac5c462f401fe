//! Ready-made cache configurations.
//!
//! Each alias picks a proven admission/eviction/constraint combination;
//! construction takes the constraint's budget parameter.
//!
//! | Alias | Admission | Eviction | Constraint |
//! |---|---|---|---|
//! | [`LruCache`] | always | LRU | byte budget |
//! | [`CountLruCache`] | always | LRU | item count |
//! | [`TinyLfuCache`] | TinyLFU | segmented LRU | byte budget |
//! | [`GdsfCache`] | always | GDSF | byte budget |
//!
//! `TinyLfuCache` is the general-purpose frequency-aware choice.
//! `GdsfCache` fits workloads where entry sizes or miss costs vary widely;
//! its cost model is a type parameter defaulting to [`ConstantCost`].
//!
//! # Example
//!
//! ```
//! use cachet::measure::Bytes;
//! use cachet::presets::TinyLfuCache;
//!
//! let mut cache: TinyLfuCache<String, String, Bytes, Bytes> =
//!     TinyLfuCache::new(4096);
//!
//! // TinyLFU wants evidence a key is worth caching: the first sighting is
//! // only recorded, the second one admits.
//! assert!(!cache.insert("k".into(), "v".into()));
//! assert!(cache.find("k").is_none());
//! assert!(cache.insert("k".into(), "v".into()));
//! ```

use crate::cache::Cache;
use crate::measure::SizeOf;
use crate::policy::{
    AlwaysAdmit, ConstantCost, CountConstraint, GdsfEviction, LruEviction, MemoryConstraint,
    SlruEviction, TinyLfuAdmission,
};

/// Least-recently-used cache under a byte budget.
pub type LruCache<K, V, KM = SizeOf, VM = SizeOf> =
    Cache<K, V, AlwaysAdmit, LruEviction, MemoryConstraint, KM, VM>;

/// Least-recently-used cache holding at most N entries.
pub type CountLruCache<K, V, KM = SizeOf, VM = SizeOf> =
    Cache<K, V, AlwaysAdmit, LruEviction, CountConstraint, KM, VM>;

/// Frequency-aware cache: TinyLFU admission over segmented-LRU eviction,
/// under a byte budget.
pub type TinyLfuCache<K, V, KM = SizeOf, VM = SizeOf> =
    Cache<K, V, TinyLfuAdmission, SlruEviction, MemoryConstraint, KM, VM>;

/// Cost-weighted cache: GDSF eviction under a byte budget.
pub type GdsfCache<K, V, C = ConstantCost, KM = SizeOf, VM = SizeOf> =
    Cache<K, V, AlwaysAdmit, GdsfEviction<C>, MemoryConstraint, KM, VM>;

#[cfg(feature = "concurrency")]
mod concurrent_presets {
    use super::*;
    use crate::concurrent::ConcurrentCache;

    /// Thread-safe [`LruCache`].
    pub type ConcurrentLruCache<K, V, KM = SizeOf, VM = SizeOf> =
        ConcurrentCache<K, V, AlwaysAdmit, LruEviction, MemoryConstraint, KM, VM>;

    /// Thread-safe [`CountLruCache`].
    pub type ConcurrentCountLruCache<K, V, KM = SizeOf, VM = SizeOf> =
        ConcurrentCache<K, V, AlwaysAdmit, LruEviction, CountConstraint, KM, VM>;

    /// Thread-safe [`TinyLfuCache`].
    pub type ConcurrentTinyLfuCache<K, V, KM = SizeOf, VM = SizeOf> =
        ConcurrentCache<K, V, TinyLfuAdmission, SlruEviction, MemoryConstraint, KM, VM>;

    /// Thread-safe [`GdsfCache`].
    pub type ConcurrentGdsfCache<K, V, C = ConstantCost, KM = SizeOf, VM = SizeOf> =
        ConcurrentCache<K, V, AlwaysAdmit, GdsfEviction<C>, MemoryConstraint, KM, VM>;
}

#[cfg(feature = "concurrency")]
pub use concurrent_presets::{
    ConcurrentCountLruCache, ConcurrentGdsfCache, ConcurrentLruCache, ConcurrentTinyLfuCache,
};
