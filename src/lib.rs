//! cachet: policy-parameterised in-process caching.
//!
//! One cache core, three pluggable collaborators: an admission policy
//! decides whether a key deserves residency, an eviction policy ranks the
//! resident entries, and a constraint policy arbitrates the budget (bytes
//! or entry count). Composing them yields classical LRU, scan-resistant
//! segmented LRU, frequency-aware TinyLFU admission, and cost-weighted GDSF
//! eviction from the same orchestrator; see [`presets`] for the stock
//! combinations and [`traits`] for plugging in your own.
//!
//! ```
//! use cachet::measure::Bytes;
//! use cachet::presets::LruCache;
//!
//! let mut cache: LruCache<String, Vec<u8>, Bytes, Bytes> = LruCache::new(1 << 20);
//! cache.insert("config".into(), vec![0u8; 512]);
//!
//! // Heterogeneous probe: a &str looks up a String key directly.
//! assert!(cache.contains("config"));
//! assert_eq!(cache.hit_rate(), 0.0); // contains() records no sample
//! ```

/// The cache orchestrator coordinating store, policies, and statistics.
pub mod cache;

/// Internal data structures: slot arena, arena-backed list, bloom sketches,
/// and the probe-index mixer.
pub mod ds;

/// The cached item record with its measured sizes.
pub mod entry;

/// Configuration and invariant error types.
pub mod error;

/// Size measurement traits and stock measurers.
pub mod measure;

/// Admission, eviction, and constraint policy implementations.
pub mod policy;

/// Ready-made cache type aliases.
pub mod presets;

/// Convenience re-exports.
pub mod prelude;

/// Rolling statistics accumulators.
pub mod stats;

/// The handle-based primary store.
pub mod store;

/// The policy traits composed by the cache.
pub mod traits;

/// Mutex-guarded wrapper for sharing one cache across threads.
///
/// Available with the `concurrency` feature (enabled by default).
#[cfg(feature = "concurrency")]
pub mod concurrent;

pub use cache::Cache;
#[cfg(feature = "concurrency")]
pub use concurrent::ConcurrentCache;
pub use entry::Entry;
pub use store::EntryId;
pub use traits::{AdmissionPolicy, ConstraintPolicy, EvictionPolicy};
