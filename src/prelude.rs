//! Convenience re-exports for the common surface.

pub use crate::cache::{Cache, DEFAULT_STATISTICS_WINDOW};
pub use crate::entry::{Entry, EntrySizes};
pub use crate::measure::{Bytes, HeapSize, Measure, SizeOf};
pub use crate::policy::{
    AlwaysAdmit, ConstantCost, Cost, CountConstraint, GdsfEviction, LruEviction, MemoryConstraint,
    SlruEviction, TinyLfuAdmission, TotalSizeCost,
};
pub use crate::presets::{CountLruCache, GdsfCache, LruCache, TinyLfuCache};
pub use crate::store::EntryId;
pub use crate::traits::{AdmissionPolicy, ConstraintPolicy, EvictionPolicy, Victims};

#[cfg(feature = "concurrency")]
pub use crate::concurrent::ConcurrentCache;
#[cfg(feature = "concurrency")]
pub use crate::presets::{
    ConcurrentCountLruCache, ConcurrentGdsfCache, ConcurrentLruCache, ConcurrentTinyLfuCache,
};
