//! Admission, eviction, and constraint policy implementations.

pub mod always;
pub mod constraint;
pub mod gdsf;
pub mod lru;
pub mod slru;
pub mod tinylfu;

pub use always::AlwaysAdmit;
pub use constraint::{CountConstraint, MemoryConstraint};
pub use gdsf::{ConstantCost, Cost, GdsfEviction, TotalSizeCost};
pub use lru::LruEviction;
pub use slru::SlruEviction;
pub use tinylfu::TinyLfuAdmission;
