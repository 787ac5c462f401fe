//! Size measurement for keys and values.
//!
//! The cache never inspects keys or values itself; it asks a [`Measure`]
//! implementation once per insert/update and caches the result in the entry
//! record. Measurers must be pure: the same object measures the same.
//!
//! ## Key Components
//! - [`SizeOf`]: static `size_of::<T>()`, right for plain-old-data types
//! - [`Bytes`]: payload length in bytes for strings, vectors, and slices
//! - [`HeapSize`]: allocation-aware variant based on `capacity()`
//!
//! Smart-pointer wrappers (`Box`, `Arc`) measure as their pointee, so a
//! `Cache<K, Arc<V>>` can still budget by the underlying data.

use std::sync::Arc;

/// Measures the size of an object, in caller-defined units (usually bytes).
pub trait Measure<T: ?Sized> {
    /// Returns the measured size of `object`.
    fn measure(&self, object: &T) -> u64;
}

/// Measures every object as its static `std::mem::size_of` footprint.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeOf;

impl<T> Measure<T> for SizeOf {
    fn measure(&self, _object: &T) -> u64 {
        std::mem::size_of::<T>() as u64
    }
}

/// Measures contiguous containers by payload length in bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bytes;

impl Measure<String> for Bytes {
    fn measure(&self, object: &String) -> u64 {
        object.len() as u64
    }
}

impl Measure<str> for Bytes {
    fn measure(&self, object: &str) -> u64 {
        object.len() as u64
    }
}

impl<'a> Measure<&'a str> for Bytes {
    fn measure(&self, object: &&'a str) -> u64 {
        object.len() as u64
    }
}

impl<T> Measure<Vec<T>> for Bytes {
    fn measure(&self, object: &Vec<T>) -> u64 {
        (object.len() * std::mem::size_of::<T>()) as u64
    }
}

impl<T> Measure<[T]> for Bytes {
    fn measure(&self, object: &[T]) -> u64 {
        std::mem::size_of_val(object) as u64
    }
}

impl<T: ?Sized> Measure<Box<T>> for Bytes
where
    Bytes: Measure<T>,
{
    fn measure(&self, object: &Box<T>) -> u64 {
        self.measure(&**object)
    }
}

impl<T: ?Sized> Measure<Arc<T>> for Bytes
where
    Bytes: Measure<T>,
{
    fn measure(&self, object: &Arc<T>) -> u64 {
        self.measure(&**object)
    }
}

/// Measures growable containers by allocated capacity in bytes.
///
/// Small allocations are rounded up to a pointer-width multiple with a
/// 16-byte floor, approximating what a general-purpose allocator hands out;
/// above 1 KiB the capacity is taken as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapSize;

impl HeapSize {
    const ROUNDING_THRESHOLD: usize = 1024;

    fn allocated(capacity_bytes: usize) -> u64 {
        if capacity_bytes < Self::ROUNDING_THRESHOLD {
            Self::round_up(capacity_bytes).max(16) as u64
        } else {
            capacity_bytes as u64
        }
    }

    fn round_up(value: usize) -> usize {
        let word = std::mem::size_of::<*const u8>();
        value.div_ceil(word) * word
    }
}

impl Measure<String> for HeapSize {
    fn measure(&self, object: &String) -> u64 {
        Self::allocated(object.capacity())
    }
}

impl<T> Measure<Vec<T>> for HeapSize {
    fn measure(&self, object: &Vec<T>) -> u64 {
        Self::allocated(object.capacity() * std::mem::size_of::<T>())
    }
}

impl<T: ?Sized> Measure<Box<T>> for HeapSize
where
    HeapSize: Measure<T>,
{
    fn measure(&self, object: &Box<T>) -> u64 {
        self.measure(&**object)
    }
}

impl<T: ?Sized> Measure<Arc<T>> for HeapSize
where
    HeapSize: Measure<T>,
{
    fn measure(&self, object: &Arc<T>) -> u64 {
        self.measure(&**object)
    }
}
