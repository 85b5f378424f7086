use core::sync::atomic::Ordering;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{IntegerCell, ScalarCell};
use crate::object::{Freezable, Mutability};

#[cfg(all(target_has_atomic = "64", not(feature = "wide-fallback")))]
use core::sync::atomic::AtomicI64 as Storage;

#[cfg(any(not(target_has_atomic = "64"), feature = "wide-fallback"))]
use super::wide::WideI64 as Storage;

/// A 64-bit integer cell shared between threads.
///
/// On targets with 64-bit atomics this is a plain `AtomicI64`. Elsewhere, and
/// whenever the `wide-fallback` feature is enabled, every operation on every
/// `AtomicLong` is serialized through one process-wide spin lock. The
/// observable behavior is the same; only throughput differs. See
/// [`AtomicLong::is_lock_free`].
#[repr(transparent)]
pub struct AtomicLong {
    inner: Storage,
}

impl AtomicLong {
    /// Creates a new cell.
    #[inline(always)]
    pub const fn new(value: i64) -> Self {
        Self {
            inner: Storage::new(value),
        }
    }

    /// Returns `true` if operations use hardware atomics rather than the
    /// process-wide fallback lock.
    #[inline]
    pub const fn is_lock_free() -> bool {
        cfg!(all(target_has_atomic = "64", not(feature = "wide-fallback")))
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn get(&self) -> i64 {
        self.inner.load(Ordering::Acquire)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn set(&self, new_value: i64) {
        self.inner.store(new_value, Ordering::Release);
    }

    /// Adds `delta` and returns the new value, wrapping on overflow.
    #[inline(always)]
    pub fn add_and_get(&self, delta: i64) -> i64 {
        self.inner
            .fetch_add(delta, Ordering::AcqRel)
            .wrapping_add(delta)
    }

    /// Adds one and returns the new value.
    ///
    /// Same as [`IntegerCell::increment`], callable without the trait in scope.
    #[inline(always)]
    pub fn increment(&self) -> i64 {
        self.add_and_get(1)
    }

    /// Subtracts one and returns the new value.
    ///
    /// Same as [`IntegerCell::decrement`], callable without the trait in scope.
    #[inline(always)]
    pub fn decrement(&self) -> i64 {
        self.add_and_get(-1)
    }

    /// Stores `new_value` if the current value equals `expected`.
    ///
    /// Always returns the value seen before the operation.
    #[inline(always)]
    pub fn compare_and_swap(&self, expected: i64, new_value: i64) -> i64 {
        match self
            .inner
            .compare_exchange(expected, new_value, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(old) | Err(old) => old,
        }
    }

    /// Stores `new_value` if the current value equals `expected`, returning
    /// whether it did.
    #[inline(always)]
    pub fn compare_and_set(&self, expected: i64, new_value: i64) -> bool {
        self.inner
            .compare_exchange(expected, new_value, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns a mutable reference to the value.
    ///
    /// This is safe because `&mut self` guarantees exclusive access.
    #[inline]
    pub fn get_mut(&mut self) -> &mut i64 {
        self.inner.get_mut()
    }

    /// Consumes the cell, returning the value.
    #[inline]
    pub fn into_inner(self) -> i64 {
        self.inner.into_inner()
    }
}

impl ScalarCell for AtomicLong {
    type Value = i64;

    #[inline(always)]
    fn get(&self) -> i64 {
        AtomicLong::get(self)
    }

    #[inline(always)]
    fn set(&self, new_value: i64) {
        AtomicLong::set(self, new_value);
    }

    #[inline(always)]
    fn compare_and_swap(&self, expected: i64, new_value: i64) -> i64 {
        AtomicLong::compare_and_swap(self, expected, new_value)
    }

    #[inline(always)]
    fn compare_and_set(&self, expected: i64, new_value: i64) -> bool {
        AtomicLong::compare_and_set(self, expected, new_value)
    }
}

impl IntegerCell for AtomicLong {
    type Int = i64;

    #[inline(always)]
    fn add_and_get(&self, delta: i64) -> i64 {
        AtomicLong::add_and_get(self, delta)
    }
}

impl Freezable for AtomicLong {
    #[inline]
    fn mutability(&self) -> Mutability {
        Mutability::Frozen
    }
}

impl Default for AtomicLong {
    fn default() -> Self {
        Self::new(0)
    }
}

impl From<i64> for AtomicLong {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Debug for AtomicLong {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AtomicLong").field(&self.get()).finish()
    }
}

impl core::fmt::Display for AtomicLong {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.get(), f)
    }
}

impl Serialize for AtomicLong {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AtomicLong {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::new)
    }
}
