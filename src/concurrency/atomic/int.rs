use core::sync::atomic::{AtomicI32, Ordering};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{IntegerCell, ScalarCell};
use crate::object::{Freezable, Mutability};

/// A 32-bit integer cell shared between threads.
#[repr(transparent)]
pub struct AtomicInt {
    inner: AtomicI32,
}

impl AtomicInt {
    /// Creates a new cell.
    #[inline(always)]
    pub const fn new(value: i32) -> Self {
        Self {
            inner: AtomicI32::new(value),
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn get(&self) -> i32 {
        self.inner.load(Ordering::Acquire)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn set(&self, new_value: i32) {
        self.inner.store(new_value, Ordering::Release);
    }

    /// Adds `delta` and returns the new value, wrapping on overflow.
    #[inline(always)]
    pub fn add_and_get(&self, delta: i32) -> i32 {
        self.inner
            .fetch_add(delta, Ordering::AcqRel)
            .wrapping_add(delta)
    }

    /// Adds one and returns the new value.
    ///
    /// Same as [`IntegerCell::increment`], callable without the trait in scope.
    #[inline(always)]
    pub fn increment(&self) -> i32 {
        self.add_and_get(1)
    }

    /// Subtracts one and returns the new value.
    ///
    /// Same as [`IntegerCell::decrement`], callable without the trait in scope.
    #[inline(always)]
    pub fn decrement(&self) -> i32 {
        self.add_and_get(-1)
    }

    /// Stores `new_value` if the current value equals `expected`.
    ///
    /// Always returns the value seen before the operation.
    #[inline(always)]
    pub fn compare_and_swap(&self, expected: i32, new_value: i32) -> i32 {
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
    pub fn compare_and_set(&self, expected: i32, new_value: i32) -> bool {
        self.inner
            .compare_exchange(expected, new_value, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns a mutable reference to the value.
    ///
    /// This is safe because `&mut self` guarantees exclusive access.
    #[inline]
    pub fn get_mut(&mut self) -> &mut i32 {
        self.inner.get_mut()
    }

    /// Consumes the cell, returning the value.
    #[inline]
    pub fn into_inner(self) -> i32 {
        self.inner.into_inner()
    }
}

impl ScalarCell for AtomicInt {
    type Value = i32;

    #[inline(always)]
    fn get(&self) -> i32 {
        AtomicInt::get(self)
    }

    #[inline(always)]
    fn set(&self, new_value: i32) {
        AtomicInt::set(self, new_value);
    }

    #[inline(always)]
    fn compare_and_swap(&self, expected: i32, new_value: i32) -> i32 {
        AtomicInt::compare_and_swap(self, expected, new_value)
    }

    #[inline(always)]
    fn compare_and_set(&self, expected: i32, new_value: i32) -> bool {
        AtomicInt::compare_and_set(self, expected, new_value)
    }
}

impl IntegerCell for AtomicInt {
    type Int = i32;

    #[inline(always)]
    fn add_and_get(&self, delta: i32) -> i32 {
        AtomicInt::add_and_get(self, delta)
    }
}

impl Freezable for AtomicInt {
    #[inline]
    fn mutability(&self) -> Mutability {
        Mutability::Frozen
    }
}

impl Default for AtomicInt {
    fn default() -> Self {
        Self::new(0)
    }
}

impl From<i32> for AtomicInt {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Debug for AtomicInt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AtomicInt").field(&self.get()).finish()
    }
}

impl core::fmt::Display for AtomicInt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.get(), f)
    }
}

impl Serialize for AtomicInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AtomicInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get_wraps() {
        let cell = AtomicInt::new(i32::MAX);
        assert_eq!(cell.add_and_get(1), i32::MIN);
        assert_eq!(cell.decrement(), i32::MAX);
    }

    #[test]
    fn test_compare_and_swap_scenario() {
        let cell = AtomicInt::new(10);
        assert_eq!(cell.compare_and_swap(10, 20), 10);
        assert_eq!(cell.get(), 20);
        assert_eq!(cell.compare_and_swap(10, 30), 20);
        assert_eq!(cell.get(), 20);
    }

    #[test]
    fn test_exclusive_access() {
        let mut cell = AtomicInt::default();
        *cell.get_mut() = 7;
        assert_eq!(cell.increment(), 8);
        assert_eq!(format!("{cell}"), "8");
        assert_eq!(format!("{cell:?}"), "AtomicInt(8)");
        assert_eq!(cell.into_inner(), 8);
    }
}
