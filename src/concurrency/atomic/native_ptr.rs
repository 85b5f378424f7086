use core::ffi::c_void;
use core::sync::atomic::{AtomicPtr, Ordering};

use super::ScalarCell;
use crate::object::{Freezable, Mutability};

/// An opaque native pointer.
pub type NativePtr = *mut c_void;

/// A pointer-width cell shared between threads.
///
/// The cell never dereferences the pointer; it only stores and compares its
/// address. There is no arithmetic on this width.
#[repr(transparent)]
pub struct AtomicNativePtr {
    inner: AtomicPtr<c_void>,
}

impl AtomicNativePtr {
    /// Creates a new cell.
    #[inline(always)]
    pub const fn new(value: NativePtr) -> Self {
        Self {
            inner: AtomicPtr::new(value),
        }
    }

    /// Creates a cell holding the null pointer.
    #[inline(always)]
    pub const fn null() -> Self {
        Self::new(core::ptr::null_mut())
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn get(&self) -> NativePtr {
        self.inner.load(Ordering::Acquire)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn set(&self, new_value: NativePtr) {
        self.inner.store(new_value, Ordering::Release);
    }

    /// Stores `new_value` if the current address equals `expected`.
    ///
    /// Always returns the value seen before the operation.
    #[inline(always)]
    pub fn compare_and_swap(&self, expected: NativePtr, new_value: NativePtr) -> NativePtr {
        match self
            .inner
            .compare_exchange(expected, new_value, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(old) | Err(old) => old,
        }
    }

    /// Stores `new_value` if the current address equals `expected`, returning
    /// whether it did.
    #[inline(always)]
    pub fn compare_and_set(&self, expected: NativePtr, new_value: NativePtr) -> bool {
        self.inner
            .compare_exchange(expected, new_value, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns a mutable reference to the value.
    #[inline]
    pub fn get_mut(&mut self) -> &mut NativePtr {
        self.inner.get_mut()
    }

    /// Consumes the cell, returning the value.
    #[inline]
    pub fn into_inner(self) -> NativePtr {
        self.inner.into_inner()
    }
}

impl ScalarCell for AtomicNativePtr {
    type Value = NativePtr;

    #[inline(always)]
    fn get(&self) -> NativePtr {
        AtomicNativePtr::get(self)
    }

    #[inline(always)]
    fn set(&self, new_value: NativePtr) {
        AtomicNativePtr::set(self, new_value);
    }

    #[inline(always)]
    fn compare_and_swap(&self, expected: NativePtr, new_value: NativePtr) -> NativePtr {
        AtomicNativePtr::compare_and_swap(self, expected, new_value)
    }

    #[inline(always)]
    fn compare_and_set(&self, expected: NativePtr, new_value: NativePtr) -> bool {
        AtomicNativePtr::compare_and_set(self, expected, new_value)
    }
}

impl Freezable for AtomicNativePtr {
    #[inline]
    fn mutability(&self) -> Mutability {
        Mutability::Frozen
    }
}

impl Default for AtomicNativePtr {
    fn default() -> Self {
        Self::null()
    }
}

impl From<NativePtr> for AtomicNativePtr {
    fn from(value: NativePtr) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Debug for AtomicNativePtr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AtomicNativePtr").field(&self.get()).finish()
    }
}

impl core::fmt::Display for AtomicNativePtr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Pointer::fmt(&self.get(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_identity_compare() {
        let mut a = 1u32;
        let mut b = 2u32;
        let pa: NativePtr = (&mut a as *mut u32).cast();
        let pb: NativePtr = (&mut b as *mut u32).cast();

        let cell = AtomicNativePtr::default();
        assert!(cell.get().is_null());
        assert!(cell.compare_and_swap(core::ptr::null_mut(), pa).is_null());
        assert_eq!(cell.compare_and_swap(core::ptr::null_mut(), pb), pa);
        assert!(cell.compare_and_set(pa, pb));
        assert_eq!(cell.into_inner(), pb);
    }
}
