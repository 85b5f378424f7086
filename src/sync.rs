//! Synchronization shim with optional loom support.
//!
//! The lock word and the reference slot storage go through this module so the
//! locked reference swap can be model-checked with loom, while regular builds
//! use `core` atomics and `UnsafeCell` directly.

#[cfg(not(feature = "loom"))]
pub(crate) use core::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "loom")]
pub(crate) use loom::sync::atomic::{AtomicU32, Ordering};

use crossbeam_utils::Backoff;

/// Backs off inside a spin loop.
///
/// Under loom every spin must yield, otherwise the model never terminates.
#[inline]
pub(crate) fn relax(backoff: &Backoff) {
    #[cfg(not(feature = "loom"))]
    backoff.snooze();

    #[cfg(feature = "loom")]
    {
        let _ = backoff;
        loom::thread::yield_now();
    }
}

#[cfg(not(feature = "loom"))]
#[repr(transparent)]
pub(crate) struct UnsafeCell<T: ?Sized> {
    cell: core::cell::UnsafeCell<T>,
}

#[cfg(not(feature = "loom"))]
impl<T> UnsafeCell<T> {
    #[inline(always)]
    pub(crate) const fn new(value: T) -> Self {
        Self {
            cell: core::cell::UnsafeCell::new(value),
        }
    }
}

#[cfg(not(feature = "loom"))]
impl<T: ?Sized> UnsafeCell<T> {
    /// Runs `f` with a mutable reference to the contents.
    ///
    /// # Safety
    /// The caller must guarantee exclusive access for the duration of `f`.
    #[inline(always)]
    pub(crate) unsafe fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        unsafe { f(&mut *self.cell.get()) }
    }
}

#[cfg(feature = "loom")]
pub(crate) struct UnsafeCell<T: ?Sized> {
    inner: loom::cell::UnsafeCell<T>,
}

#[cfg(feature = "loom")]
impl<T> UnsafeCell<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: loom::cell::UnsafeCell::new(value),
        }
    }
}

#[cfg(feature = "loom")]
impl<T: ?Sized> UnsafeCell<T> {
    /// Runs `f` with a mutable reference to the contents.
    ///
    /// # Safety
    /// The caller must guarantee exclusive access for the duration of `f`.
    pub(crate) unsafe fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        // Loom tracks the mutable access for the duration of the closure.
        self.inner.with_mut(|ptr| unsafe { f(&mut *ptr) })
    }
}
