//! 64-bit storage for targets that cannot access 64 bits atomically.
//!
//! Every `WideI64` in the process shares one spin lock. That serializes all
//! wide-scalar operations on such targets, in exchange for cells that are no
//! bigger than the value they hold. The API mirrors the subset of
//! `AtomicI64` that `AtomicLong` uses, so the two storages are swapped by
//! `cfg` alone.

use core::cell::UnsafeCell;
use core::sync::atomic::Ordering;

use crate::concurrency::spin::{SpinGuard, SpinLock};

static WIDE_LOCK: SpinLock = SpinLock::new();

#[inline]
fn wide_lock() -> SpinGuard<'static> {
    #[cfg(feature = "tracing")]
    {
        use core::sync::atomic::AtomicBool;
        static ANNOUNCED: AtomicBool = AtomicBool::new(false);
        if !ANNOUNCED.swap(true, Ordering::Relaxed) {
            tracing::trace!("64-bit atomics routed through the process-wide fallback lock");
        }
    }
    WIDE_LOCK.lock()
}

#[repr(C, align(8))]
pub(crate) struct WideI64 {
    value: UnsafeCell<i64>,
}

// SAFETY: `value` is only read or written while `WIDE_LOCK` is held, or
// through `&mut self`.
unsafe impl Sync for WideI64 {}

impl WideI64 {
    #[inline]
    pub(crate) const fn new(value: i64) -> Self {
        Self {
            value: UnsafeCell::new(value),
        }
    }

    #[inline]
    fn locked<R>(&self, f: impl FnOnce(&mut i64) -> R) -> R {
        let _guard = wide_lock();
        // SAFETY: the process-wide lock is held, so no other thread can touch
        // any `WideI64` until `_guard` drops.
        f(unsafe { &mut *self.value.get() })
    }

    #[inline]
    pub(crate) fn load(&self, _order: Ordering) -> i64 {
        self.locked(|value| *value)
    }

    #[inline]
    pub(crate) fn store(&self, new_value: i64, _order: Ordering) {
        self.locked(|value| *value = new_value);
    }

    #[inline]
    pub(crate) fn fetch_add(&self, delta: i64, _order: Ordering) -> i64 {
        self.locked(|value| {
            let old = *value;
            *value = old.wrapping_add(delta);
            old
        })
    }

    #[inline]
    pub(crate) fn compare_exchange(
        &self,
        current: i64,
        new: i64,
        _success: Ordering,
        _failure: Ordering,
    ) -> Result<i64, i64> {
        self.locked(|value| {
            let old = *value;
            if old == current {
                *value = new;
                Ok(old)
            } else {
                Err(old)
            }
        })
    }

    #[inline]
    pub(crate) fn get_mut(&mut self) -> &mut i64 {
        self.value.get_mut()
    }

    #[inline]
    pub(crate) fn into_inner(self) -> i64 {
        self.value.into_inner()
    }
}
