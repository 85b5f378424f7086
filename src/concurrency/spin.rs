//! A two-state spin lock.
//!
//! This is the portable primitive shared by the wide-scalar fallback and the
//! reference cell. The lock word is a single 32-bit atomic that is only ever
//! `0` (unlocked) or `1` (locked):
//! - `Unlocked -> Locked`: compare-and-swap `0 -> 1` with `Acquire`, retried
//!   until it succeeds.
//! - `Locked -> Unlocked`: unconditional `Release` store of `0`.
//!
//! There is no queue and no fairness guarantee, and the lock is not
//! reentrant. Holders are expected to do a handful of pointer or scalar moves
//! and nothing else.

use crossbeam_utils::Backoff;

use crate::sync::{self, AtomicU32, Ordering};

/// A non-reentrant test-and-test-and-set spin lock.
pub struct SpinLock {
    state: AtomicU32,
}

impl SpinLock {
    const UNLOCKED: u32 = 0;
    const LOCKED: u32 = 1;

    /// Creates an unlocked spin lock.
    #[cfg(not(feature = "loom"))]
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: AtomicU32::new(Self::UNLOCKED),
        }
    }

    /// Creates an unlocked spin lock.
    #[cfg(feature = "loom")]
    pub fn new() -> Self {
        Self {
            state: AtomicU32::new(Self::UNLOCKED),
        }
    }

    /// Acquires the lock, spinning until it is available.
    ///
    /// Calling this while the current thread already holds the lock
    /// deadlocks.
    #[inline]
    pub fn lock(&self) -> SpinGuard<'_> {
        if self.try_acquire() {
            return SpinGuard { lock: self };
        }
        self.lock_slow()
    }

    #[cold]
    fn lock_slow(&self) -> SpinGuard<'_> {
        let backoff = Backoff::new();
        #[cfg(feature = "tracing")]
        let mut reported = false;
        loop {
            // Test on a relaxed load so waiters spin in their own cache line.
            while self.state.load(Ordering::Relaxed) == Self::LOCKED {
                #[cfg(feature = "tracing")]
                if backoff.is_completed() && !reported {
                    reported = true;
                    tracing::trace!(lock = ?(self as *const Self), "spin lock contended, yielding");
                }
                sync::relax(&backoff);
            }
            if self.try_acquire() {
                return SpinGuard { lock: self };
            }
        }
    }

    /// Attempts to acquire the lock without spinning.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinGuard<'_>> {
        if self.try_acquire() {
            Some(SpinGuard { lock: self })
        } else {
            None
        }
    }

    /// Returns `true` if some thread currently holds the lock.
    ///
    /// The answer may be stale by the time the caller looks at it.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) == Self::LOCKED
    }

    #[inline(always)]
    fn try_acquire(&self) -> bool {
        self.state
            .compare_exchange(Self::UNLOCKED, Self::LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    #[inline(always)]
    fn unlock(&self) {
        debug_assert_eq!(self.state.load(Ordering::Relaxed), Self::LOCKED);
        self.state.store(Self::UNLOCKED, Ordering::Release);
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SpinLock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpinLock")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// RAII guard for [`SpinLock`]. Releases the lock on drop.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl Drop for SpinGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.lock.unlock();
    }
}
