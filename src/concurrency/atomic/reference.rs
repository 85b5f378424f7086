//! `AtomicRef` — an atomically updated slot holding a shared object reference.
//!
//! # Why every operation locks
//!
//! The slot stores an `Arc<T>`. Handing a reference out means reading the
//! pointer *and* bumping its strong count. Those are two steps, and a writer
//! that swaps the slot and drops the last other owner in between would free
//! the object under the reader. So the read-and-retain runs inside a critical
//! section guarded by a per-slot [`SpinLock`], and so do the swaps.
//!
//! The lock only ever covers pointer moves and refcount increments. Values
//! leaving the slot are dropped after the lock is released, so destructors
//! never run while a slot is locked.
//!
//! # Frozen gate
//!
//! Only `None` or [frozen/permanent](crate::Freezable) objects may be stored.
//! The check runs before the lock is taken; a rejected write leaves the slot
//! untouched.

use std::mem;
use std::sync::Arc;

use crate::concurrency::spin::SpinLock;
use crate::object::{check_if_frozen, Freezable, InvalidMutability, Mutability};
use crate::sync::UnsafeCell;

/// A shared slot holding an optional `Arc<T>`.
///
/// Comparisons are by identity ([`Arc::ptr_eq`]), never by value.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use rime::{AtomicRef, Managed};
///
/// let a = Arc::new(Managed::new("a"));
/// a.freeze();
/// let cell = AtomicRef::new(Some(a.clone())).unwrap();
///
/// let b = Arc::new(Managed::new("b"));
/// assert!(cell.set(Some(b.clone())).is_err()); // `b` is not frozen
///
/// b.freeze();
/// assert!(cell.compare_and_set(Some(&a), Some(b.clone())).unwrap());
/// assert!(Arc::ptr_eq(&cell.get().unwrap(), &b));
/// ```
pub struct AtomicRef<T: ?Sized> {
    value: UnsafeCell<Option<Arc<T>>>,
    lock: SpinLock,
}

// SAFETY: the slot is only accessed under `lock` (or through `&mut self` /
// by value), and the `Arc<T>` it holds is itself `Send + Sync` for these `T`.
unsafe impl<T: ?Sized + Send + Sync> Send for AtomicRef<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for AtomicRef<T> {}

#[inline]
fn same_ref<T: ?Sized>(current: Option<&Arc<T>>, expected: Option<&Arc<T>>) -> bool {
    match (current, expected) {
        (None, None) => true,
        (Some(current), Some(expected)) => Arc::ptr_eq(current, expected),
        _ => false,
    }
}

impl<T: ?Sized> AtomicRef<T> {
    /// Creates an empty slot.
    pub fn empty() -> Self {
        Self {
            value: UnsafeCell::new(None),
            lock: SpinLock::new(),
        }
    }

    /// Runs `f` on the slot inside the critical section.
    #[inline]
    fn with_slot<R>(&self, f: impl FnOnce(&mut Option<Arc<T>>) -> R) -> R {
        let _guard = self.lock.lock();
        // SAFETY: the slot lock is held for the whole call.
        unsafe { self.value.with_mut(f) }
    }

    /// Returns a new owning reference to the current value.
    ///
    /// The reference is retained before the slot lock is released, so it
    /// stays valid no matter what other threads store afterwards.
    pub fn get(&self) -> Option<Arc<T>> {
        self.with_slot(|slot| slot.clone())
    }

    /// Empties the slot, returning the reference it held.
    pub fn take(&self) -> Option<Arc<T>> {
        self.with_slot(Option::take)
    }

    /// Consumes the slot, returning the reference it held.
    pub fn into_inner(self) -> Option<Arc<T>> {
        // SAFETY: `self` is owned, nothing else can reach the slot.
        unsafe { self.value.with_mut(Option::take) }
    }
}

impl<T: ?Sized + Freezable> AtomicRef<T> {
    /// Creates a slot holding `value`.
    ///
    /// # Errors
    /// Returns [`InvalidMutability`] if `value` is neither frozen nor
    /// permanent.
    pub fn new(value: Option<Arc<T>>) -> Result<Self, InvalidMutability> {
        check_if_frozen(value.as_deref())?;
        Ok(Self {
            value: UnsafeCell::new(value),
            lock: SpinLock::new(),
        })
    }

    /// Replaces the current value.
    ///
    /// # Errors
    /// Returns [`InvalidMutability`] if `new_value` is neither frozen nor
    /// permanent. The slot is left unchanged.
    pub fn set(&self, new_value: Option<Arc<T>>) -> Result<(), InvalidMutability> {
        check_if_frozen(new_value.as_deref())?;
        let old = self.with_slot(|slot| mem::replace(slot, new_value));
        drop(old);
        Ok(())
    }

    /// Stores `new_value` if the slot currently holds `expected` (by
    /// identity).
    ///
    /// Returns an owning reference to the value that was in the slot before
    /// the call, whether or not the swap happened.
    ///
    /// # Errors
    /// Returns [`InvalidMutability`] if `new_value` is neither frozen nor
    /// permanent. The slot is left unchanged.
    pub fn compare_and_swap(
        &self,
        expected: Option<&Arc<T>>,
        new_value: Option<Arc<T>>,
    ) -> Result<Option<Arc<T>>, InvalidMutability> {
        check_if_frozen(new_value.as_deref())?;
        let (prior, rejected) = self.with_slot(|slot| {
            if same_ref(slot.as_ref(), expected) {
                (mem::replace(slot, new_value), None)
            } else {
                (slot.clone(), new_value)
            }
        });
        drop(rejected);
        Ok(prior)
    }

    /// Stores `new_value` if the slot currently holds `expected` (by
    /// identity), returning whether it did.
    ///
    /// # Errors
    /// Returns [`InvalidMutability`] if `new_value` is neither frozen nor
    /// permanent. The slot is left unchanged.
    pub fn compare_and_set(
        &self,
        expected: Option<&Arc<T>>,
        new_value: Option<Arc<T>>,
    ) -> Result<bool, InvalidMutability> {
        check_if_frozen(new_value.as_deref())?;
        let outcome = self.with_slot(|slot| {
            if same_ref(slot.as_ref(), expected) {
                Ok(mem::replace(slot, new_value))
            } else {
                Err(new_value)
            }
        });
        // Whichever reference fell out of the slot is released here, outside
        // the critical section.
        Ok(outcome.is_ok())
    }
}

impl<T: ?Sized> Freezable for AtomicRef<T> {
    #[inline]
    fn mutability(&self) -> Mutability {
        Mutability::Frozen
    }
}

impl<T: ?Sized> Default for AtomicRef<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized + core::fmt::Debug> core::fmt::Debug for AtomicRef<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AtomicRef").field(&self.get()).finish()
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use crate::object::Managed;

    fn frozen<T>(value: T) -> Arc<Managed<T>> {
        let obj = Arc::new(Managed::new(value));
        obj.freeze();
        obj
    }

    #[test]
    fn test_empty_slot_compares_equal_to_none() {
        let cell = AtomicRef::<Managed<u8>>::empty();
        let a = frozen(1u8);
        assert!(cell.compare_and_set(None, Some(a.clone())).unwrap());
        assert!(!cell.compare_and_set(None, None).unwrap());
        let prior = cell.compare_and_swap(Some(&a), None).unwrap();
        assert!(Arc::ptr_eq(&prior.unwrap(), &a));
        assert!(cell.get().is_none());
    }

    #[test]
    fn test_identity_not_equality() {
        let a = frozen(7u32);
        let twin = frozen(7u32);
        let cell = AtomicRef::new(Some(a.clone())).unwrap();
        assert!(!cell.compare_and_set(Some(&twin), None).unwrap());
        assert!(Arc::ptr_eq(&cell.get().unwrap(), &a));
    }

    #[test]
    fn test_refcounts_balanced() {
        let a = frozen(0u8);
        let b = frozen(1u8);
        let cell = AtomicRef::new(Some(a.clone())).unwrap();
        assert_eq!(Arc::strong_count(&a), 2);

        let read = cell.get();
        assert_eq!(Arc::strong_count(&a), 3);
        drop(read);

        // Failed swap: the rejected `b` clone is released, `prior` is owned.
        let prior = cell.compare_and_swap(Some(&b), Some(b.clone())).unwrap();
        assert_eq!(Arc::strong_count(&b), 1);
        assert_eq!(Arc::strong_count(&a), 3);
        drop(prior);

        assert!(cell.compare_and_set(Some(&a), Some(b.clone())).unwrap());
        assert_eq!(Arc::strong_count(&a), 1);
        assert_eq!(Arc::strong_count(&b), 2);

        drop(cell);
        assert_eq!(Arc::strong_count(&b), 1);
    }

    #[test]
    fn test_take_and_into_inner() {
        let a = frozen("a");
        let cell = AtomicRef::new(Some(a.clone())).unwrap();
        assert!(Arc::ptr_eq(&cell.take().unwrap(), &a));
        assert!(cell.take().is_none());
        cell.set(Some(a.clone())).unwrap();
        assert!(Arc::ptr_eq(&cell.into_inner().unwrap(), &a));
    }

    #[test]
    fn test_unsized_referent() {
        let text: Arc<str> = Arc::from("frozen text");
        let cell = AtomicRef::new(Some(text.clone())).unwrap();
        assert_eq!(&*cell.get().unwrap(), "frozen text");
        assert_eq!(format!("{cell:?}"), "AtomicRef(Some(\"frozen text\"))");
    }
}
