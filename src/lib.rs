//! # `rime` - Atomic cells for a frozen-object runtime
//!
//! The primitive layer a managed runtime needs for safe concurrent mutation
//! of shared values:
//!
//! - **Scalar cells** ([`AtomicInt`], [`AtomicLong`], [`AtomicNativePtr`]):
//!   `get`/`set`/`add_and_get`/`compare_and_swap`/`compare_and_set` on
//!   hardware atomics, with a process-wide spin-lock fallback for 64-bit
//!   cells on targets that cannot access 64 bits atomically.
//! - **Reference cells** ([`AtomicRef`]): the same operations on a shared
//!   `Arc<T>` slot. Each slot has its own spin lock, so a reader can never
//!   retain an object that a concurrent writer has just released for the
//!   last time.
//! - **Frozen gate** ([`check_if_frozen`]): only frozen or permanent objects
//!   may be published into a reference cell. Anything else is rejected with
//!   [`InvalidMutability`] before the cell is touched.
//!
//! ## Ordering
//!
//! Scalar loads are `Acquire`, stores are `Release`, read-modify-writes are
//! `AcqRel`. Reference cells are ordered by their lock: `Acquire` on lock,
//! `Release` on unlock.
//!
//! ## Cargo features
//!
//! - `tracing`: structured logging of rejected publications and contended
//!   spin locks.
//! - `wide-fallback`: forces [`AtomicLong`] onto the process-wide lock even on
//!   targets with 64-bit atomics.
//! - `loom`: model-checks the spin lock and reference slot with loom.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rime::{AtomicInt, AtomicRef, Managed, Mutability};
//!
//! let counter = AtomicInt::new(10);
//! assert_eq!(counter.compare_and_swap(10, 20), 10);
//! assert_eq!(counter.compare_and_swap(10, 30), 20);
//! assert_eq!(counter.get(), 20);
//!
//! let cell = AtomicRef::empty();
//! let config = Arc::new(Managed::new(vec![1, 2, 3]));
//! let err = cell.set(Some(config.clone())).unwrap_err();
//! assert_eq!(err.mutability(), Mutability::Local);
//!
//! config.freeze();
//! cell.set(Some(config.clone())).unwrap();
//! assert_eq!(**cell.get().unwrap(), vec![1, 2, 3]);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

#[cfg(all(
    feature = "loom",
    any(not(target_has_atomic = "64"), feature = "wide-fallback")
))]
compile_error!("the `loom` model does not cover the process-wide 64-bit fallback lock");

pub mod concurrency;
pub mod object;
mod sync;

pub use concurrency::{
    AtomicInt, AtomicLong, AtomicNativePtr, AtomicRef, IntegerCell, NativePtr, ScalarCell, SpinGuard,
    SpinLock,
};
pub use object::{check_if_frozen, Freezable, InvalidMutability, Managed, Mutability, ObjHeader};

// Compile-time assertions for memory layout
const _: () = {
    use core::mem;

    // Scalar cells are exactly as large as the value they hold.
    assert!(mem::size_of::<AtomicInt>() == mem::size_of::<i32>());
    assert!(mem::size_of::<AtomicLong>() == mem::size_of::<i64>());
    assert!(mem::align_of::<AtomicLong>() == 8);
    assert!(mem::size_of::<AtomicNativePtr>() == mem::size_of::<usize>());

    // A reference cell is one pointer plus its lock word (plus padding).
    #[cfg(not(feature = "loom"))]
    assert!(mem::size_of::<AtomicRef<u64>>() <= mem::size_of::<usize>() * 2);
};
