//! Concurrency primitives: the shared spin lock and the atomic cells built on
//! top of it.
//!
//! Nothing here blocks on I/O or parks a thread. Every operation is either a
//! single hardware atomic or a short spin-locked critical section.

pub mod atomic;
pub mod spin;

pub use atomic::{AtomicInt, AtomicLong, AtomicNativePtr, AtomicRef, IntegerCell, NativePtr, ScalarCell};
pub use spin::{SpinGuard, SpinLock};
