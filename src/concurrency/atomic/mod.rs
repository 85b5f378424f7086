//! Atomic cells for scalars and object references.
//!
//! Scalar cells are thin wrappers over hardware atomics:
//! - loads are `Acquire`, stores are `Release`;
//! - read-modify-write operations are `AcqRel` (`Acquire` on a failed compare).
//!
//! The one exception is [`AtomicLong`] on targets without 64-bit atomics (or
//! with the `wide-fallback` feature), where every operation goes through a
//! single process-wide [`SpinLock`](crate::SpinLock).
//!
//! [`AtomicRef`] guards its slot with a private spin lock so that reading a
//! reference and retaining it happen in one critical section.

/// 32-bit integer cell.
pub mod int;
/// 64-bit integer cell.
pub mod long;
/// Pointer-width cell.
pub mod native_ptr;
/// Object reference cell.
pub mod reference;

#[cfg(any(not(target_has_atomic = "64"), feature = "wide-fallback"))]
mod wide;

pub use int::AtomicInt;
pub use long::AtomicLong;
pub use native_ptr::{AtomicNativePtr, NativePtr};
pub use reference::AtomicRef;

use num_traits::{One, PrimInt, Signed};

/// Operations shared by every scalar cell.
///
/// Comparisons are bitwise. `compare_and_swap` and `compare_and_set` are
/// separate primitives: deriving one from the other would need a second read.
pub trait ScalarCell: Send + Sync {
    /// Stored scalar type.
    type Value: Copy + PartialEq + core::fmt::Debug;

    /// Returns the current value.
    fn get(&self) -> Self::Value;

    /// Replaces the current value.
    fn set(&self, new_value: Self::Value);

    /// Stores `new_value` if the cell holds `expected`, returning the value
    /// observed before the operation.
    fn compare_and_swap(&self, expected: Self::Value, new_value: Self::Value) -> Self::Value;

    /// Stores `new_value` if the cell holds `expected`, returning whether it
    /// did.
    fn compare_and_set(&self, expected: Self::Value, new_value: Self::Value) -> bool;
}

/// Arithmetic on integer cells.
pub trait IntegerCell: Send + Sync {
    /// Stored integer type.
    type Int: PrimInt + Signed + Send + Sync;

    /// Atomically adds `delta` and returns the resulting value. Wraps on
    /// overflow.
    fn add_and_get(&self, delta: Self::Int) -> Self::Int;

    /// Equivalent to `add_and_get(1)`.
    #[inline]
    fn increment(&self) -> Self::Int {
        self.add_and_get(Self::Int::one())
    }

    /// Equivalent to `add_and_get(-1)`.
    #[inline]
    fn decrement(&self) -> Self::Int {
        self.add_and_get(-Self::Int::one())
    }
}
