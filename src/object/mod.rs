//! Object model hooks consulted by the atomic cells.
//!
//! The cells never look inside an object. All they need is the answer to one
//! question: may this object be reached from more than one thread? An object
//! may be if it is *frozen* (made permanently immutable at runtime) or
//! *permanent* (a constant that was never mutable to begin with).
//!
//! [`Freezable`] is that question. [`ObjHeader`] and [`Managed`] are a small
//! reference object model answering it with a per-object flag word.

mod error;
mod header;

pub use error::InvalidMutability;
pub use header::{Managed, ObjHeader};

use serde::{Deserialize, Serialize};

/// Sharing classification of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutability {
    /// Mutable and owned by a single thread.
    Local,
    /// Made immutable at runtime; safe to read from any thread.
    Frozen,
    /// Immutable since construction.
    Permanent,
}

impl Mutability {
    /// Returns `true` for [`Mutability::Frozen`] and [`Mutability::Permanent`].
    #[inline]
    pub const fn is_shareable(self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl core::fmt::Display for Mutability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Frozen => "frozen",
            Self::Permanent => "permanent",
        })
    }
}

/// Immutability classification for objects stored in an
/// [`AtomicRef`](crate::AtomicRef).
pub trait Freezable {
    /// Current classification of `self`.
    fn mutability(&self) -> Mutability;

    /// Returns `true` if `self` is frozen or permanent.
    #[inline]
    fn is_shareable(&self) -> bool {
        self.mutability().is_shareable()
    }
}

impl Freezable for str {
    #[inline]
    fn mutability(&self) -> Mutability {
        Mutability::Frozen
    }
}

impl Freezable for String {
    #[inline]
    fn mutability(&self) -> Mutability {
        Mutability::Frozen
    }
}

/// Rejects `candidate` unless it is `None`, frozen or permanent.
///
/// Every write path of an atomic reference runs this before it takes its
/// lock, so a rejected write never touches the slot.
///
/// # Errors
/// Returns [`InvalidMutability`] if `candidate` is a thread-local mutable
/// object.
pub fn check_if_frozen<T>(candidate: Option<&T>) -> Result<(), InvalidMutability>
where
    T: ?Sized + Freezable,
{
    let Some(candidate) = candidate else {
        return Ok(());
    };
    let mutability = candidate.mutability();
    if mutability.is_shareable() {
        return Ok(());
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(
        type_name = core::any::type_name::<T>(),
        %mutability,
        "rejected publication of unfrozen object"
    );
    Err(InvalidMutability::new::<T>(mutability))
}
