//! `ObjHeader` and `Managed<T>` — a minimal managed-object layout.

use core::ops::Deref;
use core::sync::atomic::{AtomicU32, Ordering};

use super::{Freezable, InvalidMutability, Mutability};

/// Per-object flag word.
///
/// Bits:
/// - `0x1`: frozen (set once, never cleared)
/// - `0x2`: permanent (fixed at construction)
#[derive(Debug)]
#[repr(transparent)]
pub struct ObjHeader {
    flags: AtomicU32,
}

impl ObjHeader {
    const FROZEN: u32 = 0x1;
    const PERMANENT: u32 = 0x2;

    /// Header of a fresh, thread-local object.
    #[inline]
    pub const fn new() -> Self {
        Self {
            flags: AtomicU32::new(0),
        }
    }

    /// Header of a permanent object.
    #[inline]
    pub const fn permanent() -> Self {
        Self {
            flags: AtomicU32::new(Self::PERMANENT),
        }
    }

    /// Current classification.
    #[inline]
    pub fn mutability(&self) -> Mutability {
        let flags = self.flags.load(Ordering::Acquire);
        if flags & Self::PERMANENT != 0 {
            Mutability::Permanent
        } else if flags & Self::FROZEN != 0 {
            Mutability::Frozen
        } else {
            Mutability::Local
        }
    }

    /// Marks the object frozen. Idempotent; permanent objects are unaffected.
    #[inline]
    pub fn freeze(&self) {
        // Release pairs with the Acquire in `mutability` so a thread that sees
        // the flag also sees every write made before freezing.
        self.flags.fetch_or(Self::FROZEN, Ordering::Release);
    }
}

impl Default for ObjHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// A managed object: a header followed by its payload.
///
/// The layout is `#[repr(C)]`, so the payload always lives at
/// [`Managed::PAYLOAD_OFFSET`] bytes past the start of the header.
#[derive(Debug)]
#[repr(C)]
pub struct Managed<T> {
    header: ObjHeader,
    payload: T,
}

impl<T> Managed<T> {
    /// Byte offset of the payload from the start of the object.
    pub const PAYLOAD_OFFSET: usize = core::mem::offset_of!(Managed<T>, payload);

    /// Creates a thread-local, mutable object.
    #[inline]
    pub const fn new(payload: T) -> Self {
        Self {
            header: ObjHeader::new(),
            payload,
        }
    }

    /// Creates a permanent object. It can never be mutated through
    /// [`Managed::payload_mut`].
    #[inline]
    pub const fn permanent(payload: T) -> Self {
        Self {
            header: ObjHeader::permanent(),
            payload,
        }
    }

    /// The object's header.
    #[inline]
    pub fn header(&self) -> &ObjHeader {
        &self.header
    }

    /// Freezes the object, returning it for chaining.
    ///
    /// Only this object's header is marked; objects reachable from the
    /// payload keep their own classification.
    #[inline]
    pub fn freeze(&self) -> &Self {
        self.header.freeze();
        self
    }

    /// Returns `true` once [`Managed::freeze`] has been called.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.header.mutability() == Mutability::Frozen
    }

    /// Mutable access to the payload of a thread-local object.
    ///
    /// # Errors
    /// Returns [`InvalidMutability`] if the object is frozen or permanent.
    pub fn payload_mut(&mut self) -> Result<&mut T, InvalidMutability> {
        match self.header.mutability() {
            Mutability::Local => Ok(&mut self.payload),
            shared => Err(InvalidMutability::new::<Self>(shared)),
        }
    }

    /// Consumes the object, returning its payload.
    #[inline]
    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T> Freezable for Managed<T> {
    #[inline]
    fn mutability(&self) -> Mutability {
        self.header.mutability()
    }
}

impl<T> Deref for Managed<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.payload
    }
}

impl<T: Default> Default for Managed<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for Managed<T> {
    fn from(payload: T) -> Self {
        Self::new(payload)
    }
}

const _: () = {
    use core::mem;

    // The header is a single flag word and the payload follows it directly.
    assert!(mem::size_of::<ObjHeader>() == mem::size_of::<u32>());
    assert!(Managed::<u32>::PAYLOAD_OFFSET == mem::size_of::<ObjHeader>());
    assert!(Managed::<u64>::PAYLOAD_OFFSET >= mem::size_of::<ObjHeader>());
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freeze_is_one_way() {
        let obj = Managed::new(5u32);
        assert_eq!(obj.mutability(), Mutability::Local);
        assert!(!obj.is_frozen());

        obj.freeze().freeze();
        assert_eq!(obj.mutability(), Mutability::Frozen);
        assert!(obj.is_frozen());
        assert_eq!(*obj, 5);
    }

    #[test]
    fn test_permanent_ignores_freeze() {
        let obj = Managed::permanent("const");
        obj.freeze();
        assert_eq!(obj.mutability(), Mutability::Permanent);
        assert!(!obj.is_frozen());
    }

    #[test]
    fn test_payload_mut_gated() {
        let mut obj = Managed::new(vec![1]);
        obj.payload_mut().unwrap().push(2);
        assert_eq!(*obj, vec![1, 2]);

        obj.freeze();
        let err = obj.payload_mut().unwrap_err();
        assert_eq!(err.mutability(), Mutability::Frozen);
        assert_eq!(obj.into_payload(), vec![1, 2]);

        let mut constant = Managed::permanent(0u8);
        assert_eq!(
            constant.payload_mut().unwrap_err().mutability(),
            Mutability::Permanent
        );
    }
}
