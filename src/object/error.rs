use super::Mutability;

/// Raised when a thread-local mutable object would become reachable from
/// multiple threads, or when a frozen object would be mutated.
///
/// It is returned before any state changes, so the cell or object that
/// rejected the operation is left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMutability {
    type_name: &'static str,
    mutability: Mutability,
}

impl InvalidMutability {
    pub(crate) fn new<T: ?Sized>(mutability: Mutability) -> Self {
        Self {
            type_name: core::any::type_name::<T>(),
            mutability,
        }
    }

    /// Type name of the offending object.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Classification the object had when it was rejected.
    pub fn mutability(&self) -> Mutability {
        self.mutability
    }
}

impl core::fmt::Display for InvalidMutability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.mutability {
            Mutability::Local => write!(
                f,
                "cannot share mutable `{}` across threads: freeze it first",
                self.type_name
            ),
            Mutability::Frozen | Mutability::Permanent => write!(
                f,
                "cannot mutate {} `{}`",
                self.mutability, self.type_name
            ),
        }
    }
}

impl std::error::Error for InvalidMutability {}
