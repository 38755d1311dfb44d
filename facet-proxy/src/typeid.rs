//! A [`TypeId`] that can be captured in const contexts.

use core::any::TypeId;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// `TypeId` equivalent usable in const contexts.
///
/// Holds the `TypeId::of` function for the type and calls it on demand.
#[derive(Clone, Copy)]
pub struct ConstTypeId {
    type_id_fn: fn() -> TypeId,
}

impl ConstTypeId {
    /// Captures the id of `T`.
    #[must_use]
    pub const fn of<T: ?Sized + 'static>() -> Self {
        ConstTypeId {
            type_id_fn: TypeId::of::<T>,
        }
    }

    /// Returns the underlying [`TypeId`].
    #[inline]
    pub fn get(self) -> TypeId {
        (self.type_id_fn)()
    }
}

impl fmt::Debug for ConstTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.get(), f)
    }
}

impl PartialEq for ConstTypeId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl PartialEq<TypeId> for ConstTypeId {
    #[inline]
    fn eq(&self, other: &TypeId) -> bool {
        self.get() == *other
    }
}

impl Eq for ConstTypeId {}

impl PartialOrd for ConstTypeId {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ConstTypeId {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().cmp(&other.get())
    }
}

impl Hash for ConstTypeId {
    // The same type may get several `TypeId::of` instantiations across
    // codegen units, so hash the id rather than the function address.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}
