//! Handles: the values a proxy actually stores.
//!
//! A handle hands out a reference to the value it stands for. Storage
//! strategies ([`Inline`](crate::Inline), [`Indirect`](crate::Indirect)) are
//! handles, and so are the usual pointer types.

#[cfg(feature = "alloc")]
use alloc::{boxed::Box, rc::Rc, sync::Arc};

/// Obtains a shared reference to the value a handle stands for.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a handle",
    label = "wrap the value in `Inline` or `Indirect`, or store a pointer to it"
)]
pub trait Handle {
    /// The value behind the handle.
    type Target: ?Sized;

    /// Borrows the value behind the handle.
    fn target(&self) -> &Self::Target;
}

/// Obtains an exclusive reference to the value a handle stands for.
///
/// Needed by overloads with an `&mut self` receiver.
pub trait HandleMut: Handle {
    /// Mutably borrows the value behind the handle.
    fn target_mut(&mut self) -> &mut Self::Target;
}

impl<T: ?Sized> Handle for &T {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        self
    }
}

impl<T: ?Sized> Handle for &mut T {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        self
    }
}

impl<T: ?Sized> HandleMut for &mut T {
    #[inline]
    fn target_mut(&mut self) -> &mut T {
        self
    }
}

#[cfg(feature = "alloc")]
impl<T: ?Sized> Handle for Box<T> {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        self
    }
}

#[cfg(feature = "alloc")]
impl<T: ?Sized> HandleMut for Box<T> {
    #[inline]
    fn target_mut(&mut self) -> &mut T {
        self
    }
}

#[cfg(feature = "alloc")]
impl<T: ?Sized> Handle for Rc<T> {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        self
    }
}

#[cfg(feature = "alloc")]
impl<T: ?Sized> Handle for Arc<T> {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        self
    }
}

/// A `Clone` that never unwinds.
///
/// Facades whose copyability is `CannotFail` admit only handles with this
/// marker. Allocation failure aborts rather than unwinds, so clones that
/// only allocate (`Box`, `Indirect`) qualify as long as the pointee does.
pub trait InfallibleClone: Clone {}

macro_rules! infallible_clone {
    ($($ty:ty),* $(,)?) => {
        $(impl InfallibleClone for $ty {})*
    };
}

infallible_clone!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
);

impl<T: ?Sized> InfallibleClone for &T {}

impl<T: InfallibleClone, const N: usize> InfallibleClone for [T; N] {}

impl<T: InfallibleClone> InfallibleClone for Option<T> {}

impl<A: InfallibleClone, B: InfallibleClone> InfallibleClone for (A, B) {}

impl<T: ?Sized> InfallibleClone for core::marker::PhantomData<T> {}

#[cfg(feature = "alloc")]
impl<T: InfallibleClone> InfallibleClone for Box<T> {}

#[cfg(feature = "alloc")]
impl<T: ?Sized> InfallibleClone for Rc<T> {}

#[cfg(feature = "alloc")]
impl<T: ?Sized> InfallibleClone for Arc<T> {}
