//! The reflection payload a facade may attach to every handle it admits.
//!
//! A facade names one payload type `R`. When a dispatch table is built for
//! handle `P`, it captures a thunk computing `R` from a [`TypeTag<P>`];
//! [`Proxy::reflect`](crate::Proxy::reflect) runs it for whatever handle the
//! proxy currently holds.

use core::fmt;
use core::marker::PhantomData;

use crate::ConstTypeId;

/// Names the type `P` without holding one.
pub struct TypeTag<P: ?Sized>(PhantomData<fn() -> *const P>);

impl<P: ?Sized> TypeTag<P> {
    /// Creates the tag.
    pub const fn new() -> Self {
        TypeTag(PhantomData)
    }

    /// `core::any::type_name` of `P`.
    pub fn type_name(self) -> &'static str {
        core::any::type_name::<P>()
    }
}

impl<P: ?Sized + 'static> TypeTag<P> {
    /// Const-capturable type id of `P`.
    pub const fn type_id(self) -> ConstTypeId {
        ConstTypeId::of::<P>()
    }
}

impl<P> TypeTag<P> {
    /// Size of `P` in bytes.
    pub const fn size(self) -> usize {
        core::mem::size_of::<P>()
    }

    /// Alignment of `P`.
    pub const fn align(self) -> usize {
        core::mem::align_of::<P>()
    }
}

impl<P: ?Sized> Clone for TypeTag<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for TypeTag<P> {}

impl<P: ?Sized> Default for TypeTag<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized> fmt::Debug for TypeTag<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag<{}>", core::any::type_name::<P>())
    }
}

/// Builds a reflection payload for handle type `P`.
#[diagnostic::on_unimplemented(
    message = "reflection payload `{Self}` cannot be built for `{P}`",
    label = "implement `Reflect<{P}>` for the facade's reflection type"
)]
pub trait Reflect<P>: Sized + 'static {
    /// Computes the payload.
    fn reflect(tag: TypeTag<P>) -> Self;
}

/// Marks types that are real reflection payloads.
///
/// [`Proxy::reflect`](crate::Proxy::reflect) exists only for facades whose
/// payload implements this; [`NoReflection`] does not.
pub trait Reflection: 'static {}

/// The payload of facades that declare none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NoReflection;

impl<P> Reflect<P> for NoReflection {
    #[inline]
    fn reflect(_: TypeTag<P>) -> Self {
        NoReflection
    }
}

/// A ready-made payload: name, layout and identity of the held handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleInfo {
    /// `core::any::type_name` of the handle.
    pub type_name: &'static str,
    /// Size of the handle in bytes.
    pub size: usize,
    /// Alignment of the handle.
    pub align: usize,
    /// Identity of the handle type.
    pub type_id: ConstTypeId,
}

impl HandleInfo {
    /// Whether the held handle is a `P`.
    pub fn is<P: 'static>(&self) -> bool {
        self.type_id == ConstTypeId::of::<P>()
    }
}

impl<P: 'static> Reflect<P> for HandleInfo {
    fn reflect(tag: TypeTag<P>) -> Self {
        HandleInfo {
            type_name: tag.type_name(),
            size: tag.size(),
            align: tag.align(),
            type_id: tag.type_id(),
        }
    }
}

impl Reflection for HandleInfo {}

impl fmt::Display for HandleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (size {}, align {})",
            self.type_name, self.size, self.align
        )
    }
}
