//! Per-handle dispatch tables.
//!
//! Every (facade, handle) pair gets exactly one [`DispatchTable`], computed
//! by const evaluation and promoted to a `&'static`. Function pointers in it
//! are type-erased; the proxy restores their types from the facade's
//! descriptors, which never disagree with the ones the table was built from.

use core::fmt;

use crate::dispatch::{Bind, Dispatch, Dispatcher, Overload, OverloadList};
use crate::level::{self, ConstraintLevel, Level};
use crate::{
    CopyabilityOf, DestructibilityOf, DispatchList, Facade, InfallibleClone, Reflect,
    RelocatabilityOf, TypeTag,
};

/// Most overloads a facade may declare, across all of its dispatches.
///
/// Tables are built during const evaluation, where an array cannot be
/// sized from a generic facade, so every table reserves this many slots.
/// [`validate`](crate::validate) rejects larger facades with
/// [`Rejection::TooManyOverloads`](crate::Rejection::TooManyOverloads).
pub const MAX_OVERLOADS: usize = 16;

/// A function pointer with its signature erased.
pub(crate) type ErasedFn = unsafe fn();

/// Clones the handle at `src` into the uninitialized `dst`.
pub type CopyFn = unsafe fn(dst: *mut (), src: *const ());

/// Moves the handle at `src` into the uninitialized `dst`, leaving `src`
/// logically uninitialized.
pub type RelocateFn = unsafe fn(dst: *mut (), src: *mut ());

/// Drops the handle in place.
pub type DestroyFn = unsafe fn(target: *mut ());

union Erasure<T: Copy> {
    typed: T,
    erased: ErasedFn,
}

/// Erases a function pointer type. `T` must be a function pointer.
pub(crate) const fn erase<T: Copy>(f: T) -> ErasedFn {
    assert!(core::mem::size_of::<T>() == core::mem::size_of::<ErasedFn>());
    unsafe { Erasure { typed: f }.erased }
}

/// Restores a function pointer erased by [`erase`].
///
/// # Safety
///
/// `f` must have been erased from a `T`.
pub(crate) const unsafe fn restore<T: Copy>(f: ErasedFn) -> T {
    unsafe { Erasure::<T> { erased: f }.typed }
}

unsafe fn vacant() {
    unreachable!("vacant dispatch slot")
}

/// The erased dispatchers of one handle, in table order.
///
/// Built during const evaluation; opaque otherwise.
#[derive(Clone, Copy)]
pub struct OverloadSlots {
    entries: [ErasedFn; MAX_OVERLOADS],
    len: usize,
}

impl OverloadSlots {
    /// No dispatchers.
    pub const EMPTY: OverloadSlots = OverloadSlots {
        entries: [vacant as ErasedFn; MAX_OVERLOADS],
        len: 0,
    };

    const fn push(mut self, f: ErasedFn) -> Self {
        assert!(
            self.len < MAX_OVERLOADS,
            "facade declares more overloads than a dispatch table holds"
        );
        self.entries[self.len] = f;
        self.len += 1;
        self
    }

    const fn append(mut self, other: OverloadSlots) -> Self {
        let mut i = 0;
        while i < other.len {
            self = self.push(other.entries[i]);
            i += 1;
        }
        self
    }

    /// Number of filled slots.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether no slot is filled.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> ErasedFn {
        self.entries[index]
    }
}

/// Collects the dispatchers of an overload list for handle `P`.
///
/// The dispatcher of an overload lands at the slot equal to the length of
/// the list that follows it, matching [`Resolve::INDEX`](crate::Resolve).
pub trait OverloadsFor<P>: OverloadList {
    /// The dispatchers.
    const SLOTS: OverloadSlots;
}

impl<P> OverloadsFor<P> for () {
    const SLOTS: OverloadSlots = OverloadSlots::EMPTY;
}

impl<P, O, Rest> OverloadsFor<P> for (O, Rest)
where
    O: Overload,
    O::Receiver: Bind<P, O>,
    Rest: OverloadsFor<P>,
{
    const SLOTS: OverloadSlots =
        Rest::SLOTS.push(erase::<Dispatcher<O>>(<O::Receiver as Bind<P, O>>::DISPATCHER));
}

/// Collects the dispatchers of every dispatch in a list for handle `P`.
///
/// A dispatch's overloads start at the slot equal to the overload count of
/// the dispatches that follow it, matching [`Select::BASE`](crate::Select).
pub trait DispatchesFor<P>: DispatchList {
    /// The dispatchers.
    const SLOTS: OverloadSlots;
}

impl<P> DispatchesFor<P> for () {
    const SLOTS: OverloadSlots = OverloadSlots::EMPTY;
}

impl<P, D, Rest> DispatchesFor<P> for (D, Rest)
where
    D: Dispatch,
    D::Overloads: OverloadsFor<P>,
    Rest: DispatchesFor<P>,
{
    const SLOTS: OverloadSlots =
        Rest::SLOTS.append(<D::Overloads as OverloadsFor<P>>::SLOTS);
}

/// Whether handle `P` can be copied at level `L`, and how.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be copied at the level this facade requires",
    label = "copy level `{L}` needs `Clone` (may-fail), `InfallibleClone` (cannot-fail) or `Copy` (trivial)"
)]
pub trait CopyableAt<L: Level>: Sized {
    /// The copy dispatcher, absent when copying is not offered or bitwise.
    const COPY: Option<CopyFn>;
}

impl<P> CopyableAt<level::Unconstrained> for P {
    const COPY: Option<CopyFn> = None;
}

impl<P: Clone> CopyableAt<level::MayFail> for P {
    const COPY: Option<CopyFn> = Some(copy::<P> as CopyFn);
}

impl<P: InfallibleClone> CopyableAt<level::CannotFail> for P {
    const COPY: Option<CopyFn> = Some(copy_nounwind::<P> as CopyFn);
}

impl<P: Copy> CopyableAt<level::Trivial> for P {
    const COPY: Option<CopyFn> = None;
}

/// Aborts the process if dropped during unwinding out of an operation
/// declared cannot-fail.
struct AbortOnUnwind(&'static str);

impl Drop for AbortOnUnwind {
    fn drop(&mut self) {
        // A panic while already unwinding aborts.
        panic!("{} declared cannot-fail unwound", self.0);
    }
}

unsafe fn copy<P: Clone>(dst: *mut (), src: *const ()) {
    let src = unsafe { &*src.cast::<P>() };
    unsafe { dst.cast::<P>().write(src.clone()) };
}

unsafe fn copy_nounwind<P: InfallibleClone>(dst: *mut (), src: *const ()) {
    let guard = AbortOnUnwind("clone");
    unsafe { copy::<P>(dst, src) };
    core::mem::forget(guard);
}

unsafe fn relocate<P>(dst: *mut (), src: *mut ()) {
    unsafe { dst.cast::<P>().write(src.cast::<P>().read()) };
}

unsafe fn destroy<P>(target: *mut ()) {
    unsafe { target.cast::<P>().drop_in_place() };
}

unsafe fn destroy_nounwind<P>(target: *mut ()) {
    let guard = AbortOnUnwind("drop");
    unsafe { destroy::<P>(target) };
    core::mem::forget(guard);
}

fn reflect_thunk<P, R: Reflect<P>>() -> R {
    R::reflect(TypeTag::new())
}

/// The dispatch table of one handle type under one facade.
///
/// Obtained as [`Proxiable::TABLE`](crate::Proxiable::TABLE); every proxy
/// holding that handle shares it.
pub struct DispatchTable {
    type_name: fn() -> &'static str,
    size: usize,
    align: usize,
    pub(crate) copy: Option<CopyFn>,
    pub(crate) relocate: Option<RelocateFn>,
    pub(crate) destroy: Option<DestroyFn>,
    pub(crate) reflect: ErasedFn,
    pub(crate) slots: OverloadSlots,
}

impl DispatchTable {
    /// Builds the table of handle `P` under facade `F`.
    pub(crate) const fn of<F, P>() -> Self
    where
        F: Facade,
        P: CopyableAt<CopyabilityOf<F>> + 'static,
        F::Dispatches: DispatchesFor<P>,
        F::Reflection: Reflect<P>,
    {
        let relocate = if <RelocatabilityOf<F> as Level>::LEVEL.needs_dispatcher() {
            Some(relocate::<P> as RelocateFn)
        } else {
            None
        };
        let destroy = match <DestructibilityOf<F> as Level>::LEVEL {
            ConstraintLevel::MayFail => Some(destroy::<P> as DestroyFn),
            ConstraintLevel::CannotFail => Some(destroy_nounwind::<P> as DestroyFn),
            ConstraintLevel::None | ConstraintLevel::Trivial => None,
        };
        DispatchTable {
            type_name: core::any::type_name::<P>,
            size: core::mem::size_of::<P>(),
            align: core::mem::align_of::<P>(),
            copy: <P as CopyableAt<CopyabilityOf<F>>>::COPY,
            relocate,
            destroy,
            reflect: erase(reflect_thunk::<P, F::Reflection> as fn() -> F::Reflection),
            slots: <F::Dispatches as DispatchesFor<P>>::SLOTS,
        }
    }

    /// `core::any::type_name` of the handle.
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Size of the handle in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Alignment of the handle.
    pub const fn align(&self) -> usize {
        self.align
    }

    /// Whether the table carries a copy dispatcher.
    pub const fn has_copy(&self) -> bool {
        self.copy.is_some()
    }

    /// Whether the table carries a relocation dispatcher.
    pub const fn has_relocate(&self) -> bool {
        self.relocate.is_some()
    }

    /// Whether the table carries a destroy dispatcher.
    pub const fn has_destroy(&self) -> bool {
        self.destroy.is_some()
    }

    /// The overload dispatchers.
    pub const fn slots(&self) -> &OverloadSlots {
        &self.slots
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("type_name", &self.type_name())
            .field("size", &self.size)
            .field("align", &self.align)
            .field("copy", &self.has_copy())
            .field("relocate", &self.has_relocate())
            .field("destroy", &self.has_destroy())
            .field("overloads", &self.slots.len)
            .finish()
    }
}
