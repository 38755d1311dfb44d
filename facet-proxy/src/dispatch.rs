//! Capability descriptors: overloads, dispatches, and build-time overload
//! resolution.
//!
//! An [`Overload`] is one call signature. A [`Dispatch`] is a named,
//! non-empty list of overloads. A facade lists dispatches. Lists are
//! type-level cons lists, `(Head, Tail)` terminated by `()`; the
//! [`list!`](crate::list) macro writes them.
//!
//! Handles are never asked to implement a trait named after the facade.
//! They implement [`Call`] (or [`CallMut`]) once per overload they serve.

use core::fmt;
use core::marker::PhantomData;

use crate::Handle;
use crate::HandleMut;

/// Whether an overload may report failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailMode {
    /// The outcome is a `Result`.
    MayFail,
    /// The outcome is the output itself.
    CannotFail,
}

/// The failure channel of an overload.
pub trait Failure: 'static {
    /// What invoking an overload with output `R` returns.
    type Outcome<R>;
    /// The fail mode this channel stands for.
    const MODE: FailMode;
}

/// Cannot-fail: the outcome is the output.
///
/// A handle that can only offer a fallible implementation cannot implement
/// `Call` for such an overload, so it is rejected when the proxy is built.
pub enum NeverFails {}

impl Failure for NeverFails {
    type Outcome<R> = R;
    const MODE: FailMode = FailMode::CannotFail;
}

/// May-fail with error `E`: the outcome is `Result<Output, E>`.
pub struct Fails<E: 'static>(PhantomData<fn() -> E>);

impl<E: 'static> Failure for Fails<E> {
    type Outcome<R> = Result<R, E>;
    const MODE: FailMode = FailMode::MayFail;
}

/// How an overload borrows the handle's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverKind {
    /// `&self`
    Shared,
    /// `&mut self`
    Exclusive,
}

/// Marker for a receiver kind.
pub trait Receiver: 'static {
    /// The runtime value of this receiver.
    const KIND: ReceiverKind;
}

/// `&self` receiver.
pub enum Shared {}

/// `&mut self` receiver.
pub enum Exclusive {}

impl Receiver for Shared {
    const KIND: ReceiverKind = ReceiverKind::Shared;
}

impl Receiver for Exclusive {
    const KIND: ReceiverKind = ReceiverKind::Exclusive;
}

/// One call signature.
///
/// Arguments and output are generic over `'a`, the borrow of the receiver
/// for the duration of one call. Arguments may borrow from the caller for
/// that long, and an output may borrow from the held value.
///
/// Usually declared with [`overload!`](crate::overload).
pub trait Overload: 'static {
    /// Name used in diagnostics. Unique among the overloads of a dispatch.
    const NAME: &'static str;
    /// [`Shared`] or [`Exclusive`].
    type Receiver: Receiver;
    /// The argument tuple.
    type Args<'a>;
    /// The return type, before the failure channel is applied.
    type Output<'a>;
    /// [`NeverFails`] or [`Fails<E>`].
    type Failure: Failure;
}

/// What invoking overload `O` through a borrow of lifetime `'a` returns.
pub type Outcome<'a, O> =
    <<O as Overload>::Failure as Failure>::Outcome<<O as Overload>::Output<'a>>;

/// A type-erased pointer to the handle inside a proxy's buffer, valid for
/// the borrow `'a`.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct HandlePtr<'a> {
    ptr: *mut (),
    phantom: PhantomData<&'a ()>,
}

impl<'a> HandlePtr<'a> {
    #[inline]
    pub(crate) const fn new(ptr: *mut ()) -> Self {
        HandlePtr {
            ptr,
            phantom: PhantomData,
        }
    }

    /// Borrows the pointee as a `T`.
    ///
    /// # Safety
    ///
    /// The pointer addresses an initialized `T` that nothing mutates
    /// during `'a`, except through interior mutability.
    #[inline]
    unsafe fn get<T: 'a>(self) -> &'a T {
        unsafe { &*self.ptr.cast_const().cast::<T>() }
    }

    /// Mutably borrows the pointee as a `T`.
    ///
    /// # Safety
    ///
    /// The pointer addresses an initialized `T` that nothing else accesses
    /// during `'a`.
    #[inline]
    unsafe fn get_mut<T: 'a>(self) -> &'a mut T {
        unsafe { &mut *self.ptr.cast::<T>() }
    }
}

impl fmt::Debug for HandlePtr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ptr.fmt(f)
    }
}

/// A type-erased entry point for overload `O`.
pub type Dispatcher<O> =
    for<'a> unsafe fn(HandlePtr<'a>, <O as Overload>::Args<'a>) -> Outcome<'a, O>;

/// Implements overload `O` through a shared reference.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement overload `{O}`",
    label = "missing `Call<{O}>` implementation",
    note = "overloads declared `-> Result<..>` and overloads declared without one are distinct; a fallible implementation does not satisfy a cannot-fail overload"
)]
pub trait Call<O: Overload> {
    /// Performs the operation.
    fn call<'a>(&'a self, args: O::Args<'a>) -> Outcome<'a, O>;
}

/// Implements overload `O` through an exclusive reference.
///
/// Every [`Call`] implementation is also a `CallMut` one.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement overload `{O}`",
    label = "missing `CallMut<{O}>` or `Call<{O}>` implementation"
)]
pub trait CallMut<O: Overload> {
    /// Performs the operation.
    fn call_mut<'a>(&'a mut self, args: O::Args<'a>) -> Outcome<'a, O>;
}

impl<O: Overload, T: Call<O> + ?Sized> CallMut<O> for T {
    #[inline]
    fn call_mut<'a>(&'a mut self, args: O::Args<'a>) -> Outcome<'a, O> {
        self.call(args)
    }
}

/// Binds overload `O` to handle type `P` for this receiver.
pub trait Bind<P, O: Overload>: Receiver {
    /// Entry point recovering `P` and forwarding to its target.
    const DISPATCHER: Dispatcher<O>;
}

impl<P, O> Bind<P, O> for Shared
where
    O: Overload,
    P: Handle + 'static,
    P::Target: Call<O>,
{
    const DISPATCHER: Dispatcher<O> = shared_dispatcher::<P, O>;
}

impl<P, O> Bind<P, O> for Exclusive
where
    O: Overload,
    P: HandleMut + 'static,
    P::Target: CallMut<O>,
{
    const DISPATCHER: Dispatcher<O> = exclusive_dispatcher::<P, O>;
}

/// # Safety
///
/// `handle` points to an initialized `P` that stays borrowed for `'a`.
unsafe fn shared_dispatcher<'a, P, O>(handle: HandlePtr<'a>, args: O::Args<'a>) -> Outcome<'a, O>
where
    O: Overload,
    P: Handle + 'static,
    P::Target: Call<O>,
{
    let handle = unsafe { handle.get::<P>() };
    handle.target().call(args)
}

/// # Safety
///
/// `handle` points to an initialized `P`, exclusively borrowed for `'a`.
unsafe fn exclusive_dispatcher<'a, P, O>(
    handle: HandlePtr<'a>,
    args: O::Args<'a>,
) -> Outcome<'a, O>
where
    O: Overload,
    P: HandleMut + 'static,
    P::Target: CallMut<O>,
{
    let handle = unsafe { handle.get_mut::<P>() };
    handle.target_mut().call_mut(args)
}

/// Descriptor names, as a list built during const evaluation.
///
/// Used to find a name declared twice, since trait selection cannot tell
/// two types apart.
#[derive(Debug, Clone, Copy)]
pub struct Names {
    name: &'static str,
    rest: Option<&'static Names>,
}

impl Names {
    /// The empty list.
    pub const END: Names = Names {
        name: "",
        rest: None,
    };

    /// `name` in front of `rest`.
    pub const fn cons(name: &'static str, rest: &'static Names) -> Self {
        Names {
            name,
            rest: Some(rest),
        }
    }

    /// Whether `name` is in the list.
    pub const fn contains(&self, name: &str) -> bool {
        let mut node = self;
        while let Some(rest) = node.rest {
            if str_eq(node.name, name) {
                return true;
            }
            node = rest;
        }
        false
    }

    /// The first name that occurs again further down the list.
    pub const fn first_repeat(&self) -> Option<&'static str> {
        let mut node = self;
        while let Some(rest) = node.rest {
            if rest.contains(node.name) {
                return Some(node.name);
            }
            node = rest;
        }
        None
    }
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// A type-level list of overloads.
pub trait OverloadList: 'static {
    /// Number of overloads.
    const LEN: usize;
    /// Overload names, in list order.
    const NAMES: &'static Names;
}

impl OverloadList for () {
    const LEN: usize = 0;
    const NAMES: &'static Names = &Names::END;
}

impl<O: Overload, Rest: OverloadList> OverloadList for (O, Rest) {
    const LEN: usize = Rest::LEN + 1;
    const NAMES: &'static Names = &Names::cons(O::NAME, Rest::NAMES);
}

/// Appends list `Tail` to a type-level list.
pub trait Concat<Tail> {
    /// The joined list.
    type Output;
}

impl<Tail> Concat<Tail> for () {
    type Output = Tail;
}

impl<H, T: Concat<Tail>, Tail> Concat<Tail> for (H, T) {
    type Output = (H, T::Output);
}

/// A named operation with one or more overloads.
///
/// Usually declared with [`dispatch!`](crate::dispatch). Values of the
/// dispatch type select it at call sites: `proxy.invoke(Draw, ())`.
pub trait Dispatch: 'static {
    /// Human-readable name. Unique among the dispatches of a facade.
    const NAME: &'static str;
    /// The overloads, as a type-level list.
    type Overloads: OverloadList;
}

/// A type-level list of dispatches.
pub trait DispatchList: 'static {
    /// Number of dispatches.
    const LEN: usize;
    /// Number of overloads across all dispatches.
    const OVERLOADS: usize;
    /// Whether some dispatch declares no overload.
    const HAS_EMPTY_DISPATCH: bool;
    /// Dispatch names, in list order.
    const NAMES: &'static Names;
    /// The first dispatch declaring an overload twice, with that overload.
    const REPEATED_OVERLOAD: Option<(&'static str, &'static str)>;
}

impl DispatchList for () {
    const LEN: usize = 0;
    const OVERLOADS: usize = 0;
    const HAS_EMPTY_DISPATCH: bool = false;
    const NAMES: &'static Names = &Names::END;
    const REPEATED_OVERLOAD: Option<(&'static str, &'static str)> = None;
}

impl<D: Dispatch, Rest: DispatchList> DispatchList for (D, Rest) {
    const LEN: usize = Rest::LEN + 1;
    const OVERLOADS: usize = Rest::OVERLOADS + <D::Overloads as OverloadList>::LEN;
    const HAS_EMPTY_DISPATCH: bool =
        Rest::HAS_EMPTY_DISPATCH || <D::Overloads as OverloadList>::LEN == 0;
    const NAMES: &'static Names = &Names::cons(D::NAME, Rest::NAMES);
    const REPEATED_OVERLOAD: Option<(&'static str, &'static str)> =
        match <D::Overloads as OverloadList>::NAMES.first_repeat() {
            Some(overload) => Some((D::NAME, overload)),
            None => Rest::REPEATED_OVERLOAD,
        };
}

/// A dispatch, or a pack of dispatches and nested packs.
///
/// A pack is a type-level list such as `list![Area, list![Text, Scale]]`.
/// [`facade!`](crate::facade) flattens its dispatch entries through this
/// trait, so packs declared once can be shared between facades.
pub trait DispatchPack {
    /// The dispatches, flattened in order.
    type Flat: DispatchList;
}

impl<D: Dispatch> DispatchPack for D {
    type Flat = (D, ());
}

impl DispatchPack for () {
    type Flat = ();
}

impl<H: DispatchPack, T: DispatchPack> DispatchPack for (H, T)
where
    H::Flat: Concat<T::Flat, Output: DispatchList>,
{
    type Flat = <H::Flat as Concat<T::Flat>>::Output;
}

/// The overloads of every dispatch in a list, concatenated in order.
///
/// Backs combined dispatches: see [`dispatch!`](crate::dispatch).
pub trait MergeOverloads {
    /// The merged overload list.
    type Merged: OverloadList;
}

impl MergeOverloads for () {
    type Merged = ();
}

impl<D: Dispatch, Rest: MergeOverloads> MergeOverloads for (D, Rest)
where
    D::Overloads: Concat<Rest::Merged, Output: OverloadList>,
{
    type Merged = <D::Overloads as Concat<Rest::Merged>>::Output;
}

/// Type-level index: the head of a list.
pub enum Here {}

/// Type-level index: somewhere in the tail of a list.
pub struct There<I>(PhantomData<I>);

/// Finds dispatch `D` in a dispatch list.
///
/// `BASE` is the slot of `D`'s first overload in a dispatch table. The
/// index `I` is inferred; a dispatch missing from the list fails to
/// compile.
#[diagnostic::on_unimplemented(
    message = "dispatch `{D}` is not declared by this facade",
    label = "`{D}` is missing from the facade's dispatches"
)]
pub trait Select<D: Dispatch, I>: DispatchList {
    /// Table slot of the dispatch's first overload.
    const BASE: usize;
}

impl<D: Dispatch, Rest: DispatchList> Select<D, Here> for (D, Rest) {
    const BASE: usize = Rest::OVERLOADS;
}

impl<D, H, Rest, I> Select<D, There<I>> for (H, Rest)
where
    D: Dispatch,
    H: Dispatch,
    Rest: Select<D, I>,
{
    const BASE: usize = <Rest as Select<D, I>>::BASE;
}

/// Picks the overload of a list whose argument tuple, for a call borrowing
/// the receiver for `'a`, is exactly `Args`.
///
/// Resolution is exact: no overload matching, or several, is a compile
/// error at the call site. Convert arguments explicitly to pick a
/// different overload.
#[diagnostic::on_unimplemented(
    message = "no unique overload accepts arguments `{Args}`",
    label = "arguments must match exactly one overload's argument tuple"
)]
pub trait Resolve<'a, Args, I>: OverloadList {
    /// The matched overload.
    type Matched: Overload<Args<'a> = Args>;
    /// Offset of the matched overload from the dispatch's first slot.
    const INDEX: usize;
}

impl<'a, Args, O, Rest> Resolve<'a, Args, Here> for (O, Rest)
where
    O: Overload<Args<'a> = Args>,
    Rest: OverloadList,
{
    type Matched = O;
    const INDEX: usize = Rest::LEN;
}

impl<'a, Args, H, Rest, I> Resolve<'a, Args, There<I>> for (H, Rest)
where
    H: Overload,
    Rest: Resolve<'a, Args, I>,
{
    type Matched = <Rest as Resolve<'a, Args, I>>::Matched;
    const INDEX: usize = <Rest as Resolve<'a, Args, I>>::INDEX;
}

/// The overload of dispatch `D` that argument tuple `Args` resolves to.
pub type Resolved<'a, D, Args, I> =
    <<D as Dispatch>::Overloads as Resolve<'a, Args, I>>::Matched;
