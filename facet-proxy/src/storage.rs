//! Storage strategies, and the selector choosing between them.
//!
//! [`Inline`] embeds a value in the proxy's own buffer. [`Indirect`] moves
//! it to the heap and keeps only a pointer inline. Both are [`Handle`]s, so
//! dispatch code never knows which one it is looking at.

#[cfg(feature = "alloc")]
use alloc::boxed::Box;

use crate::{Handle, HandleMut, InfallibleClone};
#[cfg(feature = "alloc")]
use crate::level::{self, Level};
#[cfg(feature = "alloc")]
use crate::{CopyabilityOf, DispatchTable, Facade, Proxiable, Proxy, admission};

/// Embeds `T` directly in the proxy's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Inline<T>(T);

impl<T> Inline<T> {
    /// Wraps a value.
    #[inline]
    pub const fn new(value: T) -> Self {
        Inline(value)
    }

    /// Unwraps the value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Handle for Inline<T> {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        &self.0
    }
}

impl<T> HandleMut for Inline<T> {
    #[inline]
    fn target_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: InfallibleClone> InfallibleClone for Inline<T> {}

/// Keeps `T` on the heap; only the pointer lives in the proxy's buffer.
///
/// Cloning deep-copies the pointee. A pointer is one word and relocates
/// bitwise whatever `T` is, which is what lets the selector fall back to
/// this strategy.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Indirect<T>(Box<T>);

#[cfg(feature = "alloc")]
impl<T> Indirect<T> {
    /// Moves a value to the heap.
    #[inline]
    pub fn new(value: T) -> Self {
        Indirect(Box::new(value))
    }

    /// Adopts an existing allocation.
    #[inline]
    pub fn from_box(value: Box<T>) -> Self {
        Indirect(value)
    }

    /// Moves the value back off the heap.
    #[inline]
    pub fn into_inner(self) -> T {
        *self.0
    }
}

#[cfg(feature = "alloc")]
impl<T> Handle for Indirect<T> {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        &self.0
    }
}

#[cfg(feature = "alloc")]
impl<T> HandleMut for Indirect<T> {
    #[inline]
    fn target_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

#[cfg(feature = "alloc")]
impl<T: InfallibleClone> InfallibleClone for Indirect<T> {}

/// Where the selector puts a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// In the proxy's buffer, as [`Inline<T>`].
    Inline,
    /// On the heap, as [`Indirect<T>`].
    Indirect,
}

/// Whether a copy level lets a `T` fall back to the heap under facade
/// `F`, and with which table.
///
/// Heap handles are never `Copy`, so a facade whose copy level is trivial
/// admits none; every other level asks `Indirect<T>` to meet the facade's
/// trait clauses.
#[cfg(feature = "alloc")]
#[diagnostic::on_unimplemented(
    message = "`Indirect<{T}>` cannot be stored in a proxy of facade `{F}`",
    label = "the heap fallback must meet the facade's trait clauses"
)]
pub trait HeapFallback<F: Facade, T>: Level {
    /// The table of `Indirect<T>`, or `None` when heap handles are ruled
    /// out.
    const TABLE: Option<&'static DispatchTable>;
}

#[cfg(feature = "alloc")]
impl<F: Facade, T: 'static> HeapFallback<F, T> for level::Trivial {
    const TABLE: Option<&'static DispatchTable> = None;
}

#[cfg(feature = "alloc")]
macro_rules! heap_fallback {
    ($($level:ty),*) => {
        $(
            impl<F: Facade, T: 'static> HeapFallback<F, T> for $level
            where
                Indirect<T>: Proxiable<F>,
            {
                const TABLE: Option<&'static DispatchTable> =
                    Some(<Indirect<T> as Proxiable<F>>::TABLE);
            }
        )*
    };
}

#[cfg(feature = "alloc")]
heap_fallback!(level::Unconstrained, level::MayFail, level::CannotFail);

/// Picks the storage strategy for a `T` in a `Proxy<F>`.
///
/// Prefers [`Placement::Inline`]; falls back to [`Placement::Indirect`] when
/// the inline handle fails the layout clauses and the facade admits heap
/// handles. `None` when neither works.
#[cfg(feature = "alloc")]
pub const fn placement<F: Facade, T: 'static>() -> Option<Placement>
where
    CopyabilityOf<F>: HeapFallback<F, T>,
{
    if admission::<F, Inline<T>>().is_ok() {
        Some(Placement::Inline)
    } else if <CopyabilityOf<F> as HeapFallback<F, T>>::TABLE.is_some()
        && admission::<F, Indirect<T>>().is_ok()
    {
        Some(Placement::Indirect)
    } else {
        None
    }
}

#[cfg(feature = "alloc")]
struct Selection<F, T>(core::marker::PhantomData<(F, T)>);

#[cfg(feature = "alloc")]
impl<F: Facade, T: 'static> Selection<F, T>
where
    CopyabilityOf<F>: HeapFallback<F, T>,
{
    /// The heap handle's table when the value goes to the heap, `None`
    /// when it stays inline.
    const HEAP: Option<&'static DispatchTable> = match placement::<F, T>() {
        Some(Placement::Inline) => None,
        Some(Placement::Indirect) => <CopyabilityOf<F> as HeapFallback<F, T>>::TABLE,
        None => panic!("value fits neither inline nor indirect storage of this facade"),
    };
}

/// Stores `value` in a new proxy, inline if it fits and on the heap
/// otherwise.
///
/// Only the strategy that can be picked has to meet the facade's trait
/// clauses: a facade with a trivial copy level never falls back to the
/// heap, so it only needs `Inline<T>`.
#[cfg(feature = "alloc")]
pub fn make_proxy<F, T>(value: T) -> Proxy<F>
where
    F: Facade,
    T: 'static,
    Inline<T>: Proxiable<F>,
    CopyabilityOf<F>: HeapFallback<F, T>,
{
    make_proxy_with(|| value)
}

/// Like [`make_proxy`], constructing the value only once the strategy is
/// known.
#[cfg(feature = "alloc")]
pub fn make_proxy_with<F, T>(make: impl FnOnce() -> T) -> Proxy<F>
where
    F: Facade,
    T: 'static,
    Inline<T>: Proxiable<F>,
    CopyabilityOf<F>: HeapFallback<F, T>,
{
    match Selection::<F, T>::HEAP {
        // SAFETY: the selector only picks strategies that passed admission,
        // and the heap table was built for `Indirect<T>` under `F`.
        Some(table) => unsafe { Proxy::from_table(Indirect::new(make()), table) },
        None => unsafe { Proxy::from_admitted(Inline::new(make())) },
    }
}

/// Like [`make_proxy_with`], for constructors that may fail. The error is
/// returned unchanged.
#[cfg(feature = "alloc")]
pub fn try_make_proxy_with<F, T, E>(make: impl FnOnce() -> Result<T, E>) -> Result<Proxy<F>, E>
where
    F: Facade,
    T: 'static,
    Inline<T>: Proxiable<F>,
    CopyabilityOf<F>: HeapFallback<F, T>,
{
    let value = make()?;
    Ok(make_proxy_with(|| value))
}
