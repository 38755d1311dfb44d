use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, MaybeUninit};
use core::ptr;

use crate::dispatch::{HandlePtr, Overload, Resolve, Resolved, Select, Shared};
use crate::level::{self, AtLeast, ConstraintLevel, Level};
use crate::vtable::restore;
use crate::{
    CopyabilityOf, DestructibilityOf, Dispatch, DispatchTable, Facade, Handle, Here, Outcome,
    Proxiable, ProxyError, Reflection, RelocatabilityOf, StorageOf, admission, debug, trace,
};

/// A dispatcher restored at one concrete borrow `'a`.
type Entry<'a, Args, O> = unsafe fn(HandlePtr<'a>, Args) -> Outcome<'a, O>;

/// A value-semantic container for any handle admitted by facade `F`.
///
/// A proxy is either empty or holds exactly one handle, stored in a buffer
/// shaped like `F`'s storage donor, next to the handle's
/// [`DispatchTable`]. Which lifetime operations exist (`Clone`,
/// [`take`](Proxy::take), [`swap`](Proxy::swap), [`reset`](Proxy::reset),
/// ...) depends on the levels in `F`'s constraints.
///
/// Proxies are neither `Send` nor `Sync`. Overloads with a `&self`
/// receiver may still mutate the held value through interior mutability.
pub struct Proxy<F: Facade> {
    table: Option<&'static DispatchTable>,
    storage: UnsafeCell<MaybeUninit<StorageOf<F>>>,
    _facade: PhantomData<(fn() -> F, *mut ())>,
}

impl<F: Facade> Proxy<F> {
    /// An empty proxy.
    pub const fn empty() -> Self {
        Proxy {
            table: None,
            storage: UnsafeCell::new(MaybeUninit::uninit()),
            _facade: PhantomData,
        }
    }

    /// A proxy holding `handle`.
    ///
    /// Fails to compile unless `P` is admissible under `F`.
    pub fn new<P: Proxiable<F>>(handle: P) -> Self {
        let () = P::ADMITTED;
        // SAFETY: admission was just checked.
        unsafe { Self::from_admitted(handle) }
    }

    /// A proxy holding the handle `make` returns.
    pub fn with<P: Proxiable<F>>(make: impl FnOnce() -> P) -> Self {
        Self::new(make())
    }

    /// A proxy holding the handle `make` returns, or `make`'s error,
    /// unchanged.
    pub fn try_with<P: Proxiable<F>, E>(make: impl FnOnce() -> Result<P, E>) -> Result<Self, E> {
        let () = P::ADMITTED;
        Ok(Self::new(make()?))
    }

    /// A proxy holding `handle`, checking the layout clauses of admission at
    /// run time instead of at compile time.
    ///
    /// Meant for generic code that must not fail to build for handles that
    /// do not fit. A rejected handle is dropped.
    pub fn try_new<P: Proxiable<F>>(handle: P) -> Result<Self, ProxyError> {
        if let Err(rejection) = admission::<F, P>() {
            debug!("rejected {}: {rejection}", core::any::type_name::<P>());
            return Err(rejection.into());
        }
        // SAFETY: admission was just checked.
        Ok(unsafe { Self::from_admitted(handle) })
    }

    /// # Safety
    ///
    /// `admission::<F, P>()` must be `Ok`.
    pub(crate) unsafe fn from_admitted<P: Proxiable<F>>(handle: P) -> Self {
        let mut proxy = Self::empty();
        unsafe { proxy.install(handle) };
        proxy
    }

    /// A proxy holding `handle`, dispatched through `table`.
    ///
    /// # Safety
    ///
    /// `table` was built for `P` under `F`, and `P` passes the layout
    /// clauses of admission.
    pub(crate) unsafe fn from_table<P: Handle + 'static>(
        handle: P,
        table: &'static DispatchTable,
    ) -> Self {
        let mut proxy = Self::empty();
        unsafe { proxy.install_with(handle, table) };
        proxy
    }

    /// # Safety
    ///
    /// The proxy is empty and `admission::<F, P>()` is `Ok`.
    unsafe fn install<P: Proxiable<F>>(&mut self, handle: P) {
        unsafe { self.install_with(handle, P::TABLE) }
    }

    /// # Safety
    ///
    /// The proxy is empty, `table` was built for `P` under `F`, and `P`
    /// passes the layout clauses of admission.
    unsafe fn install_with<P: 'static>(&mut self, handle: P, table: &'static DispatchTable) {
        debug_assert!(self.table.is_none());
        trace!(
            "installing {} into proxy of {}",
            core::any::type_name::<P>(),
            core::any::type_name::<F>()
        );
        unsafe { self.handle_mut_ptr().cast::<P>().write(handle) };
        self.table = Some(table);
    }

    /// Whether the proxy holds a handle.
    #[inline]
    pub fn has_value(&self) -> bool {
        self.table.is_some()
    }

    /// `core::any::type_name` of the held handle.
    pub fn type_name(&self) -> Option<&'static str> {
        self.table.map(DispatchTable::type_name)
    }

    /// The dispatch table of the held handle.
    pub fn table(&self) -> Option<&'static DispatchTable> {
        self.table
    }

    /// Address of the handle, writable through a shared borrow because the
    /// buffer is an `UnsafeCell`.
    #[inline]
    fn handle_ptr(&self) -> *mut () {
        self.storage.get().cast()
    }

    #[inline]
    fn handle_mut_ptr(&mut self) -> *mut () {
        self.storage.get_mut().as_mut_ptr().cast()
    }

    #[track_caller]
    fn expect_table(&self, operation: &'static str) -> &'static DispatchTable {
        match self.table {
            Some(table) => table,
            None => panic!("cannot {operation}: proxy is empty"),
        }
    }

    /// Drops the held handle, if any, leaving the proxy empty.
    ///
    /// The table is detached first, so a drop that unwinds leaves an empty
    /// proxy behind rather than a half-destroyed one.
    fn destroy(&mut self) {
        if let Some(table) = self.table.take() {
            trace!("destroying {}", table.type_name());
            if let Some(destroy) = table.destroy {
                // SAFETY: the buffer held an initialized handle of this table.
                unsafe { destroy(self.handle_mut_ptr()) };
            }
        }
    }

    /// Copies `source`'s buffer bytes over ours.
    ///
    /// # Safety
    ///
    /// Our buffer holds no handle, and `source`'s handle may be duplicated
    /// bitwise (or `source` gives it up).
    unsafe fn copy_storage_from(&mut self, source: &Self) {
        unsafe {
            ptr::copy_nonoverlapping(source.storage.get().cast_const(), self.storage.get(), 1)
        };
    }

    /// Moves `source`'s handle into `self`, leaving `source` empty.
    ///
    /// `self` must be empty.
    fn relocate_from(&mut self, source: &mut Self) {
        debug_assert!(self.table.is_none());
        if let Some(table) = source.table.take() {
            trace!("relocating {}", table.type_name());
            match table.relocate {
                // SAFETY: the source holds an initialized handle of this table
                // and our buffer is free.
                Some(relocate) => unsafe { relocate(self.handle_mut_ptr(), source.handle_mut_ptr()) },
                None => unsafe { self.copy_storage_from(source) },
            }
            self.table = Some(table);
        }
    }
}

impl<F: Facade> Proxy<F>
where
    DestructibilityOf<F>: AtLeast<level::MayFail>,
{
    /// Drops the held handle, if any. A no-op on an empty proxy.
    ///
    /// Only facades that destroy their handles offer this:
    ///
    /// ```compile_fail
    /// use facet_proxy::{Call, Constraints, Inline, Proxy, dispatch, facade, level, overload};
    ///
    /// overload! { pub Ping = fn(&self) -> u8; }
    /// dispatch! { pub Pinger = [Ping]; }
    ///
    /// pub enum Leaky {}
    /// impl Constraints for Leaky {
    ///     type Storage = [usize; 2];
    ///     type Copyability = level::Unconstrained;
    ///     type Relocatability = level::MayFail;
    ///     type Destructibility = level::Unconstrained;
    /// }
    /// facade! { pub Leaking { dispatches: [Pinger], constraints: Leaky } }
    ///
    /// struct Beacon;
    /// impl Call<Ping> for Beacon {
    ///     fn call(&self, (): ()) -> u8 { 1 }
    /// }
    ///
    /// let mut proxy = Proxy::<Leaking>::new(Inline::new(Beacon));
    /// proxy.reset();
    /// ```
    pub fn reset(&mut self) {
        self.destroy();
    }

    /// Replaces the held handle with `handle`.
    ///
    /// The old handle is dropped first; installing an existing handle cannot
    /// fail, so this happens in place.
    pub fn set<P: Proxiable<F>>(&mut self, handle: P) {
        let () = P::ADMITTED;
        self.destroy();
        // SAFETY: the proxy was just emptied and admission was checked.
        unsafe { self.install(handle) };
    }

    /// Drops the held handle, then stores the one `make` returns and hands
    /// out a reference to it.
    ///
    /// If `make` panics, the proxy is left empty.
    pub fn emplace<P: Proxiable<F>>(&mut self, make: impl FnOnce() -> P) -> &mut P {
        let () = P::ADMITTED;
        self.destroy();
        let handle = make();
        // SAFETY: the proxy is empty and admission was checked.
        unsafe {
            self.install(handle);
            &mut *self.handle_mut_ptr().cast::<P>()
        }
    }

    /// Like [`emplace`](Proxy::emplace), for constructors that may fail.
    ///
    /// The old handle is dropped before `make` runs, so on error the proxy
    /// is left empty and the error is returned unchanged.
    pub fn try_emplace<P: Proxiable<F>, E>(
        &mut self,
        make: impl FnOnce() -> Result<P, E>,
    ) -> Result<&mut P, E> {
        let () = P::ADMITTED;
        self.destroy();
        let handle = make()?;
        // SAFETY: the proxy is empty and admission was checked.
        unsafe {
            self.install(handle);
            Ok(&mut *self.handle_mut_ptr().cast::<P>())
        }
    }

    /// Builds a new handle with `make`, and only then drops the old one.
    ///
    /// On error the proxy keeps its old handle and the error is returned
    /// unchanged.
    pub fn try_replace<P: Proxiable<F>, E>(
        &mut self,
        make: impl FnOnce() -> Result<P, E>,
    ) -> Result<(), E> {
        let replacement = Self::try_with(make)?;
        *self = replacement;
        Ok(())
    }
}

impl<F: Facade> Proxy<F>
where
    RelocatabilityOf<F>: AtLeast<level::MayFail>,
{
    /// Moves the held handle into a new proxy, leaving this one empty.
    ///
    /// Only facades that relocate their handles offer this:
    ///
    /// ```compile_fail
    /// use facet_proxy::{Call, Constraints, Inline, Proxy, dispatch, facade, level, overload};
    ///
    /// overload! { pub Ping = fn(&self) -> u8; }
    /// dispatch! { pub Pinger = [Ping]; }
    ///
    /// pub enum Pinned {}
    /// impl Constraints for Pinned {
    ///     type Storage = [usize; 2];
    ///     type Copyability = level::Unconstrained;
    ///     type Relocatability = level::Unconstrained;
    ///     type Destructibility = level::MayFail;
    /// }
    /// facade! { pub Stuck { dispatches: [Pinger], constraints: Pinned } }
    ///
    /// struct Beacon;
    /// impl Call<Ping> for Beacon {
    ///     fn call(&self, (): ()) -> u8 { 1 }
    /// }
    ///
    /// let mut proxy = Proxy::<Stuck>::new(Inline::new(Beacon));
    /// let _moved = proxy.take();
    /// ```
    pub fn take(&mut self) -> Self {
        let mut moved = Self::empty();
        moved.relocate_from(self);
        moved
    }

    /// Exchanges the contents of two proxies.
    ///
    /// Bitwise when relocation is trivial; otherwise parks one handle in a
    /// temporary proxy, so exactly three relocations happen at most.
    pub fn swap(&mut self, other: &mut Self) {
        trace!(
            "swapping {:?} with {:?}",
            self.type_name(),
            other.type_name()
        );
        if <RelocatabilityOf<F> as Level>::LEVEL == ConstraintLevel::Trivial {
            mem::swap(&mut self.table, &mut other.table);
            mem::swap(&mut self.storage, &mut other.storage);
        } else {
            let mut parked = self.take();
            self.relocate_from(other);
            other.relocate_from(&mut parked);
        }
    }
}

impl<F: Facade> Proxy<F> {
    /// The dispatcher of the overload `Args` resolves to in `D`, at the
    /// borrow `'a`.
    fn entry<'a, D, Args, J, I>(
        table: &'static DispatchTable,
    ) -> Entry<'a, Args, Resolved<'a, D, Args, I>>
    where
        D: Dispatch,
        F::Dispatches: Select<D, J>,
        D::Overloads: Resolve<'a, Args, I>,
    {
        let slot =
            <F::Dispatches as Select<D, J>>::BASE + <D::Overloads as Resolve<'a, Args, I>>::INDEX;
        // SAFETY: slot `BASE + INDEX` was filled from this very overload's
        // `Dispatcher` when the table was built for `F`; instantiated at
        // `'a`, its argument tuple is `Args`.
        unsafe { restore(table.slots.get(slot)) }
    }

    /// Invokes the overload of `dispatch` matching `args` on the held
    /// handle, through a shared borrow.
    ///
    /// Arguments may borrow from the caller for the call, and the result
    /// may borrow from the proxy.
    ///
    /// # Panics
    ///
    /// If the proxy is empty.
    #[track_caller]
    pub fn invoke<'a, D, Args, J, I>(
        &'a self,
        dispatch: D,
        args: Args,
    ) -> Outcome<'a, Resolved<'a, D, Args, I>>
    where
        D: Dispatch,
        F::Dispatches: Select<D, J>,
        D::Overloads: Resolve<'a, Args, I>,
        Resolved<'a, D, Args, I>: Overload<Receiver = Shared>,
    {
        let _ = dispatch;
        let entry = Self::entry::<'a, D, Args, J, I>(self.expect_table("invoke"));
        // SAFETY: the overload takes a shared borrow; any mutation goes
        // through interior mutability, which the `UnsafeCell` buffer allows.
        unsafe { entry(HandlePtr::new(self.handle_ptr()), args) }
    }

    /// Invokes the overload of `dispatch` matching `args` on the held
    /// handle, through an exclusive borrow. Accepts overloads of either
    /// receiver.
    ///
    /// # Panics
    ///
    /// If the proxy is empty.
    #[track_caller]
    pub fn invoke_mut<'a, D, Args, J, I>(
        &'a mut self,
        dispatch: D,
        args: Args,
    ) -> Outcome<'a, Resolved<'a, D, Args, I>>
    where
        D: Dispatch,
        F::Dispatches: Select<D, J>,
        D::Overloads: Resolve<'a, Args, I>,
    {
        let _ = dispatch;
        let entry = Self::entry::<'a, D, Args, J, I>(self.expect_table("invoke"));
        // SAFETY: the handle is exclusively borrowed for `'a`.
        unsafe { entry(HandlePtr::new(self.handle_mut_ptr()), args) }
    }

    /// Like [`invoke`](Proxy::invoke), returning [`ProxyError::Empty`]
    /// instead of panicking.
    pub fn try_invoke<'a, D, Args, J, I>(
        &'a self,
        dispatch: D,
        args: Args,
    ) -> Result<Outcome<'a, Resolved<'a, D, Args, I>>, ProxyError>
    where
        D: Dispatch,
        F::Dispatches: Select<D, J>,
        D::Overloads: Resolve<'a, Args, I>,
        Resolved<'a, D, Args, I>: Overload<Receiver = Shared>,
    {
        if !self.has_value() {
            return Err(ProxyError::Empty {
                operation: D::NAME,
            });
        }
        Ok(self.invoke::<D, Args, J, I>(dispatch, args))
    }

    /// Like [`invoke_mut`](Proxy::invoke_mut), returning
    /// [`ProxyError::Empty`] instead of panicking.
    pub fn try_invoke_mut<'a, D, Args, J, I>(
        &'a mut self,
        dispatch: D,
        args: Args,
    ) -> Result<Outcome<'a, Resolved<'a, D, Args, I>>, ProxyError>
    where
        D: Dispatch,
        F::Dispatches: Select<D, J>,
        D::Overloads: Resolve<'a, Args, I>,
    {
        if !self.has_value() {
            return Err(ProxyError::Empty {
                operation: D::NAME,
            });
        }
        Ok(self.invoke_mut::<D, Args, J, I>(dispatch, args))
    }

    /// Invokes the facade's only dispatch: `proxy.call(args)` is
    /// `proxy.invoke(D, args)`.
    ///
    /// # Panics
    ///
    /// If the proxy is empty.
    #[track_caller]
    pub fn call<'a, D, Args, I>(&'a self, args: Args) -> Outcome<'a, Resolved<'a, D, Args, I>>
    where
        F: Facade<Dispatches = (D, ())>,
        D: Dispatch,
        D::Overloads: Resolve<'a, Args, I>,
        Resolved<'a, D, Args, I>: Overload<Receiver = Shared>,
    {
        let entry = Self::entry::<'a, D, Args, Here, I>(self.expect_table("call"));
        // SAFETY: as in `invoke`.
        unsafe { entry(HandlePtr::new(self.handle_ptr()), args) }
    }

    /// Mutable counterpart of [`call`](Proxy::call).
    ///
    /// # Panics
    ///
    /// If the proxy is empty.
    #[track_caller]
    pub fn call_mut<'a, D, Args, I>(
        &'a mut self,
        args: Args,
    ) -> Outcome<'a, Resolved<'a, D, Args, I>>
    where
        F: Facade<Dispatches = (D, ())>,
        D: Dispatch,
        D::Overloads: Resolve<'a, Args, I>,
    {
        let entry = Self::entry::<'a, D, Args, Here, I>(self.expect_table("call"));
        // SAFETY: the handle is exclusively borrowed for `'a`.
        unsafe { entry(HandlePtr::new(self.handle_mut_ptr()), args) }
    }

    /// The reflection payload of the held handle.
    ///
    /// # Panics
    ///
    /// If the proxy is empty.
    #[track_caller]
    pub fn reflect(&self) -> F::Reflection
    where
        F::Reflection: Reflection,
    {
        let table = self.expect_table("reflect");
        // SAFETY: the thunk was erased from a `fn() -> F::Reflection`.
        let reflect: fn() -> F::Reflection = unsafe { restore(table.reflect) };
        reflect()
    }

    /// Like [`reflect`](Proxy::reflect), returning [`ProxyError::Empty`]
    /// instead of panicking.
    pub fn try_reflect(&self) -> Result<F::Reflection, ProxyError>
    where
        F::Reflection: Reflection,
    {
        if !self.has_value() {
            return Err(ProxyError::Empty {
                operation: "reflect",
            });
        }
        Ok(self.reflect())
    }
}

impl<F: Facade> Default for Proxy<F> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<F: Facade> Clone for Proxy<F>
where
    CopyabilityOf<F>: AtLeast<level::MayFail>,
{
    fn clone(&self) -> Self {
        let mut copy = Self::empty();
        if let Some(table) = self.table {
            trace!("copying {}", table.type_name());
            match table.copy {
                // SAFETY: our buffer holds a handle of this table, the copy's
                // buffer is free.
                Some(clone) => unsafe { clone(copy.handle_mut_ptr(), self.handle_ptr()) },
                // SAFETY: trivially copyable handles are plain bytes.
                None => unsafe { copy.copy_storage_from(self) },
            }
            copy.table = Some(table);
        }
        copy
    }

    /// In place when cloning cannot unwind; otherwise clones into a
    /// temporary first, so an unwinding clone leaves `self` untouched.
    fn clone_from(&mut self, source: &Self) {
        if <CopyabilityOf<F> as Level>::LEVEL.at_least(ConstraintLevel::CannotFail) {
            self.destroy();
            if let Some(table) = source.table {
                match table.copy {
                    // SAFETY: `self` was just emptied.
                    Some(clone) => unsafe { clone(self.handle_mut_ptr(), source.handle_ptr()) },
                    None => unsafe { self.copy_storage_from(source) },
                }
                self.table = Some(table);
            }
        } else {
            *self = source.clone();
        }
    }
}

impl<F: Facade> Drop for Proxy<F> {
    /// Drops the held handle. When the facade's destruction level is
    /// `None` the handle is leaked instead.
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<F: Facade> fmt::Debug for Proxy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table {
            Some(table) => f
                .debug_tuple("Proxy")
                .field(&format_args!("{}", table.type_name()))
                .finish(),
            None => f.write_str("Proxy(<empty>)"),
        }
    }
}
