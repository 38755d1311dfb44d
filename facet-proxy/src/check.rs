//! Admission: proving that a handle satisfies a facade.
//!
//! Admission has two halves, both settled while the program is compiled:
//!
//! - trait clauses, carried by the bounds of [`Proxiable`]: every overload
//!   of every dispatch is served by the handle's target, the handle can be
//!   copied at the facade's copy level, and the facade's reflection payload
//!   can be built for it;
//! - layout clauses, computed by the `const fn` [`admission`]: size,
//!   alignment, trivial destruction, and the facade's own validity.
//!
//! [`Proxy::new`](crate::Proxy::new) and friends evaluate
//! [`Proxiable::ADMITTED`], which turns a layout rejection into a
//! compile-time error carrying [`Rejection::message`]:
//!
//! ```compile_fail
//! use facet_proxy::{Call, Inline, Proxy, RelocatableConstraints, dispatch, facade, overload};
//!
//! overload! { pub Ping = fn(&self) -> u8; }
//! dispatch! { pub Pinger = [Ping]; }
//! facade! { pub Small { dispatches: [Pinger], constraints: RelocatableConstraints } }
//!
//! struct Wide([u64; 3]);
//! impl Call<Ping> for Wide {
//!     fn call(&self, (): ()) -> u8 { 1 }
//! }
//!
//! // 24 bytes do not fit in two words.
//! let _ = Proxy::<Small>::new(Inline::new(Wide([0; 3])));
//! ```

use core::mem::{align_of, needs_drop, size_of};

use crate::level::ConstraintLevel;
use crate::{
    CopyabilityOf, CopyableAt, DispatchTable, DispatchesFor, Facade, Handle, Reflect, Rejection,
    constraints_of, validate,
};

/// Checks the layout clauses of admitting handle `P` into facade `F`.
///
/// Returns the first failed clause. Trait clauses are not covered: a handle
/// that fails them cannot name `Proxiable<F>` at all.
pub const fn admission<F: Facade, P>() -> Result<(), Rejection> {
    if let Err(rejection) = validate::<F>() {
        return Err(rejection);
    }
    let constraints = constraints_of::<F>();
    let size = size_of::<P>();
    if size > constraints.max_size {
        return Err(Rejection::TooLarge {
            size,
            max_size: constraints.max_size,
        });
    }
    let align = align_of::<P>();
    if align > constraints.max_align {
        return Err(Rejection::OverAligned {
            align,
            max_align: constraints.max_align,
        });
    }
    if matches!(constraints.destructibility, ConstraintLevel::Trivial) && needs_drop::<P>() {
        return Err(Rejection::NonTrivialDestructor);
    }
    Ok(())
}

/// Handle `Self` may be stored in a `Proxy<F>`.
///
/// Implemented for every handle meeting the trait clauses of admission;
/// the layout clauses are checked by evaluating [`Proxiable::ADMITTED`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be stored in a proxy of facade `{F}`",
    label = "not admissible under `{F}`",
    note = "a handle must serve every overload of the facade, be copyable at the facade's copy level, and support its reflection payload"
)]
pub trait Proxiable<F: Facade>: Handle + Sized + 'static {
    /// The handle's dispatch table under `F`.
    const TABLE: &'static DispatchTable;

    /// Evaluating this fails the build if a layout clause is violated.
    const ADMITTED: ();
}

impl<F, P> Proxiable<F> for P
where
    F: Facade,
    P: Handle + CopyableAt<CopyabilityOf<F>> + 'static,
    F::Dispatches: DispatchesFor<P>,
    F::Reflection: Reflect<P>,
{
    const TABLE: &'static DispatchTable = &DispatchTable::of::<F, P>();

    const ADMITTED: () = match admission::<F, P>() {
        Ok(()) => (),
        Err(rejection) => panic!("{}", rejection.message()),
    };
}
