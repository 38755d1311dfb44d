//! Facade descriptors.

use crate::{Constraints, DispatchList, MAX_OVERLOADS, ProxiableConstraints, Rejection};

/// Everything a proxy may do with the handle it holds.
///
/// A facade bundles a list of dispatches, a [`Constraints`] bundle (storage
/// bound and lifetime levels), and a reflection payload type
/// ([`NoReflection`](crate::NoReflection) if it declares none). It is never
/// instantiated; [`facade!`](crate::facade) declares it as an uninhabited
/// enum.
///
/// Dispatches in one facade must be distinct, and so must the overloads of
/// one dispatch. Both are told apart by name; [`validate`] rejects repeats.
pub trait Facade: 'static {
    /// The dispatches, as a type-level list.
    type Dispatches: DispatchList;
    /// Storage bound and lifetime levels.
    type Constraints: Constraints;
    /// Payload returned by [`Proxy::reflect`](crate::Proxy::reflect).
    type Reflection: 'static;
}

/// Layout donor of facade `F`'s buffer.
pub type StorageOf<F> = <<F as Facade>::Constraints as Constraints>::Storage;

/// Copy level required by facade `F`.
pub type CopyabilityOf<F> = <<F as Facade>::Constraints as Constraints>::Copyability;

/// Relocation level required by facade `F`.
pub type RelocatabilityOf<F> = <<F as Facade>::Constraints as Constraints>::Relocatability;

/// Destruction level required by facade `F`.
pub type DestructibilityOf<F> = <<F as Facade>::Constraints as Constraints>::Destructibility;

/// The runtime view of facade `F`'s constraints.
pub const fn constraints_of<F: Facade>() -> ProxiableConstraints {
    ProxiableConstraints::of::<F::Constraints>()
}

/// Checks that facade `F` is well-formed, independently of any handle.
///
/// Alignment is always a power of two and size always a multiple of it for
/// Rust types, so only the remaining requirements are checked here.
pub const fn validate<F: Facade>() -> Result<(), Rejection> {
    let constraints = constraints_of::<F>();
    if constraints.max_size == 0 {
        return Err(Rejection::EmptyStorage);
    }
    if <F::Dispatches as DispatchList>::HAS_EMPTY_DISPATCH {
        return Err(Rejection::EmptyDispatch);
    }
    if let Some(dispatch) = <F::Dispatches as DispatchList>::NAMES.first_repeat() {
        return Err(Rejection::DuplicateDispatch { dispatch });
    }
    if let Some((dispatch, overload)) = <F::Dispatches as DispatchList>::REPEATED_OVERLOAD {
        return Err(Rejection::DuplicateOverload { dispatch, overload });
    }
    let declared = <F::Dispatches as DispatchList>::OVERLOADS;
    if declared > MAX_OVERLOADS {
        return Err(Rejection::TooManyOverloads {
            declared,
            max: MAX_OVERLOADS,
        });
    }
    Ok(())
}
