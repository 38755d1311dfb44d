#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

#[cfg(feature = "alloc")]
extern crate alloc;

mod macros;

pub mod level;
pub use level::{
    AtLeast, ConstraintLevel, Constraints, CopyableConstraints, Level, ProxiableConstraints,
    RelocatableConstraints, TrivialConstraints,
};

mod dispatch;
pub use dispatch::*;

mod facade;
pub use facade::*;

mod typeid;
pub use typeid::*;

mod reflect;
pub use reflect::*;

mod handle;
pub use handle::*;

mod vtable;
pub use vtable::{
    CopyFn, CopyableAt, DestroyFn, DispatchTable, DispatchesFor, MAX_OVERLOADS, OverloadSlots,
    OverloadsFor, RelocateFn,
};

mod error;
pub use error::*;

mod check;
pub use check::*;

mod storage;
pub use storage::*;

mod proxy;
pub use proxy::*;

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
/// Forwards to tracing::trace when the tracing feature is enabled
macro_rules! trace {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
/// Forwards to tracing::debug when the tracing feature is enabled
macro_rules! debug {
    ($($tt:tt)*) => {};
}
