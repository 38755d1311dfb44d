//! Lifetime constraint levels, and the storage bounds a facade places on the
//! handles it admits.
//!
//! A level grades one lifetime operation of a handle: copying it, relocating
//! it to another buffer, or destroying it. Levels exist twice: as the runtime
//! enum [`ConstraintLevel`], and as the uninhabited tags of this module
//! ([`Unconstrained`], [`MayFail`], [`CannotFail`], [`Trivial`]) so that a
//! facade's requirements can be spelled as trait bounds.
//!
//! "Failing" for a lifetime operation means unwinding.

use core::fmt;

/// How strictly a facade constrains one lifetime operation of the handles it
/// holds.
///
/// Levels are totally ordered: `None < MayFail < CannotFail < Trivial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ConstraintLevel {
    /// The operation is not offered at all.
    None,
    /// The operation is offered and may unwind.
    MayFail,
    /// The operation is offered and never unwinds.
    CannotFail,
    /// The operation is a bitwise copy (or, for destruction, a no-op).
    Trivial,
}

impl ConstraintLevel {
    /// Returns `true` if `self` meets or exceeds `other`.
    #[inline]
    pub const fn at_least(self, other: ConstraintLevel) -> bool {
        self as u8 >= other as u8
    }

    /// Whether a proxy needs a per-type dispatcher to perform an operation
    /// constrained at this level.
    ///
    /// `None` never performs the operation and `Trivial` takes the bitwise
    /// fast path.
    #[inline]
    pub const fn needs_dispatcher(self) -> bool {
        matches!(self, ConstraintLevel::MayFail | ConstraintLevel::CannotFail)
    }

    /// Short lowercase name, as used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            ConstraintLevel::None => "none",
            ConstraintLevel::MayFail => "may-fail",
            ConstraintLevel::CannotFail => "cannot-fail",
            ConstraintLevel::Trivial => "trivial",
        }
    }
}

impl fmt::Display for ConstraintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type-level constraint level.
pub trait Level: 'static {
    /// The runtime value of this level.
    const LEVEL: ConstraintLevel;
}

/// The operation is not offered.
pub enum Unconstrained {}

/// The operation is offered and may unwind.
pub enum MayFail {}

/// The operation is offered and never unwinds.
pub enum CannotFail {}

/// The operation is bitwise.
pub enum Trivial {}

impl Level for Unconstrained {
    const LEVEL: ConstraintLevel = ConstraintLevel::None;
}

impl Level for MayFail {
    const LEVEL: ConstraintLevel = ConstraintLevel::MayFail;
}

impl Level for CannotFail {
    const LEVEL: ConstraintLevel = ConstraintLevel::CannotFail;
}

impl Level for Trivial {
    const LEVEL: ConstraintLevel = ConstraintLevel::Trivial;
}

/// `Self` meets or exceeds the level `L`.
///
/// Proxy operations use this to appear only on facades whose constraints
/// allow them, e.g. `Clone` for `Proxy<F>` requires the facade's
/// copyability to be `AtLeast<MayFail>`.
#[diagnostic::on_unimplemented(
    message = "constraint level `{Self}` does not meet `{L}`",
    label = "this facade does not constrain the operation strictly enough"
)]
pub trait AtLeast<L: Level>: Level {}

macro_rules! at_least {
    ($($level:ty => [$($lower:ty),*];)*) => {
        $($(impl AtLeast<$lower> for $level {})*)*
    };
}

at_least! {
    Unconstrained => [Unconstrained];
    MayFail => [Unconstrained, MayFail];
    CannotFail => [Unconstrained, MayFail, CannotFail];
    Trivial => [Unconstrained, MayFail, CannotFail, Trivial];
}

/// The storage bound and lifetime levels of a facade.
///
/// `Storage` is a layout donor: a proxy reserves exactly one `Storage` worth
/// of bytes, so its size is the largest handle the facade admits and its
/// alignment the strictest.
pub trait Constraints: 'static {
    /// Layout donor for the proxy's buffer.
    type Storage: 'static;
    /// Level required of `Clone` on the handle.
    type Copyability: Level;
    /// Level required of moving the handle out of one proxy into another.
    type Relocatability: Level;
    /// Level required of dropping the handle.
    type Destructibility: Level;
}

/// Two machine words, copy not offered, moves and drops that never unwind.
///
/// This is what `facade!` uses when no constraints are named.
pub enum RelocatableConstraints {}

impl Constraints for RelocatableConstraints {
    type Storage = [usize; 2];
    type Copyability = Unconstrained;
    type Relocatability = CannotFail;
    type Destructibility = CannotFail;
}

/// Like [`RelocatableConstraints`], plus a `Clone` that may unwind.
pub enum CopyableConstraints {}

impl Constraints for CopyableConstraints {
    type Storage = [usize; 2];
    type Copyability = MayFail;
    type Relocatability = CannotFail;
    type Destructibility = CannotFail;
}

/// One machine word, and every lifetime operation bitwise.
///
/// Fits shared references and other plain `Copy` handles.
pub enum TrivialConstraints {}

impl Constraints for TrivialConstraints {
    type Storage = usize;
    type Copyability = Trivial;
    type Relocatability = Trivial;
    type Destructibility = Trivial;
}

/// The runtime view of a [`Constraints`] bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxiableConstraints {
    /// Largest admissible handle, in bytes.
    pub max_size: usize,
    /// Strictest admissible handle alignment.
    pub max_align: usize,
    /// Required copy level.
    pub copyability: ConstraintLevel,
    /// Required relocation level.
    pub relocatability: ConstraintLevel,
    /// Required destruction level.
    pub destructibility: ConstraintLevel,
}

impl ProxiableConstraints {
    /// Reads the bounds out of a [`Constraints`] bundle.
    pub const fn of<C: Constraints>() -> Self {
        ProxiableConstraints {
            max_size: core::mem::size_of::<C::Storage>(),
            max_align: core::mem::align_of::<C::Storage>(),
            copyability: <C::Copyability as Level>::LEVEL,
            relocatability: <C::Relocatability as Level>::LEVEL,
            destructibility: <C::Destructibility as Level>::LEVEL,
        }
    }
}
