//! Declarative sugar for writing descriptors.
//!
//! Everything here expands to plain trait implementations; descriptors can
//! be written by hand just as well.

/// Writes a type-level list: `list![A, B, C]` is `(A, (B, (C, ())))`.
#[macro_export]
macro_rules! list {
    () => { () };
    ($head:ty $(, $tail:ty)* $(,)?) => { ($head, $crate::list![$($tail),*]) };
}

/// Declares overloads, one uninhabited marker type each.
///
/// ```
/// # use facet_proxy::overload;
/// # pub struct ParseError;
/// overload! {
///     /// Cannot fail, shared receiver.
///     pub Area = fn(&self) -> f64;
///     /// Exclusive receiver, no return value.
///     pub Grow = fn(&mut self, f64);
///     /// May fail with `ParseError`.
///     pub Parse = fn(&mut self, String) -> Result<usize, ParseError>;
///     /// Borrows its argument, and returns a borrow of the held value.
///     pub Field<'a> = fn(&self, &'a str) -> Option<&'a str>;
/// }
/// ```
///
/// A return type spelled `Result<T, E>` declares a may-fail overload with
/// output `T` and error `E`; anything else is cannot-fail. Arguments and
/// outputs that borrow name the overload's lifetime, which stands for the
/// borrow of the receiver during one call; errors never borrow.
#[macro_export]
macro_rules! overload {
    () => {};

    (@emit [$($meta:tt)*] $vis:vis $name:ident [$lt:lifetime], $receiver:ty, ($($arg:ty),*), $output:ty, $failure:ty) => {
        $($meta)*
        $vis enum $name {}

        impl $crate::Overload for $name {
            const NAME: &'static str = stringify!($name);
            type Receiver = $receiver;
            type Args<$lt> = ($($arg,)*);
            type Output<$lt> = $output;
            type Failure = $failure;
        }
    };
    (@emit [$($meta:tt)*] $vis:vis $name:ident [], $($signature:tt)*) => {
        $crate::overload!(@emit [$($meta)*] $vis $name ['call], $($signature)*);
    };

    ($(#[$meta:meta])* $vis:vis $name:ident $(<$lt:lifetime>)? = fn(&self $(, $arg:ty)* $(,)?) -> Result<$ok:ty, $err:ty>; $($rest:tt)*) => {
        $crate::overload!(@emit [$(#[$meta])*] $vis $name [$($lt)?], $crate::Shared, ($($arg),*), $ok, $crate::Fails<$err>);
        $crate::overload!($($rest)*);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident $(<$lt:lifetime>)? = fn(&mut self $(, $arg:ty)* $(,)?) -> Result<$ok:ty, $err:ty>; $($rest:tt)*) => {
        $crate::overload!(@emit [$(#[$meta])*] $vis $name [$($lt)?], $crate::Exclusive, ($($arg),*), $ok, $crate::Fails<$err>);
        $crate::overload!($($rest)*);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident $(<$lt:lifetime>)? = fn(&self $(, $arg:ty)* $(,)?) -> $output:ty; $($rest:tt)*) => {
        $crate::overload!(@emit [$(#[$meta])*] $vis $name [$($lt)?], $crate::Shared, ($($arg),*), $output, $crate::NeverFails);
        $crate::overload!($($rest)*);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident $(<$lt:lifetime>)? = fn(&mut self $(, $arg:ty)* $(,)?) -> $output:ty; $($rest:tt)*) => {
        $crate::overload!(@emit [$(#[$meta])*] $vis $name [$($lt)?], $crate::Exclusive, ($($arg),*), $output, $crate::NeverFails);
        $crate::overload!($($rest)*);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident $(<$lt:lifetime>)? = fn(&self $(, $arg:ty)* $(,)?); $($rest:tt)*) => {
        $crate::overload!(@emit [$(#[$meta])*] $vis $name [$($lt)?], $crate::Shared, ($($arg),*), (), $crate::NeverFails);
        $crate::overload!($($rest)*);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident $(<$lt:lifetime>)? = fn(&mut self $(, $arg:ty)* $(,)?); $($rest:tt)*) => {
        $crate::overload!(@emit [$(#[$meta])*] $vis $name [$($lt)?], $crate::Exclusive, ($($arg),*), (), $crate::NeverFails);
        $crate::overload!($($rest)*);
    };
}

/// Declares dispatches: unit structs naming a list of overloads.
///
/// ```
/// # use facet_proxy::{dispatch, overload};
/// overload! {
///     pub Plain = fn(&self) -> String;
///     pub Padded = fn(&self, usize) -> String;
///     pub Resize = fn(&mut self, usize);
/// }
/// dispatch! {
///     /// Renders the value.
///     pub Render = [Plain, Padded];
///     pub Fit = [Resize];
///     /// Every overload of `Render` and `Fit`, under one name.
///     pub Layout = combine[Render, Fit];
/// }
/// ```
///
/// A combined dispatch concatenates the overload lists of the dispatches
/// (or packs of dispatches) it names. An overload reached through two of
/// them makes the combination invalid, which
/// [`validate`](crate::validate) reports.
#[macro_export]
macro_rules! dispatch {
    () => {};

    (@emit [$($meta:tt)*] $vis:vis $name:ident, $overloads:ty) => {
        $($meta)*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name;

        impl $crate::Dispatch for $name {
            const NAME: &'static str = stringify!($name);
            type Overloads = $overloads;
        }
    };

    ($(#[$meta:meta])* $vis:vis $name:ident = combine[$($dispatch:ty),+ $(,)?]; $($rest:tt)*) => {
        $crate::dispatch!(@emit [$(#[$meta])*] $vis $name,
            <<$crate::list![$($dispatch),+] as $crate::DispatchPack>::Flat as $crate::MergeOverloads>::Merged);
        $crate::dispatch!($($rest)*);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident = [$($overload:ty),+ $(,)?]; $($rest:tt)*) => {
        $crate::dispatch!(@emit [$(#[$meta])*] $vis $name, $crate::list![$($overload),+]);
        $crate::dispatch!($($rest)*);
    };
}

/// Declares facades.
///
/// `constraints` defaults to
/// [`RelocatableConstraints`](crate::RelocatableConstraints) and
/// `reflection` to [`NoReflection`](crate::NoReflection).
///
/// A `dispatches` entry is a dispatch or a pack: a [`list!`](crate::list)
/// of dispatches and further packs, flattened in order through
/// [`DispatchPack`](crate::DispatchPack). A dispatch reached twice makes
/// the facade invalid.
///
/// ```
/// # use facet_proxy::{dispatch, facade, overload, CopyableConstraints, HandleInfo};
/// # overload! { pub Plain = fn(&self) -> String; pub Clear = fn(&mut self); }
/// # dispatch! { pub Render = [Plain]; pub Reset = [Clear]; }
/// /// Dispatches shared by several facades.
/// pub type Editing = facet_proxy::list![Render, Reset];
///
/// facade! {
///     /// Anything that renders, copyable.
///     pub Renderable {
///         dispatches: [Render],
///         constraints: CopyableConstraints,
///         reflection: HandleInfo,
///     }
///
///     /// Renders and resets.
///     pub Editable {
///         dispatches: [Editing],
///     }
/// }
/// ```
#[macro_export]
macro_rules! facade {
    () => {};

    (@emit [$($meta:tt)*] $vis:vis $name:ident, [$($dispatch:ty),*], $constraints:ty, $reflection:ty) => {
        $($meta)*
        $vis enum $name {}

        impl $crate::Facade for $name {
            type Dispatches = <$crate::list![$($dispatch),*] as $crate::DispatchPack>::Flat;
            type Constraints = $constraints;
            type Reflection = $reflection;
        }
    };

    ($(#[$meta:meta])* $vis:vis $name:ident {
        dispatches: [$($dispatch:ty),* $(,)?],
        constraints: $constraints:ty,
        reflection: $reflection:ty $(,)?
    } $($rest:tt)*) => {
        $crate::facade!(@emit [$(#[$meta])*] $vis $name, [$($dispatch),*], $constraints, $reflection);
        $crate::facade!($($rest)*);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident {
        dispatches: [$($dispatch:ty),* $(,)?],
        constraints: $constraints:ty $(,)?
    } $($rest:tt)*) => {
        $crate::facade!(@emit [$(#[$meta])*] $vis $name, [$($dispatch),*], $constraints, $crate::NoReflection);
        $crate::facade!($($rest)*);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident {
        dispatches: [$($dispatch:ty),* $(,)?],
        reflection: $reflection:ty $(,)?
    } $($rest:tt)*) => {
        $crate::facade!(@emit [$(#[$meta])*] $vis $name, [$($dispatch),*], $crate::RelocatableConstraints, $reflection);
        $crate::facade!($($rest)*);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident {
        dispatches: [$($dispatch:ty),* $(,)?] $(,)?
    } $($rest:tt)*) => {
        $crate::facade!(@emit [$(#[$meta])*] $vis $name, [$($dispatch),*], $crate::RelocatableConstraints, $crate::NoReflection);
        $crate::facade!($($rest)*);
    };
}
