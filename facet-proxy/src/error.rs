use core::fmt;

/// Why a handle (or a facade) failed the layout part of admission.
///
/// Trait-level requirements (overloads, copy level, reflection) are proven
/// by the type system instead and never show up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The facade's storage donor is zero-sized.
    EmptyStorage,

    /// A dispatch of the facade declares no overload.
    EmptyDispatch,

    /// The facade lists a dispatch twice, directly or through packs.
    DuplicateDispatch {
        /// Name of the repeated dispatch.
        dispatch: &'static str,
    },

    /// A dispatch lists an overload twice, typically by combining
    /// dispatches that share it.
    DuplicateOverload {
        /// Name of the dispatch.
        dispatch: &'static str,
        /// Name of the repeated overload.
        overload: &'static str,
    },

    /// The facade declares more overloads than a dispatch table holds.
    TooManyOverloads {
        /// Overloads declared across all dispatches.
        declared: usize,
        /// Capacity of a dispatch table.
        max: usize,
    },

    /// The handle is larger than the facade's storage.
    TooLarge {
        /// Size of the handle.
        size: usize,
        /// Size of the facade's storage.
        max_size: usize,
    },

    /// The handle is more strictly aligned than the facade's storage.
    OverAligned {
        /// Alignment of the handle.
        align: usize,
        /// Alignment of the facade's storage.
        max_align: usize,
    },

    /// The facade requires trivial destruction but the handle has drop glue.
    NonTrivialDestructor,
}

impl Rejection {
    /// A one-line description of the failed clause.
    ///
    /// Usable in const panics, so it carries no numbers; the `Display`
    /// implementation adds them.
    pub const fn message(self) -> &'static str {
        match self {
            Rejection::EmptyStorage => "facade storage is zero-sized",
            Rejection::EmptyDispatch => "facade declares a dispatch without overloads",
            Rejection::DuplicateDispatch { .. } => "facade lists a dispatch more than once",
            Rejection::DuplicateOverload { .. } => "dispatch lists an overload more than once",
            Rejection::TooManyOverloads { .. } => {
                "facade declares more overloads than a dispatch table holds"
            }
            Rejection::TooLarge { .. } => "handle is larger than the facade's storage",
            Rejection::OverAligned { .. } => {
                "handle is more strictly aligned than the facade's storage"
            }
            Rejection::NonTrivialDestructor => {
                "facade requires trivial destruction but the handle needs drop"
            }
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::DuplicateDispatch { dispatch } => write!(f, "{} ({dispatch})", self.message()),
            Rejection::DuplicateOverload { dispatch, overload } => {
                write!(f, "{} ({dispatch}: {overload})", self.message())
            }
            Rejection::TooManyOverloads { declared, max } => {
                write!(f, "{} ({declared} > {max})", self.message())
            }
            Rejection::TooLarge { size, max_size } => {
                write!(f, "{} ({size} > {max_size} bytes)", self.message())
            }
            Rejection::OverAligned { align, max_align } => {
                write!(f, "{} ({align} > {max_align})", self.message())
            }
            _ => f.write_str(self.message()),
        }
    }
}

impl core::error::Error for Rejection {}

/// Errors reported by the checked (`try_*`) proxy operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyError {
    /// The operation needs a held value but the proxy is empty.
    Empty {
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// The handle failed admission.
    Rejected(Rejection),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::Empty { operation } => write!(f, "cannot {operation}: proxy is empty"),
            ProxyError::Rejected(rejection) => write!(f, "handle rejected: {rejection}"),
        }
    }
}

impl core::error::Error for ProxyError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            ProxyError::Rejected(rejection) => Some(rejection),
            ProxyError::Empty { .. } => None,
        }
    }
}

impl From<Rejection> for ProxyError {
    fn from(rejection: Rejection) -> Self {
        ProxyError::Rejected(rejection)
    }
}
