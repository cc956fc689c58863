//! Type handle.
//!
//! Every type term lives in a [`Pool`](crate::Pool) and is referred to by a
//! 32-bit `Idx`. The builtin types Elm programs mention constantly are
//! interned when the pool is created, at fixed indices.

use std::fmt;

/// A 32-bit index into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    /// The error type: unifies with everything and suppresses cascades.
    pub const ERROR: Self = Self(0);
    /// `()`
    pub const UNIT: Self = Self(1);
    pub const INT: Self = Self(2);
    pub const FLOAT: Self = Self(3);
    pub const BOOL: Self = Self(4);
    pub const STRING: Self = Self(5);
    pub const CHAR: Self = Self(6);

    /// Number of pre-interned types.
    pub const BUILTIN_COUNT: u32 = 7;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::BUILTIN_COUNT
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ERROR => write!(f, "Idx::ERROR"),
            Self::UNIT => write!(f, "Idx::UNIT"),
            Self::INT => write!(f, "Idx::INT"),
            Self::FLOAT => write!(f, "Idx::FLOAT"),
            Self::BOOL => write!(f, "Idx::BOOL"),
            Self::STRING => write!(f, "Idx::STRING"),
            Self::CHAR => write!(f, "Idx::CHAR"),
            _ => write!(f, "Idx({})", self.0),
        }
    }
}

const _: () = assert!(std::mem::size_of::<Idx>() == 4);
