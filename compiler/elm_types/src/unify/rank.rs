//! Rank type for let-polymorphism.
//!
//! Ranks track the depth of let-bindings to determine which type variables
//! can be generalized. A variable created at rank N can only be generalized
//! when leaving rank N; unifying it with a term from an outer scope lowers
//! the rank of every variable in that term.

/// Scope depth of a type variable.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
pub struct Rank(u16);

impl Rank {
    /// Already generalized.
    pub const TOP: Self = Self(0);

    /// Top-level declarations of a module.
    pub const FIRST: Self = Self(1);

    /// Saturation point for pathological nesting.
    pub const MAX: Self = Self(u16::MAX - 1);

    #[inline]
    pub const fn from_raw(value: u16) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX.0))
    }

    #[inline]
    #[must_use]
    pub fn prev(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Whether a variable at this rank is generalized when leaving
    /// `generalization_rank`.
    #[inline]
    pub fn can_generalize_at(self, generalization_rank: Self) -> bool {
        self >= generalization_rank
    }
}
