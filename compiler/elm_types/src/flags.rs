//! Pre-computed type metadata flags.
//!
//! Computed once when a type is interned; used to skip traversals in the
//! occurs check, rank updates, generalization and substitution.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u16 {
        /// Contains a type variable in any state (conservative: a variable
        /// linked since interning still counts).
        const HAS_VAR = 1 << 0;
        /// Contains a variable created rigid from an annotation.
        const HAS_RIGID = 1 << 1;
        /// Contains the error type.
        const HAS_ERROR = 1 << 2;

        const IS_FUNCTION = 1 << 8;
        const IS_RECORD = 1 << 9;
        const IS_VAR = 1 << 10;
    }
}

impl TypeFlags {
    /// Flags inherited by a compound type from its children.
    pub const PROPAGATE_MASK: Self = Self::from_bits_truncate(
        Self::HAS_VAR.bits() | Self::HAS_RIGID.bits() | Self::HAS_ERROR.bits(),
    );

    #[inline]
    pub const fn has_vars(self) -> bool {
        self.contains(Self::HAS_VAR)
    }

    #[inline]
    pub const fn has_errors(self) -> bool {
        self.contains(Self::HAS_ERROR)
    }

    /// The part of `self` a parent type inherits.
    #[inline]
    #[must_use]
    pub const fn propagated(self) -> Self {
        self.intersection(Self::PROPAGATE_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::TypeFlags;

    #[test]
    fn category_flags_do_not_propagate() {
        let child = TypeFlags::HAS_VAR | TypeFlags::IS_FUNCTION;
        assert_eq!(child.propagated(), TypeFlags::HAS_VAR);
    }
}
