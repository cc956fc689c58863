//! Constrained type variables.
//!
//! Elm has no type classes; instead a handful of variable names carry a
//! built-in constraint: `number`, `comparable`, `appendable` and
//! `compappend`. The constraint is part of the variable, so it is decided
//! by the variable's name in annotations and survives export and import.

use std::fmt;

/// The constraint carried by a type variable.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum VarKind {
    /// Unconstrained.
    #[default]
    Flex,
    /// `Int` or `Float`.
    Number,
    /// `Int`, `Float`, `Char`, `String`, and lists or tuples of comparables.
    Comparable,
    /// `String` or `List a`.
    Appendable,
    /// `String` or `List comparable`.
    CompAppend,
}

impl VarKind {
    /// Kind implied by a variable name, following Elm's prefix rule
    /// (`number`, `number1`, `comparableKey`, ...).
    pub fn from_var_name(name: &str) -> Self {
        if name.starts_with("number") {
            VarKind::Number
        } else if name.starts_with("compappend") {
            VarKind::CompAppend
        } else if name.starts_with("comparable") {
            VarKind::Comparable
        } else if name.starts_with("appendable") {
            VarKind::Appendable
        } else {
            VarKind::Flex
        }
    }

    /// Base name used when printing an anonymous variable of this kind.
    pub fn base_name(self) -> Option<&'static str> {
        match self {
            VarKind::Flex => None,
            VarKind::Number => Some("number"),
            VarKind::Comparable => Some("comparable"),
            VarKind::Appendable => Some("appendable"),
            VarKind::CompAppend => Some("compappend"),
        }
    }

    /// The constraint a variable must satisfy after unifying variables of
    /// kinds `self` and `other`, or `None` when no type satisfies both.
    pub fn merge(self, other: VarKind) -> Option<VarKind> {
        use VarKind::{Appendable, CompAppend, Comparable, Flex, Number};
        match (self, other) {
            (Flex, k) | (k, Flex) => Some(k),
            (a, b) if a == b => Some(a),
            (Number, Comparable) | (Comparable, Number) => Some(Number),
            (Comparable, Appendable)
            | (Appendable, Comparable)
            | (CompAppend, Comparable | Appendable)
            | (Comparable | Appendable, CompAppend) => Some(CompAppend),
            _ => None,
        }
    }

    /// Whether a rigid variable of kind `self` may stand where a variable of
    /// kind `required` is expected.
    pub fn satisfies(self, required: VarKind) -> bool {
        self.merge(required) == Some(self)
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name().unwrap_or("a type"))
    }
}
