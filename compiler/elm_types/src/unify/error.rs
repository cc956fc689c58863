//! Unification failures.

use crate::pool::Name;
use crate::{Idx, VarKind};

/// Why two types could not be unified.
///
/// The engine reports the innermost failing pair; callers that want the
/// whole types in a message keep the pair they passed in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UnifyError {
    Mismatch { expected: Idx, found: Idx },
    /// `var` occurs inside `ty`: `a ~ List a`.
    InfiniteType { var: Idx, ty: Idx },
    /// A closed record lacks `field`.
    MissingField { field: Name, record: Idx },
    /// A rigid annotation variable was asked to become `found`.
    RigidMismatch { name: Name, found: Idx },
    /// `found` does not satisfy a `number`/`comparable`/... constraint.
    ConstraintViolation { kind: VarKind, found: Idx },
    /// A generalized variable reached unification without instantiation.
    UninstantiatedGeneralized { var: Idx },
}

impl UnifyError {
    pub fn is_infinite(&self) -> bool {
        matches!(self, UnifyError::InfiniteType { .. })
    }
}
