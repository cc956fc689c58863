//! Stable error codes for every diagnostic the core produces.
//!
//! The code string (`"E2004"`) is the contract shared with the request layer
//! and with code-action registrations. Inside the core the closed enum is
//! used everywhere; strings appear only at the serialization boundary.

use std::fmt;

use crate::fixes::FixId;
use crate::DiagnosticTier;

/// Error codes for all diagnostics.
///
/// Format: a letter and four digits. The letter and first digit select the
/// pipeline stage:
/// - E1xxx: syntax errors (malformed tree)
/// - E2xxx: name resolution errors (binder)
/// - E3xxx: type errors (inference)
/// - W1xxx: suggestions (style checks)
/// - L0xxx: diagnostics relayed from an external linter
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorCode {
    // Syntax (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,
    /// Malformed declaration
    E1004,
    /// Type annotation without a matching definition
    E1005,

    // Resolution (E2xxx)
    /// Imported module not found
    E2001,
    /// Name not exposed by the imported module
    E2002,
    /// Unqualified name brought in by several imports
    E2003,
    /// Name not found in scope
    E2004,
    /// Operator with no visible infix declaration
    E2005,
    /// Two files declare the same module
    E2006,
    /// Exposing list names something the module does not define
    E2007,
    /// Two top-level declarations share a name
    E2008,
    /// Non-associative operators chained without parentheses
    E2009,

    // Types (E3xxx)
    /// Type mismatch
    E3001,
    /// Infinite type
    E3002,
    /// Missing `case` branches
    E3003,
    /// Record lacks a field
    E3004,

    // Suggestions (W1xxx)
    /// Unused import
    W1001,
    /// Unused name in an import's exposing list
    W1002,
    /// Unused top-level declaration
    W1003,
    /// Top-level declaration without a type annotation
    W1004,

    // External (L0xxx)
    /// Relayed from an external linting tool
    L0001,
}

impl ErrorCode {
    /// All error code variants, for iteration and lookup.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::W1001,
        ErrorCode::W1002,
        ErrorCode::W1003,
        ErrorCode::W1004,
        ErrorCode::L0001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::W1001 => "W1001",
            ErrorCode::W1002 => "W1002",
            ErrorCode::W1003 => "W1003",
            ErrorCode::W1004 => "W1004",
            ErrorCode::L0001 => "L0001",
        }
    }

    /// Short human name, used in logs and titles.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "unexpected token",
            ErrorCode::E1002 => "expected expression",
            ErrorCode::E1003 => "unclosed delimiter",
            ErrorCode::E1004 => "malformed declaration",
            ErrorCode::E1005 => "orphan type annotation",
            ErrorCode::E2001 => "unresolved import",
            ErrorCode::E2002 => "name not exposed",
            ErrorCode::E2003 => "ambiguous name",
            ErrorCode::E2004 => "unknown name",
            ErrorCode::E2005 => "unknown operator",
            ErrorCode::E2006 => "duplicate module",
            ErrorCode::E2007 => "exposed name not defined",
            ErrorCode::E2008 => "duplicate definition",
            ErrorCode::E2009 => "non-associative operator chain",
            ErrorCode::E3001 => "type mismatch",
            ErrorCode::E3002 => "infinite type",
            ErrorCode::E3003 => "missing case branches",
            ErrorCode::E3004 => "record field missing",
            ErrorCode::W1001 => "unused import",
            ErrorCode::W1002 => "unused imported name",
            ErrorCode::W1003 => "unused top-level declaration",
            ErrorCode::W1004 => "missing type annotation",
            ErrorCode::L0001 => "external lint",
        }
    }

    /// Pipeline stage that produces this code.
    pub fn tier(&self) -> DiagnosticTier {
        if self.is_syntax_error() {
            DiagnosticTier::Syntactic
        } else if self.is_warning() || self.is_external() {
            DiagnosticTier::Suggestion
        } else {
            DiagnosticTier::Semantic
        }
    }

    /// Fix providers that answer this code.
    ///
    /// Exhaustive: adding a code without deciding its fixes does not compile.
    pub fn fix_ids(&self) -> &'static [FixId] {
        match self {
            ErrorCode::E1001
            | ErrorCode::E1002
            | ErrorCode::E1003
            | ErrorCode::E1004
            | ErrorCode::E1005
            | ErrorCode::E2001
            | ErrorCode::E2003
            | ErrorCode::E2005
            | ErrorCode::E2006
            | ErrorCode::E2007
            | ErrorCode::E2008
            | ErrorCode::E2009
            | ErrorCode::E3001
            | ErrorCode::E3002
            | ErrorCode::E3004
            | ErrorCode::W1003 => &[],
            ErrorCode::E2002 => &[FixId::ExposeFromModule],
            ErrorCode::E2004 => &[
                FixId::AddImport,
                FixId::AddAllMissingImports,
                FixId::AddMissingVariant,
            ],
            ErrorCode::E3003 => &[FixId::AddMissingCaseBranches],
            ErrorCode::W1001 => &[FixId::RemoveUnusedImport],
            ErrorCode::W1002 => &[FixId::RemoveUnusedImportedName],
            ErrorCode::W1004 => &[FixId::AddTypeAnnotation],
            ErrorCode::L0001 => &[FixId::ApplyExternalFix],
        }
    }

    /// Check if this is a syntax error (E1xxx range).
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001
                | ErrorCode::E1002
                | ErrorCode::E1003
                | ErrorCode::E1004
                | ErrorCode::E1005
        )
    }

    /// Check if this is a name resolution error (E2xxx range).
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E2001
                | ErrorCode::E2002
                | ErrorCode::E2003
                | ErrorCode::E2004
                | ErrorCode::E2005
                | ErrorCode::E2006
                | ErrorCode::E2007
                | ErrorCode::E2008
                | ErrorCode::E2009
        )
    }

    /// Check if this is a type error (E3xxx range).
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E3001 | ErrorCode::E3002 | ErrorCode::E3003 | ErrorCode::E3004
        )
    }

    /// Check if this is a warning code (W1xxx range).
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ErrorCode::W1001 | ErrorCode::W1002 | ErrorCode::W1003 | ErrorCode::W1004
        )
    }

    /// Check if this code is relayed from an external tool.
    pub fn is_external(&self) -> bool {
        matches!(self, ErrorCode::L0001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2004"` or `"W1001"`.
///
/// Case-insensitive. Derived from [`ErrorCode::ALL`] and [`ErrorCode::as_str()`].
impl std::str::FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}

/// A string that is not one of the stable codes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code `{0}`")]
pub struct UnknownErrorCode(pub String);

impl serde::Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for ErrorCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests;
