//! Diagnostic vocabulary for the Elm analysis core.
//!
//! - [`ErrorCode`]: stable codes, the contract between diagnostic producers
//!   and fix providers
//! - [`Diagnostic`]: one shape for syntactic, semantic and suggestion findings
//! - [`queue::DiagnosticQueue`]: dedup by (span, code) and position ordering
//! - [`edit`]: text edits, per-file application and fix-all composition
//! - [`fixes`]: code-action values and the closed set of fix providers

mod diagnostic;
pub mod edit;
mod error_code;
pub mod fixes;
pub mod queue;

pub use diagnostic::{
    non_associative_chain, type_mismatch, unknown_name, unknown_operator, Diagnostic,
    DiagnosticData, DiagnosticTier, Label, LintFix, Severity,
};
pub use edit::{ChangeTracker, EditComposer, EditConflict, TextEdit, WorkspaceEdit};
pub use error_code::{ErrorCode, UnknownErrorCode};
pub use fixes::{CodeAction, CodeActionKind, FixId};
pub use queue::{DiagnosticConfig, DiagnosticQueue};
