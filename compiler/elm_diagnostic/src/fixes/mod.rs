//! Code-action values.
//!
//! [`FixId`] is the closed set of fix providers. The mapping from error code
//! to providers is [`ErrorCode::fix_ids`]; the reverse direction is
//! [`FixId::trigger_codes`]. Providers themselves live with the analysis
//! engine since they read trees, scopes and types.

use std::fmt;

use crate::edit::WorkspaceEdit;
use crate::ErrorCode;

/// Identity of a fix provider.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixId {
    ExposeName,
    ExposeFromModule,
    AddMissingCaseBranches,
    AddMissingVariant,
    AddImport,
    AddAllMissingImports,
    AddTypeAnnotation,
    RemoveUnusedImport,
    RemoveUnusedImportedName,
    ApplyExternalFix,
    ExtractFunction,
    ExtractLocalFunction,
    ExtractTypeAlias,
}

impl FixId {
    pub const ALL: &[FixId] = &[
        FixId::ExposeName,
        FixId::ExposeFromModule,
        FixId::AddMissingCaseBranches,
        FixId::AddMissingVariant,
        FixId::AddImport,
        FixId::AddAllMissingImports,
        FixId::AddTypeAnnotation,
        FixId::RemoveUnusedImport,
        FixId::RemoveUnusedImportedName,
        FixId::ApplyExternalFix,
        FixId::ExtractFunction,
        FixId::ExtractLocalFunction,
        FixId::ExtractTypeAlias,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FixId::ExposeName => "expose-name",
            FixId::ExposeFromModule => "expose-from-module",
            FixId::AddMissingCaseBranches => "add-missing-case-branches",
            FixId::AddMissingVariant => "add-missing-variant",
            FixId::AddImport => "add-import",
            FixId::AddAllMissingImports => "add-all-missing-imports",
            FixId::AddTypeAnnotation => "add-type-annotation",
            FixId::RemoveUnusedImport => "remove-unused-import",
            FixId::RemoveUnusedImportedName => "remove-unused-imported-name",
            FixId::ApplyExternalFix => "apply-external-fix",
            FixId::ExtractFunction => "extract-function",
            FixId::ExtractLocalFunction => "extract-local-function",
            FixId::ExtractTypeAlias => "extract-type-alias",
        }
    }

    /// Error codes this provider answers. Empty for refactors that are
    /// available without a diagnostic.
    pub fn trigger_codes(&self) -> &'static [ErrorCode] {
        match self {
            FixId::ExposeFromModule => &[ErrorCode::E2002],
            FixId::AddMissingCaseBranches => &[ErrorCode::E3003],
            FixId::AddMissingVariant | FixId::AddImport | FixId::AddAllMissingImports => {
                &[ErrorCode::E2004]
            }
            FixId::AddTypeAnnotation => &[ErrorCode::W1004],
            FixId::RemoveUnusedImport => &[ErrorCode::W1001],
            FixId::RemoveUnusedImportedName => &[ErrorCode::W1002],
            FixId::ApplyExternalFix => &[ErrorCode::L0001],
            FixId::ExposeName
            | FixId::ExtractFunction
            | FixId::ExtractLocalFunction
            | FixId::ExtractTypeAlias => &[],
        }
    }

    pub fn is_refactor(&self) -> bool {
        self.trigger_codes().is_empty()
    }

    pub fn kind(&self) -> CodeActionKind {
        match self {
            FixId::ExtractFunction | FixId::ExtractLocalFunction | FixId::ExtractTypeAlias => {
                CodeActionKind::RefactorExtract
            }
            FixId::ExposeName => CodeActionKind::Refactor,
            _ => CodeActionKind::QuickFix,
        }
    }
}

impl fmt::Display for FixId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-facing category of an action.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum CodeActionKind {
    #[serde(rename = "quickfix")]
    QuickFix,
    #[serde(rename = "refactor")]
    Refactor,
    #[serde(rename = "refactor.extract")]
    RefactorExtract,
    #[serde(rename = "source.fixAll")]
    SourceFixAll,
}

/// A titled edit offered to the user. Computed on demand, never cached.
#[derive(Clone, Eq, PartialEq, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct CodeAction {
    pub title: String,
    pub kind: CodeActionKind,
    pub fix_id: Option<FixId>,
    pub edit: WorkspaceEdit,
    /// Codes of the diagnostics this action resolves.
    pub diagnostics: Vec<ErrorCode>,
    pub is_preferred: bool,
}

impl CodeAction {
    pub fn new(title: impl Into<String>, fix_id: FixId, edit: WorkspaceEdit) -> Self {
        CodeAction {
            title: title.into(),
            kind: fix_id.kind(),
            fix_id: Some(fix_id),
            edit,
            diagnostics: Vec::new(),
            is_preferred: false,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: CodeActionKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn for_diagnostic(mut self, code: ErrorCode) -> Self {
        if !self.diagnostics.contains(&code) {
            self.diagnostics.push(code);
        }
        self
    }

    #[must_use]
    pub fn preferred(mut self) -> Self {
        self.is_preferred = true;
        self
    }
}
