//! The three diagnostic tiers of a file.
//!
//! - syntactic: parser recovery errors, from the tree alone
//! - semantic: binder and inference errors
//! - suggestions: the configured [`SuggestionRule`]s, plus diagnostics an
//!   external linter attached to the file
//!
//! Each tier is deduplicated by (span, code) and sorted by position; the
//! full answer is the three tiers in that order. Library files have no
//! diagnostics.

mod rules;

use elm_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorCode};
use elm_ir::ast::{SyntaxError, SyntaxErrorKind};
use elm_ir::FileUri;

pub use rules::{
    default_rules, MissingTypeAnnotation, RuleContext, SuggestionRule, UnusedImport,
    UnusedImportedName, UnusedTopLevel,
};

use crate::forest::{Revision, SourceFile};
use crate::workspace::Session;

/// Diagnostics an external tool attached to one revision of a file.
#[derive(Clone, Debug)]
pub(crate) struct ExternalDiagnostics {
    pub revision: Revision,
    pub diagnostics: Vec<Diagnostic>,
}

pub(crate) fn syntax_code(kind: SyntaxErrorKind) -> ErrorCode {
    match kind {
        SyntaxErrorKind::InvalidCharacter | SyntaxErrorKind::UnexpectedToken => ErrorCode::E1001,
        SyntaxErrorKind::ExpectedExpression => ErrorCode::E1002,
        SyntaxErrorKind::UnclosedDelimiter => ErrorCode::E1003,
        SyntaxErrorKind::MalformedDeclaration => ErrorCode::E1004,
        SyntaxErrorKind::OrphanAnnotation => ErrorCode::E1005,
    }
}

fn syntax_diagnostic(error: &SyntaxError) -> Diagnostic {
    let code = syntax_code(error.kind);
    Diagnostic::error(code)
        .with_message(error.message.clone())
        .with_label(error.span, code.name())
}

fn tier(session: &Session<'_>, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Vec<Diagnostic> {
    let config = session.workspace().config();
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        limit: 0,
        deduplicate: config.deduplicate_diagnostics,
    });
    queue.extend(diagnostics);
    queue.flush()
}

fn diagnosable(session: &Session<'_>, uri: &FileUri) -> Option<std::sync::Arc<SourceFile>> {
    session.file(uri).filter(|file| !file.is_virtual)
}

pub(crate) fn syntactic(session: &Session<'_>, uri: &FileUri) -> Vec<Diagnostic> {
    let Some(file) = diagnosable(session, uri) else {
        return Vec::new();
    };
    tier(session, file.tree.errors.iter().map(syntax_diagnostic))
}

pub(crate) fn semantic(session: &Session<'_>, uri: &FileUri) -> Vec<Diagnostic> {
    let Some(file) = diagnosable(session, uri) else {
        return Vec::new();
    };
    let Some(resolved) = session.resolved(uri) else {
        return Vec::new();
    };
    let mut diagnostics = resolved.diagnostics.clone();
    for decl in file.tree.value_decls() {
        if let Some(inferred) = session.inferred(uri, &decl.name.name) {
            diagnostics.extend(inferred.diagnostics.iter().cloned());
        }
    }
    tier(session, diagnostics)
}

pub(crate) fn suggestions(session: &Session<'_>, uri: &FileUri) -> Vec<Diagnostic> {
    let Some(file) = diagnosable(session, uri) else {
        return Vec::new();
    };
    let Some(resolved) = session.resolved(uri) else {
        return Vec::new();
    };
    let ws = session.workspace();
    let config = ws.config();
    let ctx = RuleContext::new(&file, &resolved, session);
    let mut diagnostics = Vec::new();
    for rule in ws.rules() {
        if rule.enabled(&config.suggestions) {
            let _span = tracing::trace_span!("suggestion rule", code = %rule.code()).entered();
            diagnostics.extend(rule.check(&ctx));
        }
    }
    diagnostics.extend(ws.external_diagnostics(uri, file.revision));
    tier(session, diagnostics)
}

/// All tiers, in order. Findings repeated across tiers are kept once.
pub(crate) fn diagnose(session: &Session<'_>, uri: &FileUri) -> Vec<Diagnostic> {
    let mut seen = rustc_hash::FxHashSet::default();
    let dedup = session.workspace().config().deduplicate_diagnostics;
    syntactic(session, uri)
        .into_iter()
        .chain(semantic(session, uri))
        .chain(suggestions(session, uri))
        .filter(|d| !dedup || seen.insert((d.span, d.code)))
        .collect()
}

#[cfg(test)]
mod tests;
