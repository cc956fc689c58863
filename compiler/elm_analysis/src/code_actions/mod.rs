//! Code actions.
//!
//! Every provider has a [`FixId`]. The registry indexes providers by the
//! error codes they answer, using [`ErrorCode::fix_ids`], and keeps the
//! refactors that need no diagnostic apart. Actions are computed on demand
//! and never cached.

mod edits;
mod expose;
mod extract;
mod fixes;
mod imports;
mod locate;

use std::sync::Arc;

use elm_diagnostic::{CodeAction, CodeActionKind, Diagnostic, EditComposer, ErrorCode, FixId};
use elm_ir::{FileUri, Span};
use rustc_hash::FxHashMap;

use crate::binder::{ModuleInterface, ResolvedFile};
use crate::cancel::CancellationToken;
use crate::forest::SourceFile;
use crate::infer::InferredDecl;
use crate::workspace::Session;
use crate::AnalysisError;

/// Everything a provider can look at for one request.
pub struct FixContext<'a> {
    pub uri: &'a FileUri,
    pub source: &'a SourceFile,
    pub resolved: &'a ResolvedFile,
    /// The range the client asked about; the diagnostic's span for
    /// diagnostic-driven requests.
    pub range: Span,
    session: &'a Session<'a>,
}

impl<'a> FixContext<'a> {
    pub fn text(&self) -> &str {
        &self.source.text
    }

    /// Inference result of a top-level value of this file.
    pub fn inferred(&self, name: &str) -> Option<Arc<InferredDecl>> {
        self.session.inferred(self.uri, name)
    }

    pub fn file(&self, uri: &FileUri) -> Option<Arc<SourceFile>> {
        self.session.file(uri)
    }

    pub fn module_file(&self, module: &str) -> Option<Arc<SourceFile>> {
        self.session.state.module_file(module).cloned()
    }

    pub fn module_interface(&self, module: &str) -> Option<Arc<ModuleInterface>> {
        self.session.module_interface(module)
    }

    /// Interfaces of every module but this one, library modules included,
    /// sorted by module name.
    pub fn other_modules(&self) -> Vec<Arc<ModuleInterface>> {
        let own = self.source.module_name();
        let mut modules: Vec<Arc<ModuleInterface>> = self
            .session
            .state
            .files()
            .filter(|f| f.module_name() != own)
            .filter_map(|f| self.session.interface(&f.uri))
            .collect();
        modules.sort_by(|a, b| a.module.cmp(&b.module).then_with(|| a.uri.cmp(&b.uri)));
        modules.dedup_by(|a, b| a.module == b.module);
        modules
    }

    /// Diagnostics of this file, all tiers.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        crate::diagnostics::diagnose(self.session, self.uri)
    }
}

/// Produces actions for one [`FixId`].
pub trait FixProvider: Send + Sync {
    fn id(&self) -> FixId;

    /// Actions for `diagnostic`, or, for refactors, for `ctx.range`.
    fn actions(&self, ctx: &FixContext<'_>, diagnostic: Option<&Diagnostic>) -> Vec<CodeAction>;
}

/// Providers indexed by error code.
pub struct FixRegistry {
    providers: FxHashMap<FixId, Arc<dyn FixProvider>>,
    by_code: FxHashMap<ErrorCode, Vec<FixId>>,
    refactors: Vec<FixId>,
}

impl FixRegistry {
    pub fn new(providers: Vec<Arc<dyn FixProvider>>) -> Self {
        let providers: FxHashMap<FixId, Arc<dyn FixProvider>> =
            providers.into_iter().map(|p| (p.id(), p)).collect();
        let mut by_code: FxHashMap<ErrorCode, Vec<FixId>> = FxHashMap::default();
        for &code in ErrorCode::ALL {
            for &id in code.fix_ids() {
                debug_assert!(providers.contains_key(&id), "no provider for {id}");
                if providers.contains_key(&id) {
                    by_code.entry(code).or_default().push(id);
                }
            }
        }
        let refactors = FixId::ALL
            .iter()
            .copied()
            .filter(|id| id.is_refactor() && providers.contains_key(id))
            .collect();
        FixRegistry {
            providers,
            by_code,
            refactors,
        }
    }

    /// Every built-in provider.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Arc::new(expose::ExposeName),
            Arc::new(expose::ExposeFromModule),
            Arc::new(fixes::AddMissingCaseBranches),
            Arc::new(fixes::AddMissingVariant),
            Arc::new(imports::AddImport),
            Arc::new(imports::AddAllMissingImports),
            Arc::new(fixes::AddTypeAnnotation),
            Arc::new(imports::RemoveUnusedImport),
            Arc::new(imports::RemoveUnusedImportedName),
            Arc::new(fixes::ApplyExternalFix),
            Arc::new(extract::ExtractFunction),
            Arc::new(extract::ExtractLocalFunction),
            Arc::new(extract::ExtractTypeAlias),
        ])
    }

    pub fn provider(&self, id: FixId) -> Option<&dyn FixProvider> {
        self.providers.get(&id).map(|p| &**p)
    }

    pub fn for_code(&self, code: ErrorCode) -> impl Iterator<Item = &dyn FixProvider> {
        self.by_code
            .get(&code)
            .into_iter()
            .flatten()
            .filter_map(|id| self.provider(*id))
    }

    pub fn refactors(&self) -> impl Iterator<Item = &dyn FixProvider> {
        self.refactors.iter().filter_map(|id| self.provider(*id))
    }
}

/// A range that no longer fits the file: the client is behind.
fn stale(file: &SourceFile, range: Span) -> bool {
    range.end > file.len() || range.start > range.end
}

pub(crate) fn code_actions_for(
    session: &Session<'_>,
    uri: &FileUri,
    range: Span,
    diagnostics: &[Diagnostic],
) -> Vec<CodeAction> {
    let Some(source) = session.file(uri).filter(|f| !f.is_virtual) else {
        return Vec::new();
    };
    if stale(&source, range) {
        debug_assert!(false, "stale code action range {range:?} for {uri}");
        tracing::error!(uri = %uri, ?range, "stale code action range");
        return Vec::new();
    }
    let Some(resolved) = session.resolved(uri) else {
        return Vec::new();
    };
    let registry = session.workspace().registry();
    let mut actions = Vec::new();
    for diagnostic in diagnostics.iter().filter(|d| d.span.overlaps(range)) {
        if stale(&source, diagnostic.span) {
            continue;
        }
        let ctx = FixContext {
            uri,
            source: &source,
            resolved: &resolved,
            range: diagnostic.span,
            session,
        };
        for provider in registry.for_code(diagnostic.code) {
            let _span = tracing::debug_span!("fix provider", id = %provider.id()).entered();
            actions.extend(provider.actions(&ctx, Some(diagnostic)));
        }
    }
    let ctx = FixContext {
        uri,
        source: &source,
        resolved: &resolved,
        range,
        session,
    };
    for provider in registry.refactors() {
        let _span = tracing::debug_span!("refactor provider", id = %provider.id()).entered();
        actions.extend(provider.actions(&ctx, None));
    }
    actions
}

/// One action applying `fix_id` to every matching diagnostic of the file.
pub(crate) fn fix_all(session: &Session<'_>, uri: &FileUri, fix_id: FixId) -> Option<CodeAction> {
    if fix_id.is_refactor() {
        return None;
    }
    let mut all = FixAll::new(fix_id);
    all.file(session, uri);
    all.finish()
}

/// `fix_id` applied across every workspace file, edits merged per file.
/// The token is checked between files.
pub(crate) fn fix_all_in_workspace(
    session: &Session<'_>,
    fix_id: FixId,
    cancel: &CancellationToken,
) -> Result<Option<CodeAction>, AnalysisError> {
    if fix_id.is_refactor() {
        return Ok(None);
    }
    let mut all = FixAll::new(fix_id);
    for file in session.state.workspace_files() {
        cancel.check()?;
        all.file(session, &file.uri);
    }
    Ok(all.finish())
}

/// Accumulates one provider's first action per diagnostic.
struct FixAll {
    fix_id: FixId,
    composer: EditComposer,
    codes: Vec<ErrorCode>,
}

impl FixAll {
    fn new(fix_id: FixId) -> Self {
        FixAll {
            fix_id,
            composer: EditComposer::new(),
            codes: Vec::new(),
        }
    }

    fn file(&mut self, session: &Session<'_>, uri: &FileUri) {
        let Some(source) = session.file(uri).filter(|f| !f.is_virtual) else {
            return;
        };
        let Some(resolved) = session.resolved(uri) else {
            return;
        };
        let registry = session.workspace().registry();
        let Some(provider) = registry.provider(self.fix_id) else {
            return;
        };
        let diagnostics = crate::diagnostics::diagnose(session, uri);
        for diagnostic in diagnostics
            .iter()
            .filter(|d| self.fix_id.trigger_codes().contains(&d.code))
        {
            let ctx = FixContext {
                uri,
                source: &source,
                resolved: &resolved,
                range: diagnostic.span,
                session,
            };
            if let Some(action) = provider.actions(&ctx, Some(diagnostic)).into_iter().next() {
                self.composer.add(&action.edit);
                if !self.codes.contains(&diagnostic.code) {
                    self.codes.push(diagnostic.code);
                }
            }
        }
    }

    fn finish(self) -> Option<CodeAction> {
        let fix_id = self.fix_id;
        if self.composer.dropped() > 0 {
            tracing::debug!(
                fix = %fix_id,
                dropped = self.composer.dropped(),
                "conflicting edits dropped"
            );
        }
        let edit = self.composer.finish();
        if edit.is_empty() {
            return None;
        }
        let mut action = CodeAction::new(format!("Fix all: {fix_id}"), fix_id, edit)
            .with_kind(CodeActionKind::SourceFixAll);
        action.diagnostics = self.codes;
        Some(action)
    }
}

#[cfg(test)]
mod tests;
