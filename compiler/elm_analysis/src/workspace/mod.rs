//! The workspace: the one entry point of the analysis core.
//!
//! A [`Workspace`] is shared between request handlers. Every method takes
//! `&self`; edits replace files in the forest, and queries read a snapshot
//! through a [`Session`], filling the fact caches as they go.

mod session;

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use elm_diagnostic::{CodeAction, Diagnostic, FixId, WorkspaceEdit};
use elm_ir::{FileUri, Position, Span};
use elm_types::Ty;
use parking_lot::RwLock;

pub(crate) use session::Session;

use crate::binder::{ModuleInterface, ResolvedFile};
use crate::cache::FactCache;
use crate::cancel::CancellationToken;
use crate::code_actions::{self, FixRegistry};
use crate::config::AnalysisConfig;
use crate::diagnostics::{self, default_rules, ExternalDiagnostics, SuggestionRule};
use crate::forest::{Forest, Revision, Snapshot, SourceFile, SyntaxParser};
use crate::host::{FileChange, FileSystemHost};
use crate::infer::InferredDecl;
use crate::query::{self, Location};
use crate::{prelude, AnalysisError};

/// How often a request is recomputed when the forest changes under it.
const MAX_ATTEMPTS: u32 = 3;

pub struct Workspace {
    pub(crate) forest: Forest,
    config: RwLock<AnalysisConfig>,
    pub(crate) interfaces: FactCache<FileUri, ModuleInterface>,
    pub(crate) resolved: FactCache<FileUri, ResolvedFile>,
    pub(crate) decls: FactCache<(FileUri, String), InferredDecl>,
    external: DashMap<FileUri, ExternalDiagnostics>,
    rules: Vec<Box<dyn SuggestionRule>>,
    registry: FixRegistry,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// A workspace with the built-in parser and the library modules loaded.
    pub fn new() -> Self {
        Self::with_parser(Arc::new(elm_parse::ElmParser))
    }

    pub fn with_parser(parser: Arc<dyn SyntaxParser>) -> Self {
        let ws = Workspace {
            forest: Forest::new(parser),
            config: RwLock::new(AnalysisConfig::default()),
            interfaces: FactCache::new("interfaces"),
            resolved: FactCache::new("resolved"),
            decls: FactCache::new("decls"),
            external: DashMap::new(),
            rules: default_rules(),
            registry: FixRegistry::with_defaults(),
        };
        for (module, source) in prelude::MODULES {
            ws.forest.insert(&prelude::uri_for(module), source, true);
        }
        ws
    }

    #[must_use]
    pub fn with_config(self, config: AnalysisConfig) -> Self {
        *self.config.write() = config;
        self
    }

    // Files

    /// Read every workspace file the host lists. Returns how many were
    /// loaded.
    pub fn load(&self, host: &dyn FileSystemHost) -> Result<usize, AnalysisError> {
        let uris = host.list_workspace_files()?;
        for uri in &uris {
            let text = host.read_file(uri)?;
            self.update(uri, &text);
        }
        tracing::info!(files = uris.len(), "workspace loaded");
        Ok(uris.len())
    }

    /// Apply file system events, re-reading created and changed files.
    pub fn apply_changes(
        &self,
        host: &dyn FileSystemHost,
        changes: &[FileChange],
    ) -> Result<(), AnalysisError> {
        for change in changes {
            match change {
                FileChange::Created(uri) | FileChange::Changed(uri) => {
                    let text = host.read_file(uri)?;
                    self.update(uri, &text);
                }
                FileChange::Deleted(uri) => {
                    self.remove(uri);
                }
            }
        }
        Ok(())
    }

    /// Replace a file's text, creating the file if needed.
    pub fn update(&self, uri: &FileUri, text: &str) -> Revision {
        let file = self.forest.update(uri, text);
        self.external.remove(uri);
        self.forget(uri);
        file.revision
    }

    pub fn remove(&self, uri: &FileUri) -> bool {
        let removed = self.forest.remove(uri);
        if removed {
            self.external.remove(uri);
            self.forget(uri);
        }
        removed
    }

    /// Drop cache entries that depended on `uri`; they can never be valid
    /// again. Entries of unrelated files stay.
    fn forget(&self, uri: &FileUri) {
        self.interfaces.forget(uri);
        self.resolved.forget(uri);
        self.decls.forget(uri);
        tracing::trace!(
            uri = %uri,
            interfaces = self.interfaces.len(),
            resolved = self.resolved.len(),
            decls = self.decls.len(),
            "invalidated"
        );
    }

    pub fn file(&self, uri: &FileUri) -> Option<Arc<SourceFile>> {
        self.forest.get(uri)
    }

    /// Workspace files, library modules excluded, sorted by URI.
    pub fn files(&self) -> Vec<Arc<SourceFile>> {
        self.forest.snapshot().workspace_files()
    }

    pub fn revision(&self, uri: &FileUri) -> Option<Revision> {
        self.forest.snapshot().revision(uri)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.forest.snapshot()
    }

    // Configuration and extension points

    pub fn set_config(&self, config: AnalysisConfig) {
        tracing::debug!(?config, "configuration changed");
        *self.config.write() = config;
    }

    pub fn config(&self) -> AnalysisConfig {
        self.config.read().clone()
    }

    pub fn rules(&self) -> &[Box<dyn SuggestionRule>] {
        &self.rules
    }

    pub fn registry(&self) -> &FixRegistry {
        &self.registry
    }

    /// Attach an external linter's findings to the current revision of a
    /// file. They are dropped when the file changes.
    pub fn set_external_diagnostics(&self, uri: &FileUri, diagnostics: Vec<Diagnostic>) {
        let Some(revision) = self.revision(uri) else {
            tracing::debug!(uri = %uri, "external diagnostics for an unknown file");
            return;
        };
        self.external.insert(
            uri.clone(),
            ExternalDiagnostics {
                revision,
                diagnostics,
            },
        );
    }

    pub fn external_diagnostics(&self, uri: &FileUri, revision: Revision) -> Vec<Diagnostic> {
        self.external
            .get(uri)
            .filter(|e| e.revision == revision)
            .map(|e| e.diagnostics.clone())
            .unwrap_or_default()
    }

    // Facts

    /// Run `f` on a session. If the forest moved while it ran, the answer
    /// describes an outdated state: run again on the new one.
    fn with_session<R>(&self, f: impl Fn(&Session<'_>) -> R) -> R {
        let mut attempt = 1;
        loop {
            let session = Session::new(self);
            let result = f(&session);
            if attempt >= MAX_ATTEMPTS || Arc::ptr_eq(&session.state, &self.forest.snapshot()) {
                return result;
            }
            tracing::debug!(attempt, "forest changed during request; recomputing");
            attempt += 1;
        }
    }

    pub fn interface(&self, uri: &FileUri) -> Option<Arc<ModuleInterface>> {
        self.with_session(|s| s.interface(uri))
    }

    pub fn resolved(&self, uri: &FileUri) -> Option<Arc<ResolvedFile>> {
        self.with_session(|s| s.resolved(uri))
    }

    /// Type of a top-level value: its annotation, or its inferred type.
    pub fn decl_type(&self, uri: &FileUri, name: &str) -> Option<Ty> {
        self.with_session(|s| s.decl_type(uri, name))
    }

    pub fn inferred(&self, uri: &FileUri, name: &str) -> Option<Arc<InferredDecl>> {
        self.with_session(|s| s.inferred(uri, name))
    }

    /// Every top-level value of a file with its type, in source order.
    pub fn file_types(&self, uri: &FileUri) -> Vec<(String, Ty)> {
        self.with_session(|s| s.file_types(uri))
    }

    // Diagnostics

    pub fn syntactic_diagnostics(&self, uri: &FileUri) -> Vec<Diagnostic> {
        self.with_session(|s| diagnostics::syntactic(s, uri))
    }

    pub fn semantic_diagnostics(&self, uri: &FileUri) -> Vec<Diagnostic> {
        self.with_session(|s| diagnostics::semantic(s, uri))
    }

    pub fn suggestion_diagnostics(&self, uri: &FileUri) -> Vec<Diagnostic> {
        self.with_session(|s| diagnostics::suggestions(s, uri))
    }

    /// All three tiers of a file.
    pub fn diagnose(&self, uri: &FileUri) -> Vec<Diagnostic> {
        self.with_session(|s| diagnostics::diagnose(s, uri))
    }

    /// Diagnostics of every workspace file. The token is checked between
    /// files.
    pub fn workspace_diagnostics(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<FileUri, Vec<Diagnostic>>, AnalysisError> {
        let session = Session::new(self);
        let mut out = BTreeMap::new();
        for file in session.state.workspace_files() {
            if let Err(err) = cancel.check() {
                tracing::debug!(done = out.len(), "workspace diagnostics cancelled");
                return Err(err);
            }
            out.insert(file.uri.clone(), diagnostics::diagnose(&session, &file.uri));
        }
        Ok(out)
    }

    // Code actions

    /// Actions for `range`: fixes for the given diagnostics that overlap
    /// it, then the refactors that apply there.
    pub fn code_actions_for(
        &self,
        uri: &FileUri,
        range: Span,
        diagnostics: &[Diagnostic],
    ) -> Vec<CodeAction> {
        self.with_session(|s| code_actions::code_actions_for(s, uri, range, diagnostics))
    }

    /// One action applying `fix_id` everywhere it applies in a file.
    pub fn fix_all(&self, uri: &FileUri, fix_id: FixId) -> Option<CodeAction> {
        self.with_session(|s| code_actions::fix_all(s, uri, fix_id))
    }

    /// One action applying `fix_id` in every workspace file, edits merged
    /// per file.
    pub fn fix_all_in_workspace(
        &self,
        fix_id: FixId,
        cancel: &CancellationToken,
    ) -> Result<Option<CodeAction>, AnalysisError> {
        let session = Session::new(self);
        code_actions::fix_all_in_workspace(&session, fix_id, cancel)
    }

    // Navigation

    pub fn definitions_for(&self, uri: &FileUri, position: Position) -> Vec<Location> {
        self.with_session(|s| query::definitions_for(s, uri, position))
    }

    pub fn references_for(
        &self,
        uri: &FileUri,
        position: Position,
        include_declaration: bool,
    ) -> Vec<Location> {
        self.with_session(|s| query::references_for(s, uri, position, include_declaration))
    }

    pub fn rename(
        &self,
        uri: &FileUri,
        position: Position,
        new_name: &str,
        cancel: &CancellationToken,
    ) -> Result<WorkspaceEdit, AnalysisError> {
        self.with_session(|s| query::rename(s, uri, position, new_name, cancel))
    }
}
