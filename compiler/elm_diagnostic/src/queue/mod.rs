//! Diagnostic queue for collecting, deduplicating, and sorting diagnostics.
//!
//! Two diagnostics with the same primary span and the same code are the
//! same finding, whichever stage produced them first. The queue keeps the
//! first and drops later ones.

use rustc_hash::FxHashSet;

use elm_ir::Span;

use crate::{Diagnostic, ErrorCode};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of diagnostics kept (0 = unlimited).
    pub limit: usize,
    /// Drop diagnostics whose (span, code) was already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            limit: 0,
            deduplicate: true,
        }
    }
}

/// Queue for collecting, deduplicating, and sorting diagnostics.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<(Span, ErrorCode)>,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            seen: FxHashSet::default(),
            config,
        }
    }

    /// Add a diagnostic. Returns `false` if it was filtered.
    pub fn push(&mut self, diag: Diagnostic) -> bool {
        if self.config.limit > 0 && self.diagnostics.len() >= self.config.limit {
            return false;
        }
        if self.config.deduplicate && !self.seen.insert((diag.span, diag.code)) {
            return false;
        }
        self.diagnostics.push(diag);
        true
    }

    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.push(diag);
        }
    }

    /// Whether a finding with this (span, code) was already queued.
    pub fn contains(&self, span: Span, code: ErrorCode) -> bool {
        self.seen.contains(&(span, code))
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take the queued diagnostics sorted by position, then code.
    ///
    /// The sort is stable: diagnostics at the same place with the same code
    /// keep insertion order.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut out = std::mem::take(&mut self.diagnostics);
        self.seen.clear();
        sort_diagnostics(&mut out);
        out
    }
}

/// Sort diagnostics by (start, end, code).
pub fn sort_diagnostics(diags: &mut [Diagnostic]) {
    diags.sort_by_key(|d| (d.span.start, d.span.end, d.code));
}
