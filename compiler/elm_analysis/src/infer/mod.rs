//! Type inference.
//!
//! Every top-level declaration is inferred on its own, in a fresh
//! [`Pool`](elm_types::Pool), and exported as [`Ty`]. Facts about other
//! declarations (annotations, inferred types, constructors, infix tables)
//! come through a [`TypeOracle`], which the workspace implements on top of
//! its caches and which breaks recursion cycles.

pub mod annotation;
mod exhaustive;
mod expr;
pub mod operators;

use std::sync::Arc;

use elm_diagnostic::Diagnostic;
use elm_ir::{FileUri, Span};
use elm_types::Ty;
use rustc_hash::FxHashMap;

use crate::binder::{Definition, ResolvedFile};
use crate::forest::SourceFile;

pub use exhaustive::missing_patterns;
pub use expr::infer_decl;

/// What inference needs to know about the rest of the workspace.
pub trait TypeOracle {
    fn source(&self, uri: &FileUri) -> Option<Arc<SourceFile>>;

    fn resolved(&self, uri: &FileUri) -> Option<Arc<ResolvedFile>>;

    fn module_uri(&self, module: &str) -> Option<FileUri>;

    /// Type of a top-level value: its annotation, or its inferred type.
    /// `None` while that declaration is itself being inferred.
    fn value_type(&self, def: &Definition) -> Option<Ty>;
}

/// Inference result for one top-level declaration.
#[derive(Clone, Debug)]
pub struct InferredDecl {
    pub name: String,
    /// The annotation when there is one, the inferred type otherwise.
    pub ty: Ty,
    pub annotated: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Type of every expression, by span.
    pub expr_types: FxHashMap<Span, Ty>,
    /// Type of every local binding, by binding site.
    pub binding_types: FxHashMap<Span, Ty>,
    /// Type each checked expression or pattern was expected to have.
    pub expected_types: FxHashMap<Span, Ty>,
}

#[cfg(test)]
mod tests;
