//! Suggestion rules.

use elm_diagnostic::{Diagnostic, DiagnosticData, ErrorCode};
use elm_ir::ast::{Decl, ExposedKind};
use elm_ir::Namespace;
use elm_types::Ty;

use crate::binder::{RefRole, Reference, ResolvedFile};
use crate::config::SuggestionConfig;
use crate::forest::SourceFile;
use crate::infer::TypeOracle;

/// What a rule may look at.
pub struct RuleContext<'a> {
    pub source: &'a SourceFile,
    pub resolved: &'a ResolvedFile,
    oracle: &'a dyn TypeOracle,
}

impl<'a> RuleContext<'a> {
    pub fn new(source: &'a SourceFile, resolved: &'a ResolvedFile, oracle: &'a dyn TypeOracle) -> Self {
        RuleContext {
            source,
            resolved,
            oracle,
        }
    }

    /// Type of a top-level value of this file.
    pub fn value_type(&self, name: &str) -> Option<Ty> {
        let def = self.resolved.definition_of(Namespace::Value, name)?;
        self.oracle.value_type(&def)
    }

    /// Occurrences that count as uses: not exposing-list entries.
    fn uses(&self) -> impl Iterator<Item = &'a Reference> {
        self.resolved
            .references
            .iter()
            .filter(|r| r.role != RefRole::Exposing)
    }
}

/// A check producing suggestion-tier diagnostics.
pub trait SuggestionRule: Send + Sync {
    fn code(&self) -> ErrorCode;

    fn enabled(&self, config: &SuggestionConfig) -> bool;

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic>;
}

/// The built-in rules.
pub fn default_rules() -> Vec<Box<dyn SuggestionRule>> {
    vec![
        Box::new(UnusedImport),
        Box::new(UnusedImportedName),
        Box::new(UnusedTopLevel),
        Box::new(MissingTypeAnnotation),
    ]
}

/// Whether anything was reached through the import at `index`.
fn import_used(ctx: &RuleContext<'_>, index: usize) -> bool {
    ctx.uses().any(|r| r.import == Some(index))
}

pub struct UnusedImport;

impl SuggestionRule for UnusedImport {
    fn code(&self) -> ErrorCode {
        ErrorCode::W1001
    }

    fn enabled(&self, config: &SuggestionConfig) -> bool {
        config.unused_imports
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (index, import) in ctx.source.tree.imports.iter().enumerate() {
            let found = ctx.resolved.imports.get(index).is_some_and(|i| i.found);
            if !found || import_used(ctx, index) {
                continue;
            }
            out.push(
                Diagnostic::warning(ErrorCode::W1001)
                    .with_message(format!("module `{}` is imported but never used", import.module.name))
                    .with_label(import.span, "unused import")
                    .with_data(DiagnosticData::UnusedImport {
                        module: import.module.name.clone(),
                    }),
            );
        }
        out
    }
}

pub struct UnusedImportedName;

impl SuggestionRule for UnusedImportedName {
    fn code(&self) -> ErrorCode {
        ErrorCode::W1002
    }

    fn enabled(&self, config: &SuggestionConfig) -> bool {
        config.unused_imported_names
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (index, import) in ctx.source.tree.imports.iter().enumerate() {
            let Some(exposing) = &import.exposing else {
                continue;
            };
            // A wholly unused import is reported once, as such.
            if !import_used(ctx, index) {
                continue;
            }
            for item in exposing.items() {
                let used = ctx
                    .uses()
                    .filter(|r| r.import == Some(index) && !r.qualified)
                    .filter_map(Reference::definition)
                    .any(|def| {
                        def.name == item.name
                            || (matches!(item.kind, ExposedKind::Type { open: Some(_) })
                                && def.parent.as_deref() == Some(item.name.as_str()))
                    });
                if used {
                    continue;
                }
                out.push(
                    Diagnostic::warning(ErrorCode::W1002)
                        .with_message(format!(
                            "`{}` is imported from `{}` but never used",
                            item.name, import.module.name
                        ))
                        .with_label(item.span, "unused imported name")
                        .with_data(DiagnosticData::UnusedImportedName {
                            module: import.module.name.clone(),
                            name: item.name.clone(),
                        }),
                );
            }
        }
        out
    }
}

pub struct UnusedTopLevel;

impl SuggestionRule for UnusedTopLevel {
    fn code(&self) -> ErrorCode {
        ErrorCode::W1003
    }

    fn enabled(&self, config: &SuggestionConfig) -> bool {
        config.unused_top_level
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let interface = &ctx.resolved.interface;
        let mut out = Vec::new();
        for decl in &ctx.source.tree.decls {
            let Decl::Value(value) = decl else {
                continue;
            };
            let name = &value.name.name;
            let exposed = interface.exposed(Namespace::Value, name).is_some();
            if exposed || name == "main" {
                continue;
            }
            let Some(def) = ctx.resolved.definition_of(Namespace::Value, name) else {
                continue;
            };
            let own_span = value.full_span();
            let used = ctx
                .resolved
                .references_to(&def)
                .any(|r| r.role == RefRole::Use && !own_span.contains_span(r.full_span));
            if used {
                continue;
            }
            out.push(
                Diagnostic::warning(ErrorCode::W1003)
                    .with_message(format!("`{name}` is never used"))
                    .with_label(value.name.span, "unused definition")
                    .with_data(DiagnosticData::UnusedTopLevel { name: name.clone() }),
            );
        }
        out
    }
}

pub struct MissingTypeAnnotation;

impl SuggestionRule for MissingTypeAnnotation {
    fn code(&self) -> ErrorCode {
        ErrorCode::W1004
    }

    fn enabled(&self, config: &SuggestionConfig) -> bool {
        config.missing_type_annotation
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        ctx.source
            .tree
            .value_decls()
            .filter(|value| value.annotation.is_none())
            .filter_map(|value| {
                let ty = ctx.value_type(&value.name.name)?;
                if ty.contains_error() {
                    return None;
                }
                let name = value.name.name.clone();
                let inferred = ty.to_string();
                Some(
                    Diagnostic::hint(ErrorCode::W1004)
                        .with_message(format!("`{name}` has no type annotation; inferred `{inferred}`"))
                        .with_label(value.name.span, "missing type annotation")
                        .with_data(DiagnosticData::MissingTypeAnnotation { name, inferred }),
                )
            })
            .collect()
    }
}
