//! Cross-file navigation: definitions, references and rename.
//!
//! Everything here reads the reference indexes the binder builds; nothing
//! re-resolves names.

use elm_diagnostic::{TextEdit, WorkspaceEdit};
use elm_ir::{FileUri, Namespace, Position, Span};
use serde::Serialize;

use crate::binder::{Definition, RefRole, ResolvedFile, Target};
use crate::cancel::CancellationToken;
use crate::workspace::Session;
use crate::AnalysisError;

/// A span in a file, with its line/column form.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    pub uri: FileUri,
    pub span: Span,
    pub start: Position,
    pub end: Position,
}

impl Location {
    fn new(session: &Session<'_>, uri: &FileUri, span: Span) -> Option<Self> {
        let file = session.file(uri)?;
        Some(Location {
            uri: uri.clone(),
            span,
            start: file.position(span.start),
            end: file.position(span.end),
        })
    }
}

/// What the cursor points at.
enum Symbol {
    Local { binding: Span },
    TopLevel(Definition),
}

fn symbol_at(resolved: &ResolvedFile, offset: u32) -> Option<Symbol> {
    if let Some(reference) = resolved.reference_at(offset) {
        return match &reference.target {
            Target::Local { span } => Some(Symbol::Local { binding: *span }),
            Target::TopLevel(def) => Some(Symbol::TopLevel(def.clone())),
            Target::Unresolved => None,
        };
    }
    if let Some(binding) = resolved.local_at(offset) {
        return Some(Symbol::Local { binding });
    }
    resolved
        .interface
        .declared_at(offset)
        .map(|declared| Symbol::TopLevel(Definition::new(&resolved.interface, declared)))
}

pub(crate) fn definitions_for(session: &Session<'_>, uri: &FileUri, position: Position) -> Vec<Location> {
    let Some(file) = session.file(uri) else {
        return Vec::new();
    };
    let Some(resolved) = session.resolved(uri) else {
        return Vec::new();
    };
    let offset = file.offset(position);

    // `import Foo` jumps to Foo's header.
    if let Some(import) = file.tree.imports.iter().find(|i| i.module.span.touches(offset)) {
        return session
            .state
            .module_file(&import.module.name)
            .and_then(|target| {
                let span = target
                    .tree
                    .header
                    .as_ref()
                    .map_or(Span::point(0), |h| h.name.span);
                Location::new(session, &target.uri, span)
            })
            .into_iter()
            .collect();
    }

    let location = match symbol_at(&resolved, offset) {
        Some(Symbol::Local { binding }) => Location::new(session, uri, binding),
        Some(Symbol::TopLevel(def)) => Location::new(session, &def.uri, def.span),
        None => None,
    };
    location.into_iter().collect()
}

pub(crate) fn references_for(
    session: &Session<'_>,
    uri: &FileUri,
    position: Position,
    include_declaration: bool,
) -> Vec<Location> {
    let Some(file) = session.file(uri) else {
        return Vec::new();
    };
    let Some(resolved) = session.resolved(uri) else {
        return Vec::new();
    };
    let spans = match symbol_at(&resolved, file.offset(position)) {
        Some(symbol) => occurrences(session, &resolved, &symbol, include_declaration, None),
        None => return Vec::new(),
    };
    let Ok(spans) = spans else {
        return Vec::new();
    };
    spans
        .into_iter()
        .filter_map(|(uri, span)| Location::new(session, &uri, span))
        .collect()
}

/// Every occurrence of `symbol`, sorted and deduplicated. Exposing-list
/// items and annotation names count as occurrences. `cancel` is checked
/// before each file.
fn occurrences(
    session: &Session<'_>,
    resolved: &ResolvedFile,
    symbol: &Symbol,
    include_declaration: bool,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<(FileUri, Span)>, AnalysisError> {
    let mut out = Vec::new();
    match symbol {
        Symbol::Local { binding } => {
            if include_declaration {
                out.push((resolved.uri.clone(), *binding));
            }
            out.extend(
                resolved
                    .references_to_local(*binding)
                    .map(|r| (resolved.uri.clone(), r.span)),
            );
        }
        Symbol::TopLevel(def) => {
            if include_declaration {
                out.push((def.uri.clone(), def.span));
            }
            for file in session.state.files() {
                if let Some(cancel) = cancel {
                    cancel.check()?;
                }
                let Some(other) = session.resolved(&file.uri) else {
                    continue;
                };
                out.extend(
                    other
                        .references_to(def)
                        .filter(|r| include_declaration || r.role == RefRole::Use)
                        .map(|r| (file.uri.clone(), r.span)),
                );
            }
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

const KEYWORDS: &[&str] = &[
    "if", "then", "else", "case", "of", "let", "in", "type", "alias", "module", "import",
    "exposing", "as", "port", "where", "infix",
];

fn is_identifier(name: &str, upper: bool) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let first_ok = if upper {
        first.is_uppercase()
    } else {
        first.is_lowercase()
    };
    first_ok && chars.all(|c| c.is_alphanumeric() || c == '_') && !KEYWORDS.contains(&name)
}

pub(crate) fn rename(
    session: &Session<'_>,
    uri: &FileUri,
    position: Position,
    new_name: &str,
    cancel: &CancellationToken,
) -> Result<WorkspaceEdit, AnalysisError> {
    let file = session
        .file(uri)
        .ok_or_else(|| AnalysisError::UnknownFile(uri.clone()))?;
    let resolved = session
        .resolved(uri)
        .ok_or_else(|| AnalysisError::UnknownFile(uri.clone()))?;
    let symbol = symbol_at(&resolved, file.offset(position)).ok_or(AnalysisError::NothingToRename)?;

    let upper = match &symbol {
        Symbol::Local { .. } => false,
        Symbol::TopLevel(def) => {
            if def.uri.is_virtual() {
                return Err(AnalysisError::LibraryDefinition {
                    name: def.name.clone(),
                });
            }
            match def.namespace {
                Namespace::Value => false,
                Namespace::Type | Namespace::Constructor => true,
                Namespace::Operator | Namespace::ModuleAlias => {
                    return Err(AnalysisError::NothingToRename)
                }
            }
        }
    };
    if !is_identifier(new_name, upper) {
        return Err(AnalysisError::InvalidName {
            new_name: new_name.to_string(),
            expected: if upper { "type or constructor" } else { "value" },
        });
    }

    let mut edit = WorkspaceEdit::new();
    for (target, span) in occurrences(session, &resolved, &symbol, true, Some(cancel))? {
        edit.push(&target, TextEdit::replace(span, new_name));
    }
    tracing::debug!(uri = %uri, new_name, files = edit.files().count(), "rename");
    Ok(edit)
}
