//! Import fixes.

use std::collections::BTreeMap;

use elm_diagnostic::{CodeAction, Diagnostic, DiagnosticData, ErrorCode, FixId, TextEdit, WorkspaceEdit};
use elm_ir::ast::{ExposedItem, ExposedKind, Exposing, Import, ParsedModule};
use elm_ir::{Namespace, Span};

use super::edits::{remove_exposed, through_newline};
use super::{FixContext, FixProvider};

/// One way to bring a missing name into scope.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Candidate {
    module: String,
    /// What to add to the exposing list; `None` for qualified uses, which
    /// only need the import itself.
    item: Option<String>,
}

/// Modules that could provide the name an `E2004` reports.
fn candidates(ctx: &FixContext<'_>, data: &DiagnosticData) -> Vec<Candidate> {
    let DiagnosticData::UnknownName {
        name,
        qualifier,
        namespace,
    } = data
    else {
        return Vec::new();
    };
    if let Some(qualifier) = qualifier {
        let already = ctx.source.tree.imports.iter().any(|i| &i.module.name == qualifier);
        let provides = ctx
            .module_interface(qualifier)
            .is_some_and(|i| i.exposed(*namespace, name).is_some());
        return if provides && !already {
            vec![Candidate {
                module: qualifier.clone(),
                item: None,
            }]
        } else {
            Vec::new()
        };
    }
    ctx.other_modules()
        .iter()
        .filter_map(|interface| {
            let declared = interface.exposed(*namespace, name)?;
            let item = match namespace {
                Namespace::Constructor => format!("{}(..)", declared.parent.as_deref()?),
                Namespace::Value | Namespace::Type => name.clone(),
                Namespace::Operator => format!("({name})"),
                Namespace::ModuleAlias => return None,
            };
            Some(Candidate {
                module: interface.module.clone(),
                item: Some(item),
            })
        })
        .collect()
}

/// Edits importing `items` from `module`, extending an existing import of
/// it when there is one. New import lines go to `new_lines`. An opaque
/// type already exposed gains `(..)` when its constructors are wanted.
fn import_edits(
    tree: &ParsedModule,
    module: &str,
    items: &[String],
    new_lines: &mut Vec<String>,
) -> Vec<TextEdit> {
    let Some(import) = tree.imports.iter().find(|i| i.module.name == module) else {
        new_lines.push(if items.is_empty() {
            format!("import {module}")
        } else {
            format!("import {module} exposing ({})", items.join(", "))
        });
        return Vec::new();
    };
    if items.is_empty() {
        return Vec::new();
    }
    match &import.exposing {
        None => vec![TextEdit::insert(
            name_end(import),
            format!(" exposing ({})", items.join(", ")),
        )],
        Some(Exposing::Explicit { items: existing, .. }) => {
            let Some(last) = existing.last() else {
                return Vec::new();
            };
            let mut fresh: Vec<&str> = Vec::new();
            let mut opened: Vec<&ExposedItem> = Vec::new();
            for item in items {
                match existing.iter().find(|e| e.name == bare(item)) {
                    None => fresh.push(item.as_str()),
                    Some(present) => {
                        let opaque = matches!(present.kind, ExposedKind::Type { open: None });
                        if opaque && item.ends_with("(..)") && !opened.contains(&present) {
                            opened.push(present);
                        }
                    }
                }
            }
            let opens_last = opened.iter().any(|e| e.span == last.span);
            let mut edits: Vec<TextEdit> = opened
                .iter()
                .filter(|e| e.span != last.span)
                .map(|e| TextEdit::insert(e.span.end, "(..)"))
                .collect();
            let mut tail = String::new();
            if opens_last {
                tail.push_str("(..)");
            }
            if !fresh.is_empty() {
                tail.push_str(&format!(", {}", fresh.join(", ")));
            }
            if !tail.is_empty() {
                edits.push(TextEdit::insert(last.span.end, tail));
            }
            edits
        }
        Some(Exposing::All(_)) => Vec::new(),
    }
}

/// Exposed item text without `(..)` or operator parentheses.
fn bare(item: &str) -> &str {
    let item = item.strip_suffix("(..)").unwrap_or(item);
    item.strip_prefix('(')
        .and_then(|op| op.strip_suffix(')'))
        .unwrap_or(item)
}

/// End of `import M` or `import M as A`.
fn name_end(import: &Import) -> u32 {
    import.alias.as_ref().map_or(import.module.span.end, |a| a.span.end)
}

/// One insertion carrying every new import line.
fn new_imports_edit(tree: &ParsedModule, lines: &[String]) -> Option<TextEdit> {
    if lines.is_empty() {
        return None;
    }
    let block = lines.join("\n");
    let offset = tree.import_insertion_offset();
    let text = if !tree.imports.is_empty() {
        format!("\n{block}")
    } else if tree.header.is_some() {
        format!("\n\n{block}")
    } else {
        format!("{block}\n\n")
    };
    Some(TextEdit::insert(offset, text))
}

fn candidate_edit(tree: &ParsedModule, candidate: &Candidate) -> Vec<TextEdit> {
    let mut lines = Vec::new();
    let items: Vec<String> = candidate.item.iter().cloned().collect();
    let mut edits: Vec<TextEdit> = import_edits(tree, &candidate.module, &items, &mut lines)
        .into_iter()
        .collect();
    edits.extend(new_imports_edit(tree, &lines));
    edits
}

/// Import the module that provides an unknown name.
pub struct AddImport;

impl FixProvider for AddImport {
    fn id(&self) -> FixId {
        FixId::AddImport
    }

    fn actions(&self, ctx: &FixContext<'_>, diagnostic: Option<&Diagnostic>) -> Vec<CodeAction> {
        let Some(diagnostic) = diagnostic else {
            return Vec::new();
        };
        let tree = &ctx.source.tree;
        candidates(ctx, &diagnostic.data)
            .into_iter()
            .filter_map(|candidate| {
                let edits = candidate_edit(tree, &candidate);
                if edits.is_empty() {
                    return None;
                }
                let title = match &candidate.item {
                    Some(item) => format!("Import `{item}` from `{}`", candidate.module),
                    None => format!("Import `{}`", candidate.module),
                };
                Some(
                    CodeAction::new(title, self.id(), WorkspaceEdit::single(ctx.uri.clone(), edits))
                        .for_diagnostic(ErrorCode::E2004),
                )
            })
            .collect()
    }
}

/// Every import the file is missing, grouped per module.
pub struct AddAllMissingImports;

impl FixProvider for AddAllMissingImports {
    fn id(&self) -> FixId {
        FixId::AddAllMissingImports
    }

    fn actions(&self, ctx: &FixContext<'_>, diagnostic: Option<&Diagnostic>) -> Vec<CodeAction> {
        if diagnostic.is_none() {
            return Vec::new();
        }
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for d in ctx.diagnostics().iter().filter(|d| d.code == ErrorCode::E2004) {
            // First module wins, as in scope resolution.
            let Some(candidate) = candidates(ctx, &d.data).into_iter().next() else {
                continue;
            };
            let items = grouped.entry(candidate.module).or_default();
            if let Some(item) = candidate.item {
                if !items.contains(&item) {
                    items.push(item);
                }
            }
        }
        let tree = &ctx.source.tree;
        let mut lines = Vec::new();
        let mut edits: Vec<TextEdit> = grouped
            .iter()
            .flat_map(|(module, items)| import_edits(tree, module, items, &mut lines))
            .collect();
        edits.extend(new_imports_edit(tree, &lines));
        if edits.is_empty() {
            return Vec::new();
        }
        vec![CodeAction::new(
            "Add all missing imports",
            self.id(),
            WorkspaceEdit::single(ctx.uri.clone(), edits),
        )
        .for_diagnostic(ErrorCode::E2004)]
    }
}

/// Delete an import nothing uses.
pub struct RemoveUnusedImport;

impl FixProvider for RemoveUnusedImport {
    fn id(&self) -> FixId {
        FixId::RemoveUnusedImport
    }

    fn actions(&self, ctx: &FixContext<'_>, diagnostic: Option<&Diagnostic>) -> Vec<CodeAction> {
        let Some(diagnostic) = diagnostic else {
            return Vec::new();
        };
        let DiagnosticData::UnusedImport { module } = &diagnostic.data else {
            return Vec::new();
        };
        let Some(import) = ctx.source.tree.imports.iter().find(|i| i.span == diagnostic.span) else {
            return Vec::new();
        };
        let edit = TextEdit::delete(through_newline(ctx.text(), import.span));
        vec![CodeAction::new(
            format!("Remove unused import `{module}`"),
            self.id(),
            WorkspaceEdit::single(ctx.uri.clone(), vec![edit]),
        )
        .for_diagnostic(ErrorCode::W1001)
        .preferred()]
    }
}

/// Delete one unused item from an import's exposing list.
pub struct RemoveUnusedImportedName;

impl FixProvider for RemoveUnusedImportedName {
    fn id(&self) -> FixId {
        FixId::RemoveUnusedImportedName
    }

    fn actions(&self, ctx: &FixContext<'_>, diagnostic: Option<&Diagnostic>) -> Vec<CodeAction> {
        let Some(diagnostic) = diagnostic else {
            return Vec::new();
        };
        let DiagnosticData::UnusedImportedName { name, .. } = &diagnostic.data else {
            return Vec::new();
        };
        let Some((import, exposing)) = ctx.source.tree.imports.iter().find_map(|i| {
            i.exposing
                .as_ref()
                .filter(|e| e.span().contains_span(diagnostic.span))
                .map(|e| (i, e))
        }) else {
            return Vec::new();
        };
        let items = exposing.items();
        let Some(index) = items.iter().position(|item| item.span == diagnostic.span) else {
            return Vec::new();
        };
        let edit = remove_exposed(items, index).unwrap_or_else(|| {
            // The only item: drop the whole clause.
            TextEdit::delete(Span::new(name_end(import), exposing.span().end))
        });
        vec![CodeAction::new(
            format!("Remove unused `{name}`"),
            self.id(),
            WorkspaceEdit::single(ctx.uri.clone(), vec![edit]),
        )
        .for_diagnostic(ErrorCode::W1002)
        .preferred()]
    }
}
