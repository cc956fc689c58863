//! Adding names to, and removing them from, exposing lists.

use elm_diagnostic::{CodeAction, Diagnostic, DiagnosticData, ErrorCode, FixId, TextEdit, WorkspaceEdit};
use elm_ir::ast::{Decl, ExposedKind, Exposing};
use elm_ir::Namespace;

use super::edits::{append_exposed, remove_exposed};
use super::{FixContext, FixProvider};

/// Toggle whether the top-level declaration under the cursor is exposed.
pub struct ExposeName;

impl FixProvider for ExposeName {
    fn id(&self) -> FixId {
        FixId::ExposeName
    }

    fn actions(&self, ctx: &FixContext<'_>, _: Option<&Diagnostic>) -> Vec<CodeAction> {
        let tree = &ctx.source.tree;
        let Some(header) = &tree.header else {
            return Vec::new();
        };
        // Everything is exposed already.
        let Exposing::Explicit { items, .. } = &header.exposing else {
            return Vec::new();
        };
        let Some((name, is_type)) = tree.decls.iter().find_map(|decl| match decl {
            Decl::Value(v) if v.name.span.touches(ctx.range.start) => Some((&v.name.name, false)),
            Decl::Union(u) if u.name.span.touches(ctx.range.start) => Some((&u.name.name, true)),
            Decl::Alias(a) if a.name.span.touches(ctx.range.start) => Some((&a.name.name, true)),
            _ => None,
        }) else {
            return Vec::new();
        };

        let position = items.iter().position(|item| {
            &item.name == name && matches!(item.kind, ExposedKind::Type { .. }) == is_type
        });
        let (title, edit) = match position {
            Some(index) => {
                let Some(edit) = remove_exposed(items, index) else {
                    return Vec::new();
                };
                (format!("Stop exposing `{name}`"), edit)
            }
            None => {
                let Some(edit) = append_exposed(&header.exposing, name) else {
                    return Vec::new();
                };
                (format!("Expose `{name}`"), edit)
            }
        };
        vec![CodeAction::new(
            title,
            self.id(),
            WorkspaceEdit::single(ctx.uri.clone(), vec![edit]),
        )]
    }
}

/// Expose a name from the module an import or qualified reference asked
/// for it. The edit lands in the other module's file.
pub struct ExposeFromModule;

impl FixProvider for ExposeFromModule {
    fn id(&self) -> FixId {
        FixId::ExposeFromModule
    }

    fn actions(&self, ctx: &FixContext<'_>, diagnostic: Option<&Diagnostic>) -> Vec<CodeAction> {
        let Some(DiagnosticData::NameNotExposed {
            module,
            name,
            namespace,
        }) = diagnostic.map(|d| &d.data)
        else {
            return Vec::new();
        };
        let Some(target) = ctx.module_file(module).filter(|f| !f.is_virtual) else {
            return Vec::new();
        };
        let Some(header) = &target.tree.header else {
            return Vec::new();
        };
        let exposing = &header.exposing;
        if exposing.is_all() {
            return Vec::new();
        }

        let edit = match namespace {
            Namespace::Constructor => {
                let Some(parent) = ctx
                    .module_interface(module)
                    .and_then(|i| i.definition(Namespace::Constructor, name).and_then(|d| d.parent.clone()))
                else {
                    return Vec::new();
                };
                let existing = exposing
                    .items()
                    .iter()
                    .find(|item| item.name == parent && matches!(item.kind, ExposedKind::Type { .. }));
                match existing.map(|item| (item, item.kind)) {
                    Some((item, ExposedKind::Type { open: None })) => {
                        TextEdit::insert(item.span.end, "(..)")
                    }
                    Some(_) => return Vec::new(),
                    None => match append_exposed(exposing, &format!("{parent}(..)")) {
                        Some(edit) => edit,
                        None => return Vec::new(),
                    },
                }
            }
            Namespace::Operator => match append_exposed(exposing, &format!("({name})")) {
                Some(edit) => edit,
                None => return Vec::new(),
            },
            Namespace::Value | Namespace::Type => match append_exposed(exposing, name) {
                Some(edit) => edit,
                None => return Vec::new(),
            },
            Namespace::ModuleAlias => return Vec::new(),
        };
        vec![CodeAction::new(
            format!("Expose `{name}` from `{module}`"),
            self.id(),
            WorkspaceEdit::single(target.uri.clone(), vec![edit]),
        )
        .for_diagnostic(ErrorCode::E2002)
        .preferred()]
    }
}
