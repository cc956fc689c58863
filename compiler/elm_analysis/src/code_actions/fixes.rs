//! Quick fixes driven by one diagnostic each.

use elm_diagnostic::{
    CodeAction, Diagnostic, DiagnosticData, ErrorCode, FixId, TextEdit, WorkspaceEdit,
};
use elm_ir::ast::{Decl, ExprKind};
use elm_ir::Namespace;
use elm_types::{names, Ty};

use super::edits::column;
use super::locate::expr_at;
use super::{FixContext, FixProvider};

/// Append a `Debug.todo` branch for every pattern a `case` misses.
pub struct AddMissingCaseBranches;

impl FixProvider for AddMissingCaseBranches {
    fn id(&self) -> FixId {
        FixId::AddMissingCaseBranches
    }

    fn actions(&self, ctx: &FixContext<'_>, diagnostic: Option<&Diagnostic>) -> Vec<CodeAction> {
        let Some(diagnostic) = diagnostic else {
            return Vec::new();
        };
        let DiagnosticData::MissingCaseBranches { missing } = &diagnostic.data else {
            return Vec::new();
        };
        let Some((_, path)) = expr_at(&ctx.source.tree, diagnostic.span) else {
            return Vec::new();
        };
        let Some(ExprKind::Case { branches, .. }) = path.last().map(|e| &e.kind) else {
            return Vec::new();
        };
        let (Some(first), Some(last)) = (branches.first(), branches.last()) else {
            return Vec::new();
        };
        let indent = " ".repeat(column(ctx.text(), first.pattern.span.start));
        let mut text = String::new();
        for pattern in missing {
            text.push_str(&format!(
                "\n\n{indent}{pattern} ->\n{indent}    Debug.todo \"branch '{pattern}' not implemented\""
            ));
        }
        let title = if missing.len() == 1 {
            "Add missing case branch".to_string()
        } else {
            format!("Add {} missing case branches", missing.len())
        };
        vec![CodeAction::new(
            title,
            self.id(),
            WorkspaceEdit::single(ctx.uri.clone(), vec![TextEdit::insert(last.span.end, text)]),
        )
        .for_diagnostic(ErrorCode::E3003)
        .preferred()]
    }
}

/// Turn an unknown constructor into a new variant of the union type the
/// surrounding code expects, with payload types taken from its arguments.
pub struct AddMissingVariant;

impl FixProvider for AddMissingVariant {
    fn id(&self) -> FixId {
        FixId::AddMissingVariant
    }

    fn actions(&self, ctx: &FixContext<'_>, diagnostic: Option<&Diagnostic>) -> Vec<CodeAction> {
        let Some(diagnostic) = diagnostic else {
            return Vec::new();
        };
        let DiagnosticData::UnknownName {
            name,
            qualifier: None,
            namespace: Namespace::Constructor,
        } = &diagnostic.data
        else {
            return Vec::new();
        };
        let span = diagnostic.span;
        let Some((decl, path)) = expr_at(&ctx.source.tree, span) else {
            return Vec::new();
        };
        let Some(inferred) = ctx.inferred(&decl.name.name) else {
            return Vec::new();
        };

        // `Ctor a b` is checked as a call; a bare `Ctor` on its own.
        let call = path.iter().rev().nth(1).and_then(|parent| match &parent.kind {
            ExprKind::Call { func, args } if func.span == span => Some((parent.span, args)),
            _ => None,
        });
        let expected = match call {
            Some((call_span, _)) => inferred.expected_types.get(&call_span),
            None => inferred.expected_types.get(&span),
        };
        let Some(Ty::App { name: union, .. }) = expected else {
            return Vec::new();
        };
        let mut payload = Vec::new();
        for arg in call.map_or(&[][..], |(_, args)| args.as_slice()) {
            match inferred.expr_types.get(&arg.span) {
                Some(ty) if ty.vars().is_empty() && !ty.contains_error() => payload.push(atomic(ty)),
                _ => return Vec::new(),
            }
        }

        let (module, type_name) = names::split(union);
        let Some(target) = ctx.module_file(module).filter(|f| !f.is_virtual) else {
            return Vec::new();
        };
        let Some(last) = target.tree.decls.iter().find_map(|d| match d {
            Decl::Union(u) if u.name.name == type_name => u.variants.last(),
            _ => None,
        }) else {
            return Vec::new();
        };
        let mut variant = name.clone();
        for ty in &payload {
            variant.push(' ');
            variant.push_str(ty);
        }
        vec![CodeAction::new(
            format!("Add `{variant}` to `{type_name}`"),
            self.id(),
            WorkspaceEdit::single(
                target.uri.clone(),
                vec![TextEdit::insert(last.span.end, format!("\n    | {variant}"))],
            ),
        )
        .for_diagnostic(ErrorCode::E2004)]
    }
}

/// A type as it must be written in argument position.
fn atomic(ty: &Ty) -> String {
    match ty {
        Ty::Function(..) => format!("({ty})"),
        Ty::App { args, .. } if !args.is_empty() => format!("({ty})"),
        _ => ty.to_string(),
    }
}

/// Insert the inferred signature above an unannotated top-level value.
pub struct AddTypeAnnotation;

impl FixProvider for AddTypeAnnotation {
    fn id(&self) -> FixId {
        FixId::AddTypeAnnotation
    }

    fn actions(&self, ctx: &FixContext<'_>, diagnostic: Option<&Diagnostic>) -> Vec<CodeAction> {
        let Some(DiagnosticData::MissingTypeAnnotation { name, inferred }) =
            diagnostic.map(|d| &d.data)
        else {
            return Vec::new();
        };
        let Some(decl) = ctx
            .source
            .tree
            .value_decl(name)
            .filter(|d| d.annotation.is_none())
        else {
            return Vec::new();
        };
        let edit = TextEdit::insert(decl.span.start, format!("{name} : {inferred}\n"));
        vec![CodeAction::new(
            format!("Add type annotation `{name} : {inferred}`"),
            self.id(),
            WorkspaceEdit::single(ctx.uri.clone(), vec![edit]),
        )
        .for_diagnostic(ErrorCode::W1004)
        .preferred()]
    }
}

/// Relay the literal replacements an external linter proposed.
pub struct ApplyExternalFix;

impl FixProvider for ApplyExternalFix {
    fn id(&self) -> FixId {
        FixId::ApplyExternalFix
    }

    fn actions(&self, ctx: &FixContext<'_>, diagnostic: Option<&Diagnostic>) -> Vec<CodeAction> {
        let Some(DiagnosticData::ExternalLint { rule, fixes }) = diagnostic.map(|d| &d.data) else {
            return Vec::new();
        };
        if fixes.is_empty() || fixes.iter().any(|f| f.span.end > ctx.source.len()) {
            return Vec::new();
        }
        let edits = fixes
            .iter()
            .map(|f| TextEdit::replace(f.span, f.replacement.clone()))
            .collect();
        vec![CodeAction::new(
            format!("Apply fix for `{rule}`"),
            self.id(),
            WorkspaceEdit::single(ctx.uri.clone(), edits),
        )
        .for_diagnostic(ErrorCode::L0001)]
    }
}
