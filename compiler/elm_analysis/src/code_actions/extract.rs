//! Extraction refactors.
//!
//! An expression is extractable when the trimmed request range covers it
//! exactly. Its parameters are the locals it uses that are bound outside
//! the range, in order of first use; types come from the enclosing
//! declaration's inference run.

use elm_diagnostic::{CodeAction, Diagnostic, FixId, TextEdit, WorkspaceEdit};
use elm_ir::ast::{Expr, ExprKind, TypeExprKind, ValueDecl};
use elm_ir::{Namespace, Span};
use elm_types::Ty;

use super::edits::{column, fresh_name, reindent, trim};
use super::locate::{expr_at, type_at};
use super::{FixContext, FixProvider};
use crate::binder::Target;

struct FreeLocal {
    name: String,
    binding: Span,
}

struct Selection<'a> {
    decl: &'a ValueDecl,
    expr: &'a Expr,
    parent: Option<&'a Expr>,
    free: Vec<FreeLocal>,
}

fn select<'a>(ctx: &'a FixContext<'_>) -> Option<Selection<'a>> {
    let range = trim(ctx.text(), ctx.range);
    if range.is_empty() {
        return None;
    }
    let (decl, path) = expr_at(&ctx.source.tree, range)?;
    let expr = *path.last()?;
    if matches!(expr.kind, ExprKind::Error) {
        return None;
    }
    let parent = path.len().checked_sub(2).and_then(|i| path.get(i)).copied();

    let mut free: Vec<FreeLocal> = Vec::new();
    for reference in &ctx.resolved.references {
        if !range.contains_span(reference.full_span) {
            continue;
        }
        let Target::Local { span: binding } = reference.target else {
            continue;
        };
        if range.contains_span(binding) || free.iter().any(|f| f.binding == binding) {
            continue;
        }
        free.push(FreeLocal {
            name: reference.span.slice(ctx.text()).to_string(),
            binding,
        });
    }
    Some(Selection {
        decl,
        expr,
        parent,
        free,
    })
}

impl Selection<'_> {
    /// `name a b`, parenthesized where an application would regroup.
    fn call(&self, name: &str, free: &[&FreeLocal]) -> String {
        if free.is_empty() {
            return name.to_string();
        }
        let call = std::iter::once(name)
            .chain(free.iter().map(|f| f.name.as_str()))
            .collect::<Vec<_>>()
            .join(" ");
        let needs_parens = self.parent.is_some_and(|p| {
            matches!(
                p.kind,
                ExprKind::Call { .. } | ExprKind::Access { .. } | ExprKind::Negate(_)
            )
        });
        if needs_parens {
            format!("({call})")
        } else {
            call
        }
    }

    /// `t1 -> t2 -> result` when every piece was inferred without errors.
    fn signature(&self, ctx: &FixContext<'_>, free: &[&FreeLocal]) -> Option<Ty> {
        let inferred = ctx.inferred(&self.decl.name.name)?;
        let params = free
            .iter()
            .map(|f| inferred.binding_types.get(&f.binding).cloned())
            .collect::<Option<Vec<Ty>>>()?;
        let result = inferred.expr_types.get(&self.expr.span)?.clone();
        let ty = Ty::function(params, result);
        (!ty.contains_error()).then_some(ty)
    }

    fn body(&self, ctx: &FixContext<'_>, indent: &str) -> String {
        reindent(
            self.expr.span.slice(ctx.text()),
            column(ctx.text(), self.expr.span.start),
            indent,
        )
    }
}

fn value_name_taken(ctx: &FixContext<'_>, name: &str) -> bool {
    ctx.resolved.interface.definition(Namespace::Value, name).is_some()
        || ctx.resolved.scope.lookup(Namespace::Value, name).is_some()
        || ctx
            .resolved
            .locals
            .iter()
            .any(|span| span.slice(ctx.text()) == name)
}

fn params_text(free: &[&FreeLocal]) -> String {
    free.iter().map(|f| format!(" {}", f.name)).collect()
}

/// Move an expression into a new top-level function.
pub struct ExtractFunction;

impl FixProvider for ExtractFunction {
    fn id(&self) -> FixId {
        FixId::ExtractFunction
    }

    fn actions(&self, ctx: &FixContext<'_>, _: Option<&Diagnostic>) -> Vec<CodeAction> {
        let Some(selection) = select(ctx) else {
            return Vec::new();
        };
        let name = fresh_name("newFunction", |n| value_name_taken(ctx, n));
        let free: Vec<&FreeLocal> = selection.free.iter().collect();
        let annotation = selection
            .signature(ctx, &free)
            .map(|ty| format!("{name} : {ty}\n"))
            .unwrap_or_default();
        let function = format!(
            "\n\n\n{annotation}{name}{} =\n    {}",
            params_text(&free),
            selection.body(ctx, "    ")
        );
        let edits = vec![
            TextEdit::replace(selection.expr.span, selection.call(&name, &free)),
            TextEdit::insert(selection.decl.full_span().end, function),
        ];
        vec![CodeAction::new(
            "Extract function",
            self.id(),
            WorkspaceEdit::single(ctx.uri.clone(), edits),
        )]
    }
}

/// Move an expression into a `let` binding of the enclosing declaration.
pub struct ExtractLocalFunction;

impl FixProvider for ExtractLocalFunction {
    fn id(&self) -> FixId {
        FixId::ExtractLocalFunction
    }

    fn actions(&self, ctx: &FixContext<'_>, _: Option<&Diagnostic>) -> Vec<CodeAction> {
        let Some(selection) = select(ctx) else {
            return Vec::new();
        };
        let decl = selection.decl;
        // Parameters of the declaration stay visible inside the `let`.
        let free: Vec<&FreeLocal> = selection
            .free
            .iter()
            .filter(|f| !decl.params.iter().any(|p| p.span.contains_span(f.binding)))
            .collect();
        let name = fresh_name("newFunction", |n| value_name_taken(ctx, n));

        let body_start = decl.body.span.start;
        let indent = " ".repeat(column(ctx.text(), body_start));
        let annotation = selection
            .signature(ctx, &free)
            .filter(|ty| ty.vars().is_empty())
            .map(|ty| format!("{indent}    {name} : {ty}\n"))
            .unwrap_or_default();
        let binding = format!(
            "let\n{annotation}{indent}    {name}{} =\n{indent}        {}\n{indent}in\n{indent}",
            params_text(&free),
            selection.body(ctx, &format!("{indent}        ")),
        );
        let call = selection.call(&name, &free);
        let edits = if selection.expr.span.start == body_start {
            vec![TextEdit::replace(selection.expr.span, format!("{binding}{call}"))]
        } else {
            vec![
                TextEdit::insert(body_start, binding),
                TextEdit::replace(selection.expr.span, call),
            ]
        };
        vec![CodeAction::new(
            "Extract local function",
            self.id(),
            WorkspaceEdit::single(ctx.uri.clone(), edits),
        )]
    }
}

/// Name a type expression with a new alias above its declaration.
pub struct ExtractTypeAlias;

impl FixProvider for ExtractTypeAlias {
    fn id(&self) -> FixId {
        FixId::ExtractTypeAlias
    }

    fn actions(&self, ctx: &FixContext<'_>, _: Option<&Diagnostic>) -> Vec<CodeAction> {
        let range = trim(ctx.text(), ctx.range);
        if range.is_empty() {
            return Vec::new();
        }
        let Some((decl, ty)) = type_at(&ctx.source.tree, range) else {
            return Vec::new();
        };
        if matches!(
            ty.kind,
            TypeExprKind::Var(_) | TypeExprKind::Unit | TypeExprKind::Error
        ) {
            return Vec::new();
        }
        let name = fresh_name("NewType", |n| {
            ctx.resolved.interface.definition(Namespace::Type, n).is_some()
                || ctx.resolved.scope.lookup(Namespace::Type, n).is_some()
        });
        let vars = ty.type_vars();
        let head = std::iter::once(name.as_str())
            .chain(vars.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        let text = reindent(range.slice(ctx.text()), column(ctx.text(), range.start), "    ");
        let alias = format!("type alias {head} =\n    {text}\n\n\n");
        let usage = if vars.is_empty() {
            head
        } else {
            format!("({head})")
        };
        let edits = vec![
            TextEdit::insert(decl.full_span().start, alias),
            TextEdit::replace(range, usage),
        ];
        vec![CodeAction::new(
            "Extract type alias",
            self.id(),
            WorkspaceEdit::single(ctx.uri.clone(), edits),
        )]
    }
}
