//! Finding the syntax a request points at.

use elm_ir::ast::{Decl, Expr, ParsedModule, TypeExpr, TypeExprKind, ValueDecl};
use elm_ir::Span;

/// The first expression satisfying `pred`, with its enclosing top-level
/// value and the path from that value's body down to it (inclusive).
pub(super) fn find_expr<'a>(
    tree: &'a ParsedModule,
    pred: &dyn Fn(&Expr) -> bool,
) -> Option<(&'a ValueDecl, Vec<&'a Expr>)> {
    tree.value_decls().find_map(|decl| {
        let mut path = Vec::new();
        search(&decl.body, pred, &mut path).then_some((decl, path))
    })
}

fn search<'a>(expr: &'a Expr, pred: &dyn Fn(&Expr) -> bool, path: &mut Vec<&'a Expr>) -> bool {
    elm_ir::ensure_sufficient_stack(|| {
        path.push(expr);
        if pred(expr) {
            return true;
        }
        let mut found = false;
        expr.for_each_child(&mut |child| {
            if !found {
                found = search(child, pred, path);
            }
        });
        if !found {
            path.pop();
        }
        found
    })
}

/// The expression written at exactly `span`.
pub(super) fn expr_at(tree: &ParsedModule, span: Span) -> Option<(&ValueDecl, Vec<&Expr>)> {
    find_expr(tree, &|e| e.span == span)
}

/// The type expression written at exactly `span`, in an annotation, an
/// alias body or a variant argument, with its declaration.
pub(super) fn type_at(tree: &ParsedModule, span: Span) -> Option<(&Decl, &TypeExpr)> {
    tree.decls.iter().find_map(|decl| {
        let found = match decl {
            Decl::Value(v) => v.annotation.as_ref().and_then(|a| find_type(&a.ty, span)),
            Decl::Alias(a) => find_type(&a.ty, span),
            Decl::Union(u) => u
                .variants
                .iter()
                .flat_map(|v| &v.args)
                .find_map(|arg| find_type(arg, span)),
            Decl::Infix(_) | Decl::Error(_) => None,
        };
        found.map(|ty| (decl, ty))
    })
}

fn find_type(ty: &TypeExpr, span: Span) -> Option<&TypeExpr> {
    if ty.span == span {
        return Some(ty);
    }
    if !ty.span.contains_span(span) {
        return None;
    }
    match &ty.kind {
        TypeExprKind::Named { args, .. } | TypeExprKind::Tuple(args) => {
            args.iter().find_map(|t| find_type(t, span))
        }
        TypeExprKind::Function { from, to } => find_type(from, span).or_else(|| find_type(to, span)),
        TypeExprKind::Record { fields, .. } => fields.iter().find_map(|f| find_type(&f.ty, span)),
        TypeExprKind::Var(_) | TypeExprKind::Unit | TypeExprKind::Error => None,
    }
}
