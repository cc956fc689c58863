use super::{Ident, QualName};
use crate::Span;

/// A type as written in an annotation or declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeExprKind {
    Var(String),
    Named {
        name: QualName,
        args: Vec<TypeExpr>,
    },
    Function {
        from: Box<TypeExpr>,
        to: Box<TypeExpr>,
    },
    /// `{ a | x : Int }` when `extension` is set, else `{ x : Int }`.
    Record {
        extension: Option<Ident>,
        fields: Vec<RecordFieldType>,
    },
    Tuple(Vec<TypeExpr>),
    Unit,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordFieldType {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        TypeExpr { kind, span }
    }

    /// Type variables in order of first appearance.
    pub fn type_vars(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut Vec<String>) {
        match &self.kind {
            TypeExprKind::Var(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            TypeExprKind::Named { args, .. } => args.iter().for_each(|t| t.collect_vars(out)),
            TypeExprKind::Function { from, to } => {
                from.collect_vars(out);
                to.collect_vars(out);
            }
            TypeExprKind::Record { extension, fields } => {
                if let Some(ext) = extension {
                    if !out.contains(&ext.name) {
                        out.push(ext.name.clone());
                    }
                }
                fields.iter().for_each(|f| f.ty.collect_vars(out));
            }
            TypeExprKind::Tuple(items) => items.iter().for_each(|t| t.collect_vars(out)),
            TypeExprKind::Unit | TypeExprKind::Error => {}
        }
    }

    /// Visit every named type reference.
    pub fn for_each_named<'a>(&'a self, f: &mut impl FnMut(&'a QualName)) {
        match &self.kind {
            TypeExprKind::Named { name, args } => {
                f(name);
                args.iter().for_each(|t| t.for_each_named(f));
            }
            TypeExprKind::Function { from, to } => {
                from.for_each_named(f);
                to.for_each_named(f);
            }
            TypeExprKind::Record { fields, .. } => {
                fields.iter().for_each(|field| field.ty.for_each_named(f));
            }
            TypeExprKind::Tuple(items) => items.iter().for_each(|t| t.for_each_named(f)),
            TypeExprKind::Var(_) | TypeExprKind::Unit | TypeExprKind::Error => {}
        }
    }

    /// Number of arrows at the top level (`a -> b -> c` has two).
    pub fn arity(&self) -> usize {
        match &self.kind {
            TypeExprKind::Function { to, .. } => 1 + to.arity(),
            _ => 0,
        }
    }
}
