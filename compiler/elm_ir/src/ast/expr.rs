use super::{Ident, Pattern, QualName, ValueDecl};
use crate::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(String),
    Char(String),
    /// Lowercase reference, possibly qualified.
    Var(QualName),
    /// Uppercase reference: a variant or record-alias constructor.
    Ctor(QualName),
    /// `(+)`; the identifier holds the bare operator.
    OperatorRef(Ident),
    /// `.field`
    Accessor(Ident),
    /// `record.field`
    Access {
        record: Box<Expr>,
        field: Ident,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `a + b * c`, ungrouped. Each operator is followed by its right operand.
    BinOps {
        first: Box<Expr>,
        rest: Vec<(Ident, Expr)>,
    },
    Negate(Box<Expr>),
    Lambda {
        params: Vec<Pattern>,
        body: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Case {
        scrutinee: Box<Expr>,
        branches: Vec<CaseBranch>,
    },
    Let {
        decls: Vec<LetDecl>,
        body: Box<Expr>,
    },
    Record(Vec<RecordField>),
    /// `{ base | field = value }`
    RecordUpdate {
        base: Ident,
        fields: Vec<RecordField>,
    },
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Unit,
    Paren(Box<Expr>),
    /// Placeholder for an expression that failed to parse.
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseBranch {
    pub pattern: Pattern,
    pub body: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LetDecl {
    Value(ValueDecl),
    /// `( a, b ) = pair`
    Destructure {
        pattern: Pattern,
        body: Expr,
        span: Span,
    },
}

impl LetDecl {
    pub fn span(&self) -> Span {
        match self {
            LetDecl::Value(v) => v.full_span(),
            LetDecl::Destructure { span, .. } => *span,
        }
    }

    pub fn body(&self) -> &Expr {
        match self {
            LetDecl::Value(v) => &v.body,
            LetDecl::Destructure { body, .. } => body,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordField {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    pub fn error(span: Span) -> Self {
        Expr {
            kind: ExprKind::Error,
            span,
        }
    }

    /// Visit every direct subexpression, including let-bound bodies and case
    /// branch bodies.
    pub fn for_each_child<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        match &self.kind {
            ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Str(_)
            | ExprKind::Char(_)
            | ExprKind::Var(_)
            | ExprKind::Ctor(_)
            | ExprKind::OperatorRef(_)
            | ExprKind::Accessor(_)
            | ExprKind::Unit
            | ExprKind::Error => {}
            ExprKind::Access { record, .. } => f(record),
            ExprKind::Call { func, args } => {
                f(func);
                args.iter().for_each(|a| f(a));
            }
            ExprKind::BinOps { first, rest } => {
                f(first);
                rest.iter().for_each(|(_, e)| f(e));
            }
            ExprKind::Negate(inner) | ExprKind::Paren(inner) => f(inner),
            ExprKind::Lambda { body, .. } => f(body),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                f(cond);
                f(then_branch);
                f(else_branch);
            }
            ExprKind::Case {
                scrutinee,
                branches,
            } => {
                f(scrutinee);
                branches.iter().for_each(|b| f(&b.body));
            }
            ExprKind::Let { decls, body } => {
                decls.iter().for_each(|d| f(d.body()));
                f(body);
            }
            ExprKind::Record(fields) | ExprKind::RecordUpdate { fields, .. } => {
                fields.iter().for_each(|field| f(&field.value));
            }
            ExprKind::Tuple(items) | ExprKind::List(items) => items.iter().for_each(|e| f(e)),
        }
    }

    /// Innermost expression whose span touches `offset`.
    pub fn innermost_at(&self, offset: u32) -> Option<&Expr> {
        if !self.span.touches(offset) {
            return None;
        }
        let mut found = None;
        self.for_each_child(&mut |child| {
            if found.is_none() {
                found = child.innermost_at(offset);
            }
        });
        Some(found.unwrap_or(self))
    }

    /// Strip redundant parentheses.
    pub fn unparen(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) => inner.unparen(),
            _ => self,
        }
    }

    /// Whether printing this expression as a function argument needs parens.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Int(_)
                | ExprKind::Float(_)
                | ExprKind::Str(_)
                | ExprKind::Char(_)
                | ExprKind::Var(_)
                | ExprKind::Ctor(_)
                | ExprKind::OperatorRef(_)
                | ExprKind::Accessor(_)
                | ExprKind::Access { .. }
                | ExprKind::Record(_)
                | ExprKind::RecordUpdate { .. }
                | ExprKind::Tuple(_)
                | ExprKind::List(_)
                | ExprKind::Unit
                | ExprKind::Paren(_)
        )
    }
}
