use super::{Ident, QualName};
use crate::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatternKind {
    Wildcard,
    Var(String),
    Ctor {
        name: QualName,
        args: Vec<Pattern>,
    },
    Tuple(Vec<Pattern>),
    List(Vec<Pattern>),
    /// `head :: tail`
    Cons {
        head: Box<Pattern>,
        tail: Box<Pattern>,
    },
    /// `{ x, y }`
    Record(Vec<Ident>),
    Int(i64),
    Str(String),
    Char(String),
    Unit,
    /// `pattern as name`
    Alias {
        pattern: Box<Pattern>,
        name: Ident,
    },
    Error,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Pattern { kind, span }
    }

    /// Names bound by this pattern, left to right.
    pub fn bindings(&self) -> Vec<Ident> {
        let mut out = Vec::new();
        self.collect_bindings(&mut out);
        out
    }

    fn collect_bindings(&self, out: &mut Vec<Ident>) {
        match &self.kind {
            PatternKind::Var(name) => out.push(Ident::new(name.clone(), self.span)),
            PatternKind::Ctor { args, .. } => args.iter().for_each(|p| p.collect_bindings(out)),
            PatternKind::Tuple(items) | PatternKind::List(items) => {
                items.iter().for_each(|p| p.collect_bindings(out));
            }
            PatternKind::Cons { head, tail } => {
                head.collect_bindings(out);
                tail.collect_bindings(out);
            }
            PatternKind::Record(fields) => out.extend(fields.iter().cloned()),
            PatternKind::Alias { pattern, name } => {
                pattern.collect_bindings(out);
                out.push(name.clone());
            }
            PatternKind::Wildcard
            | PatternKind::Int(_)
            | PatternKind::Str(_)
            | PatternKind::Char(_)
            | PatternKind::Unit
            | PatternKind::Error => {}
        }
    }

    /// Visit every constructor reference inside this pattern.
    pub fn for_each_ctor<'a>(&'a self, f: &mut impl FnMut(&'a QualName)) {
        match &self.kind {
            PatternKind::Ctor { name, args } => {
                f(name);
                args.iter().for_each(|p| p.for_each_ctor(f));
            }
            PatternKind::Tuple(items) | PatternKind::List(items) => {
                items.iter().for_each(|p| p.for_each_ctor(f));
            }
            PatternKind::Cons { head, tail } => {
                head.for_each_ctor(f);
                tail.for_each_ctor(f);
            }
            PatternKind::Alias { pattern, .. } => pattern.for_each_ctor(f),
            _ => {}
        }
    }

    /// Matches every value of its type regardless of constructors.
    pub fn is_catch_all(&self) -> bool {
        match &self.kind {
            PatternKind::Wildcard | PatternKind::Var(_) => true,
            PatternKind::Alias { pattern, .. } => pattern.is_catch_all(),
            _ => false,
        }
    }
}
