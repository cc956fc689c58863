//! Syntax tree produced by the parser and consumed by analysis.
//!
//! Trees are immutable once built. Edits replace a file's tree wholesale;
//! nothing in the analysis core mutates nodes in place. Binary operator
//! chains are kept flat ([`ExprKind::BinOps`]): grouping them needs the
//! operator table of the enclosing scope, which only the binder knows.

mod expr;
mod pattern;
mod ty;

pub use expr::{CaseBranch, Expr, ExprKind, LetDecl, RecordField};
pub use pattern::{Pattern, PatternKind};
pub use ty::{RecordFieldType, TypeExpr, TypeExprKind};

use crate::Span;

/// Name used when a file has no module header.
pub const DEFAULT_MODULE_NAME: &str = "Main";

/// An unqualified identifier with its location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

/// A possibly-qualified reference: `map`, `List.map`, `Html.Attributes.class`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QualName {
    pub qualifier: Option<String>,
    pub name: String,
    pub span: Span,
}

impl QualName {
    /// Span of the unqualified tail (`map` in `List.map`).
    pub fn name_span(&self) -> Span {
        let len = u32::try_from(self.name.len()).unwrap_or(0);
        Span::new(self.span.end.saturating_sub(len), self.span.end)
    }

    /// The reference as written.
    pub fn full(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{q}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// A dotted module name with its location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleName {
    pub name: String,
    pub span: Span,
}

/// One parsed source file.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ParsedModule {
    pub header: Option<ModuleHeader>,
    pub imports: Vec<Import>,
    pub decls: Vec<Decl>,
    /// Syntax errors found while parsing; the tree above is best effort.
    pub errors: Vec<SyntaxError>,
    /// Covers the whole text.
    pub span: Span,
}

impl ParsedModule {
    pub fn module_name(&self) -> &str {
        self.header
            .as_ref()
            .map_or(DEFAULT_MODULE_NAME, |h| h.name.name.as_str())
    }

    pub fn value_decls(&self) -> impl Iterator<Item = &ValueDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Value(v) => Some(v),
            _ => None,
        })
    }

    pub fn value_decl(&self, name: &str) -> Option<&ValueDecl> {
        self.value_decls().find(|v| v.name.name == name)
    }

    /// Top-level declaration whose full extent covers `offset`.
    pub fn decl_at(&self, offset: u32) -> Option<&Decl> {
        self.decls.iter().find(|d| d.full_span().touches(offset))
    }

    /// Offset where a new import line belongs: after the last import, or
    /// after the module header.
    pub fn import_insertion_offset(&self) -> u32 {
        if let Some(last) = self.imports.last() {
            last.span.end
        } else if let Some(header) = &self.header {
            header.span.end
        } else {
            0
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModuleHeader {
    pub name: ModuleName,
    pub exposing: Exposing,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    pub module: ModuleName,
    pub alias: Option<Ident>,
    pub exposing: Option<Exposing>,
    pub span: Span,
}

impl Import {
    /// Name used for qualified references through this import. An alias
    /// replaces the module name entirely.
    pub fn qualifier(&self) -> &str {
        self.alias
            .as_ref()
            .map_or(self.module.name.as_str(), |a| a.name.as_str())
    }

    /// Every name that reaches this import qualified. Without an alias the
    /// last path segment works as well as the full module name.
    pub fn qualifiers(&self) -> impl Iterator<Item = &str> {
        let last = match &self.alias {
            Some(_) => None,
            None => self
                .module
                .name
                .rsplit_once('.')
                .map(|(_, segment)| segment),
        };
        std::iter::once(self.qualifier()).chain(last)
    }
}

/// An `exposing` clause.
#[derive(Clone, Debug, PartialEq)]
pub enum Exposing {
    /// `exposing (..)`; the span covers the parentheses.
    All(Span),
    /// `exposing (a, B(..), (+))`; the span covers the parentheses.
    Explicit { items: Vec<ExposedItem>, span: Span },
}

impl Exposing {
    pub fn span(&self) -> Span {
        match self {
            Exposing::All(span) | Exposing::Explicit { span, .. } => *span,
        }
    }

    pub fn items(&self) -> &[ExposedItem] {
        match self {
            Exposing::All(_) => &[],
            Exposing::Explicit { items, .. } => items,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Exposing::All(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExposedItem {
    pub kind: ExposedKind,
    /// Bare name; operators are stored without parentheses.
    pub name: String,
    /// Span of the whole item, `Maybe(..)` or `(+)` included.
    pub span: Span,
    pub name_span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExposedKind {
    Value,
    Operator,
    /// `open` is the span of `(..)` when constructors are exposed too.
    Type { open: Option<Span> },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Value(ValueDecl),
    Union(UnionDecl),
    Alias(AliasDecl),
    Infix(InfixDecl),
    /// A region the parser could not make sense of.
    Error(Span),
}

impl Decl {
    /// Extent of the declaration, type annotation included.
    pub fn full_span(&self) -> Span {
        match self {
            Decl::Value(v) => v.full_span(),
            Decl::Union(u) => u.span,
            Decl::Alias(a) => a.span,
            Decl::Infix(i) => i.span,
            Decl::Error(span) => *span,
        }
    }

    pub fn name(&self) -> Option<&Ident> {
        match self {
            Decl::Value(v) => Some(&v.name),
            Decl::Union(u) => Some(&u.name),
            Decl::Alias(a) => Some(&a.name),
            Decl::Infix(i) => Some(&i.operator),
            Decl::Error(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeAnnotation {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

/// `name p1 p2 = body`, with its optional preceding annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueDecl {
    pub annotation: Option<TypeAnnotation>,
    pub name: Ident,
    pub params: Vec<Pattern>,
    pub body: Expr,
    /// From the name to the end of the body.
    pub span: Span,
}

impl ValueDecl {
    pub fn full_span(&self) -> Span {
        match &self.annotation {
            Some(a) => a.span.merge(self.span),
            None => self.span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionDecl {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub variants: Vec<Variant>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    pub name: Ident,
    pub args: Vec<TypeExpr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AliasDecl {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub ty: TypeExpr,
    pub span: Span,
}

impl AliasDecl {
    /// Record aliases double as constructor functions.
    pub fn is_record(&self) -> bool {
        matches!(
            self.ty.kind,
            TypeExprKind::Record {
                extension: None,
                ..
            }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Associativity {
    Left,
    Right,
    Non,
}

/// `infix left 6 (+) = add`
#[derive(Clone, Debug, PartialEq)]
pub struct InfixDecl {
    pub assoc: Associativity,
    pub precedence: u8,
    pub operator: Ident,
    pub function: Ident,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    InvalidCharacter,
    UnexpectedToken,
    ExpectedExpression,
    UnclosedDelimiter,
    MalformedDeclaration,
    OrphanAnnotation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, message: impl Into<String>, span: Span) -> Self {
        SyntaxError {
            kind,
            message: message.into(),
            span,
        }
    }
}
