//! Recursive-descent grammar.
//!
//! The parser never fails: malformed regions become `Decl::Error`,
//! `ExprKind::Error`, `PatternKind::Error` or `TypeExprKind::Error` nodes and
//! a [`SyntaxError`] is recorded. Recovery at the top level skips to the
//! next line that starts in column 0.

mod expr;
mod pattern;
mod ty;

use elm_ir::ast::{
    AliasDecl, Associativity, Decl, ExposedItem, ExposedKind, Exposing, Ident, Import, InfixDecl,
    ModuleHeader, ModuleName, ParsedModule, QualName, SyntaxError, SyntaxErrorKind,
    TypeAnnotation, UnionDecl, ValueDecl, Variant,
};
use elm_ir::ast::Expr;
use elm_ir::Span;

use crate::cursor::Cursor;
use crate::lexer::{lex, LexOutput};
use crate::token::{Token, TokenKind};

pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    errors: Vec<SyntaxError>,
    source_len: u32,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let LexOutput { tokens, errors } = lex(source);
        Parser {
            cursor: Cursor::new(source, tokens),
            errors,
            source_len: u32::try_from(source.len()).unwrap_or(u32::MAX),
        }
    }

    pub(crate) fn parse_module(mut self) -> ParsedModule {
        let header = self.parse_header();
        self.expect_top_level_boundary();

        let mut imports = Vec::new();
        while self.cursor.at(TokenKind::Import) {
            if let Some(import) = self.parse_import() {
                imports.push(import);
            }
            self.expect_top_level_boundary();
        }

        let decls = self.parse_decls();
        let mut errors = self.errors;
        errors.sort_by_key(|e| (e.span.start, e.span.end));
        ParsedModule {
            header,
            imports,
            decls,
            errors,
            span: Span::new(0, self.source_len),
        }
    }

    // Error helpers

    fn error(&mut self, kind: SyntaxErrorKind, message: impl Into<String>, span: Span) {
        if self
            .errors
            .last()
            .is_some_and(|e| e.span.start == span.start)
        {
            return;
        }
        self.errors.push(SyntaxError::new(kind, message, span));
    }

    fn error_unexpected(&mut self, expected: &str) {
        let token = self.cursor.current();
        let message = format!("expected {expected}, found {}", token.kind.describe());
        self.error(SyntaxErrorKind::UnexpectedToken, message, token.span);
    }

    fn expect(&mut self, kind: TokenKind) -> Option<Token> {
        let token = self.cursor.eat(kind);
        if token.is_none() {
            self.error_unexpected(kind.describe());
        }
        token
    }

    /// Consume a closing delimiter, reporting the opener if it is missing.
    fn expect_closing(&mut self, close: TokenKind, open: Token) -> bool {
        if self.cursor.eat(close).is_some() {
            return true;
        }
        let message = format!(
            "unclosed {}: expected {}, found {}",
            open.kind.describe(),
            close.describe(),
            self.cursor.kind().describe()
        );
        self.error(SyntaxErrorKind::UnclosedDelimiter, message, open.span);
        false
    }

    /// After a complete top-level item, anything before the next column-0
    /// line is junk.
    fn expect_top_level_boundary(&mut self) {
        if self.cursor.at_top_level_start() {
            return;
        }
        self.error_unexpected("a new declaration");
        self.cursor.skip_to_top_level();
    }

    fn ident(&self, token: Token) -> Ident {
        Ident::new(self.cursor.text(token), token.span)
    }

    /// `.field` token to the field name with its span.
    fn field_ident(&self, token: Token) -> Ident {
        let text = self.cursor.text(token);
        Ident::new(
            text.trim_start_matches('.'),
            Span::new(token.span.start + 1, token.span.end),
        )
    }

    fn qual_name(&self, token: Token) -> QualName {
        let text = self.cursor.text(token);
        match text.rfind('.') {
            Some(dot) => QualName {
                qualifier: Some(text[..dot].to_string()),
                name: text[dot + 1..].to_string(),
                span: token.span,
            },
            None => QualName {
                qualifier: None,
                name: text.to_string(),
                span: token.span,
            },
        }
    }

    // Header and imports

    fn parse_header(&mut self) -> Option<ModuleHeader> {
        let start = self.cursor.current_span().start;
        if self.cursor.at(TokenKind::Lower)
            && self.cursor.text(self.cursor.current()) == "port"
            && self.cursor.peek(1).kind == TokenKind::Module
        {
            self.cursor.bump();
        }
        self.cursor.eat(TokenKind::Module)?;

        let Some(name) = self.parse_module_name() else {
            self.error_unexpected("a module name");
            self.cursor.skip_to_top_level();
            return None;
        };
        let exposing = if self.cursor.eat(TokenKind::Exposing).is_some() {
            self.parse_exposing()
        } else {
            self.error_unexpected("`exposing`");
            Exposing::Explicit {
                items: Vec::new(),
                span: Span::point(self.cursor.prev_end()),
            }
        };
        Some(ModuleHeader {
            name,
            exposing,
            span: self.cursor.span_from(start),
        })
    }

    fn parse_module_name(&mut self) -> Option<ModuleName> {
        if !matches!(
            self.cursor.kind(),
            TokenKind::Upper | TokenKind::QualifiedUpper
        ) {
            return None;
        }
        let token = self.cursor.bump();
        Some(ModuleName {
            name: self.cursor.text(token).to_string(),
            span: token.span,
        })
    }

    /// Parse the parenthesized list after `exposing`.
    fn parse_exposing(&mut self) -> Exposing {
        let Some(open) = self.expect(TokenKind::LParen) else {
            return Exposing::Explicit {
                items: Vec::new(),
                span: Span::point(self.cursor.prev_end()),
            };
        };
        if self.cursor.eat(TokenKind::DotDot).is_some() {
            self.expect_closing(TokenKind::RParen, open);
            return Exposing::All(self.cursor.span_from(open.span.start));
        }

        let mut items = Vec::new();
        loop {
            let token = self.cursor.current();
            let item = match token.kind {
                TokenKind::Lower => {
                    self.cursor.bump();
                    ExposedItem {
                        kind: ExposedKind::Value,
                        name: self.cursor.text(token).to_string(),
                        span: token.span,
                        name_span: token.span,
                    }
                }
                TokenKind::Upper => {
                    self.cursor.bump();
                    let open_ctors = if self.cursor.at(TokenKind::LParen)
                        && self.cursor.peek(1).kind == TokenKind::DotDot
                        && self.cursor.peek(2).kind == TokenKind::RParen
                    {
                        let ctor_start = self.cursor.bump().span.start;
                        self.cursor.bump();
                        self.cursor.bump();
                        Some(self.cursor.span_from(ctor_start))
                    } else {
                        None
                    };
                    ExposedItem {
                        kind: ExposedKind::Type { open: open_ctors },
                        name: self.cursor.text(token).to_string(),
                        span: self.cursor.span_from(token.span.start),
                        name_span: token.span,
                    }
                }
                TokenKind::LParen
                    if self.cursor.peek(1).kind == TokenKind::Operator
                        && self.cursor.peek(2).kind == TokenKind::RParen =>
                {
                    self.cursor.bump();
                    let op = self.cursor.bump();
                    self.cursor.bump();
                    ExposedItem {
                        kind: ExposedKind::Operator,
                        name: self.cursor.text(op).to_string(),
                        span: self.cursor.span_from(token.span.start),
                        name_span: op.span,
                    }
                }
                _ => {
                    self.error_unexpected("an exposed name");
                    break;
                }
            };
            items.push(item);
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect_closing(TokenKind::RParen, open);
        Exposing::Explicit {
            items,
            span: self.cursor.span_from(open.span.start),
        }
    }

    fn parse_import(&mut self) -> Option<Import> {
        let start = self.cursor.bump().span.start;
        let Some(module) = self.parse_module_name() else {
            self.error(
                SyntaxErrorKind::MalformedDeclaration,
                "expected a module name after `import`",
                self.cursor.current_span(),
            );
            self.cursor.skip_to_top_level();
            return None;
        };
        let alias = if self.cursor.eat(TokenKind::As).is_some() {
            match self.cursor.eat(TokenKind::Upper) {
                Some(token) => Some(self.ident(token)),
                None => {
                    self.error_unexpected("an alias name");
                    None
                }
            }
        } else {
            None
        };
        let exposing = if self.cursor.eat(TokenKind::Exposing).is_some() {
            Some(self.parse_exposing())
        } else {
            None
        };
        Some(Import {
            module,
            alias,
            exposing,
            span: self.cursor.span_from(start),
        })
    }

    // Declarations

    fn parse_decls(&mut self) -> Vec<Decl> {
        let mut decls = Vec::new();
        let mut pending: Option<TypeAnnotation> = None;

        while !self.cursor.at_eof() {
            let before = self.cursor.position();
            let token = self.cursor.current();
            match token.kind {
                TokenKind::Type => {
                    self.flush_orphan(&mut pending);
                    decls.push(self.parse_type_decl());
                }
                TokenKind::Infix => {
                    self.flush_orphan(&mut pending);
                    decls.push(self.parse_infix_decl());
                }
                TokenKind::Lower if self.cursor.peek(1).kind == TokenKind::Colon => {
                    self.flush_orphan(&mut pending);
                    pending = Some(self.parse_annotation());
                }
                TokenKind::Lower => {
                    let annotation = self.take_annotation(&mut pending, token);
                    decls.push(Decl::Value(self.parse_value_decl(annotation)));
                }
                _ => {
                    self.flush_orphan(&mut pending);
                    self.error(
                        SyntaxErrorKind::MalformedDeclaration,
                        format!("expected a declaration, found {}", token.kind.describe()),
                        token.span,
                    );
                    let span = self
                        .cursor
                        .skip_to_top_level()
                        .unwrap_or_else(|| Span::point(token.span.start));
                    decls.push(Decl::Error(span));
                    continue;
                }
            }
            self.expect_top_level_boundary();
            if self.cursor.position() == before {
                self.cursor.bump();
            }
        }
        self.flush_orphan(&mut pending);
        decls
    }

    /// Take the pending annotation if it belongs to the definition starting
    /// at `name`; otherwise report it as orphaned.
    fn take_annotation(
        &mut self,
        pending: &mut Option<TypeAnnotation>,
        name: Token,
    ) -> Option<TypeAnnotation> {
        let text = self.cursor.text(name);
        if pending.as_ref().is_some_and(|a| a.name.name == text) {
            return pending.take();
        }
        self.flush_orphan(pending);
        None
    }

    fn flush_orphan(&mut self, pending: &mut Option<TypeAnnotation>) {
        if let Some(annotation) = pending.take() {
            self.error(
                SyntaxErrorKind::OrphanAnnotation,
                format!(
                    "type annotation for `{}` has no matching definition",
                    annotation.name.name
                ),
                annotation.name.span,
            );
        }
    }

    fn parse_annotation(&mut self) -> TypeAnnotation {
        let name_token = self.cursor.bump();
        self.cursor.bump();
        let ty = self.parse_type();
        TypeAnnotation {
            name: self.ident(name_token),
            ty,
            span: self.cursor.span_from(name_token.span.start),
        }
    }

    /// `name p1 p2 = body`; the cursor is at `name`.
    fn parse_value_decl(&mut self, annotation: Option<TypeAnnotation>) -> ValueDecl {
        let name_token = self.cursor.bump();
        let mut params = Vec::new();
        while !self.cursor.at_layout_end() && self.starts_pattern_atom() {
            params.push(self.parse_atom_pattern());
        }
        let body = if self.expect(TokenKind::Equals).is_some() {
            self.parse_expr()
        } else {
            Expr::error(Span::point(self.cursor.prev_end()))
        };
        ValueDecl {
            annotation,
            name: self.ident(name_token),
            params,
            body,
            span: self.cursor.span_from(name_token.span.start),
        }
    }

    fn parse_type_params(&mut self) -> Vec<Ident> {
        let mut params = Vec::new();
        while !self.cursor.at_layout_end() {
            let Some(token) = self.cursor.eat(TokenKind::Lower) else {
                break;
            };
            params.push(self.ident(token));
        }
        params
    }

    fn parse_type_decl(&mut self) -> Decl {
        let start = self.cursor.bump().span.start;
        let is_alias = self.cursor.eat(TokenKind::Alias).is_some();
        let Some(name_token) = self.cursor.eat(TokenKind::Upper) else {
            return self.malformed(start, "expected a type name");
        };
        let name = self.ident(name_token);
        let params = self.parse_type_params();
        if self.expect(TokenKind::Equals).is_none() {
            return self.malformed(start, "expected `=` in type declaration");
        }

        if is_alias {
            let ty = self.parse_type();
            return Decl::Alias(AliasDecl {
                name,
                params,
                ty,
                span: self.cursor.span_from(start),
            });
        }

        let mut variants = Vec::new();
        loop {
            let Some(ctor) = self.cursor.eat(TokenKind::Upper) else {
                self.error_unexpected("a constructor name");
                break;
            };
            let mut args = Vec::new();
            while !self.cursor.at_layout_end() && self.starts_type_atom() {
                args.push(self.parse_atype());
            }
            variants.push(Variant {
                name: self.ident(ctor),
                args,
                span: self.cursor.span_from(ctor.span.start),
            });
            if self.cursor.at_layout_end() || self.cursor.eat(TokenKind::Pipe).is_none() {
                break;
            }
        }
        Decl::Union(UnionDecl {
            name,
            params,
            variants,
            span: self.cursor.span_from(start),
        })
    }

    /// `infix left 6 (+) = add`
    fn parse_infix_decl(&mut self) -> Decl {
        let start = self.cursor.bump().span.start;
        let assoc = match self.cursor.eat(TokenKind::Lower).map(|t| self.cursor.text(t)) {
            Some("left") => Associativity::Left,
            Some("right") => Associativity::Right,
            Some("non") => Associativity::Non,
            _ => return self.malformed(start, "expected `left`, `right` or `non`"),
        };
        let precedence = self
            .cursor
            .eat(TokenKind::Int)
            .and_then(|t| self.cursor.text(t).parse::<u8>().ok());
        let Some(precedence) = precedence else {
            return self.malformed(start, "expected a precedence between 0 and 9");
        };
        let operator = if self.cursor.at(TokenKind::LParen)
            && self.cursor.peek(1).kind == TokenKind::Operator
            && self.cursor.peek(2).kind == TokenKind::RParen
        {
            self.cursor.bump();
            let op = self.cursor.bump();
            self.cursor.bump();
            self.ident(op)
        } else {
            return self.malformed(start, "expected a parenthesized operator");
        };
        if self.cursor.eat(TokenKind::Equals).is_none() {
            return self.malformed(start, "expected `=` in infix declaration");
        }
        let Some(function) = self.cursor.eat(TokenKind::Lower) else {
            return self.malformed(start, "expected the implementing function");
        };
        Decl::Infix(InfixDecl {
            assoc,
            precedence,
            operator,
            function: self.ident(function),
            span: self.cursor.span_from(start),
        })
    }

    /// Report a malformed declaration starting at `start` and skip past it.
    fn malformed(&mut self, start: u32, message: &str) -> Decl {
        let found = self.cursor.kind().describe();
        self.error(
            SyntaxErrorKind::MalformedDeclaration,
            format!("{message}, found {found}"),
            self.cursor.current_span(),
        );
        if !self.cursor.at_top_level_start() {
            self.cursor.skip_to_top_level();
        }
        Decl::Error(self.cursor.span_from(start))
    }
}
