use elm_ir::ast::{RecordFieldType, SyntaxErrorKind, TypeExpr, TypeExprKind};
use elm_ir::{ensure_sufficient_stack, Span};

use super::Parser;
use crate::token::TokenKind;

impl Parser<'_> {
    /// `type := btype ("->" type)?`
    pub(crate) fn parse_type(&mut self) -> TypeExpr {
        ensure_sufficient_stack(|| {
            let start = self.cursor.current_span().start;
            let from = self.parse_btype();
            if self.cursor.at(TokenKind::Arrow) && !self.cursor.at_layout_end() {
                self.cursor.bump();
                let to = self.parse_type();
                return TypeExpr::new(
                    TypeExprKind::Function {
                        from: Box::new(from),
                        to: Box::new(to),
                    },
                    self.cursor.span_from(start),
                );
            }
            from
        })
    }

    fn parse_btype(&mut self) -> TypeExpr {
        if !matches!(
            self.cursor.kind(),
            TokenKind::Upper | TokenKind::QualifiedUpper
        ) {
            return self.parse_atype();
        }
        let token = self.cursor.bump();
        let mut args = Vec::new();
        while !self.cursor.at_layout_end() && self.starts_type_atom() {
            args.push(self.parse_atype());
        }
        TypeExpr::new(
            TypeExprKind::Named {
                name: self.qual_name(token),
                args,
            },
            self.cursor.span_from(token.span.start),
        )
    }

    pub(crate) fn starts_type_atom(&self) -> bool {
        matches!(
            self.cursor.kind(),
            TokenKind::Lower
                | TokenKind::Upper
                | TokenKind::QualifiedUpper
                | TokenKind::LParen
                | TokenKind::LBrace
        )
    }

    pub(crate) fn parse_atype(&mut self) -> TypeExpr {
        let token = self.cursor.current();
        match token.kind {
            TokenKind::Lower => {
                self.cursor.bump();
                TypeExpr::new(
                    TypeExprKind::Var(self.cursor.text(token).to_string()),
                    token.span,
                )
            }
            TokenKind::Upper | TokenKind::QualifiedUpper => {
                self.cursor.bump();
                TypeExpr::new(
                    TypeExprKind::Named {
                        name: self.qual_name(token),
                        args: Vec::new(),
                    },
                    token.span,
                )
            }
            TokenKind::LParen => self.parse_paren_type(),
            TokenKind::LBrace => self.parse_record_type(),
            _ => {
                self.error(
                    SyntaxErrorKind::UnexpectedToken,
                    format!("expected a type, found {}", token.kind.describe()),
                    token.span,
                );
                TypeExpr::new(TypeExprKind::Error, Span::point(token.span.start))
            }
        }
    }

    fn parse_paren_type(&mut self) -> TypeExpr {
        let open = self.cursor.bump();
        if self.cursor.eat(TokenKind::RParen).is_some() {
            return TypeExpr::new(TypeExprKind::Unit, self.cursor.span_from(open.span.start));
        }
        let first = self.parse_type();
        if !self.cursor.at(TokenKind::Comma) {
            self.expect_closing(TokenKind::RParen, open);
            return first;
        }
        let mut items = vec![first];
        while self.cursor.eat(TokenKind::Comma).is_some() {
            items.push(self.parse_type());
        }
        self.expect_closing(TokenKind::RParen, open);
        TypeExpr::new(
            TypeExprKind::Tuple(items),
            self.cursor.span_from(open.span.start),
        )
    }

    /// `{}`, `{ x : Int }` or `{ a | x : Int }`.
    fn parse_record_type(&mut self) -> TypeExpr {
        let open = self.cursor.bump();
        let mut extension = None;
        let mut fields = Vec::new();
        if !self.cursor.at(TokenKind::RBrace) {
            if self.cursor.at(TokenKind::Lower) && self.cursor.peek(1).kind == TokenKind::Pipe {
                let var = self.cursor.bump();
                extension = Some(self.ident(var));
                self.cursor.bump();
            }
            loop {
                let Some(name) = self.cursor.eat(TokenKind::Lower) else {
                    self.error_unexpected("a field name");
                    break;
                };
                let ty = if self.expect(TokenKind::Colon).is_some() {
                    self.parse_type()
                } else {
                    TypeExpr::new(TypeExprKind::Error, Span::point(self.cursor.prev_end()))
                };
                fields.push(RecordFieldType {
                    name: self.ident(name),
                    ty,
                    span: self.cursor.span_from(name.span.start),
                });
                if self.cursor.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect_closing(TokenKind::RBrace, open);
        TypeExpr::new(
            TypeExprKind::Record { extension, fields },
            self.cursor.span_from(open.span.start),
        )
    }
}
