//! Expressions.
//!
//! Operator chains are kept flat (`ExprKind::BinOps`); precedence and
//! associativity are applied later, once the operator table of the
//! importing module is known.

use elm_ir::ast::{
    CaseBranch, Expr, ExprKind, LetDecl, RecordField, SyntaxErrorKind, TypeAnnotation,
};
use elm_ir::{ensure_sufficient_stack, Span};

use super::Parser;
use crate::lexer::unescape_literal;
use crate::token::TokenKind;

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Expr {
        ensure_sufficient_stack(|| self.parse_binops())
    }

    fn parse_binops(&mut self) -> Expr {
        let start = self.cursor.current_span().start;
        let first = self.parse_operand();
        let mut rest = Vec::new();
        while self.cursor.at(TokenKind::Operator) && !self.cursor.at_layout_end() {
            let op = self.cursor.bump();
            let op = self.ident(op);
            let operand = if !self.cursor.at_layout_end() && self.starts_operand() {
                self.parse_operand()
            } else {
                self.expected_expression()
            };
            rest.push((op, operand));
        }
        if rest.is_empty() {
            first
        } else {
            Expr::new(
                ExprKind::BinOps {
                    first: Box::new(first),
                    rest,
                },
                self.cursor.span_from(start),
            )
        }
    }

    fn starts_operand(&self) -> bool {
        self.cursor.current().starts_atom()
            || matches!(
                self.cursor.kind(),
                TokenKind::Backslash | TokenKind::If | TokenKind::Case | TokenKind::Let
            )
            || self.cursor.at_operator("-")
    }

    fn expected_expression(&mut self) -> Expr {
        let token = self.cursor.current();
        self.error(
            SyntaxErrorKind::ExpectedExpression,
            format!("expected an expression, found {}", token.kind.describe()),
            token.span,
        );
        Expr::error(Span::point(self.cursor.prev_end().max(token.span.start)))
    }

    fn parse_operand(&mut self) -> Expr {
        if self.cursor.at_layout_end() {
            return self.expected_expression();
        }
        let start = self.cursor.current_span().start;
        match self.cursor.kind() {
            TokenKind::Backslash => self.parse_lambda(),
            TokenKind::If => self.parse_if(),
            TokenKind::Case => self.parse_case(),
            TokenKind::Let => self.parse_let(),
            TokenKind::Operator if self.cursor.at_operator("-") => {
                self.cursor.bump();
                let inner = if self.cursor.current().starts_atom() {
                    self.parse_application()
                } else {
                    self.expected_expression()
                };
                Expr::new(
                    ExprKind::Negate(Box::new(inner)),
                    self.cursor.span_from(start),
                )
            }
            _ if self.cursor.current().starts_atom() => self.parse_application(),
            _ => self.expected_expression(),
        }
    }

    fn parse_application(&mut self) -> Expr {
        let start = self.cursor.current_span().start;
        let func = self.parse_postfix();
        let mut args = Vec::new();
        while !self.cursor.at_layout_end() && self.cursor.current().starts_atom() {
            args.push(self.parse_postfix());
        }
        if args.is_empty() {
            func
        } else {
            Expr::new(
                ExprKind::Call {
                    func: Box::new(func),
                    args,
                },
                self.cursor.span_from(start),
            )
        }
    }

    /// An atom followed by adjacent `.field` accesses.
    fn parse_postfix(&mut self) -> Expr {
        let start = self.cursor.current_span().start;
        let mut expr = self.parse_atom();
        while self.cursor.at(TokenKind::DotField) && self.cursor.is_adjacent() {
            let token = self.cursor.bump();
            let field = self.field_ident(token);
            expr = Expr::new(
                ExprKind::Access {
                    record: Box::new(expr),
                    field,
                },
                self.cursor.span_from(start),
            );
        }
        expr
    }

    fn parse_atom(&mut self) -> Expr {
        let token = self.cursor.current();
        let text = self.cursor.text(token);
        let kind = match token.kind {
            TokenKind::Int => {
                self.cursor.bump();
                let value = match text.strip_prefix("0x") {
                    Some(hex) => i64::from_str_radix(hex, 16),
                    None => text.parse::<i64>(),
                };
                match value {
                    Ok(value) => ExprKind::Int(value),
                    Err(_) => {
                        self.error(
                            SyntaxErrorKind::InvalidCharacter,
                            "integer literal out of range",
                            token.span,
                        );
                        ExprKind::Error
                    }
                }
            }
            TokenKind::Float => {
                self.cursor.bump();
                match text.parse::<f64>() {
                    Ok(value) => ExprKind::Float(value),
                    Err(_) => ExprKind::Error,
                }
            }
            TokenKind::Str => {
                self.cursor.bump();
                ExprKind::Str(unescape_literal(text))
            }
            TokenKind::Char => {
                self.cursor.bump();
                ExprKind::Char(unescape_literal(text))
            }
            TokenKind::Lower | TokenKind::QualifiedLower => {
                self.cursor.bump();
                ExprKind::Var(self.qual_name(token))
            }
            TokenKind::Upper | TokenKind::QualifiedUpper => {
                self.cursor.bump();
                ExprKind::Ctor(self.qual_name(token))
            }
            TokenKind::DotField => {
                self.cursor.bump();
                ExprKind::Accessor(self.field_ident(token))
            }
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::LBracket => return self.parse_list(),
            TokenKind::LBrace => return self.parse_record(),
            _ => return self.expected_expression(),
        };
        Expr::new(kind, token.span)
    }

    fn parse_paren(&mut self) -> Expr {
        let open = self.cursor.bump();
        let start = open.span.start;
        if self.cursor.eat(TokenKind::RParen).is_some() {
            return Expr::new(ExprKind::Unit, self.cursor.span_from(start));
        }
        if self.cursor.at(TokenKind::Operator) && self.cursor.peek(1).kind == TokenKind::RParen {
            let op = self.cursor.bump();
            self.cursor.bump();
            return Expr::new(
                ExprKind::OperatorRef(self.ident(op)),
                self.cursor.span_from(start),
            );
        }

        let first = self.parse_expr();
        if self.cursor.at(TokenKind::Comma) {
            let mut items = vec![first];
            while self.cursor.eat(TokenKind::Comma).is_some() {
                items.push(self.parse_expr());
            }
            self.expect_closing(TokenKind::RParen, open);
            return Expr::new(ExprKind::Tuple(items), self.cursor.span_from(start));
        }
        self.expect_closing(TokenKind::RParen, open);
        Expr::new(
            ExprKind::Paren(Box::new(first)),
            self.cursor.span_from(start),
        )
    }

    fn parse_list(&mut self) -> Expr {
        let open = self.cursor.bump();
        let mut items = Vec::new();
        if !self.cursor.at(TokenKind::RBracket) {
            loop {
                items.push(self.parse_expr());
                if self.cursor.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect_closing(TokenKind::RBracket, open);
        Expr::new(
            ExprKind::List(items),
            self.cursor.span_from(open.span.start),
        )
    }

    fn parse_record(&mut self) -> Expr {
        let open = self.cursor.bump();
        if self.cursor.eat(TokenKind::RBrace).is_some() {
            return Expr::new(
                ExprKind::Record(Vec::new()),
                self.cursor.span_from(open.span.start),
            );
        }
        let kind = if self.cursor.at(TokenKind::Lower) && self.cursor.peek(1).kind == TokenKind::Pipe
        {
            let base = self.cursor.bump();
            let base = self.ident(base);
            self.cursor.bump();
            let fields = self.parse_field_assignments();
            ExprKind::RecordUpdate { base, fields }
        } else {
            ExprKind::Record(self.parse_field_assignments())
        };
        self.expect_closing(TokenKind::RBrace, open);
        Expr::new(kind, self.cursor.span_from(open.span.start))
    }

    fn parse_field_assignments(&mut self) -> Vec<RecordField> {
        let mut fields = Vec::new();
        loop {
            let Some(name) = self.cursor.eat(TokenKind::Lower) else {
                self.error_unexpected("a field name");
                break;
            };
            let value = if self.expect(TokenKind::Equals).is_some() {
                self.parse_expr()
            } else {
                Expr::error(Span::point(self.cursor.prev_end()))
            };
            fields.push(RecordField {
                name: self.ident(name),
                value,
                span: self.cursor.span_from(name.span.start),
            });
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        fields
    }

    fn parse_lambda(&mut self) -> Expr {
        let start = self.cursor.bump().span.start;
        let mut params = Vec::new();
        while self.starts_pattern_atom() {
            params.push(self.parse_atom_pattern());
        }
        if params.is_empty() {
            self.error_unexpected("a lambda parameter");
        }
        let body = if self.expect(TokenKind::Arrow).is_some() {
            self.parse_expr()
        } else {
            Expr::error(Span::point(self.cursor.prev_end()))
        };
        Expr::new(
            ExprKind::Lambda {
                params,
                body: Box::new(body),
            },
            self.cursor.span_from(start),
        )
    }

    fn parse_if(&mut self) -> Expr {
        let start = self.cursor.bump().span.start;
        let cond = self.parse_expr();
        let then_branch = self.parse_keyword_body(TokenKind::Then);
        let else_branch = self.parse_keyword_body(TokenKind::Else);
        Expr::new(
            ExprKind::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            self.cursor.span_from(start),
        )
    }

    /// `keyword expr`, or an error node when the keyword is missing.
    fn parse_keyword_body(&mut self, keyword: TokenKind) -> Expr {
        if self.expect(keyword).is_some() {
            self.parse_expr()
        } else {
            Expr::error(Span::point(self.cursor.prev_end()))
        }
    }

    fn parse_case(&mut self) -> Expr {
        let start = self.cursor.bump().span.start;
        let scrutinee = self.parse_expr();
        let mut branches = Vec::new();
        if self.expect(TokenKind::Of).is_some() {
            if self.cursor.at_layout_end() {
                self.error_unexpected("a case branch");
            } else {
                let column = self.cursor.current().column;
                self.cursor.push_limit(column);
                loop {
                    let before = self.cursor.position();
                    branches.push(self.parse_case_branch());
                    let next = self.cursor.current();
                    let continues = next.kind != TokenKind::Eof
                        && next.first_on_line
                        && next.column == column;
                    if !continues || self.cursor.position() == before {
                        break;
                    }
                }
                self.cursor.pop_limit();
            }
        }
        Expr::new(
            ExprKind::Case {
                scrutinee: Box::new(scrutinee),
                branches,
            },
            self.cursor.span_from(start),
        )
    }

    fn parse_case_branch(&mut self) -> CaseBranch {
        let start = self.cursor.current_span().start;
        let pattern = self.parse_pattern();
        let body = self.parse_keyword_body(TokenKind::Arrow);
        CaseBranch {
            pattern,
            body,
            span: self.cursor.span_from(start),
        }
    }

    fn parse_let(&mut self) -> Expr {
        let start = self.cursor.bump().span.start;
        let mut decls = Vec::new();
        if self.cursor.at(TokenKind::In) || self.cursor.at_eof() {
            self.error_unexpected("a let binding");
        } else {
            let column = self.cursor.current().column;
            self.cursor.push_limit(column);
            let mut pending: Option<TypeAnnotation> = None;
            let mut first = true;
            loop {
                let token = self.cursor.current();
                let aligned = token.first_on_line && token.column == column;
                if token.kind == TokenKind::In
                    || token.kind == TokenKind::Eof
                    || (!first && !aligned)
                {
                    break;
                }
                first = false;
                let before = self.cursor.position();
                match token.kind {
                    TokenKind::Lower if self.cursor.peek(1).kind == TokenKind::Colon => {
                        self.flush_orphan(&mut pending);
                        pending = Some(self.parse_annotation());
                    }
                    TokenKind::Lower => {
                        let annotation = self.take_annotation(&mut pending, token);
                        decls.push(LetDecl::Value(self.parse_value_decl(annotation)));
                    }
                    _ if self.starts_pattern_atom() => {
                        self.flush_orphan(&mut pending);
                        decls.push(self.parse_destructure());
                    }
                    _ => {
                        self.error_unexpected("a let binding");
                        break;
                    }
                }
                if self.cursor.position() == before {
                    break;
                }
            }
            self.flush_orphan(&mut pending);
            self.cursor.pop_limit();
        }
        let body = self.parse_keyword_body(TokenKind::In);
        Expr::new(
            ExprKind::Let {
                decls,
                body: Box::new(body),
            },
            self.cursor.span_from(start),
        )
    }

    fn parse_destructure(&mut self) -> LetDecl {
        let start = self.cursor.current_span().start;
        let pattern = self.parse_pattern();
        let body = self.parse_keyword_body(TokenKind::Equals);
        LetDecl::Destructure {
            pattern,
            body,
            span: self.cursor.span_from(start),
        }
    }
}
