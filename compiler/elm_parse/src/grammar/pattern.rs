use elm_ir::ast::{Pattern, PatternKind, SyntaxErrorKind};
use elm_ir::{ensure_sufficient_stack, Span};

use super::Parser;
use crate::lexer::unescape_literal;
use crate::token::TokenKind;

impl Parser<'_> {
    /// `pattern := cons ("as" name)?`
    pub(crate) fn parse_pattern(&mut self) -> Pattern {
        ensure_sufficient_stack(|| {
            let start = self.cursor.current_span().start;
            let mut pattern = self.parse_cons_pattern();
            while self.cursor.eat(TokenKind::As).is_some() {
                let Some(name) = self.cursor.eat(TokenKind::Lower) else {
                    self.error_unexpected("a name after `as`");
                    break;
                };
                pattern = Pattern::new(
                    PatternKind::Alias {
                        pattern: Box::new(pattern),
                        name: self.ident(name),
                    },
                    self.cursor.span_from(start),
                );
            }
            pattern
        })
    }

    fn parse_cons_pattern(&mut self) -> Pattern {
        let start = self.cursor.current_span().start;
        let head = self.parse_app_pattern();
        if !self.cursor.at_layout_end() && self.cursor.at_operator("::") {
            self.cursor.bump();
            let tail = self.parse_cons_pattern();
            return Pattern::new(
                PatternKind::Cons {
                    head: Box::new(head),
                    tail: Box::new(tail),
                },
                self.cursor.span_from(start),
            );
        }
        head
    }

    fn parse_app_pattern(&mut self) -> Pattern {
        if !matches!(
            self.cursor.kind(),
            TokenKind::Upper | TokenKind::QualifiedUpper
        ) {
            return self.parse_atom_pattern();
        }
        let token = self.cursor.bump();
        let mut args = Vec::new();
        while !self.cursor.at_layout_end() && self.starts_pattern_atom() {
            args.push(self.parse_atom_pattern());
        }
        Pattern::new(
            PatternKind::Ctor {
                name: self.qual_name(token),
                args,
            },
            self.cursor.span_from(token.span.start),
        )
    }

    pub(crate) fn starts_pattern_atom(&self) -> bool {
        match self.cursor.kind() {
            TokenKind::Underscore
            | TokenKind::Lower
            | TokenKind::Upper
            | TokenKind::QualifiedUpper
            | TokenKind::Int
            | TokenKind::Str
            | TokenKind::Char
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace => true,
            TokenKind::Operator => {
                self.cursor.at_operator("-") && self.cursor.peek(1).kind == TokenKind::Int
            }
            _ => false,
        }
    }

    /// A pattern that needs no parentheses: usable as a function or
    /// constructor argument.
    pub(crate) fn parse_atom_pattern(&mut self) -> Pattern {
        let token = self.cursor.current();
        let text = self.cursor.text(token);
        let kind = match token.kind {
            TokenKind::Underscore => PatternKind::Wildcard,
            TokenKind::Lower => PatternKind::Var(text.to_string()),
            TokenKind::Upper | TokenKind::QualifiedUpper => PatternKind::Ctor {
                name: self.qual_name(token),
                args: Vec::new(),
            },
            TokenKind::Int => int_pattern(text, false),
            TokenKind::Operator
                if text == "-" && self.cursor.peek(1).kind == TokenKind::Int =>
            {
                self.cursor.bump();
                let digits = self.cursor.current();
                let kind = int_pattern(self.cursor.text(digits), true);
                self.cursor.bump();
                return Pattern::new(kind, self.cursor.span_from(token.span.start));
            }
            TokenKind::Str => PatternKind::Str(unescape_literal(text)),
            TokenKind::Char => PatternKind::Char(unescape_literal(text)),
            TokenKind::LParen => return self.parse_paren_pattern(),
            TokenKind::LBracket => return self.parse_list_pattern(),
            TokenKind::LBrace => return self.parse_record_pattern(),
            _ => {
                self.error(
                    SyntaxErrorKind::UnexpectedToken,
                    format!("expected a pattern, found {}", token.kind.describe()),
                    token.span,
                );
                return Pattern::new(PatternKind::Error, Span::point(token.span.start));
            }
        };
        self.cursor.bump();
        Pattern::new(kind, token.span)
    }

    fn parse_paren_pattern(&mut self) -> Pattern {
        let open = self.cursor.bump();
        if self.cursor.eat(TokenKind::RParen).is_some() {
            return Pattern::new(PatternKind::Unit, self.cursor.span_from(open.span.start));
        }
        let first = self.parse_pattern();
        if !self.cursor.at(TokenKind::Comma) {
            self.expect_closing(TokenKind::RParen, open);
            return first;
        }
        let mut items = vec![first];
        while self.cursor.eat(TokenKind::Comma).is_some() {
            items.push(self.parse_pattern());
        }
        self.expect_closing(TokenKind::RParen, open);
        Pattern::new(
            PatternKind::Tuple(items),
            self.cursor.span_from(open.span.start),
        )
    }

    fn parse_list_pattern(&mut self) -> Pattern {
        let open = self.cursor.bump();
        let mut items = Vec::new();
        if !self.cursor.at(TokenKind::RBracket) {
            loop {
                items.push(self.parse_pattern());
                if self.cursor.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect_closing(TokenKind::RBracket, open);
        Pattern::new(
            PatternKind::List(items),
            self.cursor.span_from(open.span.start),
        )
    }

    fn parse_record_pattern(&mut self) -> Pattern {
        let open = self.cursor.bump();
        let mut fields = Vec::new();
        if !self.cursor.at(TokenKind::RBrace) {
            loop {
                let Some(name) = self.cursor.eat(TokenKind::Lower) else {
                    self.error_unexpected("a field name");
                    break;
                };
                fields.push(self.ident(name));
                if self.cursor.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect_closing(TokenKind::RBrace, open);
        Pattern::new(
            PatternKind::Record(fields),
            self.cursor.span_from(open.span.start),
        )
    }
}

fn int_pattern(text: &str, negative: bool) -> PatternKind {
    let value = match text.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => text.parse::<i64>(),
    };
    match value {
        Ok(value) if negative => PatternKind::Int(-value),
        Ok(value) => PatternKind::Int(value),
        Err(_) => PatternKind::Error,
    }
}
