//! Token cursor with layout tracking.
//!
//! Elm ends expressions by indentation. The cursor keeps a stack of layout
//! limits: a token that starts a line at or left of the innermost limit
//! closes the construct being parsed. Top-level declarations run at limit 0,
//! `case` branches at their branch column, `let` bindings at theirs.

use elm_ir::Span;

use crate::token::{Token, TokenKind};

pub(crate) struct Cursor<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    limits: Vec<u32>,
}

impl<'a> Cursor<'a> {
    /// `tokens` must end with an `Eof` token.
    pub(crate) fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| t.kind),
            Some(TokenKind::Eof)
        ));
        Cursor {
            source,
            tokens,
            pos: 0,
            limits: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn current(&self) -> Token {
        self.peek(0)
    }

    /// Token `n` positions ahead, clamped to `Eof`.
    pub(crate) fn peek(&self, n: usize) -> Token {
        let last = self.tokens.len().saturating_sub(1);
        self.tokens[(self.pos + n).min(last)]
    }

    #[inline]
    pub(crate) fn kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Whether the current token is the operator `text`.
    pub(crate) fn at_operator(&self, text: &str) -> bool {
        self.at(TokenKind::Operator) && self.text(self.current()) == text
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Consume the current token. `Eof` is never consumed.
    pub(crate) fn bump(&mut self) -> Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    pub(crate) fn text(&self, token: Token) -> &'a str {
        token.span.slice(self.source)
    }

    pub(crate) fn current_span(&self) -> Span {
        self.current().span
    }

    /// End of the last consumed token.
    pub(crate) fn prev_end(&self) -> u32 {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    /// Whether the current token directly follows the previous one, with no
    /// whitespace in between.
    pub(crate) fn is_adjacent(&self) -> bool {
        self.pos > 0 && self.tokens[self.pos - 1].span.end == self.current().span.start
    }

    pub(crate) fn limit(&self) -> u32 {
        self.limits.last().copied().unwrap_or(0)
    }

    pub(crate) fn push_limit(&mut self, column: u32) {
        self.limits.push(column);
    }

    pub(crate) fn pop_limit(&mut self) {
        self.limits.pop();
    }

    /// The current token closes the innermost layout block.
    pub(crate) fn at_layout_end(&self) -> bool {
        let token = self.current();
        token.kind == TokenKind::Eof || (token.first_on_line && token.column <= self.limit())
    }

    /// Whether the current token starts a new top-level declaration.
    pub(crate) fn at_top_level_start(&self) -> bool {
        let token = self.current();
        token.kind == TokenKind::Eof || (token.first_on_line && token.column == 0)
    }

    /// Skip tokens until the start of the next top-level declaration.
    ///
    /// Returns the span of the skipped region, if anything was skipped.
    pub(crate) fn skip_to_top_level(&mut self) -> Option<Span> {
        let start = self.current_span().start;
        let before = self.pos;
        while !self.at_eof() {
            self.bump();
            if self.at_top_level_start() {
                break;
            }
        }
        (self.pos > before).then(|| self.span_from(start))
    }
}
