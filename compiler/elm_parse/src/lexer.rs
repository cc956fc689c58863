//! Lexer for Elm source using logos.
//!
//! Whitespace and comments are dropped, but every token records its column
//! and whether it starts a line: Elm's layout rules are driven by
//! indentation, and the parser needs both to find where expressions end.

use logos::Logos;

use elm_ir::ast::{SyntaxError, SyntaxErrorKind};
use elm_ir::Span;

use crate::token::{Token, TokenKind};

/// Raw token from logos, before punctuation is split out of operators.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"--[^\n]*", priority = 10)]
    LineComment,

    #[token("{-", block_comment)]
    BlockComment,

    #[token("module")]
    Module,
    #[token("exposing")]
    Exposing,
    #[token("import")]
    Import,
    #[token("as")]
    As,
    #[token("type")]
    Type,
    #[token("alias")]
    Alias,
    #[token("infix")]
    Infix,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("case")]
    Case,
    #[token("of")]
    Of,
    #[token("let")]
    Let,
    #[token("in")]
    In,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token("\\")]
    Backslash,
    #[token("_")]
    Underscore,

    #[regex(r"[+\-*/<>=|&\^:.!%?]+")]
    Symbol,

    #[regex(r"\.[a-z][A-Za-z0-9_]*")]
    DotField,

    #[regex(r"[a-z][A-Za-z0-9_]*")]
    Lower,
    #[regex(r"[A-Z][A-Za-z0-9_]*")]
    Upper,
    #[regex(r"([A-Z][A-Za-z0-9_]*\.)+[a-z][A-Za-z0-9_]*")]
    QualifiedLower,
    #[regex(r"([A-Z][A-Za-z0-9_]*\.)+[A-Z][A-Za-z0-9_]*")]
    QualifiedUpper,

    #[regex(r"0x[0-9a-fA-F]+")]
    HexInt,
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"[0-9]+\.[0-9]+([eE][+\-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+\-]?[0-9]+")]
    Float,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,
    #[token(r#"""""#, triple_string)]
    TripleStr,
    #[regex(r"'([^'\\\n]|\\.|\\u\{[0-9a-fA-F]+\})'")]
    Char,
}

/// Consume a possibly nested `{- ... -}` comment. The opening `{-` is
/// already matched.
fn block_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    let remainder = lex.remainder();
    match block_comment_end(remainder.as_bytes()) {
        Some(end) => {
            lex.bump(end);
            true
        }
        None => {
            let len = remainder.len();
            lex.bump(len);
            false
        }
    }
}

fn block_comment_end(bytes: &[u8]) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = 0;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'{', b'-') => {
                depth += 1;
                i += 2;
            }
            (b'-', b'}') => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// Consume a `"""` string up to its closing delimiter.
fn triple_string(lex: &mut logos::Lexer<RawToken>) -> bool {
    let remainder = lex.remainder();
    match triple_string_end(remainder.as_bytes()) {
        Some(end) => {
            lex.bump(end);
            true
        }
        None => {
            let len = remainder.len();
            lex.bump(len);
            false
        }
    }
}

fn triple_string_end(bytes: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(b"\"\"\"") {
            return Some(i + 3);
        }
        i += 1;
    }
    None
}

/// Tokens plus lexical errors.
#[derive(Debug)]
pub struct LexOutput {
    /// Always ends with an `Eof` token.
    pub tokens: Vec<Token>,
    pub errors: Vec<SyntaxError>,
}

/// Split `source` into tokens.
pub fn lex(source: &str) -> LexOutput {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut logos = RawToken::lexer(source);

    let mut line_start = 0usize;
    let mut prev_end = 0usize;
    let mut any_on_line = false;

    while let Some(result) = logos.next() {
        let range = logos.span();
        if let Some(nl) = source
            .get(prev_end..range.start)
            .and_then(|gap| gap.rfind('\n'))
        {
            line_start = prev_end + nl + 1;
            any_on_line = false;
        }
        prev_end = range.end;

        let column = source
            .get(line_start..range.start)
            .map_or(0, |before| before.chars().count());
        // Multi-line comments and strings move the line start too.
        if let Some(nl) = source.get(range.clone()).and_then(|text| text.rfind('\n')) {
            line_start = range.start + nl + 1;
        }

        let raw = match result {
            Ok(raw) => raw,
            Err(()) => {
                errors.push(lex_error(source, Span::from_range(range)));
                continue;
            }
        };
        if matches!(raw, RawToken::LineComment | RawToken::BlockComment) {
            continue;
        }

        let kind = cook(raw, source.get(range.clone()).unwrap_or_default());
        tokens.push(Token {
            kind,
            span: Span::from_range(range),
            column: u32::try_from(column).unwrap_or(u32::MAX),
            first_on_line: !any_on_line,
        });
        any_on_line = true;
    }

    let eof = Span::from_range(source.len()..source.len());
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: eof,
        column: 0,
        first_on_line: true,
    });

    LexOutput { tokens, errors }
}

fn lex_error(source: &str, span: Span) -> SyntaxError {
    let text = span.slice(source);
    let message = if text.starts_with("{-") {
        "unterminated block comment".to_string()
    } else if text.starts_with('"') {
        "unterminated string literal".to_string()
    } else if text.starts_with('\'') {
        "malformed character literal".to_string()
    } else {
        format!("unexpected character `{}`", text.chars().next().unwrap_or(' '))
    };
    SyntaxError::new(SyntaxErrorKind::InvalidCharacter, message, span)
}

/// Map a raw token to its parser kind. Symbol runs that spell reserved
/// punctuation become that punctuation.
fn cook(raw: RawToken, text: &str) -> TokenKind {
    match raw {
        RawToken::Module => TokenKind::Module,
        RawToken::Exposing => TokenKind::Exposing,
        RawToken::Import => TokenKind::Import,
        RawToken::As => TokenKind::As,
        RawToken::Type => TokenKind::Type,
        RawToken::Alias => TokenKind::Alias,
        RawToken::Infix => TokenKind::Infix,
        RawToken::If => TokenKind::If,
        RawToken::Then => TokenKind::Then,
        RawToken::Else => TokenKind::Else,
        RawToken::Case => TokenKind::Case,
        RawToken::Of => TokenKind::Of,
        RawToken::Let => TokenKind::Let,
        RawToken::In => TokenKind::In,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Backslash => TokenKind::Backslash,
        RawToken::Underscore => TokenKind::Underscore,
        RawToken::Symbol => match text {
            "=" => TokenKind::Equals,
            "|" => TokenKind::Pipe,
            "->" => TokenKind::Arrow,
            ":" => TokenKind::Colon,
            ".." => TokenKind::DotDot,
            "." => TokenKind::Dot,
            _ => TokenKind::Operator,
        },
        RawToken::DotField => TokenKind::DotField,
        RawToken::Lower => TokenKind::Lower,
        RawToken::Upper => TokenKind::Upper,
        RawToken::QualifiedLower => TokenKind::QualifiedLower,
        RawToken::QualifiedUpper => TokenKind::QualifiedUpper,
        RawToken::HexInt | RawToken::Int => TokenKind::Int,
        RawToken::Float => TokenKind::Float,
        RawToken::Str | RawToken::TripleStr => TokenKind::Str,
        RawToken::Char => TokenKind::Char,
        // Filtered out by the caller.
        RawToken::LineComment | RawToken::BlockComment => TokenKind::Eof,
    }
}

/// Decode the contents of a string or char literal, quotes included.
pub fn unescape_literal(text: &str) -> String {
    let inner = if text.starts_with(r#"""""#) && text.len() >= 6 {
        &text[3..text.len() - 3]
    } else if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        ""
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars
                    .by_ref()
                    .skip_while(|c| *c == '{')
                    .take_while(|c| *c != '}')
                    .collect();
                if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
