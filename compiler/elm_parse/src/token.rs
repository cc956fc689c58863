//! Cooked tokens handed to the parser.

use elm_ir::Span;

/// Token kinds after keyword and punctuation classification.
///
/// Tokens carry no payload; the parser slices the source by span when it
/// needs the text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Module,
    Exposing,
    Import,
    As,
    Type,
    Alias,
    Infix,
    If,
    Then,
    Else,
    Case,
    Of,
    Let,
    In,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Backslash,
    Underscore,
    Equals,
    Pipe,
    Arrow,
    Colon,
    DotDot,
    Dot,

    // Names
    Lower,
    Upper,
    /// `List.map`
    QualifiedLower,
    /// `Html.Attributes` or `Maybe.Just`
    QualifiedUpper,
    /// `.field`
    DotField,

    // Literals
    Int,
    Float,
    Str,
    Char,

    /// Any other run of symbol characters: `+`, `|>`, `::`, `<|`.
    Operator,

    Eof,
}

impl TokenKind {
    /// Human-readable description for error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Module => "`module`",
            TokenKind::Exposing => "`exposing`",
            TokenKind::Import => "`import`",
            TokenKind::As => "`as`",
            TokenKind::Type => "`type`",
            TokenKind::Alias => "`alias`",
            TokenKind::Infix => "`infix`",
            TokenKind::If => "`if`",
            TokenKind::Then => "`then`",
            TokenKind::Else => "`else`",
            TokenKind::Case => "`case`",
            TokenKind::Of => "`of`",
            TokenKind::Let => "`let`",
            TokenKind::In => "`in`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Backslash => "`\\`",
            TokenKind::Underscore => "`_`",
            TokenKind::Equals => "`=`",
            TokenKind::Pipe => "`|`",
            TokenKind::Arrow => "`->`",
            TokenKind::Colon => "`:`",
            TokenKind::DotDot => "`..`",
            TokenKind::Dot => "`.`",
            TokenKind::Lower | TokenKind::QualifiedLower => "a name",
            TokenKind::Upper | TokenKind::QualifiedUpper => "an uppercase name",
            TokenKind::DotField => "a field accessor",
            TokenKind::Int | TokenKind::Float => "a number",
            TokenKind::Str => "a string",
            TokenKind::Char => "a character",
            TokenKind::Operator => "an operator",
            TokenKind::Eof => "end of file",
        }
    }
}

/// A token with layout information.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 0-based column (in chars) of the token start.
    pub column: u32,
    /// No other token precedes this one on its line.
    pub first_on_line: bool,
}

impl Token {
    /// Whether the token starts an atom (something a function can be
    /// applied to).
    pub fn starts_atom(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Lower
                | TokenKind::Upper
                | TokenKind::QualifiedLower
                | TokenKind::QualifiedUpper
                | TokenKind::DotField
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::Str
                | TokenKind::Char
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
        )
    }
}
