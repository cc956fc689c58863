//! Error-tolerant lexer and parser for Elm source.
//!
//! [`parse`] always returns a [`ParsedModule`]: syntax errors are collected
//! alongside the tree, and malformed regions become error nodes so later
//! passes still see every well-formed declaration.

mod cursor;
mod grammar;
mod lexer;
mod token;

use elm_ir::ast::ParsedModule;
use tracing::trace;

pub use lexer::{lex, unescape_literal, LexOutput};
pub use token::{Token, TokenKind};

/// Parse one Elm module.
pub fn parse(source: &str) -> ParsedModule {
    let module = grammar::Parser::new(source).parse_module();
    trace!(
        decls = module.decls.len(),
        errors = module.errors.len(),
        "parsed module"
    );
    module
}

/// Handle for the parser, for callers that pass parsers around as values.
#[derive(Copy, Clone, Debug, Default)]
pub struct ElmParser;

impl ElmParser {
    pub fn parse(&self, source: &str) -> ParsedModule {
        parse(source)
    }
}
