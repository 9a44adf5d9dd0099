//! Recursive descent parser for Stencil templates.
//!
//! # Architecture
//!
//! The lexer hands over a flat token list in which literal text, region
//! delimiters and code tokens are interleaved. The parser treats region
//! delimiters as statement separators, so a block may open in one region
//! and close in another:
//!
//! ```text
//! <%= for (i, v) in items { %><li><%= v %></li><% } %>
//! ```
//!
//! parses to a `for` whose body holds a text statement, an interpolation
//! and another text statement.
//!
//! Expressions use one function per precedence level, lowest first:
//! `||`, `&&`, equality (`==` `!=` `~=`), comparison, additive,
//! multiplicative, prefix, then postfix call/index/member.
//!
//! All failures are returned as [`ParseError`] values carrying the line of
//! the offending token.

mod cursor;
mod error;
mod grammar;

pub use error::{ParseError, ParseErrorKind};

use stencil_ir::{Program, Token};
use stencil_lexer::{tokenize, Delimiters};
use tracing::debug;

use cursor::Cursor;

/// Parser state.
pub struct Parser {
    cursor: Cursor,
    /// Whether a `{` after a call's argument list attaches a block.
    ///
    /// Off while parsing `if` conditions and `for` iterables, where the
    /// brace opens the statement body instead.
    block_calls: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            block_calls: true,
        }
    }

    /// Parse the whole token list into a program.
    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let program = self.program()?;
        debug!(statements = program.statements.len(), "parsed program");
        Ok(program)
    }
}

/// Parse `source` with the default `<% %>` delimiters.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    parse_with(source, &Delimiters::default())
}

/// Parse `source` with a custom delimiter set.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse_with(source: &str, delimiters: &Delimiters) -> Result<Program, ParseError> {
    let tokens = tokenize(source, delimiters)?;
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests;
