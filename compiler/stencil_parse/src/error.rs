//! Parse error types.

use std::fmt;

use stencil_ir::{Token, TokenKind};
use stencil_lexer::{LexError, LexErrorKind};

/// What went wrong while parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// The lexer rejected the source.
    Lex(LexErrorKind),
    /// A specific token was required and something else was found.
    UnexpectedToken { expected: String, found: String },
    /// No expression can start with the found token.
    ExpectedExpression { found: String },
    /// A numeric literal did not fit its type.
    InvalidNumber { literal: String },
    /// A hole region appeared inside a block.
    HoleNotAllowed,
    /// Input ended inside a `{ ... }` block.
    UnclosedBlock,
    /// The left side of `=` cannot be assigned to.
    InvalidAssignmentTarget { target: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Lex(kind) => write!(f, "{kind}"),
            ParseErrorKind::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ParseErrorKind::ExpectedExpression { found } => {
                write!(f, "expected an expression, found {found}")
            }
            ParseErrorKind::InvalidNumber { literal } => {
                write!(f, "could not parse {literal:?} as a number")
            }
            ParseErrorKind::HoleNotAllowed => {
                f.write_str("hole regions are only allowed at the top level of a template")
            }
            ParseErrorKind::UnclosedBlock => {
                f.write_str("unexpected end of input: block is missing its closing '}'")
            }
            ParseErrorKind::InvalidAssignmentTarget { target } => {
                write!(f, "cannot assign to {target}")
            }
        }
    }
}

/// A parse failure at a 1-based line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    pub line: u32,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: u32, kind: ParseErrorKind) -> Self {
        ParseError { line, kind }
    }

    #[cold]
    pub fn unexpected(expected: impl Into<String>, found: &Token) -> Self {
        ParseError::new(
            found.line,
            ParseErrorKind::UnexpectedToken {
                expected: expected.into(),
                found: describe(found),
            },
        )
    }

    #[cold]
    pub fn expected_expression(found: &Token) -> Self {
        ParseError::new(
            found.line,
            ParseErrorKind::ExpectedExpression {
                found: describe(found),
            },
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(err.line, ParseErrorKind::Lex(err.kind))
    }
}

/// Describe a token for an error message.
pub(crate) fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Ident | TokenKind::Int | TokenKind::Float | TokenKind::String => {
            format!("{} {:?}", token.kind, token.literal)
        }
        TokenKind::Text => "template text".to_string(),
        TokenKind::Hole => "hole region".to_string(),
        TokenKind::Eof => "end of input".to_string(),
        kind if token.literal.trim().is_empty() => format!("'{kind}'"),
        _ => format!("'{}'", token.literal.trim()),
    }
}
