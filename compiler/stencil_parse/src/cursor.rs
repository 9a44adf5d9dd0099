//! Token cursor for the parser.
//!
//! The token list always ends with `Eof`, and the cursor never moves past
//! it, so `current()` is always valid.

use stencil_ir::{Token, TokenKind};
use tracing::trace;

pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenKind::Eof, "", line));
        }
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn current_line(&self) -> u32 {
        self.current().line
    }

    /// Kind of the token `n` positions ahead, saturating at `Eof`.
    pub fn peek_kind_at(&self, n: usize) -> TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        self.tokens[idx].kind
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consume the current token and return it. Stays put on `Eof`.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        trace!(pos = self.pos, kind = %token.kind, line = token.line, "advance");
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }
}
