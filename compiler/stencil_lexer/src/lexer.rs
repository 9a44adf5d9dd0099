//! The two-mode scanner.
//!
//! In text mode the lexer emits runs of raw text up to the next region
//! opener. In code mode it emits language tokens until the region closer.
//! Comment regions are dropped here; hole regions are captured verbatim as a
//! single token.

use std::fmt;

use memchr::memmem;
use stencil_ir::{Token, TokenKind};

use crate::Delimiters;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Mode {
    Text,
    Code,
}

/// What went wrong while lexing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LexErrorKind {
    /// Missing closing `"` or `` ` ``.
    UnterminatedString,
    /// A character that starts no token.
    IllegalCharacter(char),
}

/// A lexing failure at a 1-based line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LexError {
    pub line: u32,
    pub kind: LexErrorKind,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::UnterminatedString => f.write_str("unterminated string literal"),
            LexErrorKind::IllegalCharacter(c) => write!(f, "illegal character {c:?}"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for LexError {}

/// Streaming lexer over one template source.
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
    line: u32,
    mode: Mode,
    delimiters: Delimiters,
    error: Option<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a lexer using the default `<% %>` delimiter set.
    pub fn new(source: &'src str) -> Self {
        Self::with_delimiters(source, Delimiters::default())
    }

    pub fn with_delimiters(source: &'src str, delimiters: Delimiters) -> Self {
        Lexer {
            source,
            pos: 0,
            line: 1,
            mode: Mode::Text,
            delimiters,
            error: None,
        }
    }

    /// The error behind the most recent `Illegal` token, if any.
    pub fn error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }

    /// Return the next token. Once input is exhausted this returns `Eof` forever.
    pub fn next_token(&mut self) -> Token {
        match self.mode {
            Mode::Text => self.lex_text(),
            Mode::Code => self.lex_code(),
        }
    }

    #[inline]
    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn eof(&self) -> Token {
        Token::new(TokenKind::Eof, "", self.line)
    }

    /// Move the cursor to `to`, counting newlines in between.
    fn advance_to(&mut self, to: usize) {
        let skipped = &self.source.as_bytes()[self.pos..to];
        self.line += count_newlines(skipped);
        self.pos = to;
    }

    fn illegal(&mut self, kind: LexErrorKind, line: u32) -> Token {
        let message = kind.to_string();
        self.error = Some(LexError { line, kind });
        // Nothing after an illegal token is meaningful.
        self.pos = self.source.len();
        Token::new(TokenKind::Illegal, message, line)
    }

    // Text mode

    fn lex_text(&mut self) -> Token {
        loop {
            if self.pos >= self.source.len() {
                return self.eof();
            }
            let line = self.line;
            let (text, stop) = self.scan_text();
            if stop > self.pos || !text.is_empty() {
                self.advance_to(stop);
                if !text.is_empty() {
                    return Token::new(TokenKind::Text, text, line);
                }
                continue;
            }
            // At a region opener.
            if let Some(token) = self.lex_opener() {
                return token;
            }
        }
    }

    /// Collect literal text from the cursor up to the next live region opener.
    ///
    /// An odd run of backslashes before an opener escapes it; each pair of
    /// backslashes collapses to one.
    fn scan_text(&self) -> (String, usize) {
        let bytes = self.source.as_bytes();
        let start = self.delimiters.start().as_bytes();
        let finder = memmem::Finder::new(start);
        let mut text = String::new();
        let mut scan = self.pos;
        loop {
            let Some(offset) = finder.find(&bytes[scan..]) else {
                text.push_str(&self.source[scan..]);
                return (text, self.source.len());
            };
            let at = scan + offset;
            let slashes = bytes[scan..at]
                .iter()
                .rev()
                .take_while(|&&b| b == b'\\')
                .count();
            text.push_str(&self.source[scan..at - slashes]);
            for _ in 0..slashes / 2 {
                text.push('\\');
            }
            if slashes % 2 == 1 {
                text.push_str(self.delimiters.start());
                scan = at + start.len();
                continue;
            }
            return (text, at);
        }
    }

    /// Consume the region opener at the cursor.
    ///
    /// Returns `None` for a comment, which produces no token.
    fn lex_opener(&mut self) -> Option<Token> {
        let line = self.line;
        let rest = self.rest();
        if rest.starts_with(self.delimiters.comment_start()) {
            let body_start = self.pos + self.delimiters.comment_start().len();
            let after = self.find_comment_end(body_start).map_or(self.source.len(), |end| {
                end + self.delimiters.end().len()
            });
            self.advance_to(after);
            return None;
        }
        if rest.starts_with(self.delimiters.hole_start()) {
            let body_start = self.pos + self.delimiters.hole_start().len();
            let (body_end, after) = match self.find_region_end(body_start) {
                Some(end) => (end, end + self.delimiters.end().len()),
                None => (self.source.len(), self.source.len()),
            };
            let body = self.source[body_start..body_end].to_string();
            self.advance_to(after);
            return Some(Token::new(TokenKind::Hole, body, line));
        }
        let (kind, opener) = if rest.starts_with(self.delimiters.expr_start()) {
            (TokenKind::ExprStart, self.delimiters.expr_start())
        } else {
            (TokenKind::StmtStart, self.delimiters.start())
        };
        let literal = opener.to_string();
        self.pos += opener.len();
        self.mode = Mode::Code;
        Some(Token::new(kind, literal, line))
    }

    fn find_region_end(&self, from: usize) -> Option<usize> {
        memmem::find(&self.source.as_bytes()[from..], self.delimiters.end().as_bytes())
            .map(|offset| from + offset)
    }

    /// Find the closer of a comment body starting at `from`.
    ///
    /// Every region opener inside the body nests one level deeper, so the
    /// comment only ends at the closer that balances its own opener.
    fn find_comment_end(&self, from: usize) -> Option<usize> {
        let bytes = self.source.as_bytes();
        let opener = memmem::Finder::new(self.delimiters.start().as_bytes());
        let closer = memmem::Finder::new(self.delimiters.end().as_bytes());
        let mut depth = 1usize;
        let mut scan = from;
        loop {
            let end = scan + closer.find(&bytes[scan..])?;
            match opener.find(&bytes[scan..end]) {
                Some(offset) => {
                    depth += 1;
                    scan += offset + self.delimiters.start().len();
                }
                None => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(end);
                    }
                    scan = end + self.delimiters.end().len();
                }
            }
        }
    }

    // Code mode

    fn skip_whitespace(&mut self) {
        let skip = self
            .rest()
            .bytes()
            .take_while(u8::is_ascii_whitespace)
            .count();
        self.advance_to(self.pos + skip);
    }

    fn lex_code(&mut self) -> Token {
        self.skip_whitespace();
        let line = self.line;
        let rest = self.rest();
        let Some(c) = rest.chars().next() else {
            return self.eof();
        };

        if rest.starts_with(self.delimiters.end()) {
            let literal = self.delimiters.end().to_string();
            self.pos += literal.len();
            self.mode = Mode::Text;
            return Token::new(TokenKind::RegionEnd, literal, line);
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return self.lex_ident(line);
        }
        if c.is_ascii_digit() {
            return self.lex_number(line);
        }
        match c {
            '"' => return self.lex_string(line),
            '`' => return self.lex_raw_string(line),
            _ => {}
        }

        if let Some(kind) = two_char_operator(rest) {
            let literal = rest[..2].to_string();
            self.pos += 2;
            return Token::new(kind, literal, line);
        }
        if let Some(kind) = one_char_operator(c) {
            self.pos += 1;
            return Token::new(kind, c.to_string(), line);
        }
        self.illegal(LexErrorKind::IllegalCharacter(c), line)
    }

    fn lex_ident(&mut self, line: u32) -> Token {
        let len = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        let word = &self.source[self.pos..self.pos + len];
        self.pos += len;
        let kind = TokenKind::keyword(word).unwrap_or(TokenKind::Ident);
        Token::new(kind, word, line)
    }

    fn lex_number(&mut self, line: u32) -> Token {
        let bytes = self.rest().as_bytes();
        let mut len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
        let mut kind = TokenKind::Int;
        if bytes.get(len) == Some(&b'.') && bytes.get(len + 1).is_some_and(u8::is_ascii_digit) {
            kind = TokenKind::Float;
            len += 1 + bytes[len + 1..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
        }
        let literal = &self.source[self.pos..self.pos + len];
        self.pos += len;
        Token::new(kind, literal, line)
    }

    fn lex_string(&mut self, line: u32) -> Token {
        let mut value = String::new();
        let mut chars = self.rest().char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.advance_to(self.pos + i + 1);
                    return Token::new(TokenKind::String, value, line);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, e @ ('\\' | '"' | '\''))) => value.push(e),
                    Some((_, other)) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => break,
                },
                _ => value.push(c),
            }
        }
        self.illegal(LexErrorKind::UnterminatedString, line)
    }

    fn lex_raw_string(&mut self, line: u32) -> Token {
        let body_start = self.pos + 1;
        match memchr::memchr(b'`', &self.source.as_bytes()[body_start..]) {
            Some(len) => {
                let value = self.source[body_start..body_start + len].to_string();
                self.advance_to(body_start + len + 1);
                Token::new(TokenKind::String, value, line)
            }
            None => self.illegal(LexErrorKind::UnterminatedString, line),
        }
    }
}

fn count_newlines(bytes: &[u8]) -> u32 {
    u32::try_from(memchr::memchr_iter(b'\n', bytes).count()).unwrap_or(u32::MAX)
}

fn two_char_operator(rest: &str) -> Option<TokenKind> {
    let kind = match rest.as_bytes().get(..2)? {
        b"==" => TokenKind::EqEq,
        b"!=" => TokenKind::NotEq,
        b"<=" => TokenKind::LtEq,
        b">=" => TokenKind::GtEq,
        b"~=" => TokenKind::Matches,
        b"&&" => TokenKind::AndAnd,
        b"||" => TokenKind::OrOr,
        _ => return None,
    };
    Some(kind)
}

fn one_char_operator(c: char) -> Option<TokenKind> {
    let kind = match c {
        '=' => TokenKind::Assign,
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '!' => TokenKind::Bang,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '<' => TokenKind::Lt,
        '>' => TokenKind::Gt,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        ':' => TokenKind::Colon,
        '.' => TokenKind::Dot,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        _ => return None,
    };
    Some(kind)
}

/// Lex `source` to completion, stopping at the first error.
///
/// The returned list always ends with an `Eof` token.
pub fn tokenize(source: &str, delimiters: &Delimiters) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::with_delimiters(source, delimiters.clone());
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Illegal => {
                return Err(lexer.error.take().unwrap_or(LexError {
                    line: token.line,
                    kind: LexErrorKind::UnterminatedString,
                }));
            }
            TokenKind::Eof => {
                tokens.push(token);
                return Ok(tokens);
            }
            _ => tokens.push(token),
        }
    }
}
