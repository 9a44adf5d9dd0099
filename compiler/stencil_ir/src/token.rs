//! Token types for the Stencil lexer.
//!
//! A token is a plain `{kind, literal, line}` triple. Literal payloads (numbers,
//! string contents, identifier names, raw text) stay in `literal` as source text;
//! the parser converts them when it builds the tree.

use std::fmt;

/// Token kinds.
///
/// Region delimiters are kinds of their own so the parser never has to look
/// at the delimiter spelling, which is configurable.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TokenKind {
    /// A lexing failure; `literal` holds the message.
    Illegal,
    /// End of input. Returned forever once the source is exhausted.
    Eof,

    /// Literal template text outside any code region.
    Text,
    Ident,
    Int,
    Float,
    /// String literal, already unescaped (quote form) or verbatim (backtick form).
    String,

    /// Statement region opener, `<%` by default.
    StmtStart,
    /// Expression region opener, `<%=` by default.
    ExprStart,
    /// Hole region. `literal` carries the verbatim body up to the region end.
    Hole,
    /// Region closer, `%>` by default.
    RegionEnd,

    // Keywords
    Fn,
    Let,
    True,
    False,
    Nil,
    If,
    Else,
    Return,
    For,
    In,
    Break,
    Continue,

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Star,
    Slash,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,
    /// `~=`, regular-expression match.
    Matches,
    AndAnd,
    OrOr,

    // Punctuation
    Comma,
    Semicolon,
    Colon,
    Dot,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
}

impl TokenKind {
    /// Human-readable name used in parse errors.
    pub fn display_name(self) -> &'static str {
        match self {
            TokenKind::Illegal => "illegal token",
            TokenKind::Eof => "end of input",
            TokenKind::Text => "text",
            TokenKind::Ident => "identifier",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::StmtStart => "statement region",
            TokenKind::ExprStart => "expression region",
            TokenKind::Hole => "hole region",
            TokenKind::RegionEnd => "region end",
            TokenKind::Fn => "fn",
            TokenKind::Let => "let",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Nil => "nil",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Return => "return",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Matches => "~=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
        }
    }

    /// Map an identifier spelling to its keyword kind, if it is one.
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "fn" | "func" => TokenKind::Fn,
            "let" => TokenKind::Let,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nil" => TokenKind::Nil,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "return" => TokenKind::Return,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A token with the 1-based line it started on.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: u32,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: u32) -> Self {
        Token {
            kind,
            literal: literal.into(),
            line,
        }
    }

    /// Create a token with no meaningful position, for tests and synthesized nodes.
    pub fn dummy(kind: TokenKind) -> Self {
        Token::new(kind, kind.display_name(), 0)
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?}) @ line {}", self.kind, self.literal, self.line)
    }
}
