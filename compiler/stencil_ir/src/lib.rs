//! Stencil IR - tokens, syntax tree and name interning.
//!
//! This crate holds the data structures shared by the lexer, parser and
//! evaluator:
//! - [`Token`] / [`TokenKind`] produced by the lexer
//! - The syntax tree ([`Program`], [`Stmt`], [`Expr`], ...) built by the parser
//! - [`InternTable`] / [`SymbolId`], the two-tier name interning used by scopes
//!
//! It has no knowledge of runtime values.

pub mod ast;
mod interner;
mod token;

pub use ast::{
    ArrayLiteral, AssignStmt, Block, BoolLiteral, CallExpr, ElseIf, Expr, ExprStmt, FloatLiteral,
    ForExpr, FunctionLiteral, HashLiteral, HoleStmt, Identifier, IfExpr, IndexExpr, InfixExpr,
    InfixOp, IntLiteral, LetStmt, MemberExpr, PrefixExpr, PrefixOp, Program, ReturnOrigin,
    ReturnStmt, Stmt, StringLiteral, TextLiteral,
};
pub use interner::{InternTable, SymbolId, Tier};
pub use token::{Token, TokenKind};
