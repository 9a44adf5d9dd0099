//! Syntax tree for Stencil templates.
//!
//! Every node keeps the token it started at, so evaluation errors can report
//! the line of the offending node. Nodes implement `Display` to reconstruct a
//! normalized source form (see `display.rs`).
//!
//! # Ownership
//!
//! The tree is an ordinary owned tree (`Box` children). Function literal
//! bodies are `Arc<Block>` because a function value can outlive the render
//! that created it, e.g. when a helper stores it in a shared context.

mod display;

use std::sync::Arc;

use crate::Token;

/// Root of a parsed template: the ordered top-level statements.
///
/// Immutable after a successful parse.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    /// Number of hole regions at the top level.
    pub fn hole_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| matches!(s, Stmt::Hole(_)))
            .count()
    }
}

/// A brace-delimited (or region-delimited) sequence of statements.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub token: Token,
    pub statements: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Let(LetStmt),
    Return(ReturnStmt),
    Expr(ExprStmt),
    Block(Block),
    /// `name = value` on an already declared name.
    Assign(AssignStmt),
    Break(Token),
    Continue(Token),
    /// A deferred region, rendered after the main pass.
    Hole(HoleStmt),
}

impl Stmt {
    pub fn token(&self) -> &Token {
        match self {
            Stmt::Let(s) => &s.token,
            Stmt::Return(s) => &s.token,
            Stmt::Expr(s) => &s.token,
            Stmt::Block(b) => &b.token,
            Stmt::Assign(s) => &s.token,
            Stmt::Break(t) | Stmt::Continue(t) => t,
            Stmt::Hole(s) => &s.token,
        }
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.token().line
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LetStmt {
    pub token: Token,
    pub name: Identifier,
    pub value: Expr,
}

/// Where a return statement came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReturnOrigin {
    /// The `return` keyword: ends the enclosing block.
    Keyword,
    /// An expression region (`<%= expr %>`): prints and keeps going.
    Interpolation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStmt {
    pub token: Token,
    pub origin: ReturnOrigin,
    pub value: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExprStmt {
    pub token: Token,
    pub expr: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignStmt {
    pub token: Token,
    pub name: Identifier,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HoleStmt {
    pub token: Token,
    /// Verbatim region body, rendered later as an expression region.
    pub input: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Ident(Identifier),
    Int(IntLiteral),
    Float(FloatLiteral),
    Str(StringLiteral),
    Bool(BoolLiteral),
    Nil(Token),
    /// Literal template text, written verbatim.
    Text(TextLiteral),
    Array(ArrayLiteral),
    Hash(HashLiteral),
    Prefix(Box<PrefixExpr>),
    Infix(Box<InfixExpr>),
    Index(Box<IndexExpr>),
    Member(Box<MemberExpr>),
    Call(Box<CallExpr>),
    If(Box<IfExpr>),
    For(Box<ForExpr>),
    Function(FunctionLiteral),
}

impl Expr {
    pub fn token(&self) -> &Token {
        match self {
            Expr::Ident(e) => &e.token,
            Expr::Int(e) => &e.token,
            Expr::Float(e) => &e.token,
            Expr::Str(e) => &e.token,
            Expr::Bool(e) => &e.token,
            Expr::Nil(t) => t,
            Expr::Text(e) => &e.token,
            Expr::Array(e) => &e.token,
            Expr::Hash(e) => &e.token,
            Expr::Prefix(e) => &e.token,
            Expr::Infix(e) => &e.token,
            Expr::Index(e) => &e.token,
            Expr::Member(e) => &e.token,
            Expr::Call(e) => &e.token,
            Expr::If(e) => &e.token,
            Expr::For(e) => &e.token,
            Expr::Function(e) => &e.token,
        }
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.token().line
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        let name = token.literal.clone();
        Identifier { token, name }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntLiteral {
    pub token: Token,
    pub value: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FloatLiteral {
    pub token: Token,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringLiteral {
    pub token: Token,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoolLiteral {
    pub token: Token,
    pub value: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextLiteral {
    pub token: Token,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayLiteral {
    pub token: Token,
    pub elements: Vec<Expr>,
}

/// `{key: value, ...}` with keys in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct HashLiteral {
    pub token: Token,
    pub pairs: Vec<(Expr, Expr)>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrefixOp {
    Not,
    Neg,
}

impl PrefixOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            PrefixOp::Not => "!",
            PrefixOp::Neg => "-",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrefixExpr {
    pub token: Token,
    pub op: PrefixOp,
    pub right: Expr,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Matches,
    And,
    Or,
}

impl InfixOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Lt => "<",
            InfixOp::LtEq => "<=",
            InfixOp::Gt => ">",
            InfixOp::GtEq => ">=",
            InfixOp::Matches => "~=",
            InfixOp::And => "&&",
            InfixOp::Or => "||",
        }
    }

    /// Operators whose operands are only tested for truthiness or equality.
    ///
    /// An unknown identifier in these positions reads as `nil`.
    pub fn tolerates_unknown(self) -> bool {
        matches!(
            self,
            InfixOp::Eq | InfixOp::NotEq | InfixOp::And | InfixOp::Or
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InfixExpr {
    pub token: Token,
    pub op: InfixOp,
    pub left: Expr,
    pub right: Expr,
}

/// `left[index]`, or `left[index] = value` when `value` is set.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexExpr {
    pub token: Token,
    pub left: Expr,
    pub index: Expr,
    pub value: Option<Expr>,
}

/// `object.name`
#[derive(Clone, Debug, PartialEq)]
pub struct MemberExpr {
    pub token: Token,
    pub object: Expr,
    pub name: Identifier,
}

/// A call. For `a.B(x)` the callee is `a` and the function is `B`.
#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub token: Token,
    pub callee: Option<Expr>,
    pub function: Expr,
    pub arguments: Vec<Expr>,
    pub block: Option<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElseIf {
    pub condition: Expr,
    pub block: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfExpr {
    pub token: Token,
    pub condition: Expr,
    pub consequence: Block,
    pub else_ifs: Vec<ElseIf>,
    pub alternative: Option<Block>,
}

/// `for (key) in iterable { body }` or `for (key, value) in iterable { body }`.
#[derive(Clone, Debug, PartialEq)]
pub struct ForExpr {
    pub token: Token,
    pub key: Identifier,
    pub value: Option<Identifier>,
    pub iterable: Expr,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionLiteral {
    pub token: Token,
    pub params: Vec<Identifier>,
    pub body: Arc<Block>,
}
