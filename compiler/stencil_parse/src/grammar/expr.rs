//! Expression parsing: the binary precedence chain, prefix operators and
//! postfix call/index/member access.

use stencil_ir::{
    CallExpr, Expr, Identifier, IndexExpr, InfixExpr, InfixOp, MemberExpr, PrefixExpr, PrefixOp,
    TokenKind,
};
use stencil_stack::ensure_sufficient_stack;

use crate::{ParseError, Parser};

type Level = fn(&mut Parser) -> Result<Expr, ParseError>;

impl Parser {
    /// Parse an expression.
    ///
    /// Wrapped in `ensure_sufficient_stack` since templates may nest
    /// expressions arbitrarily deep.
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_or())
    }

    /// Parse an expression where `name(args) {` does not attach a block.
    pub(crate) fn parse_expression_no_block_call(&mut self) -> Result<Expr, ParseError> {
        let outer = std::mem::replace(&mut self.block_calls, false);
        let result = self.parse_expression();
        self.block_calls = outer;
        result
    }

    /// One left-associative precedence level.
    fn binary_level(
        &mut self,
        ops: &[(TokenKind, InfixOp)],
        next: Level,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;
        while let Some(&(_, op)) = ops
            .iter()
            .find(|(kind, _)| self.cursor.check(*kind))
        {
            let token = self.cursor.advance();
            let right = next(self)?;
            left = Expr::Infix(Box::new(InfixExpr {
                token,
                op,
                left,
                right,
            }));
        }
        Ok(left)
    }

    /// `||` (lowest precedence).
    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(&[(TokenKind::OrOr, InfixOp::Or)], Self::parse_and)
    }

    /// `&&`
    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(&[(TokenKind::AndAnd, InfixOp::And)], Self::parse_equality)
    }

    /// `==` `!=` `~=`
    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            &[
                (TokenKind::EqEq, InfixOp::Eq),
                (TokenKind::NotEq, InfixOp::NotEq),
                (TokenKind::Matches, InfixOp::Matches),
            ],
            Self::parse_comparison,
        )
    }

    /// `<` `<=` `>` `>=`
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            &[
                (TokenKind::Lt, InfixOp::Lt),
                (TokenKind::LtEq, InfixOp::LtEq),
                (TokenKind::Gt, InfixOp::Gt),
                (TokenKind::GtEq, InfixOp::GtEq),
            ],
            Self::parse_additive,
        )
    }

    /// `+` `-`
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            &[(TokenKind::Plus, InfixOp::Add), (TokenKind::Minus, InfixOp::Sub)],
            Self::parse_multiplicative,
        )
    }

    /// `*` `/`
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(
            &[(TokenKind::Star, InfixOp::Mul), (TokenKind::Slash, InfixOp::Div)],
            Self::parse_prefix,
        )
    }

    /// `!expr` and `-expr`
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let op = match self.cursor.current_kind() {
            TokenKind::Bang => PrefixOp::Not,
            TokenKind::Minus => PrefixOp::Neg,
            _ => return self.parse_postfix(),
        };
        let token = self.cursor.advance();
        let right = ensure_sufficient_stack(|| self.parse_prefix())?;
        Ok(Expr::Prefix(Box::new(PrefixExpr { token, op, right })))
    }

    /// Calls, indexing and member access, applied left to right.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            expr = match self.cursor.current_kind() {
                TokenKind::LParen => self.parse_call(None, expr)?,
                TokenKind::LBracket => {
                    let token = self.cursor.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket)?;
                    Expr::Index(Box::new(IndexExpr {
                        token,
                        left: expr,
                        index,
                        value: None,
                    }))
                }
                TokenKind::Dot => {
                    let token = self.cursor.advance();
                    let name = self.expect_ident()?;
                    if self.cursor.check(TokenKind::LParen) {
                        self.parse_call(Some(expr), Expr::Ident(name))?
                    } else {
                        Expr::Member(Box::new(MemberExpr {
                            token,
                            object: expr,
                            name,
                        }))
                    }
                }
                _ => return Ok(expr),
            };
        }
    }

    /// `function(args)` with an optional trailing `{ block }`.
    fn parse_call(&mut self, callee: Option<Expr>, function: Expr) -> Result<Expr, ParseError> {
        let token = function.token().clone();
        self.expect(TokenKind::LParen)?;
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        let block = if self.block_calls && self.cursor.check(TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Expr::Call(Box::new(CallExpr {
            token,
            callee,
            function,
            arguments,
            block,
        })))
    }

    /// Comma-separated expressions up to `end`; a trailing comma is allowed.
    pub(crate) fn parse_expression_list(&mut self, end: TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        if self.cursor.eat(end) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression()?);
            if self.cursor.eat(TokenKind::Comma) {
                if self.cursor.eat(end) {
                    break;
                }
                continue;
            }
            self.expect(end)?;
            break;
        }
        Ok(items)
    }

    /// Comma-separated identifiers up to `)`.
    pub(crate) fn parse_params(&mut self) -> Result<Vec<Identifier>, ParseError> {
        let mut params = Vec::new();
        if self.cursor.eat(TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            params.push(self.expect_ident()?);
            if self.cursor.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            break;
        }
        Ok(params)
    }
}
