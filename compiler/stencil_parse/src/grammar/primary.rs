//! Primary expressions: literals, identifiers, grouping, `if`, `for`,
//! function literals, array and hash literals.

use std::sync::Arc;

use stencil_ir::{
    ArrayLiteral, BoolLiteral, ElseIf, Expr, FloatLiteral, ForExpr, FunctionLiteral, HashLiteral,
    Identifier, IfExpr, IntLiteral, StringLiteral, TokenKind,
};
use tracing::trace;

use crate::{ParseError, ParseErrorKind, Parser};

impl Parser {
    pub(crate) fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.cursor.current().clone();
        trace!(kind = %token.kind, line = token.line, "parse_primary");
        let expr = match token.kind {
            TokenKind::Ident => {
                self.cursor.advance();
                Expr::Ident(Identifier::new(token))
            }
            TokenKind::Int => {
                self.cursor.advance();
                let value = token.literal.parse::<i64>().map_err(|_| {
                    ParseError::new(
                        token.line,
                        ParseErrorKind::InvalidNumber {
                            literal: token.literal.clone(),
                        },
                    )
                })?;
                Expr::Int(IntLiteral { token, value })
            }
            TokenKind::Float => {
                self.cursor.advance();
                let value = token.literal.parse::<f64>().map_err(|_| {
                    ParseError::new(
                        token.line,
                        ParseErrorKind::InvalidNumber {
                            literal: token.literal.clone(),
                        },
                    )
                })?;
                Expr::Float(FloatLiteral { token, value })
            }
            TokenKind::String => {
                self.cursor.advance();
                let value = token.literal.clone();
                Expr::Str(StringLiteral { token, value })
            }
            TokenKind::True | TokenKind::False => {
                self.cursor.advance();
                let value = token.kind == TokenKind::True;
                Expr::Bool(BoolLiteral { token, value })
            }
            TokenKind::Nil => {
                self.cursor.advance();
                Expr::Nil(token)
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let outer = std::mem::replace(&mut self.block_calls, true);
                let inner = self.parse_expression();
                self.block_calls = outer;
                let inner = inner?;
                self.expect(TokenKind::RParen)?;
                inner
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let elements = self.parse_expression_list(TokenKind::RBracket)?;
                Expr::Array(ArrayLiteral { token, elements })
            }
            TokenKind::LBrace => self.parse_hash()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Fn => self.parse_function()?,
            _ => return Err(ParseError::expected_expression(&token)),
        };
        Ok(expr)
    }

    /// `{key: value, ...}`. Bare identifier keys are taken as strings.
    fn parse_hash(&mut self) -> Result<Expr, ParseError> {
        let token = self.expect(TokenKind::LBrace)?;
        let mut pairs = Vec::new();
        while !self.cursor.eat(TokenKind::RBrace) {
            let key = if self.cursor.check(TokenKind::Ident)
                && self.cursor.peek_kind_at(1) == TokenKind::Colon
            {
                let key_token = self.cursor.advance();
                let value = key_token.literal.clone();
                Expr::Str(StringLiteral {
                    token: key_token,
                    value,
                })
            } else {
                self.parse_expression()?
            };
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            pairs.push((key, value));
            if !self.cursor.eat(TokenKind::Comma) {
                self.expect(TokenKind::RBrace)?;
                break;
            }
        }
        Ok(Expr::Hash(HashLiteral { token, pairs }))
    }

    /// `if cond { } else if cond { } else { }`
    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        let token = self.expect(TokenKind::If)?;
        let condition = self.parse_expression_no_block_call()?;
        let consequence = self.parse_block()?;
        let mut else_ifs = Vec::new();
        let mut alternative = None;
        while self.cursor.eat(TokenKind::Else) {
            if self.cursor.eat(TokenKind::If) {
                let condition = self.parse_expression_no_block_call()?;
                let block = self.parse_block()?;
                else_ifs.push(ElseIf { condition, block });
            } else {
                alternative = Some(self.parse_block()?);
                break;
            }
        }
        Ok(Expr::If(Box::new(IfExpr {
            token,
            condition,
            consequence,
            else_ifs,
            alternative,
        })))
    }

    /// `for (key) in iterable { }` or `for (key, value) in iterable { }`
    fn parse_for(&mut self) -> Result<Expr, ParseError> {
        let token = self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;
        let key = self.expect_ident()?;
        let value = if self.cursor.eat(TokenKind::Comma) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::In)?;
        let iterable = self.parse_expression_no_block_call()?;
        let body = self.parse_block()?;
        Ok(Expr::For(Box::new(ForExpr {
            token,
            key,
            value,
            iterable,
            body,
        })))
    }

    /// `fn(a, b) { body }`
    fn parse_function(&mut self) -> Result<Expr, ParseError> {
        let token = self.expect(TokenKind::Fn)?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        let body = Arc::new(self.parse_block()?);
        Ok(Expr::Function(FunctionLiteral {
            token,
            params,
            body,
        }))
    }
}
