//! Statement and block parsing.
//!
//! - `mod.rs`: program, statements, blocks
//! - `expr.rs`: precedence chain, prefix and postfix operators
//! - `primary.rs`: literals, `if`, `for`, function literals

mod expr;
mod primary;

use stencil_ir::{
    AssignStmt, Block, Expr, ExprStmt, HoleStmt, Identifier, LetStmt, Program, ReturnOrigin,
    ReturnStmt, Stmt, TextLiteral, Token, TokenKind,
};

use crate::{ParseError, ParseErrorKind, Parser};

/// Where a statement list lives.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Nesting {
    TopLevel,
    Block,
}

fn expected_name(kind: TokenKind) -> String {
    match kind {
        TokenKind::Ident => "identifier".to_string(),
        kind => format!("'{kind}'"),
    }
}

impl Parser {
    pub(crate) fn program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.cursor.is_at_end() {
            if let Some(stmt) = self.statement(Nesting::TopLevel)? {
                statements.push(stmt);
            }
        }
        Ok(Program { statements })
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.cursor.check(kind) {
            Ok(self.cursor.advance())
        } else {
            Err(ParseError::unexpected(
                expected_name(kind),
                self.cursor.current(),
            ))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<Identifier, ParseError> {
        self.expect(TokenKind::Ident).map(Identifier::new)
    }

    /// Parse one statement.
    ///
    /// Region delimiters and stray semicolons separate statements; they are
    /// consumed here and produce `None`.
    fn statement(&mut self, nesting: Nesting) -> Result<Option<Stmt>, ParseError> {
        let token = self.cursor.current().clone();
        let stmt = match token.kind {
            TokenKind::StmtStart | TokenKind::RegionEnd | TokenKind::Semicolon => {
                self.cursor.advance();
                return Ok(None);
            }
            TokenKind::Text => {
                self.cursor.advance();
                let value = token.literal.clone();
                Stmt::Expr(ExprStmt {
                    token: token.clone(),
                    expr: Expr::Text(TextLiteral { token, value }),
                })
            }
            TokenKind::Hole => {
                if nesting == Nesting::Block {
                    return Err(ParseError::new(token.line, ParseErrorKind::HoleNotAllowed));
                }
                self.cursor.advance();
                Stmt::Hole(HoleStmt {
                    input: token.literal.clone(),
                    token,
                })
            }
            TokenKind::ExprStart => self.interpolation()?,
            TokenKind::Let => self.let_statement()?,
            TokenKind::Return => self.return_statement()?,
            TokenKind::Break => {
                self.cursor.advance();
                Stmt::Break(token)
            }
            TokenKind::Continue => {
                self.cursor.advance();
                Stmt::Continue(token)
            }
            TokenKind::Ident if self.cursor.peek_kind_at(1) == TokenKind::Assign => {
                self.assign_statement()?
            }
            _ => self.expression_statement()?,
        };
        Ok(Some(stmt))
    }

    /// `<%= expr %>`: prints `expr` without ending the enclosing block.
    fn interpolation(&mut self) -> Result<Stmt, ParseError> {
        let token = self.cursor.advance();
        let value = if matches!(
            self.cursor.current_kind(),
            TokenKind::RegionEnd | TokenKind::Eof
        ) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.cursor.eat(TokenKind::Semicolon);
        if !self.cursor.eat(TokenKind::RegionEnd) && !self.cursor.is_at_end() {
            return Err(ParseError::unexpected(
                "end of expression region",
                self.cursor.current(),
            ));
        }
        Ok(Stmt::Return(ReturnStmt {
            token,
            origin: ReturnOrigin::Interpolation,
            value,
        }))
    }

    fn let_statement(&mut self) -> Result<Stmt, ParseError> {
        let token = self.cursor.advance();
        let name = self.expect_ident()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        self.cursor.eat(TokenKind::Semicolon);
        Ok(Stmt::Let(LetStmt { token, name, value }))
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let token = self.cursor.advance();
        let value = match self.cursor.current_kind() {
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::RegionEnd | TokenKind::Eof => {
                None
            }
            _ => Some(self.parse_expression()?),
        };
        self.cursor.eat(TokenKind::Semicolon);
        Ok(Stmt::Return(ReturnStmt {
            token,
            origin: ReturnOrigin::Keyword,
            value,
        }))
    }

    fn assign_statement(&mut self) -> Result<Stmt, ParseError> {
        let name = self.expect_ident()?;
        let token = self.expect(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        self.cursor.eat(TokenKind::Semicolon);
        Ok(Stmt::Assign(AssignStmt { token, name, value }))
    }

    /// A bare expression, or `a[k] = v` when an index is followed by `=`.
    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let token = self.cursor.current().clone();
        let mut expr = self.parse_expression()?;
        if self.cursor.check(TokenKind::Assign) {
            let assign = self.cursor.advance();
            match &mut expr {
                Expr::Index(index) if index.value.is_none() => {
                    index.value = Some(self.parse_expression()?);
                }
                other => {
                    return Err(ParseError::new(
                        assign.line,
                        ParseErrorKind::InvalidAssignmentTarget {
                            target: other.to_string(),
                        },
                    ));
                }
            }
        }
        self.cursor.eat(TokenKind::Semicolon);
        Ok(Stmt::Expr(ExprStmt { token, expr }))
    }

    /// `{ statements }`. Statements may cross region boundaries.
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let token = self.expect(TokenKind::LBrace)?;
        let outer = std::mem::replace(&mut self.block_calls, true);
        let mut statements = Vec::new();
        loop {
            match self.cursor.current_kind() {
                TokenKind::RBrace => {
                    self.cursor.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        self.cursor.current_line(),
                        ParseErrorKind::UnclosedBlock,
                    ));
                }
                _ => {
                    if let Some(stmt) = self.statement(Nesting::Block)? {
                        statements.push(stmt);
                    }
                }
            }
        }
        self.block_calls = outer;
        Ok(Block { token, statements })
    }
}
