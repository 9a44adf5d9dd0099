//! Blocks and the statements inside them.

use stencil_ir::{Block, Expr, ReturnOrigin, ReturnStmt, Stmt};

use super::Interpreter;
use crate::errors::{unknown_identifier, ControlAction, EvalResult};
use crate::escape::write_value;
use crate::value::Value;

impl Interpreter {
    /// Run `block` in a new scope and return its output.
    ///
    /// A `return` escaping a statement is re-raised with this block's output
    /// so far prepended.
    pub(crate) fn eval_block(&mut self, block: &Block) -> EvalResult<String> {
        self.with_scope(|scoped| scoped.run_statements(block))
    }

    /// Run `block` in the current scope.
    pub(crate) fn run_statements(&mut self, block: &Block) -> EvalResult<String> {
        let mut output = String::new();
        for stmt in &block.statements {
            match self.exec_stmt(stmt, &mut output) {
                Ok(()) => {}
                Err(ControlAction::Return {
                    output: produced,
                    value,
                }) => {
                    output.push_str(&produced);
                    return Err(ControlAction::Return { output, value });
                }
                Err(ControlAction::Error(err)) => {
                    return Err(ControlAction::Error(err.at_line(stmt.line())));
                }
                Err(action) => return Err(action),
            }
        }
        Ok(output)
    }

    /// Execute one statement, appending whatever it prints to `output`.
    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt, output: &mut String) -> EvalResult<()> {
        match stmt {
            Stmt::Let(let_stmt) => {
                let value = self.eval_expr(&let_stmt.value)?;
                self.symbols.declare(&let_stmt.name.name, value);
            }
            Stmt::Assign(assign) => {
                let value = self.eval_expr(&assign.value)?;
                if !self.symbols.assign(&assign.name.name, value) {
                    return Err(unknown_identifier(&assign.name.name)
                        .at_line(assign.name.token.line)
                        .into());
                }
            }
            Stmt::Expr(expr_stmt) => {
                if let Expr::Text(text) = &expr_stmt.expr {
                    output.push_str(&text.value);
                } else if let Value::Html(markup) = self.eval_expr(&expr_stmt.expr)? {
                    output.push_str(&markup);
                }
            }
            Stmt::Block(block) => {
                let produced = self.eval_block(block)?;
                output.push_str(&produced);
            }
            Stmt::Return(ret) => self.exec_return(ret, output)?,
            Stmt::Break(_) => return Err(ControlAction::Break),
            Stmt::Continue(_) => return Err(ControlAction::Continue),
            // The parser accepts holes only at the top level, where the
            // interpreter intercepts them before they get here.
            Stmt::Hole(_) => {}
        }
        Ok(())
    }

    fn exec_return(&mut self, ret: &ReturnStmt, output: &mut String) -> EvalResult<()> {
        let value = match &ret.value {
            Some(expr) => self.eval_expr(expr),
            None => Ok(Value::Nil),
        };
        match ret.origin {
            // `<%= %>` prints and carries on; a return raised while
            // evaluating it ends there too.
            ReturnOrigin::Interpolation => match value {
                Ok(value) => write_value(output, &value),
                Err(ControlAction::Return {
                    output: produced,
                    value,
                }) => {
                    output.push_str(&produced);
                    write_value(output, &value);
                }
                Err(action) => return Err(action),
            },
            ReturnOrigin::Keyword => {
                return Err(ControlAction::Return {
                    output: String::new(),
                    value: value?,
                });
            }
        }
        Ok(())
    }
}
