//! Tree-walking interpreter.
//!
//! # Output model
//!
//! Evaluation produces text. Every block accumulates its own output string;
//! `if` and `for` hand theirs back as markup so an enclosing block (or a
//! `<%= %>` region) can decide whether to print it.
//!
//! # Control flow
//!
//! `break`, `continue` and `return` travel on the error channel as
//! [`ControlAction`]. A `return` carries the output its enclosing blocks
//! produced so far; the `for` iteration, function call or top-level
//! statement that owns it decides what to keep.
//!
//! # Holes
//!
//! At the top level a hole region is not evaluated. A positional marker is
//! written instead and a [`HoleSite`] records where it landed, so the
//! render pipeline can fill it in later. Interpreters created for a hole
//! pass render nested holes inline.
//!
//! - `mod.rs`: construction and the top-level statement loop
//! - `scope_guard.rs`: RAII scope push/pop
//! - `block.rs`: blocks and statements inside them
//! - `expr.rs`: expressions, `if`, `for`
//! - `call.rs`: calls, member access, helper dispatch
//! - `index.rs`: indexing and index assignment

mod block;
mod call;
mod expr;
mod index;
mod scope_guard;

pub use scope_guard::ScopedInterpreter;

use std::ops::Range;

use stencil_ir::{HoleStmt, Program, ReturnOrigin, Stmt};
use stencil_lexer::Delimiters;
use tracing::{debug, trace};

use crate::builtins;
use crate::context::Context;
use crate::errors::{ControlAction, EvalError};
use crate::escape::write_value;
use crate::operators::RegexCache;
use crate::symbol_table::SymbolTable;

/// Where a deferred hole landed in the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoleSite {
    /// 0-based position among the program's holes.
    pub index: usize,
    /// Byte range of the marker inside [`Rendered::output`].
    pub range: Range<usize>,
    /// The hole body, verbatim.
    pub input: String,
    /// 1-based source line of the hole opener.
    pub line: u32,
}

/// Result of running a program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    pub output: String,
    /// Deferred holes in ascending output order.
    pub holes: Vec<HoleSite>,
}

/// Marker text for hole `index`.
pub fn hole_marker(index: usize) -> String {
    format!("<STENCIL_HOLE_{index}>")
}

pub struct Interpreter {
    pub(crate) symbols: SymbolTable,
    pub(crate) context: Context,
    delimiters: Delimiters,
    inline_holes: bool,
    regexes: RegexCache,
    holes: Vec<HoleSite>,
}

impl Interpreter {
    pub fn new(context: Context) -> Self {
        Interpreter::with_delimiters(context, Delimiters::default())
    }

    /// An interpreter whose globals are the builtins overlaid with every
    /// binding visible from `context`.
    ///
    /// Holes are rendered inline when `context` belongs to a hole pass.
    pub fn with_delimiters(context: Context, delimiters: Delimiters) -> Self {
        let mut symbols = SymbolTable::seeded(builtins::all());
        for (name, value) in context.export() {
            symbols.set_global(&name, value);
        }
        Interpreter {
            symbols,
            inline_holes: context.is_hole_pass(),
            context,
            delimiters,
            regexes: RegexCache::default(),
            holes: Vec::new(),
        }
    }

    /// Render holes in place instead of deferring them.
    #[must_use]
    pub fn inline_holes(mut self, inline: bool) -> Self {
        self.inline_holes = inline;
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Run `program` and return its output with any deferred holes.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn execute(&mut self, program: &Program) -> Result<Rendered, EvalError> {
        let mut output = String::new();
        for stmt in &program.statements {
            self.exec_top_level(stmt, &mut output)
                .map_err(|err| err.at_line(stmt.line()))?;
        }
        let holes = std::mem::take(&mut self.holes);
        debug!(len = output.len(), holes = holes.len(), "executed program");
        Ok(Rendered { output, holes })
    }

    /// Top-level statements print only literal text and `<%= %>` regions.
    fn exec_top_level(&mut self, stmt: &Stmt, output: &mut String) -> Result<(), EvalError> {
        match stmt {
            Stmt::Hole(hole) => return self.exec_hole(hole, output),
            Stmt::Return(ret) if ret.origin == ReturnOrigin::Interpolation => {
                let value = match &ret.value {
                    Some(expr) => self.eval_expr(expr),
                    None => return Ok(()),
                };
                return match value {
                    Ok(value) => {
                        write_value(output, &value);
                        Ok(())
                    }
                    Err(action) => absorb(action, Some(output)),
                };
            }
            _ => {}
        }
        let mut scratch = String::new();
        match self.exec_stmt(stmt, &mut scratch) {
            Ok(()) => {
                if is_literal_text(stmt) {
                    output.push_str(&scratch);
                }
                Ok(())
            }
            Err(action) => absorb(action, None),
        }
    }

    fn exec_hole(&mut self, hole: &HoleStmt, output: &mut String) -> Result<(), EvalError> {
        if self.inline_holes {
            let rendered = self.render_hole_inline(&hole.input)?;
            output.push_str(&rendered);
            return Ok(());
        }
        let index = self.holes.len();
        let start = output.len();
        output.push_str(&hole_marker(index));
        trace!(index, "deferred hole");
        self.holes.push(HoleSite {
            index,
            range: start..output.len(),
            input: hole.input.clone(),
            line: hole.token.line,
        });
        Ok(())
    }

    fn render_hole_inline(&self, input: &str) -> Result<String, EvalError> {
        if input.trim().is_empty() {
            return Ok(String::new());
        }
        let source = self.delimiters.expression_region(input);
        render_nested(&source, self.context.for_hole(), &self.delimiters)
    }
}

/// Parse and run `source` against `context`, rendering holes inline.
pub fn render_nested(
    source: &str,
    context: Context,
    delimiters: &Delimiters,
) -> Result<String, EvalError> {
    let program = stencil_parse::parse_with(source, delimiters)?;
    let mut interpreter = Interpreter::with_delimiters(context, delimiters.clone()).inline_holes(true);
    Ok(interpreter.execute(&program)?.output)
}

fn is_literal_text(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::Expr(expr_stmt) if matches!(expr_stmt.expr, stencil_ir::Expr::Text(_)))
}

/// Resolve a control action that reached the top level.
///
/// A `return` under `<%= %>` prints what it carried; anywhere else it and
/// stray `break`/`continue` simply end the statement.
fn absorb(action: ControlAction, output: Option<&mut String>) -> Result<(), EvalError> {
    match action {
        ControlAction::Error(err) => Err(err),
        ControlAction::Return { output: produced, value } => {
            if let Some(output) = output {
                output.push_str(&produced);
                write_value(output, &value);
            }
            Ok(())
        }
        ControlAction::Break | ControlAction::Continue => Ok(()),
    }
}
