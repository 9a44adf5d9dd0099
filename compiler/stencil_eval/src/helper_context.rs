//! The handle a helper receives back into the running template.

use std::sync::Arc;

use stencil_ir::Block;

use crate::context::Context;
use crate::errors::{ControlAction, HelperError};
use crate::escape::write_value;
use crate::interpreter::{render_nested, Interpreter};
use crate::value::Value;

/// Passed to every helper call.
///
/// Gives access to the block attached to the call (`name(args) { ... }`),
/// the ambient bindings and nested rendering. Errors raised by template
/// code run through this handle come back as [`HelperError`]s wrapping the
/// original `EvalError`; returning them from the helper reports that error
/// unchanged.
pub struct HelperContext<'h> {
    interpreter: &'h mut Interpreter,
    block: Option<&'h Block>,
}

impl<'h> HelperContext<'h> {
    pub(crate) fn new(interpreter: &'h mut Interpreter, block: Option<&'h Block>) -> Self {
        HelperContext { interpreter, block }
    }

    pub fn has_block(&self) -> bool {
        self.block.is_some()
    }

    /// Render the attached block against the current scope.
    ///
    /// Without a block this is the empty string.
    pub fn block(&mut self) -> Result<String, HelperError> {
        let Some(block) = self.block else {
            return Ok(String::new());
        };
        block_output(self.interpreter.eval_block(block))
    }

    /// Render the attached block with the bindings `context` adds on top of
    /// the current one visible, and with `context` as the live context.
    pub fn block_with(&mut self, context: &Context) -> Result<String, HelperError> {
        let Some(block) = self.block else {
            return Ok(String::new());
        };
        let overlay = context.bindings_until(&self.interpreter.context);
        let outer = std::mem::replace(&mut self.interpreter.context, context.clone());
        let outcome = self
            .interpreter
            .with_bindings(overlay, |scoped| scoped.run_statements(block));
        self.interpreter.context = outer;
        block_output(outcome)
    }

    /// Look `name` up in the template's scope, then in the context.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.interpreter.lookup(name)
    }

    /// Bind `name` on the live context and make it visible to the rest of
    /// the template.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        self.interpreter.context.set(name, value.clone());
        self.interpreter.symbols.set_global(name, value);
    }

    pub fn context(&self) -> &Context {
        &self.interpreter.context
    }

    /// Render `source` with the active delimiters against a child of the
    /// live context. Holes inside it render in place.
    pub fn render(&mut self, source: &str) -> Result<String, HelperError> {
        let interpreter = &*self.interpreter;
        render_nested(
            source,
            interpreter.context.child(),
            interpreter.delimiters(),
        )
        .map_err(|err| Arc::new(err) as HelperError)
    }
}

/// Output of a block run on a helper's behalf.
///
/// A `return` contributes what it carried; `break` and `continue` end the
/// block with nothing.
fn block_output(outcome: Result<String, ControlAction>) -> Result<String, HelperError> {
    match outcome {
        Ok(output) => Ok(output),
        Err(ControlAction::Return { mut output, value }) => {
            write_value(&mut output, &value);
            Ok(output)
        }
        Err(ControlAction::Break | ControlAction::Continue) => Ok(String::new()),
        Err(ControlAction::Error(err)) => Err(Arc::new(err)),
    }
}
