//! Calls and member access.

use stencil_ir::{Block, CallExpr, Expr, MemberExpr};

use super::Interpreter;
use crate::errors::{
    helper_failed, no_such_member, not_callable, ControlAction, EvalError, EvalResult,
};
use crate::helper_context::HelperContext;
use crate::value::{FunctionValue, Helper, Value};

impl Interpreter {
    pub(super) fn eval_member(&mut self, member: &MemberExpr) -> EvalResult {
        let object = self.eval_expr(&member.object)?;
        let name = member.name.name.as_str();
        let found = match &object {
            Value::Record(record) => record.field(name).cloned(),
            Value::Object(host) => host.get_field(name),
            Value::Map(map) => map.get(name).cloned(),
            _ => None,
        };
        found.ok_or_else(|| no_such_member(&member.object.to_string(), name).into())
    }

    pub(super) fn eval_call(&mut self, call: &CallExpr) -> EvalResult {
        match &call.callee {
            Some(receiver) => self.eval_method_call(receiver, call),
            None => {
                let function = self.eval_expr(&call.function)?;
                let args = self.eval_args(&call.arguments)?;
                let name = call.function.to_string();
                self.call_value(&name, &function, args, call.block.as_ref())
            }
        }
    }

    /// `receiver.Name(args)`: a host method, or a callable field of a
    /// record or map.
    fn eval_method_call(&mut self, receiver_expr: &Expr, call: &CallExpr) -> EvalResult {
        let receiver = self.eval_expr(receiver_expr)?;
        let name = call.function.to_string();
        let args = self.eval_args(&call.arguments)?;
        let missing = || no_such_member(&receiver_expr.to_string(), &name);
        let method = match &receiver {
            Value::Object(host) => {
                return match host.call_method(&name, args) {
                    Some(Ok(value)) => Ok(value),
                    Some(Err(err)) => Err(unwrap_helper_error(err).into()),
                    None => Err(missing().into()),
                };
            }
            Value::Record(record) => record.field(&name).cloned(),
            Value::Map(map) => map.get(&name).cloned(),
            _ => None,
        };
        let method = method.ok_or_else(missing)?;
        self.call_value(&name, &method, args, call.block.as_ref())
    }

    fn eval_args(&mut self, arguments: &[Expr]) -> EvalResult<Vec<Value>> {
        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.eval_expr(arg)?);
        }
        Ok(args)
    }

    pub(crate) fn call_value(
        &mut self,
        name: &str,
        callable: &Value,
        args: Vec<Value>,
        block: Option<&Block>,
    ) -> EvalResult {
        match callable {
            Value::Function(func) => self.call_function(func, args),
            Value::Helper(helper) => Ok(self.call_helper(name, helper, args, block)?),
            other => Err(not_callable(name, other.type_name()).into()),
        }
    }

    /// Parameters are bound in a child of the caller's scope. Missing
    /// arguments stay unbound; extra ones are ignored.
    fn call_function(&mut self, func: &FunctionValue, args: Vec<Value>) -> EvalResult {
        let bindings = func.params.iter().cloned().zip(args);
        let outcome = self.with_bindings(bindings, |scoped| scoped.run_statements(&func.body));
        match outcome {
            Ok(output) => Ok(Value::html(output)),
            Err(ControlAction::Return { value, .. }) => Ok(value),
            Err(ControlAction::Break | ControlAction::Continue) => Ok(Value::Nil),
            Err(action @ ControlAction::Error(_)) => Err(action),
        }
    }

    pub(crate) fn call_helper(
        &mut self,
        name: &str,
        helper: &Helper,
        args: Vec<Value>,
        block: Option<&Block>,
    ) -> Result<Value, EvalError> {
        let args = helper.signature().bind(name, args)?;
        let mut ctx = HelperContext::new(self, block);
        helper.call(&mut ctx, args).map_err(unwrap_helper_error)
    }
}

/// A helper that failed because template code it ran failed hands back the
/// original evaluation error; anything else is the host's own error.
fn unwrap_helper_error(err: crate::errors::HelperError) -> EvalError {
    match err.downcast_ref::<EvalError>() {
        Some(inner) => inner.clone(),
        None => helper_failed(err),
    }
}
