//! Expression evaluation, including `if` and `for`.

use std::sync::Arc;

use stencil_ir::{Expr, ForExpr, HashLiteral, Identifier, IfExpr, InfixExpr, InfixOp, PrefixOp};
use stencil_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::errors::{invalid_index, not_iterable, unknown_identifier, ControlAction, EvalResult};
use crate::escape::write_value;
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::value::{FunctionValue, MapValue, Value};

/// Stamp the line of `expr` on an error that does not carry one yet.
fn at_line(action: ControlAction, line: u32) -> ControlAction {
    match action {
        ControlAction::Error(err) => ControlAction::Error(err.at_line(line)),
        other => other,
    }
}

impl Interpreter {
    /// Evaluate an expression.
    ///
    /// Wrapped in `ensure_sufficient_stack` since templates may nest
    /// expressions arbitrarily deep.
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr))
            .map_err(|action| at_line(action, expr.line()))
    }

    /// Evaluate an operand that is only tested for truthiness or equality:
    /// an unknown bare identifier reads as `nil`.
    pub(crate) fn eval_tolerant(&mut self, expr: &Expr) -> EvalResult {
        if let Expr::Ident(ident) = expr {
            return Ok(self.lookup(&ident.name).unwrap_or(Value::Nil));
        }
        self.eval_expr(expr)
    }

    /// Scope first, then the live context.
    pub(crate) fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.symbols.resolve(name) {
            return Some(value.clone());
        }
        self.context.get(name)
    }

    fn eval_ident(&self, ident: &Identifier) -> EvalResult {
        self.lookup(&ident.name)
            .ok_or_else(|| unknown_identifier(&ident.name).into())
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Ident(ident) => self.eval_ident(ident),
            Expr::Int(lit) => Ok(Value::Int(lit.value)),
            Expr::Float(lit) => Ok(Value::Float(lit.value)),
            Expr::Str(lit) => Ok(Value::string(lit.value.as_str())),
            Expr::Bool(lit) => Ok(Value::Bool(lit.value)),
            Expr::Nil(_) => Ok(Value::Nil),
            Expr::Text(lit) => Ok(Value::html(lit.value.as_str())),
            Expr::Array(array) => {
                let mut items = Vec::with_capacity(array.elements.len());
                for element in &array.elements {
                    items.push(self.eval_expr(element)?);
                }
                Ok(Value::list(items))
            }
            Expr::Hash(hash) => self.eval_hash(hash),
            Expr::Prefix(prefix) => {
                let operand = match prefix.op {
                    PrefixOp::Not => self.eval_tolerant(&prefix.right)?,
                    PrefixOp::Neg => self.eval_expr(&prefix.right)?,
                };
                Ok(evaluate_unary(&operand, prefix.op)?)
            }
            Expr::Infix(infix) => self.eval_infix(infix),
            Expr::Index(index) => self.eval_index(index),
            Expr::Member(member) => self.eval_member(member),
            Expr::Call(call) => self.eval_call(call),
            Expr::If(if_expr) => self.eval_if(if_expr),
            Expr::For(for_expr) => self.eval_for(for_expr),
            Expr::Function(func) => Ok(Value::Function(Arc::new(FunctionValue {
                params: func.params.iter().map(|p| p.name.clone()).collect(),
                body: Arc::clone(&func.body),
            }))),
        }
    }

    fn eval_hash(&mut self, hash: &HashLiteral) -> EvalResult {
        let mut map = MapValue::new();
        for (key_expr, value_expr) in &hash.pairs {
            let key = match self.eval_expr(key_expr)? {
                key @ (Value::Str(_)
                | Value::Html(_)
                | Value::Int(_)
                | Value::Float(_)
                | Value::Bool(_)) => key.to_string(),
                other => return Err(invalid_index("hash", other.type_name()).into()),
            };
            let value = self.eval_expr(value_expr)?;
            map.insert(key, value);
        }
        Ok(Value::map(map))
    }

    fn eval_infix(&mut self, infix: &InfixExpr) -> EvalResult {
        match infix.op {
            InfixOp::And => {
                let left = self.eval_tolerant(&infix.left)?;
                if !left.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let right = self.eval_tolerant(&infix.right)?;
                Ok(Value::Bool(right.is_truthy()))
            }
            InfixOp::Or => {
                let left = self.eval_tolerant(&infix.left)?;
                if left.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let right = self.eval_tolerant(&infix.right)?;
                Ok(Value::Bool(right.is_truthy()))
            }
            InfixOp::Matches => {
                let subject = self.eval_expr(&infix.left)?;
                let pattern = self.eval_expr(&infix.right)?;
                Ok(self.regexes.is_match(&subject, &pattern)?)
            }
            op => {
                let (left, right) = if op.tolerates_unknown() {
                    (self.eval_tolerant(&infix.left)?, self.eval_tolerant(&infix.right)?)
                } else {
                    (self.eval_expr(&infix.left)?, self.eval_expr(&infix.right)?)
                };
                Ok(evaluate_binary(left, right, op)?)
            }
        }
    }

    /// The first branch whose condition holds runs; its output becomes
    /// markup. No branch taken yields `nil`.
    fn eval_if(&mut self, if_expr: &IfExpr) -> EvalResult {
        if self.eval_tolerant(&if_expr.condition)?.is_truthy() {
            return Ok(Value::html(self.eval_block(&if_expr.consequence)?));
        }
        for branch in &if_expr.else_ifs {
            if self.eval_tolerant(&branch.condition)?.is_truthy() {
                return Ok(Value::html(self.eval_block(&branch.block)?));
            }
        }
        match &if_expr.alternative {
            Some(block) => Ok(Value::html(self.eval_block(block)?)),
            None => Ok(Value::Nil),
        }
    }

    /// Each iteration runs in its own scope with the loop names bound.
    ///
    /// A `return` ends only its iteration, which contributes its output so
    /// far plus the returned value. `continue` drops the iteration's output;
    /// `break` drops it and stops the loop.
    fn eval_for(&mut self, for_expr: &ForExpr) -> EvalResult {
        let iterable = self.eval_expr(&for_expr.iterable)?;
        let pairs = iteration_pairs(&iterable)?;
        let mut output = String::new();
        for (key, value) in pairs {
            let bindings = match &for_expr.value {
                Some(value_name) => vec![
                    (for_expr.key.name.clone(), key),
                    (value_name.name.clone(), value),
                ],
                None => vec![(for_expr.key.name.clone(), value)],
            };
            let outcome = self.with_bindings(bindings, |scoped| scoped.run_statements(&for_expr.body));
            match outcome {
                Ok(produced) => output.push_str(&produced),
                Err(ControlAction::Return {
                    output: produced,
                    value,
                }) => {
                    output.push_str(&produced);
                    write_value(&mut output, &value);
                }
                Err(ControlAction::Continue) => {}
                Err(ControlAction::Break) => break,
                Err(action @ ControlAction::Error(_)) => return Err(action),
            }
        }
        Ok(Value::html(output))
    }
}

/// `(key, value)` pairs a `for` loop walks over `iterable`.
fn iteration_pairs(iterable: &Value) -> Result<Vec<(Value, Value)>, ControlAction> {
    let pairs = match iterable {
        Value::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| (Value::from(i), item.clone()))
            .collect(),
        Value::Map(map) => map
            .iter()
            .map(|(key, value)| (Value::from(key), value.clone()))
            .collect(),
        Value::Range(range) => range
            .iter()
            .enumerate()
            .map(|(i, n)| (Value::from(i), Value::Int(n)))
            .collect(),
        other => return Err(not_iterable(other.type_name()).into()),
    };
    Ok(pairs)
}
