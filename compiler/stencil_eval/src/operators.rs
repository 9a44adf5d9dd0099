//! Binary and unary operator semantics.
//!
//! Dispatch is a plain match over the operand variants. Numeric operators
//! require both sides to be the same numeric kind; there is no implicit
//! int/float conversion.

use std::sync::Arc;

use regex::Regex;
use rustc_hash::FxHashMap;
use stencil_ir::{InfixOp, PrefixOp};

use crate::errors::{
    binary_type_mismatch, division_by_zero, integer_overflow, invalid_regex,
    unary_type_mismatch, EvalError,
};
use crate::escape::escape_into;
use crate::value::Value;

#[inline]
fn checked_arith(result: Option<i64>, op_name: &'static str) -> Result<Value, EvalError> {
    result.map(Value::Int).ok_or_else(|| integer_overflow(op_name))
}

/// Evaluate every binary operator except the short-circuiting `&&`/`||`
/// and the regex match `~=`, which need interpreter state.
pub fn evaluate_binary(left: Value, right: Value, op: InfixOp) -> Result<Value, EvalError> {
    match op {
        InfixOp::Eq => return Ok(Value::Bool(left == right)),
        InfixOp::NotEq => return Ok(Value::Bool(left != right)),
        InfixOp::Add => return add(left, right),
        _ => {}
    }
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(*a, *b, op),
        (Value::Float(a), Value::Float(b)) => eval_float_binary(*a, *b, op),
        (Value::Str(a) | Value::Html(a), Value::Str(b) | Value::Html(b)) => {
            eval_string_compare(a, b, op)
                .ok_or_else(|| binary_type_mismatch(op.as_symbol(), left.type_name(), right.type_name()))
        }
        _ => Err(binary_type_mismatch(
            op.as_symbol(),
            left.type_name(),
            right.type_name(),
        )),
    }
}

/// `+` across every kind that supports it.
fn add(left: Value, right: Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => checked_arith(a.checked_add(b), "addition"),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
        // `true + x` keeps the boolean; it prints as `true`.
        (left @ Value::Bool(_), _) => Ok(left),
        (Value::Html(a), Value::Html(b)) => Ok(Value::html(format!("{a}{b}"))),
        (Value::Html(a), right) => {
            let mut out = String::with_capacity(a.len() + 8);
            out.push_str(&a);
            escape_into(&mut out, &right.to_string());
            Ok(Value::html(out))
        }
        (Value::Str(a), right) => Ok(Value::string(format!("{a}{right}"))),
        (Value::List(mut items), Value::List(more)) => {
            Arc::make_mut(&mut items).extend(more.iter().cloned());
            Ok(Value::List(items))
        }
        (Value::List(mut items), right) => {
            Arc::make_mut(&mut items).push(right);
            Ok(Value::List(items))
        }
        (left, right) => Err(binary_type_mismatch(
            "+",
            left.type_name(),
            right.type_name(),
        )),
    }
}

fn eval_int_binary(a: i64, b: i64, op: InfixOp) -> Result<Value, EvalError> {
    match op {
        InfixOp::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        InfixOp::Mul => checked_arith(a.checked_mul(b), "multiplication"),
        InfixOp::Div => {
            if b == 0 {
                Err(division_by_zero())
            } else {
                checked_arith(a.checked_div(b), "division")
            }
        }
        InfixOp::Lt => Ok(Value::Bool(a < b)),
        InfixOp::LtEq => Ok(Value::Bool(a <= b)),
        InfixOp::Gt => Ok(Value::Bool(a > b)),
        InfixOp::GtEq => Ok(Value::Bool(a >= b)),
        _ => Err(binary_type_mismatch(op.as_symbol(), "int", "int")),
    }
}

fn eval_float_binary(a: f64, b: f64, op: InfixOp) -> Result<Value, EvalError> {
    match op {
        InfixOp::Sub => Ok(Value::Float(a - b)),
        InfixOp::Mul => Ok(Value::Float(a * b)),
        InfixOp::Div => Ok(Value::Float(a / b)),
        InfixOp::Lt => Ok(Value::Bool(a < b)),
        InfixOp::LtEq => Ok(Value::Bool(a <= b)),
        InfixOp::Gt => Ok(Value::Bool(a > b)),
        InfixOp::GtEq => Ok(Value::Bool(a >= b)),
        _ => Err(binary_type_mismatch(op.as_symbol(), "float", "float")),
    }
}

fn eval_string_compare(a: &str, b: &str, op: InfixOp) -> Option<Value> {
    let result = match op {
        InfixOp::Lt => a < b,
        InfixOp::LtEq => a <= b,
        InfixOp::Gt => a > b,
        InfixOp::GtEq => a >= b,
        _ => return None,
    };
    Some(Value::Bool(result))
}

/// `!` and unary `-`.
pub fn evaluate_unary(value: &Value, op: PrefixOp) -> Result<Value, EvalError> {
    match (value, op) {
        (_, PrefixOp::Not) => Ok(Value::Bool(!value.is_truthy())),
        (Value::Int(n), PrefixOp::Neg) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("negation")),
        (Value::Float(f), PrefixOp::Neg) => Ok(Value::Float(-f)),
        _ => Err(unary_type_mismatch(op.as_symbol(), value.type_name())),
    }
}

/// Compiled patterns for `~=`, kept for the life of one interpreter.
#[derive(Default)]
pub struct RegexCache {
    compiled: FxHashMap<String, Regex>,
}

impl RegexCache {
    /// `subject ~= pattern`.
    pub fn is_match(&mut self, subject: &Value, pattern: &Value) -> Result<Value, EvalError> {
        let (Some(text), Some(source)) = (subject.as_str(), pattern.as_str()) else {
            return Err(binary_type_mismatch(
                "~=",
                subject.type_name(),
                pattern.type_name(),
            ));
        };
        if let Some(regex) = self.compiled.get(source) {
            return Ok(Value::Bool(regex.is_match(text)));
        }
        let regex = Regex::new(source).map_err(|err| invalid_regex(source, err))?;
        let matched = regex.is_match(text);
        self.compiled.insert(source.to_string(), regex);
        Ok(Value::Bool(matched))
    }
}
