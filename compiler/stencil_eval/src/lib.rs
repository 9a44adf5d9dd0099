//! Stencil evaluator.
//!
//! Walks a parsed [`Program`](stencil_ir::Program) against a [`Context`]
//! and produces text. The pieces:
//!
//! - [`Value`]: runtime values, including host records, objects and helpers
//! - [`Context`]: host bindings with read-through children
//! - [`SymbolTable`]: the interned scope stack used while walking
//! - [`Interpreter`]: the tree walker itself
//! - [`HelperContext`]: what a helper gets to reach back into the template
//!
//! Evaluation errors are [`EvalError`] values whose `Display` starts with
//! `line N: `.

mod builtins;
mod context;
mod errors;
mod escape;
mod helper_context;
mod interpreter;
mod operators;
mod symbol_table;
mod value;

pub use context::Context;
pub use errors::{
    binary_type_mismatch, division_by_zero, helper_failed, index_out_of_bounds, integer_overflow,
    invalid_argument, invalid_assignment_target, invalid_index, invalid_regex, no_such_member,
    not_callable, not_indexable, not_iterable, unary_type_mismatch, unknown_identifier,
    wrong_arg_count, EvalError, EvalErrorKind, HelperError,
};
pub use escape::{html_escape, write_value};
pub use helper_context::HelperContext;
pub use interpreter::{hole_marker, render_nested, HoleSite, Interpreter, Rendered, ScopedInterpreter};
pub use operators::{evaluate_binary, evaluate_unary};
pub use symbol_table::SymbolTable;
pub use value::{
    Args, FunctionValue, Helper, HelperFn, HostObject, Kind, MapValue, Record, RangeValue,
    Signature, Value,
};

#[cfg(test)]
mod tests;
