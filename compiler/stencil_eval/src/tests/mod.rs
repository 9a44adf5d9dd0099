//! Evaluator tests that go through helpers and host values.


use crate::{Context, EvalError, Interpreter};

pub(crate) fn run(source: &str, ctx: &Context) -> Result<String, EvalError> {
    let program = stencil_parse::parse(source)?;
    Ok(Interpreter::new(ctx.clone()).execute(&program)?.output)
}
