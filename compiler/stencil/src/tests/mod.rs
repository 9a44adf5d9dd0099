//! End-to-end rendering tests.

mod hole_tests;
mod render_tests;
mod script_tests;

use crate::{render, Context, Error};

pub(crate) fn render_ok(source: &str, ctx: &Context) -> String {
    match render(source, ctx) {
        Ok(output) => output,
        Err(err) => panic!("render of {source:?} failed: {err}"),
    }
}

pub(crate) fn render_err(source: &str, ctx: &Context) -> Error {
    match render(source, ctx) {
        Ok(output) => panic!("render of {source:?} succeeded with {output:?}"),
        Err(err) => err,
    }
}
