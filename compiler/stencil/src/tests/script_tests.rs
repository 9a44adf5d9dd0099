#![allow(
    clippy::unwrap_used,
    reason = "test assertions use unwrap for clarity"
)]

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use crate::{run_script, Context, Helper, Kind, Signature, Value};

const SCRIPT: &str = r#"let x = "foo"

let a = 1
let b = 2
let c = a + b

out(c)

if (c == 3) {
  out("hi")
}

let x = fn(f) {
  f()
}

x(fn() {
  out("asdfasdf")
})"#;

fn recording_context() -> (Context, Arc<Mutex<String>>) {
    let buffer = Arc::new(Mutex::new(String::new()));
    let ctx = Context::new();
    let sink = Arc::clone(&buffer);
    ctx.set_helper(
        "out",
        Helper::new(Signature::new([Kind::Any]), move |_, args| {
            sink.lock().push_str(&args.get(0).to_string());
            Ok(Value::Nil)
        }),
    );
    (ctx, buffer)
}

#[test]
fn test_run_script() {
    let (ctx, buffer) = recording_context();
    run_script(SCRIPT, &ctx).unwrap();
    assert_eq!(buffer.lock().as_str(), "3hiasdfasdf");
}

#[test]
fn test_script_bindings_stay_in_child() {
    let (ctx, _buffer) = recording_context();
    run_script("let y = 1", &ctx).unwrap();
    assert!(!ctx.has("y"));
    assert!(!ctx.has("print"));
}

#[test]
fn test_script_errors_carry_lines() {
    let (ctx, _buffer) = recording_context();
    let err = run_script("let a = 1\n\nout(nope)", &ctx).unwrap_err();
    assert!(err.to_string().starts_with("line 3:"), "{err}");
}
