#![allow(
    clippy::unwrap_used,
    reason = "test assertions use unwrap for clarity"
)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use pretty_assertions::assert_eq;

use super::{render_err, render_ok};
use crate::{parse, Context, Error, Helper, Signature, Value};

const ARRAY_INPUT: &str = r#"<% let a = myArray %><% a = a + "1" %><%=a %><%H "testing" %><%= a %><%H "sssss" %>"#;

fn array_ctx() -> Context {
    Context::with([(
        "myArray",
        Value::list(vec![Value::from("a"), Value::from("b")]),
    )])
}

#[test]
fn test_intermediate_output_has_markers() {
    let template = parse(ARRAY_INPUT).unwrap();
    let evaluated = template.exec(&array_ctx()).unwrap();
    assert_eq!(evaluated.holes().len(), 2);
    assert_eq!(
        evaluated.skeleton(),
        Some("ab1<STENCIL_HOLE_0>ab1<STENCIL_HOLE_1>")
    );
    let ids: Vec<usize> = evaluated.holes().iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn test_holes_are_spliced() {
    assert_eq!(render_ok(ARRAY_INPUT, &array_ctx()), "ab1testingab1sssss");
}

#[test]
fn test_multiple_holes_at_end() {
    let source = format!(r#"{ARRAY_INPUT}<%H "dddd" %><%H "eeee" %>"#);
    assert_eq!(
        render_ok(&source, &array_ctx()),
        "ab1testingab1sssssddddeeee"
    );
}

#[test]
fn test_holes_at_start() {
    let source = format!(r#"<%H "testing" %>{ARRAY_INPUT}"#);
    assert_eq!(render_ok(&source, &array_ctx()), "testingab1testingab1sssss");
    assert_eq!(
        render_ok(r#"<%H "start" %><%H "end" %>"#, &Context::new()),
        "startend"
    );
}

#[test]
fn test_empty_holes() {
    assert_eq!(render_ok(r#"<%H "" %>foo<%H  %>"#, &Context::new()), "foo");
}

#[test]
fn test_many_holes() {
    let source = r#"<%H "x" %>"#.repeat(100);
    assert_eq!(render_ok(&source, &Context::new()), "x".repeat(100));
}

#[test]
fn test_marker_like_text_passes_through() {
    let source = r#"<STENCIL_HOLE_0><%H "start" %><%H "end" %>"#;
    assert_eq!(
        render_ok(source, &Context::new()),
        "<STENCIL_HOLE_0>startend"
    );
}

#[test]
fn test_error_in_hole() {
    let source = r#"<%= "a" %><%H hole_punch_first_error %><%= "b" %><%H "fine" %>"#;
    let err = render_err(source, &Context::new());
    assert_eq!(
        err.to_string(),
        r#"line 1: "hole_punch_first_error": unknown identifier"#
    );
}

#[test]
fn test_first_failing_hole_in_order_wins() {
    let source = "<%H fine %><%H first_missing %><%H second_missing %>";
    let ctx = Context::with([("fine", "ok")]);
    let err = render_err(source, &ctx);
    assert!(err.to_string().contains("first_missing"), "{err}");
}

#[test]
fn test_holes_see_context_but_not_template_locals() {
    let ctx = Context::with([("name", "mark")]);
    assert_eq!(render_ok("<%H name %>", &ctx), "mark");
    let err = render_err(r#"<% let local = "x" %><%H local %>"#, &ctx);
    assert!(err.to_string().contains("local"), "{err}");
}

#[test]
fn test_hole_writes_stay_private() {
    let ctx = Context::new();
    ctx.set_helper(
        "stash",
        Helper::new(Signature::new(Vec::new()), |help, _| {
            help.set("stashed", true);
            Ok(Value::Nil)
        }),
    );
    render_ok("<%H stash() %>", &ctx);
    assert!(!ctx.has("stashed"));
}

#[test]
fn test_holes_run_concurrently() {
    const HOLES: usize = 4;
    let barrier = Arc::new(Barrier::new(HOLES));
    let ran = Arc::new(AtomicUsize::new(0));
    let ctx = Context::new();
    {
        let barrier = Arc::clone(&barrier);
        let ran = Arc::clone(&ran);
        ctx.set_helper(
            "meet",
            Helper::new(Signature::new(Vec::new()), move |_, _| {
                barrier.wait();
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from("."))
            }),
        );
    }
    let source = "<%H meet() %>".repeat(HOLES);
    assert_eq!(render_ok(&source, &ctx), ".".repeat(HOLES));
    assert_eq!(ran.load(Ordering::SeqCst), HOLES);
}

#[test]
fn test_nested_holes_render_inline() {
    let ctx = Context::with([("inner", "<%H \"deep\" %>")]);
    ctx.set_helper(
        "partial",
        Helper::new(Signature::new(Vec::new()), |help, _| {
            let source = help.get("inner").map(|v| v.to_string()).unwrap_or_default();
            Ok(Value::html(help.render(&source)?))
        }),
    );
    assert_eq!(render_ok("[<%H partial() %>]", &ctx), "[deep]");
}

#[test]
fn test_panicking_hole_fails_render() {
    let ctx = Context::new();
    ctx.set_helper(
        "boom",
        Helper::new(Signature::new(Vec::new()), |_, _| panic!("hole task failure")),
    );
    let err = render_err("<%H \"ok\" %>\n\n<%H boom() %>", &ctx);
    assert!(matches!(err, Error::HolePanicked { id: 1, line: 3 }));
    assert_eq!(err.line(), Some(3));
    assert_eq!(err.to_string(), "line 3: hole 1 panicked while rendering");
}
