#![allow(
    clippy::unwrap_used,
    reason = "test assertions use unwrap for clarity"
)]

use pretty_assertions::assert_eq;

use super::{render_err, render_ok};
use crate::{
    parse, Context, Error, EvalErrorKind, Helper, Kind, MapValue, Record, Signature, Value,
};

fn strings(items: &[&str]) -> Value {
    Value::list(items.iter().map(|s| Value::from(*s)).collect())
}

#[test]
fn test_literal_text_passes_through() {
    let ctx = Context::new();
    assert_eq!(render_ok("", &ctx), "");
    assert_eq!(render_ok("<p>plain</p>\n", &ctx), "<p>plain</p>\n");
}

#[test]
fn test_escaping() {
    let ctx = Context::new();
    assert_eq!(
        render_ok(r#"<p><%= "<script>alert('pwned')</script>" %></p>"#, &ctx),
        "<p>&lt;script&gt;alert(&#39;pwned&#39;)&lt;/script&gt;</p>"
    );
    assert_eq!(render_ok(r#"C:\\<%= "temp" %>"#, &ctx), r"C:\temp");
    assert_eq!(render_ok(r#"\<%= "temp" %>"#, &ctx), r#"<%= "temp" %>"#);
}

#[test]
fn test_escaped_and_raw_helpers() {
    let ctx = Context::new();
    ctx.set_helper(
        "escaped",
        Helper::new(Signature::new(Vec::new()), |_, _| Ok(Value::from("<b>unsafe</b>"))),
    );
    ctx.set_helper(
        "unescaped",
        Helper::new(Signature::new(Vec::new()), |_, _| Ok(Value::html("<b>unsafe</b>"))),
    );
    let source = r#"<%= escaped() %>|<%= unescaped() %>|<%= raw("<b>unsafe</b>") %>"#;
    assert_eq!(
        render_ok(source, &ctx),
        "&lt;b&gt;unsafe&lt;/b&gt;|<b>unsafe</b>|<b>unsafe</b>"
    );
}

#[test]
fn test_comments() {
    let ctx = Context::new();
    assert_eq!(render_ok("\n<%# This is a comment %>\nHi\n", &ctx).trim(), "Hi");
    assert_eq!(
        render_ok("\n<%# This is a\nblock comment %>\nHi\n", &ctx).trim(),
        "Hi"
    );
    assert_eq!(render_ok("<%# a <%= x %> b %>tail", &ctx), "tail");
    assert_eq!(render_ok("<%# <%# inner %>\nouter %>tail", &ctx), "tail");
}

#[test]
fn test_unterminated_string_is_a_parse_error() {
    let ctx = Context::new();
    for source in [
        r#"<%= foo("asdf) %>"#,
        r#"<%= foo("test) %>"."#,
        r#"<%= title("Running Migrations) %>(default "./migrations")"#,
    ] {
        assert!(matches!(render_err(source, &ctx), Error::Parse(_)), "{source}");
    }
}

#[test]
fn test_quotes_in_strings() {
    let ctx = Context::new();
    assert_eq!(render_ok(r#"<%= "say \"hi\"" %>"#, &ctx), "say &#34;hi&#34;");
    assert_eq!(render_ok(r#"<%= raw(`a "raw" \n`) %>"#, &ctx), r#"a "raw" \n"#);
}

#[test]
fn test_identifiers_with_digits() {
    let ctx = Context::with([("my123greet", "hi"), ("name3", "mark")]);
    assert_eq!(render_ok("<%= my123greet %> <%= name3 %>", &ctx), "hi mark");
}

#[test]
fn test_if_and_else() {
    let ctx = Context::with([("names", strings(&["a"]))]);
    assert_eq!(
        render_ok("<%= if (len(names) > 0) { %>some<% } else { %>none<% } %>", &ctx),
        "some"
    );
    assert_eq!(
        render_ok("<%= if (missing) { %>some<% } else { %>none<% } %>", &ctx),
        "none"
    );
}

#[test]
fn test_for_with_markup() {
    let ctx = Context::with([("names", strings(&["john", "paul"]))]);
    let source = "<ul><%= for (i, name) in names { %><li><%= i %> - <%= name %></li><% } %></ul>";
    assert_eq!(
        render_ok(source, &ctx),
        "<ul><li>0 - john</li><li>1 - paul</li></ul>"
    );
}

#[test]
fn test_variables_assigned_in_loop() {
    let ctx = Context::with([("myArray", strings(&["a", "b"]))]);
    let source = r#"<% let foo = "bar" %><%= for (a) in myArray { %><%= foo %><% if (foo != "baz") { foo = "baz" } %><% } %>"#;
    assert_eq!(render_ok(source, &ctx), "barbaz");
}

#[test]
fn test_assign_without_let_fails() {
    let err = render_err(r#"<% foo = "baz" %>"#, &Context::new());
    assert!(matches!(
        err.as_eval().map(|e| &e.kind),
        Some(EvalErrorKind::UnknownIdentifier { .. })
    ));
}

#[test]
fn test_hashes() {
    let ctx = Context::new();
    assert_eq!(
        render_ok(r#"<p><% let h = {"a": "A"} %><%= h["a"] %></p>"#, &ctx),
        "<p>A</p>"
    );

    let mut names = MapValue::new();
    names.insert("first", Value::from("Mark"));
    names.insert("last", Value::from("Bates"));
    let ctx = Context::with([("m", Value::map(names)), ("a", strings(&["john", "paul"]))]);
    assert_eq!(
        render_ok(r#"<%= m["first"] + " " + m["last"] %>|<%= a[0+1] %>"#, &ctx),
        "Mark Bates|paul"
    );
}

#[test]
fn test_map_in_record() {
    let mut inner = MapValue::new();
    inner.insert("a", Value::from("A"));
    let record = Record::new("Holder").with_field("MyMap", Value::map(inner));
    let ctx = Context::with([("m", Value::record(record)), ("key", Value::from("a"))]);
    assert_eq!(render_ok("<%= m.MyMap[key] %>", &ctx), "A");
}

#[test]
fn test_math() {
    let ctx = Context::new();
    assert_eq!(render_ok("<%= 10 - 3 * 2 %>", &ctx), "4");
    assert_eq!(render_ok("<%= (10 - 3) * 2 %>", &ctx), "14");
    assert_eq!(render_ok("<%= 7 / 2 %>", &ctx), "3");
    assert_eq!(render_ok("<%= 1.5 * 2.0 %>", &ctx), "3");
    assert_eq!(render_ok("<%= 3 > 2 && 2 >= 2 %>", &ctx), "true");
    let err = render_err("<%= 9223372036854775807 + 1 %>", &ctx);
    assert!(matches!(
        err.as_eval().map(|e| &e.kind),
        Some(EvalErrorKind::IntegerOverflow { .. })
    ));
}

#[test]
fn test_line_numbers() {
    let ctx = Context::new();
    let err = render_err("<p>\n\t<%= f.Foo %>\n</p>", &ctx);
    assert!(err.to_string().starts_with("line 2:"), "{err}");
    assert_eq!(err.line(), Some(2));

    let err = render_err("\n\t<%= for (n) in numbers.Foo { %>\n\t\t<%= n %>\n\t<% } %>\n", &ctx);
    assert!(err.to_string().starts_with("line 2:"), "{err}");

    let ctx = Context::with([("numbers", Value::list(vec![Value::Int(1), Value::Int(2)]))]);
    let err = render_err("\n\t<%= for (n) in numbers { %>\n\t\t<%= n.Foo %>\n\t<% } %>\n", &ctx);
    assert!(err.to_string().starts_with("line 3:"), "{err}");
}

#[test]
fn test_parse_error_line() {
    let err = parse("\n\t<%= for (n in numbers.Foo { %>\n\t<% } %>\n").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert!(err.to_string().starts_with("line 2:"), "{err}");
}

#[test]
fn test_functions() {
    let ctx = Context::new();
    let source = r#"<% let greet = fn(name) { return "Hi " + name } %><%= greet("mark") %>"#;
    assert_eq!(render_ok(source, &ctx), "Hi mark");
    let source = "<% let add = func(a, b) { return a + b } %><%= add(1, 2) %>";
    assert_eq!(render_ok(source, &ctx), "3");
}

#[test]
fn test_return_through_nested_ifs() {
    let source = r#"<% let f = fn(x) {
        if (x > 1) {
            if (x > 2) { return "big" }
            return "medium"
        }
        return "small"
    } %><%= f(1) %> <%= f(2) %> <%= f(3) %>"#;
    assert_eq!(render_ok(source, &Context::new()), "small medium big");
}

#[test]
fn test_helper_receives_block_and_hash() {
    let ctx = Context::new();
    ctx.set_helper(
        "divwrapper",
        Helper::new(Signature::new(Vec::new()).with_options(), |help, args| {
            let class = args
                .map(0)
                .and_then(|opts| opts.get("class"))
                .map(ToString::to_string)
                .unwrap_or_default();
            let body = help.block()?;
            Ok(Value::html(format!("<div class=\"{class}\">{body}</div>")))
        }),
    );
    let source = r#"<%= divwrapper({"class": "myclass"}) { %><ul><% let a = [1, 2, "three"] %><%= for (i, name) in a { %><li><%= i %>-<%= name %></li><% } %></ul><% } %>"#;
    assert_eq!(
        render_ok(source, &ctx),
        r#"<div class="myclass"><ul><li>0-1</li><li>1-2</li><li>2-three</li></ul></div>"#
    );
}

#[test]
fn test_context_values_are_read_through() {
    let parent = Context::with([("a", "parent")]);
    let child = parent.child();
    child.set("b", "child");
    assert_eq!(render_ok("<%= a %>/<%= b %>", &child), "parent/child");
    assert!(crate::render("<%= b %>", &parent).is_err());
}

#[test]
fn test_iterators() {
    let ctx = Context::new();
    assert_eq!(render_ok("<%= for (v) in range(1, 3) { return v } %>", &ctx), "123");
    assert_eq!(render_ok("<%= for (v) in between(0, 4) { return v } %>", &ctx), "123");
    assert_eq!(render_ok("<%= for (v) in until(3) { return v } %>", &ctx), "012");
}

#[test]
fn test_helper_kind_errors() {
    let ctx = Context::new();
    ctx.set_helper(
        "foo",
        Helper::new(Signature::new([Kind::Int]), |_, args| Ok(Value::Int(args.int(0)))),
    );
    let err = render_err(r#"<%= foo("x") %>"#, &ctx);
    assert_eq!(
        err.to_string(),
        "line 1: x (string) is an invalid argument for foo at pos 0: expected (int)"
    );
}

#[test]
fn test_render_from_reader() {
    let ctx = Context::with([("n", 2)]);
    let source = std::io::Cursor::new("<%= n * 21 %>\n");
    assert_eq!(crate::render_reader(source, &ctx).unwrap(), "42\n");
}
