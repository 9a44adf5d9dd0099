//! HTML escaping and the printing rules for values.

use std::fmt::Write as _;

use memchr::memchr3;

use crate::value::Value;

/// Append `text` to `out`, escaping `& < > " '`.
pub fn escape_into(out: &mut String, text: &str) {
    let mut rest = text;
    loop {
        let next = rest
            .bytes()
            .position(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\''));
        let Some(pos) = next else {
            out.push_str(rest);
            return;
        };
        out.push_str(&rest[..pos]);
        out.push_str(match rest.as_bytes()[pos] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&#34;",
            _ => "&#39;",
        });
        rest = &rest[pos + 1..];
    }
}

pub fn html_escape(text: &str) -> String {
    if memchr3(b'&', b'<', b'>', text.as_bytes()).is_none() && !text.contains(['"', '\'']) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 16);
    escape_into(&mut out, text);
    out
}

/// Append the printed form of `value` to `out`.
///
/// Strings are escaped, markup is written as is. `nil`, maps, records,
/// ranges and callables print nothing.
pub fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Str(s) => escape_into(out, s),
        Value::Html(s) => out.push_str(s),
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Float(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::List(items) => {
            for item in items.iter() {
                write_value(out, item);
            }
        }
        Value::Object(object) => {
            if let Some(text) = object.to_text() {
                escape_into(out, &text);
            }
        }
        Value::Nil
        | Value::Map(_)
        | Value::Record(_)
        | Value::Range(_)
        | Value::Function(_)
        | Value::Helper(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_all_five() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&#34;x&#34;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_write_value_rules() {
        let mut out = String::new();
        write_value(&mut out, &Value::from("<b>"));
        write_value(&mut out, &Value::html("<i>"));
        write_value(&mut out, &Value::Int(3));
        write_value(&mut out, &Value::Bool(true));
        write_value(&mut out, &Value::Nil);
        write_value(&mut out, &Value::list(vec![Value::from("a"), Value::Int(1)]));
        assert_eq!(out, "&lt;b&gt;<i>3truea1");
    }
}
