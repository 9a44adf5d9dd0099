//! Helpers available to every template.
//!
//! Host bindings with the same name take precedence.

use std::sync::OnceLock;

use crate::value::{Helper, Kind, RangeValue, Signature, Value};

fn range_value(start: i64, end: i64) -> Value {
    Value::Range(RangeValue { start, end })
}

fn build() -> Vec<(String, Value)> {
    let helpers = [
        // range(a, b): a through b inclusive
        (
            "range",
            Helper::new(Signature::new([Kind::Int, Kind::Int]), |_, args| {
                Ok(range_value(args.int(0), args.int(1).saturating_add(1)))
            }),
        ),
        // between(a, b): strictly between a and b
        (
            "between",
            Helper::new(Signature::new([Kind::Int, Kind::Int]), |_, args| {
                Ok(range_value(args.int(0).saturating_add(1), args.int(1)))
            }),
        ),
        // until(n): 0 up to, not including, n
        (
            "until",
            Helper::new(Signature::new([Kind::Int]), |_, args| {
                Ok(range_value(0, args.int(0)))
            }),
        ),
        (
            "raw",
            Helper::new(Signature::new([Kind::Str]), |_, args| {
                Ok(Value::html(args.str(0)))
            }),
        ),
        (
            "len",
            Helper::new(Signature::new([Kind::Any]), |_, args| {
                let len = match args.get(0) {
                    Value::Str(s) | Value::Html(s) => s.chars().count(),
                    Value::List(items) => items.len(),
                    Value::Map(map) => map.len(),
                    Value::Range(range) => range.len(),
                    _ => 0,
                };
                Ok(Value::from(len))
            }),
        ),
    ];
    helpers
        .into_iter()
        .map(|(name, helper)| (name.to_string(), Value::Helper(helper)))
        .collect()
}

/// Every builtin as a `(name, value)` binding.
pub fn all() -> Vec<(String, Value)> {
    static BUILTINS: OnceLock<Vec<(String, Value)>> = OnceLock::new();
    BUILTINS.get_or_init(build).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let names: Vec<String> = all().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["range", "between", "until", "raw", "len"]);
    }
}
