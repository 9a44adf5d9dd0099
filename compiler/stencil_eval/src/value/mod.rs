//! Runtime values.
//!
//! A closed set of variants covers everything templates compute with;
//! [`HostObject`] is the escape hatch for host values reached only through
//! field and method access.
//!
//! All heap payloads sit behind `Arc`, so cloning a value is cheap and
//! values can cross into hole-rendering threads.

mod callable;
mod map;
mod record;

use std::fmt;
use std::sync::Arc;

pub use callable::{Args, FunctionValue, Helper, HelperFn, Kind, Signature};
pub use map::MapValue;
pub use record::{HostObject, Record};

/// Half-open integer range produced by the `range` family of builtins.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RangeValue {
    pub start: i64,
    pub end: i64,
}

impl RangeValue {
    pub fn len(self) -> usize {
        usize::try_from(self.end.saturating_sub(self.start)).unwrap_or(0)
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn iter(self) -> std::ops::Range<i64> {
        self.start..self.end
    }
}

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Plain text; HTML-escaped when printed.
    Str(Arc<str>),
    /// Pre-escaped markup; printed verbatim.
    Html(Arc<str>),
    List(Arc<Vec<Value>>),
    Map(Arc<MapValue>),
    Record(Arc<Record>),
    Range(RangeValue),
    Function(Arc<FunctionValue>),
    Helper(Helper),
    Object(Arc<dyn HostObject>),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn html(s: impl Into<Arc<str>>) -> Self {
        Value::Html(s.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    pub fn map(map: MapValue) -> Self {
        Value::Map(Arc::new(map))
    }

    pub fn record(record: Record) -> Self {
        Value::Record(Arc::new(record))
    }

    pub fn object(object: impl HostObject + 'static) -> Self {
        Value::Object(Arc::new(object))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Html(_) => "html",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Range(_) => "range",
            Value::Function(_) => "func",
            Value::Helper(_) => "helper",
            Value::Object(_) => "object",
        }
    }

    /// `nil` is false, a bool is itself, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Text of a string or markup value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Html(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a) | Value::Html(a), Value::Str(b) | Value::Html(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Helper(a), Value::Helper(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Html(s) => write!(f, "Html({s:?})"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Value::Record(record) => {
                let mut s = f.debug_struct(record.type_name());
                for (name, value) in record.fields() {
                    s.field(name, value);
                }
                s.finish()
            }
            Value::Range(r) => write!(f, "Range({}..{})", r.start, r.end),
            Value::Function(func) => write!(f, "Function({})", func.params.join(", ")),
            Value::Helper(helper) => fmt::Debug::fmt(helper, f),
            Value::Object(object) => fmt::Debug::fmt(object, f),
        }
    }
}

/// Unescaped text form, used for string concatenation and messages.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) | Value::Html(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Record(record) => {
                write!(f, "{}{{", record.type_name())?;
                for (i, (name, value)) in record.fields().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Range(r) => write!(f, "{}..{}", r.start, r.end),
            Value::Function(func) => write!(f, "fn({})", func.params.join(", ")),
            Value::Helper(_) => f.write_str("helper"),
            Value::Object(object) => match object.to_text() {
                Some(text) => f.write_str(&text),
                None => write!(f, "<{}>", object.type_name()),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<MapValue> for Value {
    fn from(map: MapValue) -> Self {
        Value::map(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::record(record)
    }
}

impl From<Helper> for Value {
    fn from(helper: Helper) -> Self {
        Value::Helper(helper)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::from("").is_truthy());
        assert!(Value::list(vec![]).is_truthy());
    }

    #[test]
    fn test_mixed_numeric_kinds_are_unequal() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::from("a"), Value::html("a"));
        assert_ne!(Value::Nil, Value::Bool(false));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Float(4.0).to_string(), "4");
        assert_eq!(Value::Float(1.1 + 3.1).to_string(), "4.2");
        assert_eq!(Value::Nil.to_string(), "");
        let list = Value::list(vec![Value::Int(1), Value::from("b")]);
        assert_eq!(list.to_string(), "[1 b]");
        let map: MapValue = [("a", Value::Int(1))].into_iter().collect();
        assert_eq!(Value::map(map).to_string(), "{a: 1}");
    }

    #[test]
    fn test_range_len() {
        assert_eq!(RangeValue { start: 2, end: 5 }.len(), 3);
        assert!(RangeValue { start: 5, end: 2 }.is_empty());
    }
}
