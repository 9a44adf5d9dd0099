//! Indexing and `a[k] = v` assignment.
//!
//! Containers are shared values, so assignment rebuilds the container
//! (copying only if someone else still holds it) and writes the new value
//! back into the variable it came from.

use std::sync::Arc;

use stencil_ir::{Expr, IndexExpr};

use super::Interpreter;
use crate::errors::{
    index_out_of_bounds, invalid_assignment_target, invalid_index, not_indexable,
    unknown_identifier, EvalError, EvalResult,
};
use crate::value::Value;

impl Interpreter {
    pub(super) fn eval_index(&mut self, index: &IndexExpr) -> EvalResult {
        if let Some(value_expr) = &index.value {
            let value = self.eval_expr(value_expr)?;
            self.store(&index.left, &index.index, value)?;
            return Ok(Value::Nil);
        }
        let container = self.eval_expr(&index.left)?;
        let key = self.eval_expr(&index.index)?;
        Ok(index_value(&container, &key)?)
    }

    /// `target[key] = value`, then write the rebuilt container back.
    fn store(&mut self, target: &Expr, key_expr: &Expr, value: Value) -> EvalResult<()> {
        let container = self.eval_expr(target)?;
        let key = self.eval_expr(key_expr)?;
        let updated = store_value(container, &key, value)?;
        self.write_back(target, updated)
    }

    fn write_back(&mut self, target: &Expr, value: Value) -> EvalResult<()> {
        match target {
            Expr::Ident(ident) => {
                if self.symbols.assign(&ident.name, value) {
                    Ok(())
                } else {
                    Err(unknown_identifier(&ident.name).into())
                }
            }
            Expr::Index(inner) => self.store(&inner.left, &inner.index, value),
            other => Err(invalid_assignment_target(&other.to_string()).into()),
        }
    }
}

/// Convert a non-negative int index into a position below `len`.
fn position(index: i64, len: usize) -> Result<usize, EvalError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| index_out_of_bounds(index, len))
}

fn map_key(key: &Value) -> Option<String> {
    match key {
        Value::Str(s) | Value::Html(s) => Some(s.to_string()),
        Value::Int(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `container[key]`.
///
/// Missing map keys read as `nil`; list and string positions must exist.
pub(crate) fn index_value(container: &Value, key: &Value) -> Result<Value, EvalError> {
    match (container, key) {
        (Value::Map(map), key) => {
            let key = map_key(key).ok_or_else(|| invalid_index("map", key.type_name()))?;
            Ok(map.get(&key).cloned().unwrap_or(Value::Nil))
        }
        (Value::List(items), Value::Int(i)) => Ok(items[position(*i, items.len())?].clone()),
        (Value::Str(s) | Value::Html(s), Value::Int(i)) => {
            let len = s.chars().count();
            let at = position(*i, len)?;
            Ok(s.chars().nth(at).map_or(Value::Nil, |c| Value::string(c.to_string())))
        }
        (Value::Range(range), Value::Int(i)) => {
            let at = position(*i, range.len())?;
            Ok(range.iter().nth(at).map_or(Value::Nil, Value::Int))
        }
        (Value::List(_) | Value::Str(_) | Value::Html(_) | Value::Range(_), key) => {
            Err(invalid_index(container.type_name(), key.type_name()))
        }
        _ => Err(not_indexable(container.type_name())),
    }
}

/// `container[key] = value` on a copy-on-write container.
fn store_value(container: Value, key: &Value, value: Value) -> Result<Value, EvalError> {
    match container {
        Value::Map(mut map) => {
            let key = map_key(key).ok_or_else(|| invalid_index("map", key.type_name()))?;
            Arc::make_mut(&mut map).insert(key, value);
            Ok(Value::Map(map))
        }
        Value::List(mut items) => {
            let Value::Int(i) = key else {
                return Err(invalid_index("list", key.type_name()));
            };
            let at = position(*i, items.len())?;
            Arc::make_mut(&mut items)[at] = value;
            Ok(Value::List(items))
        }
        other => Err(not_indexable(other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test assertions use unwrap for clarity")]

    use super::*;
    use crate::errors::EvalErrorKind;
    use crate::value::MapValue;

    #[test]
    fn test_list_bounds() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(index_value(&list, &Value::Int(1)).unwrap(), Value::Int(2));
        let err = index_value(&list, &Value::Int(2)).unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::IndexOutOfBounds { index: 2, len: 2 }));
        assert!(index_value(&list, &Value::Int(-1)).is_err());
    }

    #[test]
    fn test_missing_map_key_is_nil() {
        let map: MapValue = [("a", Value::Int(1))].into_iter().collect();
        let map = Value::map(map);
        assert_eq!(index_value(&map, &Value::from("a")).unwrap(), Value::Int(1));
        assert_eq!(index_value(&map, &Value::from("b")).unwrap(), Value::Nil);
    }

    #[test]
    fn test_string_index_is_char_based() {
        let s = Value::from("héllo");
        assert_eq!(index_value(&s, &Value::Int(1)).unwrap(), Value::from("é"));
    }

    #[test]
    fn test_store_does_not_touch_shared_copy() {
        let original = Value::list(vec![Value::Int(1)]);
        let updated = store_value(original.clone(), &Value::Int(0), Value::Int(9)).unwrap();
        assert_eq!(original, Value::list(vec![Value::Int(1)]));
        assert_eq!(updated, Value::list(vec![Value::Int(9)]));
        assert!(store_value(original, &Value::Int(1), Value::Int(0)).is_err());
    }

    #[test]
    fn test_store_inserts_map_key() {
        let updated = store_value(Value::map(MapValue::new()), &Value::from("k"), Value::Int(1)).unwrap();
        assert_eq!(index_value(&updated, &Value::from("k")).unwrap(), Value::Int(1));
    }
}
