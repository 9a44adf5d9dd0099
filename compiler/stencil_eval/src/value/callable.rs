//! Callable values: template function literals and host helpers.

use std::fmt;
use std::sync::Arc;

use stencil_ir::Block;

use super::{MapValue, Value};
use crate::errors::{invalid_argument, wrong_arg_count, EvalError, HelperError};
use crate::helper_context::HelperContext;

/// A `fn(a, b) { ... }` literal.
///
/// Functions do not capture their defining scope; parameters are bound in
/// a child of the caller's scope.
#[derive(Debug)]
pub struct FunctionValue {
    pub params: Vec<String>,
    pub body: Arc<Block>,
}

/// Parameter kind accepted by a helper.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Kind {
    Any,
    /// Strings and markup.
    Str,
    Int,
    Float,
    Bool,
    /// Lists, or `nil`.
    List,
    /// Maps, or `nil`.
    Map,
    /// Functions and helpers, or `nil`.
    Callable,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Any => "any",
            Kind::Str => "string",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Callable => "func",
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Kind::Any, _)
            | (Kind::Str, Value::Str(_) | Value::Html(_))
            | (Kind::Int, Value::Int(_))
            | (Kind::Float, Value::Float(_))
            | (Kind::Bool, Value::Bool(_))
            | (Kind::List, Value::List(_) | Value::Nil)
            | (Kind::Map, Value::Map(_) | Value::Nil)
            | (Kind::Callable, Value::Function(_) | Value::Helper(_) | Value::Nil) => true,
            _ => false,
        }
    }
}

/// Declared parameters of a helper.
#[derive(Clone, Debug, Default)]
pub struct Signature {
    params: Vec<Kind>,
    variadic: Option<Kind>,
    options: bool,
}

impl Signature {
    pub fn new(params: impl Into<Vec<Kind>>) -> Self {
        Signature {
            params: params.into(),
            variadic: None,
            options: false,
        }
    }

    /// Accept any number of arguments of any kind, collected into one list.
    pub fn any() -> Self {
        Signature::new(Vec::new()).variadic(Kind::Any)
    }

    /// Collect trailing arguments of `kind` into a list passed last.
    #[must_use]
    pub fn variadic(mut self, kind: Kind) -> Self {
        self.variadic = Some(kind);
        self
    }

    /// Append an options-hash parameter that callers may omit; a missing
    /// hash is passed as an empty map.
    #[must_use]
    pub fn with_options(mut self) -> Self {
        self.params.push(Kind::Map);
        self.options = true;
        self
    }

    pub fn params(&self) -> &[Kind] {
        &self.params
    }

    /// Check `values` against the declared kinds.
    pub(crate) fn bind(&self, helper: &str, mut values: Vec<Value>) -> Result<Args, EvalError> {
        let declared = self.params.len();
        let required = declared - usize::from(self.options);
        let got = values.len();
        if got < required || (got > declared && self.variadic.is_none()) {
            return Err(wrong_arg_count(helper, required, got));
        }
        for (position, (value, kind)) in values.iter().zip(&self.params).enumerate() {
            if !kind.accepts(value) {
                return Err(invalid_argument(helper, position, value, kind.name()));
            }
        }
        if self.options && got == required {
            values.push(Value::Map(Arc::new(MapValue::new())));
        }
        if let Some(kind) = self.variadic {
            let rest = values.split_off(declared.min(values.len()));
            for (offset, value) in rest.iter().enumerate() {
                if !kind.accepts(value) {
                    return Err(invalid_argument(helper, declared + offset, value, kind.name()));
                }
            }
            values.push(Value::list(rest));
        }
        Ok(Args { values })
    }
}

/// Arguments handed to a helper after signature checking.
///
/// Accessors fall back to an empty value of the requested kind, so a helper
/// whose signature already guarantees the kind can read without matching.
#[derive(Clone, Debug, Default)]
pub struct Args {
    values: Vec<Value>,
}

static NIL: Value = Value::Nil;

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Args { values }
    }

    pub fn get(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&NIL)
    }

    pub fn str(&self, index: usize) -> &str {
        self.get(index).as_str().unwrap_or_default()
    }

    pub fn int(&self, index: usize) -> i64 {
        self.get(index).as_int().unwrap_or_default()
    }

    pub fn float(&self, index: usize) -> f64 {
        match self.get(index) {
            Value::Float(f) => *f,
            _ => 0.0,
        }
    }

    pub fn bool(&self, index: usize) -> bool {
        self.get(index).is_truthy()
    }

    pub fn list(&self, index: usize) -> &[Value] {
        match self.get(index) {
            Value::List(items) => items,
            _ => &[],
        }
    }

    pub fn map(&self, index: usize) -> Option<&MapValue> {
        match self.get(index) {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}

/// Host function body.
pub type HelperFn = dyn Fn(&mut HelperContext<'_>, Args) -> Result<Value, HelperError> + Send + Sync;

/// A host-registered callable.
#[derive(Clone)]
pub struct Helper {
    signature: Arc<Signature>,
    func: Arc<HelperFn>,
}

impl Helper {
    pub fn new<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(&mut HelperContext<'_>, Args) -> Result<Value, HelperError> + Send + Sync + 'static,
    {
        Helper {
            signature: Arc::new(signature),
            func: Arc::new(func),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn call(&self, ctx: &mut HelperContext<'_>, args: Args) -> Result<Value, HelperError> {
        (self.func)(ctx, args)
    }

    pub fn ptr_eq(&self, other: &Helper) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helper")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
