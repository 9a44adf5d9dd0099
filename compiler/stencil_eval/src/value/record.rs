//! Struct-like values: plain records and opaque host objects.

use std::fmt;

use super::Value;
use crate::errors::HelperError;

/// A named bag of fields supplied by the host.
///
/// A field holding a function or helper can be called as a method:
/// `user.Greet("hi")`.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Record {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field insertion. A repeated name overwrites.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(name, value.into());
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Capability interface for opaque host values.
///
/// Templates reach host objects only through member access and method
/// calls; everything else about them stays private to the host.
pub trait HostObject: Send + Sync {
    /// Name used in error messages.
    fn type_name(&self) -> &str;

    /// `obj.name`. `None` means no such field.
    fn get_field(&self, name: &str) -> Option<Value>;

    /// `obj.name(args)`. `None` means no such method.
    fn call_method(&self, name: &str, args: Vec<Value>) -> Option<Result<Value, HelperError>> {
        let _ = (name, args);
        None
    }

    /// Text written when the object is printed. `None` prints nothing.
    fn to_text(&self) -> Option<String> {
        None
    }
}

impl fmt::Debug for dyn HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostObject({})", self.type_name())
    }
}
