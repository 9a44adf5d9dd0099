//! Error types for template evaluation.
//!
//! `EvalErrorKind` gives every failure a typed category so hosts can match
//! on it instead of parsing messages. The factory functions below are the
//! public way to build errors; the `Display` impl produces the observable
//! message text.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use stencil_parse::{ParseError, ParseErrorKind};

use crate::value::Value;

/// Error returned by a host helper.
///
/// Shared so the same failure can travel through cloned results and still
/// be downcast to the host's own type.
pub type HelperError = Arc<dyn StdError + Send + Sync + 'static>;

/// Typed error category.
#[derive(Clone, Debug)]
pub enum EvalErrorKind {
    // Resolution
    UnknownIdentifier {
        name: String,
    },
    NoSuchMember {
        receiver: String,
        member: String,
    },
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },
    InvalidIndex {
        container: &'static str,
        index: &'static str,
    },
    NotIndexable {
        type_name: &'static str,
    },

    // Type/Operator
    BinaryTypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    UnaryTypeMismatch {
        op: &'static str,
        operand: &'static str,
    },
    NotIterable {
        type_name: &'static str,
    },
    NotCallable {
        name: String,
        type_name: &'static str,
    },
    InvalidRegex {
        pattern: String,
        message: String,
    },

    // Arithmetic
    DivisionByZero,
    IntegerOverflow {
        op: &'static str,
    },

    // Calls
    InvalidArgument {
        helper: String,
        position: usize,
        value: String,
        found: &'static str,
        expected: &'static str,
    },
    WrongArgCount {
        helper: String,
        expected: usize,
        got: usize,
    },

    // Assignment
    InvalidAssignmentTarget {
        target: String,
    },

    /// A template rendered from inside a helper failed to parse.
    Parse(ParseErrorKind),

    /// A host helper returned an error.
    Helper(HelperError),
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalErrorKind::UnknownIdentifier { name } => {
                write!(f, "\"{name}\": unknown identifier")
            }
            EvalErrorKind::NoSuchMember { receiver, member } => write!(
                f,
                "'{receiver}' does not have a field or method named '{member}' ({receiver}.{member})"
            ),
            EvalErrorKind::IndexOutOfBounds { index, len } => {
                write!(f, "index out of range: {index} with length {len}")
            }
            EvalErrorKind::InvalidIndex { container, index } => {
                write!(f, "cannot index {container} with {index}")
            }
            EvalErrorKind::NotIndexable { type_name } => {
                write!(f, "could not index {type_name}")
            }
            EvalErrorKind::BinaryTypeMismatch { op, left, right } => {
                write!(f, "unable to operate ({op}) on {left} and {right}")
            }
            EvalErrorKind::UnaryTypeMismatch { op, operand } => {
                write!(f, "unable to operate ({op}) on {operand}")
            }
            EvalErrorKind::NotIterable { type_name } => {
                write!(f, "could not iterate over {type_name}")
            }
            EvalErrorKind::NotCallable { name, type_name } => {
                write!(f, "{name} ({type_name}) is not callable")
            }
            EvalErrorKind::InvalidRegex { pattern, message } => {
                write!(f, "invalid regular expression {pattern:?}: {message}")
            }
            EvalErrorKind::DivisionByZero => write!(f, "division by zero"),
            EvalErrorKind::IntegerOverflow { op } => write!(f, "integer overflow in {op}"),
            EvalErrorKind::InvalidArgument {
                helper,
                position,
                value,
                found,
                expected,
            } => write!(
                f,
                "{value} ({found}) is an invalid argument for {helper} at pos {position}: expected ({expected})"
            ),
            EvalErrorKind::WrongArgCount {
                helper,
                expected,
                got,
            } => write!(
                f,
                "{helper} expects {expected} argument{}, got {got}",
                if *expected == 1 { "" } else { "s" }
            ),
            EvalErrorKind::InvalidAssignmentTarget { target } => {
                write!(f, "cannot assign to {target}")
            }
            EvalErrorKind::Parse(kind) => write!(f, "{kind}"),
            EvalErrorKind::Helper(err) => write!(f, "{err}"),
        }
    }
}

/// Evaluation error: a category plus the line of the node that raised it.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub line: Option<u32>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError { kind, line: None }
    }

    /// Attach a line unless an inner node already did.
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    /// The host error carried by a failing helper, if any.
    pub fn helper_error(&self) -> Option<&HelperError> {
        match &self.kind {
            EvalErrorKind::Helper(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl StdError for EvalError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            EvalErrorKind::Helper(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ParseError> for EvalError {
    fn from(err: ParseError) -> Self {
        EvalError::new(EvalErrorKind::Parse(err.kind)).at_line(err.line)
    }
}

/// Non-local control flow threaded through the error channel of the walk.
///
/// `Break`, `Continue` and `Return` are never seen by hosts; the loop,
/// function call or top-level statement that owns them absorbs them.
#[derive(Clone, Debug)]
pub(crate) enum ControlAction {
    Error(EvalError),
    Break,
    Continue,
    /// `output` is what the enclosing blocks produced before the return.
    Return { output: String, value: Value },
}

impl From<EvalError> for ControlAction {
    fn from(err: EvalError) -> Self {
        ControlAction::Error(err)
    }
}

/// Result of evaluating one node.
pub(crate) type EvalResult<T = Value> = Result<T, ControlAction>;

// Factories

#[cold]
pub fn unknown_identifier(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UnknownIdentifier {
        name: name.to_string(),
    })
}

#[cold]
pub fn no_such_member(receiver: &str, member: &str) -> EvalError {
    EvalError::new(EvalErrorKind::NoSuchMember {
        receiver: receiver.to_string(),
        member: member.to_string(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::new(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn invalid_index(container: &'static str, index: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidIndex { container, index })
}

#[cold]
pub fn not_indexable(type_name: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::NotIndexable { type_name })
}

#[cold]
pub fn binary_type_mismatch(op: &'static str, left: &'static str, right: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::BinaryTypeMismatch { op, left, right })
}

#[cold]
pub fn unary_type_mismatch(op: &'static str, operand: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::UnaryTypeMismatch { op, operand })
}

#[cold]
pub fn not_iterable(type_name: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::NotIterable { type_name })
}

#[cold]
pub fn not_callable(name: &str, type_name: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::NotCallable {
        name: name.to_string(),
        type_name,
    })
}

#[cold]
pub fn invalid_regex(pattern: &str, message: impl fmt::Display) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidRegex {
        pattern: pattern.to_string(),
        message: message.to_string(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn integer_overflow(op: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::IntegerOverflow { op })
}

#[cold]
pub fn invalid_argument(
    helper: &str,
    position: usize,
    value: &Value,
    expected: &'static str,
) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidArgument {
        helper: helper.to_string(),
        position,
        value: value.to_string(),
        found: value.type_name(),
        expected,
    })
}

#[cold]
pub fn wrong_arg_count(helper: &str, expected: usize, got: usize) -> EvalError {
    EvalError::new(EvalErrorKind::WrongArgCount {
        helper: helper.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn invalid_assignment_target(target: &str) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidAssignmentTarget {
        target: target.to_string(),
    })
}

#[cold]
pub fn helper_failed(err: HelperError) -> EvalError {
    EvalError::new(EvalErrorKind::Helper(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }

    impl StdError for Boom {}

    #[test]
    fn test_line_prefix() {
        let err = unknown_identifier("foo").at_line(3);
        assert_eq!(err.to_string(), "line 3: \"foo\": unknown identifier");
    }

    #[test]
    fn test_innermost_line_wins() {
        let err = division_by_zero().at_line(4).at_line(1);
        assert_eq!(err.line, Some(4));
    }

    #[test]
    fn test_member_message() {
        let err = no_such_member("m", "Foo");
        assert_eq!(
            err.to_string(),
            "'m' does not have a field or method named 'Foo' (m.Foo)"
        );
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = invalid_argument("foo", 2, &Value::from("test"), "int");
        assert_eq!(
            err.to_string(),
            "test (string) is an invalid argument for foo at pos 2: expected (int)"
        );
    }

    #[test]
    fn test_helper_error_is_source() {
        let err = helper_failed(Arc::new(Boom)).at_line(1);
        assert_eq!(err.to_string(), "line 1: boom");
        let source = err.source().and_then(|s| s.downcast_ref::<Boom>());
        assert!(source.is_some());
    }
}
