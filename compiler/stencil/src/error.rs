//! Errors returned by the render entry points.

use std::error::Error as StdError;
use std::sync::Arc;
use std::{fmt, io};

use stencil_eval::EvalError;
use stencil_lexer::DelimitersError;
use stencil_parse::ParseError;

/// Any failure of a render call.
///
/// Partial output is never returned alongside one of these.
#[derive(Clone, Debug)]
pub enum Error {
    /// The template source did not lex or parse.
    Parse(ParseError),
    /// Evaluation failed, in the template body or in one of its holes.
    Eval(EvalError),
    /// A delimiter remapping was rejected.
    Delimiters(DelimitersError),
    /// Reading the template source failed.
    Io(Arc<io::Error>),
    /// The task rendering hole `id`, opened at `line`, panicked.
    HolePanicked { id: usize, line: u32 },
}

impl Error {
    /// The evaluation error, if this is one.
    pub fn as_eval(&self) -> Option<&EvalError> {
        match self {
            Error::Eval(err) => Some(err),
            _ => None,
        }
    }

    /// 1-based source line the failure is attributed to, when known.
    pub fn line(&self) -> Option<u32> {
        match self {
            Error::Parse(err) => Some(err.line),
            Error::Eval(err) => err.line,
            Error::HolePanicked { line, .. } => Some(*line),
            Error::Delimiters(_) | Error::Io(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{err}"),
            Error::Eval(err) => write!(f, "{err}"),
            Error::Delimiters(err) => write!(f, "{err}"),
            Error::Io(err) => write!(f, "reading template: {err}"),
            Error::HolePanicked { id, line } => {
                write!(f, "line {line}: hole {id} panicked while rendering")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Eval(err) => Some(err),
            Error::Delimiters(err) => Some(err),
            Error::Io(err) => Some(&**err),
            Error::HolePanicked { .. } => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        Error::Eval(err)
    }
}

impl From<DelimitersError> for Error {
    fn from(err: DelimitersError) -> Self {
        Error::Delimiters(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}
