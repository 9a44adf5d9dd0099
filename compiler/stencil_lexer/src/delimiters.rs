//! Region delimiter table.
//!
//! Only the region opener and closer are configurable. The expression,
//! comment and hole openers are derived from the opener by appending
//! `=`, `#` and `H`.

use std::fmt;

const DEFAULT_START: &str = "<%";
const DEFAULT_END: &str = "%>";

/// The delimiter set used by one lexer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Delimiters {
    start: String,
    end: String,
    expr: String,
    comment: String,
    hole: String,
}

/// A proposed delimiter was not exactly two characters long.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DelimitersError {
    pub which: &'static str,
    pub value: String,
}

impl fmt::Display for DelimitersError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} delimiter must be exactly 2 characters, got {:?}",
            self.which, self.value
        )
    }
}

impl std::error::Error for DelimitersError {}

impl Delimiters {
    /// Build a delimiter set from a region opener and closer.
    pub fn new(start: &str, end: &str) -> Result<Self, DelimitersError> {
        check_length("start", start)?;
        check_length("end", end)?;
        Ok(Delimiters {
            start: start.to_string(),
            end: end.to_string(),
            expr: format!("{start}="),
            comment: format!("{start}#"),
            hole: format!("{start}H"),
        })
    }

    #[inline]
    pub fn start(&self) -> &str {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &str {
        &self.end
    }

    #[inline]
    pub fn expr_start(&self) -> &str {
        &self.expr
    }

    #[inline]
    pub fn comment_start(&self) -> &str {
        &self.comment
    }

    #[inline]
    pub fn hole_start(&self) -> &str {
        &self.hole
    }

    /// Wrap `body` in an expression region using this set.
    pub fn expression_region(&self, body: &str) -> String {
        format!("{} {} {}", self.expr, body, self.end)
    }
}

fn check_length(which: &'static str, value: &str) -> Result<(), DelimitersError> {
    if value.chars().count() == 2 {
        Ok(())
    } else {
        Err(DelimitersError {
            which,
            value: value.to_string(),
        })
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters {
            start: DEFAULT_START.to_string(),
            end: DEFAULT_END.to_string(),
            expr: format!("{DEFAULT_START}="),
            comment: format!("{DEFAULT_START}#"),
            hole: format!("{DEFAULT_START}H"),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "test assertions use unwrap for clarity"
)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set() {
        let d = Delimiters::default();
        assert_eq!(d.start(), "<%");
        assert_eq!(d.end(), "%>");
        assert_eq!(d.expr_start(), "<%=");
        assert_eq!(d.comment_start(), "<%#");
        assert_eq!(d.hole_start(), "<%H");
    }

    #[test]
    fn test_remapped_set() {
        let d = Delimiters::new("{{", "}}").unwrap();
        assert_eq!(d.expr_start(), "{{=");
        assert_eq!(d.hole_start(), "{{H");
        assert_eq!(d.expression_region("x"), "{{= x }}");
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = Delimiters::new("{{{", "}}").unwrap_err();
        assert_eq!(err.which, "start");
        let err = Delimiters::new("[[", "]").unwrap_err();
        assert_eq!(err.which, "end");
        assert_eq!(
            err.to_string(),
            "end delimiter must be exactly 2 characters, got \"]\""
        );
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        assert!(Delimiters::new("««", "»»").is_ok());
    }
}
