//! Concurrent hole rendering and the splice pass.
//!
//! Every hole gets its own scoped thread and its own child context, so
//! tasks share no mutable evaluation state. All tasks are joined before
//! any result is looked at; a failing hole never cancels its siblings.

use std::thread;

use stencil_eval::{render_nested, Context, EvalError};
use stencil_lexer::Delimiters;
use tracing::{debug, trace};

use crate::error::Error;
use crate::template::HoleMarker;

/// Render a hole body as an expression region against `ctx`.
fn render_hole(input: &str, ctx: Context, delimiters: &Delimiters) -> Result<String, EvalError> {
    if input.trim().is_empty() {
        return Ok(String::new());
    }
    render_nested(&delimiters.expression_region(input), ctx, delimiters)
}

fn record(marker: &mut HoleMarker, outcome: Result<String, Error>) {
    match outcome {
        Ok(content) => marker.content = Some(content),
        Err(err) => marker.error = Some(err),
    }
}

/// Fill in `content` or `error` on every marker.
#[tracing::instrument(level = "debug", skip_all, fields(holes = markers.len()))]
pub(crate) fn render_all(markers: &mut [HoleMarker], ctx: &Context, delimiters: &Delimiters) {
    if markers.is_empty() {
        return;
    }
    if ctx.is_hole_pass() {
        for marker in markers.iter_mut() {
            let outcome = render_hole(&marker.input, ctx.for_hole(), delimiters);
            record(marker, outcome.map_err(Error::from));
        }
        return;
    }

    let outcomes: Vec<Result<String, Error>> = thread::scope(|scope| {
        let handles: Vec<_> = markers
            .iter()
            .map(|marker| {
                trace!(id = marker.id, "spawning hole task");
                let input = marker.input.as_str();
                let hole_ctx = ctx.for_hole();
                let (id, line) = (marker.id, marker.line);
                let handle = scope.spawn(move || render_hole(input, hole_ctx, delimiters));
                (id, line, handle)
            })
            .collect();
        handles
            .into_iter()
            .map(|(id, line, handle)| match handle.join() {
                Ok(outcome) => outcome.map_err(Error::from),
                Err(_) => Err(Error::HolePanicked { id, line }),
            })
            .collect()
    });

    for (marker, outcome) in markers.iter_mut().zip(outcomes) {
        record(marker, outcome);
    }
    debug!("holes rendered");
}

/// Walk `skeleton` once, replacing each marker's byte range with its
/// content. Markers must be in ascending, non-overlapping order.
pub(crate) fn splice(skeleton: &str, markers: &[HoleMarker]) -> Result<String, Error> {
    let mut out = String::with_capacity(skeleton.len());
    let mut cursor = 0;
    for marker in markers {
        if let Some(err) = &marker.error {
            return Err(err.clone());
        }
        out.push_str(&skeleton[cursor..marker.range.start]);
        out.push_str(marker.content.as_deref().unwrap_or_default());
        cursor = marker.range.end;
    }
    out.push_str(&skeleton[cursor..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test assertions use unwrap for clarity")]

    use pretty_assertions::assert_eq;
    use stencil_eval::{unknown_identifier, Helper, Signature};

    use super::*;

    fn marker(id: usize, range: std::ops::Range<usize>, content: &str) -> HoleMarker {
        HoleMarker {
            id,
            range,
            input: String::new(),
            line: 1,
            content: Some(content.to_string()),
            error: None,
        }
    }

    #[test]
    fn test_splice_uses_ranges() {
        let skeleton = "a<X>b<Y>c";
        let markers = [marker(0, 1..4, "1"), marker(1, 5..8, "22")];
        assert_eq!(splice(skeleton, &markers).unwrap(), "a1b22c");
    }

    #[test]
    fn test_splice_first_error_wins() {
        let mut markers = [marker(0, 0..1, ""), marker(1, 1..2, ""), marker(2, 2..3, "")];
        markers[1].error = Some(Error::Eval(unknown_identifier("first")));
        markers[2].error = Some(Error::HolePanicked { id: 2, line: 1 });
        let err = splice("abc", &markers).unwrap_err();
        assert_eq!(err.to_string(), "\"first\": unknown identifier");
    }

    #[test]
    fn test_empty_hole_renders_nothing() {
        let out = render_hole("  ", Context::new(), &Delimiters::default()).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_panicking_hole() {
        let ctx = Context::new();
        ctx.set_helper(
            "boom",
            Helper::new(Signature::new(Vec::new()), |_, _| panic!("hole task failure")),
        );
        let mut markers = [
            HoleMarker {
                id: 0,
                range: 0..0,
                input: "1".to_string(),
                line: 1,
                content: None,
                error: None,
            },
            HoleMarker {
                id: 1,
                range: 0..0,
                input: "boom()".to_string(),
                line: 3,
                content: None,
                error: None,
            },
        ];
        render_all(&mut markers, &ctx, &Delimiters::default());
        assert_eq!(markers[0].content.as_deref(), Some("1"));
        assert!(matches!(markers[1].error, Some(Error::HolePanicked { id: 1, line: 3 })));
    }
}
