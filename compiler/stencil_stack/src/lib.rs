//! Stack growth for the recursive parts of Stencil.
//!
//! The parser and the evaluator both recurse once per nesting level of the
//! template (parenthesized expressions, nested `if`/`for` blocks, calls into
//! template functions). Templates come from users, so nesting depth is not
//! bounded; every recursive entry point goes through
//! [`ensure_sufficient_stack`], which switches to a freshly allocated stack
//! segment when the current one runs low.
//!
//! Hole renders run on spawned threads with the platform default stack size,
//! which makes this guard matter more there than on the caller's thread.
//!
//! On `wasm32` the guard is a plain call.

/// Grow when less than this much stack is left.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first moving to a new stack segment if the current one is nearly full.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
