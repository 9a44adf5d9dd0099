//! Lexer for Stencil templates.
//!
//! # Architecture
//!
//! A template alternates between literal text and code regions:
//!
//! ```text
//! <p><%= name %></p><% if (x) { %>yes<% } %><%# note %><%H slow() %>
//! ^^^ text        ^^^ text               ^^^ text
//! ```
//!
//! The [`Lexer`] tracks which of the two it is in. Region openers are looked
//! up through a [`Delimiters`] table, so the `<% %>` spelling can be remapped
//! per render.
//!
//! Errors are reported in-band as `Illegal` tokens; [`tokenize`] turns the
//! first one into a [`LexError`].

mod delimiters;
mod lexer;

pub use delimiters::{Delimiters, DelimitersError};
pub use lexer::{tokenize, LexError, LexErrorKind, Lexer};

#[cfg(test)]
mod tests;
