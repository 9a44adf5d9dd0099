//! Stencil: an embeddable template language.
//!
//! Templates mix literal text with code regions:
//!
//! ```text
//! <ul><%= for (i, item) in items { %><li><%= item %></li><% } %></ul>
//! <%# comments are dropped %>
//! <%H slow_widget() %>
//! ```
//!
//! `<% %>` runs code, `<%= %>` prints, `<%# %>` is a comment and `<%H %>`
//! marks a hole: a region rendered concurrently with the other holes after
//! the rest of the template, then spliced back into place.
//!
//! [`render`] covers the common case. [`Renderer`] takes a [`RenderConfig`]
//! for custom delimiters or a [`TemplateCache`]; [`Template`] exposes the
//! parse, evaluate and splice stages separately.

mod cache;
mod config;
mod error;
mod holes;
mod template;

use std::sync::Once;

pub use cache::{InMemoryCache, TemplateCache};
pub use config::{RenderConfig, Renderer};
pub use error::Error;
pub use template::{HoleMarker, Template};

pub use stencil_eval::{
    html_escape, Args, Context, EvalError, EvalErrorKind, Helper, HelperContext, HelperError,
    HostObject, Kind, MapValue, Record, Signature, Value,
};
pub use stencil_lexer::{Delimiters, DelimitersError};
pub use stencil_parse::{ParseError, ParseErrorKind};

/// Render `source` against `ctx` with the default configuration.
pub fn render(source: &str, ctx: &Context) -> Result<String, Error> {
    Renderer::default().render(source, ctx)
}

/// Render template source read from `reader` with the default configuration.
pub fn render_reader(reader: impl std::io::Read, ctx: &Context) -> Result<String, Error> {
    Renderer::default().render_reader(reader, ctx)
}

/// Parse `source` with the default delimiters.
pub fn parse(source: &str) -> Result<Template, Error> {
    Template::parse(source)
}

/// Run `source` as a script for its side effects.
///
/// See [`Renderer::run_script`].
pub fn run_script(source: &str, ctx: &Context) -> Result<(), Error> {
    Renderer::default().run_script(source, ctx)
}

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber, once per process.
///
/// Does nothing unless `RUST_LOG` is set. `STENCIL_LOG_TREE=1` swaps the
/// flat formatter for an indented span tree.
///
/// ```bash
/// RUST_LOG=stencil=debug my-app
/// RUST_LOG=stencil_eval=trace STENCIL_LOG_TREE=1 my-app
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let tree = std::env::var("STENCIL_LOG_TREE").is_ok_and(|v| v == "1");
        if tree {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
mod tests;
