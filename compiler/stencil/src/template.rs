//! Parsed templates and the evaluate / fill / splice stages.

use std::ops::Range;
use std::sync::Arc;

use stencil_eval::{Context, HoleSite, Interpreter};
use stencil_ir::Program;
use stencil_lexer::Delimiters;
use tracing::debug;

use crate::error::Error;
use crate::holes;

/// A deferred region of a skeleton.
///
/// `range` is the byte range of the marker text inside the skeleton.
/// `content` and `error` are empty until the hole has been rendered.
#[derive(Clone, Debug)]
pub struct HoleMarker {
    pub id: usize,
    pub range: Range<usize>,
    pub input: String,
    pub line: u32,
    pub content: Option<String>,
    pub error: Option<Error>,
}

impl HoleMarker {
    fn from_site(site: HoleSite) -> Self {
        HoleMarker {
            id: site.index,
            range: site.range,
            input: site.input,
            line: site.line,
            content: None,
            error: None,
        }
    }

    /// This marker with its rendered content and error reset.
    pub fn cleared(&self) -> Self {
        HoleMarker {
            content: None,
            error: None,
            ..self.clone()
        }
    }
}

/// A parsed template.
///
/// After [`Template::exec`] it also carries the skeleton output and the
/// position-ordered hole markers of that evaluation. A template holding a
/// skeleton and at least one hole reuses the skeleton on the next `exec`
/// instead of evaluating the program again.
#[derive(Clone, Debug)]
pub struct Template {
    source: Arc<str>,
    program: Arc<Program>,
    delimiters: Delimiters,
    skeleton: Option<Arc<str>>,
    holes: Vec<HoleMarker>,
}

impl Template {
    /// Parse `source` with the default delimiters.
    pub fn parse(source: &str) -> Result<Self, Error> {
        Template::parse_with(source, &Delimiters::default())
    }

    pub fn parse_with(source: &str, delimiters: &Delimiters) -> Result<Self, Error> {
        let program = stencil_parse::parse_with(source, delimiters)?;
        Ok(Template {
            source: Arc::from(source),
            program: Arc::new(program),
            delimiters: delimiters.clone(),
            skeleton: None,
            holes: Vec::new(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    pub fn skeleton(&self) -> Option<&str> {
        self.skeleton.as_deref()
    }

    pub fn holes(&self) -> &[HoleMarker] {
        &self.holes
    }

    /// Evaluate against `ctx`, producing the skeleton and unfilled holes.
    ///
    /// When this template already carries a skeleton with holes, that
    /// skeleton is reused and only fresh, content-cleared markers are
    /// returned.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn exec(&self, ctx: &Context) -> Result<Template, Error> {
        if self.skeleton.is_some() && !self.holes.is_empty() {
            debug!(holes = self.holes.len(), "reusing skeleton");
            return Ok(self.cleared());
        }
        let mut interpreter = Interpreter::with_delimiters(ctx.clone(), self.delimiters.clone());
        let rendered = interpreter.execute(&self.program)?;
        Ok(Template {
            skeleton: Some(Arc::from(rendered.output)),
            holes: rendered.holes.into_iter().map(HoleMarker::from_site).collect(),
            ..self.clone()
        })
    }

    /// Render every hole against a private child of `ctx`.
    ///
    /// Holes run concurrently, one task each, unless `ctx` is already a
    /// hole pass. Failures are recorded on their marker.
    pub fn fill_holes(&mut self, ctx: &Context) {
        holes::render_all(&mut self.holes, ctx, &self.delimiters);
    }

    /// Substitute each hole's content for its marker.
    ///
    /// The first failed hole in position order fails the whole splice. A
    /// template that was never executed splices to the empty string.
    pub fn splice(&self) -> Result<String, Error> {
        let Some(skeleton) = self.skeleton.as_deref() else {
            return Ok(String::new());
        };
        holes::splice(skeleton, &self.holes)
    }

    /// Evaluate, fill the holes and splice, in one call.
    pub fn render_with(&self, ctx: &Context) -> Result<String, Error> {
        let mut evaluated = self.exec(ctx)?;
        evaluated.fill_holes(ctx);
        evaluated.splice()
    }

    /// The copy worth caching: markers lose their content, and a skeleton
    /// without holes is dropped so the program is evaluated again.
    pub fn cleared(&self) -> Template {
        let skeleton = if self.holes.is_empty() {
            None
        } else {
            self.skeleton.clone()
        };
        Template {
            source: Arc::clone(&self.source),
            program: Arc::clone(&self.program),
            delimiters: self.delimiters.clone(),
            skeleton,
            holes: self.holes.iter().map(HoleMarker::cleared).collect(),
        }
    }
}
