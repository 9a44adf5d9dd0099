//! Render configuration and the configured entry point.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use stencil_eval::{Context, Helper, Kind, Signature, Value};
use stencil_lexer::Delimiters;
use tracing::{debug, trace};

use crate::cache::TemplateCache;
use crate::error::Error;
use crate::template::Template;

/// What a [`Renderer`] needs to know up front.
///
/// The default uses `<% %>` delimiters and no cache.
#[derive(Clone, Default)]
pub struct RenderConfig {
    delimiters: Delimiters,
    cache: Option<Arc<dyn TemplateCache>>,
}

impl RenderConfig {
    pub fn new() -> Self {
        RenderConfig::default()
    }

    #[must_use]
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Enable caching of parsed templates in `cache`.
    ///
    /// Only renders whose context carries a cache key use it.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn TemplateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    pub fn cache(&self) -> Option<&Arc<dyn TemplateCache>> {
        self.cache.as_ref()
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("delimiters", &self.delimiters)
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

/// Renders templates under one [`RenderConfig`].
///
/// Cheap to clone and safe to share between threads.
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Renderer { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn parse(&self, source: &str) -> Result<Template, Error> {
        Template::parse_with(source, &self.config.delimiters)
    }

    /// Render `source` against `ctx`.
    ///
    /// The cache is consulted only when one is configured, `ctx` carries a
    /// cache key, and this is not a render made for a hole. A miss is stored
    /// once the template body has evaluated, even if one of its holes then
    /// fails.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn render(&self, source: &str, ctx: &Context) -> Result<String, Error> {
        let cache = self
            .config
            .cache
            .as_deref()
            .filter(|_| !ctx.is_hole_pass())
            .and_then(|cache| ctx.cache_key().map(|key| (cache, key)));

        let Some((cache, key)) = cache else {
            return self.parse(source)?.render_with(ctx);
        };

        let (template, hit) = match cache.get(&key) {
            Some(template) => {
                debug!(key = %key, "template cache hit");
                (template, true)
            }
            None => {
                debug!(key = %key, "template cache miss");
                (self.parse(source)?, false)
            }
        };

        let mut evaluated = template.exec(ctx)?;
        if !hit {
            let stored = evaluated.cleared();
            trace!(key = %key, holes = stored.holes().len(), "storing template");
            cache.set(&key, stored);
        }
        evaluated.fill_holes(ctx);
        evaluated.splice()
    }

    /// Read all of `reader` as template source and render it against `ctx`.
    pub fn render_reader(&self, mut reader: impl Read, ctx: &Context) -> Result<String, Error> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        self.render(&source, ctx)
    }

    /// Evaluate `source` as the body of one statement region, for its
    /// side effects.
    ///
    /// Runs against a child of `ctx` that also binds `print` and `println`
    /// to standard output.
    pub fn run_script(&self, source: &str, ctx: &Context) -> Result<(), Error> {
        let delimiters = &self.config.delimiters;
        let wrapped = format!("{} {} {}", delimiters.start(), source, delimiters.end());
        let ctx = ctx.child();
        ctx.set_helper(
            "print",
            Helper::new(Signature::new([Kind::Any]), |_, args| {
                print!("{}", args.get(0));
                Ok(Value::Nil)
            }),
        );
        ctx.set_helper(
            "println",
            Helper::new(Signature::new([Kind::Any]), |_, args| {
                println!("{}", args.get(0));
                Ok(Value::Nil)
            }),
        );
        self.render(&wrapped, &ctx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test assertions use unwrap for clarity")]

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cache::InMemoryCache;

    #[test]
    fn test_custom_delimiters() {
        let renderer = Renderer::new(
            RenderConfig::new().with_delimiters(Delimiters::new("{{", "}}").unwrap()),
        );
        let ctx = Context::with([("name", "mark")]);
        assert_eq!(renderer.render("Hi {{= name }} <%= x %>", &ctx).unwrap(), "Hi mark <%= x %>");
    }

    #[test]
    fn test_cache_requires_key() {
        let cache = Arc::new(InMemoryCache::new());
        let renderer = Renderer::new(RenderConfig::new().with_cache(cache.clone()));
        renderer.render("a", &Context::new()).unwrap();
        assert!(cache.is_empty());

        let ctx = Context::new();
        ctx.set_cache_key("a.html");
        renderer.render("a", &ctx).unwrap();
        assert!(cache.contains("a.html"));
    }

    #[test]
    fn test_hole_pass_skips_cache() {
        let cache = Arc::new(InMemoryCache::new());
        let renderer = Renderer::new(RenderConfig::new().with_cache(cache.clone()));
        let ctx = Context::new();
        ctx.set_cache_key("k");
        renderer.render("a", &ctx.for_hole()).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_render_reader() {
        let ctx = Context::with([("name", "mark")]);
        let source: &[u8] = b"Hi <%= name %>";
        assert_eq!(Renderer::default().render_reader(source, &ctx).unwrap(), "Hi mark");
    }

    #[test]
    fn test_render_reader_surfaces_read_failure() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            }
        }
        let err = Renderer::default().render_reader(Broken, &Context::new()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "reading template: gone");
        assert!(err.line().is_none());
    }

    #[test]
    fn test_config_debug_hides_cache() {
        let config = RenderConfig::new().with_cache(Arc::new(InMemoryCache::new()));
        assert!(format!("{config:?}").contains("cache: true"));
    }
}
