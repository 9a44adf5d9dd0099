//! Host-facing binding environment.
//!
//! A `Context` is a cheap handle; clones share the same bindings. Children
//! read through to their parent but keep writes to themselves, which is what
//! lets hole renders run on separate threads against the same parent.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::value::{Helper, Value};

struct ContextInner {
    parent: Option<Context>,
    data: RwLock<FxHashMap<String, Value>>,
    cache_key: RwLock<Option<String>>,
    hole_pass: bool,
}

/// Variables and helpers supplied to a render.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    pub fn new() -> Self {
        Context::make(None, false)
    }

    /// A root context holding `bindings`.
    pub fn with<K, V, I>(bindings: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let ctx = Context::new();
        for (name, value) in bindings {
            ctx.set(name, value);
        }
        ctx
    }

    fn make(parent: Option<Context>, hole_pass: bool) -> Self {
        Context {
            inner: Arc::new(ContextInner {
                parent,
                data: RwLock::new(FxHashMap::default()),
                cache_key: RwLock::new(None),
                hole_pass,
            }),
        }
    }

    /// A child whose writes stay invisible to `self`.
    #[must_use]
    pub fn child(&self) -> Context {
        Context::make(Some(self.clone()), self.is_hole_pass())
    }

    /// A child used to render one hole. Renders against it never touch the
    /// template cache and never spawn further threads.
    #[must_use]
    pub fn for_hole(&self) -> Context {
        Context::make(Some(self.clone()), true)
    }

    /// Look `name` up here, then in each ancestor.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.inner.data.read().get(name) {
            return Some(value.clone());
        }
        self.inner.parent.as_ref().and_then(|parent| parent.get(name))
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.data.write().insert(name.into(), value.into());
    }

    /// Register a helper under `name`.
    pub fn set_helper(&self, name: impl Into<String>, helper: Helper) {
        self.set(name, Value::Helper(helper));
    }

    pub fn has(&self, name: &str) -> bool {
        self.inner.data.read().contains_key(name)
            || self.inner.parent.as_ref().is_some_and(|parent| parent.has(name))
    }

    /// Every visible binding, with children overriding ancestors.
    pub fn export(&self) -> FxHashMap<String, Value> {
        let mut bindings = match &self.inner.parent {
            Some(parent) => parent.export(),
            None => FxHashMap::default(),
        };
        for (name, value) in self.inner.data.read().iter() {
            bindings.insert(name.clone(), value.clone());
        }
        bindings
    }

    /// Bindings set on `self` and its ancestors up to, not including, `stop`.
    ///
    /// Used to find what a helper added on top of the context a block was
    /// originally rendering against.
    pub fn bindings_until(&self, stop: &Context) -> Vec<(String, Value)> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(ctx) = current {
            if ctx.ptr_eq(stop) {
                break;
            }
            chain.push(ctx);
            current = ctx.inner.parent.as_ref();
        }
        let mut bindings = Vec::new();
        for ctx in chain.into_iter().rev() {
            for (name, value) in ctx.inner.data.read().iter() {
                bindings.push((name.clone(), value.clone()));
            }
        }
        bindings
    }

    /// Identity under which the rendered template may be cached.
    pub fn set_cache_key(&self, key: impl Into<String>) {
        *self.inner.cache_key.write() = Some(key.into());
    }

    pub fn cache_key(&self) -> Option<String> {
        if let Some(key) = self.inner.cache_key.read().as_ref() {
            return Some(key.clone());
        }
        self.inner.parent.as_ref().and_then(Context::cache_key)
    }

    /// Whether this context belongs to a hole render.
    pub fn is_hole_pass(&self) -> bool {
        self.inner.hole_pass
    }

    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.inner.data.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("Context")
            .field("names", &names)
            .field("has_parent", &self.inner.parent.is_some())
            .field("hole_pass", &self.inner.hole_pass)
            .finish()
    }
}
