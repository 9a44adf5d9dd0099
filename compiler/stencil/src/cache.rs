//! Compiled-template cache.
//!
//! The renderer needs only the four operations of [`TemplateCache`]; the
//! storage behind them is up to the host. [`InMemoryCache`] is the stock
//! process-local backend.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::template::Template;

/// Storage for parsed templates keyed by a caller-chosen identity.
///
/// Shared between concurrent renders, so implementations synchronize
/// internally. Stored entries are never mutated by the renderer; every
/// render works on its own copy.
pub trait TemplateCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Template>;

    fn set(&self, key: &str, template: Template);

    /// Drop the entries for every key in `keys`. Unknown keys are ignored.
    fn delete(&self, keys: &[&str]);

    fn clear(&self);
}

/// A [`TemplateCache`] backed by a hash map behind a read-write lock.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<FxHashMap<String, Template>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        InMemoryCache::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

impl TemplateCache for InMemoryCache {
    fn get(&self, key: &str) -> Option<Template> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, template: Template) {
        self.entries.write().insert(key.to_string(), template);
    }

    fn delete(&self, keys: &[&str]) {
        let mut entries = self.entries.write();
        for key in keys {
            entries.remove(*key);
        }
    }

    fn clear(&self) {
        self.entries.write().clear();
    }
}
