//! Compiled-path cache.
//!
//! Keyed by the exact path string, so `a.b` and `a['b']` are separate entries
//! even though they compile to the same tokens. Owners clear it whenever the
//! syntax changes.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::ast::TokenSet;

pub const DEFAULT_CAPACITY: usize = 1024;

pub struct TokenCache {
    entries: LruCache<String, Arc<TokenSet>>,
}

impl TokenCache {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        TokenCache {
            entries: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, path: &str) -> Option<Arc<TokenSet>> {
        self.entries.get(path).cloned()
    }

    pub fn put(&mut self, path: &str, tokens: Arc<TokenSet>) {
        self.entries.put(path.to_owned(), tokens);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        TokenCache::new(DEFAULT_CAPACITY)
    }
}
