//! The [`Engine`]: syntax configuration, compiled-path cache and the public
//! read/write/search operations.
//!
//! # Examples
//!
//! ```
//! use keypath::{Engine, Value};
//!
//! let engine = Engine::new();
//! let mut doc = Value::from(serde_json::json!({"foo": {"bar": 123, "baz": [{"qux": 456}]}}));
//!
//! assert_eq!(engine.get(&doc, "foo.bar", &[]), Some(Value::Integer(123)));
//! assert!(engine.set(&mut doc, "foo.baz.0.qux", Value::Integer(7), &[]));
//! assert_eq!(engine.get(&doc, "foo.baz<qux", &[]), Some(Value::Array(vec![Value::Integer(7)])));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::{ContainerRole, PrefixRole, SeparatorRole, TokenSet};
use crate::cache::{DEFAULT_CAPACITY, TokenCache};
use crate::error::{ConfigError, PathError, SyntaxError};
use crate::fast_path;
use crate::lexer::tokenize;
use crate::resolver;
use crate::search::{self, FindMode};
use crate::syntax::SyntaxConfig;
use crate::value::Value;

/// Construction options for an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Keep compiled paths between calls
    pub cache: bool,
    /// Create missing intermediate objects on writes
    pub force: bool,
    pub cache_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            cache: true,
            force: false,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// A path given either as text or already compiled.
#[derive(Debug, Clone, Copy)]
pub enum PathRef<'a> {
    Raw(&'a str),
    Compiled(&'a TokenSet),
}

impl<'a> From<&'a str> for PathRef<'a> {
    fn from(path: &'a str) -> Self {
        PathRef::Raw(path)
    }
}

impl<'a> From<&'a String> for PathRef<'a> {
    fn from(path: &'a String) -> Self {
        PathRef::Raw(path)
    }
}

impl<'a> From<&'a TokenSet> for PathRef<'a> {
    fn from(tokens: &'a TokenSet) -> Self {
        PathRef::Compiled(tokens)
    }
}

/// Resolves paths against values.
///
/// An engine owns mutable state (its syntax tables and cache) and is meant to
/// be used from one thread at a time; build one per thread when needed.
pub struct Engine {
    syntax: SyntaxConfig,
    /// Tables in effect when simple mode was entered
    before_simple: Option<SyntaxConfig>,
    cache: RefCell<TokenCache>,
    cache_enabled: bool,
    force: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Engine::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Engine {
            syntax: SyntaxConfig::default(),
            before_simple: None,
            cache: RefCell::new(TokenCache::new(options.cache_capacity)),
            cache_enabled: options.cache,
            force: options.force,
        }
    }

    pub fn syntax(&self) -> &SyntaxConfig {
        &self.syntax
    }

    pub fn is_force(&self) -> bool {
        self.force
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Number of compiled paths currently cached
    pub fn cached_paths(&self) -> usize {
        self.cache.borrow().len()
    }

    // ============================================================
    // Public operations
    // ============================================================

    /// Tokenizes `path` with the current syntax.
    pub fn get_tokens(&self, path: &str) -> Result<TokenSet, SyntaxError> {
        self.compile(path).map(|tokens| TokenSet::clone(&tokens))
    }

    pub fn is_valid(&self, path: &str) -> bool {
        self.compile(path).is_ok()
    }

    /// Escapes every special character of `segment` so it reads as one literal name.
    pub fn escape(&self, segment: &str) -> String {
        self.syntax.escape(segment)
    }

    /// Reads the value at `path`, or `None` when it cannot be resolved.
    pub fn get<'p>(&self, root: &Value, path: impl Into<PathRef<'p>>, args: &[Value]) -> Option<Value> {
        self.try_get(root, path, args)
            .inspect_err(|e| tracing::debug!(error = %e, "get failed"))
            .ok()
    }

    /// Writes `value` at `path`, returning whether the write succeeded.
    pub fn set<'p>(
        &self,
        root: &mut Value,
        path: impl Into<PathRef<'p>>,
        value: Value,
        args: &[Value],
    ) -> bool {
        self.try_set(root, path, value, args)
            .inspect_err(|e| tracing::debug!(error = %e, "set failed"))
            .is_ok()
    }

    pub fn try_get<'p>(
        &self,
        root: &Value,
        path: impl Into<PathRef<'p>>,
        args: &[Value],
    ) -> Result<Value, PathError> {
        match path.into() {
            PathRef::Raw(path) if self.syntax.is_simple_path(path) => {
                fast_path::read_str(root, path, self.syntax.property_separator())
            }
            PathRef::Raw(path) => {
                let tokens = self.compile(path)?;
                read_compiled(root, &tokens, args)
            }
            PathRef::Compiled(tokens) => read_compiled(root, tokens, args),
        }
    }

    pub fn try_set<'p>(
        &self,
        root: &mut Value,
        path: impl Into<PathRef<'p>>,
        value: Value,
        args: &[Value],
    ) -> Result<(), PathError> {
        match path.into() {
            PathRef::Raw(path) if self.syntax.is_simple_path(path) => fast_path::write_str(
                root,
                path,
                self.syntax.property_separator(),
                value,
                self.force,
            ),
            PathRef::Raw(path) => {
                let tokens = self.compile(path)?;
                self.write_compiled(root, &tokens, value, args)
            }
            PathRef::Compiled(tokens) => self.write_compiled(root, tokens, value, args),
        }
    }

    /// Paths under `root` whose value equals `target`; `None` when nothing matches.
    pub fn find(&self, root: &Value, target: &Value, mode: FindMode) -> Option<Vec<String>> {
        let found = search::find(root, target, mode, &self.syntax);
        (!found.is_empty()).then_some(found)
    }

    fn compile(&self, path: &str) -> Result<Arc<TokenSet>, SyntaxError> {
        if !self.cache_enabled {
            return tokenize(path, &self.syntax).map(Arc::new);
        }

        if let Some(tokens) = self.cache.borrow_mut().get(path) {
            tracing::trace!(path, "token cache hit");
            return Ok(tokens);
        }
        tracing::trace!(path, "token cache miss");
        let tokens = Arc::new(tokenize(path, &self.syntax)?);
        self.cache.borrow_mut().put(path, Arc::clone(&tokens));
        Ok(tokens)
    }

    fn write_compiled(
        &self,
        root: &mut Value,
        tokens: &TokenSet,
        value: Value,
        args: &[Value],
    ) -> Result<(), PathError> {
        match tokens.segments() {
            Some(segments) if tokens.simple => {
                fast_path::write_segments(root, &segments, value, self.force)
            }
            _ => resolver::set(root, tokens, &value, args, self.force),
        }
    }

    // ============================================================
    // Options
    // ============================================================

    /// Turns caching on or off. Turning it off drops every cached path.
    pub fn set_cache(&mut self, enabled: bool) {
        self.cache_enabled = enabled;
        if !enabled {
            self.clear_cache();
        }
    }

    pub fn set_force(&mut self, force: bool) {
        self.force = force;
    }

    pub fn clear_cache(&mut self) {
        self.cache.get_mut().clear();
    }

    // ============================================================
    // Syntax configuration
    // ============================================================

    pub fn set_prefixes(&mut self, prefixes: HashMap<char, PrefixRole>) -> Result<(), ConfigError> {
        let syntax = self.syntax.with_prefixes(prefixes)?;
        self.replace_syntax(syntax);
        Ok(())
    }

    pub fn set_separators(
        &mut self,
        separators: HashMap<char, SeparatorRole>,
    ) -> Result<(), ConfigError> {
        let syntax = self.syntax.with_separators(separators)?;
        self.replace_syntax(syntax);
        Ok(())
    }

    pub fn set_containers(
        &mut self,
        containers: HashMap<char, (ContainerRole, char)>,
    ) -> Result<(), ConfigError> {
        let syntax = self.syntax.with_containers(containers)?;
        self.replace_syntax(syntax);
        Ok(())
    }

    pub fn set_prefix(&mut self, role: PrefixRole, ch: char) -> Result<(), ConfigError> {
        let syntax = self.syntax.with_prefix(role, ch)?;
        self.replace_syntax(syntax);
        Ok(())
    }

    pub fn set_separator(&mut self, role: SeparatorRole, ch: char) -> Result<(), ConfigError> {
        let syntax = self.syntax.with_separator(role, ch)?;
        self.replace_syntax(syntax);
        Ok(())
    }

    pub fn set_container(
        &mut self,
        role: ContainerRole,
        opener: char,
        closer: char,
    ) -> Result<(), ConfigError> {
        let syntax = self.syntax.with_container(role, opener, closer)?;
        self.replace_syntax(syntax);
        Ok(())
    }

    /// Enters simple syntax mode with the given separator, or leaves it with `None`.
    ///
    /// Leaving simple mode restores the tables that were in effect when it was
    /// entered. Outside simple mode, `None` changes nothing.
    pub fn set_simple(&mut self, separator: Option<char>) -> Result<(), ConfigError> {
        match separator {
            Some(separator) => {
                let syntax = SyntaxConfig::simple(separator)?;
                if !self.syntax.is_simple_mode() {
                    self.before_simple = Some(self.syntax.clone());
                }
                self.replace_syntax(syntax);
            }
            None if self.syntax.is_simple_mode() => {
                let syntax = self.before_simple.take().unwrap_or_default();
                self.replace_syntax(syntax);
            }
            None => self.before_simple = None,
        }
        Ok(())
    }

    pub fn reset_syntax(&mut self) -> Result<(), ConfigError> {
        self.before_simple = None;
        self.replace_syntax(SyntaxConfig::default());
        Ok(())
    }

    fn replace_syntax(&mut self, syntax: SyntaxConfig) {
        self.syntax = syntax;
        let dropped = self.cache.get_mut().len();
        self.cache.get_mut().clear();
        tracing::debug!(
            simple = self.syntax.is_simple_mode(),
            dropped,
            "syntax replaced, token cache cleared"
        );
    }
}

fn read_compiled(root: &Value, tokens: &TokenSet, args: &[Value]) -> Result<Value, PathError> {
    match tokens.segments() {
        Some(segments) if tokens.simple => fast_path::read_segments(root, &segments),
        _ => resolver::get(root, tokens, args),
    }
}
