//! Reverse lookup: from a value to the path(s) that reach it.

use std::ops::ControlFlow;

use crate::syntax::SyntaxConfig;
use crate::value::Value;

/// How many matches [`find`] reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FindMode {
    /// Stop at the first match in traversal order
    #[default]
    One,
    /// Report every match
    Many,
}

/// Searches `root` depth-first for values equal to `target`.
///
/// Object members are visited in sorted key order, array elements by index.
/// The root itself is never compared, and a match is not searched further.
/// Each path is rendered with `syntax` so that it resolves back to the match.
pub fn find(root: &Value, target: &Value, mode: FindMode, syntax: &SyntaxConfig) -> Vec<String> {
    let mut search = Search {
        target,
        mode,
        syntax,
        trail: Vec::new(),
        found: Vec::new(),
    };
    let _ = search.children(root);
    tracing::trace!(matches = search.found.len(), ?mode, "search finished");
    search.found
}

struct Search<'a> {
    target: &'a Value,
    mode: FindMode,
    syntax: &'a SyntaxConfig,
    trail: Vec<String>,
    found: Vec<String>,
}

impl Search<'_> {
    fn children(&mut self, node: &Value) -> ControlFlow<()> {
        match node {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                for key in keys {
                    if let Some(child) = map.get(key) {
                        self.visit(key, child)?;
                    }
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.visit(&index.to_string(), child)?;
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn visit(&mut self, key: &str, node: &Value) -> ControlFlow<()> {
        self.trail.push(self.syntax.quote(key));
        let flow = if node == self.target {
            self.record()
        } else {
            self.children(node)
        };
        self.trail.pop();
        flow
    }

    fn record(&mut self) -> ControlFlow<()> {
        let separator = self.syntax.property_separator().to_string();
        self.found.push(self.trail.join(&separator));
        match self.mode {
            FindMode::One => ControlFlow::Break(()),
            FindMode::Many => ControlFlow::Continue(()),
        }
    }
}
