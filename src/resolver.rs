//! General path interpreter.
//!
//! Walks a [`TokenSet`] against a document for reads and writes. Positions in
//! the document are tracked as [`Cursor`]s rather than references, so a write
//! can reach any place a read would, including every element of a broadcast,
//! and so the value stack can hold earlier contexts for parent/root navigation.

use std::borrow::Cow;

use crate::ast::{Container, ContainerRole, Token, TokenSet, Word};
use crate::error::{PathError, SyntaxError};
use crate::fast_path::empty_write;
use crate::syntax::WILDCARD;
use crate::value::{Map, Value, array_index};

/// Resolves `tokens` against `root` and returns a copy of the value found.
///
/// Every token kind is interpreted, including plain-only token sets.
///
/// # Examples
///
/// ```
/// use keypath::lexer::tokenize;
/// use keypath::resolver;
/// use keypath::syntax::SyntaxConfig;
/// use keypath::Value;
///
/// let doc = Value::from(serde_json::json!({"a": [{"b": 1}, {"b": 2}]}));
/// let tokens = tokenize("a<b", &SyntaxConfig::default()).unwrap();
/// let found = resolver::get(&doc, &tokens, &[]).unwrap();
/// assert_eq!(found, Value::Array(vec![Value::Integer(1), Value::Integer(2)]));
/// ```
pub fn get(root: &Value, tokens: &TokenSet, args: &[Value]) -> Result<Value, PathError> {
    let mut resolver = Resolver::new(Document::Shared(root), args, false);
    let found = resolver.walk(Cursor::root(), &tokens.tokens, Intent::Read, false)?;
    resolver.read(&found)
}

/// Assigns `value` at the place(s) named by the last token of `tokens`.
///
/// With `force`, missing intermediates are created as empty objects.
pub fn set(
    root: &mut Value,
    tokens: &TokenSet,
    value: &Value,
    args: &[Value],
    force: bool,
) -> Result<(), PathError> {
    if tokens.is_empty() {
        return Err(empty_write());
    }
    let mut resolver = Resolver::new(Document::Exclusive(root), args, force);
    resolver
        .walk(Cursor::root(), &tokens.tokens, Intent::Write(value), false)
        .map(|_| ())
}

/// A position reached during resolution.
#[derive(Debug, Clone)]
enum Cursor {
    /// A place in the document, as keys from the root
    Place(Vec<String>),
    /// A value produced during resolution with no place in the document
    Detached(Value),
    /// Several results produced by a collection, broadcast or wildcard
    Fan(Vec<Cursor>),
}

impl Cursor {
    fn root() -> Self {
        Cursor::Place(Vec::new())
    }
}

fn extend(path: &[String], key: &str) -> Vec<String> {
    let mut extended = Vec::with_capacity(path.len() + 1);
    extended.extend_from_slice(path);
    extended.push(key.to_owned());
    extended
}

enum Document<'d> {
    Shared(&'d Value),
    Exclusive(&'d mut Value),
}

impl Document<'_> {
    fn root(&self) -> &Value {
        match self {
            Document::Shared(root) => *root,
            Document::Exclusive(root) => &**root,
        }
    }

    fn root_mut(&mut self) -> Option<&mut Value> {
        match self {
            Document::Shared(_) => None,
            Document::Exclusive(root) => Some(&mut **root),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Intent<'v> {
    Read,
    Write(&'v Value),
}

impl Intent<'_> {
    fn is_write(&self) -> bool {
        matches!(self, Intent::Write(_))
    }
}

/// Contexts visited during one resolution; index 0 is the root.
///
/// Nested resolutions share the stack and truncate it back to where they
/// started when they return.
struct ValueStack {
    frames: Vec<Cursor>,
}

impl ValueStack {
    fn new() -> Self {
        ValueStack {
            frames: vec![Cursor::root()],
        }
    }

    fn len(&self) -> usize {
        self.frames.len()
    }

    fn push(&mut self, cursor: Cursor) {
        self.frames.push(cursor);
    }

    fn truncate(&mut self, len: usize) {
        self.frames.truncate(len);
    }

    /// The context `levels` steps below the current one.
    fn parent(&self, levels: usize) -> Result<Cursor, PathError> {
        self.frames
            .len()
            .checked_sub(1 + levels)
            .and_then(|i| self.frames.get(i))
            .cloned()
            .ok_or_else(|| {
                PathError::NotFound(format!(
                    "parent {} levels up from a stack of depth {}",
                    levels,
                    self.frames.len()
                ))
            })
    }

    /// Drops everything but the root and returns it.
    fn rewind(&mut self) -> Cursor {
        self.frames.truncate(1);
        self.frames.first().cloned().unwrap_or_else(Cursor::root)
    }

    /// The frame below the current one: the value a callee was looked up on.
    fn receiver(&self) -> Option<Cursor> {
        let len = self.frames.len();
        len.checked_sub(2).and_then(|i| self.frames.get(i)).cloned()
    }
}

/// Single-`*` glob over member names: prefix, suffix or infix forms.
struct Glob<'p> {
    prefix: &'p str,
    suffix: &'p str,
}

impl<'p> Glob<'p> {
    fn new(pattern: &'p str) -> Result<Self, PathError> {
        let mut parts = pattern.splitn(3, WILDCARD);
        let prefix = parts.next().unwrap_or_default();
        let suffix = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(SyntaxError::MultipleWildcards {
                word: pattern.to_owned(),
            }
            .into());
        }
        Ok(Glob { prefix, suffix })
    }

    /// Splits around the wildcard the lexer found at byte `offset`, so escaped
    /// `*` characters elsewhere in `pattern` stay literal.
    fn at(pattern: &'p str, offset: usize) -> Result<Self, PathError> {
        let split = pattern
            .split_at_checked(offset)
            .and_then(|(prefix, rest)| Some((prefix, rest.strip_prefix(WILDCARD)?)));
        match split {
            Some((prefix, suffix)) => Ok(Glob { prefix, suffix }),
            None => Glob::new(pattern),
        }
    }

    fn matches(&self, name: &str) -> bool {
        name.len() >= self.prefix.len() + self.suffix.len()
            && name.starts_with(self.prefix)
            && name.ends_with(self.suffix)
    }
}

struct Resolver<'d, 'a> {
    document: Document<'d>,
    args: &'a [Value],
    force: bool,
    stack: ValueStack,
}

impl<'d, 'a> Resolver<'d, 'a> {
    fn new(document: Document<'d>, args: &'a [Value], force: bool) -> Self {
        Resolver {
            document,
            args,
            force,
            stack: ValueStack::new(),
        }
    }

    /// Processes `tokens` in order from `start`. Only the last token sees
    /// `intent`; earlier ones read, creating missing objects when forcing a write.
    fn walk(
        &mut self,
        start: Cursor,
        tokens: &[Token],
        intent: Intent<'_>,
        create: bool,
    ) -> Result<Cursor, PathError> {
        let mark = self.stack.len();
        let walked = self.advance(start, tokens, intent, create);
        // Frames pushed by a failed walk must not leak into sibling items.
        self.stack.truncate(mark);
        walked
    }

    fn advance(
        &mut self,
        start: Cursor,
        tokens: &[Token],
        intent: Intent<'_>,
        create: bool,
    ) -> Result<Cursor, PathError> {
        let last = tokens.len().saturating_sub(1);
        let create_interior = create || (intent.is_write() && self.force);

        let mut context = start;
        for (index, token) in tokens.iter().enumerate() {
            context = if index == last {
                self.step(context, token, intent, create)?
            } else {
                self.step(context, token, Intent::Read, create_interior)?
            };
            self.stack.push(context.clone());
        }
        Ok(context)
    }

    fn step(
        &mut self,
        context: Cursor,
        token: &Token,
        intent: Intent<'_>,
        create: bool,
    ) -> Result<Cursor, PathError> {
        match token {
            Token::Plain(name) => self.access(context, name, intent, create),
            Token::Word(word) if word.each => {
                self.broadcast(context, intent, |r, element| r.word(element, word, intent, create))
            }
            Token::Word(word) => self.word(context, word, intent, create),
            Token::Collection(collection) if collection.each => {
                self.broadcast(context, intent, |r, element| {
                    r.collection(element, &collection.items, intent)
                })
            }
            Token::Collection(collection) => self.collection(context, &collection.items, intent),
            Token::Container(container) if container.each => {
                self.broadcast(context, intent, |r, element| {
                    r.container(element, container, intent, create)
                })
            }
            Token::Container(container) => self.container(context, container, intent, create),
        }
    }

    /// Plain lookup or assignment of one member.
    fn access(
        &mut self,
        context: Cursor,
        name: &str,
        intent: Intent<'_>,
        create: bool,
    ) -> Result<Cursor, PathError> {
        match intent {
            Intent::Write(value) => self.assign(&context, name, value.clone()),
            Intent::Read => match self.child(&context, name) {
                Some(found) => Ok(found),
                None if create => self.assign(&context, name, Value::Object(Map::new())),
                None => Err(PathError::NotFound(name.to_owned())),
            },
        }
    }

    fn word(
        &mut self,
        context: Cursor,
        word: &Word,
        intent: Intent<'_>,
        create: bool,
    ) -> Result<Cursor, PathError> {
        let mut context = context;
        let modifiers = word.modifiers;
        if modifiers.parent > 0 {
            context = self.stack.parent(modifiers.parent)?;
        }
        if modifiers.root {
            context = self.stack.rewind();
        }

        if modifiers.context {
            return match intent {
                Intent::Write(_) => Err(PathError::AssignmentFailed(format!(
                    "'{}' names an argument and cannot be assigned",
                    word.name
                ))),
                Intent::Read => self.argument_or_literal(&word.name).map(Cursor::Detached),
            };
        }

        let name: Cow<'_, str> = if modifiers.placeholder {
            Cow::Owned(self.placeholder(&word.name)?)
        } else {
            Cow::Borrowed(word.name.as_str())
        };

        let glob = match word.wildcard {
            _ if modifiers.placeholder && name.contains(WILDCARD) => Some(Glob::new(&name)?),
            Some(offset) if !modifiers.placeholder => Some(Glob::at(&name, offset)?),
            _ => None,
        };
        if let Some(glob) = glob {
            return self.wildcard(context, &glob, intent);
        }
        self.access(context, &name, intent, create)
    }

    fn argument(&self, text: &str) -> Option<Result<&'a Value, PathError>> {
        let index: usize = text.parse().ok()?;
        let found = index
            .checked_sub(1)
            .and_then(|i| self.args.get(i))
            .ok_or(PathError::MissingArgument {
                index,
                supplied: self.args.len(),
            });
        Some(found)
    }

    /// Text of positional argument `text` (1-based), used as a property name.
    fn placeholder(&self, text: &str) -> Result<String, PathError> {
        let value = self.argument(text).ok_or_else(|| {
            PathError::TypeMismatch(format!("placeholder '{text}' is not a positional index"))
        })??;
        value.as_key().ok_or_else(|| {
            PathError::TypeMismatch(format!(
                "argument {} is a {} and cannot name a property",
                text,
                value.type_name()
            ))
        })
    }

    /// Positional argument `text`, or the text itself when it is not numeric.
    fn argument_or_literal(&self, text: &str) -> Result<Value, PathError> {
        match self.argument(text) {
            Some(found) => found.cloned(),
            None => Ok(Value::String(text.to_owned())),
        }
    }

    fn wildcard(
        &mut self,
        context: Cursor,
        glob: &Glob<'_>,
        intent: Intent<'_>,
    ) -> Result<Cursor, PathError> {
        let names = self.member_names(&context)?;

        let mut results = Vec::new();
        let mut failure = None;
        for name in names.iter().filter(|name| glob.matches(name)) {
            let outcome = match intent {
                Intent::Read => self
                    .child(&context, name)
                    .ok_or_else(|| PathError::NotFound(name.clone())),
                Intent::Write(value) => self.assign(&context, name, value.clone()),
            };
            match outcome {
                Ok(found) => results.push(found),
                Err(e) if intent.is_write() => {
                    failure.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }
        failure.map_or(Ok(Cursor::Fan(results)), Err)
    }

    /// Evaluates every member against the same context, in order.
    fn collection(
        &mut self,
        context: Cursor,
        items: &[Token],
        intent: Intent<'_>,
    ) -> Result<Cursor, PathError> {
        let mut results = Vec::with_capacity(items.len());
        let mut failure = None;
        for item in items {
            // On writes a computed-name member only assigns; it adds nothing to the result.
            let computed = matches!(
                item,
                Token::Container(Container {
                    role: ContainerRole::EvalProperty,
                    ..
                })
            );
            match self.step(context.clone(), item, intent, false) {
                Ok(_) if computed && intent.is_write() => {}
                Ok(found) => results.push(found),
                Err(e) if intent.is_write() => {
                    failure.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }
        failure.map_or(Ok(Cursor::Fan(results)), Err)
    }

    fn container(
        &mut self,
        context: Cursor,
        container: &Container,
        intent: Intent<'_>,
        create: bool,
    ) -> Result<Cursor, PathError> {
        match container.role {
            ContainerRole::Property | ContainerRole::SingleQuote | ContainerRole::DoubleQuote => {
                self.walk(context, &container.inner.tokens, intent, create)
            }
            ContainerRole::Call => match intent {
                Intent::Write(_) => Err(PathError::AssignmentFailed(
                    "a call result cannot be assigned".to_string(),
                )),
                Intent::Read => self.call(context, &container.inner),
            },
            ContainerRole::EvalProperty => {
                let name = self.computed_name(&context, &container.inner)?;
                self.access(context, &name, intent, create)
            }
        }
    }

    fn call(&mut self, context: Cursor, inner: &TokenSet) -> Result<Cursor, PathError> {
        let function = match self.read(&context)? {
            Value::Function(function) => function,
            other => {
                return Err(PathError::TypeMismatch(format!(
                    "cannot call a {}",
                    other.type_name()
                )));
            }
        };

        let receiver = match self.stack.receiver() {
            Some(frame) => self.read(&frame)?,
            None => Value::Null,
        };

        let arguments = if inner.is_empty() {
            Vec::new()
        } else {
            match self.walk(context, &inner.tokens, Intent::Read, false)? {
                Cursor::Fan(items) => items
                    .iter()
                    .map(|item| self.read(item))
                    .collect::<Result<Vec<_>, _>>()?,
                // An array argument is spread like a fan-out.
                single => match self.read(&single)? {
                    Value::Array(items) => items,
                    other => vec![other],
                },
            }
        };

        function
            .call(&receiver, &arguments)
            .map(Cursor::Detached)
            .ok_or_else(|| PathError::NotFound("call returned no value".to_string()))
    }

    fn computed_name(&mut self, context: &Cursor, inner: &TokenSet) -> Result<String, PathError> {
        let found = self.walk(context.clone(), &inner.tokens, Intent::Read, false)?;
        let value = self.read(&found)?;
        value.as_key().ok_or_else(|| {
            PathError::TypeMismatch(format!(
                "a {} cannot be used as a property name",
                value.type_name()
            ))
        })
    }

    /// Applies `apply` to every element of an array context.
    ///
    /// Reads stop at the first failure; writes visit every element and then
    /// report the first failure.
    fn broadcast<F>(
        &mut self,
        context: Cursor,
        intent: Intent<'_>,
        mut apply: F,
    ) -> Result<Cursor, PathError>
    where
        F: FnMut(&mut Self, Cursor) -> Result<Cursor, PathError>,
    {
        let elements = self.elements(&context)?;
        let mut results = Vec::with_capacity(elements.len());
        let mut failure = None;
        for element in elements {
            let mark = self.stack.len();
            self.stack.push(element.clone());
            let outcome = apply(self, element);
            self.stack.truncate(mark);
            match outcome {
                Ok(found) => results.push(found),
                Err(e) if intent.is_write() => {
                    failure.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }
        failure.map_or(Ok(Cursor::Fan(results)), Err)
    }

    fn lookup(&self, path: &[String]) -> Result<&Value, PathError> {
        self.document
            .root()
            .at(path)
            .ok_or_else(|| PathError::NotFound(path.join(".")))
    }

    /// Materializes a cursor into an owned value.
    fn read(&self, cursor: &Cursor) -> Result<Value, PathError> {
        match cursor {
            Cursor::Place(path) => self.lookup(path).cloned(),
            Cursor::Detached(value) => Ok(value.clone()),
            Cursor::Fan(items) => items
                .iter()
                .map(|item| self.read(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }

    fn child(&self, cursor: &Cursor, key: &str) -> Option<Cursor> {
        match cursor {
            Cursor::Place(path) => {
                self.document.root().at(path)?.child(key)?;
                Some(Cursor::Place(extend(path, key)))
            }
            Cursor::Detached(value) => value.child(key).cloned().map(Cursor::Detached),
            Cursor::Fan(items) => array_index(key).and_then(|i| items.get(i)).cloned(),
        }
    }

    fn assign(&mut self, cursor: &Cursor, key: &str, value: Value) -> Result<Cursor, PathError> {
        match cursor {
            Cursor::Place(path) => {
                let root = self.document.root_mut().ok_or_else(|| {
                    PathError::AssignmentFailed("the document is read-only".to_string())
                })?;
                let target = root
                    .at_mut(path)
                    .ok_or_else(|| PathError::NotFound(path.join(".")))?;
                target.set_child(key, value)?;
                Ok(Cursor::Place(extend(path, key)))
            }
            Cursor::Detached(target) => Err(PathError::AssignmentFailed(format!(
                "cannot assign '{}' on a {} outside the document",
                key,
                target.type_name()
            ))),
            Cursor::Fan(items) => Err(PathError::AssignmentFailed(format!(
                "cannot assign '{}' on a result list of {} values",
                key,
                items.len()
            ))),
        }
    }

    fn elements(&self, cursor: &Cursor) -> Result<Vec<Cursor>, PathError> {
        match cursor {
            Cursor::Place(path) => match self.lookup(path)? {
                Value::Array(items) => Ok((0..items.len())
                    .map(|i| Cursor::Place(extend(path, &i.to_string())))
                    .collect()),
                other => Err(not_a_sequence(other)),
            },
            Cursor::Detached(Value::Array(items)) => {
                Ok(items.iter().cloned().map(Cursor::Detached).collect())
            }
            Cursor::Detached(other) => Err(not_a_sequence(other)),
            Cursor::Fan(items) => Ok(items.clone()),
        }
    }

    fn member_names(&self, cursor: &Cursor) -> Result<Vec<String>, PathError> {
        let names = match cursor {
            Cursor::Place(path) => {
                let value = self.lookup(path)?;
                value.member_names().ok_or_else(|| not_enumerable(value))?
            }
            Cursor::Detached(value) => value.member_names().ok_or_else(|| not_enumerable(value))?,
            Cursor::Fan(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        };
        Ok(names)
    }
}

fn not_a_sequence(value: &Value) -> PathError {
    PathError::TypeMismatch(format!("each needs an array, found a {}", value.type_name()))
}

fn not_enumerable(value: &Value) -> PathError {
    PathError::TypeMismatch(format!(
        "wildcard needs an object or array, found a {}",
        value.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_forms() {
        let prefix = Glob::new("ab*").unwrap();
        assert!(prefix.matches("abc"));
        assert!(prefix.matches("ab"));
        assert!(!prefix.matches("xab"));

        let infix = Glob::new("a*c").unwrap();
        assert!(infix.matches("abc"));
        assert!(infix.matches("ac"));
        assert!(!infix.matches("abd"));

        let any = Glob::new("*").unwrap();
        assert!(any.matches(""));
        assert!(any.matches("anything"));
    }

    #[test]
    fn glob_rejects_second_wildcard() {
        assert!(matches!(
            Glob::new("a*b*"),
            Err(PathError::Syntax(SyntaxError::MultipleWildcards { .. }))
        ));
    }

    #[test]
    fn glob_at_offset_keeps_other_stars_literal() {
        let glob = Glob::at("a*b*", 3).unwrap();
        assert!(glob.matches("a*bX"));
        assert!(!glob.matches("aZbX"));

        // An offset that does not land on a `*` falls back to splitting.
        let fallback = Glob::at("ab*", 0).unwrap();
        assert!(fallback.matches("abc"));
    }

    #[test]
    fn parent_beyond_root_fails() {
        let stack = ValueStack::new();
        assert!(stack.parent(1).is_err());
        assert!(stack.receiver().is_none());
    }
}
