use crate::ast::{
    Collection, Container, ContainerRole, Modifiers, PrefixRole, SeparatorRole, Token, TokenSet,
    Word,
};
use crate::error::SyntaxError;
use crate::syntax::{CharRole, ESCAPE, SyntaxConfig, WILDCARD};

/// Tokenizes `path` with the given syntax.
///
/// # Examples
///
/// ```
/// use keypath::ast::Token;
/// use keypath::lexer::tokenize;
/// use keypath::syntax::SyntaxConfig;
///
/// let set = tokenize("items[0].name", &SyntaxConfig::default()).unwrap();
/// assert!(set.simple);
/// assert_eq!(set.tokens[1], Token::Plain("0".into()));
/// ```
pub fn tokenize(path: &str, syntax: &SyntaxConfig) -> Result<TokenSet, SyntaxError> {
    let set = Lexer::new(path, syntax).tokenize()?;
    tracing::trace!(path, tokens = set.tokens.len(), simple = set.simple, "tokenized path");
    Ok(set)
}

/// Splits a path containing no special characters besides `separator`.
///
/// An empty path has no segments; an empty segment anywhere else is an error.
pub fn split_segments(path: &str, separator: char) -> Result<Vec<&str>, SyntaxError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let mut segments = Vec::new();
    let mut position = 0;
    for segment in path.split(separator) {
        if segment.is_empty() {
            return Err(SyntaxError::EmptySegment { position });
        }
        position += segment.chars().count() + 1;
        segments.push(segment);
    }
    Ok(segments)
}

/// Hand-rolled scanner turning a path string into a [`TokenSet`].
///
/// Containers are scanned to their matching closer and their contents are
/// tokenized by a nested lexer, so positions in errors stay relative to the
/// outermost path via `origin`.
pub struct Lexer<'s> {
    syntax: &'s SyntaxConfig,
    input: Vec<char>,
    position: usize,
    origin: usize,

    tokens: Vec<Token>,
    collection: Vec<Token>,
    collection_each: bool,

    word: String,
    has_word: bool,
    modifiers: Modifiers,
    wildcards: usize,
    /// Byte offset of the unescaped wildcard within `word`
    wildcard_at: Option<usize>,
    each_next: bool,
    /// Token produced by a just-closed container, waiting for the next separator
    held: Option<Token>,
    after_separator: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(input: &str, syntax: &'s SyntaxConfig) -> Self {
        Lexer::nested(input, syntax, 0)
    }

    fn nested(input: &str, syntax: &'s SyntaxConfig, origin: usize) -> Self {
        Lexer {
            syntax,
            input: input.chars().collect(),
            position: 0,
            origin,
            tokens: Vec::new(),
            collection: Vec::new(),
            collection_each: false,
            word: String::new(),
            has_word: false,
            modifiers: Modifiers::default(),
            wildcards: 0,
            wildcard_at: None,
            each_next: false,
            held: None,
            after_separator: false,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Absolute position of the current character
    fn here(&self) -> usize {
        self.origin + self.position
    }

    pub fn tokenize(mut self) -> Result<TokenSet, SyntaxError> {
        let raw: String = self.input.iter().collect();
        if self.syntax.is_simple_path(&raw) {
            let separator = self.syntax.property_separator();
            return split_segments(&raw, separator)
                .map(|segments| {
                    TokenSet::new(
                        segments
                            .into_iter()
                            .map(|s| Token::Plain(s.to_owned()))
                            .collect(),
                    )
                })
                .map_err(|e| self.relocate(e));
        }

        while let Some(ch) = self.current_char() {
            if ch == ESCAPE {
                self.advance();
                match self.current_char() {
                    Some(escaped) => self.push_char(escaped)?,
                    None => {
                        return Err(SyntaxError::TrailingEscape {
                            position: self.here() - 1,
                        });
                    }
                }
                self.advance();
                continue;
            }

            if ch == WILDCARD {
                self.wildcards += 1;
                if self.wildcard_at.is_none() {
                    self.wildcard_at = Some(self.word.len());
                }
                self.push_char(ch)?;
                self.advance();
                continue;
            }

            match self.syntax.classify(ch) {
                Some(CharRole::Prefix(role)) if !self.has_word && self.held.is_none() => {
                    self.apply_prefix(role);
                    self.advance();
                }
                Some(CharRole::Separator(role)) => {
                    self.separate(role)?;
                    self.advance();
                }
                Some(CharRole::Opener { role, closer }) => self.container(ch, role, closer)?,
                Some(CharRole::Closer(_)) => {
                    return Err(SyntaxError::UnexpectedCloser {
                        ch,
                        position: self.here(),
                    });
                }
                _ => {
                    self.push_char(ch)?;
                    self.advance();
                }
            }
        }

        self.finish()
    }

    fn relocate(&self, error: SyntaxError) -> SyntaxError {
        match error {
            SyntaxError::EmptySegment { position } => SyntaxError::EmptySegment {
                position: self.origin + position,
            },
            other => other,
        }
    }

    fn push_char(&mut self, ch: char) -> Result<(), SyntaxError> {
        if self.held.is_some() {
            return Err(SyntaxError::UnexpectedCharacter {
                ch,
                position: self.here(),
            });
        }
        self.word.push(ch);
        self.has_word = true;
        self.after_separator = false;
        Ok(())
    }

    fn apply_prefix(&mut self, role: PrefixRole) {
        match role {
            PrefixRole::Parent => self.modifiers.parent += 1,
            PrefixRole::Root => self.modifiers.root = true,
            PrefixRole::Placeholder => self.modifiers.placeholder = true,
            PrefixRole::Context => self.modifiers.context = true,
        }
        self.after_separator = false;
    }

    /// Turns the pending word (or held container token) into a token.
    fn take_item(&mut self) -> Result<Option<Token>, SyntaxError> {
        if let Some(token) = self.held.take() {
            return Ok(Some(token));
        }
        if !self.has_word {
            if !self.modifiers.is_empty() || self.wildcards > 0 {
                return Err(SyntaxError::DanglingModifier {
                    position: self.here(),
                });
            }
            return Ok(None);
        }

        let name = std::mem::take(&mut self.word);
        self.has_word = false;
        let modifiers = std::mem::take(&mut self.modifiers);
        let wildcards = std::mem::take(&mut self.wildcards);
        let wildcard = self.wildcard_at.take();
        let each = std::mem::take(&mut self.each_next);
        if wildcards > 1 {
            return Err(SyntaxError::MultipleWildcards { word: name });
        }

        if modifiers.is_empty() && wildcard.is_none() && !each {
            Ok(Some(Token::Plain(name)))
        } else {
            Ok(Some(Token::Word(Word {
                name,
                modifiers,
                wildcard,
                each,
            })))
        }
    }

    /// Appends a finished item to the token stream, closing any open collection.
    fn emit(&mut self, token: Token) {
        if self.collection.is_empty() {
            self.tokens.push(token);
        } else {
            let mut items = std::mem::take(&mut self.collection);
            items.push(token);
            self.tokens.push(Token::Collection(Collection {
                items,
                each: std::mem::take(&mut self.collection_each),
            }));
        }
    }

    fn separate(&mut self, role: SeparatorRole) -> Result<(), SyntaxError> {
        let position = self.here();

        if role == SeparatorRole::Collection {
            // An each flag pending at the start of a collection belongs to the whole collection.
            if self.collection.is_empty() {
                self.collection_each = std::mem::take(&mut self.each_next);
            }
            let item = self
                .take_item()?
                .ok_or(SyntaxError::EmptySegment { position })?;
            self.collection.push(item);
            self.after_separator = true;
            return Ok(());
        }

        match self.take_item()? {
            Some(token) => self.emit(token),
            None => {
                let leading_each = role == SeparatorRole::Each
                    && self.tokens.is_empty()
                    && self.collection.is_empty()
                    && !self.each_next;
                if !leading_each {
                    return Err(SyntaxError::EmptySegment { position });
                }
            }
        }

        if role == SeparatorRole::Each {
            self.each_next = true;
        }
        self.after_separator = true;
        Ok(())
    }

    /// Scans a container starting at the opener under the cursor and dispatches on its role.
    fn container(&mut self, opener: char, role: ContainerRole, closer: char) -> Result<(), SyntaxError> {
        let start = self.here();
        let inner_origin = start + 1;
        let (raw, literal) = self.scan_container(opener, role, closer)?;

        // An opener flushes the pending word like a separator would, but
        // modifiers with no word yet carry over onto the container.
        if self.has_word || self.held.is_some() {
            if let Some(token) = self.take_item()? {
                self.emit(token);
            }
        }
        let modifiers = std::mem::take(&mut self.modifiers);
        let wildcards = std::mem::take(&mut self.wildcards);
        let each = std::mem::take(&mut self.each_next);
        if wildcards > 0 {
            return Err(SyntaxError::DanglingModifier { position: start });
        }

        if role.is_quote() {
            // Quoted text is one literal name, never re-tokenized.
            self.held = Some(if modifiers.is_empty() && !each {
                Token::Plain(literal)
            } else {
                Token::Word(Word {
                    name: literal,
                    modifiers,
                    wildcard: None,
                    each,
                })
            });
            self.after_separator = false;
            return Ok(());
        }

        let inner = Lexer::nested(&raw, self.syntax, inner_origin).tokenize()?;
        let token = match role {
            ContainerRole::Property => splice_property(inner, modifiers, each, start)?,
            ContainerRole::EvalProperty if inner.is_empty() => {
                return Err(SyntaxError::EmptySegment { position: inner_origin });
            }
            _ if !modifiers.is_empty() => {
                return Err(SyntaxError::DanglingModifier { position: start });
            }
            _ => Token::Container(Container { inner, role, each }),
        };

        self.held = Some(token);
        self.after_separator = false;
        Ok(())
    }

    /// Consumes the container up to and including its closer.
    ///
    /// Returns the raw contents (escapes kept, for re-tokenizing) and the
    /// literal contents (escapes resolved, for quotes).
    fn scan_container(
        &mut self,
        opener: char,
        role: ContainerRole,
        closer: char,
    ) -> Result<(String, String), SyntaxError> {
        let start = self.here();
        let mut raw = String::new();
        let mut literal = String::new();
        let mut depth = 1;
        self.advance();

        while let Some(ch) = self.current_char() {
            if ch == ESCAPE {
                self.advance();
                let escaped = self
                    .current_char()
                    .ok_or(SyntaxError::TrailingEscape { position: self.here() - 1 })?;
                raw.push(ESCAPE);
                raw.push(escaped);
                literal.push(escaped);
                self.advance();
                continue;
            }
            if ch == closer {
                depth -= 1;
                if depth == 0 {
                    self.advance();
                    return Ok((raw, literal));
                }
            } else if ch == opener && !role.is_quote() {
                depth += 1;
            }
            raw.push(ch);
            literal.push(ch);
            self.advance();
        }

        Err(SyntaxError::UnclosedContainer { opener, position: start })
    }

    fn finish(mut self) -> Result<TokenSet, SyntaxError> {
        let position = self.here();
        if self.after_separator {
            return Err(SyntaxError::EmptySegment { position });
        }
        match self.take_item()? {
            Some(token) => self.emit(token),
            None if !self.collection.is_empty() || self.each_next => {
                return Err(SyntaxError::EmptySegment { position });
            }
            None => {}
        }
        Ok(TokenSet::new(self.tokens))
    }
}

/// Builds the token for a `[...]` container.
///
/// A single inner token is spliced in place, absorbing modifiers written in
/// front of the brackets. Longer contents stay a nested property path.
fn splice_property(
    inner: TokenSet,
    modifiers: Modifiers,
    each: bool,
    position: usize,
) -> Result<Token, SyntaxError> {
    let mut tokens = inner.tokens;
    if tokens.is_empty() {
        return Err(SyntaxError::EmptySegment { position: position + 1 });
    }
    if tokens.len() > 1 {
        if !modifiers.is_empty() {
            return Err(SyntaxError::DanglingModifier { position });
        }
        return Ok(Token::Container(Container {
            inner: TokenSet::new(tokens),
            role: ContainerRole::Property,
            each,
        }));
    }

    match tokens.remove(0) {
        Token::Plain(name) if modifiers.is_empty() && !each => Ok(Token::Plain(name)),
        Token::Plain(name) => Ok(Token::Word(Word {
            name,
            modifiers,
            wildcard: None,
            each,
        })),
        Token::Word(word) => Ok(Token::Word(Word {
            modifiers: word.modifiers.merge(modifiers),
            each: word.each || each,
            ..word
        })),
        _ if !modifiers.is_empty() => Err(SyntaxError::DanglingModifier { position }),
        Token::Collection(collection) => Ok(Token::Collection(Collection {
            each: collection.each || each,
            ..collection
        })),
        Token::Container(container) => Ok(Token::Container(Container {
            each: container.each || each,
            ..container
        })),
    }
}

#[test]
fn test_simple_split() {
    let set = tokenize("foo.bar.0", &SyntaxConfig::default()).unwrap();
    assert!(set.simple);
    assert_eq!(
        set.tokens,
        vec![
            Token::Plain("foo".into()),
            Token::Plain("bar".into()),
            Token::Plain("0".into()),
        ]
    );
}

#[test]
fn test_nested_error_positions() {
    let err = tokenize("a[b..c]", &SyntaxConfig::default()).unwrap_err();
    assert_eq!(err, SyntaxError::EmptySegment { position: 4 });
}
