use crate::ast::ContainerRole;

/// One syntactic unit of a compiled path.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal property name or array index, used verbatim
    ///
    /// # Examples
    /// ```text
    /// foo.bar      // Plain("foo"), Plain("bar")
    /// items[0]     // Plain("items"), Plain("0")
    /// 'a.b'        // Plain("a.b")
    /// ```
    Plain(String),

    /// Name that needs prefix, wildcard or each handling before lookup
    ///
    /// # Examples
    /// ```text
    /// ^sibling
    /// %1
    /// user*
    /// items<name
    /// ```
    Word(Word),

    /// Alternatives evaluated against the same context
    ///
    /// # Example
    /// ```text
    /// foo.bar,qux
    /// ```
    Collection(Collection),

    /// Nested sub-path interpreted according to its role
    ///
    /// # Examples
    /// ```text
    /// [a.b]        // nested property path
    /// fn(@1)       // call
    /// map{^key}    // computed property name
    /// ```
    Container(Container),
}

/// Prefix-derived instructions carried by a [`Word`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Number of levels to step back on the value stack
    pub parent: usize,
    pub root: bool,
    pub placeholder: bool,
    pub context: bool,
}

impl Modifiers {
    pub fn is_empty(&self) -> bool {
        *self == Modifiers::default()
    }

    /// Combines two modifier sets; parent counts add up.
    pub fn merge(self, other: Modifiers) -> Modifiers {
        Modifiers {
            parent: self.parent + other.parent,
            root: self.root || other.root,
            placeholder: self.placeholder || other.placeholder,
            context: self.context || other.context,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub name: String,
    pub modifiers: Modifiers,
    /// Byte offset of the unescaped wildcard in `name`, if there is one.
    /// Escaped `*` characters are part of the literal name.
    pub wildcard: Option<usize>,
    /// Apply to every element of an array context
    pub each: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub items: Vec<Token>,
    pub each: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub inner: TokenSet,
    pub role: ContainerRole,
    pub each: bool,
}

/// The tokens of one path, plus whether the fast path may resolve it.
///
/// `simple` is true iff every token is [`Token::Plain`].
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSet {
    pub tokens: Vec<Token>,
    pub simple: bool,
}

impl TokenSet {
    pub fn new(tokens: Vec<Token>) -> Self {
        let simple = tokens.iter().all(|t| matches!(t, Token::Plain(_)));
        TokenSet { tokens, simple }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Segment names of a simple token set, in order. `None` if any token is not plain.
    pub fn segments(&self) -> Option<Vec<&str>> {
        self.tokens
            .iter()
            .map(|token| match token {
                Token::Plain(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Default for TokenSet {
    fn default() -> Self {
        TokenSet::new(Vec::new())
    }
}
