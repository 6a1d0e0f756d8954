/// Roles a prefix character can play in front of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixRole {
    /// Step back one level on the value stack (`^`). Cumulative.
    Parent,
    /// Restart from the root value (`~`)
    Root,
    /// Replace the word with a positional argument (`%1`)
    Placeholder,
    /// Use a positional argument as the result itself (`@1`)
    Context,
}

/// Roles a separator character can play between words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeparatorRole {
    /// Descend into a property (`.`)
    Property,
    /// Join alternatives evaluated against the same context (`,`)
    Collection,
    /// Apply the next token to every element of an array (`<`)
    Each,
}

/// Roles of an opener/closer character pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerRole {
    /// Nested property path (`[...]`)
    Property,
    /// Literal text (`'...'`)
    SingleQuote,
    /// Literal text (`"..."`)
    DoubleQuote,
    /// Invoke the current value with arguments (`(...)`)
    Call,
    /// Resolve the contents to a computed property name (`{...}`)
    EvalProperty,
}

impl ContainerRole {
    pub fn is_quote(self) -> bool {
        matches!(self, ContainerRole::SingleQuote | ContainerRole::DoubleQuote)
    }
}
