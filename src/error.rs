//! Error types for tokenizing, resolving and configuring paths.

use thiserror::Error;

/// Problems found while tokenizing a path string.
///
/// Positions are character offsets into the top-level path, including for
/// errors raised while tokenizing the contents of a container.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("container '{opener}' opened at position {position} is never closed")]
    UnclosedContainer { opener: char, position: usize },

    #[error("unexpected closing character '{ch}' at position {position}")]
    UnexpectedCloser { ch: char, position: usize },

    #[error("path ends with an unfinished escape at position {position}")]
    TrailingEscape { position: usize },

    #[error("empty path segment at position {position}")]
    EmptySegment { position: usize },

    #[error("modifier or wildcard without a property name at position {position}")]
    DanglingModifier { position: usize },

    #[error("'{word}' contains more than one wildcard, which is not supported")]
    MultipleWildcards { word: String },

    #[error("unexpected character '{ch}' at position {position} after a closed container")]
    UnexpectedCharacter { ch: char, position: usize },
}

/// Failures while resolving a path against data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A traversal step found no value
    #[error("path not found: no value at '{0}'")]
    NotFound(String),

    /// The write target rejected the value
    #[error("assignment failed: {0}")]
    AssignmentFailed(String),

    /// A placeholder or context modifier referenced an argument that was not supplied
    #[error("missing argument: index {index} requested but {supplied} supplied")]
    MissingArgument { index: usize, supplied: usize },

    /// Each, wildcard or call applied to a value of the wrong shape
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}

/// Rejected syntax table changes.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("character '{ch}' cannot be both {first} and {second}")]
    Conflict {
        ch: char,
        first: String,
        second: String,
    },

    #[error("character '{0}' is reserved and cannot be assigned a syntax role")]
    Reserved(char),

    #[error("syntax has no property separator")]
    MissingPropertySeparator,

    #[error("could not build special character matcher: {0}")]
    Matcher(#[from] regex::Error),
}
