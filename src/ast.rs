//! # Path Syntax - Tokens
//!
//! Compiled form of a path string.
//!
//! - **[roles]** - Roles that syntax characters are mapped to
//! - **[tokens]** - Tokens produced by the lexer and consumed by the resolver
//!
//! ## Default syntax
//!
//! ```text
//! foo.bar            property access
//! items[0]           bracketed property
//! 'a.b'  "a.b"       quoted literal name
//! foo.bar,qux        collection of alternatives
//! items<name         each: apply to every element
//! ab*                wildcard over member names
//! ^sibling           parent (cumulative: ^^)
//! ~top               root
//! %1                 placeholder: name taken from argument 1
//! @1                 context: argument 1 itself
//! fn(@1,@2)          call
//! map{^key}          computed property name
//! a\.b               escape
//! ```
pub mod roles;
pub mod tokens;

pub use roles::{ContainerRole, PrefixRole, SeparatorRole};
pub use tokens::{Collection, Container, Modifiers, Token, TokenSet, Word};
