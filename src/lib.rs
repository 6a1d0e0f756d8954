pub mod ast;
pub mod cache;
pub mod cli;
pub mod engine;
pub mod error;
pub mod fast_path;
pub mod lexer;
pub mod resolver;
pub mod search;
pub mod syntax;
pub mod value;

pub use ast::{ContainerRole, PrefixRole, SeparatorRole, Token, TokenSet};
pub use engine::{Engine, EngineOptions, PathRef};
pub use error::{ConfigError, PathError, SyntaxError};
pub use lexer::{Lexer, tokenize};
pub use search::FindMode;
pub use syntax::SyntaxConfig;
pub use value::{Callable, Map, Value};
