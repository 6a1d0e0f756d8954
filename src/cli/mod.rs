//! CLI support for keypath
//!
//! Provides programmatic access to the `keypath` binary's commands so they
//! can be embedded in other tools.

mod commands;
mod convert;

pub use commands::{
    FindOptions, GetOptions, SetOptions, execute_check, execute_escape, execute_find,
    execute_get, execute_set, execute_tokens,
};
pub use convert::{json_to_value, value_to_json};

use std::io;

use thiserror::Error;

use crate::error::{PathError, SyntaxError};

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Resolution error: {0}")]
    Path(#[from] PathError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("No value in the input equals {0}")]
    NoMatch(String),
}
