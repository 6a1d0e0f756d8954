//! Run keypath operations against JSON input

use super::{CliError, json_to_value, value_to_json};
use crate::ast::TokenSet;
use crate::engine::Engine;
use crate::search::FindMode;
use crate::value::Value;

/// Options for the get command
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub path: String,
    /// JSON input string
    pub input: Option<String>,
    /// Positional arguments for placeholders and context words
    pub args: Vec<String>,
}

/// Options for the set command
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    pub path: String,
    /// New value, as JSON
    pub value: String,
    pub input: Option<String>,
    pub args: Vec<String>,
    /// Create missing intermediate objects
    pub force: bool,
}

/// Options for the find command
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Value to look for, as JSON
    pub target: String,
    pub input: Option<String>,
    /// Report every match instead of the first
    pub all: bool,
}

fn parse_document(input: Option<&str>) -> Result<Value, CliError> {
    let json_str = input.ok_or(CliError::NoInput)?;
    let json: serde_json::Value = serde_json::from_str(json_str)?;
    Ok(json_to_value(json))
}

/// Arguments are JSON when they parse as JSON and plain strings otherwise,
/// so `keypath get 'a.%1' name` works without extra quoting.
fn parse_arg(arg: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(arg)
        .map(json_to_value)
        .unwrap_or_else(|_| Value::String(arg.to_string()))
}

/// Tokenize a path with the default syntax
pub fn execute_tokens(engine: &Engine, path: &str) -> Result<TokenSet, CliError> {
    Ok(engine.get_tokens(path)?)
}

/// Validate a path's syntax
pub fn execute_check(engine: &Engine, path: &str) -> Result<(), CliError> {
    engine.get_tokens(path)?;
    Ok(())
}

pub fn execute_escape(engine: &Engine, segment: &str) -> String {
    engine.escape(segment)
}

/// Resolve a path and return the value found
pub fn execute_get(engine: &Engine, options: &GetOptions) -> Result<serde_json::Value, CliError> {
    let document = parse_document(options.input.as_deref())?;
    let args: Vec<Value> = options.args.iter().map(|a| parse_arg(a)).collect();
    let found = engine.try_get(&document, options.path.as_str(), &args)?;
    Ok(value_to_json(found))
}

/// Assign a value and return the updated document
pub fn execute_set(engine: &mut Engine, options: &SetOptions) -> Result<serde_json::Value, CliError> {
    let mut document = parse_document(options.input.as_deref())?;
    let value = json_to_value(serde_json::from_str(&options.value)?);
    let args: Vec<Value> = options.args.iter().map(|a| parse_arg(a)).collect();

    engine.set_force(options.force);
    engine.try_set(&mut document, options.path.as_str(), value, &args)?;
    Ok(value_to_json(document))
}

/// Find the paths that lead to a value
pub fn execute_find(engine: &Engine, options: &FindOptions) -> Result<Vec<String>, CliError> {
    let document = parse_document(options.input.as_deref())?;
    let target = json_to_value(serde_json::from_str(&options.target)?);
    let mode = if options.all { FindMode::Many } else { FindMode::One };
    engine
        .find(&document, &target, mode)
        .ok_or(CliError::NoMatch(options.target.clone()))
}
