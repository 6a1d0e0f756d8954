use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::PathError;

/// Members of an object, kept in insertion order.
pub type Map = IndexMap<String, Value>;

/// A node in the data graph that paths are resolved against.
///
/// Objects keep their members in insertion order, which is the order wildcard
/// matches are reported in. Arrays are addressed by canonical decimal indices.
///
/// # Examples
///
/// ```
/// use keypath::value::{Map, Value};
///
/// let mut user = Map::new();
/// user.insert("name".to_string(), Value::String("Ada".to_string()));
///
/// let doc = Value::Array(vec![Value::Object(user)]);
/// assert_eq!(doc.child("0").and_then(|u| u.child("name")), Some(&Value::String("Ada".into())));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Ordered sequence of values
    Array(Vec<Value>),

    /// Object with string keys in insertion order
    Object(Map),

    /// Native function invoked by a call container
    Function(Callable),
}

/// Signature of the native functions a path can call.
///
/// Receives the call receiver (the value the function was looked up on) and
/// the positional arguments. Returning `None` fails the resolution.
pub type NativeFn = dyn Fn(&Value, &[Value]) -> Option<Value> + Send + Sync;

/// A shared native function stored in the data graph.
///
/// Two callables are equal only when they share the same function.
#[derive(Clone)]
pub struct Callable(Arc<NativeFn>);

impl Callable {
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        Callable(Arc::new(function))
    }

    pub fn call(&self, receiver: &Value, args: &[Value]) -> Option<Value> {
        (self.0)(receiver, args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Parses a canonical array index: ASCII digits, no sign, no leading zeros.
pub fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse().ok()
}

impl Value {
    /// Human-readable type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Looks up a direct member by property name or array index.
    pub fn child(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            Value::Array(items) => array_index(key).and_then(|i| items.get(i)),
            _ => None,
        }
    }

    pub fn child_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Value::Object(map) => map.get_mut(key),
            Value::Array(items) => array_index(key).and_then(|i| items.get_mut(i)),
            _ => None,
        }
    }

    /// Follows a sequence of keys from this value.
    pub fn at<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        path.iter()
            .try_fold(self, |current, key| current.child(key.as_ref()))
    }

    pub fn at_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut Value> {
        path.iter()
            .try_fold(self, |current, key| current.child_mut(key.as_ref()))
    }

    /// Assigns a direct member. Arrays accept an existing index or their length (append).
    pub fn set_child(&mut self, key: &str, value: Value) -> Result<(), PathError> {
        match self {
            Value::Object(map) => {
                map.insert(key.to_owned(), value);
                Ok(())
            }
            Value::Array(items) => match array_index(key) {
                Some(i) if i < items.len() => {
                    items[i] = value;
                    Ok(())
                }
                Some(i) if i == items.len() => {
                    items.push(value);
                    Ok(())
                }
                _ => Err(rejected_index(key, items.len())),
            },
            other => Err(rejected_member(key, other)),
        }
    }

    /// Own member names in enumeration order: object keys, or array indices.
    pub fn member_names(&self) -> Option<Vec<String>> {
        match self {
            Value::Object(map) => Some(map.keys().cloned().collect()),
            Value::Array(items) => Some((0..items.len()).map(|i| i.to_string()).collect()),
            _ => None,
        }
    }

    /// String form of a scalar, used when a value supplies a property name
    pub fn as_key(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Float(n) => Some(n.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Null => Some("null".to_string()),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => None,
        }
    }
}

fn rejected_index(key: &str, len: usize) -> PathError {
    PathError::AssignmentFailed(format!("cannot assign '{key}' on an array of length {len}"))
}

fn rejected_member(key: &str, target: &Value) -> PathError {
    PathError::AssignmentFailed(format!("cannot assign '{}' on a {}", key, target.type_name()))
}
