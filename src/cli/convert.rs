//! JSON <-> keypath Value conversion utilities

use crate::value::{Map, Value};

/// Convert serde_json::Value to a keypath Value
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect::<Map>(),
        ),
    }
}

/// Convert a keypath Value to serde_json::Value
///
/// Functions have no JSON form and become null.
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null | Value::Function(_) => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        json_to_value(v)
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        value_to_json(v)
    }
}

#[test]
fn test_object_order_survives_conversion() {
    let json: serde_json::Value = serde_json::from_str(r#"{"z": 1, "a": [1.5, null]}"#).unwrap();
    let value = json_to_value(json);
    assert_eq!(
        value.member_names(),
        Some(vec!["z".to_string(), "a".to_string()])
    );
    assert_eq!(
        value_to_json(value).to_string(),
        r#"{"z":1,"a":[1.5,null]}"#
    );
}
