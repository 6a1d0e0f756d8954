use keypath::{Engine, EngineOptions, PathError, SyntaxError, Value};
use serde_json::json;

fn doc(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn sample() -> Value {
    doc(json!({
        "foo": {
            "bar": {"baz": 123, "qux": {"baz": true}},
            "qux": {"baz": 456},
            "list": [{"id": 1, "tags": ["x"]}, {"id": 2, "tags": []}]
        },
        "abc": 1,
        "axc": 2,
        "ayz": 3,
        "a.b": "dotted"
    }))
}

const PATHS: &[&str] = &[
    "",
    "foo",
    "foo.bar.baz",
    "foo.bar,qux<baz",
    "foo.list<id",
    "foo.list[1].tags",
    "foo.list.0.tags.0",
    "a*c",
    "*",
    "'a.b'",
    "foo.bar.^qux.baz",
    "foo.%1.baz",
    "~abc",
    "missing.path",
    "foo.list<tags.0",
];

// ============================================================================
// Reads
// ============================================================================

#[test]
fn test_get_nested() {
    let engine = Engine::new();
    let root = doc(json!({"foo": {"bar": {"qux": {"baz": true}}}}));
    assert_eq!(engine.get(&root, "foo.bar.qux.baz", &[]), Some(Value::Boolean(true)));
}

#[test]
fn test_get_collection_each() {
    let engine = Engine::new();
    let root = doc(json!({"foo": {"bar": {"baz": 123}, "qux": {"baz": 456}}}));
    assert_eq!(
        engine.get(&root, "foo.bar,qux<baz", &[]),
        Some(doc(json!([123, 456])))
    );
}

#[test]
fn test_get_placeholders() {
    let engine = Engine::new();
    let root = doc(json!({"foo": {"bar": {"qux": {"baz": true}}}}));
    let args = [Value::String("baz".into()), Value::String("bar".into())];
    assert_eq!(engine.get(&root, "foo.%2.qux.%1", &args), Some(Value::Boolean(true)));
}

#[test]
fn test_get_wildcards() {
    let engine = Engine::new();
    let root = doc(json!({"abc": 1, "axc": 2, "ayz": 3}));
    assert_eq!(engine.get(&root, "a*c", &[]), Some(doc(json!([1, 2]))));
    assert_eq!(engine.get(&root, "*", &[]), Some(doc(json!([1, 2, 3]))));
}

#[test]
fn test_get_missing_is_none() {
    let engine = Engine::new();
    let root = sample();
    assert_eq!(engine.get(&root, "foo.nope", &[]), None);
    assert_eq!(engine.get(&root, "foo..bar", &[]), None);
    assert_eq!(
        engine.try_get(&root, "foo.nope", &[]),
        Err(PathError::NotFound("nope".to_string()))
    );
}

#[test]
fn test_try_get_reports_syntax_errors() {
    let engine = Engine::new();
    assert!(matches!(
        engine.try_get(&sample(), "[foo", &[]),
        Err(PathError::Syntax(SyntaxError::UnclosedContainer { .. }))
    ));
}

#[test]
fn test_tokens_and_raw_string_agree() {
    let engine = Engine::new();
    let root = sample();
    let args = [Value::String("bar".into())];
    for path in PATHS {
        let tokens = engine.get_tokens(path).unwrap();
        assert_eq!(
            engine.try_get(&root, &tokens, &args),
            engine.try_get(&root, *path, &args),
            "path {:?}",
            path
        );
    }
}

// ============================================================================
// Writes
// ============================================================================

#[test]
fn test_set_without_force_fails() {
    let engine = Engine::new();
    let mut root = doc(json!({}));
    assert!(!engine.set(&mut root, "a.b.c", Value::Integer(5), &[]));
    assert_eq!(root, doc(json!({})));
}

#[test]
fn test_set_with_force() {
    let engine = Engine::with_options(EngineOptions {
        force: true,
        ..EngineOptions::default()
    });
    let mut root = doc(json!({}));
    assert!(engine.set(&mut root, "a.b.c", Value::Integer(5), &[]));
    assert_eq!(root, doc(json!({"a": {"b": {"c": 5}}})));
}

#[test]
fn test_set_force_toggle_on_general_path() {
    let mut engine = Engine::new();
    let mut root = doc(json!({}));
    assert!(!engine.set(&mut root, "a.%1.c", Value::Integer(5), &[Value::String("b".into())]));
    engine.set_force(true);
    assert!(engine.set(&mut root, "a.%1.c", Value::Integer(5), &[Value::String("b".into())]));
    assert_eq!(root, doc(json!({"a": {"b": {"c": 5}}})));
}

#[test]
fn test_set_then_get() {
    let engine = Engine::new();
    let mut root = sample();
    assert!(engine.set(&mut root, "foo.list<id", Value::Integer(0), &[]));
    assert_eq!(engine.get(&root, "foo.list<id", &[]), Some(doc(json!([0, 0]))));
}

#[test]
fn test_set_empty_path_fails() {
    let engine = Engine::new();
    let mut root = sample();
    assert!(matches!(
        engine.try_set(&mut root, "", Value::Null, &[]),
        Err(PathError::AssignmentFailed(_))
    ));
}

// ============================================================================
// Public helpers
// ============================================================================

#[test]
fn test_is_valid() {
    let engine = Engine::new();
    assert!(engine.is_valid("foo.bar[0].baz"));
    assert!(engine.is_valid("fn(@1,@2)"));
    assert!(!engine.is_valid("a..b"));
    assert!(!engine.is_valid("[a"));
    assert!(!engine.is_valid(r"a\"));
}

#[test]
fn test_get_tokens_errors() {
    let engine = Engine::new();
    assert!(matches!(engine.get_tokens("a..b"), Err(SyntaxError::EmptySegment { .. })));
    assert!(matches!(
        engine.get_tokens("[a"),
        Err(SyntaxError::UnclosedContainer { .. })
    ));
}

#[test]
fn test_escape_round_trips() {
    let engine = Engine::new();
    let escaped = engine.escape("a.b*[c]");
    assert_eq!(escaped, r"a\.b\*\[c\]");

    let root = doc(json!({"a.b*[c]": 1}));
    assert_eq!(engine.get(&root, escaped.as_str(), &[]), Some(Value::Integer(1)));
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn test_cache_does_not_change_results() {
    let cached = Engine::new();
    let uncached = Engine::with_options(EngineOptions {
        cache: false,
        ..EngineOptions::default()
    });
    let root = sample();
    let args = [Value::String("bar".into())];

    for _ in 0..2 {
        for path in PATHS {
            assert_eq!(
                cached.try_get(&root, *path, &args),
                uncached.try_get(&root, *path, &args),
                "path {:?}",
                path
            );
        }
    }

    for path in PATHS {
        let mut a = sample();
        let mut b = sample();
        let first = cached.try_set(&mut a, *path, Value::Integer(7), &args);
        let second = uncached.try_set(&mut b, *path, Value::Integer(7), &args);
        assert_eq!(first, second, "path {:?}", path);
        assert_eq!(a, b, "path {:?}", path);
    }
}

#[test]
fn test_cache_holds_compiled_paths() {
    let mut engine = Engine::new();
    let root = sample();
    engine.get(&root, "foo.bar,qux<baz", &[]);
    engine.get(&root, "foo.bar,qux<baz", &[]);
    assert_eq!(engine.cached_paths(), 1);

    // simple paths never reach the tokenizer
    engine.get(&root, "foo.bar.baz", &[]);
    assert_eq!(engine.cached_paths(), 1);

    engine.clear_cache();
    assert_eq!(engine.cached_paths(), 0);
}

#[test]
fn test_disabling_cache_clears_it() {
    let mut engine = Engine::new();
    engine.get(&sample(), "a*c", &[]);
    assert_eq!(engine.cached_paths(), 1);
    engine.set_cache(false);
    assert!(!engine.is_cache_enabled());
    assert_eq!(engine.cached_paths(), 0);
    engine.get(&sample(), "a*c", &[]);
    assert_eq!(engine.cached_paths(), 0);
}

#[test]
fn test_cache_capacity_is_bounded() {
    let engine = Engine::with_options(EngineOptions {
        cache_capacity: 2,
        ..EngineOptions::default()
    });
    let root = sample();
    for path in ["a*", "b*", "c*", "d*"] {
        engine.get(&root, path, &[]);
    }
    assert_eq!(engine.cached_paths(), 2);
}
