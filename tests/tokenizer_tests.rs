use keypath::ast::{Collection, Container, ContainerRole, Modifiers, Token, TokenSet, Word};
use keypath::lexer::{split_segments, tokenize};
use keypath::{SyntaxConfig, SyntaxError};

fn tokens(path: &str) -> TokenSet {
    tokenize(path, &SyntaxConfig::default()).unwrap()
}

fn syntax_error(path: &str) -> SyntaxError {
    tokenize(path, &SyntaxConfig::default()).unwrap_err()
}

fn plain(name: &str) -> Token {
    Token::Plain(name.to_string())
}

fn word(name: &str, modifiers: Modifiers) -> Token {
    Token::Word(Word {
        name: name.to_string(),
        modifiers,
        wildcard: None,
        each: false,
    })
}

// ============================================================================
// Simple paths
// ============================================================================

#[test]
fn test_dotted_path_is_simple() {
    let set = tokens("foo.bar.qux");
    assert!(set.simple);
    assert_eq!(set.tokens, vec![plain("foo"), plain("bar"), plain("qux")]);
}

#[test]
fn test_empty_path_has_no_tokens() {
    let set = tokens("");
    assert!(set.is_empty());
    assert!(set.simple);
}

#[test]
fn test_bracket_index_splices_plain_token() {
    let set = tokens("items[0].name");
    assert!(set.simple);
    assert_eq!(set.tokens, vec![plain("items"), plain("0"), plain("name")]);
}

#[test]
fn test_quoted_name_keeps_separators() {
    let set = tokens("'a.b'.c");
    assert!(set.simple);
    assert_eq!(set.tokens, vec![plain("a.b"), plain("c")]);

    assert_eq!(tokens("\"x,y\"").tokens, vec![plain("x,y")]);
}

#[test]
fn test_quote_is_its_own_token() {
    assert_eq!(tokens("a'b'").tokens, vec![plain("a"), plain("b")]);
    assert_eq!(tokens("'a''b'").tokens, vec![plain("a"), plain("b")]);
    assert_eq!(tokens("''").tokens, vec![plain("")]);
}

#[test]
fn test_text_after_quote_needs_separator() {
    assert_eq!(
        syntax_error("'a'b"),
        SyntaxError::UnexpectedCharacter { ch: 'b', position: 3 }
    );
}

#[test]
fn test_prefix_before_quote_makes_word() {
    assert_eq!(
        tokens("^'a.b'").tokens,
        vec![word("a.b", Modifiers { parent: 1, ..Modifiers::default() })]
    );
}

#[test]
fn test_wildcard_inside_quotes_is_literal() {
    assert_eq!(tokens("'a*'").tokens, vec![plain("a*")]);
}

#[test]
fn test_escape_makes_character_literal() {
    assert_eq!(tokens(r"a\.b.c").tokens, vec![plain("a.b"), plain("c")]);
    assert_eq!(tokens(r"\^x").tokens, vec![plain("^x")]);
}

#[test]
fn test_prefix_inside_word_is_literal() {
    assert_eq!(tokens("a^b").tokens, vec![plain("a^b")]);
}

#[test]
fn test_split_segments() {
    assert_eq!(split_segments("a/b/c", '/').unwrap(), vec!["a", "b", "c"]);
    assert!(split_segments("", '/').unwrap().is_empty());
    assert_eq!(
        split_segments("a//b", '/').unwrap_err(),
        SyntaxError::EmptySegment { position: 2 }
    );
}

// ============================================================================
// Modifiers and words
// ============================================================================

#[test]
fn test_parent_prefix_is_cumulative() {
    let set = tokens("a.^^b");
    assert!(!set.simple);
    assert_eq!(
        set.tokens,
        vec![
            plain("a"),
            word("b", Modifiers { parent: 2, ..Modifiers::default() }),
        ]
    );
}

#[test]
fn test_root_placeholder_and_context_prefixes() {
    assert_eq!(
        tokens("~top").tokens,
        vec![word("top", Modifiers { root: true, ..Modifiers::default() })]
    );
    assert_eq!(
        tokens("%1").tokens,
        vec![word("1", Modifiers { placeholder: true, ..Modifiers::default() })]
    );
    assert_eq!(
        tokens("@2").tokens,
        vec![word("2", Modifiers { context: true, ..Modifiers::default() })]
    );
}

#[test]
fn test_wildcard_word() {
    assert_eq!(
        tokens("user*").tokens,
        vec![Token::Word(Word {
            name: "user*".to_string(),
            modifiers: Modifiers::default(),
            wildcard: Some(4),
            each: false,
        })]
    );
}

#[test]
fn test_escaped_wildcard_is_not_the_pattern() {
    assert_eq!(
        tokens(r"a\*b*").tokens,
        vec![Token::Word(Word {
            name: "a*b*".to_string(),
            modifiers: Modifiers::default(),
            wildcard: Some(3),
            each: false,
        })]
    );
}

#[test]
fn test_bracket_merges_modifiers() {
    let set = tokens("a.^[%1]");
    assert_eq!(
        set.tokens,
        vec![
            plain("a"),
            word(
                "1",
                Modifiers {
                    parent: 1,
                    placeholder: true,
                    ..Modifiers::default()
                }
            ),
        ]
    );
}

// ============================================================================
// Each and collections
// ============================================================================

#[test]
fn test_each_applies_to_next_token_only() {
    let set = tokens("items<name.first");
    assert_eq!(
        set.tokens,
        vec![
            plain("items"),
            Token::Word(Word {
                name: "name".to_string(),
                modifiers: Modifiers::default(),
                wildcard: None,
                each: true,
            }),
            plain("first"),
        ]
    );
}

#[test]
fn test_leading_each() {
    let set = tokens("<id");
    assert!(matches!(&set.tokens[..], [Token::Word(Word { each: true, .. })]));
}

#[test]
fn test_collection() {
    let set = tokens("foo.bar,qux");
    assert_eq!(
        set.tokens,
        vec![
            plain("foo"),
            Token::Collection(Collection {
                items: vec![plain("bar"), plain("qux")],
                each: false,
            }),
        ]
    );
}

#[test]
fn test_each_collection() {
    let set = tokens("rows<a,b");
    assert_eq!(
        set.tokens,
        vec![
            plain("rows"),
            Token::Collection(Collection {
                items: vec![plain("a"), plain("b")],
                each: true,
            }),
        ]
    );
}

#[test]
fn test_collection_then_each() {
    let set = tokens("foo.bar,qux<baz");
    assert_eq!(set.tokens.len(), 3);
    assert!(matches!(&set.tokens[1], Token::Collection(c) if c.items.len() == 2 && !c.each));
    assert!(matches!(&set.tokens[2], Token::Word(w) if w.name == "baz" && w.each));
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn test_call_container() {
    let set = tokens("fn(a,b)");
    assert_eq!(set.tokens.len(), 2);
    match &set.tokens[1] {
        Token::Container(Container { inner, role, each }) => {
            assert_eq!(*role, ContainerRole::Call);
            assert!(!each);
            assert!(matches!(&inner.tokens[..], [Token::Collection(c)] if c.items.len() == 2));
        }
        other => panic!("expected a call container, got {:?}", other),
    }
}

#[test]
fn test_empty_call() {
    let set = tokens("fn()");
    assert!(matches!(
        &set.tokens[1],
        Token::Container(Container { inner, role: ContainerRole::Call, .. }) if inner.is_empty()
    ));
}

#[test]
fn test_eval_property_container() {
    let set = tokens("map{key}");
    assert_eq!(
        set.tokens,
        vec![
            plain("map"),
            Token::Container(Container {
                inner: TokenSet::new(vec![plain("key")]),
                role: ContainerRole::EvalProperty,
                each: false,
            }),
        ]
    );
}

#[test]
fn test_multi_token_bracket_stays_nested() {
    let set = tokens("[a.b].c");
    assert_eq!(
        set.tokens,
        vec![
            Token::Container(Container {
                inner: TokenSet::new(vec![plain("a"), plain("b")]),
                role: ContainerRole::Property,
                each: false,
            }),
            plain("c"),
        ]
    );
}

#[test]
fn test_nested_containers() {
    let set = tokens("f(g(x))");
    let Token::Container(outer) = &set.tokens[1] else {
        panic!("expected container");
    };
    assert_eq!(outer.inner.tokens.len(), 2);
    assert!(matches!(
        &outer.inner.tokens[1],
        Token::Container(Container { role: ContainerRole::Call, .. })
    ));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_empty_segment() {
    assert_eq!(syntax_error("a..b"), SyntaxError::EmptySegment { position: 2 });
    assert_eq!(syntax_error("a.b."), SyntaxError::EmptySegment { position: 4 });
    assert!(matches!(syntax_error("a,,b"), SyntaxError::EmptySegment { .. }));
}

#[test]
fn test_unclosed_container() {
    assert_eq!(
        syntax_error("[a"),
        SyntaxError::UnclosedContainer { opener: '[', position: 0 }
    );
    assert!(matches!(syntax_error("fn(a"), SyntaxError::UnclosedContainer { opener: '(', .. }));
    assert!(matches!(syntax_error("'abc"), SyntaxError::UnclosedContainer { opener: '\'', .. }));
}

#[test]
fn test_unexpected_closer() {
    assert_eq!(
        syntax_error("a]"),
        SyntaxError::UnexpectedCloser { ch: ']', position: 1 }
    );
}

#[test]
fn test_trailing_escape() {
    assert_eq!(syntax_error(r"a\"), SyntaxError::TrailingEscape { position: 1 });
}

#[test]
fn test_dangling_modifier() {
    assert_eq!(syntax_error("a.^"), SyntaxError::DanglingModifier { position: 3 });
    assert!(matches!(syntax_error("%.a"), SyntaxError::DanglingModifier { .. }));
}

#[test]
fn test_multiple_wildcards_rejected() {
    assert_eq!(
        syntax_error("a*b*"),
        SyntaxError::MultipleWildcards { word: "a*b*".to_string() }
    );
}

#[test]
fn test_text_after_container() {
    assert_eq!(
        syntax_error("fn()x"),
        SyntaxError::UnexpectedCharacter { ch: 'x', position: 4 }
    );
}

#[test]
fn test_eval_property_needs_content() {
    assert!(matches!(syntax_error("a{}"), SyntaxError::EmptySegment { .. }));
}
