//! End-to-end tests for hintweave-syntax using insta for snapshot testing.
//!
//! These tests exercise the public API across happy and unhappy paths.

use std::sync::Arc;

use insta::assert_snapshot;
use rstest::{fixture, rstest};

use hintweave_syntax::{
    DeclaredTypeResolver, Engine, Match, Parser, Pattern, PatternKind, SupportedLanguage,
    SyntaxError, SyntaxTree, parse_pattern,
};

const SOURCE: &str = r#"
import java.util.Vector;

class Inventory {
    private Vector<String> items = new Vector<>();

    int total(int base) {
        int x = base + 0;
        int y = 2 + 0;
        items.addElement("x");
        return x + y;
    }

    Object first() {
        log("first");
        check();
        return items.firstElement();
    }
}
"#;

#[fixture]
fn tree() -> SyntaxTree {
    Parser::new(SupportedLanguage::Java)
        .and_then(|mut parser| parser.parse_tree(SOURCE))
        .unwrap_or_else(|err| panic!("parse: {err}"))
}

fn describe(found: &Match<'_>) -> String {
    let bindings: Vec<String> = found
        .bindings()
        .keys()
        .filter(|key| !matches!(key.as_str(), "$_" | "$this"))
        .map(|key| format!("{key}={}", found.binding_text(key).unwrap_or_default()))
        .collect();
    format!("{}:{} {} [{}]", found.line(), found.column(), found.text(), bindings.join(", "))
}

fn run(tree: &SyntaxTree, engine: &Engine, pattern: &Pattern) -> String {
    engine
        .find_matches(tree, pattern)
        .unwrap_or_else(|err| panic!("matches: {err}"))
        .iter()
        .map(describe)
        .collect::<Vec<_>>()
        .join("\n")
}

#[rstest]
fn additions_of_zero_are_found(tree: SyntaxTree) {
    let pattern = Pattern::new("$x + 0", PatternKind::Expression);
    assert_snapshot!(run(&tree, &Engine::new(), &pattern), @r"
    8:17 base + 0 [$x=base]
    9:17 2 + 0 [$x=2]
    ");
}

#[rstest]
fn trailing_returns_are_found(tree: SyntaxTree) {
    let pattern = Pattern::new("{ $before$; return $x; }", PatternKind::Block);
    let found = Engine::new()
        .find_matches(&tree, &pattern)
        .unwrap_or_else(|err| panic!("matches: {err}"));
    let bound: Vec<_> = found
        .iter()
        .map(|m| {
            format!(
                "{} | {}",
                m.binding_text("$before$").unwrap_or_default(),
                m.binding_text("$x").unwrap_or_default()
            )
        })
        .collect();
    assert_snapshot!(bound.join("\n"), @r#"
    int x = base + 0;, int y = 2 + 0;, items.addElement("x"); | x + y
    log("first");, check(); | items.firstElement()
    "#);
}

#[rstest]
fn qualified_types_need_a_resolver(tree: SyntaxTree) {
    let pattern = Pattern::new("$v.addElement($e)", PatternKind::MethodCall)
        .with_qualified_type("java.util.Vector");
    assert_eq!(run(&tree, &Engine::new(), &pattern), "");

    let engine = Engine::with_type_resolver(Arc::new(DeclaredTypeResolver::new()));
    assert_snapshot!(run(&tree, &engine, &pattern), @r#"10:9 items.addElement("x") [$e="x", $v=items]"#);
}

#[rstest]
#[case("", "empty")]
#[case("$x + * 1", "$x + * 1")]
#[case("f($a$, $b$)", "at most one")]
fn malformed_patterns_are_rejected(#[case] text: &str, #[case] fragment: &str) {
    let kind = PatternKind::infer(text);
    let error = parse_pattern(text, kind).expect_err("malformed pattern");
    assert!(
        matches!(error, SyntaxError::PatternCompileError { .. }),
        "unexpected error: {error}"
    );
    assert!(error.to_string().contains(fragment), "{error}");
}

#[test]
fn bare_dollar_names_the_token() {
    let error = parse_pattern("$1 + x", PatternKind::Expression).expect_err("bad token");
    assert!(matches!(error, SyntaxError::InvalidPlaceholder { .. }), "{error}");
}
