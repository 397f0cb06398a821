//! Crate-level tests exercising parsing, matching and rewriting together.

use rstest::rstest;

use crate::{
    Engine, Parser, Pattern, PatternKind, RewriteRule, Rewriter, SupportedLanguage, SyntaxTree,
};

fn parse(source: &str) -> SyntaxTree {
    Parser::new(SupportedLanguage::Java)
        .and_then(|mut parser| parser.parse_tree(source))
        .expect("parse")
}

#[rstest]
#[case("class A { void m() { } }", false)]
#[case("class A { void m() { }", true)]
#[case("class A { int x = ; }", true)]
fn parser_detects_errors(#[case] source: &str, #[case] has_errors: bool) {
    let mut parser = Parser::new(SupportedLanguage::Java).expect("parser init");
    let result = parser.parse(source).expect("parse");
    assert_eq!(result.has_errors(), has_errors);
}

#[rstest]
#[case("Main.java", Some(SupportedLanguage::Java))]
#[case("Main.JAVA", Some(SupportedLanguage::Java))]
#[case("main.rs", None)]
#[case("Makefile", None)]
fn language_is_detected_from_paths(
    #[case] path: &str,
    #[case] expected: Option<SupportedLanguage>,
) {
    assert_eq!(SupportedLanguage::from_path(std::path::Path::new(path)), expected);
}

#[test]
fn rewrite_of_string_comparison() {
    let source = r#"class A { boolean m(String s) { return s.equals(""); } }"#;
    let pattern = Pattern::new("$s.equals(\"\")", PatternKind::MethodCall)
        .compile()
        .expect("compile");
    let rule = RewriteRule::new(pattern, "$s.isEmpty()").expect("rule");
    let result = Rewriter::new().rewrite(&parse(source), &rule).expect("rewrite");
    assert_eq!(
        result.output(),
        "class A { boolean m(String s) { return s.isEmpty(); } }"
    );
}

#[test]
fn comments_do_not_affect_matching() {
    let tree = parse("class A { void m() { f(/* first */ a, b); } }");
    let matches = Engine::new()
        .find_matches(&tree, &Pattern::new("f($a, $b)", PatternKind::MethodCall))
        .expect("matches");
    assert_eq!(matches.len(), 1);
}

#[test]
fn annotation_and_import_patterns_match_declarations() {
    let tree = parse(
        "import org.junit.Assert;\nclass A { @Deprecated void m() { } @Override public String toString() { return \"\"; } }",
    );
    let engine = Engine::new();
    let imports = engine
        .find_matches(&tree, &Pattern::new("import org.junit.Assert", PatternKind::Import))
        .expect("imports");
    let annotations = engine
        .find_matches(&tree, &Pattern::new("@Deprecated", PatternKind::Annotation))
        .expect("annotations");
    assert_eq!(imports.len(), 1);
    assert_eq!(annotations.len(), 1);
}

#[test]
fn constructor_patterns_match_object_creation() {
    let tree = parse("class A { void m() { Object r = new FileReader(path); use(new Other()); } }");
    let matches = Engine::new()
        .find_matches(&tree, &Pattern::new("new FileReader($p)", PatternKind::Constructor))
        .expect("matches");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches.first().and_then(|found| found.binding_text("$p")).as_deref(), Some("path"));
}

#[test]
fn statement_placeholder_matches_any_statement() {
    let tree = parse("class A { void m() { if (c) { x(); } while (d) { } } }");
    let matches = Engine::new()
        .find_matches(&tree, &Pattern::new("if ($c) $s;", PatternKind::Statement))
        .expect("matches");
    assert_eq!(matches.len(), 1);
}
