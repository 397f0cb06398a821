//! Crate-level tests running bundled libraries through the full pipeline.

use rstest::rstest;

use hintweave_syntax::{Parser, SupportedLanguage, SyntaxTree};

use crate::{BundledLibraries, DryRunReporter, HintStore, LibrarySource, ReportOptions, parse_hint_file};

fn parse(source: &str) -> SyntaxTree {
    Parser::new(SupportedLanguage::Java)
        .and_then(|mut parser| parser.parse_tree(source))
        .expect("parse")
}

#[rstest]
#[case("collections", 4)]
#[case("modernize-java9", 2)]
#[case("modernize-java11", 3)]
#[case("performance", 5)]
fn bundled_libraries_parse(#[case] name: &str, #[case] rules: usize) {
    let text = BundledLibraries::new().load(name).expect("bundled text");
    let file = parse_hint_file(&text).unwrap_or_else(|err| panic!("{name}: {err}"));
    assert_eq!(file.id(), Some(name));
    assert_eq!(file.rules().len(), rules);
}

#[test]
fn unknown_bundled_library_is_not_found() {
    let error = BundledLibraries::new().load("nope").expect_err("missing");
    assert_eq!(error.kind(), std::io::ErrorKind::NotFound);
}

#[rstest]
#[case("modernize-java11", 9)]
#[case("modernize-java9", 6)]
#[case("collections", 4)]
fn bundled_includes_resolve_transitively(#[case] name: &str, #[case] total: usize) {
    let store = HintStore::new();
    store.load_bundled_libraries(&BundledLibraries::new());
    assert_eq!(store.resolve(name).map(|rules| rules.len()).ok(), Some(total));
}

const SAMPLE: &str = r#"
import java.util.List;
import java.util.Vector;

class Sample {
    private Vector<String> legacy = new Vector<>();

    boolean run(List<String> names, String text) {
        legacy.addElement("x");
        Integer boxed = new Integer(42);
        String joined = "" + boxed;
        if (text.trim().isEmpty()) {
            System.gc();
        }
        return names.size() == 0;
    }
}
"#;

#[test]
fn bundled_rules_report_a_sample() {
    let store = HintStore::new();
    store.load_bundled_libraries(&BundledLibraries::new());
    let mut rules = store.resolve("modernize-java11").expect("java11");
    rules.extend(store.resolve("performance").expect("performance"));

    let tree = parse(SAMPLE);
    let options = ReportOptions::new().with_source_version("17");
    let entries = DryRunReporter::new().analyze(Some(&tree), &rules, &options);
    let summary: Vec<String> = entries
        .iter()
        .map(|entry| {
            format!(
                "{}: {} => {}",
                entry.line,
                entry.matched,
                entry.replacement.as_deref().unwrap_or("-")
            )
        })
        .collect();

    insta::assert_snapshot!(summary.join("\n"), @r#"
    12: text.trim().isEmpty() => text.isBlank()
    15: names.size() == 0 => names.isEmpty()
    9: legacy.addElement("x") => legacy.add("x")
    10: new Integer(42) => Integer.valueOf(42)
    11: "" + boxed => String.valueOf(boxed)
    13: System.gc() => -
    "#);
}
