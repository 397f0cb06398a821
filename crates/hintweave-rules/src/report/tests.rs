//! Unit tests for dry-run reporting.

use std::sync::Arc;

use insta::assert_snapshot;
use rstest::rstest;

use hintweave_syntax::{Parser, Pattern, PatternKind, Rewriter, SupportedLanguage, SyntaxTree};

use super::*;
use crate::hint_parser::parse_hint_file;
use crate::rule::RewriteAlternative;

const ADD_ZERO: &str = "class Test { void m() { int x = 1 + 0; } }";

fn parse(source: &str) -> SyntaxTree {
    Parser::new(SupportedLanguage::Java)
        .and_then(|mut parser| parser.parse_tree(source))
        .expect("parse")
}

fn add_zero_rule() -> Arc<TransformationRule> {
    let compiled = Pattern::new("$x + 0", PatternKind::Expression)
        .compile()
        .expect("compile");
    Arc::new(
        TransformationRule::new(compiled)
            .with_description("Remove addition of zero")
            .with_alternative(RewriteAlternative::otherwise("$x")),
    )
}

fn rules_from(text: &str) -> Vec<Arc<TransformationRule>> {
    parse_hint_file(text).expect("hint file").rules().to_vec()
}

#[test]
fn single_match_reports_position_and_replacement() {
    let tree = parse(ADD_ZERO);
    let entries = DryRunReporter::new().analyze(Some(&tree), &[add_zero_rule()], &ReportOptions::new());
    let [entry] = entries.as_slice() else {
        panic!("expected one entry, got {entries:?}");
    };
    assert_eq!((entry.line, entry.column, entry.offset, entry.length), (1, 33, 32, 5));
    assert_eq!(entry.matched, "1 + 0");
    assert_eq!(entry.replacement.as_deref(), Some("1"));
    assert_eq!(entry.severity, "info");
}

#[test]
fn json_report() {
    let tree = parse(ADD_ZERO);
    let entries = DryRunReporter::new().analyze(Some(&tree), &[add_zero_rule()], &ReportOptions::new());
    let json = to_json(&entries).expect("json");
    assert_snapshot!(json, @r#"
    [
      {
        "line": 1,
        "column": 33,
        "offset": 32,
        "length": 5,
        "matched": "1 + 0",
        "replacement": "1",
        "description": "Remove addition of zero",
        "severity": "info",
        "pattern": "$x + 0"
      }
    ]
    "#);

    let restored: Vec<ReportEntry> = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(restored, entries);
}

#[test]
fn csv_report() {
    let tree = parse("class Test { void m() { int a = 1 + 0; int b = 2 + 0; } }");
    let options = ReportOptions::new().with_severity("warning");
    let entries = DryRunReporter::new().analyze(Some(&tree), &[add_zero_rule()], &options);
    assert_snapshot!(to_csv(&entries), @r"
    line,offset,length,matched,replacement,description,severity,pattern
    1,32,5,1 + 0,1,Remove addition of zero,warning,$x + 0
    1,47,5,2 + 0,2,Remove addition of zero,warning,$x + 0
    ");
}

#[test]
fn csv_by_file_prefixes_each_row() {
    let first = parse("class A { int a = 1 + 0; }");
    let second = parse("class B { int b = 2 + 0, c = 3 + 0; }");
    let reporter = DryRunReporter::new();
    let rules = [add_zero_rule()];
    let files = [
        ("A.java", reporter.analyze(Some(&first), &rules, &ReportOptions::new())),
        ("dir, with comma/B.java", reporter.analyze(Some(&second), &rules, &ReportOptions::new())),
    ];
    assert_snapshot!(to_csv_by_file(&files), @r#"
    file,line,offset,length,matched,replacement,description,severity,pattern
    A.java,1,18,5,1 + 0,1,Remove addition of zero,info,$x + 0
    "dir, with comma/B.java",1,18,5,2 + 0,2,Remove addition of zero,info,$x + 0
    "dir, with comma/B.java",1,29,5,3 + 0,3,Remove addition of zero,info,$x + 0
    "#);
}

#[test]
fn csv_fields_are_quoted_when_needed() {
    let entry = ReportEntry {
        line: 3,
        column: 1,
        offset: 0,
        length: 10,
        matched: "f(a, \"b\")".to_owned(),
        replacement: None,
        description: Some("line one\nline two".to_owned()),
        severity: "info".to_owned(),
        pattern: "f($a, $b)".to_owned(),
        rule_id: None,
    };
    let csv = to_csv(&[entry]);
    let row = csv.split_once('\n').map(|(_, rest)| rest).expect("data row");
    assert_eq!(
        row,
        "3,0,10,\"f(a, \"\"b\"\")\",,\"line one\nline two\",info,\"f($a, $b)\"\n"
    );
}

#[test]
fn hint_only_rules_have_no_replacement() {
    let tree = parse("class Test { void m() { String x = \"hello\".toString(); } }");
    let rules = rules_from("\"Unnecessary toString()\":\n$x.toString()\n;;\n");
    let entries = DryRunReporter::new().analyze(Some(&tree), &rules, &ReportOptions::new());
    assert_eq!(entries.len(), 1);
    assert!(entries.iter().all(|entry| entry.replacement.is_none()));
    assert!(entries.iter().all(|entry| entry.to_edit().is_none()));
}

#[rstest]
#[case(None)]
#[case(Some(ADD_ZERO))]
fn empty_inputs_report_nothing(#[case] source: Option<&str>) {
    let tree = source.map(parse);
    let reporter = DryRunReporter::new();
    assert!(reporter.analyze(tree.as_ref(), &[], &ReportOptions::new()).is_empty());
    if tree.is_none() {
        assert!(reporter.analyze(None, &[add_zero_rule()], &ReportOptions::new()).is_empty());
    }
}

#[test]
fn unmatched_source_reports_nothing() {
    let tree = parse("class Test { void m() { int x = 1 + 2; } }");
    let entries = DryRunReporter::new().analyze(Some(&tree), &[add_zero_rule()], &ReportOptions::new());
    assert!(entries.is_empty());
}

const AS_LIST: &str = r#"
class Test {
    void m() {
        java.util.List<String> names = Arrays.asList("a", "b");
    }
}
"#;

#[rstest]
#[case("11", Some("List.of(\"a\", \"b\")"))]
#[case("9", Some("List.of(\"a\", \"b\")"))]
fn source_guard_and_version_select_the_rewrite(
    #[case] version: &str,
    #[case] expected: Option<&str>,
) {
    let rules = rules_from("<!id: java9>\nArrays.asList($items$) :: sourceVersionGE(9)\n=> List.of($items$)\n;;\n");
    let options = ReportOptions::new().with_source_version(version);
    let entries = DryRunReporter::new().analyze(Some(&parse(AS_LIST)), &rules, &options);
    let [entry] = entries.as_slice() else {
        panic!("expected one entry, got {entries:?}");
    };
    assert_eq!(entry.replacement.as_deref(), expected);
    assert_eq!(entry.rule_id.as_deref(), Some("java9:1"));
}

#[rstest]
#[case(Some("8"))]
#[case(None)]
fn failing_source_guard_skips_the_match(#[case] version: Option<&str>) {
    let rules = rules_from("Arrays.asList($items$) :: sourceVersionGE(9)\n=> List.of($items$)\n;;\n");
    let options = match version {
        Some(declared) => ReportOptions::new().with_source_version(declared),
        None => ReportOptions::new(),
    };
    let entries = DryRunReporter::new().analyze(Some(&parse(AS_LIST)), &rules, &options);
    assert!(entries.is_empty(), "{entries:?}");
}

#[test]
fn unmet_alternative_guards_leave_no_replacement() {
    let rules = rules_from("Arrays.asList($items$)\n=> List.of($items$) :: sourceVersionGE(9)\n;;\n");
    let options = ReportOptions::new().with_source_version("1.8");
    let entries = DryRunReporter::new().analyze(Some(&parse(AS_LIST)), &rules, &options);
    assert_eq!(entries.len(), 1);
    assert!(entries.iter().all(|entry| entry.replacement.is_none()));
}

#[test]
fn entries_apply_as_edits() {
    let tree = parse("class Test { void m() { int a = 1 + 0; int b = 2 + 0; } }");
    let entries = DryRunReporter::new().analyze(Some(&tree), &[add_zero_rule()], &ReportOptions::new());
    let edits = entries.iter().filter_map(ReportEntry::to_edit).collect();
    let result = Rewriter::new().apply(tree.source(), edits).expect("apply");
    assert_eq!(result.output(), "class Test { void m() { int a = 1; int b = 2; } }");
    assert_eq!(result.num_replacements(), 2);
}
