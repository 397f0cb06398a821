//! Unit tests for the hint store and include resolution.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use rstest::{fixture, rstest};

use super::*;
use crate::bundled::BundledLibraries;

const X: &str = "<!id: x>\n<!include: y>\n$a + 0\n=> $a\n;;\n$a * 1\n=> $a\n;;\n";
const Y: &str = "<!id: y>\n<!include: x>\n$a - 0\n=> $a\n;;\n";

fn patterns(rules: &[Arc<TransformationRule>]) -> Vec<&str> {
    rules.iter().map(|rule| rule.source_pattern().value()).collect()
}

#[fixture]
fn cyclic() -> HintStore {
    let store = HintStore::new();
    store.register_from_str("x.hint", X).expect("register x");
    store.register_from_str("y.hint", Y).expect("register y");
    store
}

#[rstest]
fn lookup_works_by_key_and_declared_id(cyclic: HintStore) {
    let by_key = cyclic.get("x.hint").expect("by key");
    let by_id = cyclic.get("x").expect("by id");
    assert!(Arc::ptr_eq(&by_key, &by_id));
    assert!(cyclic.get("z").is_none());
    assert_eq!(cyclic.registered_ids(), ["x.hint", "y.hint"]);
    assert_eq!(cyclic.len(), 2);
}

#[rstest]
fn include_cycles_are_broken(cyclic: HintStore) {
    let x = cyclic.get("x").expect("x");
    let rules = cyclic.resolve_includes(&x);
    assert_eq!(patterns(&rules), ["$a + 0", "$a * 1", "$a - 0"]);

    let again = cyclic.resolve_includes(&x);
    assert_eq!(patterns(&again), patterns(&rules));
}

#[rstest]
fn resolve_by_key_reports_missing_files(cyclic: HintStore) {
    assert_eq!(cyclic.resolve("y").map(|rules| rules.len()).ok(), Some(3));
    assert!(matches!(cyclic.resolve("nope"), Err(StoreError::NotFound { .. })));
}

#[test]
fn diamond_includes_are_visited_once() {
    let store = HintStore::new();
    store
        .register_from_str("base", "<!id: base>\nSystem.gc()\n;;\n")
        .expect("base");
    store
        .register_from_str("left", "<!id: left>\n<!include: base>\n")
        .expect("left");
    store
        .register_from_str("right", "<!id: right>\n<!include: base>\n")
        .expect("right");
    let top = parse_hint_file("<!include: left, right, missing>\n").expect("top");
    assert_eq!(patterns(&store.resolve_includes(&top)), ["System.gc()"]);
}

#[test]
fn included_rules_are_not_deduplicated_against_the_parent() {
    let store = HintStore::new();
    store
        .register_from_str("inner", "<!id: inner>\nSystem.gc()\n;;\n")
        .expect("inner");
    let outer = parse_hint_file("<!id: outer>\n<!include: inner>\nSystem.gc()\n;;\n").expect("outer");
    assert_eq!(store.resolve_includes(&outer).len(), 2);
}

#[test]
fn parse_failures_carry_the_key() {
    let store = HintStore::new();
    let error = store
        .register_from_str("broken.hint", "$a + 0\n")
        .expect_err("unterminated");
    assert!(matches!(error, StoreError::Parse { ref key, .. } if key == "broken.hint"));
    assert!(store.is_empty());
}

#[test]
fn reader_and_file_registration() {
    let store = HintStore::new();
    store
        .register_from_reader("reader", io::Cursor::new("System.gc()\n;;\n"))
        .expect("reader");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rules.hint");
    std::fs::write(&path, "<!id: disk>\nSystem.gc()\n;;\n").expect("write");
    store.register_from_file("rules.hint", &path).expect("file");
    assert!(store.get("disk").is_some());

    let missing = store.register_from_file("gone", &dir.path().join("gone.hint"));
    assert!(matches!(missing, Err(StoreError::Io { .. })));
}

#[rstest]
fn unregister_removes_both_entries(cyclic: HintStore) {
    assert!(cyclic.unregister("x.hint").is_some());
    assert!(cyclic.get("x").is_none());
    assert!(cyclic.unregister("x.hint").is_none());
}

#[test]
fn unregister_keeps_a_newer_declared_id_entry() {
    let store = HintStore::new();
    store.register_from_str("old", "<!id: shared>\n").expect("old");
    let newer = store.register_from_str("new", "<!id: shared>\n").expect("new");
    store.unregister("old");
    let current = store.get("shared").expect("shared");
    assert!(Arc::ptr_eq(&current, &newer));
}

#[test]
fn reregistering_a_key_drops_its_old_declared_id() {
    let store = HintStore::new();
    store.register_from_str("rules", "<!id: before>\n").expect("first");
    let current = store.register_from_str("rules", "<!id: after>\n").expect("second");
    assert!(store.get("before").is_none());
    assert!(store.get("after").is_some_and(|file| Arc::ptr_eq(&file, &current)));
    assert!(store.get("rules").is_some_and(|file| Arc::ptr_eq(&file, &current)));
}

#[test]
fn reregistering_a_key_keeps_an_id_claimed_elsewhere() {
    let store = HintStore::new();
    store.register_from_str("first", "<!id: shared>\n").expect("first");
    let claimant = store.register_from_str("second", "<!id: shared>\n").expect("second");
    store.register_from_str("first", "<!id: other>\n").expect("replacement");
    assert!(store.get("shared").is_some_and(|file| Arc::ptr_eq(&file, &claimant)));
}

#[rstest]
fn all_rules_flattens_own_rules_only(cyclic: HintStore) {
    assert_eq!(patterns(&cyclic.all_rules()), ["$a + 0", "$a * 1", "$a - 0"]);
}

#[test]
fn bundled_libraries_load_once() {
    let store = HintStore::new();
    let first = store.load_bundled_libraries(&BundledLibraries::new());
    assert_eq!(
        first,
        ["collections", "modernize-java9", "modernize-java11", "performance"]
    );
    let second = store.load_bundled_libraries(&BundledLibraries::new());
    assert_eq!(second, store.registered_ids());
    assert_eq!(store.len(), 4);

    let java11 = store.get("modernize-java11").expect("java11");
    let resolved = store.resolve_includes(&java11);
    assert!(resolved.len() > java11.rules().len());
}

/// Counts loads so repeated bulk loading can be observed.
struct CountingSource {
    loads: AtomicUsize,
}

impl LibrarySource for CountingSource {
    fn names(&self) -> Vec<String> {
        vec!["good".to_owned(), "bad".to_owned(), "absent".to_owned()]
    }

    fn load(&self, name: &str) -> io::Result<String> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match name {
            "good" => Ok("<!id: good>\nSystem.gc()\n;;\n".to_owned()),
            "bad" => Ok("<!colour: red>\n".to_owned()),
            _ => Err(io::Error::new(io::ErrorKind::NotFound, "absent")),
        }
    }
}

#[test]
fn failing_libraries_are_skipped() {
    let store = HintStore::new();
    let source = CountingSource {
        loads: AtomicUsize::new(0),
    };
    assert_eq!(store.load_bundled_libraries(&source), ["good"]);
    assert_eq!(store.registered_ids(), ["good"]);
}

#[test]
fn concurrent_bulk_loads_run_once() {
    let store = HintStore::new();
    let source = CountingSource {
        loads: AtomicUsize::new(0),
    };
    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| store.load_bundled_libraries(&source));
        }
    });
    assert_eq!(source.loads.load(Ordering::SeqCst), 3);
    assert_eq!(store.registered_ids(), ["good"]);

    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.load_bundled_libraries(&source), ["good"]);
    assert_eq!(source.loads.load(Ordering::SeqCst), 6);
}

#[test]
fn inferred_rules_are_tagged_and_promoted() {
    let store = HintStore::new();
    let mined = parse_hint_file("System.gc()\n;;\n").expect("mined");
    let inferred = store.register_inferred_rules(mined, "abc123");
    assert_eq!(inferred.id(), Some("inferred:abc123"));
    assert_eq!(inferred.tags(), ["inferred", "mining", "abc123"]);
    assert_eq!(store.inferred_hint_files().len(), 1);

    let manual = store.promote_to_manual("inferred:abc123").expect("promote");
    assert_eq!(manual.id(), Some("manual:abc123"));
    assert_eq!(manual.rules().len(), 1);
    assert!(store.get("inferred:abc123").is_none());
    assert!(store.get("manual:abc123").is_some());
    assert!(store.inferred_hint_files().is_empty());
}

#[test]
fn inferred_files_keep_existing_tags() {
    let store = HintStore::new();
    let mined = parse_hint_file("<!tags: custom>\n").expect("mined");
    let inferred = store.register_inferred_rules(mined, "def456");
    assert_eq!(inferred.tags(), ["custom"]);
}

#[rstest]
#[case("manual:abc", "NotInferred")]
#[case("inferred:missing", "NotFound")]
fn promotion_failures(#[case] id: &str, #[case] variant: &str) {
    let error = HintStore::new().promote_to_manual(id).expect_err("failure");
    assert!(format!("{error:?}").starts_with(variant), "{error:?}");
}
