//! Rules declared in code rather than in `.hint` files.
//!
//! Each [`RuleRecord`] names a pattern and describes it; a [`RuleCatalog`]
//! collects records and turns them into a hint-only [`HintFile`] that the
//! store can register like any parsed file.

use hintweave_syntax::Pattern;

use crate::error::CatalogError;
use crate::hint_file::HintFile;
use crate::rule::TransformationRule;

/// A code-declared rule: an id, a description and a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRecord {
    id: String,
    description: String,
    pattern: Pattern,
}

impl RuleRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            pattern,
        }
    }

    /// Returns the id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the pattern.
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

/// Records in registration order, unique by id.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    records: Vec<RuleRecord>,
}

impl RuleCatalog {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Duplicate`] when a record with the same id is
    /// already present.
    pub fn register(&mut self, record: RuleRecord) -> Result<(), CatalogError> {
        if self.get(record.id()).is_some() {
            return Err(CatalogError::Duplicate { id: record.id });
        }
        self.records.push(record);
        Ok(())
    }

    /// Returns the record with `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RuleRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when the catalogue holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleRecord> {
        self.records.iter()
    }

    /// Compiles every record into a hint-only rule of a file declaring `id`.
    ///
    /// Each rule's pattern carries its record id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Pattern`] for the first record whose pattern
    /// does not compile.
    pub fn to_hint_file(&self, id: &str) -> Result<HintFile, CatalogError> {
        let mut file = HintFile::new().with_id(id);
        for record in &self.records {
            let compiled = record
                .pattern
                .clone()
                .with_id(record.id.clone())
                .compile()
                .map_err(|source| CatalogError::Pattern {
                    id: record.id.clone(),
                    source,
                })?;
            file.add_rule(TransformationRule::new(compiled).with_description(record.description.clone()));
        }
        tracing::debug!(id = %id, rules = file.rules().len(), "built hint file from catalogue");
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use hintweave_syntax::{Parser, PatternKind, SupportedLanguage};
    use rstest::rstest;

    use super::*;

    fn catalog() -> RuleCatalog {
        let mut catalog = RuleCatalog::new();
        catalog
            .register(RuleRecord::new(
                "explicit-gc",
                "Explicit garbage collection",
                Pattern::new("System.gc()", PatternKind::MethodCall),
            ))
            .expect("register gc");
        catalog
            .register(RuleRecord::new(
                "print-stack-trace",
                "Printing stack traces",
                Pattern::new("$e.printStackTrace()", PatternKind::MethodCall),
            ))
            .expect("register trace");
        catalog
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut catalog = catalog();
        let error = catalog
            .register(RuleRecord::new(
                "explicit-gc",
                "again",
                Pattern::new("Runtime.getRuntime().gc()", PatternKind::MethodCall),
            ))
            .expect_err("duplicate");
        assert!(matches!(error, CatalogError::Duplicate { ref id } if id == "explicit-gc"));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn records_become_hint_only_rules() {
        let file = catalog().to_hint_file("diagnostics").expect("file");
        assert_eq!(file.id(), Some("diagnostics"));
        assert_eq!(file.rules().len(), 2);
        assert!(file.rules().iter().all(|rule| rule.is_hint_only()));

        let ids: Vec<Option<&str>> = file
            .rules()
            .iter()
            .map(|rule| rule.source_pattern().id())
            .collect();
        assert_eq!(ids, [Some("explicit-gc"), Some("print-stack-trace")]);
    }

    #[rstest]
    #[case("class A { void m() { System.gc(); } }", 1)]
    #[case("class A { void m() { try { } catch (Exception e) { e.printStackTrace(); } } }", 1)]
    #[case("class A { void m() { } }", 0)]
    fn catalogue_rules_match(#[case] source: &str, #[case] expected: usize) {
        let tree = Parser::new(SupportedLanguage::Java)
            .and_then(|mut parser| parser.parse_tree(source))
            .expect("parse");
        let file = catalog().to_hint_file("diagnostics").expect("file");
        let found: usize = file
            .rules()
            .iter()
            .map(|rule| rule.compiled().find_all(&tree).len())
            .sum();
        assert_eq!(found, expected);
    }

    #[test]
    fn invalid_pattern_names_the_record() {
        let mut catalog = RuleCatalog::new();
        catalog
            .register(RuleRecord::new(
                "broken",
                "broken",
                Pattern::new("$x +* 1", PatternKind::Expression),
            ))
            .expect("register");
        let error = catalog.to_hint_file("x").expect_err("compile failure");
        assert!(error.to_string().contains("`broken`"), "{error}");
    }
}
