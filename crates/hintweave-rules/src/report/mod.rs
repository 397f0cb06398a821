//! Dry-run reports of what a rule set would change.
//!
//! [`DryRunReporter::analyze`] runs rules over a tree and records one
//! [`ReportEntry`] per match, including the rewrite the guards select.
//! Nothing is edited; [`ReportEntry::to_edit`] turns an entry into an edit
//! for callers that want to apply it.

use std::fmt;
use std::sync::Arc;

use hintweave_syntax::{SyntaxTree, TextEdit, TypeResolver, instantiate};
use serde::{Deserialize, Serialize};

use crate::guard::{GuardContext, GuardRegistry};
use crate::hint_file::DEFAULT_SEVERITY;
use crate::index::PatternIndex;
use crate::rule::TransformationRule;

const CSV_HEADER: &str = "line,offset,length,matched,replacement,description,severity,pattern";

/// Environment facts for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    source_version: Option<String>,
    severity: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            source_version: None,
            severity: DEFAULT_SEVERITY.to_owned(),
        }
    }
}

impl ReportOptions {
    /// Creates options with no source version and `"info"` severity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source-language version guards compare against.
    #[must_use]
    pub fn with_source_version(mut self, version: impl Into<String>) -> Self {
        self.source_version = Some(version.into());
        self
    }

    /// Sets the severity recorded on every entry.
    #[must_use]
    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = severity.into();
        self
    }

    /// Returns the source-language version.
    #[must_use]
    pub fn source_version(&self) -> Option<&str> {
        self.source_version.as_deref()
    }

    /// Returns the severity.
    #[must_use]
    pub fn severity(&self) -> &str {
        &self.severity
    }
}

/// One match of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// One-based line of the match.
    pub line: u32,
    /// One-based column of the match.
    pub column: u32,
    /// Byte offset of the match.
    pub offset: usize,
    /// Byte length of the match.
    pub length: usize,
    /// Matched source text.
    pub matched: String,
    /// Instantiated replacement, absent for hint-only rules and when no
    /// alternative applies.
    pub replacement: Option<String>,
    /// Rule description.
    pub description: Option<String>,
    /// Severity of the rule's file.
    pub severity: String,
    /// Source pattern text.
    pub pattern: String,
    /// Pattern id, when the rule has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl ReportEntry {
    /// Returns the edit that applies the replacement, if there is one.
    #[must_use]
    pub fn to_edit(&self) -> Option<TextEdit> {
        let replacement = self.replacement.as_deref()?;
        let end = self.offset.checked_add(self.length)?;
        Some(TextEdit::new(self.offset..end, replacement))
    }
}

/// Produces dry-run reports.
#[derive(Clone)]
pub struct DryRunReporter {
    registry: GuardRegistry,
    resolver: Option<Arc<dyn TypeResolver>>,
}

impl fmt::Debug for DryRunReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DryRunReporter")
            .field("registry", &self.registry)
            .field("type_resolver", &self.resolver.is_some())
            .finish()
    }
}

impl Default for DryRunReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DryRunReporter {
    /// Creates a reporter using the built-in guards.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(GuardRegistry::with_builtins())
    }

    /// Creates a reporter using `registry` for guard evaluation.
    #[must_use]
    pub const fn with_registry(registry: GuardRegistry) -> Self {
        Self {
            registry,
            resolver: None,
        }
    }

    /// Uses `resolver` for qualified-type patterns and type guards.
    #[must_use]
    pub fn with_type_resolver(mut self, resolver: Arc<dyn TypeResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Returns the guard registry.
    #[must_use]
    pub const fn registry(&self) -> &GuardRegistry {
        &self.registry
    }

    /// Runs `rules` over `tree` and reports every match whose rule applies.
    ///
    /// Entries are grouped by rule in the given order and by position
    /// within a rule.
    #[must_use]
    pub fn analyze(
        &self,
        tree: Option<&SyntaxTree>,
        rules: &[Arc<TransformationRule>],
        options: &ReportOptions,
    ) -> Vec<ReportEntry> {
        if rules.is_empty() {
            return Vec::new();
        }
        let index = match &self.resolver {
            Some(resolver) => PatternIndex::new(rules.iter().cloned())
                .with_type_resolver(Arc::clone(resolver)),
            None => PatternIndex::new(rules.iter().cloned()),
        };

        let mut entries = Vec::new();
        for (rule, matches) in index.find_all_matches(tree) {
            for found in &matches {
                let mut ctx = GuardContext::new(found, &self.registry);
                if let Some(version) = options.source_version() {
                    ctx = ctx.with_source_version(version);
                }
                if let Some(resolver) = self.resolver.as_deref() {
                    ctx = ctx.with_type_resolver(resolver);
                }
                if !rule.applies(&ctx) {
                    continue;
                }

                let replacement = rule
                    .find_matching_alternative(&ctx)
                    .map(|alternative| instantiate(alternative.replacement(), found));
                entries.push(ReportEntry {
                    line: found.line(),
                    column: found.column(),
                    offset: found.offset(),
                    length: found.length(),
                    matched: found.text().trim().to_owned(),
                    replacement,
                    description: rule.description().map(str::to_owned),
                    severity: options.severity().to_owned(),
                    pattern: rule.source_pattern().value().to_owned(),
                    rule_id: rule.source_pattern().id().map(str::to_owned),
                });
            }
        }
        tracing::debug!(rules = rules.len(), entries = entries.len(), "analysed tree");
        entries
    }
}

/// Renders entries as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if serialisation fails.
pub fn to_json(entries: &[ReportEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

/// Renders entries as CSV with a header row. Fields holding a comma, quote
/// or newline are quoted with inner quotes doubled.
#[must_use]
pub fn to_csv(entries: &[ReportEntry]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for entry in entries {
        push_row(&mut out, None, entry);
    }
    out
}

/// Renders the entries of several files as one CSV table whose first
/// column names the file.
#[must_use]
pub fn to_csv_by_file<S: AsRef<str>>(files: &[(S, Vec<ReportEntry>)]) -> String {
    let mut out = format!("file,{CSV_HEADER}\n");
    for (file, entries) in files {
        for entry in entries {
            push_row(&mut out, Some(file.as_ref()), entry);
        }
    }
    out
}

fn push_row(out: &mut String, file: Option<&str>, entry: &ReportEntry) {
    let fields = [
        entry.line.to_string(),
        entry.offset.to_string(),
        entry.length.to_string(),
        csv_field(&entry.matched),
        entry.replacement.as_deref().map(csv_field).unwrap_or_default(),
        entry.description.as_deref().map(csv_field).unwrap_or_default(),
        csv_field(&entry.severity),
        csv_field(&entry.pattern),
    ];
    if let Some(name) = file {
        out.push_str(&csv_field(name));
        out.push(',');
    }
    out.push_str(&fields.join(","));
    out.push('\n');
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests;
