//! Parsed `.hint` rule files.

use std::sync::Arc;

use crate::rule::TransformationRule;

/// Severity used when a file does not declare one.
pub const DEFAULT_SEVERITY: &str = "info";

/// A rule file: metadata plus its rules in file order.
#[derive(Debug, Clone)]
pub struct HintFile {
    id: Option<String>,
    description: Option<String>,
    severity: String,
    min_language_version: Option<u32>,
    tags: Vec<String>,
    includes: Vec<String>,
    rules: Vec<Arc<TransformationRule>>,
}

impl Default for HintFile {
    fn default() -> Self {
        Self {
            id: None,
            description: None,
            severity: DEFAULT_SEVERITY.to_owned(),
            min_language_version: None,
            tags: Vec::new(),
            includes: Vec::new(),
            rules: Vec::new(),
        }
    }
}

impl HintFile {
    /// Creates an empty file with the default severity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the declared id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_id(id);
        self
    }

    /// Returns the declared id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Replaces the declared id.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Replaces the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Returns the severity, `"info"` unless declared.
    #[must_use]
    pub fn severity(&self) -> &str {
        &self.severity
    }

    /// Replaces the severity.
    pub fn set_severity(&mut self, severity: impl Into<String>) {
        self.severity = severity.into();
    }

    /// Returns the minimum source-language version the rules target.
    #[must_use]
    pub const fn min_language_version(&self) -> Option<u32> {
        self.min_language_version
    }

    /// Replaces the minimum source-language version.
    pub const fn set_min_language_version(&mut self, version: u32) {
        self.min_language_version = Some(version);
    }

    /// Returns the tags in declaration order.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Replaces the tags.
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    /// Returns the ids of included files in declaration order.
    #[must_use]
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Appends an included file id.
    pub fn add_include(&mut self, id: impl Into<String>) {
        self.includes.push(id.into());
    }

    /// Returns the rules in file order.
    #[must_use]
    pub fn rules(&self) -> &[Arc<TransformationRule>] {
        &self.rules
    }

    /// Appends a rule.
    pub fn add_rule(&mut self, rule: TransformationRule) {
        self.rules.push(Arc::new(rule));
    }
}
