//! Transformation rules and their rewrite alternatives.
//!
//! A [`TransformationRule`] pairs a compiled source pattern with an ordered
//! list of [`RewriteAlternative`]s. The first alternative whose condition
//! holds wins; a rule with no alternatives only reports matches.

use hintweave_syntax::{CompiledPattern, Pattern, PatternKind};

use crate::guard::{GuardContext, GuardExpression};
use crate::imports::ImportDirective;

/// One candidate rewrite of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteAlternative {
    replacement: String,
    condition: Option<GuardExpression>,
}

impl RewriteAlternative {
    /// Creates an alternative that applies when `condition` holds.
    #[must_use]
    pub fn when(replacement: impl Into<String>, condition: GuardExpression) -> Self {
        Self {
            replacement: replacement.into(),
            condition: Some(condition),
        }
    }

    /// Creates an unconditional alternative.
    #[must_use]
    pub fn otherwise(replacement: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
            condition: None,
        }
    }

    /// Returns the replacement text.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Returns the guard, or `None` for an unconditional alternative.
    #[must_use]
    pub const fn condition(&self) -> Option<&GuardExpression> {
        self.condition.as_ref()
    }

    /// Returns `true` for an unconditional alternative.
    #[must_use]
    pub const fn is_unconditional(&self) -> bool {
        self.condition.is_none()
    }

    /// Returns whether the alternative applies in `ctx`.
    #[must_use]
    pub fn applies(&self, ctx: &GuardContext<'_, '_>) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|condition| condition.evaluate(ctx))
    }
}

/// A source pattern with an optional gate and its rewrite alternatives.
///
/// Rules are immutable once built and are shared behind `Arc`; two rules
/// are the same rule only when they are the same allocation.
#[derive(Debug, Clone)]
pub struct TransformationRule {
    description: Option<String>,
    pattern: CompiledPattern,
    source_guard: Option<GuardExpression>,
    alternatives: Vec<RewriteAlternative>,
    imports: Option<ImportDirective>,
}

impl TransformationRule {
    /// Creates a hint-only rule for a compiled pattern.
    #[must_use]
    pub const fn new(pattern: CompiledPattern) -> Self {
        Self {
            description: None,
            pattern,
            source_guard: None,
            alternatives: Vec::new(),
            imports: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the guard that decides whether the rule applies at all.
    #[must_use]
    pub fn with_source_guard(mut self, guard: GuardExpression) -> Self {
        self.source_guard = Some(guard);
        self
    }

    /// Appends an alternative.
    #[must_use]
    pub fn with_alternative(mut self, alternative: RewriteAlternative) -> Self {
        self.alternatives.push(alternative);
        self
    }

    /// Sets the import changes. An empty directive is dropped.
    #[must_use]
    pub fn with_imports(mut self, imports: ImportDirective) -> Self {
        self.imports = (!imports.is_empty()).then_some(imports);
        self
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the source pattern.
    #[must_use]
    pub const fn source_pattern(&self) -> &Pattern {
        self.pattern.pattern()
    }

    /// Returns the compiled source pattern.
    #[must_use]
    pub const fn compiled(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Returns the kind the source pattern is anchored to.
    #[must_use]
    pub const fn kind(&self) -> PatternKind {
        self.pattern.kind()
    }

    /// Returns the gate guard.
    #[must_use]
    pub const fn source_guard(&self) -> Option<&GuardExpression> {
        self.source_guard.as_ref()
    }

    /// Returns the alternatives in declaration order.
    #[must_use]
    pub fn alternatives(&self) -> &[RewriteAlternative] {
        &self.alternatives
    }

    /// Returns the import changes.
    #[must_use]
    pub const fn imports(&self) -> Option<&ImportDirective> {
        self.imports.as_ref()
    }

    /// Returns `true` when the rule reports matches without rewriting.
    #[must_use]
    pub fn is_hint_only(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Returns whether the gate guard, if any, holds in `ctx`.
    #[must_use]
    pub fn applies(&self, ctx: &GuardContext<'_, '_>) -> bool {
        self.source_guard
            .as_ref()
            .is_none_or(|guard| guard.evaluate(ctx))
    }

    /// Returns the first alternative, in declaration order, that is
    /// unconditional or whose guard holds in `ctx`.
    #[must_use]
    pub fn find_matching_alternative(&self, ctx: &GuardContext<'_, '_>) -> Option<&RewriteAlternative> {
        self.alternatives
            .iter()
            .find(|alternative| alternative.applies(ctx))
    }
}
