//! Rules grouped by pattern kind for batch matching.
//!
//! A [`PatternIndex`] walks a tree once per represented kind rather than
//! once per rule. Every rule sharing that kind is tried at each candidate
//! node during the same walk, so matches come out in pre-order.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use hintweave_syntax::{Match, Matcher, PatternKind, SyntaxTree, TypeResolver};

use crate::rule::TransformationRule;

/// A rule together with its position in the index.
#[derive(Debug, Clone)]
struct IndexedRule {
    order: usize,
    rule: Arc<TransformationRule>,
}

/// An immutable grouping of rules by the kind their pattern targets.
#[derive(Clone, Default)]
pub struct PatternIndex {
    by_kind: BTreeMap<PatternKind, Vec<IndexedRule>>,
    size: usize,
    resolver: Option<Arc<dyn TypeResolver>>,
}

impl fmt::Debug for PatternIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternIndex")
            .field("kinds", &self.by_kind.keys().collect::<Vec<_>>())
            .field("size", &self.size)
            .field("type_resolver", &self.resolver.is_some())
            .finish()
    }
}

impl PatternIndex {
    /// Groups `rules` by pattern kind, keeping their order within each kind.
    #[must_use]
    pub fn new(rules: impl IntoIterator<Item = Arc<TransformationRule>>) -> Self {
        let mut by_kind: BTreeMap<PatternKind, Vec<IndexedRule>> = BTreeMap::new();
        let mut size = 0_usize;
        for rule in rules {
            by_kind.entry(rule.kind()).or_default().push(IndexedRule { order: size, rule });
            size = size.saturating_add(1);
        }
        Self {
            by_kind,
            size,
            resolver: None,
        }
    }

    /// Checks qualified-type patterns through `resolver`.
    #[must_use]
    pub fn with_type_resolver(mut self, resolver: Arc<dyn TypeResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Returns the number of indexed rules.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of distinct kinds among the indexed rules.
    #[must_use]
    pub fn kind_count(&self) -> usize {
        self.by_kind.len()
    }

    /// Returns the rules targeting `kind` in insertion order.
    #[must_use]
    pub fn rules_for_kind(&self, kind: PatternKind) -> Vec<Arc<TransformationRule>> {
        self.by_kind
            .get(&kind)
            .map(|entries| entries.iter().map(|entry| Arc::clone(&entry.rule)).collect())
            .unwrap_or_default()
    }

    /// Matches every indexed rule against `tree`.
    ///
    /// Rules without matches are left out. An absent tree yields no
    /// matches.
    #[must_use]
    pub fn find_all_matches<'t>(&self, tree: Option<&'t SyntaxTree>) -> RuleMatches<'t> {
        let Some(parsed) = tree else {
            return RuleMatches::default();
        };

        let mut found: Vec<(usize, Arc<TransformationRule>, Vec<Match<'t>>)> = Vec::new();
        for (kind, entries) in &self.by_kind {
            let mut buckets: Vec<(&IndexedRule, Matcher<'_>, Vec<Match<'t>>)> = entries
                .iter()
                .map(|entry| (entry, self.matcher(&entry.rule), Vec::new()))
                .collect();

            parsed.walk(|node, ancestors| {
                if !kind.accepts(node.kind()) {
                    return;
                }
                for (_, matcher, matches) in &mut buckets {
                    matches.extend(matcher.matches_at(parsed, node, ancestors));
                }
            });

            tracing::trace!(kind = %kind, rules = entries.len(), "walked tree for kind");
            found.extend(
                buckets
                    .into_iter()
                    .filter(|(_, _, matches)| !matches.is_empty())
                    .map(|(entry, _, matches)| (entry.order, Arc::clone(&entry.rule), matches)),
            );
        }

        found.sort_by_key(|(order, _, _)| *order);
        RuleMatches {
            entries: found
                .into_iter()
                .map(|(_, rule, matches)| (rule, matches))
                .collect(),
        }
    }

    fn matcher<'p>(&'p self, rule: &'p TransformationRule) -> Matcher<'p> {
        let matcher = Matcher::new(rule.compiled());
        match self.resolver.as_deref() {
            Some(resolver) => matcher.with_type_resolver(resolver),
            None => matcher,
        }
    }
}

/// Matches grouped by rule, in rule insertion order.
#[derive(Debug, Clone, Default)]
pub struct RuleMatches<'t> {
    entries: Vec<(Arc<TransformationRule>, Vec<Match<'t>>)>,
}

impl<'t> RuleMatches<'t> {
    /// Returns the number of rules with at least one match.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no rule matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the matches of `rule`, compared by identity.
    #[must_use]
    pub fn get(&self, rule: &Arc<TransformationRule>) -> Option<&[Match<'t>]> {
        self.entries
            .iter()
            .find(|(candidate, _)| Arc::ptr_eq(candidate, rule))
            .map(|(_, matches)| matches.as_slice())
    }

    /// Iterates over rules and their matches.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<TransformationRule>, &[Match<'t>])> {
        self.entries
            .iter()
            .map(|(rule, matches)| (rule, matches.as_slice()))
    }

    /// Returns the total number of matches over all rules.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.entries.iter().map(|(_, matches)| matches.len()).sum()
    }
}

impl<'t> IntoIterator for RuleMatches<'t> {
    type Item = (Arc<TransformationRule>, Vec<Match<'t>>);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
