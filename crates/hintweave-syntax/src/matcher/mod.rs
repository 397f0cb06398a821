//! Structural matcher for compiled templates.
//!
//! The matcher walks an owned [`SyntaxTree`] in pre-order and tries the
//! template at every node its [`PatternKind`] accepts. Successful matches
//! carry the placeholder bindings plus the implicit `$_` (whole match) and
//! `$this` (innermost enclosing type declaration) entries.

mod capture;
mod context;
mod list;
mod matching;

use std::ops::Range;

use crate::pattern::{CompiledPattern, PatternKind, Template};
use crate::resolve::{TypeResolver, type_matches, type_subject};
use crate::tree::{Span, SyntaxNode, SyntaxTree};

pub use capture::{Binding, Bindings};
pub use list::{ListShape, ListSplit, split_list};

use capture::Captures;
use context::MatchContext;

pub use context::satisfies_constraint;

/// A successful match of a template against a tree.
#[derive(Debug, Clone)]
pub struct Match<'t> {
    tree: &'t SyntaxTree,
    node: &'t SyntaxNode,
    bindings: Bindings<'t>,
    span: Span,
}

impl<'t> Match<'t> {
    /// Creates a match anchored at `node` carrying only the implicit
    /// bindings.
    pub(crate) fn anchored(
        tree: &'t SyntaxTree,
        node: &'t SyntaxNode,
        ancestors: &[&'t SyntaxNode],
    ) -> Self {
        matching::finish(tree, node, ancestors, Captures::default(), node.span())
    }

    /// Returns the node the match is anchored to. For statement sequences
    /// this is the first statement of the window.
    #[must_use]
    pub const fn matched_node(&self) -> &'t SyntaxNode {
        self.node
    }

    /// Returns the tree the match was found in.
    #[must_use]
    pub const fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    /// Returns every binding, implicit ones included.
    #[must_use]
    pub const fn bindings(&self) -> &Bindings<'t> {
        &self.bindings
    }

    /// Looks up a binding by key (`$x`, `$xs$`, `$_`, `$this`).
    #[must_use]
    pub fn binding(&self, key: &str) -> Option<&Binding<'t>> {
        self.bindings.get(key)
    }

    /// Returns the source text of a binding. Multi bindings are joined with
    /// `", "`.
    #[must_use]
    pub fn binding_text(&self, key: &str) -> Option<String> {
        let binding = self.binding(key)?;
        Some(
            binding
                .nodes()
                .into_iter()
                .map(|node| self.tree.text_of(node))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// Returns the source span of the match.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns the byte offset of the match.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.span.start_byte
    }

    /// Returns the length of the match in bytes.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.span.len()
    }

    /// Returns the byte range of the match.
    #[must_use]
    pub const fn byte_range(&self) -> Range<usize> {
        self.span.byte_range()
    }

    /// Returns the matched source text.
    #[must_use]
    pub fn text(&self) -> &'t str {
        self.tree.slice(self.byte_range())
    }

    /// Returns the one-based line the match starts on.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.span.start_line
    }

    /// Returns the one-based column the match starts at.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.span.start_column
    }
}

/// Finds occurrences of a compiled pattern in syntax trees.
pub struct Matcher<'p> {
    compiled: &'p CompiledPattern,
    resolver: Option<&'p dyn TypeResolver>,
}

impl<'p> Matcher<'p> {
    /// Creates a matcher without type resolution.
    #[must_use]
    pub const fn new(compiled: &'p CompiledPattern) -> Self {
        Self {
            compiled,
            resolver: None,
        }
    }

    /// Uses `resolver` for the pattern's qualified-type check.
    #[must_use]
    pub const fn with_type_resolver(mut self, resolver: &'p dyn TypeResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Finds all matches in pre-order.
    #[must_use]
    pub fn find_all<'t>(&self, tree: &'t SyntaxTree) -> Vec<Match<'t>> {
        let mut matches = Vec::new();
        tree.walk(|node, ancestors| matches.extend(self.matches_at(tree, node, ancestors)));
        matches
    }

    /// Finds the first match in pre-order.
    #[must_use]
    pub fn find_first<'t>(&self, tree: &'t SyntaxTree) -> Option<Match<'t>> {
        self.find_all(tree).into_iter().next()
    }

    /// Tries the pattern at a single node whose ancestors, outermost first,
    /// are `ancestors`.
    ///
    /// Returns at most one match, except for statement sequences which
    /// report one match per matching window inside a block.
    #[must_use]
    pub fn matches_at<'t>(
        &self,
        tree: &'t SyntaxTree,
        node: &'t SyntaxNode,
        ancestors: &[&'t SyntaxNode],
    ) -> Vec<Match<'t>> {
        let kind = self.compiled.kind();
        if !kind.accepts(node.kind()) {
            return Vec::new();
        }

        let ctx = MatchContext::new(self.compiled.template());
        let found = if kind == PatternKind::StatementSequence {
            matching::match_windows(&ctx, tree, node, ancestors)
        } else {
            matching::match_whole(&ctx, tree, node, ancestors)
                .into_iter()
                .collect()
        };

        found
            .into_iter()
            .filter(|candidate| self.passes_type_check(candidate))
            .collect()
    }

    fn passes_type_check(&self, candidate: &Match<'_>) -> bool {
        let Some(expected) = self.compiled.pattern().qualified_type() else {
            return true;
        };
        let Some(resolver) = self.resolver else {
            return false;
        };
        let subject = type_subject(candidate.matched_node());
        resolver
            .resolve(candidate.tree(), subject)
            .is_some_and(|resolved| type_matches(&resolved, expected))
    }
}

impl CompiledPattern {
    /// Finds all matches of this pattern without type resolution.
    #[must_use]
    pub fn find_all<'t>(&self, tree: &'t SyntaxTree) -> Vec<Match<'t>> {
        Matcher::new(self).find_all(tree)
    }

    /// Finds the first match of this pattern without type resolution.
    #[must_use]
    pub fn find_first<'t>(&self, tree: &'t SyntaxTree) -> Option<Match<'t>> {
        Matcher::new(self).find_first(tree)
    }
}

impl Template {
    /// Matches the template root against a single candidate node.
    ///
    /// Returns the explicit placeholder bindings on success; implicit
    /// bindings are only added by the tree-level matcher.
    #[must_use]
    pub fn match_node<'t>(&self, candidate: &'t SyntaxNode) -> Option<Bindings<'t>> {
        let ctx = MatchContext::new(self);
        let mut captures = Captures::default();
        matching::nodes_match(self.root(), candidate, &ctx, &mut captures)
            .then(|| captures.into_inner())
    }
}
