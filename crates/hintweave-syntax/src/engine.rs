//! Match engine entry points.

use std::fmt;
use std::sync::Arc;

use crate::error::SyntaxError;
use crate::matcher::{Match, Matcher};
use crate::pattern::{CompiledPattern, Pattern};
use crate::resolve::TypeResolver;
use crate::tree::{SyntaxNode, SyntaxTree};

/// Runs patterns against syntax trees, optionally with type resolution.
#[derive(Clone, Default)]
pub struct Engine {
    resolver: Option<Arc<dyn TypeResolver>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("type_resolver", &self.resolver.is_some())
            .finish()
    }
}

impl Engine {
    /// Creates an engine without type resolution. Patterns carrying a
    /// qualified type never match.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine that checks qualified types through `resolver`.
    #[must_use]
    pub fn with_type_resolver(resolver: Arc<dyn TypeResolver>) -> Self {
        Self {
            resolver: Some(resolver),
        }
    }

    /// Returns the configured type resolver.
    #[must_use]
    pub fn type_resolver(&self) -> Option<&dyn TypeResolver> {
        self.resolver.as_deref()
    }

    /// Returns a matcher for `compiled` wired to this engine's resolver.
    #[must_use]
    pub fn matcher<'p>(&'p self, compiled: &'p CompiledPattern) -> Matcher<'p> {
        let matcher = Matcher::new(compiled);
        match self.type_resolver() {
            Some(resolver) => matcher.with_type_resolver(resolver),
            None => matcher,
        }
    }

    /// Compiles `pattern` and finds its matches in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern fails to compile.
    pub fn find_matches<'t>(
        &self,
        tree: &'t SyntaxTree,
        pattern: &Pattern,
    ) -> Result<Vec<Match<'t>>, SyntaxError> {
        let compiled = pattern.compile()?;
        Ok(self.find_matches_compiled(tree, &compiled))
    }

    /// Finds the matches of a precompiled pattern in declaration order.
    #[must_use]
    pub fn find_matches_compiled<'t>(
        &self,
        tree: &'t SyntaxTree,
        compiled: &CompiledPattern,
    ) -> Vec<Match<'t>> {
        let matches = self.matcher(compiled).find_all(tree);
        tracing::debug!(
            pattern = compiled.pattern().value(),
            count = matches.len(),
            "pattern matched"
        );
        matches
    }

    /// Returns every node whose kind is one of `kinds`, in pre-order, as
    /// matches carrying only the implicit bindings.
    #[must_use]
    pub fn find_matches_by_kind<'t>(&self, tree: &'t SyntaxTree, kinds: &[&str]) -> Vec<Match<'t>> {
        let mut matches = Vec::new();
        tree.walk(|node: &'t SyntaxNode, ancestors| {
            if kinds.contains(&node.kind()) {
                matches.push(Match::anchored(tree, node, ancestors));
            }
        });
        matches
    }

    /// Finds method declarations matching `method_pattern` whose body
    /// contains a match of `body_pattern`, or, with `negate`, whose body
    /// contains none.
    ///
    /// # Errors
    ///
    /// Returns an error if either pattern fails to compile.
    pub fn find_matches_with_body_constraint<'t>(
        &self,
        tree: &'t SyntaxTree,
        method_pattern: &Pattern,
        body_pattern: &Pattern,
        negate: bool,
    ) -> Result<Vec<Match<'t>>, SyntaxError> {
        let methods = self.find_matches(tree, method_pattern)?;
        let body_matches = self.find_matches(tree, body_pattern)?;

        Ok(methods
            .into_iter()
            .filter(|method| {
                let contains = method
                    .matched_node()
                    .child_by_field("body")
                    .is_some_and(|body| {
                        let range = body.span().byte_range();
                        body_matches.iter().any(|inner| {
                            range.start <= inner.offset() && inner.byte_range().end <= range.end
                        })
                    });
                contains != negate
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::SupportedLanguage;
    use crate::parser::Parser;
    use crate::pattern::PatternKind;
    use crate::resolve::DeclaredTypeResolver;
    use rstest::{fixture, rstest};

    #[fixture]
    fn tree() -> SyntaxTree {
        let source = r#"
import java.util.Vector;
import java.util.List;

class Sample {
    void fill(Vector<String> items, List<String> names) {
        items.add("a");
        names.add("b");
    }

    void empty() {
    }
}
"#;
        Parser::new(SupportedLanguage::Java)
            .and_then(|mut parser| parser.parse_tree(source))
            .expect("parse")
    }

    #[rstest]
    fn qualified_type_without_resolver_discards_matches(tree: SyntaxTree) {
        let pattern = Pattern::new("$v.add($x)", PatternKind::MethodCall)
            .with_qualified_type("java.util.Vector");
        let matches = Engine::new().find_matches(&tree, &pattern).expect("matches");
        assert!(matches.is_empty());
    }

    #[rstest]
    fn qualified_type_filters_by_resolved_receiver(tree: SyntaxTree) {
        let engine = Engine::with_type_resolver(Arc::new(DeclaredTypeResolver::new()));
        let pattern = Pattern::new("$v.add($x)", PatternKind::MethodCall)
            .with_qualified_type("java.util.Vector");
        let matches = engine.find_matches(&tree, &pattern).expect("matches");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches.first().map(Match::text), Some("items.add(\"a\")"));
    }

    #[rstest]
    fn by_kind_reports_nodes_in_order(tree: SyntaxTree) {
        let matches = Engine::new().find_matches_by_kind(&tree, &["method_declaration"]);
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|found| found.binding("$this").is_some()));
    }

    #[rstest]
    #[case(false, 1)]
    #[case(true, 1)]
    fn body_constraint_selects_methods(tree: SyntaxTree, #[case] negate: bool, #[case] count: usize) {
        let method = Pattern::new("void $name($params$)", PatternKind::MethodDeclaration);
        let body = Pattern::new("$list.add($x)", PatternKind::MethodCall);
        let matches = Engine::new()
            .find_matches_with_body_constraint(&tree, &method, &body, negate)
            .expect("matches");
        assert_eq!(matches.len(), count);
    }

    #[rstest]
    fn invalid_pattern_is_an_error(tree: SyntaxTree) {
        let pattern = Pattern::new("$x +", PatternKind::Expression);
        assert!(Engine::new().find_matches(&tree, &pattern).is_err());
    }
}
