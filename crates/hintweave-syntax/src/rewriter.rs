//! Replacement instantiation and text edits.
//!
//! A replacement is free text in which placeholder tokens stand for the
//! source text their bindings matched. Instantiated replacements become
//! [`TextEdit`]s that [`Rewriter`] applies to the original source.

use std::ops::Range;

use crate::error::SyntaxError;
use crate::matcher::Match;
use crate::pattern::{CompiledPattern, Template};
use crate::placeholder::{
    ENCLOSING_DECLARATION, WHOLE_MATCH, placeholder_key, referenced_keys, substitute,
};
use crate::tree::SyntaxTree;

/// Instantiates `replacement` for a match.
///
/// Every bound placeholder is replaced by its source text; multi bindings
/// are joined with `", "`. Tokens without a binding are left as written.
#[must_use]
pub fn instantiate(replacement: &str, found: &Match<'_>) -> String {
    substitute(replacement, |token| {
        found.binding_text(&placeholder_key(token.name, token.is_multi))
    })
}

/// Checks that `replacement` only references placeholders the template
/// binds.
///
/// # Errors
///
/// Returns [`SyntaxError::InvalidReplacement`] naming the first unknown
/// placeholder.
pub fn validate_replacement(replacement: &str, template: &Template) -> Result<(), SyntaxError> {
    for key in referenced_keys(replacement) {
        let implicit = key == WHOLE_MATCH || key == ENCLOSING_DECLARATION;
        if !implicit && template.placeholder(&key).is_none() {
            return Err(SyntaxError::invalid_replacement(format!(
                "replacement references undefined placeholder: {key}"
            )));
        }
    }
    Ok(())
}

/// Replacement of a byte range of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    range: Range<usize>,
    replacement: String,
}

impl TextEdit {
    /// Creates an edit.
    #[must_use]
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Creates an edit that replaces a match with an instantiated
    /// replacement.
    #[must_use]
    pub fn for_match(found: &Match<'_>, replacement: &str) -> Self {
        Self::new(found.byte_range(), instantiate(replacement, found))
    }

    /// Returns the replaced byte range.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Returns the replacement text.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

/// A pattern paired with a validated replacement.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pattern: CompiledPattern,
    replacement: String,
}

impl RewriteRule {
    /// Creates a rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the replacement references placeholders the
    /// pattern does not bind.
    pub fn new(pattern: CompiledPattern, replacement: impl Into<String>) -> Result<Self, SyntaxError> {
        let text = replacement.into();
        validate_replacement(&text, pattern.template())?;
        Ok(Self {
            pattern,
            replacement: text,
        })
    }

    /// Returns the pattern.
    #[must_use]
    pub const fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Returns the replacement text.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

/// Applies text edits to source code.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rewriter;

impl Rewriter {
    /// Creates a rewriter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Rewrites every match of `rule` in `tree`.
    ///
    /// # Errors
    ///
    /// Returns an error if a match range does not fall on character
    /// boundaries.
    pub fn rewrite(&self, tree: &SyntaxTree, rule: &RewriteRule) -> Result<RewriteResult, SyntaxError> {
        let edits = rule
            .pattern
            .find_all(tree)
            .iter()
            .map(|found| TextEdit::for_match(found, &rule.replacement))
            .collect();
        self.apply(tree.source(), edits)
    }

    /// Applies `edits` to `source`.
    ///
    /// Edits are taken in source order; one that overlaps an edit already
    /// taken is dropped and counted in [`RewriteResult::skipped`].
    ///
    /// # Errors
    ///
    /// Returns an error if an edit range is out of bounds or does not fall
    /// on character boundaries.
    pub fn apply(&self, source: &str, mut edits: Vec<TextEdit>) -> Result<RewriteResult, SyntaxError> {
        edits.sort_by_key(|edit| (edit.range.start, edit.range.end));

        let mut accepted: Vec<TextEdit> = Vec::with_capacity(edits.len());
        let mut skipped = 0_usize;
        for edit in edits {
            let overlaps = accepted
                .last()
                .is_some_and(|previous| edit.range.start < previous.range.end);
            if overlaps {
                skipped = skipped.saturating_add(1);
            } else {
                accepted.push(edit);
            }
        }

        let mut output = source.to_owned();
        for edit in accepted.iter().rev() {
            let range = edit.range();
            if range.end > output.len() {
                return Err(SyntaxError::internal_error(
                    "rewrite range extends past the end of the source",
                ));
            }
            if !output.is_char_boundary(range.start) || !output.is_char_boundary(range.end) {
                return Err(SyntaxError::internal_error(
                    "rewrite range is not on a UTF-8 boundary",
                ));
            }
            output.replace_range(range, &edit.replacement);
        }

        Ok(RewriteResult {
            output,
            num_replacements: accepted.len(),
            skipped,
        })
    }
}

/// Result of a rewrite operation.
#[derive(Debug, Clone)]
pub struct RewriteResult {
    output: String,
    num_replacements: usize,
    skipped: usize,
}

impl RewriteResult {
    /// Returns the transformed source code.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Returns the number of edits applied.
    #[must_use]
    pub const fn num_replacements(&self) -> usize {
        self.num_replacements
    }

    /// Returns the number of overlapping edits that were dropped.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns whether any edit was applied.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.num_replacements > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::SupportedLanguage;
    use crate::parser::Parser;
    use crate::pattern::{Pattern, PatternKind};

    fn tree(source: &str) -> SyntaxTree {
        Parser::new(SupportedLanguage::Java)
            .and_then(|mut parser| parser.parse_tree(source))
            .expect("parse")
    }

    fn compiled(text: &str, kind: PatternKind) -> CompiledPattern {
        Pattern::new(text, kind).compile().expect("compile")
    }

    #[test]
    fn instantiate_substitutes_single_and_multi_bindings() {
        let tree = tree("class A { void m() { log.info(a, b, c); } }");
        let pattern = compiled("$log.info($args$)", PatternKind::MethodCall);
        let found = pattern.find_first(&tree).expect("match");
        assert_eq!(
            instantiate("$log.debug($args$)", &found),
            "log.debug(a, b, c)"
        );
    }

    #[test]
    fn instantiate_keeps_unbound_tokens() {
        let tree = tree("class A { void m() { x = s.length(); } }");
        let pattern = compiled("$s.length()", PatternKind::MethodCall);
        let found = pattern.find_first(&tree).expect("match");
        assert_eq!(instantiate("$s.size() + $other", &found), "s.size() + $other");
        assert_eq!(instantiate("wrap($_)", &found), "wrap(s.length())");
    }

    #[test]
    fn rewrite_rule_rejects_unknown_placeholders() {
        let pattern = compiled("$a + $b", PatternKind::Expression);
        assert!(RewriteRule::new(pattern.clone(), "$a - $b").is_ok());
        let error = RewriteRule::new(pattern, "$a - $c").expect_err("unknown placeholder");
        assert!(error.to_string().contains("$c"), "{error}");
    }

    #[test]
    fn rewrite_replaces_every_match() {
        let source = "class A { void m() { int x = 1 + 0; int y = 2 + 0; } }";
        let rule = RewriteRule::new(compiled("$x + 0", PatternKind::Expression), "$x")
            .expect("rule");
        let result = Rewriter::new().rewrite(&tree(source), &rule).expect("rewrite");
        assert_eq!(result.num_replacements(), 2);
        assert_eq!(result.output(), "class A { void m() { int x = 1; int y = 2; } }");
    }

    #[test]
    fn overlapping_later_edits_are_dropped() {
        let edits = vec![
            TextEdit::new(4..9, "B"),
            TextEdit::new(0..5, "A"),
            TextEdit::new(10..11, "C"),
        ];
        let result = Rewriter::new().apply("0123456789ab", edits).expect("apply");
        assert_eq!(result.output(), "A56789Cb");
        assert_eq!(result.num_replacements(), 2);
        assert_eq!(result.skipped(), 1);
    }

    #[test]
    fn out_of_bounds_edit_is_an_error() {
        let result = Rewriter::new().apply("abc", vec![TextEdit::new(1..10, "x")]);
        assert!(result.is_err());
    }
}
