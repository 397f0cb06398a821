//! Matching context shared across recursive operations.

use crate::kinds::{
    camel_to_snake, is_expression_kind, is_literal_kind, is_numeric_literal_kind,
    is_statement_kind,
};
use crate::pattern::{Slot, Template};
use crate::tree::SyntaxNode;

pub(super) struct MatchContext<'p> {
    template: &'p Template,
}

impl<'p> MatchContext<'p> {
    pub(super) const fn new(template: &'p Template) -> Self {
        Self { template }
    }

    pub(super) const fn root(&self) -> &'p SyntaxNode {
        self.template.root()
    }

    /// Checks the slot's statement requirement and its declared constraint.
    pub(super) fn admits(&self, slot: Slot<'_>, candidate: &SyntaxNode) -> bool {
        if slot.is_statement && !is_statement_kind(candidate.kind()) {
            return false;
        }

        self.template
            .placeholders()
            .iter()
            .find(|info| info.name() == slot.token.name && info.is_multi() == slot.token.is_multi)
            .and_then(|info| info.type_constraint())
            .is_none_or(|constraint| satisfies_constraint(constraint, candidate.kind()))
    }
}

/// Returns whether a node of `kind` satisfies a `$x:Type` constraint.
#[must_use]
pub fn satisfies_constraint(constraint: &str, kind: &str) -> bool {
    match constraint {
        "StringLiteral" => matches!(kind, "string_literal" | "text_block"),
        "NumberLiteral" => is_numeric_literal_kind(kind),
        "CharacterLiteral" => kind == "character_literal",
        "BooleanLiteral" => matches!(kind, "true" | "false"),
        "NullLiteral" => kind == "null_literal",
        "Literal" => is_literal_kind(kind),
        "SimpleName" | "Identifier" => kind == "identifier",
        "Name" => matches!(kind, "identifier" | "scoped_identifier" | "field_access"),
        "MethodInvocation" => kind == "method_invocation",
        "ClassInstanceCreation" => kind == "object_creation_expression",
        "Expression" => is_expression_kind(kind),
        "Statement" => is_statement_kind(kind),
        other => kind == camel_to_snake(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("StringLiteral", "string_literal", true)]
    #[case("StringLiteral", "identifier", false)]
    #[case("NumberLiteral", "hex_integer_literal", true)]
    #[case("SimpleName", "identifier", true)]
    #[case("Name", "field_access", true)]
    #[case("Expression", "binary_expression", true)]
    #[case("Statement", "if_statement", true)]
    #[case("LambdaExpression", "lambda_expression", true)]
    #[case("LambdaExpression", "method_reference", false)]
    fn constraints_map_to_node_kinds(
        #[case] constraint: &str,
        #[case] kind: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(satisfies_constraint(constraint, kind), expected);
    }
}
