//! Java node-kind vocabulary.
//!
//! The matcher itself is kind-agnostic; these tables classify the
//! `tree-sitter-java` node kinds into the categories that pattern anchoring,
//! placeholder constraints and guard built-ins reason about.

/// Node kinds that represent expressions.
const EXPRESSION_KINDS: &[&str] = &[
    "array_access",
    "array_creation_expression",
    "assignment_expression",
    "binary_expression",
    "binary_integer_literal",
    "cast_expression",
    "character_literal",
    "class_literal",
    "decimal_floating_point_literal",
    "decimal_integer_literal",
    "false",
    "field_access",
    "hex_floating_point_literal",
    "hex_integer_literal",
    "identifier",
    "instanceof_expression",
    "lambda_expression",
    "method_invocation",
    "method_reference",
    "null_literal",
    "object_creation_expression",
    "octal_integer_literal",
    "parenthesized_expression",
    "string_literal",
    "switch_expression",
    "ternary_expression",
    "text_block",
    "this",
    "true",
    "unary_expression",
    "update_expression",
];

/// Statement kinds that do not follow the `*_statement` naming scheme.
const IRREGULAR_STATEMENT_KINDS: &[&str] = &[
    "block",
    "explicit_constructor_invocation",
    "local_variable_declaration",
];

const NUMERIC_LITERAL_KINDS: &[&str] = &[
    "binary_integer_literal",
    "decimal_floating_point_literal",
    "decimal_integer_literal",
    "hex_floating_point_literal",
    "hex_integer_literal",
    "octal_integer_literal",
];

/// Declarations that `$this` may bind to.
const TYPE_DECLARATION_KINDS: &[&str] = &[
    "annotation_type_declaration",
    "class_declaration",
    "enum_declaration",
    "interface_declaration",
    "record_declaration",
];

/// Child lists in which a multi-placeholder may appear.
const LIST_KINDS: &[&str] = &[
    "annotation_argument_list",
    "argument_list",
    "array_initializer",
    "block",
    "class_body",
    "constructor_body",
    "formal_parameters",
    "program",
    "switch_block_statement_group",
    "type_arguments",
];

/// Returns whether `kind` is an expression node kind.
#[must_use]
pub fn is_expression_kind(kind: &str) -> bool {
    EXPRESSION_KINDS.contains(&kind)
}

/// Returns whether `kind` is a statement node kind.
#[must_use]
pub fn is_statement_kind(kind: &str) -> bool {
    kind.ends_with("_statement") || IRREGULAR_STATEMENT_KINDS.contains(&kind)
}

/// Returns whether `kind` is a numeric literal.
#[must_use]
pub fn is_numeric_literal_kind(kind: &str) -> bool {
    NUMERIC_LITERAL_KINDS.contains(&kind)
}

/// Returns whether `kind` is any literal.
#[must_use]
pub fn is_literal_kind(kind: &str) -> bool {
    is_numeric_literal_kind(kind)
        || matches!(
            kind,
            "string_literal" | "text_block" | "character_literal" | "true" | "false" | "null_literal"
        )
}

/// Returns whether `kind` declares a type.
#[must_use]
pub fn is_type_declaration_kind(kind: &str) -> bool {
    TYPE_DECLARATION_KINDS.contains(&kind)
}

/// Returns whether children of `kind` form a variadic list.
#[must_use]
pub fn is_list_kind(kind: &str) -> bool {
    LIST_KINDS.contains(&kind)
}

/// Returns whether `kind` is a leaf that can spell a placeholder.
#[must_use]
pub fn is_placeholder_carrier(kind: &str) -> bool {
    matches!(kind, "identifier" | "type_identifier")
}

/// Returns whether an anonymous token is structural punctuation.
///
/// Punctuation carries no meaning once the tree exists, so it is dropped
/// when lowering; keywords and operators are kept as leaves.
#[must_use]
pub(crate) fn is_punctuation(kind: &str) -> bool {
    matches!(kind, "(" | ")" | "{" | "}" | "[" | "]" | "," | ";")
}

/// Converts a `CamelCase` constraint name to the `snake_case` node-kind
/// convention used by the grammar.
#[must_use]
pub(crate) fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len().saturating_add(4));
    for (index, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if index > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
