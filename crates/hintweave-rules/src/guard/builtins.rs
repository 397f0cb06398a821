//! Built-in guard functions.
//!
//! Guards read placeholders from their first argument. A placeholder that
//! is not bound makes a positive guard false.

use hintweave_syntax::{SyntaxNode, SyntaxTree, is_type_declaration_kind, type_matches};

use super::{GuardArg, GuardContext, GuardRegistry};

pub(super) fn install(registry: &mut GuardRegistry) {
    registry.register("instanceof", instance_of);
    registry.register("matchesAny", matches_any);
    registry.register("matchesNone", matches_none);
    registry.register("hasNoSideEffect", has_no_side_effect);
    registry.register("referencedIn", referenced_in);
    registry.register("sourceVersionGE", source_version_ge);
    registry.register("sourceVersionLE", source_version_le);
    registry.register("sourceVersionBetween", source_version_between);
    registry.register("isStatic", |ctx, args| has_modifier(ctx, args, "static"));
    registry.register("isFinal", |ctx, args| has_modifier(ctx, args, "final"));
    registry.register("hasAnnotation", has_annotation);
    registry.register("isDeprecated", is_deprecated);
    registry.register("elementKindMatches", element_kind_matches);
    registry.register("contains", contains);
    registry.register("notContains", |ctx, args| !contains(ctx, args));
}

const SIDE_EFFECT_KINDS: &[&str] = &[
    "method_invocation",
    "assignment_expression",
    "update_expression",
];

const VARIABLE_DECLARATION_KINDS: &[&str] = &[
    "field_declaration",
    "local_variable_declaration",
    "formal_parameter",
    "spread_parameter",
    "catch_formal_parameter",
    "resource",
    "enhanced_for_statement",
];

const BODY_DECLARATION_KINDS: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "field_declaration",
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

fn bound<'t>(ctx: &GuardContext<'_, 't>, arg: Option<&GuardArg>) -> Option<&'t SyntaxNode> {
    ctx.node(arg?.as_placeholder()?)
}

/// `instanceof($x, Type)`: the static type of `$x` is `Type`, compared by
/// qualified name, or by simple name when either side is unqualified.
fn instance_of(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    let (Some(node), Some(expected)) = (bound(ctx, args.first()), args.get(1)) else {
        return false;
    };
    ctx.resolve_type(node)
        .is_some_and(|resolved| type_names_match(&resolved, expected.text()))
}

fn type_names_match(resolved: &str, expected: &str) -> bool {
    if type_matches(resolved, expected) {
        return true;
    }
    let either_simple = !is_qualified(resolved) || !is_qualified(expected);
    either_simple && type_matches(&simple_type_name(resolved), &simple_type_name(expected))
}

fn is_qualified(name: &str) -> bool {
    name.split('<').next().is_some_and(|base| base.contains('.'))
}

fn simple_type_name(name: &str) -> String {
    let base_end = name.find('<').unwrap_or(name.len());
    let (base, rest) = name.split_at(base_end);
    let simple = base.rsplit('.').next().unwrap_or(base);
    format!("{simple}{rest}")
}

/// `matchesAny($x)`: `$x` is bound, to a non-empty list for multi
/// placeholders. With literals, the bound code equals one of them.
fn matches_any(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    let Some(key) = args.first().and_then(GuardArg::as_placeholder) else {
        return false;
    };
    let nodes = ctx.nodes(key);
    let Some(literals) = args.get(1..).filter(|rest| !rest.is_empty()) else {
        return !nodes.is_empty();
    };
    nodes.iter().any(|node| {
        let value = literal_value(ctx.tree(), node);
        literals.iter().any(|literal| literal.text() == value)
    })
}

/// `matchesNone($x, ...)`: the negation of `matchesAny`. Holds when nothing
/// is bound.
fn matches_none(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    args.is_empty() || !matches_any(ctx, args)
}

/// The source text of a node, with string literals reduced to their
/// content.
fn literal_value<'t>(tree: &'t SyntaxTree, node: &SyntaxNode) -> &'t str {
    let text = tree.text_of(node).trim();
    if node.kind() == "string_literal" {
        text.strip_prefix('"')
            .and_then(|inner| inner.strip_suffix('"'))
            .unwrap_or(text)
    } else {
        text
    }
}

/// `hasNoSideEffect($x)`: `$x` contains no call, assignment or increment.
fn has_no_side_effect(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    bound(ctx, args.first()).is_none_or(|node| {
        !node
            .descendants()
            .any(|inner| SIDE_EFFECT_KINDS.contains(&inner.kind()))
    })
}

/// `referencedIn($var, $expr)`: the name bound to `$var` occurs as an
/// identifier inside `$expr`.
fn referenced_in(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    let (Some(variable), Some(scope)) = (
        bound(ctx, args.first()),
        args.get(1).and_then(GuardArg::as_placeholder),
    ) else {
        return false;
    };
    let name = ctx.tree().text_of(variable).trim();
    ctx.nodes(scope).iter().any(|root| {
        root.descendants()
            .any(|node| node.kind() == "identifier" && node.text() == Some(name))
    })
}

fn version_arg(args: &[GuardArg], index: usize) -> Option<f64> {
    args.get(index)?.text().trim().parse().ok()
}

fn source_version_ge(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    version_arg(args, 0).is_some_and(|min| ctx.source_version_number() >= min)
}

fn source_version_le(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    version_arg(args, 0).is_some_and(|max| ctx.source_version_number() <= max)
}

fn source_version_between(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    let (Some(min), Some(max)) = (version_arg(args, 0), version_arg(args, 1)) else {
        return false;
    };
    let version = ctx.source_version_number();
    version >= min && version <= max
}

fn has_modifier(ctx: &GuardContext<'_, '_>, args: &[GuardArg], modifier: &str) -> bool {
    bound(ctx, args.first())
        .and_then(|node| declaration_of(ctx.tree(), node))
        .and_then(|declaration| declaration.child_of_kind("modifiers"))
        .is_some_and(|modifiers| {
            modifiers
                .children()
                .iter()
                .any(|child| child.kind() == modifier)
        })
}

/// `hasAnnotation($x, Name)`: the body declaration enclosing `$x` carries
/// the annotation, matched by simple or qualified name.
fn has_annotation(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    let (Some(node), Some(name)) = (bound(ctx, args.first()), args.get(1)) else {
        return false;
    };
    enclosing_body_declaration(ctx.tree(), node)
        .is_some_and(|declaration| annotated(ctx.tree(), declaration, name.text()))
}

fn is_deprecated(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    bound(ctx, args.first())
        .and_then(|node| {
            declaration_of(ctx.tree(), node).or_else(|| enclosing_body_declaration(ctx.tree(), node))
        })
        .is_some_and(|declaration| annotated(ctx.tree(), declaration, "Deprecated"))
}

fn annotated(tree: &SyntaxTree, declaration: &SyntaxNode, expected: &str) -> bool {
    let wanted = simple_name(expected.trim_start_matches('@'));
    declaration
        .child_of_kind("modifiers")
        .is_some_and(|modifiers| {
            modifiers.children().iter().any(|child| {
                matches!(child.kind(), "annotation" | "marker_annotation")
                    && child
                        .child_by_field("name")
                        .is_some_and(|name| simple_name(tree.text_of(name)) == wanted)
            })
        })
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// `elementKindMatches($x, KIND)`: `$x` is, or names, a declaration of
/// kind `FIELD`, `METHOD`, `LOCAL_VARIABLE`, `PARAMETER` or `TYPE`.
fn element_kind_matches(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    let (Some(node), Some(expected)) = (bound(ctx, args.first()), args.get(1)) else {
        return false;
    };
    declaration_of(ctx.tree(), node)
        .and_then(|declaration| element_kind(declaration.kind()))
        .is_some_and(|kind| kind.eq_ignore_ascii_case(expected.text()))
}

fn element_kind(kind: &str) -> Option<&'static str> {
    match kind {
        "field_declaration" => Some("FIELD"),
        "method_declaration" | "constructor_declaration" => Some("METHOD"),
        "local_variable_declaration" | "resource" | "enhanced_for_statement" => {
            Some("LOCAL_VARIABLE")
        }
        "formal_parameter" | "spread_parameter" | "catch_formal_parameter" => Some("PARAMETER"),
        other if is_type_declaration_kind(other) => Some("TYPE"),
        _ => None,
    }
}

/// `contains("text")` or `contains($x, "text")`: the body of the method
/// enclosing the match, or `$x`, contains the text.
fn contains(ctx: &GuardContext<'_, '_>, args: &[GuardArg]) -> bool {
    let (subject, needle) = match args {
        [text] => (Some(ctx.found().matched_node()), text),
        [target, text] => (bound(ctx, Some(target)), text),
        _ => return false,
    };
    let Some(node) = subject else {
        return false;
    };
    let tree = ctx.tree();
    let scope = tree
        .enclosing(node, |ancestor| {
            matches!(ancestor.kind(), "method_declaration" | "constructor_declaration")
        })
        .and_then(|method| method.child_by_field("body"))
        .unwrap_or(node);
    tree.text_of(scope).contains(needle.text())
}

/// Returns the declaration a node stands for: the node itself when it is
/// a declaration, otherwise the declaration of the name it references.
fn declaration_of<'t>(tree: &'t SyntaxTree, node: &'t SyntaxNode) -> Option<&'t SyntaxNode> {
    let kind = node.kind();
    if VARIABLE_DECLARATION_KINDS.contains(&kind)
        || BODY_DECLARATION_KINDS.contains(&kind)
        || is_type_declaration_kind(kind)
    {
        return Some(node);
    }

    let (name, wants_method) = match kind {
        "identifier" | "type_identifier" => (node.text()?, false),
        "method_invocation" => (node.child_by_field("name")?.text()?, true),
        "field_access" => (node.child_by_field("field")?.text()?, false),
        _ => return None,
    };
    find_declaration(tree, node, name, wants_method)
}

fn find_declaration<'t>(
    tree: &'t SyntaxTree,
    reference: &SyntaxNode,
    name: &str,
    wants_method: bool,
) -> Option<&'t SyntaxNode> {
    let position = reference.span().start_byte;
    let mut preceding = None;
    let mut any = None;
    tree.walk(|candidate, _| {
        let is_method = candidate.kind() == "method_declaration";
        if is_method != wants_method || !declares(candidate, name) {
            return;
        }
        any = any.or(Some(candidate));
        if candidate.span().start_byte < position {
            preceding = Some(candidate);
        }
    });
    preceding.or(any)
}

fn declares(declaration: &SyntaxNode, name: &str) -> bool {
    let kind = declaration.kind();
    let declarable = VARIABLE_DECLARATION_KINDS.contains(&kind)
        || BODY_DECLARATION_KINDS.contains(&kind)
        || is_type_declaration_kind(kind);
    if !declarable {
        return false;
    }
    let named = |node: &SyntaxNode| {
        node.child_by_field("name")
            .and_then(SyntaxNode::text)
            .is_some_and(|text| text == name)
    };
    named(declaration)
        || declaration
            .children()
            .iter()
            .any(|child| child.kind() == "variable_declarator" && named(child))
}

fn enclosing_body_declaration<'t>(
    tree: &'t SyntaxTree,
    node: &'t SyntaxNode,
) -> Option<&'t SyntaxNode> {
    if BODY_DECLARATION_KINDS.contains(&node.kind()) {
        return Some(node);
    }
    tree.enclosing(node, |ancestor| BODY_DECLARATION_KINDS.contains(&ancestor.kind()))
}
