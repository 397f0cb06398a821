//! Matching algorithms for the [`Matcher`](super::Matcher) implementation.

use crate::kinds::is_type_declaration_kind;
use crate::matcher::{Binding, Match};
use crate::matcher::capture::Captures;
use crate::matcher::context::MatchContext;
use crate::matcher::list::{ListShape, split_list};
use crate::pattern::{Slot, placeholder_slot};
use crate::placeholder::{ENCLOSING_DECLARATION, WHOLE_MATCH, placeholder_key};
use crate::tree::{Span, SyntaxNode, SyntaxTree};

/// Matches the template root against `node`, anchoring a single match.
pub(super) fn match_whole<'t>(
    ctx: &MatchContext<'_>,
    tree: &'t SyntaxTree,
    node: &'t SyntaxNode,
    ancestors: &[&'t SyntaxNode],
) -> Option<Match<'t>> {
    let mut captures = Captures::default();
    nodes_match(ctx.root(), node, ctx, &mut captures)
        .then(|| finish(tree, node, ancestors, captures, node.span()))
}

/// Slides the template's statements over the statements of `block`.
///
/// Templates holding a multi-placeholder have no fixed window length and
/// are matched against the whole statement list instead.
pub(super) fn match_windows<'t>(
    ctx: &MatchContext<'_>,
    tree: &'t SyntaxTree,
    block: &'t SyntaxNode,
    ancestors: &[&'t SyntaxNode],
) -> Vec<Match<'t>> {
    let templates = ctx.root().children();
    let statements = block.children();

    if templates.iter().any(|t| multi_slot(t).is_some()) || templates.is_empty() {
        let mut captures = Captures::default();
        let Some(first) = statements.first() else {
            return Vec::new();
        };
        if !match_list(templates, statements, ctx, &mut captures) {
            return Vec::new();
        }
        let span = window_span(statements).unwrap_or_else(|| first.span());
        return vec![finish(tree, first, ancestors, captures, span)];
    }

    let mut matches = Vec::new();
    let mut enclosing = ancestors.to_vec();
    enclosing.push(block);
    for window in statements.windows(templates.len()) {
        let mut captures = Captures::default();
        if !match_list(templates, window, ctx, &mut captures) {
            continue;
        }
        if let (Some(first), Some(span)) = (window.first(), window_span(window)) {
            matches.push(finish(tree, first, &enclosing, captures, span));
        }
    }
    matches
}

fn window_span(window: &[SyntaxNode]) -> Option<Span> {
    let first = window.first()?.span();
    let last = window.last()?.span();
    Some(Span {
        start_byte: first.start_byte,
        end_byte: last.end_byte,
        start_line: first.start_line,
        start_column: first.start_column,
        end_line: last.end_line,
        end_column: last.end_column,
    })
}

pub(super) fn finish<'t>(
    tree: &'t SyntaxTree,
    node: &'t SyntaxNode,
    ancestors: &[&'t SyntaxNode],
    captures: Captures<'t>,
    span: Span,
) -> Match<'t> {
    let mut bindings = captures.into_inner();
    bindings.insert(WHOLE_MATCH.to_owned(), Binding::Single(node));
    if let Some(declaration) = ancestors
        .iter()
        .rev()
        .find(|ancestor| is_type_declaration_kind(ancestor.kind()))
    {
        bindings.insert(
            ENCLOSING_DECLARATION.to_owned(),
            Binding::Single(declaration),
        );
    }
    Match {
        tree,
        node,
        bindings,
        span,
    }
}

/// Recursively matches a template node against a candidate node.
pub(super) fn nodes_match<'t>(
    template: &SyntaxNode,
    candidate: &'t SyntaxNode,
    ctx: &MatchContext<'_>,
    captures: &mut Captures<'t>,
) -> bool {
    if let Some(slot) = placeholder_slot(template) {
        return bind_single(slot, candidate, ctx, captures);
    }

    if candidate.kind() != template.kind() {
        return false;
    }

    match (template.text(), candidate.text()) {
        (Some(expected), Some(actual)) => expected == actual,
        (None, None) => match_list(
            template.children(),
            significant_children(template, candidate),
            ctx,
            captures,
        ),
        _ => false,
    }
}

/// A template that omits modifiers matches declarations with any modifiers.
fn significant_children<'t>(template: &SyntaxNode, candidate: &'t SyntaxNode) -> &'t [SyntaxNode] {
    let children = candidate.children();
    match children.split_first() {
        Some((first, rest))
            if first.kind() == "modifiers" && template.child_of_kind("modifiers").is_none() =>
        {
            rest
        }
        _ => children,
    }
}

fn match_list<'t>(
    templates: &[SyntaxNode],
    candidates: &'t [SyntaxNode],
    ctx: &MatchContext<'_>,
    captures: &mut Captures<'t>,
) -> bool {
    let shape = ListShape::of(templates, |t| multi_slot(t).is_some());
    let (Some(fixed), Some(split)) = (split_list(templates, shape), split_list(candidates, shape))
    else {
        return false;
    };

    if !match_pairwise(fixed.prefix, split.prefix, ctx, captures) {
        return false;
    }

    if let Some(slot) = fixed.middle.first().and_then(multi_slot) {
        if !bind_multi(slot, split.middle, ctx, captures) {
            return false;
        }
    }

    match_pairwise(fixed.suffix, split.suffix, ctx, captures)
}

fn match_pairwise<'t>(
    templates: &[SyntaxNode],
    candidates: &'t [SyntaxNode],
    ctx: &MatchContext<'_>,
    captures: &mut Captures<'t>,
) -> bool {
    templates.len() == candidates.len()
        && templates.iter().zip(candidates).all(|(template, candidate)| {
            template.field() == candidate.field() && nodes_match(template, candidate, ctx, captures)
        })
}

fn multi_slot(node: &SyntaxNode) -> Option<Slot<'_>> {
    placeholder_slot(node).filter(|slot| slot.token.is_multi)
}

fn bind_single<'t>(
    slot: Slot<'_>,
    candidate: &'t SyntaxNode,
    ctx: &MatchContext<'_>,
    captures: &mut Captures<'t>,
) -> bool {
    if !ctx.admits(slot, candidate) {
        return false;
    }
    if slot.token.is_wildcard() {
        return true;
    }
    let key = placeholder_key(slot.token.name, slot.token.is_multi);
    if slot.token.is_multi {
        captures.bind_multi(key, vec![candidate])
    } else {
        captures.bind_single(key, candidate)
    }
}

fn bind_multi<'t>(
    slot: Slot<'_>,
    candidates: &'t [SyntaxNode],
    ctx: &MatchContext<'_>,
    captures: &mut Captures<'t>,
) -> bool {
    if !candidates.iter().all(|candidate| ctx.admits(slot, candidate)) {
        return false;
    }
    if slot.token.is_wildcard() {
        return true;
    }
    captures.bind_multi(
        placeholder_key(slot.token.name, true),
        candidates.iter().collect(),
    )
}
