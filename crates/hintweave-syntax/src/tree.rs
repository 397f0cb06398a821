//! Owned syntax-tree model the matcher operates on.
//!
//! Tree-sitter trees borrow their parser's buffers and expose every token,
//! including punctuation. The engine lowers them once into [`SyntaxTree`]:
//! an owned, immutable tree of [`SyntaxNode`]s with a kind tag, an optional
//! field label, an ordered child list, leaf text and a source span. Nodes
//! support structural equality and deep copy, which is all the matcher needs.

use std::ops::Range;

use crate::kinds::is_punctuation;
use crate::language::SupportedLanguage;

/// Source span of a node, with one-based line and column numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of the first byte.
    pub start_byte: usize,
    /// Byte offset one past the last byte.
    pub end_byte: usize,
    /// One-based start line.
    pub start_line: u32,
    /// One-based start column.
    pub start_column: u32,
    /// One-based end line.
    pub end_line: u32,
    /// One-based end column.
    pub end_column: u32,
}

impl Span {
    fn from_node(node: tree_sitter::Node<'_>) -> Self {
        let (start_line, start_column) = point_to_one_based(node.start_position());
        let (end_line, end_column) = point_to_one_based(node.end_position());
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Returns the byte range covered by the span.
    #[must_use]
    pub const fn byte_range(&self) -> Range<usize> {
        self.start_byte..self.end_byte
    }

    /// Returns the length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    /// Returns whether the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

/// A node in an owned syntax tree.
///
/// Terminal tokens carry their text; composite nodes carry children. A
/// composite whose children were all punctuation (such as an empty argument
/// list) has an empty child list but is still not a leaf.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    kind: &'static str,
    field: Option<&'static str>,
    text: Option<String>,
    children: Vec<SyntaxNode>,
    span: Span,
}

impl SyntaxNode {
    /// Creates a leaf node with the given kind and text.
    #[must_use]
    pub fn leaf(kind: &'static str, text: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            text: Some(text.into()),
            children: Vec::new(),
            span: Span::default(),
        }
    }

    /// Creates a composite node with the given kind and children.
    #[must_use]
    pub fn branch(kind: &'static str, children: Vec<Self>) -> Self {
        Self {
            kind,
            field: None,
            text: None,
            children,
            span: Span::default(),
        }
    }

    /// Returns this node labelled with a field name.
    #[must_use]
    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    /// Returns the grammar node kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns the field label this node occupies in its parent.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// Returns the token text for leaf nodes.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns whether this node is a terminal token.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.text.is_some()
    }

    /// Returns the ordered children.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Returns the first child labelled `field`.
    #[must_use]
    pub fn child_by_field(&self, field: &str) -> Option<&Self> {
        self.children
            .iter()
            .find(|child| child.field == Some(field))
    }

    /// Returns the first child of the given kind.
    #[must_use]
    pub fn child_of_kind(&self, kind: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.kind == kind)
    }

    /// Returns the source span.
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Compares two subtrees for structural equality.
    ///
    /// Kinds, leaf text, child order and child field labels must agree.
    /// Spans are ignored, so equal code at different positions compares
    /// equal, and so is the root's own field label: bindings for a repeated
    /// placeholder come from different slots of their parents.
    #[must_use]
    pub fn same_structure(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.text == other.text
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(left, right)| left.field == right.field && left.same_structure(right))
    }

    /// Iterates over this node and its descendants in pre-order.
    pub fn descendants(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Concatenates leaf texts, separated by single spaces.
    ///
    /// Useful for nodes that do not come from a source buffer, such as hand
    /// built templates.
    #[must_use]
    pub fn token_text(&self) -> String {
        self.descendants()
            .filter_map(Self::text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An owned, immutable syntax tree together with the source it was lowered
/// from.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    root: SyntaxNode,
    source: String,
    language: SupportedLanguage,
}

impl SyntaxTree {
    /// Lowers a Tree-sitter tree.
    pub(crate) fn lower(tree: &tree_sitter::Tree, source: &str, language: SupportedLanguage) -> Self {
        Self {
            root: lower_node(tree.root_node(), None, source),
            source: source.to_owned(),
            language,
        }
    }

    /// Returns the root node.
    #[must_use]
    pub const fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Returns the source text the tree was lowered from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the tree's language.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns whether the tree has no top-level content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Returns the source text covered by a node of this tree.
    #[must_use]
    pub fn text_of(&self, node: &SyntaxNode) -> &str {
        self.slice(node.span.byte_range())
    }

    /// Returns the source text for a byte range, or an empty string when the
    /// range does not fall on character boundaries.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> &str {
        self.source.get(range).unwrap_or_default()
    }

    /// Visits every node in pre-order together with its ancestors,
    /// outermost first.
    pub fn walk<'t>(&'t self, mut visit: impl FnMut(&'t SyntaxNode, &[&'t SyntaxNode])) {
        let mut ancestors = Vec::new();
        walk_node(&self.root, &mut ancestors, &mut visit);
    }

    /// Returns the chain of ancestors of `target`, outermost first, or
    /// `None` if the node does not belong to this tree.
    #[must_use]
    pub fn ancestors_of<'t>(&'t self, target: &SyntaxNode) -> Option<Vec<&'t SyntaxNode>> {
        let mut path = Vec::new();
        find_path(&self.root, target, &mut path).then_some(path)
    }

    /// Returns the innermost ancestor of `target` satisfying `predicate`.
    #[must_use]
    pub fn enclosing<'t>(
        &'t self,
        target: &SyntaxNode,
        predicate: impl Fn(&SyntaxNode) -> bool,
    ) -> Option<&'t SyntaxNode> {
        self.ancestors_of(target)?
            .into_iter()
            .rev()
            .find(|node| predicate(node))
    }
}

fn walk_node<'t>(
    node: &'t SyntaxNode,
    ancestors: &mut Vec<&'t SyntaxNode>,
    visit: &mut impl FnMut(&'t SyntaxNode, &[&'t SyntaxNode]),
) {
    visit(node, ancestors.as_slice());
    ancestors.push(node);
    for child in &node.children {
        walk_node(child, ancestors, visit);
    }
    ancestors.pop();
}

fn find_path<'t>(node: &'t SyntaxNode, target: &SyntaxNode, path: &mut Vec<&'t SyntaxNode>) -> bool {
    if std::ptr::eq(node, target) {
        return true;
    }
    if target.span.start_byte < node.span.start_byte || target.span.end_byte > node.span.end_byte {
        return false;
    }
    path.push(node);
    for child in &node.children {
        if find_path(child, target, path) {
            return true;
        }
    }
    path.pop();
    false
}

fn lower_node(node: tree_sitter::Node<'_>, field: Option<&'static str>, source: &str) -> SyntaxNode {
    let mut children = Vec::new();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if keeps_child(child) {
                children.push(lower_node(child, cursor.field_name(), source));
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    let text = (node.child_count() == 0)
        .then(|| source.get(node.byte_range()).unwrap_or_default().to_owned());

    SyntaxNode {
        kind: node.kind(),
        field,
        text,
        children,
        span: Span::from_node(node),
    }
}

fn keeps_child(child: tree_sitter::Node<'_>) -> bool {
    if child.is_extra() || child.is_missing() {
        return false;
    }
    child.is_named() || !is_punctuation(child.kind())
}
