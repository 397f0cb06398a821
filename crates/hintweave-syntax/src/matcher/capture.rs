//! Placeholder bindings.
//!
//! Bindings map placeholder keys (`$x`, `$xs$`, plus the implicit `$_` and
//! `$this`) to the nodes they matched. A key bound twice must bind
//! structurally equal code both times.

use std::collections::BTreeMap;

use crate::tree::SyntaxNode;

/// The value bound to a placeholder.
#[derive(Debug, Clone)]
pub enum Binding<'t> {
    /// A single node (`$x`).
    Single(&'t SyntaxNode),
    /// An ordered, possibly empty run of sibling nodes (`$xs$`).
    Multi(Vec<&'t SyntaxNode>),
}

impl<'t> Binding<'t> {
    /// Returns the bound node for single bindings.
    #[must_use]
    pub const fn as_single(&self) -> Option<&'t SyntaxNode> {
        match self {
            Self::Single(node) => Some(node),
            Self::Multi(_) => None,
        }
    }

    /// Returns the bound nodes for multi bindings.
    #[must_use]
    pub fn as_multi(&self) -> Option<&[&'t SyntaxNode]> {
        match self {
            Self::Multi(nodes) => Some(nodes),
            Self::Single(_) => None,
        }
    }

    /// Returns the bound nodes in order, one for single bindings.
    #[must_use]
    pub fn nodes(&self) -> Vec<&'t SyntaxNode> {
        match self {
            Self::Single(node) => vec![*node],
            Self::Multi(nodes) => nodes.clone(),
        }
    }

    fn same_code(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Single(a), Self::Single(b)) => a.same_structure(b),
            (Self::Multi(a), Self::Multi(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_structure(y))
            }
            _ => false,
        }
    }
}

/// Placeholder key to binding, ordered by key.
pub type Bindings<'t> = BTreeMap<String, Binding<'t>>;

#[derive(Debug, Clone, Default)]
pub(super) struct Captures<'t> {
    inner: Bindings<'t>,
}

impl<'t> Captures<'t> {
    pub(super) fn into_inner(self) -> Bindings<'t> {
        self.inner
    }

    pub(super) fn bind_single(&mut self, key: String, node: &'t SyntaxNode) -> bool {
        self.insert_consistent(key, Binding::Single(node))
    }

    pub(super) fn bind_multi(&mut self, key: String, nodes: Vec<&'t SyntaxNode>) -> bool {
        self.insert_consistent(key, Binding::Multi(nodes))
    }

    fn insert_consistent(&mut self, key: String, next: Binding<'t>) -> bool {
        match self.inner.get(&key) {
            Some(existing) => existing.same_code(&next),
            None => {
                self.inner.insert(key, next);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_key_requires_equal_code() {
        let a = SyntaxNode::leaf("identifier", "a");
        let other_a = SyntaxNode::leaf("identifier", "a").with_field("right");
        let b = SyntaxNode::leaf("identifier", "b");

        let mut captures = Captures::default();
        assert!(captures.bind_single("$x".to_owned(), &a));
        assert!(captures.bind_single("$x".to_owned(), &other_a));
        assert!(!captures.bind_single("$x".to_owned(), &b));
    }

    #[test]
    fn single_and_multi_never_agree() {
        let a = SyntaxNode::leaf("identifier", "a");
        let mut captures = Captures::default();
        assert!(captures.bind_multi("$x".to_owned(), vec![&a]));
        assert!(!captures.bind_single("$x".to_owned(), &a));
        assert!(captures.bind_multi("$x".to_owned(), vec![&a]));
        assert!(!captures.bind_multi("$x".to_owned(), Vec::new()));
    }
}
