//! Prefix/middle/suffix splitting for child lists.
//!
//! A template list holds at most one multi-placeholder. Everything before
//! it is a fixed prefix and everything after a fixed suffix, so the
//! candidate list splits deterministically: the prefix and suffix lengths are
//! dictated by the template and the multi-placeholder takes whatever is left
//! in the middle. No backtracking is involved.

/// The shape of a template list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// No multi-placeholder: candidates must have exactly this many entries.
    Exact(usize),
    /// One multi-placeholder between `prefix` and `suffix` fixed entries.
    Variadic {
        /// Number of fixed entries before the multi-placeholder.
        prefix: usize,
        /// Number of fixed entries after the multi-placeholder.
        suffix: usize,
    },
}

impl ListShape {
    /// Computes the shape of a template list.
    ///
    /// Only the first entry for which `is_multi` holds is treated as the
    /// variadic position; templates never contain more than one.
    #[must_use]
    pub fn of<T>(templates: &[T], is_multi: impl Fn(&T) -> bool) -> Self {
        match templates.iter().position(is_multi) {
            Some(index) => Self::Variadic {
                prefix: index,
                suffix: templates.len().saturating_sub(index).saturating_sub(1),
            },
            None => Self::Exact(templates.len()),
        }
    }

    /// Returns the minimum number of candidates the shape accepts.
    #[must_use]
    pub const fn min_len(self) -> usize {
        match self {
            Self::Exact(len) => len,
            Self::Variadic { prefix, suffix } => prefix.saturating_add(suffix),
        }
    }
}

/// A candidate list split into the parts a template's fixed prefix,
/// multi-placeholder and fixed suffix line up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSplit<'c, T> {
    /// Entries matched pairwise against the fixed prefix.
    pub prefix: &'c [T],
    /// Entries bound to the multi-placeholder; always empty for
    /// [`ListShape::Exact`].
    pub middle: &'c [T],
    /// Entries matched pairwise against the fixed suffix.
    pub suffix: &'c [T],
}

/// Splits `candidates` according to `shape`.
///
/// Returns `None` when the list is too short (or, for an exact shape, not
/// exactly the right length).
#[must_use]
pub fn split_list<T>(candidates: &[T], shape: ListShape) -> Option<ListSplit<'_, T>> {
    match shape {
        ListShape::Exact(len) => (candidates.len() == len).then_some(ListSplit {
            prefix: candidates,
            middle: &[],
            suffix: &[],
        }),
        ListShape::Variadic { prefix, suffix } => {
            let (head, rest) = candidates.split_at_checked(prefix)?;
            let middle_len = rest.len().checked_sub(suffix)?;
            let (middle, tail) = rest.split_at_checked(middle_len)?;
            Some(ListSplit {
                prefix: head,
                middle,
                suffix: tail,
            })
        }
    }
}
