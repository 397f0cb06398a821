//! Syntax frontend and structural matcher for hintweave.
//!
//! This crate turns Java source into an owned [`SyntaxTree`], compiles
//! pattern text into [`Template`]s and matches them structurally:
//!
//! - **Patterns** via [`Pattern`] and [`parse_pattern`], anchored to a
//!   [`PatternKind`]
//! - **Matching** via [`Matcher`] and [`Engine`], producing [`Match`]es with
//!   placeholder [`Binding`]s
//! - **Rewriting** via [`instantiate`] and [`Rewriter`]
//!
//! # Pattern Language
//!
//! - `$x` matches any single node and binds it
//! - `$xs$` matches zero or more nodes of an argument list, parameter list
//!   or statement sequence
//! - `$x:StringLiteral` constrains a placeholder to a node category
//! - `$_` and `$_$` match without binding
//!
//! Matching is deterministic: a list holds at most one multi-placeholder,
//! so the fixed entries before and after it decide where it starts and ends.

mod engine;
mod error;
mod kinds;
mod language;
mod matcher;
mod parser;
mod pattern;
mod placeholder;
mod resolve;
mod rewriter;
mod tree;

pub use engine::Engine;
pub use error::SyntaxError;
pub use kinds::{
    is_expression_kind, is_list_kind, is_literal_kind, is_numeric_literal_kind, is_statement_kind,
    is_type_declaration_kind,
};
pub use language::{LanguageParseError, SupportedLanguage};
pub use matcher::{
    Binding, Bindings, ListShape, ListSplit, Match, Matcher, satisfies_constraint, split_list,
};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use pattern::{CompiledPattern, Pattern, PatternKind, PatternKindParseError, Template, parse_pattern};
pub use placeholder::{ENCLOSING_DECLARATION, PlaceholderInfo, WHOLE_MATCH};
pub use resolve::{DeclaredTypeResolver, TypeResolver, type_matches, type_subject};
pub use rewriter::{RewriteResult, RewriteRule, Rewriter, TextEdit, instantiate, validate_replacement};
pub use tree::{Span, SyntaxNode, SyntaxTree};

#[cfg(test)]
mod tests;
