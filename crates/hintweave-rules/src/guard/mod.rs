//! Guard expressions.
//!
//! A guard is a small boolean language over function calls:
//!
//! ```text
//! guard   := or
//! or      := and ("||" and)*
//! and     := unary ("&&" unary)*
//! unary   := "!" unary | primary
//! primary := "(" guard ")"
//!          | "$x" "instanceof" Type ["[]"]
//!          | "$x"
//!          | name ["(" [arg ("," arg)*] ")"]
//! ```
//!
//! Functions are looked up by name in the [`GuardRegistry`] carried by the
//! [`GuardContext`]. A name with no registered function evaluates to
//! `false`.

mod builtins;
mod parser;
mod registry;

use std::fmt;

use hintweave_syntax::{
    Binding, DeclaredTypeResolver, Match, SyntaxNode, SyntaxTree, TypeResolver,
};

use crate::error::GuardParseError;

pub use parser::parse_guard;
pub use registry::{GuardFn, GuardRegistry};

/// A literal argument of a guard function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardArg {
    /// A placeholder key such as `$x` or `$xs$`.
    Placeholder(String),
    /// A number as written, such as `11` or `1.8`.
    Number(String),
    /// The content of a quoted string, with `\"` unescaped.
    Str(String),
    /// A bare or qualified name such as `FIELD` or `java.util.List[]`.
    Name(String),
}

impl GuardArg {
    /// Returns the argument text without quotes.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Placeholder(text) | Self::Number(text) | Self::Str(text) | Self::Name(text) => {
                text
            }
        }
    }

    /// Returns the placeholder key for placeholder arguments.
    #[must_use]
    pub fn as_placeholder(&self) -> Option<&str> {
        match self {
            Self::Placeholder(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for GuardArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => write!(f, "\"{}\"", text.replace('"', "\\\"")),
            other => f.write_str(other.text()),
        }
    }
}

/// A parsed guard expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardExpression {
    /// A call of a registered guard function.
    Call {
        /// The function name.
        name: String,
        /// The literal arguments.
        args: Vec<GuardArg>,
    },
    /// Both operands hold.
    And(Box<Self>, Box<Self>),
    /// Either operand holds.
    Or(Box<Self>, Box<Self>),
    /// The operand does not hold.
    Not(Box<Self>),
}

impl GuardExpression {
    /// Parses guard text.
    ///
    /// # Errors
    ///
    /// Returns an error naming the position of the first malformed token.
    pub fn parse(text: &str) -> Result<Self, GuardParseError> {
        parse_guard(text)
    }

    /// Creates a function call expression.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<GuardArg>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    /// Evaluates the expression. `&&` and `||` short-circuit.
    #[must_use]
    pub fn evaluate(&self, ctx: &GuardContext<'_, '_>) -> bool {
        match self {
            Self::Call { name, args } => ctx.registry().call(name, ctx, args),
            Self::And(left, right) => left.evaluate(ctx) && right.evaluate(ctx),
            Self::Or(left, right) => left.evaluate(ctx) || right.evaluate(ctx),
            Self::Not(inner) => !inner.evaluate(ctx),
        }
    }
}

impl fmt::Display for GuardExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call { name, args } if args.is_empty() => f.write_str(name),
            Self::Call { name, args } => {
                let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{name}({})", rendered.join(", "))
            }
            Self::Or(left, right) => write!(f, "{left} || {right}"),
            Self::And(left, right) => {
                write_operand(f, left)?;
                f.write_str(" && ")?;
                write_operand(f, right)
            }
            Self::Not(inner) => match inner.as_ref() {
                Self::Call { .. } | Self::Not(_) => write!(f, "!{inner}"),
                _ => write!(f, "!({inner})"),
            },
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &GuardExpression) -> fmt::Result {
    match operand {
        GuardExpression::Or(..) => write!(f, "({operand})"),
        _ => write!(f, "{operand}"),
    }
}

/// Everything a guard function may inspect about one match.
#[derive(Clone, Copy)]
pub struct GuardContext<'a, 't> {
    found: &'a Match<'t>,
    registry: &'a GuardRegistry,
    source_version: Option<&'a str>,
    resolver: Option<&'a dyn TypeResolver>,
}

impl fmt::Debug for GuardContext<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardContext")
            .field("matched", &self.found.text())
            .field("source_version", &self.source_version)
            .field("type_resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, 't> GuardContext<'a, 't> {
    /// Creates a context for `found` evaluated against `registry`.
    #[must_use]
    pub const fn new(found: &'a Match<'t>, registry: &'a GuardRegistry) -> Self {
        Self {
            found,
            registry,
            source_version: None,
            resolver: None,
        }
    }

    /// Sets the declared source-language version, such as `"11"` or
    /// `"1.8"`.
    #[must_use]
    pub const fn with_source_version(mut self, version: &'a str) -> Self {
        self.source_version = Some(version);
        self
    }

    /// Sets the resolver used by type guards.
    #[must_use]
    pub const fn with_type_resolver(mut self, resolver: &'a dyn TypeResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Returns the match under evaluation.
    #[must_use]
    pub const fn found(&self) -> &'a Match<'t> {
        self.found
    }

    /// Returns the tree the match belongs to.
    #[must_use]
    pub const fn tree(&self) -> &'t SyntaxTree {
        self.found.tree()
    }

    /// Returns the registry guard calls are resolved through.
    #[must_use]
    pub const fn registry(&self) -> &'a GuardRegistry {
        self.registry
    }

    /// Returns the binding for a placeholder key.
    #[must_use]
    pub fn binding(&self, key: &str) -> Option<&'a Binding<'t>> {
        self.found.binding(key)
    }

    /// Returns the node bound to a single placeholder.
    #[must_use]
    pub fn node(&self, key: &str) -> Option<&'t SyntaxNode> {
        self.binding(key).and_then(Binding::as_single)
    }

    /// Returns the nodes bound to a placeholder, empty if unbound.
    #[must_use]
    pub fn nodes(&self, key: &str) -> Vec<&'t SyntaxNode> {
        self.binding(key).map(Binding::nodes).unwrap_or_default()
    }

    /// Returns the declared source version as written.
    #[must_use]
    pub const fn source_version(&self) -> Option<&'a str> {
        self.source_version
    }

    /// Returns the declared source version as a number. An absent or
    /// unparsable version is `0`.
    #[must_use]
    pub fn source_version_number(&self) -> f64 {
        self.source_version
            .and_then(|version| version.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    /// Resolves the static type of `node` through the configured resolver,
    /// or through the file's declarations when none is configured.
    #[must_use]
    pub fn resolve_type(&self, node: &SyntaxNode) -> Option<String> {
        match self.resolver {
            Some(resolver) => resolver.resolve(self.tree(), node),
            None => DeclaredTypeResolver::new().resolve(self.tree(), node),
        }
    }
}
