//! Pattern compilation for structural code matching.
//!
//! A [`Pattern`] is pattern text plus the [`PatternKind`] it is anchored to.
//! Compiling it yields a [`Template`]: a syntax tree in the host grammar's
//! node-kind vocabulary whose placeholder positions are identifiers spelled
//! `$name` or `$name$`.
//!
//! # Pattern Syntax
//!
//! - `$x` matches exactly one node and binds it as `$x`
//! - `$xs$` matches zero or more sibling nodes of an argument list,
//!   parameter list or statement sequence and binds them as `$xs$`
//! - `$x:StringLiteral` constrains what `$x` may bind to
//! - `$_` and `$_$` match without binding
//! - `$s;` in statement position matches any single statement
//!
//! Pattern text is not valid host code on its own, so each kind wraps it in
//! a small compilation unit before parsing and then extracts the node the
//! pattern denotes.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::SyntaxError;
use crate::kinds::{
    is_expression_kind, is_list_kind, is_placeholder_carrier, is_statement_kind,
};
use crate::language::SupportedLanguage;
use crate::parser::Parser;
use crate::placeholder::{PlaceholderInfo, PlaceholderToken, parse_token, scan};
use crate::tree::SyntaxNode;

/// The node category a pattern is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternKind {
    /// Any expression.
    Expression,
    /// A single statement.
    Statement,
    /// A method invocation.
    MethodCall,
    /// An object creation (`new T(..)`).
    Constructor,
    /// An annotation, with or without arguments.
    Annotation,
    /// An import declaration.
    Import,
    /// A block (`{ .. }`) matched as a whole.
    Block,
    /// A field declaration.
    Field,
    /// A method declaration.
    MethodDeclaration,
    /// A run of consecutive statements anywhere inside a block.
    StatementSequence,
}

impl PatternKind {
    /// Returns every pattern kind.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Expression,
            Self::Statement,
            Self::MethodCall,
            Self::Constructor,
            Self::Annotation,
            Self::Import,
            Self::Block,
            Self::Field,
            Self::MethodDeclaration,
            Self::StatementSequence,
        ]
    }

    /// Returns the kebab-case name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expression => "expression",
            Self::Statement => "statement",
            Self::MethodCall => "method-call",
            Self::Constructor => "constructor",
            Self::Annotation => "annotation",
            Self::Import => "import",
            Self::Block => "block",
            Self::Field => "field",
            Self::MethodDeclaration => "method-declaration",
            Self::StatementSequence => "statement-sequence",
        }
    }

    /// Returns whether a candidate node of `node_kind` can anchor a match.
    #[must_use]
    pub fn accepts(self, node_kind: &str) -> bool {
        match self {
            Self::Expression => is_expression_kind(node_kind),
            Self::Statement => is_statement_kind(node_kind),
            Self::MethodCall => node_kind == "method_invocation",
            Self::Constructor => node_kind == "object_creation_expression",
            Self::Annotation => matches!(node_kind, "annotation" | "marker_annotation"),
            Self::Import => node_kind == "import_declaration",
            Self::Block | Self::StatementSequence => node_kind == "block",
            Self::Field => node_kind == "field_declaration",
            Self::MethodDeclaration => node_kind == "method_declaration",
        }
    }

    /// Infers the kind from the shape of pattern text.
    #[must_use]
    pub fn infer(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('@') {
            Self::Annotation
        } else if trimmed.starts_with("import ") {
            Self::Import
        } else if trimmed.starts_with("new ") {
            Self::Constructor
        } else if trimmed.starts_with('{') {
            Self::Block
        } else if trimmed.ends_with(';') {
            Self::Statement
        } else if trimmed.contains('(') && trimmed.ends_with(')') {
            Self::MethodCall
        } else {
            Self::Expression
        }
    }

    fn wrap(self, text: &str) -> String {
        let bare = text.trim_end_matches(';').trim_end();
        match self {
            Self::Expression => format!("class _Pattern {{ void _method() {{ _result = {bare}; }} }}"),
            Self::MethodCall => format!("class _Pattern {{ void _method() {{ {bare}; }} }}"),
            Self::Constructor => {
                format!("class _Pattern {{ void _method() {{ Object _result = {bare}; }} }}")
            }
            Self::Statement | Self::Block => {
                format!("class _Pattern {{ void _method() {{ {text} }} }}")
            }
            Self::StatementSequence => {
                if text.starts_with('{') && text.ends_with('}') {
                    format!("class _Pattern {{ void _method() {text} }}")
                } else {
                    format!("class _Pattern {{ void _method() {{ {text} }} }}")
                }
            }
            Self::Annotation => format!("{text}\nclass _Pattern {{}}"),
            Self::Import => format!("{bare};\nclass _Pattern {{}}"),
            Self::Field => format!("class _Pattern {{ {bare}; }}"),
            Self::MethodDeclaration => {
                let header = expand_variadic_parameters(text);
                if header.ends_with('}') {
                    format!("class _Pattern {{ {header} }}")
                } else {
                    let bare_header = header.trim_end_matches(';').trim_end();
                    format!("class _Pattern {{ {bare_header} {{ $_$; }} }}")
                }
            }
        }
    }

    fn extract(self, program: &SyntaxNode) -> Result<&SyntaxNode, String> {
        let class = program
            .child_of_kind("class_declaration")
            .ok_or("pattern did not parse as a declaration")?;
        let class_body = class.child_by_field("body");
        let method_body = class_body
            .and_then(|body| body.child_of_kind("method_declaration"))
            .and_then(|method| method.child_by_field("body"));

        match self {
            Self::Expression => method_body
                .and_then(|body| body.children().first())
                .and_then(|stmt| stmt.child_of_kind("assignment_expression"))
                .and_then(|assign| assign.child_by_field("right"))
                .ok_or_else(|| "pattern is not an expression".to_owned()),
            Self::MethodCall => method_body
                .and_then(|body| body.children().first())
                .and_then(|stmt| stmt.children().first())
                .filter(|node| node.kind() == "method_invocation")
                .ok_or_else(|| "pattern is not a method invocation".to_owned()),
            Self::Constructor => method_body
                .and_then(|body| body.children().first())
                .and_then(|decl| decl.child_by_field("declarator"))
                .and_then(|declarator| declarator.child_by_field("value"))
                .filter(|node| node.kind() == "object_creation_expression")
                .ok_or_else(|| "pattern is not a constructor invocation".to_owned()),
            Self::Statement => single_statement(method_body, |_| true, "statement"),
            Self::Block => single_statement(method_body, |node| node.kind() == "block", "block"),
            Self::StatementSequence => method_body
                .filter(|body| !body.children().is_empty())
                .ok_or_else(|| "statement sequence must contain at least one statement".to_owned()),
            Self::Annotation => class
                .child_of_kind("modifiers")
                .and_then(|modifiers| modifiers.children().first())
                .filter(|node| matches!(node.kind(), "annotation" | "marker_annotation"))
                .ok_or_else(|| "pattern is not an annotation".to_owned()),
            Self::Import => program
                .child_of_kind("import_declaration")
                .ok_or_else(|| "pattern is not an import declaration".to_owned()),
            Self::Field => class_body
                .and_then(|body| body.children().first())
                .filter(|node| node.kind() == "field_declaration")
                .ok_or_else(|| "pattern is not a field declaration".to_owned()),
            Self::MethodDeclaration => class_body
                .and_then(|body| body.children().first())
                .filter(|node| node.kind() == "method_declaration")
                .ok_or_else(|| "pattern is not a method declaration".to_owned()),
        }
    }
}

fn single_statement<'a>(
    body: Option<&'a SyntaxNode>,
    accept: impl Fn(&SyntaxNode) -> bool,
    what: &str,
) -> Result<&'a SyntaxNode, String> {
    match body.map(SyntaxNode::children) {
        Some([only]) if accept(only) => Ok(only),
        Some([_, _, ..]) => Err(format!("{what} pattern must contain exactly one statement")),
        _ => Err(format!("pattern is not a {what}")),
    }
}

/// Rewrites `($params$)` to `(Object... $params$)` so a variadic parameter
/// list parses as a declaration header.
fn expand_variadic_parameters(text: &str) -> String {
    let Some(open) = text.find('(') else {
        return text.to_owned();
    };
    let (head, tail) = text.split_at(open);
    let inner_and_rest = tail.get(1..).unwrap_or_default();
    let Some(close) = inner_and_rest.find(')') else {
        return text.to_owned();
    };
    let (inner, rest) = inner_and_rest.split_at(close);
    match parse_token(inner.trim()) {
        Some(token) if token.is_multi => format!("{head}(Object... {}{rest}", inner.trim()),
        _ => text.to_owned(),
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing a pattern kind name fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown pattern kind: '{0}'")]
pub struct PatternKindParseError(String);

impl FromStr for PatternKind {
    type Err = PatternKindParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalised = input.trim().to_ascii_lowercase().replace('_', "-");
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalised)
            .ok_or_else(|| PatternKindParseError(input.trim().to_owned()))
    }
}

/// Pattern text anchored to a node kind, with optional identity and type
/// constraint. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    value: String,
    kind: PatternKind,
    id: Option<String>,
    display_name: Option<String>,
    qualified_type: Option<String>,
}

impl Pattern {
    /// Creates a pattern.
    #[must_use]
    pub fn new(value: impl Into<String>, kind: PatternKind) -> Self {
        Self {
            value: value.into(),
            kind,
            id: None,
            display_name: None,
            qualified_type: None,
        }
    }

    /// Sets an identifier for the pattern.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets a human-readable name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Requires matches to resolve to the given fully-qualified type.
    #[must_use]
    pub fn with_qualified_type(mut self, qualified_type: impl Into<String>) -> Self {
        self.qualified_type = Some(qualified_type.into());
        self
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the anchoring kind.
    #[must_use]
    pub const fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Returns the pattern identifier, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the qualified type constraint, if any.
    #[must_use]
    pub fn qualified_type(&self) -> Option<&str> {
        self.qualified_type.as_deref()
    }

    /// Compiles the pattern into a reusable matcher input.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty, contains malformed
    /// placeholders, or does not parse as the pattern's kind.
    pub fn compile(&self) -> Result<CompiledPattern, SyntaxError> {
        let template = parse_pattern(&self.value, self.kind)?;
        Ok(CompiledPattern {
            pattern: self.clone(),
            template,
        })
    }
}

/// A compiled pattern: the source [`Pattern`] and its [`Template`].
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: Pattern,
    template: Template,
}

impl CompiledPattern {
    /// Returns the source pattern.
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the compiled template.
    #[must_use]
    pub const fn template(&self) -> &Template {
        &self.template
    }

    /// Returns the anchoring kind.
    #[must_use]
    pub const fn kind(&self) -> PatternKind {
        self.pattern.kind
    }
}

/// A template tree with placeholder leaves.
#[derive(Debug, Clone)]
pub struct Template {
    root: SyntaxNode,
    placeholders: Vec<PlaceholderInfo>,
}

impl Template {
    /// Returns the template's root node.
    #[must_use]
    pub const fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Returns the named placeholders in order of first appearance.
    #[must_use]
    pub fn placeholders(&self) -> &[PlaceholderInfo] {
        &self.placeholders
    }

    /// Looks up a placeholder by its binding key (`$x` or `$xs$`).
    #[must_use]
    pub fn placeholder(&self, key: &str) -> Option<&PlaceholderInfo> {
        let token = parse_token(key)?;
        self.placeholders
            .iter()
            .find(|info| info.name() == token.name && info.is_multi() == token.is_multi)
    }

    /// Returns whether two templates have identical structure.
    #[must_use]
    pub fn same_structure(&self, other: &Self) -> bool {
        self.root.same_structure(&other.root) && self.placeholders == other.placeholders
    }
}

/// Compiles pattern text for `kind` into a [`Template`].
///
/// # Errors
///
/// Returns [`SyntaxError::InvalidPlaceholder`] for malformed placeholder
/// tokens and [`SyntaxError::PatternCompileError`] when the text is empty,
/// fails to parse, or does not denote a node of `kind`.
pub fn parse_pattern(text: &str, kind: PatternKind) -> Result<Template, SyntaxError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SyntaxError::pattern_compile(text, "pattern text is empty"));
    }

    let scanned = scan(trimmed)?;
    let wrapped = kind.wrap(&scanned.text);
    let mut parser = Parser::new(SupportedLanguage::Java)?;
    let parsed = parser.parse(&wrapped)?;

    if let Some(error) = parsed.errors().into_iter().next() {
        return Err(SyntaxError::pattern_compile(
            trimmed,
            format!("{} near `{}`", error.message, error.context),
        ));
    }

    let tree = parsed.syntax_tree();
    let root = kind
        .extract(tree.root())
        .map_err(|message| SyntaxError::pattern_compile(trimmed, message))?
        .clone();

    check_multi_positions(&root, trimmed)?;
    tracing::trace!(pattern = trimmed, kind = %kind, "compiled pattern");

    Ok(Template {
        root,
        placeholders: scanned.placeholders,
    })
}

/// A placeholder occupying a template slot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot<'p> {
    pub(crate) token: PlaceholderToken<'p>,
    /// The slot is a statement (`$s;`) and only matches statements.
    pub(crate) is_statement: bool,
}

/// Classifies a template node as a placeholder slot.
///
/// Besides bare placeholder identifiers this recognises `$s;` statement
/// slots and the `Object... $ps$` spelling of variadic parameters.
pub(crate) fn placeholder_slot(node: &SyntaxNode) -> Option<Slot<'_>> {
    if is_placeholder_carrier(node.kind()) {
        let token = parse_token(node.text()?)?;
        return Some(Slot {
            token,
            is_statement: false,
        });
    }

    match node.kind() {
        "expression_statement" => match node.children() {
            [only] if is_placeholder_carrier(only.kind()) => Some(Slot {
                token: parse_token(only.text()?)?,
                is_statement: true,
            }),
            _ => None,
        },
        "spread_parameter" => {
            let name = node
                .child_of_kind("variable_declarator")?
                .child_by_field("name")?;
            let token = parse_token(name.text()?)?;
            token.is_multi.then_some(Slot {
                token,
                is_statement: false,
            })
        }
        _ => None,
    }
}

fn check_multi_positions(root: &SyntaxNode, pattern: &str) -> Result<(), SyntaxError> {
    match placeholder_slot(root) {
        Some(slot) if slot.token.is_multi => Err(misplaced_multi(slot.token)),
        Some(_) => Ok(()),
        None => check_list_children(root, pattern),
    }
}

fn check_list_children(node: &SyntaxNode, pattern: &str) -> Result<(), SyntaxError> {
    let mut seen_multi = false;
    for child in node.children() {
        match placeholder_slot(child) {
            Some(slot) if slot.token.is_multi => {
                if !is_list_kind(node.kind()) {
                    return Err(misplaced_multi(slot.token));
                }
                if seen_multi {
                    return Err(SyntaxError::pattern_compile(
                        pattern,
                        "a list may contain at most one multi-placeholder",
                    ));
                }
                seen_multi = true;
            }
            Some(_) => {}
            None => check_list_children(child, pattern)?,
        }
    }
    Ok(())
}

fn misplaced_multi(token: PlaceholderToken<'_>) -> SyntaxError {
    SyntaxError::invalid_placeholder(
        format!("${}$", token.name),
        "multi-placeholders may only appear in argument lists, parameter lists and statement sequences",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("$x + 0", PatternKind::Expression, "binary_expression")]
    #[case("$list.add($x)", PatternKind::MethodCall, "method_invocation")]
    #[case("new FileReader($path)", PatternKind::Constructor, "object_creation_expression")]
    #[case("return $x;", PatternKind::Statement, "return_statement")]
    #[case("{ $before$; return $x; }", PatternKind::Block, "block")]
    #[case("@Deprecated", PatternKind::Annotation, "marker_annotation")]
    #[case("@SuppressWarnings($w)", PatternKind::Annotation, "annotation")]
    #[case("import org.junit.Assert", PatternKind::Import, "import_declaration")]
    #[case("private $T $name", PatternKind::Field, "field_declaration")]
    #[case("void $name($params$)", PatternKind::MethodDeclaration, "method_declaration")]
    #[case("{ int $a = 1; int $b = 2; }", PatternKind::StatementSequence, "block")]
    fn patterns_compile_to_their_anchor(
        #[case] text: &str,
        #[case] kind: PatternKind,
        #[case] root_kind: &str,
    ) {
        let template = parse_pattern(text, kind).expect("compile");
        assert_eq!(template.root().kind(), root_kind);
    }

    #[rstest]
    #[case("@Before", PatternKind::Annotation)]
    #[case("import java.util.Vector;", PatternKind::Import)]
    #[case("new Vector<>()", PatternKind::Constructor)]
    #[case("{ $s$; }", PatternKind::Block)]
    #[case("return null;", PatternKind::Statement)]
    #[case("$s.equals(\"\")", PatternKind::MethodCall)]
    #[case("$x + 1", PatternKind::Expression)]
    fn kind_is_inferred_from_text(#[case] text: &str, #[case] expected: PatternKind) {
        assert_eq!(PatternKind::infer(text), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn empty_patterns_are_rejected(#[case] text: &str) {
        let error = parse_pattern(text, PatternKind::Expression).expect_err("empty");
        assert!(error.to_string().contains("empty"));
    }

    #[test]
    fn unparsable_pattern_names_the_pattern() {
        let error = parse_pattern("$x + + ", PatternKind::Expression).expect_err("broken");
        assert!(error.to_string().contains("$x + +"), "{error}");
    }

    #[rstest]
    #[case("$xs$ + 1", PatternKind::Expression)]
    #[case("$xs$", PatternKind::Expression)]
    fn multi_placeholders_outside_lists_are_rejected(#[case] text: &str, #[case] kind: PatternKind) {
        let error = parse_pattern(text, kind).expect_err("misplaced multi");
        assert!(matches!(error, SyntaxError::InvalidPlaceholder { .. }), "{error}");
    }

    #[test]
    fn two_multi_placeholders_in_one_list_are_rejected() {
        let error = parse_pattern("f($a$, $b$)", PatternKind::MethodCall).expect_err("ambiguous");
        assert!(error.to_string().contains("at most one"), "{error}");
    }

    #[test]
    fn template_records_constraints() {
        let template =
            parse_pattern("$s:StringLiteral.equals($x)", PatternKind::MethodCall).expect("compile");
        let info = template.placeholder("$s").expect("placeholder");
        assert_eq!(info.type_constraint(), Some("StringLiteral"));
        assert!(template.placeholder("$x").is_some());
        assert!(template.placeholder("$missing").is_none());
    }

    #[test]
    fn recompiling_pattern_text_yields_identical_template() {
        let first = parse_pattern("$a.foo($b, $rest$)", PatternKind::MethodCall).expect("first");
        let second = parse_pattern("$a.foo($b, $rest$)", PatternKind::MethodCall).expect("second");
        assert!(first.same_structure(&second));

        let different = parse_pattern("$a.bar($b, $rest$)", PatternKind::MethodCall).expect("bar");
        assert!(!first.same_structure(&different));
    }

    #[test]
    fn variadic_parameters_are_expanded() {
        assert_eq!(
            expand_variadic_parameters("void $m($ps$)"),
            "void $m(Object... $ps$)"
        );
        assert_eq!(expand_variadic_parameters("void m(int a)"), "void m(int a)");
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in PatternKind::all() {
            assert_eq!(kind.as_str().parse::<PatternKind>().ok(), Some(*kind));
        }
        assert_eq!("METHOD_CALL".parse::<PatternKind>().ok(), Some(PatternKind::MethodCall));
    }
}
