//! Type resolution for qualified-type pattern constraints.
//!
//! The engine does not type-check code. Patterns that carry a qualified type
//! consult a [`TypeResolver`] after structural matching succeeds, and a
//! match whose subject does not resolve to the expected type is discarded.

use crate::tree::{SyntaxNode, SyntaxTree};

/// Resolves the static type of an expression node.
pub trait TypeResolver: Send + Sync {
    /// Returns the fully-qualified type of `node`, if it can be determined.
    fn resolve(&self, tree: &SyntaxTree, node: &SyntaxNode) -> Option<String>;
}

impl<F> TypeResolver for F
where
    F: Fn(&SyntaxTree, &SyntaxNode) -> Option<String> + Send + Sync,
{
    fn resolve(&self, tree: &SyntaxTree, node: &SyntaxNode) -> Option<String> {
        self(tree, node)
    }
}

/// Resolves types from declarations visible in the same file.
///
/// Identifiers resolve to the declared type of the nearest preceding local
/// variable, parameter or field with that name, object creations to the
/// constructed type and string literals to `java.lang.String`. Simple type
/// names are qualified through the file's single-type imports, with the
/// common `java.lang` types implicit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredTypeResolver;

impl DeclaredTypeResolver {
    /// Creates the resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

const JAVA_LANG: &[&str] = &[
    "Boolean", "Byte", "Character", "Class", "Double", "Enum", "Exception", "Float", "Integer",
    "Iterable", "Long", "Math", "Number", "Object", "Runnable", "RuntimeException", "Short",
    "String", "StringBuffer", "StringBuilder", "System", "Thread", "Throwable",
];

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void",
];

const DECLARATION_KINDS: &[&str] = &[
    "local_variable_declaration",
    "field_declaration",
    "formal_parameter",
    "spread_parameter",
    "catch_formal_parameter",
    "enhanced_for_statement",
    "resource",
];

impl TypeResolver for DeclaredTypeResolver {
    fn resolve(&self, tree: &SyntaxTree, node: &SyntaxNode) -> Option<String> {
        let simple = match node.kind() {
            "object_creation_expression" | "cast_expression" | "array_creation_expression" => {
                type_text(tree, node.child_by_field("type")?)
            }
            "string_literal" | "text_block" => "String".to_owned(),
            "parenthesized_expression" => return self.resolve(tree, node.children().first()?),
            "identifier" => declared_type(tree, node)?,
            "field_access" => declared_type(tree, node.child_by_field("field")?)?,
            _ => return None,
        };
        Some(qualify(tree, &simple))
    }
}

/// Returns the node whose type a qualified-type constraint inspects: the
/// receiver of a method invocation, otherwise the node itself.
#[must_use]
pub fn type_subject(node: &SyntaxNode) -> &SyntaxNode {
    match node.kind() {
        "method_invocation" => node.child_by_field("object").unwrap_or(node),
        _ => node,
    }
}

/// Compares a resolved type with an expected one, ignoring type arguments
/// and whitespace.
#[must_use]
pub fn type_matches(resolved: &str, expected: &str) -> bool {
    erase_generics(resolved) == erase_generics(expected)
}

fn erase_generics(name: &str) -> String {
    let mut depth = 0_usize;
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            '<' => depth = depth.saturating_add(1),
            '>' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() => {}
            c if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn type_text(tree: &SyntaxTree, type_node: &SyntaxNode) -> String {
    erase_generics(tree.text_of(type_node))
}

fn declared_type(tree: &SyntaxTree, name: &SyntaxNode) -> Option<String> {
    let wanted = name.text()?;
    let position = name.span().start_byte;
    let mut preceding: Option<&SyntaxNode> = None;
    let mut any: Option<&SyntaxNode> = None;

    tree.walk(|node, _| {
        if !DECLARATION_KINDS.contains(&node.kind()) || !declares(node, wanted) {
            return;
        }
        any = any.or(Some(node));
        if node.span().start_byte < position {
            preceding = Some(node);
        }
    });

    let declaration = preceding.or(any)?;
    Some(type_text(tree, declaration.child_by_field("type")?))
}

fn declares(declaration: &SyntaxNode, wanted: &str) -> bool {
    let direct = declaration
        .child_by_field("name")
        .and_then(SyntaxNode::text)
        .is_some_and(|name| name == wanted);
    direct
        || declaration.children().iter().any(|child| {
            child.kind() == "variable_declarator"
                && child
                    .child_by_field("name")
                    .and_then(SyntaxNode::text)
                    .is_some_and(|name| name == wanted)
        })
}

fn qualify(tree: &SyntaxTree, simple: &str) -> String {
    if simple.contains('.') || PRIMITIVES.contains(&simple.trim_end_matches("[]")) {
        return simple.to_owned();
    }

    let (base, dims) = simple
        .find('[')
        .map_or((simple, ""), |index| simple.split_at(index));

    let imported = tree
        .root()
        .children()
        .iter()
        .filter(|node| node.kind() == "import_declaration")
        .filter(|node| node.child_of_kind("asterisk").is_none() && node.child_of_kind("static").is_none())
        .filter_map(|node| node.child_of_kind("scoped_identifier"))
        .map(|name| tree.text_of(name))
        .find(|path| path.rsplit('.').next() == Some(base));

    match imported {
        Some(path) => format!("{path}{dims}"),
        None if JAVA_LANG.contains(&base) => format!("java.lang.{base}{dims}"),
        None => simple.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::SupportedLanguage;
    use crate::parser::Parser;
    use rstest::rstest;

    fn tree(source: &str) -> SyntaxTree {
        Parser::new(SupportedLanguage::Java)
            .and_then(|mut parser| parser.parse_tree(source))
            .expect("parse")
    }

    fn resolve_identifier(tree: &SyntaxTree, name: &str) -> Option<String> {
        let node = tree
            .root()
            .descendants()
            .filter(|node| node.kind() == "identifier" && node.text() == Some(name))
            .last()?;
        DeclaredTypeResolver::new().resolve(tree, node)
    }

    const SOURCE: &str = r#"
import java.util.Vector;
import java.util.List;

class Sample {
    private List<String> names;

    void run(int count) {
        Vector<String> items = new Vector<>();
        String label = "x";
        items.add(label);
        names.size();
        use(count);
    }
}
"#;

    #[rstest]
    #[case("items", Some("java.util.Vector"))]
    #[case("names", Some("java.util.List"))]
    #[case("label", Some("java.lang.String"))]
    #[case("count", Some("int"))]
    #[case("missing", None)]
    fn identifiers_resolve_to_declared_types(#[case] name: &str, #[case] expected: Option<&str>) {
        let tree = tree(SOURCE);
        assert_eq!(resolve_identifier(&tree, name).as_deref(), expected);
    }

    #[test]
    fn object_creation_resolves_to_constructed_type() {
        let tree = tree(SOURCE);
        let creation = tree
            .root()
            .descendants()
            .find(|node| node.kind() == "object_creation_expression")
            .expect("creation");
        assert_eq!(
            DeclaredTypeResolver::new().resolve(&tree, creation).as_deref(),
            Some("java.util.Vector")
        );
    }

    #[test]
    fn receiver_is_the_subject_of_a_call() {
        let tree = tree(SOURCE);
        let call = tree
            .root()
            .descendants()
            .find(|node| node.kind() == "method_invocation")
            .expect("call");
        assert_eq!(tree.text_of(type_subject(call)), "items");
    }

    #[rstest]
    #[case("java.util.List<String>", "java.util.List", true)]
    #[case("java.util.Map<K, List<V>>", "java.util.Map", true)]
    #[case("java.util.List", "java.util.Vector", false)]
    fn generics_are_ignored_when_comparing(
        #[case] resolved: &str,
        #[case] expected: &str,
        #[case] matches: bool,
    ) {
        assert_eq!(type_matches(resolved, expected), matches);
    }
}
