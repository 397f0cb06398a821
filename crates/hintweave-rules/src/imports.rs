//! Import changes attached to a rule.

/// Imports a rewrite adds, removes or retargets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportDirective {
    add_imports: Vec<String>,
    remove_imports: Vec<String>,
    add_static_imports: Vec<String>,
    remove_static_imports: Vec<String>,
    replace_static_imports: Vec<(String, String)>,
}

impl ImportDirective {
    /// Creates an empty directive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an import, ignoring duplicates.
    pub fn add_import(&mut self, name: impl Into<String>) {
        push_unique(&mut self.add_imports, name.into());
    }

    /// Removes an import, ignoring duplicates.
    pub fn remove_import(&mut self, name: impl Into<String>) {
        push_unique(&mut self.remove_imports, name.into());
    }

    /// Adds a static import, ignoring duplicates.
    pub fn add_static_import(&mut self, name: impl Into<String>) {
        push_unique(&mut self.add_static_imports, name.into());
    }

    /// Removes a static import, ignoring duplicates.
    pub fn remove_static_import(&mut self, name: impl Into<String>) {
        push_unique(&mut self.remove_static_imports, name.into());
    }

    /// Retargets static imports from `old_owner` to `new_owner`. A second
    /// call for the same owner replaces the target.
    pub fn replace_static_import(&mut self, old_owner: impl Into<String>, new_owner: impl Into<String>) {
        let from = old_owner.into();
        let to = new_owner.into();
        match self
            .replace_static_imports
            .iter_mut()
            .find(|(owner, _)| *owner == from)
        {
            Some((_, target)) => *target = to,
            None => self.replace_static_imports.push((from, to)),
        }
    }

    /// Returns the imports to add.
    #[must_use]
    pub fn add_imports(&self) -> &[String] {
        &self.add_imports
    }

    /// Returns the imports to remove.
    #[must_use]
    pub fn remove_imports(&self) -> &[String] {
        &self.remove_imports
    }

    /// Returns the static imports to add.
    #[must_use]
    pub fn add_static_imports(&self) -> &[String] {
        &self.add_static_imports
    }

    /// Returns the static imports to remove.
    #[must_use]
    pub fn remove_static_imports(&self) -> &[String] {
        &self.remove_static_imports
    }

    /// Returns `(old_owner, new_owner)` pairs in declaration order.
    #[must_use]
    pub fn replace_static_imports(&self) -> &[(String, String)] {
        &self.replace_static_imports
    }

    /// Returns `true` when the directive changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add_imports.is_empty()
            && self.remove_imports.is_empty()
            && self.add_static_imports.is_empty()
            && self.remove_static_imports.is_empty()
            && self.replace_static_imports.is_empty()
    }

    /// Adds every entry of `other` to this directive.
    pub fn merge(&mut self, other: &Self) {
        for name in &other.add_imports {
            self.add_import(name.clone());
        }
        for name in &other.remove_imports {
            self.remove_import(name.clone());
        }
        for name in &other.add_static_imports {
            self.add_static_import(name.clone());
        }
        for name in &other.remove_static_imports {
            self.remove_static_import(name.clone());
        }
        for (old_owner, new_owner) in &other.replace_static_imports {
            self.replace_static_import(old_owner.clone(), new_owner.clone());
        }
    }

    /// Infers `addImport`s from the fully-qualified type names written in
    /// replacement text, such as `java.util.Objects` in
    /// `java.util.Objects.equals($a, $b)`.
    ///
    /// A name qualifies when one or more lower-case package segments are
    /// followed by an upper-case type segment. Words containing
    /// placeholders are ignored.
    #[must_use]
    pub fn detect_from_replacement(replacement: &str) -> Self {
        let mut directive = Self::new();
        let words = replacement.split(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$')));
        for word in words.filter(|word| !word.contains('$')) {
            if let Some(name) = qualified_type_prefix(word) {
                directive.add_import(name);
            }
        }
        directive
    }
}

/// Returns the `package.Type` prefix of a dotted word.
fn qualified_type_prefix(word: &str) -> Option<String> {
    let mut package = Vec::new();
    for segment in word.split('.') {
        let mut chars = segment.chars();
        let first = chars.next()?;
        if first.is_ascii_lowercase() {
            let valid = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
            if !valid {
                return None;
            }
            package.push(segment);
        } else if first.is_ascii_uppercase() && !package.is_empty() {
            package.push(segment);
            return Some(package.join("."));
        } else {
            return None;
        }
    }
    None
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !names.contains(&name) {
        names.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("java.util.Objects.equals($a, $b)", &["java.util.Objects"])]
    #[case("java.util.List.of($items$)", &["java.util.List"])]
    #[case("new java.util.ArrayList<java.lang.String>()", &["java.util.ArrayList", "java.lang.String"])]
    #[case("$list.isEmpty()", &[])]
    #[case("foo.bar()", &[])]
    #[case("String.valueOf($x)", &[])]
    #[case("java.util.Objects.hash(a) + java.util.Objects.hash(b)", &["java.util.Objects"])]
    fn detects_qualified_types(#[case] replacement: &str, #[case] expected: &[&str]) {
        let detected = ImportDirective::detect_from_replacement(replacement);
        assert_eq!(detected.add_imports(), expected);
    }

    #[test]
    fn merge_keeps_entries_unique() {
        let mut left = ImportDirective::new();
        left.add_import("java.util.List");
        left.replace_static_import("org.junit.Assert", "org.junit.jupiter.api.Assertions");

        let mut right = ImportDirective::new();
        right.add_import("java.util.List");
        right.add_import("java.util.Map");
        right.remove_static_import("org.junit.Assert.assertEquals");
        right.replace_static_import("org.junit.Assert", "org.assertj.core.api.Assertions");

        left.merge(&right);
        assert_eq!(left.add_imports(), ["java.util.List", "java.util.Map"]);
        assert_eq!(left.remove_static_imports(), ["org.junit.Assert.assertEquals"]);
        assert_eq!(
            left.replace_static_imports(),
            [("org.junit.Assert".to_owned(), "org.assertj.core.api.Assertions".to_owned())]
        );
    }

    #[test]
    fn new_directive_is_empty() {
        assert!(ImportDirective::new().is_empty());
        let mut directive = ImportDirective::new();
        directive.remove_import("java.util.Vector");
        assert!(!directive.is_empty());
    }
}
