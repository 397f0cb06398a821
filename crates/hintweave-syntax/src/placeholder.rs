//! Placeholder model and pattern-text scanning.
//!
//! Patterns spell placeholders as `$name` (exactly one node) or `$name$`
//! (zero or more sibling nodes), optionally followed by a `:Type`
//! constraint. Both spellings are valid Java identifiers once the constraint
//! is removed, so a scanned pattern can be handed to the host parser as-is.

use crate::error::SyntaxError;

/// Identity, multiplicity and type constraint of one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderInfo {
    name: String,
    type_constraint: Option<String>,
    is_multi: bool,
}

impl PlaceholderInfo {
    /// Creates a single-node placeholder.
    #[must_use]
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_constraint: None,
            is_multi: false,
        }
    }

    /// Creates a multi-node placeholder.
    #[must_use]
    pub fn multi(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_constraint: None,
            is_multi: true,
        }
    }

    /// Attaches a type constraint such as `StringLiteral`.
    #[must_use]
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.type_constraint = Some(constraint.into());
        self
    }

    /// Returns the bare name, without `$` markers.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type constraint, if any.
    #[must_use]
    pub fn type_constraint(&self) -> Option<&str> {
        self.type_constraint.as_deref()
    }

    /// Returns whether the placeholder matches a run of sibling nodes.
    #[must_use]
    pub const fn is_multi(&self) -> bool {
        self.is_multi
    }

    /// Returns the binding key as written in patterns: `$name` or `$name$`.
    #[must_use]
    pub fn key(&self) -> String {
        placeholder_key(&self.name, self.is_multi)
    }
}

/// Key under which the whole matched node is bound.
pub const WHOLE_MATCH: &str = "$_";

/// Key under which the nearest enclosing type declaration is bound.
pub const ENCLOSING_DECLARATION: &str = "$this";

/// A placeholder reference recognised in template or replacement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlaceholderToken<'a> {
    pub(crate) name: &'a str,
    pub(crate) is_multi: bool,
}

impl PlaceholderToken<'_> {
    pub(crate) fn is_wildcard(self) -> bool {
        self.name == "_"
    }
}

pub(crate) fn placeholder_key(name: &str, is_multi: bool) -> String {
    if is_multi {
        format!("${name}$")
    } else {
        format!("${name}")
    }
}

/// Parses identifier text such as `$x` or `$args$` into a placeholder token.
pub(crate) fn parse_token(text: &str) -> Option<PlaceholderToken<'_>> {
    let rest = text.strip_prefix('$')?;
    let (name, is_multi) = match rest.strip_suffix('$') {
        Some(inner) => (inner, true),
        None => (rest, false),
    };
    is_identifier(name).then_some(PlaceholderToken { name, is_multi })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

const fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

const fn is_type_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Pattern text with constraints removed, plus the placeholder table.
#[derive(Debug)]
pub(crate) struct ScannedPattern {
    pub(crate) text: String,
    pub(crate) placeholders: Vec<PlaceholderInfo>,
}

/// Scans pattern text for placeholders.
///
/// String and character literals are skipped. A `$` that continues an
/// identifier (`Outer$Inner`) is ordinary Java.
pub(crate) fn scan(pattern: &str) -> Result<ScannedPattern, SyntaxError> {
    let mut scanner = Scanner {
        chars: pattern.char_indices().peekable(),
        out: String::with_capacity(pattern.len()),
        placeholders: Vec::new(),
        previous: None,
    };
    scanner.run()?;
    Ok(ScannedPattern {
        text: scanner.out,
        placeholders: scanner.placeholders,
    })
}

struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    out: String,
    placeholders: Vec<PlaceholderInfo>,
    previous: Option<char>,
}

impl Scanner<'_> {
    fn run(&mut self) -> Result<(), SyntaxError> {
        while let Some((_, c)) = self.chars.next() {
            match c {
                '"' | '\'' => self.copy_literal(c),
                '$' if !self.previous.is_some_and(is_identifier_char) => self.placeholder()?,
                _ => self.emit(c),
            }
        }
        Ok(())
    }

    fn emit(&mut self, c: char) {
        self.out.push(c);
        self.previous = Some(c);
    }

    fn copy_literal(&mut self, quote: char) {
        self.emit(quote);
        let mut escaped = false;
        while let Some((_, c)) = self.chars.next() {
            self.emit(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                break;
            }
        }
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some((_, c)) = self.chars.peek().copied() {
            if !accept(c) {
                break;
            }
            taken.push(c);
            self.chars.next();
        }
        taken
    }

    fn placeholder(&mut self) -> Result<(), SyntaxError> {
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        if name.is_empty() || !is_identifier(&name) {
            return Err(SyntaxError::invalid_placeholder(
                format!("${name}"),
                "`$` must be followed by an identifier",
            ));
        }

        let is_multi = self.chars.next_if(|(_, c)| *c == '$').is_some();
        let constraint = self.constraint();

        if name == "this" {
            return Err(SyntaxError::invalid_placeholder(
                "$this",
                "`$this` is bound implicitly and cannot be used in a pattern",
            ));
        }

        let token = placeholder_key(&name, is_multi);
        self.out.push_str(&token);
        self.previous = Some(if is_multi { '$' } else { 'x' });

        if name == "_" {
            return Ok(());
        }
        self.record(name, is_multi, constraint, &token)
    }

    /// Consumes `:Type` when the colon is immediately followed by an
    /// upper-case letter, leaving ternaries, labels and `::` alone.
    fn constraint(&mut self) -> Option<String> {
        let mut lookahead = self.chars.clone();
        let (_, colon) = lookahead.next()?;
        let (_, first) = lookahead.next()?;
        if colon != ':' || !first.is_ascii_uppercase() {
            return None;
        }
        self.chars.next();
        let mut constraint = self.take_while(is_type_char);
        while let Some(segment) = self.nested_type() {
            constraint.push('.');
            constraint.push_str(&segment);
        }
        Some(constraint)
    }

    /// Consumes `.Inner` after a constraint when the segment is upper-case
    /// and not called, so `$s:String.length()` keeps the member access.
    fn nested_type(&mut self) -> Option<String> {
        let mut lookahead = self.chars.clone();
        lookahead.next_if(|(_, c)| *c == '.')?;
        lookahead.peek().filter(|(_, c)| c.is_ascii_uppercase())?;
        let mut segment = String::new();
        while let Some((_, c)) = lookahead.next_if(|(_, c)| is_type_char(*c)) {
            segment.push(c);
        }
        if lookahead.peek().is_some_and(|(_, c)| *c == '(') {
            return None;
        }
        self.chars = lookahead;
        Some(segment)
    }

    fn record(
        &mut self,
        name: String,
        is_multi: bool,
        constraint: Option<String>,
        token: &str,
    ) -> Result<(), SyntaxError> {
        let existing = self
            .placeholders
            .iter_mut()
            .find(|info| info.name == name && info.is_multi == is_multi);

        match (existing, constraint) {
            (None, constraint) => {
                self.placeholders.push(PlaceholderInfo {
                    name,
                    type_constraint: constraint,
                    is_multi,
                });
            }
            (Some(info), Some(next)) => match info.type_constraint.as_deref() {
                None => info.type_constraint = Some(next),
                Some(current) if current == next => {}
                Some(current) => {
                    return Err(SyntaxError::invalid_placeholder(
                        token,
                        format!("conflicting type constraints `{current}` and `{next}`"),
                    ));
                }
            },
            (Some(_), None) => {}
        }
        Ok(())
    }
}

/// Finds every placeholder key referenced by replacement text.
pub(crate) fn referenced_keys(text: &str) -> Vec<String> {
    let mut keys = Vec::new();
    substitute(text, |token| {
        keys.push(placeholder_key(token.name, token.is_multi));
        None
    });
    keys
}

/// Rewrites every placeholder token in `text` through `lookup`, leaving
/// tokens the lookup does not know verbatim. String literals are not
/// special here: replacements are free text.
pub(crate) fn substitute(
    text: &str,
    mut lookup: impl FnMut(PlaceholderToken<'_>) -> Option<String>,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut previous: Option<char> = None;

    while let Some(index) = rest.find('$') {
        let (before, tail) = rest.split_at(index);
        out.push_str(before);
        if let Some(last) = before.chars().last() {
            previous = Some(last);
        }

        let body = tail.get(1..).unwrap_or_default();
        let name_len = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(body.len());
        let name = body.get(..name_len).unwrap_or_default();

        if name.is_empty() || !is_identifier(name) || previous.is_some_and(is_identifier_char) {
            out.push('$');
            rest = body;
            previous = Some('$');
            continue;
        }

        let after_name = body.get(name_len..).unwrap_or_default();
        let is_multi = after_name.starts_with('$');
        let consumed = name_len.saturating_add(usize::from(is_multi));
        let token_text = tail.get(..consumed.saturating_add(1)).unwrap_or_default();

        match lookup(PlaceholderToken { name, is_multi }) {
            Some(value) => out.push_str(&value),
            None => out.push_str(token_text),
        }
        rest = body.get(consumed..).unwrap_or_default();
        previous = token_text.chars().last();
    }
    out.push_str(rest);
    out
}
