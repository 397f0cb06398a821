//! Parser for `.hint` rule files.
//!
//! A file is a sequence of `<!key: value>` metadata lines and rule blocks.
//! Each block ends with a line holding only `;;`:
//!
//! ```text
//! <!id: collections>
//! <!tags: collections, idiom>
//!
//! "Use isEmpty() instead of comparing size() with zero":
//! $c.size() == 0
//! => $c.isEmpty()
//! ;;
//! ```
//!
//! A block is an optional quoted description ending in `":`, the source
//! pattern with an optional `:: guard`, then any number of
//! `=> replacement [:: guard | :: otherwise]` alternatives and import
//! directives. `//` and `/* */` comments are removed first; string and
//! character literals are left alone.

use hintweave_syntax::{CompiledPattern, Pattern, PatternKind, SyntaxError, validate_replacement};

use crate::error::HintParseError;
use crate::guard::{GuardExpression, parse_guard};
use crate::hint_file::HintFile;
use crate::imports::ImportDirective;
use crate::rule::{RewriteAlternative, TransformationRule};

const OTHERWISE: &str = "otherwise";
const TERMINATOR: &str = ";;";

/// A non-blank line with its one-based number.
type Line<'a> = (usize, &'a str);

/// Parses the text of a `.hint` file.
///
/// Every source pattern and replacement is compiled; one bad rule fails
/// the whole file.
///
/// # Errors
///
/// Returns [`HintParseError`] for blank input, an unterminated block, an
/// unknown or malformed metadata line, metadata after the first rule, a
/// malformed directive, guard or pattern, or a second unconditional
/// alternative.
pub fn parse_hint_file(text: &str) -> Result<HintFile, HintParseError> {
    if text.trim().is_empty() {
        return Err(HintParseError::Empty);
    }

    let stripped = strip_comments(text);
    let mut lines = stripped
        .iter()
        .enumerate()
        .map(|(index, line)| (index.saturating_add(1), line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let mut file = HintFile::new();
    while let Some((number, line)) = lines.next() {
        if line.starts_with("<!") {
            if !file.rules().is_empty() {
                return Err(HintParseError::metadata_after_rule(line, number));
            }
            parse_metadata(&mut file, line, number)?;
            continue;
        }
        if line == TERMINATOR {
            continue;
        }

        let mut block = Vec::new();
        let mut terminated = false;
        for next in lines.by_ref() {
            if next.1 == TERMINATOR {
                terminated = true;
                break;
            }
            block.push(next);
        }
        if !terminated {
            return Err(HintParseError::unterminated(number));
        }

        let rule_id = file
            .id()
            .map(|id| format!("{id}:{}", file.rules().len().saturating_add(1)));
        let rule = parse_rule((number, line), &block, rule_id)?;
        file.add_rule(rule);
    }

    tracing::debug!(
        id = file.id().unwrap_or_default(),
        rules = file.rules().len(),
        "parsed hint file"
    );
    Ok(file)
}

fn parse_metadata(file: &mut HintFile, line: &str, number: usize) -> Result<(), HintParseError> {
    let Some(inner) = line
        .strip_prefix("<!")
        .and_then(|rest| rest.strip_suffix('>'))
    else {
        return Err(HintParseError::malformed_metadata(line, "missing '>'", number));
    };
    let Some((raw_key, raw_value)) = inner.split_once(':') else {
        return Err(HintParseError::malformed_metadata(line, "missing ':'", number));
    };
    let (key, value) = (raw_key.trim(), raw_value.trim());
    if value.is_empty() {
        return Err(HintParseError::malformed_metadata(line, "missing value", number));
    }

    match key {
        "id" => file.set_id(value),
        "description" => file.set_description(value),
        "severity" => file.set_severity(value),
        "minLanguageVersion" | "minJavaVersion" => {
            let version = value
                .parse()
                .map_err(|_| HintParseError::invalid_min_version(value, number))?;
            file.set_min_language_version(version);
        }
        "tags" => file.set_tags(comma_list(value)),
        "include" => {
            for id in comma_list(value) {
                file.add_include(id);
            }
        }
        other => return Err(HintParseError::unknown_metadata_key(other, number)),
    }
    Ok(())
}

fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_rule(
    first: Line<'_>,
    rest: &[Line<'_>],
    rule_id: Option<String>,
) -> Result<TransformationRule, HintParseError> {
    let mut remaining = rest.iter().copied();
    let (description, (source_number, source_line)) = match description_of(first.1) {
        Some(description) => {
            let source = remaining
                .next()
                .ok_or_else(|| HintParseError::missing_pattern(first.0))?;
            (Some(description), source)
        }
        None => (None, first),
    };

    let (pattern_text, guard_text) = split_guard(source_line);
    let compiled = compile_source(pattern_text.trim(), source_number, rule_id)?;
    let mut rule = TransformationRule::new(compiled);
    if let Some(text) = description {
        rule = rule.with_description(text);
    }
    if let Some(guard) = guard_text {
        rule = rule.with_source_guard(guard_at(guard, source_number)?);
    }

    let mut imports = ImportDirective::new();
    let mut alternatives = Vec::new();
    let mut seen_otherwise = false;
    for (number, line) in remaining {
        if apply_directive(&mut imports, line, number)? {
            continue;
        }
        let Some(content) = line.strip_prefix("=>") else {
            return Err(HintParseError::unexpected_line(line, number));
        };

        let alternative = parse_alternative(content, number, rule.compiled())?;
        if alternative.is_unconditional() {
            if seen_otherwise {
                return Err(HintParseError::duplicate_otherwise(number));
            }
            seen_otherwise = true;
        }
        alternatives.push(alternative);
    }

    if imports.is_empty() {
        for alternative in &alternatives {
            imports.merge(&ImportDirective::detect_from_replacement(
                alternative.replacement(),
            ));
        }
    }

    Ok(alternatives
        .into_iter()
        .fold(rule, TransformationRule::with_alternative)
        .with_imports(imports))
}

/// Returns the description of a `"text":` line.
fn description_of(line: &str) -> Option<&str> {
    line.strip_prefix('"')?.strip_suffix("\":")
}

fn parse_alternative(
    content: &str,
    number: usize,
    source: &CompiledPattern,
) -> Result<RewriteAlternative, HintParseError> {
    let (raw_replacement, guard_text) = split_guard(content);
    let replacement = raw_replacement.trim();
    if replacement.is_empty() {
        return Err(HintParseError::pattern(
            number,
            SyntaxError::invalid_replacement("replacement is empty"),
        ));
    }
    validate_replacement(replacement, source.template())
        .map_err(|error| HintParseError::pattern(number, error))?;

    match guard_text.map(str::trim) {
        None | Some(OTHERWISE) => Ok(RewriteAlternative::otherwise(replacement)),
        Some(guard) => Ok(RewriteAlternative::when(replacement, guard_at(guard, number)?)),
    }
}

fn guard_at(text: &str, number: usize) -> Result<GuardExpression, HintParseError> {
    parse_guard(text).map_err(|error| HintParseError::guard(number, error))
}

/// Compiles a source pattern with an inferred kind. Call-shaped text that
/// is not a bare invocation, such as `!$o.isPresent()`, falls back to an
/// expression.
fn compile_source(
    text: &str,
    number: usize,
    id: Option<String>,
) -> Result<CompiledPattern, HintParseError> {
    let build = |kind| {
        let pattern = Pattern::new(text, kind);
        match &id {
            Some(rule_id) => pattern.with_id(rule_id.clone()),
            None => pattern,
        }
    };

    let kind = PatternKind::infer(text);
    match build(kind).compile() {
        Ok(compiled) => Ok(compiled),
        Err(error) if kind == PatternKind::MethodCall => build(PatternKind::Expression)
            .compile()
            .map_err(|_| HintParseError::pattern(number, error)),
        Err(error) => Err(HintParseError::pattern(number, error)),
    }
}

/// Applies an import directive line. Returns `false` when the line is not
/// a directive.
fn apply_directive(
    imports: &mut ImportDirective,
    line: &str,
    number: usize,
) -> Result<bool, HintParseError> {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(false);
    };
    let operands: Vec<&str> = words.collect();

    let single = |given: &[&str]| match given {
        [name] => Ok((*name).to_owned()),
        _ => Err(HintParseError::malformed_directive(
            keyword,
            "expected one qualified name",
            number,
        )),
    };

    match keyword {
        "addImport" => imports.add_import(single(&operands)?),
        "removeImport" => imports.remove_import(single(&operands)?),
        "addStaticImport" => imports.add_static_import(single(&operands)?),
        "removeStaticImport" => imports.remove_static_import(single(&operands)?),
        "replaceStaticImport" => match operands.as_slice() {
            [old_owner, new_owner] => imports.replace_static_import(*old_owner, *new_owner),
            _ => {
                return Err(HintParseError::malformed_directive(
                    keyword,
                    "expected an old and a new owner",
                    number,
                ));
            }
        },
        _ => return Ok(false),
    }
    Ok(true)
}

/// Splits `text :: guard` at the first `::` outside literals and brackets.
fn split_guard(text: &str) -> (&str, Option<&str>) {
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (index, c) in text.char_indices() {
        if let Some(open) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == open => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth = depth.saturating_add(1),
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                let (head, tail) = text.split_at(index);
                if let Some(guard) = tail.strip_prefix("::") {
                    return (head, Some(guard));
                }
            }
            _ => {}
        }
    }
    (text, None)
}

/// Removes `//` and `/* */` comments, keeping one entry per input line so
/// line numbers survive.
fn strip_comments(text: &str) -> Vec<String> {
    let mut in_block = false;
    text.lines()
        .map(|raw| {
            let mut out = String::with_capacity(raw.len());
            let mut chars = raw.chars().peekable();
            let mut quote: Option<char> = None;
            while let Some(c) = chars.next() {
                if in_block {
                    if c == '*' && chars.next_if_eq(&'/').is_some() {
                        in_block = false;
                    }
                    continue;
                }
                if let Some(open) = quote {
                    out.push(c);
                    if c == '\\' {
                        out.extend(chars.next());
                    } else if c == open {
                        quote = None;
                    }
                    continue;
                }
                match c {
                    '/' if chars.next_if_eq(&'/').is_some() => break,
                    '/' if chars.next_if_eq(&'*').is_some() => in_block = true,
                    '"' | '\'' => {
                        quote = Some(c);
                        out.push(c);
                    }
                    _ => out.push(c),
                }
            }
            out
        })
        .collect()
}
