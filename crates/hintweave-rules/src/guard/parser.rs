//! Recursive-descent parser for guard text.

use crate::error::GuardParseError;

use super::{GuardArg, GuardExpression};

/// Parses guard text into an expression.
///
/// A bare `$x` is sugar for `matchesAny($x)` and `$x instanceof T` for
/// `instanceof($x, T)`.
///
/// # Errors
///
/// Returns an error for blank input, unbalanced parentheses, unterminated
/// strings and trailing input.
pub fn parse_guard(text: &str) -> Result<GuardExpression, GuardParseError> {
    let input = text.trim();
    if input.is_empty() {
        return Err(GuardParseError::new(0, "guard expression is empty"));
    }

    let mut parser = GuardParser { input, pos: 0 };
    let expression = parser.or_expr()?;
    parser.skip_whitespace();
    match parser.peek() {
        Some(c) => Err(parser.error(format!("unexpected character '{c}'"))),
        None => Ok(expression),
    }
}

struct GuardParser<'a> {
    input: &'a str,
    pos: usize,
}

impl GuardParser<'_> {
    fn or_expr(&mut self) -> Result<GuardExpression, GuardParseError> {
        let mut left = self.and_expr()?;
        while self.eat("||") {
            let right = self.and_expr()?;
            left = GuardExpression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<GuardExpression, GuardParseError> {
        let mut left = self.unary()?;
        while self.eat("&&") {
            let right = self.unary()?;
            left = GuardExpression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<GuardExpression, GuardParseError> {
        self.skip_whitespace();
        if self.eat("!") {
            let operand = self.unary()?;
            return Ok(GuardExpression::Not(Box::new(operand)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<GuardExpression, GuardParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("unexpected end of expression")),
            Some('(') => {
                self.bump();
                let inner = self.or_expr()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some('$') => self.placeholder_primary(),
            Some(_) => self.call(),
        }
    }

    fn placeholder_primary(&mut self) -> Result<GuardExpression, GuardParseError> {
        let key = self.placeholder()?;
        self.skip_whitespace();
        if !self.keyword("instanceof") {
            return Ok(GuardExpression::call(
                "matchesAny",
                vec![GuardArg::Placeholder(key)],
            ));
        }

        self.skip_whitespace();
        let mut type_name = self.name();
        if type_name.is_empty() {
            return Err(self.error("expected a type name after 'instanceof'"));
        }
        self.skip_whitespace();
        if self.eat("[]") {
            type_name.push_str("[]");
        }
        Ok(GuardExpression::call(
            "instanceof",
            vec![GuardArg::Placeholder(key), GuardArg::Name(type_name)],
        ))
    }

    fn call(&mut self) -> Result<GuardExpression, GuardParseError> {
        let name = self.name();
        if name.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        self.skip_whitespace();
        if !self.eat("(") {
            return Ok(GuardExpression::call(name, Vec::new()));
        }

        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() != Some(')') {
            loop {
                args.push(self.arg()?);
                self.skip_whitespace();
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(')')?;
        Ok(GuardExpression::call(name, args))
    }

    fn arg(&mut self) -> Result<GuardArg, GuardParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("expected an argument")),
            Some('"') => self.string().map(GuardArg::Str),
            Some('$') => self.placeholder().map(GuardArg::Placeholder),
            Some(c) if c.is_ascii_digit() => {
                Ok(GuardArg::Number(self.take_while(|d| d.is_ascii_digit() || d == '.')))
            }
            Some(c) if is_identifier_start(c) => {
                let mut name = self.name();
                if self.eat("[]") {
                    name.push_str("[]");
                }
                Ok(GuardArg::Name(name))
            }
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
        }
    }

    fn placeholder(&mut self) -> Result<String, GuardParseError> {
        let start = self.pos;
        self.bump();
        let name = self.take_while(is_identifier_part);
        if name.is_empty() {
            return Err(GuardParseError::new(
                start,
                "'$' must be followed by a placeholder name",
            ));
        }
        let multi = self.peek() == Some('$');
        if multi {
            self.bump();
        }
        Ok(if multi {
            format!("${name}$")
        } else {
            format!("${name}")
        })
    }

    fn string(&mut self) -> Result<String, GuardParseError> {
        let start = self.pos;
        self.bump();
        let mut content = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(GuardParseError::new(start, "unterminated string literal"));
                }
                Some('"') => return Ok(content),
                Some('\\') => match self.bump() {
                    Some('"') => content.push('"'),
                    Some(other) => {
                        content.push('\\');
                        content.push(other);
                    }
                    None => {
                        return Err(GuardParseError::new(start, "unterminated string literal"));
                    }
                },
                Some(c) => content.push(c),
            }
        }
    }

    /// Reads an identifier, including the dots of a qualified name.
    fn name(&mut self) -> String {
        match self.peek() {
            Some(c) if is_identifier_start(c) => {
                self.take_while(|part| is_identifier_part(part) || part == '.')
            }
            _ => String::new(),
        }
    }

    fn keyword(&mut self, keyword: &str) -> bool {
        let Some(after) = self.rest().strip_prefix(keyword) else {
            return false;
        };
        if after.chars().next().is_some_and(is_identifier_part) {
            return false;
        }
        self.pos = self.pos.saturating_add(keyword.len());
        true
    }

    fn expect(&mut self, close: char) -> Result<(), GuardParseError> {
        self.skip_whitespace();
        if self.peek() == Some(close) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected '{close}'")))
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.pos = self.pos.saturating_add(token.len());
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(c) = self.peek().filter(|c| accept(*c)) {
            taken.push(c);
            self.bump();
        }
        taken
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn rest(&self) -> &str {
        self.input.get(self.pos..).unwrap_or_default()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos = self.pos.saturating_add(c.len_utf8());
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> GuardParseError {
        GuardParseError::new(self.pos, message)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
