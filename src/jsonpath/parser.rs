//! JSONPath query string parser.
//!
//! The parser reads the query once, left to right, deciding each step from
//! its first one or two characters. Positions in errors are byte offsets.

use super::ast::{
    Anchor, CompareOp, FilterExpr, FilterPath, JsonPath, Operand, Selector, Slice, Step,
};
use super::error::ParseError;
use crate::document::node::JsonValue;

/// Deepest nesting of parentheses, `!`, and `[$...]` accepted in one query.
const MAX_NESTING: usize = 64;

/// Word operators from other JSONPath dialects that are rejected explicitly.
const UNSUPPORTED_WORD_OPERATORS: &[&str] = &[
    "in", "nin", "subsetof", "anyof", "noneof", "size", "empty", "contains",
];

/// Parser for JSONPath query strings.
pub struct Parser<'a> {
    input: &'a str,
    position: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given query string.
    pub fn new(query: &'a str) -> Self {
        Self {
            input: query,
            position: 0,
            depth: 0,
        }
    }

    /// Parses the query string into a JsonPath.
    ///
    /// # Example
    ///
    /// ```
    /// use pathquill::jsonpath::ast::Step;
    /// use pathquill::jsonpath::parser::Parser;
    ///
    /// let path = Parser::parse("$..price").unwrap();
    /// assert_eq!(
    ///     path.steps,
    ///     vec![Step::Root, Step::RecursiveDescent, Step::Child("price".to_string())]
    /// );
    /// ```
    pub fn parse(query: &str) -> Result<JsonPath, ParseError> {
        let mut parser = Parser::new(query);
        parser.parse_path()
    }

    fn parse_path(&mut self) -> Result<JsonPath, ParseError> {
        self.skip_whitespace();

        // Expect root ($)
        if self.peek() != Some('$') {
            return Err(ParseError::MissingRoot {
                position: self.position,
            });
        }
        self.next();

        let steps = self.parse_steps(false)?;
        Ok(JsonPath::new(steps))
    }

    /// Parses the steps following a `$`. When `nested` is set the steps end
    /// at the `]` that closes a dynamic key, which is left unconsumed.
    fn parse_steps(&mut self, nested: bool) -> Result<Vec<Step>, ParseError> {
        let mut steps = vec![Step::Root];

        loop {
            self.skip_whitespace();
            match self.peek() {
                None if nested => return Err(self.unexpected_end("']'")),
                None => break,
                Some(']') if nested => break,
                Some('.') => {
                    self.next();
                    if self.peek() == Some('.') {
                        self.next();
                        self.skip_whitespace();
                        steps.push(Step::RecursiveDescent);
                        steps.push(self.parse_after_recursive_descent()?);
                        continue;
                    }
                    self.skip_whitespace();
                    if self.peek() == Some('.') {
                        return Err(ParseError::syntax(
                            self.position,
                            "Whitespace is not allowed inside '..'",
                        ));
                    } else if self.peek() == Some('*') {
                        self.next();
                        steps.push(Step::Wildcard);
                    } else {
                        let name = self.parse_identifier("a member name or '*' after '.'")?;
                        steps.push(Step::Child(name));
                    }
                }
                Some('[') => {
                    steps.push(self.parse_bracket_expression()?);
                }
                Some(ch) => {
                    return Err(ParseError::syntax(
                        self.position,
                        format!("Unexpected character '{}', expected '.' or '['", ch),
                    ))
                }
            }
        }

        Ok(steps)
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Returns the character after the current one.
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.position..].chars();
        chars.next();
        chars.next()
    }

    /// Returns the next character and advances position.
    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.next();
            } else {
                break;
            }
        }
    }

    fn starts_with(&self, text: &str) -> bool {
        self.input[self.position..].starts_with(text)
    }

    fn unexpected_end(&self, expected: &str) -> ParseError {
        ParseError::syntax(
            self.position,
            format!("Unexpected end of query, expected {}", expected),
        )
    }

    /// Expects a specific character and advances, or returns an error.
    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        let pos = self.position; // Save position before advancing
        match self.next() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(ParseError::syntax(
                pos,
                format!("Unexpected token '{}', expected '{}'", ch, expected),
            )),
            None => Err(self.unexpected_end(&format!("'{}'", expected))),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ParseError::syntax(self.position, "Expression nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn is_identifier_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '-'
    }

    /// Parses an identifier (property name).
    fn parse_identifier(&mut self, expected: &str) -> Result<String, ParseError> {
        let start = self.position;
        while let Some(ch) = self.peek() {
            if Self::is_identifier_char(ch) {
                self.next();
            } else {
                break;
            }
        }
        if start == self.position {
            match self.peek() {
                Some(ch) => Err(ParseError::syntax(
                    start,
                    format!("Unexpected character '{}', expected {}", ch, expected),
                )),
                None => Err(self.unexpected_end(expected)),
            }
        } else {
            Ok(self.input[start..self.position].to_string())
        }
    }

    /// Parses what follows `..`: a name, `*`, or a bracket expression.
    fn parse_after_recursive_descent(&mut self) -> Result<Step, ParseError> {
        match self.peek() {
            Some('*') => {
                self.next();
                Ok(Step::Wildcard)
            }
            Some('[') => self.parse_bracket_expression(),
            _ => {
                let name = self.parse_identifier("a member name, '*' or '[' after '..'")?;
                Ok(Step::Child(name))
            }
        }
    }

    /// Parses bracket expression: [index], [start:end:step], ['key'], [*],
    /// [?(filter)], [$.path], and comma-separated unions.
    fn parse_bracket_expression(&mut self) -> Result<Step, ParseError> {
        self.expect('[')?;
        self.skip_whitespace();

        let step = match self.peek() {
            Some('*') => {
                self.next();
                self.expect(']')?;
                Step::Wildcard
            }
            Some('?') => {
                self.next();
                let expr = self.parse_or_expression()?;
                self.expect(']')?;
                Step::Filter(expr)
            }
            Some('$') => {
                self.next();
                self.enter()?;
                let steps = self.parse_steps(true)?;
                self.leave();
                self.expect(']')?;
                Step::Dynamic(JsonPath::new(steps))
            }
            Some(':') => self.parse_slice(None)?,
            Some('-') | Some('0'..='9') => {
                let index = self.parse_integer()?;
                self.skip_whitespace();
                if self.peek() == Some(':') {
                    self.parse_slice(Some(index))?
                } else {
                    self.parse_union(Selector::Index(index))?
                }
            }
            Some('\'') | Some('"') => {
                let name = self.parse_quoted_string()?;
                self.parse_union(Selector::Child(name))?
            }
            Some(']') => {
                return Err(ParseError::syntax(self.position, "Empty brackets"));
            }
            Some(ch) => {
                return Err(ParseError::syntax(
                    self.position,
                    format!("Invalid bracket expression starting with '{}'", ch),
                ))
            }
            None => return Err(self.unexpected_end("a bracket expression")),
        };

        Ok(step)
    }

    /// Parses the rest of `[a, b, ...]` once the first selector is known.
    fn parse_union(&mut self, first: Selector) -> Result<Step, ParseError> {
        let mut selectors = vec![first];
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.next();
                    self.skip_whitespace();
                    let selector = match self.peek() {
                        Some('\'') | Some('"') => Selector::Child(self.parse_quoted_string()?),
                        Some('-') | Some('0'..='9') => Selector::Index(self.parse_integer()?),
                        Some(ch) => {
                            return Err(ParseError::syntax(
                                self.position,
                                format!(
                                    "Unexpected character '{}', expected a quoted name or an index",
                                    ch
                                ),
                            ))
                        }
                        None => return Err(self.unexpected_end("a quoted name or an index")),
                    };
                    selectors.push(selector);
                }
                _ => break,
            }
        }
        self.expect(']')?;

        if selectors.len() == 1 {
            Ok(match selectors.remove(0) {
                Selector::Child(name) => Step::Child(name),
                Selector::Index(index) => Step::Index(index),
            })
        } else {
            Ok(Step::Union(selectors))
        }
    }

    /// Parses a quoted string: 'key' or "key"
    fn parse_quoted_string(&mut self) -> Result<String, ParseError> {
        let quote = match self.next() {
            Some(q @ ('\'' | '"')) => q,
            Some(_) | None => {
                return Err(ParseError::syntax(self.position, "Expected a quoted string"))
            }
        };

        let mut value = String::new();
        loop {
            let escape_pos = self.position;
            match self.next() {
                Some(ch) if ch == quote => break,
                Some('\\') => match self.next() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('b') => value.push('\u{0008}'),
                    Some('f') => value.push('\u{000C}'),
                    Some('/') => value.push('/'),
                    Some('\\') => value.push('\\'),
                    Some('\'') => value.push('\''),
                    Some('"') => value.push('"'),
                    Some('u') => value.push(self.parse_unicode_escape(escape_pos)?),
                    Some(_) | None => {
                        return Err(ParseError::syntax(escape_pos, "Invalid escape sequence"))
                    }
                },
                Some(ch) => value.push(ch),
                None => {
                    return Err(self.unexpected_end(&format!("closing quote {}", quote)));
                }
            }
        }
        Ok(value)
    }

    /// Reads the four hex digits of a `\u` escape, combining a high surrogate
    /// with the `\uXXXX` low surrogate that must follow it.
    fn parse_unicode_escape(&mut self, escape_pos: usize) -> Result<char, ParseError> {
        let invalid = || ParseError::syntax(escape_pos, "Invalid unicode escape");
        let high = self.parse_hex4().ok_or_else(invalid)?;
        let code = match high {
            0xD800..=0xDBFF => {
                if !self.starts_with("\\u") {
                    return Err(invalid());
                }
                self.position += 2;
                let low = self.parse_hex4().ok_or_else(invalid)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(invalid());
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            _ => high,
        };
        char::from_u32(code).ok_or_else(invalid)
    }

    fn parse_hex4(&mut self) -> Option<u32> {
        let digits = self
            .input
            .get(self.position..self.position + 4)
            .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))?;
        let code = u32::from_str_radix(digits, 16).ok()?;
        self.position += 4;
        Some(code)
    }

    /// Parses an optionally negative integer.
    fn parse_integer(&mut self) -> Result<i64, ParseError> {
        let start = self.position;
        if self.peek() == Some('-') {
            self.next();
        }
        while let Some('0'..='9') = self.peek() {
            self.next();
        }
        let text = &self.input[start..self.position];
        if text.is_empty() || text == "-" {
            return Err(ParseError::syntax(start, "Expected number"));
        }
        text.parse::<i64>()
            .map_err(|_| ParseError::syntax(start, format!("Invalid number: {}", text)))
    }

    fn parse_optional_integer(&mut self) -> Result<Option<i64>, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('-') | Some('0'..='9') => Ok(Some(self.parse_integer()?)),
            _ => Ok(None),
        }
    }

    /// Parses array slice: [start:end:step] with every part optional.
    fn parse_slice(&mut self, start: Option<i64>) -> Result<Step, ParseError> {
        self.expect(':')?;
        let end = self.parse_optional_integer()?;

        self.skip_whitespace();
        let mut step = None;
        if self.peek() == Some(':') {
            self.next();
            self.skip_whitespace();
            let step_pos = self.position;
            step = self.parse_optional_integer()?;
            if step == Some(0) {
                return Err(ParseError::InvalidSlice { position: step_pos });
            }
        }

        self.expect(']')?;
        Ok(Step::Slice(Slice::new(start, end, step)))
    }

    /// expr := and ('||' and)*
    fn parse_or_expression(&mut self) -> Result<FilterExpr, ParseError> {
        let mut left = self.parse_and_expression()?;
        loop {
            self.skip_whitespace();
            if !self.starts_with("||") {
                return Ok(left);
            }
            self.position += 2;
            let right = self.parse_and_expression()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
    }

    /// and := unary ('&&' unary)*
    fn parse_and_expression(&mut self) -> Result<FilterExpr, ParseError> {
        let mut left = self.parse_unary_expression()?;
        loop {
            self.skip_whitespace();
            if !self.starts_with("&&") {
                return Ok(left);
            }
            self.position += 2;
            let right = self.parse_unary_expression()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
    }

    /// unary := '!' unary | '(' expr ')' | comparison
    fn parse_unary_expression(&mut self) -> Result<FilterExpr, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some('!') if self.peek_second() != Some('=') => {
                self.next();
                self.enter()?;
                let inner = self.parse_unary_expression()?;
                self.leave();
                Ok(FilterExpr::Not(Box::new(inner)))
            }
            Some('(') => {
                self.next();
                self.enter()?;
                let inner = self.parse_or_expression()?;
                self.leave();
                self.expect(')')?;
                Ok(inner)
            }
            _ => self.parse_comparison(),
        }
    }

    /// comparison := operand (op operand)?
    fn parse_comparison(&mut self) -> Result<FilterExpr, ParseError> {
        let left_pos = self.position;
        let left = self.parse_operand()?;

        self.skip_whitespace();
        let op = match self.parse_comparison_operator()? {
            Some(op) => op,
            None => {
                return match left {
                    Operand::Path(path) => Ok(FilterExpr::Exists(path)),
                    Operand::Literal(_) => Err(ParseError::unsupported(
                        left_pos,
                        "a literal cannot be used as a condition on its own",
                    )),
                };
            }
        };

        self.skip_whitespace();
        if self.peek().is_none() || matches!(self.peek(), Some(')') | Some(']')) {
            return Err(ParseError::syntax(
                self.position,
                format!("Expected a value after '{}'", op.as_str()),
            ));
        }
        let right = self.parse_operand()?;

        Ok(FilterExpr::Compare { left, op, right })
    }

    /// Reads a comparison operator if one is present.
    fn parse_comparison_operator(&mut self) -> Result<Option<CompareOp>, ParseError> {
        let pos = self.position;
        let rest = &self.input[pos..];

        if rest.starts_with("=~") {
            return Err(ParseError::unsupported(
                pos,
                "regular expression match '=~' is not supported",
            ));
        }

        let (op, width) = if rest.starts_with("==") {
            (CompareOp::Eq, 2)
        } else if rest.starts_with("!=") {
            (CompareOp::Ne, 2)
        } else if rest.starts_with("<=") {
            (CompareOp::Le, 2)
        } else if rest.starts_with(">=") {
            (CompareOp::Ge, 2)
        } else if rest.starts_with('<') {
            (CompareOp::Lt, 1)
        } else if rest.starts_with('>') {
            (CompareOp::Gt, 1)
        } else if rest.starts_with('=') {
            return Err(ParseError::syntax(pos, "Unexpected '=', did you mean '=='?"));
        } else if rest.starts_with(|c: char| c.is_alphabetic()) {
            let word: String = rest.chars().take_while(|c| c.is_alphanumeric()).collect();
            if UNSUPPORTED_WORD_OPERATORS.contains(&word.as_str()) {
                return Err(ParseError::unsupported(
                    pos,
                    format!("operator '{}' is not supported", word),
                ));
            }
            return Err(ParseError::syntax(
                pos,
                format!("Unexpected '{}', expected a comparison operator", word),
            ));
        } else {
            return Ok(None);
        };

        self.position += width;
        Ok(Some(op))
    }

    /// operand := '@' path | '$' path | string | number | true | false | null
    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        self.skip_whitespace();
        let pos = self.position;
        match self.peek() {
            Some('@') => {
                self.next();
                Ok(Operand::Path(self.parse_filter_path(Anchor::Current)?))
            }
            Some('$') => {
                self.next();
                Ok(Operand::Path(self.parse_filter_path(Anchor::Root)?))
            }
            Some('\'') | Some('"') => {
                Ok(Operand::Literal(JsonValue::String(self.parse_quoted_string()?)))
            }
            Some('-') | Some('0'..='9') => Ok(Operand::Literal(JsonValue::Number(
                self.parse_number_literal()?,
            ))),
            Some(ch) if ch.is_alphabetic() => {
                let word: String = self.input[pos..]
                    .chars()
                    .take_while(|c| Self::is_identifier_char(*c))
                    .collect();
                let after = self.input[pos + word.len()..].trim_start();
                let literal = match word.as_str() {
                    _ if after.starts_with('(') => {
                        return Err(ParseError::unsupported(
                            pos,
                            format!("function '{}()' is not supported", word),
                        ))
                    }
                    "true" => JsonValue::Bool(true),
                    "false" => JsonValue::Bool(false),
                    "null" => JsonValue::Null,
                    _ => {
                        return Err(ParseError::syntax(
                            pos,
                            format!("Unexpected '{}', expected '@', '$' or a literal", word),
                        ))
                    }
                };
                self.position += word.len();
                Ok(Operand::Literal(literal))
            }
            Some(ch) => Err(ParseError::syntax(
                pos,
                format!("Unexpected character '{}', expected '@', '$' or a literal", ch),
            )),
            None => Err(self.unexpected_end("'@', '$' or a literal")),
        }
    }

    /// Parses the name and index segments following `@` or `$` in a filter.
    fn parse_filter_path(&mut self, anchor: Anchor) -> Result<FilterPath, ParseError> {
        let mut selectors = Vec::new();
        loop {
            let pos = self.position;
            match self.peek() {
                Some('.') => {
                    self.next();
                    match self.peek() {
                        Some('.') => {
                            return Err(ParseError::unsupported(
                                pos,
                                "recursive descent is not supported inside filters",
                            ))
                        }
                        Some('*') => {
                            return Err(ParseError::unsupported(
                                pos,
                                "wildcards are not supported inside filters",
                            ))
                        }
                        _ => {
                            let name = self.parse_identifier("a member name after '.'")?;
                            selectors.push(Selector::Child(name));
                        }
                    }
                }
                Some('[') => {
                    self.next();
                    self.skip_whitespace();
                    let selector = match self.peek() {
                        Some('\'') | Some('"') => Selector::Child(self.parse_quoted_string()?),
                        Some('-') | Some('0'..='9') => {
                            let index = self.parse_integer()?;
                            self.skip_whitespace();
                            if self.peek() == Some(':') {
                                return Err(ParseError::unsupported(
                                    pos,
                                    "slices are not supported inside filters",
                                ));
                            }
                            Selector::Index(index)
                        }
                        Some(']') => {
                            return Err(ParseError::syntax(self.position, "Empty brackets"))
                        }
                        Some(_) => {
                            return Err(ParseError::unsupported(
                                pos,
                                "only names and indices are supported inside filter paths",
                            ))
                        }
                        None => return Err(self.unexpected_end("a name or an index")),
                    };
                    self.skip_whitespace();
                    if self.peek() == Some(',') {
                        return Err(ParseError::unsupported(
                            pos,
                            "unions are not supported inside filters",
                        ));
                    }
                    self.expect(']')?;
                    selectors.push(selector);
                }
                _ => break,
            }
        }
        Ok(FilterPath { anchor, selectors })
    }

    /// Parses a JSON-style number literal.
    fn parse_number_literal(&mut self) -> Result<f64, ParseError> {
        let start = self.position;
        if self.peek() == Some('-') {
            self.next();
        }
        let mut digits = 0;
        while let Some('0'..='9') = self.peek() {
            self.next();
            digits += 1;
        }
        if digits == 0 {
            return Err(ParseError::syntax(start, "Expected number"));
        }
        if self.peek() == Some('.') && matches!(self.peek_second(), Some('0'..='9')) {
            self.next();
            while let Some('0'..='9') = self.peek() {
                self.next();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let exponent_start = self.position;
            self.next();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.next();
            }
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(ParseError::syntax(exponent_start, "Invalid number exponent"));
            }
            while let Some('0'..='9') = self.peek() {
                self.next();
            }
        }
        let text = &self.input[start..self.position];
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(ParseError::syntax(start, format!("Invalid number: {}", text))),
        }
    }
}
