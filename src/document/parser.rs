//! JSON text parsing.
//!
//! This module turns JSON text into a `JsonValue` tree. The parser walks the
//! input once, left to right, and keeps open arrays and objects on an explicit
//! stack instead of the call stack, so nesting depth is bounded only by memory.
//! Every error carries the byte offset where parsing stopped.
//!
//! # Example
//!
//! ```
//! use pathquill::document::parser::parse_json;
//! use pathquill::document::node::JsonValue;
//!
//! let value = parse_json(r#"{"name": "Alice", "age": 30}"#).unwrap();
//! assert_eq!(value.get("age"), Some(&JsonValue::Number(30.0)));
//!
//! let err = parse_json(r#"{"unclosed": "#).unwrap_err();
//! assert_eq!(err.offset(), 13);
//! ```

use super::node::JsonValue;
use indexmap::IndexMap;
use thiserror::Error;

/// Errors produced while parsing a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("unexpected character '{found}' at byte {offset}, expected {expected}")]
    UnexpectedCharacter {
        offset: usize,
        found: char,
        expected: &'static str,
    },
    #[error("unexpected end of input at byte {offset}, expected {expected}")]
    UnexpectedEnd {
        offset: usize,
        expected: &'static str,
    },
    #[error("invalid number at byte {offset}")]
    InvalidNumber { offset: usize },
    #[error("invalid escape sequence at byte {offset}")]
    InvalidEscape { offset: usize },
    #[error("invalid unicode escape at byte {offset}")]
    InvalidUnicode { offset: usize },
    #[error("unescaped control character in string at byte {offset}")]
    ControlCharacter { offset: usize },
    #[error("trailing characters after JSON value at byte {offset}")]
    TrailingCharacters { offset: usize },
}

impl DocumentError {
    /// Byte offset into the input where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            DocumentError::UnexpectedCharacter { offset, .. }
            | DocumentError::UnexpectedEnd { offset, .. }
            | DocumentError::InvalidNumber { offset }
            | DocumentError::InvalidEscape { offset }
            | DocumentError::InvalidUnicode { offset }
            | DocumentError::ControlCharacter { offset }
            | DocumentError::TrailingCharacters { offset } => *offset,
        }
    }

    /// Human readable reason without the offset.
    pub fn reason(&self) -> String {
        match self {
            DocumentError::UnexpectedCharacter {
                found, expected, ..
            } => format!("unexpected character '{}', expected {}", found, expected),
            DocumentError::UnexpectedEnd { expected, .. } => {
                format!("unexpected end of input, expected {}", expected)
            }
            DocumentError::InvalidNumber { .. } => "invalid number".to_string(),
            DocumentError::InvalidEscape { .. } => "invalid escape sequence".to_string(),
            DocumentError::InvalidUnicode { .. } => "invalid unicode escape".to_string(),
            DocumentError::ControlCharacter { .. } => {
                "unescaped control character in string".to_string()
            }
            DocumentError::TrailingCharacters { .. } => {
                "trailing characters after JSON value".to_string()
            }
        }
    }
}

/// An array or object that has been opened but not yet closed.
enum Frame {
    Array(Vec<JsonValue>),
    Object {
        fields: IndexMap<String, JsonValue>,
        key: String,
    },
}

/// Cursor over the raw JSON bytes.
struct Scanner<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\n' | b'\r' | b'\t') = self.peek() {
            self.pos += 1;
        }
    }

    fn unexpected(&self, expected: &'static str) -> DocumentError {
        match self.source[self.pos..].chars().next() {
            Some(found) => DocumentError::UnexpectedCharacter {
                offset: self.pos,
                found,
                expected,
            },
            None => DocumentError::UnexpectedEnd {
                offset: self.pos,
                expected,
            },
        }
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), DocumentError> {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_literal(&mut self, literal: &'static str) -> Result<(), DocumentError> {
        if self.source[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            return Ok(());
        }
        // Point at the first byte that diverges from the literal.
        let matched = self.source.as_bytes()[self.pos..]
            .iter()
            .zip(literal.as_bytes())
            .take_while(|(a, b)| a == b)
            .count();
        self.pos += matched;
        Err(self.unexpected(literal))
    }

    fn parse_number(&mut self) -> Result<f64, DocumentError> {
        let start = self.pos;

        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => {
                while let Some(b'0'..=b'9') = self.peek() {
                    self.pos += 1;
                }
            }
            _ => return Err(DocumentError::InvalidNumber { offset: self.pos }),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(DocumentError::InvalidNumber { offset: self.pos });
            }
            while let Some(b'0'..=b'9') = self.peek() {
                self.pos += 1;
            }
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(DocumentError::InvalidNumber { offset: self.pos });
            }
            while let Some(b'0'..=b'9') = self.peek() {
                self.pos += 1;
            }
        }

        let number: f64 = self.source[start..self.pos]
            .parse()
            .map_err(|_| DocumentError::InvalidNumber { offset: start })?;
        if number.is_finite() {
            Ok(number)
        } else {
            Err(DocumentError::InvalidNumber { offset: start })
        }
    }

    /// Parses a string starting at the opening quote.
    fn parse_string(&mut self) -> Result<String, DocumentError> {
        self.expect(b'"', "string")?;
        let mut value = String::new();

        loop {
            // Copy the run of plain characters in one go.
            let rest = &self.source[self.pos..];
            let run = rest
                .bytes()
                .take_while(|b| *b != b'"' && *b != b'\\' && *b >= 0x20)
                .count();
            value.push_str(&rest[..run]);
            self.pos += run;

            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some(b'\\') => {
                    let escape_start = self.pos;
                    self.pos += 1;
                    let ch = match self.peek() {
                        Some(b'"') => '"',
                        Some(b'\\') => '\\',
                        Some(b'/') => '/',
                        Some(b'b') => '\u{0008}',
                        Some(b'f') => '\u{000C}',
                        Some(b'n') => '\n',
                        Some(b'r') => '\r',
                        Some(b't') => '\t',
                        Some(b'u') => {
                            self.pos += 1;
                            value.push(self.parse_unicode_escape(escape_start)?);
                            continue;
                        }
                        Some(_) => {
                            return Err(DocumentError::InvalidEscape {
                                offset: escape_start,
                            })
                        }
                        None => return Err(self.unexpected("escape sequence")),
                    };
                    self.pos += 1;
                    value.push(ch);
                }
                Some(_) => return Err(DocumentError::ControlCharacter { offset: self.pos }),
                None => return Err(self.unexpected("closing quote")),
            }
        }
    }

    /// Parses the hex digits after `\u`, combining surrogate pairs.
    fn parse_unicode_escape(&mut self, escape_start: usize) -> Result<char, DocumentError> {
        let high = self.parse_hex4()?;
        let code = match high {
            0xD800..=0xDBFF => {
                if !self.source[self.pos..].starts_with("\\u") {
                    return Err(DocumentError::InvalidUnicode {
                        offset: escape_start,
                    });
                }
                self.pos += 2;
                let low = self.parse_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(DocumentError::InvalidUnicode {
                        offset: escape_start,
                    });
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(DocumentError::InvalidUnicode {
                    offset: escape_start,
                })
            }
            _ => high,
        };
        char::from_u32(code).ok_or(DocumentError::InvalidUnicode {
            offset: escape_start,
        })
    }

    fn parse_hex4(&mut self) -> Result<u32, DocumentError> {
        let digits = self
            .source
            .get(self.pos..self.pos + 4)
            .ok_or(DocumentError::InvalidUnicode { offset: self.pos })?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DocumentError::InvalidUnicode { offset: self.pos });
        }
        let code = u32::from_str_radix(digits, 16)
            .map_err(|_| DocumentError::InvalidUnicode { offset: self.pos })?;
        self.pos += 4;
        Ok(code)
    }

    /// Parses `"key" :` inside an object.
    fn parse_key(&mut self) -> Result<String, DocumentError> {
        self.skip_whitespace();
        if self.peek() != Some(b'"') {
            return Err(self.unexpected("object key"));
        }
        let key = self.parse_string()?;
        self.expect(b':', "':'")?;
        Ok(key)
    }
}

/// Parses JSON text into a `JsonValue`.
///
/// The whole input must be exactly one JSON value, optionally surrounded by
/// whitespace. Duplicate object keys keep the last value.
///
/// # Errors
///
/// Returns a `DocumentError` carrying the byte offset of the first problem.
///
/// # Examples
///
/// ```
/// use pathquill::document::parser::parse_json;
///
/// let value = parse_json("[1, 2, 3]").unwrap();
/// assert_eq!(value.len(), 3);
///
/// assert!(parse_json("[1, 2,]").is_err());
/// ```
pub fn parse_json(source: &str) -> Result<JsonValue, DocumentError> {
    let mut scanner = Scanner::new(source);
    let mut stack: Vec<Frame> = Vec::new();

    'value: loop {
        scanner.skip_whitespace();

        let mut value = match scanner.peek() {
            Some(b'{') => {
                scanner.pos += 1;
                scanner.skip_whitespace();
                if scanner.peek() == Some(b'}') {
                    scanner.pos += 1;
                    JsonValue::Object(IndexMap::new())
                } else {
                    let key = scanner.parse_key()?;
                    stack.push(Frame::Object {
                        fields: IndexMap::new(),
                        key,
                    });
                    continue 'value;
                }
            }
            Some(b'[') => {
                scanner.pos += 1;
                scanner.skip_whitespace();
                if scanner.peek() == Some(b']') {
                    scanner.pos += 1;
                    JsonValue::Array(Vec::new())
                } else {
                    stack.push(Frame::Array(Vec::new()));
                    continue 'value;
                }
            }
            Some(b'"') => JsonValue::String(scanner.parse_string()?),
            Some(b'-' | b'0'..=b'9') => JsonValue::Number(scanner.parse_number()?),
            Some(b't') => {
                scanner.expect_literal("true")?;
                JsonValue::Bool(true)
            }
            Some(b'f') => {
                scanner.expect_literal("false")?;
                JsonValue::Bool(false)
            }
            Some(b'n') => {
                scanner.expect_literal("null")?;
                JsonValue::Null
            }
            _ => return Err(scanner.unexpected("JSON value")),
        };

        // Attach the finished value to its parent, closing as many
        // containers as the input allows.
        loop {
            let Some(mut frame) = stack.pop() else {
                scanner.skip_whitespace();
                if scanner.pos < source.len() {
                    return Err(DocumentError::TrailingCharacters {
                        offset: scanner.pos,
                    });
                }
                return Ok(value);
            };

            scanner.skip_whitespace();
            match &mut frame {
                Frame::Array(items) => {
                    items.push(value);
                    match scanner.peek() {
                        Some(b',') => {
                            scanner.pos += 1;
                            stack.push(frame);
                            continue 'value;
                        }
                        Some(b']') => scanner.pos += 1,
                        _ => return Err(scanner.unexpected("',' or ']'")),
                    }
                }
                Frame::Object { fields, key } => {
                    fields.insert(std::mem::take(key), value);
                    match scanner.peek() {
                        Some(b',') => {
                            scanner.pos += 1;
                            *key = scanner.parse_key()?;
                            stack.push(frame);
                            continue 'value;
                        }
                        Some(b'}') => scanner.pos += 1,
                        _ => return Err(scanner.unexpected("',' or '}'")),
                    }
                }
            }

            value = match frame {
                Frame::Array(items) => JsonValue::Array(items),
                Frame::Object { fields, .. } => JsonValue::Object(fields),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_json("null").unwrap(), JsonValue::Null);
        assert_eq!(parse_json(" true ").unwrap(), JsonValue::Bool(true));
        assert_eq!(parse_json("false").unwrap(), JsonValue::Bool(false));
        assert_eq!(parse_json("-12.5e1").unwrap(), JsonValue::Number(-125.0));
        assert_eq!(parse_json("0").unwrap(), JsonValue::Number(0.0));
        assert_eq!(
            parse_json(r#""hi""#).unwrap(),
            JsonValue::String("hi".to_string())
        );
    }

    #[test]
    fn test_parse_nested() {
        let value = parse_json(r#"{"a": [1, {"b": null}], "c": {}}"#).unwrap();
        let a = value.get("a").unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.get_index(1).and_then(|v| v.get("b")), Some(&JsonValue::Null));
        assert_eq!(value.get("c"), Some(&JsonValue::Object(IndexMap::new())));
    }

    #[test]
    fn test_parse_preserves_key_order() {
        let value = parse_json(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let value = parse_json(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        let fields = value.as_object().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get_index(0), Some((&"a".to_string(), &JsonValue::Number(3.0))));
    }

    #[test]
    fn test_parse_string_escapes() {
        let value = parse_json(r#""a\"b\\c\/d\né😀""#).unwrap();
        assert_eq!(value.as_str(), Some("a\"b\\c/d\né😀"));
    }

    #[test]
    fn test_lone_surrogate_is_rejected() {
        let err = parse_json(r#""\ud83d""#).unwrap_err();
        assert_eq!(err, DocumentError::InvalidUnicode { offset: 1 });
    }

    #[test]
    fn test_error_offsets() {
        assert_eq!(parse_json("").unwrap_err().offset(), 0);
        assert_eq!(parse_json("[1, 2,]").unwrap_err().offset(), 6);
        assert_eq!(parse_json("[1 2]").unwrap_err().offset(), 3);
        assert_eq!(parse_json(r#"{"a" 1}"#).unwrap_err().offset(), 5);
        assert_eq!(parse_json("tru").unwrap_err().offset(), 3);
        assert_eq!(parse_json("nul!").unwrap_err().offset(), 3);
        assert_eq!(parse_json("{} x").unwrap_err().offset(), 3);
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(matches!(
            parse_json("01"),
            Err(DocumentError::TrailingCharacters { offset: 1 })
        ));
        assert!(matches!(
            parse_json("1."),
            Err(DocumentError::InvalidNumber { offset: 2 })
        ));
        assert!(matches!(
            parse_json("-"),
            Err(DocumentError::InvalidNumber { offset: 1 })
        ));
        assert!(matches!(
            parse_json("1e400"),
            Err(DocumentError::InvalidNumber { offset: 0 })
        ));
    }

    #[test]
    fn test_control_character_in_string() {
        let err = parse_json("\"a\nb\"").unwrap_err();
        assert_eq!(err, DocumentError::ControlCharacter { offset: 2 });
    }

    #[test]
    fn test_unterminated_containers() {
        assert!(matches!(
            parse_json("[1, [2"),
            Err(DocumentError::UnexpectedEnd { offset: 6, .. })
        ));
        assert!(matches!(
            parse_json(r#"{"a": "#),
            Err(DocumentError::UnexpectedEnd { offset: 6, .. })
        ));
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let depth = 100_000;
        let text = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let value = parse_json(&text).unwrap();

        let mut current = &value;
        let mut levels = 1;
        while let Some([child]) = current.as_array() {
            current = child;
            levels += 1;
        }
        assert_eq!(levels, depth);
    }
}
