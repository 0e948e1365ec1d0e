//! JSON text output.
//!
//! Values are written from an explicit work list rather than by recursion, so
//! serializing a deeply nested document cannot exhaust the call stack. Output
//! is canonical: object members in insertion order, integral numbers without a
//! fractional part, and strings escaped the way `serde_json` escapes them.
//!
//! # Example
//!
//! ```
//! use pathquill::document::parser::parse_json;
//! use pathquill::document::serializer::{to_json_string, to_json_string_pretty};
//!
//! let value = parse_json(r#"{ "a": [1, 2.50], "b": "x" }"#).unwrap();
//! assert_eq!(to_json_string(&value), r#"{"a":[1,2.5],"b":"x"}"#);
//! assert_eq!(
//!     to_json_string_pretty(&value, 2),
//!     "{\n  \"a\": [\n    1,\n    2.5\n  ],\n  \"b\": \"x\"\n}"
//! );
//! ```

use super::node::JsonValue;
use std::fmt;

/// Whitespace layout for serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// No insignificant whitespace.
    #[default]
    Compact,
    /// One member per line, indented by `indent` spaces per level.
    Pretty { indent: usize },
}

enum Token<'a> {
    Value(&'a JsonValue, usize),
    Key(&'a str),
    Raw(&'static str),
    Newline(usize),
}

/// Serializes a value as compact JSON.
pub fn to_json_string(value: &JsonValue) -> String {
    let mut out = String::new();
    write_value(&mut out, value, Layout::Compact);
    out
}

/// Serializes a value as indented JSON.
pub fn to_json_string_pretty(value: &JsonValue, indent: usize) -> String {
    let mut out = String::new();
    write_value(&mut out, value, Layout::Pretty { indent });
    out
}

/// Appends the JSON text of `value` to `out`.
pub fn write_value(out: &mut String, value: &JsonValue, layout: Layout) {
    let mut work = vec![Token::Value(value, 0)];
    drain(out, &mut work, layout);
}

/// Appends a JSON array built from borrowed values, without cloning them
/// into an intermediate `JsonValue::Array`.
///
/// # Example
///
/// ```
/// use pathquill::document::node::JsonValue;
/// use pathquill::document::serializer::{write_array, Layout};
///
/// let a = JsonValue::Number(1.0);
/// let b = JsonValue::String("two".to_string());
/// let mut out = String::new();
/// write_array(&mut out, [&a, &b], Layout::Compact);
/// assert_eq!(out, r#"[1,"two"]"#);
/// ```
pub fn write_array<'a, I>(out: &mut String, items: I, layout: Layout)
where
    I: IntoIterator<Item = &'a JsonValue>,
    I::IntoIter: DoubleEndedIterator + ExactSizeIterator,
{
    let items = items.into_iter();
    if items.len() == 0 {
        out.push_str("[]");
        return;
    }
    out.push('[');
    let mut work = Vec::new();
    push_elements(&mut work, items, 0);
    drain(out, &mut work, layout);
}

fn push_elements<'a, I>(work: &mut Vec<Token<'a>>, items: I, depth: usize)
where
    I: DoubleEndedIterator<Item = &'a JsonValue> + ExactSizeIterator,
{
    work.push(Token::Raw("]"));
    work.push(Token::Newline(depth));
    for (i, item) in items.enumerate().rev() {
        work.push(Token::Value(item, depth + 1));
        work.push(Token::Newline(depth + 1));
        if i > 0 {
            work.push(Token::Raw(","));
        }
    }
}

fn drain<'a>(out: &mut String, work: &mut Vec<Token<'a>>, layout: Layout) {
    while let Some(token) = work.pop() {
        match token {
            Token::Raw(text) => out.push_str(text),
            Token::Newline(depth) => {
                if let Layout::Pretty { indent } = layout {
                    out.push('\n');
                    out.extend(std::iter::repeat(' ').take(indent * depth));
                }
            }
            Token::Key(key) => {
                write_string(out, key);
                out.push_str(match layout {
                    Layout::Compact => ":",
                    Layout::Pretty { .. } => ": ",
                });
            }
            Token::Value(value, depth) => match value {
                JsonValue::Null => out.push_str("null"),
                JsonValue::Bool(true) => out.push_str("true"),
                JsonValue::Bool(false) => out.push_str("false"),
                JsonValue::Number(n) => out.push_str(&format_number(*n)),
                JsonValue::String(s) => write_string(out, s),
                JsonValue::Array(items) if items.is_empty() => out.push_str("[]"),
                JsonValue::Array(items) => {
                    out.push('[');
                    push_elements(work, items.iter(), depth);
                }
                JsonValue::Object(fields) if fields.is_empty() => out.push_str("{}"),
                JsonValue::Object(fields) => {
                    out.push('{');
                    work.push(Token::Raw("}"));
                    work.push(Token::Newline(depth));
                    for (i, (key, child)) in fields.iter().enumerate().rev() {
                        work.push(Token::Value(child, depth + 1));
                        work.push(Token::Key(key.as_str()));
                        work.push(Token::Newline(depth + 1));
                        if i > 0 {
                            work.push(Token::Raw(","));
                        }
                    }
                }
            },
        }
    }
}

/// Formats a number canonically.
///
/// Integral values below 1e15 in magnitude print without a fraction. Other
/// values use their shortest round-trip digits, written as a plain decimal
/// when the decimal exponent is in `-6..15` and as `<mantissa>e<exponent>`
/// otherwise.
///
/// ```
/// use pathquill::document::serializer::format_number;
///
/// assert_eq!(format_number(3.0), "3");
/// assert_eq!(format_number(-0.0), "0");
/// assert_eq!(format_number(8.95), "8.95");
/// assert_eq!(format_number(1e15), "1e15");
/// assert_eq!(format_number(1e20), "1e20");
/// assert_eq!(format_number(-2.5e-9), "-2.5e-9");
/// ```
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }

    // `{:e}` yields the shortest round-trip digits as `d.ddde<exp>`.
    let scientific = format!("{:e}", n.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }
    if (-6..15).contains(&exponent) {
        if exponent < 0 {
            out.push_str("0.");
            for _ in 0..(-exponent - 1) {
                out.push('0');
            }
            out.push_str(&digits);
        } else {
            let split = exponent as usize + 1;
            if digits.len() > split {
                out.push_str(&digits[..split]);
                out.push('.');
                out.push_str(&digits[split..]);
            } else {
                out.push_str(&digits);
                for _ in digits.len()..split {
                    out.push('0');
                }
            }
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push_str(&exponent.to_string());
    }
    out
}

/// Writes `s` as a quoted JSON string.
pub fn write_string(out: &mut String, s: &str) {
    out.push('"');
    let mut plain_start = 0;
    for (i, byte) in s.bytes().enumerate() {
        let escape = match byte {
            b'"' => "\\\"",
            b'\\' => "\\\\",
            b'\n' => "\\n",
            b'\r' => "\\r",
            b'\t' => "\\t",
            0x08 => "\\b",
            0x0C => "\\f",
            0x00..=0x1F => "",
            _ => continue,
        };
        out.push_str(&s[plain_start..i]);
        if escape.is_empty() {
            out.push_str(&format!("\\u{:04x}", byte));
        } else {
            out.push_str(escape);
        }
        plain_start = i + 1;
    }
    out.push_str(&s[plain_start..]);
    out.push('"');
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = match f.alternate() {
            true => Layout::Pretty { indent: 2 },
            false => Layout::Compact,
        };
        let mut out = String::new();
        write_value(&mut out, self, layout);
        f.write_str(&out)
    }
}
