//! The text-in, text-out query entry point.
//!
//! [`evaluate_json_path`] parses a document and a query, evaluates the query
//! and serializes the matches. It is pure: no configuration, environment or
//! I/O is consulted, and the same inputs always produce the same text.
//!
//! # Output shape
//!
//! Whether the result is a bare value or an array depends only on the query.
//! A query made of nothing but `$`, names, indices and singular `[$...]` keys
//! can select at most one value; when it selects exactly one, that value is
//! returned on its own. Every other result, including an empty one, is a JSON
//! array of the matches in order.

use crate::document::parser::{parse_json, DocumentError};
use crate::document::node::JsonValue;
use crate::document::serializer::{write_array, write_value, Layout};
use crate::jsonpath::{Evaluator, JsonPath, MatchSet, ParseError};
use log::debug;
use thiserror::Error;

/// The category of a failed query, independent of its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DocumentParseError,
    QueryParseError,
    UnsupportedExpression,
}

/// Errors returned by [`evaluate_json_path`].
///
/// Offsets are byte offsets into the document text or the query text
/// respectively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid JSON document at byte {offset}: {reason}")]
    DocumentParse { offset: usize, reason: String },

    #[error("invalid JSONPath query at byte {offset}: {reason}")]
    QueryParse { offset: usize, reason: String },

    #[error("unsupported expression at byte {offset}: {detail}")]
    UnsupportedExpression { offset: usize, detail: String },
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::DocumentParse { .. } => ErrorKind::DocumentParseError,
            QueryError::QueryParse { .. } => ErrorKind::QueryParseError,
            QueryError::UnsupportedExpression { .. } => ErrorKind::UnsupportedExpression,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            QueryError::DocumentParse { offset, .. }
            | QueryError::QueryParse { offset, .. }
            | QueryError::UnsupportedExpression { offset, .. } => *offset,
        }
    }
}

impl From<DocumentError> for QueryError {
    fn from(err: DocumentError) -> Self {
        QueryError::DocumentParse {
            offset: err.offset(),
            reason: err.reason(),
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnsupportedExpression { position, detail } => {
                QueryError::UnsupportedExpression {
                    offset: position,
                    detail,
                }
            }
            other => QueryError::QueryParse {
                offset: other.position(),
                reason: other.reason(),
            },
        }
    }
}

/// What to report for each match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Report {
    /// The matched values, shaped by the query.
    #[default]
    Values,
    /// An array of normalized paths such as `$['a'][0]`.
    Paths,
}

/// Output options for [`evaluate_json_path_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputOptions {
    pub layout: Layout,
    pub report: Report,
}

/// Evaluates `query` against `document` and returns the matches as compact
/// JSON text.
///
/// # Example
///
/// ```
/// use pathquill::evaluate_json_path;
///
/// let doc = r#"{"store": {"book": [{"price": 8.95}, {"price": 12.99}]}}"#;
/// assert_eq!(evaluate_json_path("$.store.book[0].price", doc).unwrap(), "8.95");
/// assert_eq!(evaluate_json_path("$..price", doc).unwrap(), "[8.95,12.99]");
/// assert_eq!(evaluate_json_path("$.missing", doc).unwrap(), "[]");
/// ```
pub fn evaluate_json_path(query: &str, document: &str) -> Result<String, QueryError> {
    evaluate_json_path_with(query, document, &OutputOptions::default())
}

/// Evaluates `query` against `document` and returns a JSON array with the
/// normalized path of every match.
///
/// # Example
///
/// ```
/// use pathquill::evaluate_json_path_locations;
///
/// let doc = r#"{"a": [1, 2]}"#;
/// assert_eq!(
///     evaluate_json_path_locations("$.a[*]", doc).unwrap(),
///     r#"["$['a'][0]","$['a'][1]"]"#
/// );
/// ```
pub fn evaluate_json_path_locations(query: &str, document: &str) -> Result<String, QueryError> {
    let options = OutputOptions {
        report: Report::Paths,
        ..OutputOptions::default()
    };
    evaluate_json_path_with(query, document, &options)
}

/// Evaluates `query` against `document` with explicit output options.
///
/// The query is compiled before the document is parsed, so a bad query is
/// reported even when the document is also malformed.
pub fn evaluate_json_path_with(
    query: &str,
    document: &str,
    options: &OutputOptions,
) -> Result<String, QueryError> {
    let path = JsonPath::parse(query)?;
    debug!(
        "compiled query {} ({} steps, singular: {})",
        path,
        path.steps.len(),
        path.is_singular()
    );

    let root = parse_json(document)?;
    let matches = Evaluator::new(&root).evaluate(&path);

    let mut out = String::new();
    match options.report {
        Report::Values => serialize_matches(&mut out, &path, &matches, options.layout),
        Report::Paths => serialize_paths(&mut out, &matches, options.layout),
    }
    Ok(out)
}

/// Writes the matched values of `path`, applying the output shape rule.
pub fn serialize_matches(out: &mut String, path: &JsonPath, matches: &MatchSet<'_>, layout: Layout) {
    match matches.values().next() {
        Some(value) if matches.len() == 1 && path.is_singular() => {
            write_value(out, value, layout)
        }
        _ => write_array(out, matches.values(), layout),
    }
}

fn serialize_paths(out: &mut String, matches: &MatchSet<'_>, layout: Layout) {
    let paths: Vec<JsonValue> = matches
        .paths()
        .iter()
        .map(|path| JsonValue::String(path.to_string()))
        .collect();
    write_array(out, &paths, layout);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_match_is_bare() {
        assert_eq!(evaluate_json_path("$.a", r#"{"a": {"b": 1}}"#).unwrap(), r#"{"b":1}"#);
        assert_eq!(evaluate_json_path("$", "[1, 2]").unwrap(), "[1,2]");
    }

    #[test]
    fn test_singular_without_match_is_empty_array() {
        assert_eq!(evaluate_json_path("$.b", r#"{"a": 1}"#).unwrap(), "[]");
        assert_eq!(evaluate_json_path("$[5]", "[1]").unwrap(), "[]");
    }

    #[test]
    fn test_multi_valued_shape_is_always_array() {
        assert_eq!(evaluate_json_path("$[*]", "[1]").unwrap(), "[1]");
        assert_eq!(evaluate_json_path("$[?(@ == 1)]", "[1, 2]").unwrap(), "[1]");
        assert_eq!(evaluate_json_path("$[?(@.a)]", r#"[{"a": 1}]"#).unwrap(), r#"[{"a":1}]"#);
    }

    #[test]
    fn test_document_error_offset() {
        let err = evaluate_json_path("$", "[1, 2,]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocumentParseError);
        assert_eq!(err.offset(), 6);
    }

    #[test]
    fn test_query_error_offset() {
        let err = evaluate_json_path("$.a[", "{}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryParseError);
        assert_eq!(err.offset(), 4);

        let err = evaluate_json_path("a.b", "{}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryParseError);
        assert_eq!(err.offset(), 0);
    }

    #[test]
    fn test_query_checked_before_document() {
        let err = evaluate_json_path("$[", "{").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryParseError);
    }

    #[test]
    fn test_unsupported_expression() {
        let err = evaluate_json_path("$[?(@.a =~ /x/)]", "[]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedExpression);
        assert_eq!(err.offset(), 8);
    }

    #[test]
    fn test_pretty_layout() {
        let options = OutputOptions {
            layout: Layout::Pretty { indent: 2 },
            report: Report::Values,
        };
        assert_eq!(
            evaluate_json_path_with("$.a", r#"{"a": [1]}"#, &options).unwrap(),
            "[\n  1\n]"
        );
    }

    #[test]
    fn test_location_report() {
        let doc = r#"{"a": {"b": 1}, "c": [{"b": 2}]}"#;
        assert_eq!(
            evaluate_json_path_locations("$..b", doc).unwrap(),
            r#"["$['a']['b']","$['c'][0]['b']"]"#
        );
        assert_eq!(evaluate_json_path_locations("$", doc).unwrap(), r#"["$"]"#);
        assert_eq!(evaluate_json_path_locations("$.x", doc).unwrap(), "[]");

        let options = OutputOptions {
            layout: Layout::Pretty { indent: 4 },
            report: Report::Paths,
        };
        assert_eq!(
            evaluate_json_path_with("$.a.b", doc, &options).unwrap(),
            "[\n    \"$['a']['b']\"\n]"
        );
    }
}
