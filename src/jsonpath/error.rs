//! Error types for JSONPath parsing.

use thiserror::Error;

/// Errors that can occur while parsing a JSONPath query.
///
/// Every variant carries the byte offset into the query text where the
/// problem was detected. Evaluation itself never fails, so there is no
/// runtime counterpart to this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The query does not begin with `$`.
    #[error("JSONPath must start with '$' (position {position})")]
    MissingRoot { position: usize },

    /// Malformed query text: unbalanced or empty brackets, stray characters,
    /// unterminated strings, bad numbers.
    #[error("Invalid JSONPath syntax at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// A slice with a step of zero.
    #[error("Invalid slice at position {position}: step cannot be zero")]
    InvalidSlice { position: usize },

    /// A filter construct that is recognised but not supported.
    #[error("Unsupported filter expression at position {position}: {detail}")]
    UnsupportedExpression { position: usize, detail: String },
}

impl ParseError {
    /// Byte offset into the query where the error was detected.
    pub fn position(&self) -> usize {
        match self {
            ParseError::MissingRoot { position }
            | ParseError::Syntax { position, .. }
            | ParseError::InvalidSlice { position }
            | ParseError::UnsupportedExpression { position, .. } => *position,
        }
    }

    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(position: usize, detail: impl Into<String>) -> Self {
        ParseError::UnsupportedExpression {
            position,
            detail: detail.into(),
        }
    }

    /// Description of the problem without the position.
    pub fn reason(&self) -> String {
        match self {
            ParseError::MissingRoot { .. } => "JSONPath must start with '$'".to_string(),
            ParseError::Syntax { message, .. } => message.clone(),
            ParseError::InvalidSlice { .. } => "slice step cannot be zero".to_string(),
            ParseError::UnsupportedExpression { detail, .. } => detail.clone(),
        }
    }
}
