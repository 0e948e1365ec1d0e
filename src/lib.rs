//! PathQuill - evaluate JSONPath queries against JSON documents.
//!
//! The core entry point is [`evaluate_json_path`], which takes a query and a
//! document as text and returns the matches as JSON text:
//!
//! ```
//! let doc = r#"{"items": [{"v": 1}, {"v": 2}, {"v": 3}]}"#;
//! let out = pathquill::evaluate_json_path("$.items[?(@.v > 1)].v", doc).unwrap();
//! assert_eq!(out, "[2,3]");
//! ```
//!
//! The building blocks are public as well: [`document`] holds the value
//! model, JSON parser and serializer, and [`jsonpath`] the query compiler and
//! evaluator, for callers that want to reuse a parsed document or a compiled
//! query.

pub mod config;
pub mod document;
pub mod file;
pub mod jsonpath;
pub mod query;

pub use query::{
    evaluate_json_path, evaluate_json_path_locations, evaluate_json_path_with, ErrorKind,
    OutputOptions, QueryError, Report,
};
