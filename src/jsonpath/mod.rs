//! JSONPath query parser and evaluator.
//!
//! Queries are compiled once into a [`JsonPath`] and can then be evaluated
//! against any number of documents. Evaluation never fails: a step that does
//! not apply to a value simply produces nothing for it.
//!
//! # Supported Syntax
//!
//! - `$` - Root node
//! - `.property` - Named property access
//! - `['property']` or `["property"]` - Bracket notation
//! - `[index]` - Array index (supports negative indices)
//! - `[*]` or `.*` - All children (wildcard)
//! - `..property`, `..*`, `..[...]` - Recursive descent
//! - `[start:end:step]` - Array slicing
//! - `['prop1','prop2']`, `[0,2]` - Unions
//! - `[?(expr)]` - Filters with `@`, `$`, `==`, `!=`, `<`, `<=`, `>`, `>=`,
//!   `&&`, `||`, `!` and parentheses
//! - `[$.path]` - Member name or index computed from the root
//!
//! # Examples
//!
//! ```
//! // $.store.book[*].author - all book authors
//! // $..price - all price fields anywhere
//! // $.items[0:3] - first 3 items
//! // $.items[?(@.price < 10)] - items cheaper than 10
//! // $.object[$.key] - the member of object named by key
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
mod filter;
pub mod location;
pub mod parser;

pub use ast::{JsonPath, Step};
pub use error::ParseError;
pub use evaluator::{Evaluator, MatchSet};
pub use location::{NormalizedPath, PathElement};
pub use parser::Parser;
