//! JSON document model: value tree, text parser, and serializer.

pub mod node;
pub mod parser;
pub mod serializer;

pub use node::JsonValue;
pub use parser::{parse_json, DocumentError};
pub use serializer::{to_json_string, to_json_string_pretty, Layout};
