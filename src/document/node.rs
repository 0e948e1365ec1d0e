//! JSON value representation.
//!
//! This module provides the in-memory tree that every other part of pathquill
//! works on. A `JsonValue` owns its children exclusively; objects keep their
//! members in insertion order so that query results come back in document order.
//!
//! # Example
//!
//! ```
//! use pathquill::document::node::JsonValue;
//! use indexmap::IndexMap;
//!
//! let mut fields = IndexMap::new();
//! fields.insert("name".to_string(), JsonValue::String("pathquill".to_string()));
//! fields.insert("version".to_string(), JsonValue::Number(1.0));
//! let object = JsonValue::Object(fields);
//!
//! assert!(object.is_object());
//! assert_eq!(object.get("version"), Some(&JsonValue::Number(1.0)));
//! ```

use indexmap::IndexMap;

/// A parsed JSON value.
///
/// Numbers are stored as `f64`. Object keys are unique; inserting a key that
/// already exists replaces the value but keeps the key's original position.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonValue {
    /// The `null` literal
    #[default]
    Null,
    /// `true` or `false`
    Bool(bool),
    /// Any JSON number
    Number(f64),
    /// A JSON string
    String(String),
    /// An ordered sequence of values
    Array(Vec<JsonValue>),
    /// Key-value pairs in insertion order
    Object(IndexMap<String, JsonValue>),
}

impl JsonValue {
    /// Returns true if this value is an object.
    ///
    /// # Example
    ///
    /// ```
    /// use pathquill::document::node::JsonValue;
    /// use indexmap::IndexMap;
    ///
    /// assert!(JsonValue::Object(IndexMap::new()).is_object());
    /// assert!(!JsonValue::Number(42.0).is_object());
    /// ```
    pub fn is_object(&self) -> bool {
        matches!(self, JsonValue::Object(_))
    }

    /// Returns true if this value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, JsonValue::Array(_))
    }

    /// Returns true if this value is an array or an object.
    pub fn is_container(&self) -> bool {
        matches!(self, JsonValue::Array(_) | JsonValue::Object(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, JsonValue>> {
        match self {
            JsonValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Looks up an object member by key. Returns `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|fields| fields.get(key))
    }

    /// Looks up an array element. Negative indices count from the end.
    ///
    /// # Example
    ///
    /// ```
    /// use pathquill::document::node::JsonValue;
    ///
    /// let arr = JsonValue::Array(vec![JsonValue::Number(1.0), JsonValue::Number(2.0)]);
    /// assert_eq!(arr.get_index(-1), Some(&JsonValue::Number(2.0)));
    /// assert_eq!(arr.get_index(2), None);
    /// ```
    pub fn get_index(&self, index: i64) -> Option<&JsonValue> {
        let items = self.as_array()?;
        let len = items.len() as i64;
        let normalized = if index < 0 { len + index } else { index };
        if normalized >= 0 && normalized < len {
            items.get(normalized as usize)
        } else {
            None
        }
    }

    /// Number of direct children (0 for scalars).
    pub fn len(&self) -> usize {
        match self {
            JsonValue::Array(items) => items.len(),
            JsonValue::Object(fields) => fields.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the JSON type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "boolean",
            JsonValue::Number(_) => "number",
            JsonValue::String(_) => "string",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }
}

// Children are detached onto a heap work list so that freeing a deeply nested
// tree does not recurse once per level.
impl Drop for JsonValue {
    fn drop(&mut self) {
        let mut pending: Vec<JsonValue> = match self {
            JsonValue::Array(items) if !items.is_empty() => std::mem::take(items),
            JsonValue::Object(fields) if !fields.is_empty() => {
                fields.drain(..).map(|(_, v)| v).collect()
            }
            _ => return,
        };

        while let Some(mut value) = pending.pop() {
            match &mut value {
                JsonValue::Array(items) => pending.append(items),
                JsonValue::Object(fields) => pending.extend(fields.drain(..).map(|(_, v)| v)),
                _ => {}
            }
        }
    }
}

impl From<bool> for JsonValue {
    fn from(b: bool) -> Self {
        JsonValue::Bool(b)
    }
}

impl From<f64> for JsonValue {
    fn from(n: f64) -> Self {
        JsonValue::Number(n)
    }
}

impl From<i64> for JsonValue {
    fn from(n: i64) -> Self {
        JsonValue::Number(n as f64)
    }
}

impl From<&str> for JsonValue {
    fn from(s: &str) -> Self {
        JsonValue::String(s.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(s: String) -> Self {
        JsonValue::String(s)
    }
}

impl From<Vec<JsonValue>> for JsonValue {
    fn from(items: Vec<JsonValue>) -> Self {
        JsonValue::Array(items)
    }
}

impl From<IndexMap<String, JsonValue>> for JsonValue {
    fn from(fields: IndexMap<String, JsonValue>) -> Self {
        JsonValue::Object(fields)
    }
}

/// Converts from `serde_json::Value`. Intended for fixtures and interop with
/// shallow data; large documents should go through `document::parser`.
impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => JsonValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(fields) => JsonValue::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&JsonValue> for serde_json::Value {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => serde_json::Value::Null,
            JsonValue::Bool(b) => serde_json::Value::Bool(*b),
            JsonValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serde_json::Value::from(*n as i64)
            }
            JsonValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            JsonValue::String(s) => serde_json::Value::String(s.clone()),
            JsonValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            JsonValue::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}
