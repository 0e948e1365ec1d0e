//! Abstract syntax tree types for JSONPath expressions.

use crate::document::node::JsonValue;
use crate::document::serializer::{format_number, write_string};
use std::fmt;

/// A step in a JSONPath expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Root node ($)
    Root,
    /// Named child (.property or ['property'])
    Child(String),
    /// Array index ([0], [-1])
    Index(i64),
    /// Wildcard (* or [*]) - all children
    Wildcard,
    /// Recursive descent (..) - the node itself and every descendant
    RecursiveDescent,
    /// Array slice ([start:end:step])
    Slice(Slice),
    /// Filter ([?(@.price < 10)])
    Filter(FilterExpr),
    /// Several names or indices in one bracket (['a','b'] or [0,2])
    Union(Vec<Selector>),
    /// Key computed from a root path ([$.key])
    Dynamic(JsonPath),
}

/// A member of a union step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Child(String),
    Index(i64),
}

/// Array slice bounds, following Python slice semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<i64>,
    pub end: Option<i64>,
    /// Never zero; the parser rejects `[::0]`.
    pub step: Option<i64>,
}

impl Slice {
    pub fn new(start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Self {
        Self { start, end, step }
    }

    /// Computes the selected indices of an array of length `len`, in
    /// selection order.
    ///
    /// # Example
    ///
    /// ```
    /// use pathquill::jsonpath::ast::Slice;
    ///
    /// assert_eq!(Slice::new(Some(1), Some(3), None).indices(5), vec![1, 2]);
    /// assert_eq!(Slice::new(None, None, Some(-1)).indices(3), vec![2, 1, 0]);
    /// assert_eq!(Slice::new(Some(-2), None, None).indices(5), vec![3, 4]);
    /// ```
    pub fn indices(&self, len: usize) -> Vec<usize> {
        let len = len as i64;
        let step = self.step.unwrap_or(1);
        let normalize = |bound: i64| if bound < 0 { len + bound } else { bound };

        let mut indices = Vec::new();
        if step > 0 {
            let start = self.start.map(normalize).unwrap_or(0).clamp(0, len);
            let end = self.end.map(normalize).unwrap_or(len).clamp(0, len);
            let mut i = start;
            while i < end {
                indices.push(i as usize);
                match i.checked_add(step) {
                    Some(next) => i = next,
                    None => break,
                }
            }
        } else if step < 0 {
            // -1 stands for "before the first element" here.
            let start = self.start.map(normalize).unwrap_or(len - 1).clamp(-1, len - 1);
            let end = self.end.map(normalize).unwrap_or(-1).clamp(-1, len - 1);
            let mut i = start;
            while i > end {
                indices.push(i as usize);
                match i.checked_add(step) {
                    Some(next) => i = next,
                    None => break,
                }
            }
        }
        indices
    }
}

/// Where a path inside a filter starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `@` - the element being tested
    Current,
    /// `$` - the document root
    Root,
}

/// A singular path used inside a filter expression (`@.a.b[0]`, `$.limit`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPath {
    pub anchor: Anchor,
    pub selectors: Vec<Selector>,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Path(FilterPath),
    Literal(JsonValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Boolean expression evaluated against each candidate of a filter step.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// True when the path resolves to any value, including `null`
    Exists(FilterPath),
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
    Not(Box<FilterExpr>),
}

/// A complete JSONPath expression.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    /// Steps that make up the path; the first is always `Step::Root`.
    pub steps: Vec<Step>,
}

impl JsonPath {
    /// Creates a new JsonPath with the given steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Parses a query string. Shorthand for `Parser::parse`.
    pub fn parse(query: &str) -> Result<Self, super::error::ParseError> {
        super::parser::Parser::parse(query)
    }

    /// Returns true if the query's shape can select at most one value.
    ///
    /// This depends only on the steps, never on a document: a filter or a
    /// wildcard makes the query multi-valued even if it happens to match once.
    ///
    /// # Example
    ///
    /// ```
    /// use pathquill::jsonpath::ast::JsonPath;
    ///
    /// assert!(JsonPath::parse("$.store.book[0]").unwrap().is_singular());
    /// assert!(!JsonPath::parse("$.store.book[*]").unwrap().is_singular());
    /// assert!(!JsonPath::parse("$..author").unwrap().is_singular());
    /// ```
    pub fn is_singular(&self) -> bool {
        self.steps.iter().all(|step| match step {
            Step::Root | Step::Child(_) | Step::Index(_) => true,
            Step::Dynamic(inner) => inner.is_singular(),
            _ => false,
        })
    }
}

/// Quotes a member name with single quotes, escaping it like a JSON string.
pub(crate) fn quote_name(name: &str) -> String {
    let mut escaped = String::new();
    write_string(&mut escaped, name);
    let inner = &escaped[1..escaped.len() - 1];
    format!("'{}'", inner.replace("\\\"", "\"").replace('\'', "\\'"))
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Child(name) => f.write_str(&quote_name(name)),
            Selector::Index(i) => write!(f, "{}", i),
        }
    }
}

impl fmt::Display for FilterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.anchor {
            Anchor::Current => "@",
            Anchor::Root => "$",
        })?;
        for selector in &self.selectors {
            write!(f, "[{}]", selector)?;
        }
        Ok(())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Path(path) => write!(f, "{}", path),
            Operand::Literal(JsonValue::String(s)) => f.write_str(&quote_name(s)),
            Operand::Literal(JsonValue::Number(n)) => f.write_str(&format_number(*n)),
            Operand::Literal(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Exists(path) => write!(f, "{}", path),
            FilterExpr::Compare { left, op, right } => {
                write!(f, "{} {} {}", left, op.as_str(), right)
            }
            FilterExpr::And(left, right) => write!(f, "({} && {})", left, right),
            FilterExpr::Or(left, right) => write!(f, "({} || {})", left, right),
            FilterExpr::Not(inner) => write!(f, "!({})", inner),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Root => f.write_str("$"),
            Step::Child(name) => write!(f, "[{}]", quote_name(name)),
            Step::Index(i) => write!(f, "[{}]", i),
            Step::Wildcard => f.write_str("[*]"),
            Step::RecursiveDescent => f.write_str(".."),
            Step::Slice(slice) => {
                let bound = |b: Option<i64>| b.map(|v| v.to_string()).unwrap_or_default();
                write!(f, "[{}:{}", bound(slice.start), bound(slice.end))?;
                if let Some(step) = slice.step {
                    write!(f, ":{}", step)?;
                }
                f.write_str("]")
            }
            Step::Filter(expr) => write!(f, "[?({})]", expr),
            Step::Union(selectors) => {
                let parts: Vec<String> = selectors.iter().map(|s| s.to_string()).collect();
                write!(f, "[{}]", parts.join(","))
            }
            Step::Dynamic(inner) => write!(f, "[{}]", inner),
        }
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}
