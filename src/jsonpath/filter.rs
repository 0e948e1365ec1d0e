//! Predicate evaluation for filter steps.
//!
//! Filters never fail at runtime. A path that does not resolve makes an
//! existence test false and makes every comparison it takes part in false,
//! including `!=`.

use super::ast::{Anchor, CompareOp, FilterExpr, FilterPath, Operand, Selector};
use crate::document::node::JsonValue;
use std::cmp::Ordering;

/// Evaluates `expr` with `@` bound to `current`.
pub(crate) fn matches(expr: &FilterExpr, current: &JsonValue, root: &JsonValue) -> bool {
    match expr {
        FilterExpr::Exists(path) => resolve(path, current, root).is_some(),
        FilterExpr::Compare { left, op, right } => {
            let left = operand_value(left, current, root);
            let right = operand_value(right, current, root);
            match (left, right) {
                (Some(l), Some(r)) => compare(*op, l, r),
                _ => false,
            }
        }
        FilterExpr::And(left, right) => {
            matches(left, current, root) && matches(right, current, root)
        }
        FilterExpr::Or(left, right) => {
            matches(left, current, root) || matches(right, current, root)
        }
        FilterExpr::Not(inner) => !matches(inner, current, root),
    }
}

fn operand_value<'v>(
    operand: &'v Operand,
    current: &'v JsonValue,
    root: &'v JsonValue,
) -> Option<&'v JsonValue> {
    match operand {
        Operand::Path(path) => resolve(path, current, root),
        Operand::Literal(value) => Some(value),
    }
}

/// Follows a singular filter path, returning `None` as soon as a segment
/// does not apply.
pub(crate) fn resolve<'v>(
    path: &FilterPath,
    current: &'v JsonValue,
    root: &'v JsonValue,
) -> Option<&'v JsonValue> {
    let start = match path.anchor {
        Anchor::Current => current,
        Anchor::Root => root,
    };
    path.selectors
        .iter()
        .try_fold(start, |value, selector| match selector {
            Selector::Child(name) => value.get(name),
            Selector::Index(index) => value.get_index(*index),
        })
}

fn compare(op: CompareOp, left: &JsonValue, right: &JsonValue) -> bool {
    match op {
        CompareOp::Eq => left == right,
        CompareOp::Ne => left != right,
        CompareOp::Lt => order(left, right) == Some(Ordering::Less),
        CompareOp::Le => matches!(order(left, right), Some(Ordering::Less | Ordering::Equal)),
        CompareOp::Gt => order(left, right) == Some(Ordering::Greater),
        CompareOp::Ge => matches!(
            order(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

/// Only numbers with numbers and strings with strings are ordered.
fn order(left: &JsonValue, right: &JsonValue) -> Option<Ordering> {
    match (left, right) {
        (JsonValue::Number(a), JsonValue::Number(b)) => a.partial_cmp(b),
        (JsonValue::String(a), JsonValue::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
