use super::ast::{JsonPath, Selector, Slice, Step};
use super::filter;
use super::location::{LocationId, NormalizedPath, PathElement, Trail};
use crate::document::node::JsonValue;
use log::{debug, trace};

/// A value selected by a query, with a handle to where it was found.
#[derive(Debug, Clone, Copy)]
struct Match<'a> {
    value: &'a JsonValue,
    location: LocationId,
}

/// The ordered result of evaluating a query.
///
/// Matches appear in the order they were produced: context order first,
/// then document order within each context. Nothing is deduplicated.
pub struct MatchSet<'a> {
    matches: Vec<Match<'a>>,
    trail: Trail<'a>,
}

impl<'a> MatchSet<'a> {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Iterates over the matched values.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &'a JsonValue> + ExactSizeIterator + '_ {
        self.matches.iter().map(|m| m.value)
    }

    /// Normalized paths of the matches, in match order.
    pub fn paths(&self) -> Vec<NormalizedPath<'a>> {
        self.matches
            .iter()
            .map(|m| self.trail.resolve(m.location))
            .collect()
    }

    /// Pairs of (location, value) in match order.
    pub fn entries(&self) -> Vec<(NormalizedPath<'a>, &'a JsonValue)> {
        self.matches
            .iter()
            .map(|m| (self.trail.resolve(m.location), m.value))
            .collect()
    }
}

/// Evaluates compiled JSONPath queries against one document.
///
/// The evaluator only borrows the document, so any number of evaluators may
/// run against the same document from different threads.
pub struct Evaluator<'a> {
    root: &'a JsonValue,
}

impl<'a> Evaluator<'a> {
    pub fn new(root: &'a JsonValue) -> Self {
        Evaluator { root }
    }

    /// Evaluates a JSONPath query and returns every match.
    ///
    /// # Example
    ///
    /// ```
    /// use pathquill::document::parser::parse_json;
    /// use pathquill::jsonpath::{Evaluator, JsonPath};
    ///
    /// let doc = parse_json(r#"{"items": [{"v": 1}, {"v": 2}, {"v": 3}]}"#).unwrap();
    /// let path = JsonPath::parse("$.items[?(@.v > 1)].v").unwrap();
    /// let matches = Evaluator::new(&doc).evaluate(&path);
    ///
    /// let values: Vec<f64> = matches.values().filter_map(|v| v.as_f64()).collect();
    /// assert_eq!(values, vec![2.0, 3.0]);
    /// assert_eq!(matches.paths()[0].to_string(), "$['items'][1]['v']");
    /// ```
    pub fn evaluate(&self, path: &JsonPath) -> MatchSet<'a> {
        let mut trail = Trail::new();
        let mut current: Vec<Match<'a>> = Vec::new();

        // Process each step
        for step in &path.steps {
            let mut next = Vec::new();
            match step {
                Step::Root => next.push(Match {
                    value: self.root,
                    location: Trail::ROOT,
                }),
                Step::Dynamic(inner) => {
                    let keys: Vec<&'a JsonValue> = self.evaluate(inner).values().collect();
                    for context in &current {
                        self.select_dynamic(*context, &keys, &mut trail, &mut next);
                    }
                }
                _ => {
                    for context in &current {
                        self.evaluate_step(*context, step, &mut trail, &mut next);
                    }
                }
            }
            trace!("step {}: {} -> {} matches", step, current.len(), next.len());
            current = next;
        }

        debug!("query {} matched {} values", path, current.len());
        MatchSet {
            matches: current,
            trail,
        }
    }

    /// Evaluates a single step against one context value, appending
    /// results to `out`.
    fn evaluate_step(
        &self,
        context: Match<'a>,
        step: &Step,
        trail: &mut Trail<'a>,
        out: &mut Vec<Match<'a>>,
    ) {
        match step {
            // Both are resolved once per step in `evaluate`
            Step::Root | Step::Dynamic(_) => {}
            Step::Child(name) => self.find_child(context, name, trail, out),
            Step::Index(idx) => self.get_array_element(context, *idx, trail, out),
            Step::Wildcard => self.get_all_children(context, trail, out),
            Step::RecursiveDescent => self.recursive_descent(context, trail, out),
            Step::Slice(slice) => self.get_slice(context, slice, trail, out),
            Step::Filter(expr) => {
                let mut children = Vec::new();
                self.get_all_children(context, trail, &mut children);
                out.extend(
                    children
                        .into_iter()
                        .filter(|child| filter::matches(expr, child.value, self.root)),
                );
            }
            Step::Union(selectors) => {
                for selector in selectors {
                    match selector {
                        Selector::Child(name) => self.find_child(context, name, trail, out),
                        Selector::Index(idx) => {
                            self.get_array_element(context, *idx, trail, out)
                        }
                    }
                }
            }
        }
    }

    fn find_child(
        &self,
        context: Match<'a>,
        name: &str,
        trail: &mut Trail<'a>,
        out: &mut Vec<Match<'a>>,
    ) {
        if let JsonValue::Object(props) = context.value {
            if let Some((key, child)) = props.get_key_value(name) {
                out.push(Match {
                    value: child,
                    location: trail.push(context.location, PathElement::Key(key)),
                });
            }
        }
    }

    fn get_array_element(
        &self,
        context: Match<'a>,
        idx: i64,
        trail: &mut Trail<'a>,
        out: &mut Vec<Match<'a>>,
    ) {
        if let JsonValue::Array(items) = context.value {
            let len = items.len() as i64;
            let normalized_idx = if idx < 0 { len + idx } else { idx };

            if normalized_idx >= 0 && normalized_idx < len {
                let i = normalized_idx as usize;
                out.push(Match {
                    value: &items[i],
                    location: trail.push(context.location, PathElement::Index(i)),
                });
            }
        }
    }

    fn get_all_children(
        &self,
        context: Match<'a>,
        trail: &mut Trail<'a>,
        out: &mut Vec<Match<'a>>,
    ) {
        match context.value {
            JsonValue::Object(props) => {
                for (key, child) in props {
                    out.push(Match {
                        value: child,
                        location: trail.push(context.location, PathElement::Key(key)),
                    });
                }
            }
            JsonValue::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    out.push(Match {
                        value: child,
                        location: trail.push(context.location, PathElement::Index(i)),
                    });
                }
            }
            _ => {}
        }
    }

    fn get_slice(
        &self,
        context: Match<'a>,
        slice: &Slice,
        trail: &mut Trail<'a>,
        out: &mut Vec<Match<'a>>,
    ) {
        if let JsonValue::Array(items) = context.value {
            for i in slice.indices(items.len()) {
                out.push(Match {
                    value: &items[i],
                    location: trail.push(context.location, PathElement::Index(i)),
                });
            }
        }
    }

    /// Emits `context` and all of its descendants in pre-order, using an
    /// explicit stack so depth is limited only by memory.
    fn recursive_descent(
        &self,
        context: Match<'a>,
        trail: &mut Trail<'a>,
        out: &mut Vec<Match<'a>>,
    ) {
        let mut stack = vec![context];
        while let Some(node) = stack.pop() {
            out.push(node);
            match node.value {
                JsonValue::Object(props) => {
                    for (key, child) in props.iter().rev() {
                        stack.push(Match {
                            value: child,
                            location: trail.push(node.location, PathElement::Key(key)),
                        });
                    }
                }
                JsonValue::Array(items) => {
                    for (i, child) in items.iter().enumerate().rev() {
                        stack.push(Match {
                            value: child,
                            location: trail.push(node.location, PathElement::Index(i)),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    /// Uses each key computed from the root as a member name (strings) or
    /// an array index (integral numbers).
    fn select_dynamic(
        &self,
        context: Match<'a>,
        keys: &[&'a JsonValue],
        trail: &mut Trail<'a>,
        out: &mut Vec<Match<'a>>,
    ) {
        for key in keys {
            match key {
                JsonValue::String(name) => self.find_child(context, name, trail, out),
                JsonValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                    self.get_array_element(context, *n as i64, trail, out)
                }
                _ => {}
            }
        }
    }
}
