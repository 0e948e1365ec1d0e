//! Property tests for query evaluation over generated documents.

use pathquill::document::parser::parse_json;
use pathquill::document::serializer::to_json_string;
use pathquill::jsonpath::{Evaluator, JsonPath};
use pathquill::{evaluate_json_path, evaluate_json_path_locations};
use proptest::prelude::*;
use serde_json::Value;

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1_000_000i64..1_000_000i64).prop_map(Value::from),
        (-1.0e6f64..1.0e6f64).prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-c]{1,2}", inner), 0..6)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
        ]
    })
}

fn locations(query: &str, doc: &str) -> Vec<String> {
    let out = evaluate_json_path_locations(query, doc).unwrap();
    serde_json::from_str(&out).unwrap()
}

const QUERIES: &[&str] = &[
    "$",
    "$.a",
    "$..b",
    "$.*",
    "$..*",
    "$[0]",
    "$[-1]",
    "$[1:]",
    "$[::-1]",
    "$['a','b']",
    "$..[?(@.a)]",
    "$..[?(@ > 0)]",
    "$[$.c]",
];

const NAMES: &[&str] = &["a", "b", "ab", "ca"];

proptest! {
    /// `$` returns the whole document in canonical form.
    #[test]
    fn prop_root_is_identity(value in json_value()) {
        let text = value.to_string();
        let out = evaluate_json_path("$", &text).unwrap();
        prop_assert_eq!(&out, &to_json_string(&parse_json(&text).unwrap()));
        prop_assert_eq!(evaluate_json_path("$", &out).unwrap(), out);
    }

    /// The same query on the same document always gives the same text.
    #[test]
    fn prop_evaluation_is_deterministic(
        value in json_value(),
        query in prop::sample::select(QUERIES),
    ) {
        let text = value.to_string();
        let first = evaluate_json_path(query, &text).unwrap();
        let second = evaluate_json_path(query, &text).unwrap();
        prop_assert_eq!(first, second);
    }

    /// `[-i]` selects the same element as `[len - i]`.
    #[test]
    fn prop_negative_index_counts_from_end(
        items in prop::collection::vec(json_value(), 1..8),
        back in 1usize..8,
    ) {
        prop_assume!(back <= items.len());
        let text = Value::Array(items.clone()).to_string();
        let from_end = evaluate_json_path(&format!("$[-{}]", back), &text).unwrap();
        let from_start = evaluate_json_path(&format!("$[{}]", items.len() - back), &text).unwrap();
        prop_assert_eq!(from_end, from_start);
    }

    /// Recursive descent finds every direct child, and at least as many
    /// values as a wildcard.
    #[test]
    fn prop_recursive_descent_includes_children(value in json_value()) {
        let text = value.to_string();
        let children = locations("$.*", &text);
        let descendants = locations("$..*", &text);
        prop_assert!(descendants.len() >= children.len());
        for path in &children {
            prop_assert!(descendants.contains(path));
        }
    }

    /// Every match of `$.name` is also a match of `$..name`.
    #[test]
    fn prop_recursive_descent_includes_named_child(
        value in json_value(),
        name in prop::sample::select(NAMES),
    ) {
        let text = value.to_string();
        let direct = locations(&format!("$.{}", name), &text);
        let descendants = locations(&format!("$..{}", name), &text);
        prop_assert!(descendants.len() >= direct.len());
        for path in &direct {
            prop_assert!(descendants.contains(path));
        }

        let doc = parse_json(&text).unwrap();
        let evaluator = Evaluator::new(&doc);
        let direct_values = evaluator.evaluate(&JsonPath::parse(&format!("$.{}", name)).unwrap());
        let descendant_values = evaluator.evaluate(&JsonPath::parse(&format!("$..{}", name)).unwrap());
        for found in direct_values.values() {
            prop_assert!(descendant_values.values().any(|v| std::ptr::eq(v, found)));
        }
    }

    /// The path reported for a match selects exactly that one value.
    #[test]
    fn prop_reported_paths_resolve(value in json_value()) {
        let text = value.to_string();
        let doc = parse_json(&text).unwrap();
        for path in locations("$..a", &text) {
            let compiled = JsonPath::parse(&path).unwrap();
            prop_assert!(compiled.is_singular());
            prop_assert_eq!(Evaluator::new(&doc).evaluate(&compiled).len(), 1);
        }
    }

    /// Arbitrary query text is either compiled or rejected, never a panic.
    #[test]
    fn prop_query_parser_never_panics(query in "\\PC{0,24}") {
        let _ = JsonPath::parse(&query);
        let _ = JsonPath::parse(&format!("${}", query));
    }

    /// Arbitrary document text is either parsed or rejected with an offset
    /// inside the input.
    #[test]
    fn prop_document_errors_are_in_bounds(text in "[\\[\\]{}\",:0-9a-z \\\\.-]{0,32}") {
        if let Err(err) = parse_json(&text) {
            prop_assert!(err.offset() <= text.len());
        }
    }
}
