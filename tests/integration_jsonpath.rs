//! End-to-end tests for `evaluate_json_path` against a bookstore document.
//!
//! Documents are written as raw JSON text so that member order is exactly
//! what the queries see.

use pathquill::{evaluate_json_path, evaluate_json_path_locations, ErrorKind};
use serde_json::{json, Value};

/// Helper to create a sample bookstore JSON document
fn bookstore() -> String {
    r#"{
      "store": {
        "book": [
          {
            "category": "reference",
            "author": "Nigel Rees",
            "title": "Sayings of the Century",
            "price": 8.95
          },
          {
            "category": "fiction",
            "author": "Evelyn Waugh",
            "title": "Sword of Honour",
            "price": 12.99
          },
          {
            "category": "fiction",
            "author": "Evelyn Waugh",
            "title": "Old man and the sea",
            "price": 12.99
          },
          {
            "category": "fiction",
            "author": "Herman Melville",
            "title": "Moby Dick",
            "isbn": "0-553-21311-3",
            "price": 8.99
          },
          {
            "category": "fiction",
            "author": "J. R. R. Tolkien",
            "title": "The Lord of the Rings",
            "isbn": "0-395-19395-8",
            "price": 22.99
          }
        ],
        "bicycle": {
          "color": "red",
          "price": 19.95
        }
      },
      "expensive": 10
    }"#
    .to_string()
}

/// Runs a query and parses the output back for structural comparison.
fn query(path: &str) -> Value {
    let out = evaluate_json_path(path, &bookstore()).unwrap();
    serde_json::from_str(&out).unwrap()
}

#[test]
fn test_all_authors() {
    assert_eq!(
        query("$.store.book[*].author"),
        json!([
            "Nigel Rees",
            "Evelyn Waugh",
            "Evelyn Waugh",
            "Herman Melville",
            "J. R. R. Tolkien"
        ])
    );
}

#[test]
fn test_recursive_authors_match_wildcard_authors() {
    assert_eq!(query("$..author"), query("$.store.book[*].author"));
}

#[test]
fn test_all_prices_in_document_order() {
    assert_eq!(
        query("$..price"),
        json!([8.95, 12.99, 12.99, 8.99, 22.99, 19.95])
    );
}

#[test]
fn test_everything_in_store() {
    let store = query("$.store.*");
    assert_eq!(store.as_array().unwrap().len(), 2);
    assert_eq!(store[1], json!({"color": "red", "price": 19.95}));
}

#[test]
fn test_third_and_last_book() {
    assert_eq!(query("$..book[2].title"), json!(["Old man and the sea"]));
    assert_eq!(query("$.store.book[2].title"), json!("Old man and the sea"));
    assert_eq!(query("$.store.book[-1].title"), json!("The Lord of the Rings"));
}

#[test]
fn test_first_two_books() {
    assert_eq!(
        query("$.store.book[:2].author"),
        json!(["Nigel Rees", "Evelyn Waugh"])
    );
    assert_eq!(
        query("$.store.book[0,1].author"),
        json!(["Nigel Rees", "Evelyn Waugh"])
    );
}

#[test]
fn test_books_with_isbn() {
    assert_eq!(
        query("$..book[?(@.isbn)].title"),
        json!(["Moby Dick", "The Lord of the Rings"])
    );
}

#[test]
fn test_filter_by_string_equality() {
    assert_eq!(
        query("$.store.book[?(@.category == 'reference')]"),
        json!([{
            "category": "reference",
            "author": "Nigel Rees",
            "title": "Sayings of the Century",
            "price": 8.95
        }])
    );
}

#[test]
fn test_filter_by_number_equality() {
    assert_eq!(
        query("$.store.book[?(@.price == 12.99)].title"),
        json!(["Sword of Honour", "Old man and the sea"])
    );
}

#[test]
fn test_filter_against_root_value() {
    assert_eq!(
        query("$.store.book[?(@.price < $.expensive)].price"),
        json!([8.95, 8.99])
    );
}

#[test]
fn test_filter_with_logical_operators() {
    assert_eq!(
        query("$.store.book[?(@.category == 'fiction' && @.price < 10)].author"),
        json!(["Herman Melville"])
    );
    assert_eq!(
        query("$.store.book[?(@.price < 9 || @.price > 20)].title"),
        json!(["Sayings of the Century", "Moby Dick", "The Lord of the Rings"])
    );
    assert_eq!(
        query("$.store.book[?(!@.isbn)].title").as_array().unwrap().len(),
        3
    );
}

#[test]
fn test_nested_existence_filter() {
    let doc = r#"{"test": {"array": [{"value": 5, "blarg": {"test": 15}}, {"value": 7}, {}]}}"#;
    assert_eq!(
        evaluate_json_path("$.test.array[?(@.blarg.test)]", doc).unwrap(),
        r#"[{"value":5,"blarg":{"test":15}}]"#
    );
}

#[test]
fn test_dynamic_key_from_root() {
    let doc = r#"{"myKey": "key", "object": {"key": "SUCCESS"}}"#;
    assert_eq!(
        evaluate_json_path("$.object[$.myKey]", doc).unwrap(),
        r#""SUCCESS""#
    );
}

#[test]
fn test_mixed_bracket_and_dot_traversal() {
    let doc = r#"{"test": "blarg", "whatev": {"test": "hi!"}}"#;
    for path in ["$[\"whatev\"].test", "$[\"whatev\"][\"test\"]", "$.whatev.test", "$['whatev']['test']"] {
        assert_eq!(evaluate_json_path(path, doc).unwrap(), r#""hi!""#, "{}", path);
    }
}

#[test]
fn test_numeric_member_names() {
    let doc = r#"{"test": {"123": "digits"}}"#;
    assert_eq!(evaluate_json_path("$.test.123", doc).unwrap(), r#""digits""#);
}

#[test]
fn test_simple_member() {
    assert_eq!(
        evaluate_json_path("$.blarg", r#"{"blarg":5,"test":5}"#).unwrap(),
        "5"
    );
}

#[test]
fn test_locations_of_cheap_books() {
    assert_eq!(
        evaluate_json_path_locations("$.store.book[?(@.price < 9)]", &bookstore()).unwrap(),
        r#"["$['store']['book'][0]","$['store']['book'][3]"]"#
    );
}

#[test]
fn test_errors_surface_with_kind() {
    let doc = bookstore();
    assert_eq!(
        evaluate_json_path("store.book", &doc).unwrap_err().kind(),
        ErrorKind::QueryParseError
    );
    assert_eq!(
        evaluate_json_path("$.store.book[?(@.title =~ /Moby/)]", &doc)
            .unwrap_err()
            .kind(),
        ErrorKind::UnsupportedExpression
    );
    assert_eq!(
        evaluate_json_path("$", &doc[..doc.len() - 1]).unwrap_err().kind(),
        ErrorKind::DocumentParseError
    );
}
