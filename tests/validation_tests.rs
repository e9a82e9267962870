//! Validation integration tests
//!
//! Each test parses a schema and a JSON value from text, so messages carry
//! line/position suffixes exactly as callers see them.

use jsonschema3::{Error, JsonNode, JsonSchema, SchemaBuilder, SchemaResolver, Validator};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn check(schema: &str, value: &str) -> (bool, Vec<String>) {
    let schema = JsonSchema::parse(schema).expect("schema should parse");
    let value = JsonNode::parse(value).expect("value should parse");
    schema.is_valid_with_messages(&value)
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn test_pattern_search() {
    assert_eq!(check(r#"{"pattern": "lol"}"#, r#""pie lol""#), (true, vec![]));

    let schema = JsonSchema::parse(r#"{"pattern": "lol"}"#).unwrap();
    let value = JsonNode::from(serde_json::json!("pie"));
    let (valid, messages) = schema.is_valid_with_messages(&value);
    assert!(!valid);
    assert_eq!(messages, vec!["String 'pie' does not match regex pattern 'lol'."]);
}

#[test]
fn test_integer_type() {
    let schema = JsonSchema::parse(r#"{"type": "integer"}"#).unwrap();
    assert!(schema.is_valid(&JsonNode::from(serde_json::json!(1))));

    let (valid, messages) = schema.is_valid_with_messages(&JsonNode::from(serde_json::json!("pie")));
    assert!(!valid);
    assert_eq!(messages, vec!["Invalid type. Expected Integer but got String."]);
}

#[test]
fn test_numeric_type_compatibility() {
    assert!(check(r#"{"type": "number"}"#, "1").0);
    assert!(check(r#"{"type": "integer"}"#, "2.0").0);
    assert_eq!(
        check(r#"{"type": "integer"}"#, "2.5").1,
        vec!["Invalid type. Expected Integer but got Float. Line 1, position 1."]
    );
    assert_eq!(
        check(r#"{"type": ["string", "null"]}"#, "true").1,
        vec!["Invalid type. Expected String, Null but got Boolean. Line 1, position 1."]
    );
}

#[test]
fn test_disallow() {
    assert_eq!(
        check(r#"{"disallow": "number"}"#, "[1, \"a\"]").1,
        Vec::<String>::new()
    );
    assert_eq!(
        check(r#"{"items": {"disallow": ["number", "null"]}}"#, "[1, \"a\", null]").1,
        vec![
            "Type Integer is disallowed. Line 1, position 2.",
            "Type Null is disallowed. Line 1, position 10.",
        ]
    );
}

#[test]
fn test_exclusive_maximum() {
    let schema = r#"{"maximum": 10, "exclusiveMaximum": true}"#;
    assert_eq!(
        check(schema, "10").1,
        vec!["Integer 10 equals maximum value of 10 and exclusive maximum is true. Line 1, position 1."]
    );
    assert_eq!(check(schema, "9"), (true, vec![]));
}

#[test]
fn test_minimum_and_divisible_by() {
    assert_eq!(
        check(r#"{"minimum": 5, "divisibleBy": 2}"#, "3").1,
        vec![
            "Integer 3 is less than minimum value of 5. Line 1, position 1.",
            "Integer 3 is not evenly divisible by 2. Line 1, position 1.",
        ]
    );
    assert!(check(r#"{"divisibleBy": 0.01}"#, "0.07").0);
    assert_eq!(
        check(r#"{"divisibleBy": 0.01}"#, "0.075").1,
        vec!["Float 0.075 is not evenly divisible by 0.01. Line 1, position 1."]
    );
}

#[test]
fn test_string_lengths() {
    assert_eq!(
        check(r#"{"minLength": 2, "maxLength": 3}"#, r#"["a", "abcd", "ab"]"#).1,
        Vec::<String>::new(),
        "constraints apply to the root only"
    );
    assert_eq!(
        check(r#"{"items": {"minLength": 2, "maxLength": 3}}"#, r#"["a", "abcd", "ab"]"#).1,
        vec![
            "String 'a' is less than minimum length of 2. Line 1, position 2.",
            "String 'abcd' exceeds maximum length of 3. Line 1, position 7.",
        ]
    );
}

#[test]
fn test_enum() {
    let schema = r#"{"enum": [1, "two", {"three": [3]}]}"#;
    assert!(check(schema, "1").0);
    assert!(check(schema, "1.0").0);
    assert!(check(schema, r#"{"three": [3]}"#).0);
    assert_eq!(
        check(schema, r#"{"three": [3, 3]}"#).1,
        vec![r#"Value {"three":[3,3]} is not defined in enum. Line 1, position 1."#]
    );
}

#[test]
fn test_divisible_by_at_integer_bounds() {
    let schema = r#"{"divisibleBy": -1}"#;
    assert_eq!(check(schema, "-9223372036854775808"), (true, vec![]));
    assert_eq!(check(schema, "9223372036854775807"), (true, vec![]));
    assert_eq!(
        check(r#"{"divisibleBy": 2}"#, "-9223372036854775807").1,
        vec!["Integer -9223372036854775807 is not evenly divisible by 2. Line 1, position 1."]
    );
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn test_required_properties() {
    assert_eq!(
        check(r#"{"properties": {"lol": {"required": true}}}"#, "{}").1,
        vec!["Required properties are missing from object: lol. Line 1, position 1."]
    );
    assert_eq!(
        check(
            r#"{"properties": {"a": {"required": true}, "b": {}, "c": {"required": true}}}"#,
            "{\n  \"b\": {}\n}"
        )
        .1,
        vec!["Required properties are missing from object: a, c. Line 1, position 1."]
    );
}

#[test]
fn test_nested_paths() {
    let schema = JsonSchema::parse(
        r#"{"properties": {"foo": {"items": {"properties": {"bar": {"type": "string"}}}}}}"#,
    )
    .unwrap();
    let value = JsonNode::parse(r#"{"foo": [{}, {}, {"bar": 1}]}"#).unwrap();
    let errors = schema.iter_errors(&value);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), "foo[2].bar");
    assert_eq!(errors[0].line, Some(1));
    assert_eq!(errors[0].column, Some(26));
}

#[test]
fn test_additional_properties() {
    let schema = r#"{"properties": {"a": {}}, "additionalProperties": false}"#;
    assert!(check(schema, r#"{"a": 1}"#).0);
    assert_eq!(
        check(schema, r#"{"a": 1, "b": 2}"#).1,
        vec!["Property 'b' has not been defined and the schema does not allow additional properties. Line 1, position 15."]
    );

    let schema = r#"{"properties": {"a": {}}, "additionalProperties": {"type": "string"}}"#;
    assert_eq!(
        check(schema, r#"{"a": 1, "b": 2}"#).1,
        vec!["Invalid type. Expected String but got Integer. Line 1, position 15."]
    );
}

#[test]
fn test_pattern_properties() {
    let schema = r#"{
        "patternProperties": {"^x": {"type": "integer"}, "y$": {"minimum": 10}},
        "additionalProperties": false
    }"#;
    assert!(check(schema, r#"{"x1": 1, "ay": 11}"#).0);

    // matches both patterns
    assert_eq!(
        check(schema, r#"{"xy": 5.5}"#).1,
        vec![
            "Invalid type. Expected Integer but got Float. Line 1, position 8.",
            "Float 5.5 is less than minimum value of 10. Line 1, position 8.",
        ]
    );
    assert_eq!(
        check(schema, r#"{"z": 1}"#).1,
        vec!["Property 'z' has not been defined and the schema does not allow additional properties. Line 1, position 7."]
    );
}

#[test]
fn test_quoted_paths() {
    let schema = JsonSchema::parse(r#"{"additionalProperties": {"type": "null"}}"#).unwrap();
    let value = JsonNode::parse(r#"{"a b": 1}"#).unwrap();
    let errors = schema.iter_errors(&value);
    assert_eq!(errors[0].path(), "['a b']");
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn test_positional_items() {
    let schema = r#"{"items": [{"type": "string"}, {"type": "integer"}], "additionalItems": {"type": "boolean"}}"#;
    assert!(check(schema, r#"["a", 1, true, false]"#).0);
    assert_eq!(
        check(schema, r#"["a", 1, 2]"#).1,
        vec!["Invalid type. Expected Boolean but got Integer. Line 1, position 10."]
    );
}

#[test]
fn test_item_counts() {
    let schema = r#"{"minItems": 2, "maxItems": 3}"#;
    assert!(check(schema, "[1, 2]").0);
    assert_eq!(
        check(schema, "[1]").1,
        vec!["Array item count 1 is less than minimum count of 2. Line 1, position 1."]
    );
    assert_eq!(
        check(schema, "[1, 2, 3, 4]").1,
        vec!["Array item count 4 exceeds maximum count of 3. Line 1, position 1."]
    );
}

#[test]
fn test_unique_items_reports_against_first_occurrence() {
    assert_eq!(
        check(r#"{"uniqueItems": true}"#, r#"[1, 2, 1, 1, {"a": 1}, {"a": 1.0}]"#).1,
        vec![
            "Non-unique array item at index 2. Line 1, position 8.",
            "Non-unique array item at index 3. Line 1, position 11.",
            "Non-unique array item at index 5. Line 1, position 24.",
        ]
    );
}

// ============================================================================
// References and inheritance
// ============================================================================

#[test]
fn test_recursive_schema() {
    let schema = r#"{
        "id": "tree",
        "properties": {
            "value": {"type": "integer", "required": true},
            "children": {"type": "array", "items": {"$ref": "tree"}}
        }
    }"#;
    assert!(check(schema, r#"{"value": 1, "children": [{"value": 2, "children": []}]}"#).0);

    let schema = JsonSchema::parse(schema).unwrap();
    let value = JsonNode::parse(r#"{"value": 1, "children": [{"children": [{"value": "x"}]}]}"#).unwrap();
    let paths: Vec<String> = schema
        .iter_errors(&value)
        .iter()
        .map(|e| e.path().to_string())
        .collect();
    assert_eq!(paths, vec!["children[0].children[0].value", "children[0]"]);
}

#[test]
fn test_extends_merges_constraints() {
    let schema = r#"{
        "properties": {
            "name": {
                "extends": {"type": "string", "maxLength": 10, "enum": ["one", "two", "three"]},
                "maxLength": 4,
                "enum": ["four", "one"]
            }
        }
    }"#;
    assert!(check(schema, r#"{"name": "one"}"#).0);
    assert!(check(schema, r#"{"name": "four"}"#).0);
    assert_eq!(
        check(schema, r#"{"name": "three"}"#).1,
        vec!["String 'three' exceeds maximum length of 4. Line 1, position 10."]
    );
    assert_eq!(
        check(schema, r#"{"name": 1}"#).1,
        vec![
            "Invalid type. Expected String but got Integer. Line 1, position 10.",
            "Value 1 is not defined in enum. Line 1, position 10.",
        ]
    );
}

#[test]
fn test_extends_patterns_all_apply() {
    let schema = r#"{"extends": {"pattern": "^a"}, "pattern": "z$"}"#;
    assert!(check(schema, r#""abcz""#).0);
    assert_eq!(
        check(schema, r#""abc""#).1,
        vec!["String 'abc' does not match regex pattern 'z$'. Line 1, position 1."]
    );
}

#[test]
fn test_schemas_shared_through_resolver() {
    let mut resolver = SchemaResolver::new();
    SchemaBuilder::new(&mut resolver)
        .build(r#"{"id": "first", "additionalProperties": {}}"#)
        .unwrap();
    let second = SchemaBuilder::new(&mut resolver)
        .build(r#"{"id": "second", "extends": {"$ref": "first"}, "additionalProperties": {"type": "string"}}"#)
        .unwrap();

    let validator = Validator::new(&resolver, second);
    assert!(validator.is_valid(&JsonNode::parse(r#"{"a": "b"}"#).unwrap()));
    assert!(!validator.is_valid(&JsonNode::parse(r#"{"a": 1}"#).unwrap()));
}

#[test]
fn test_mirrored_extends_keep_own_precedence() {
    let schema = r#"{
        "properties": {
            "x": {
                "properties": {"v": {"$ref": "short"}},
                "extends": {"properties": {"v": {"$ref": "long"}}}
            },
            "y": {
                "properties": {"v": {"$ref": "long"}},
                "extends": {"properties": {"v": {"$ref": "short"}}}
            }
        },
        "definitions": {
            "short": {"id": "short", "maxLength": 1},
            "long": {"id": "long", "maxLength": 5}
        }
    }"#;
    assert_eq!(check(schema, r#"{"y": {"v": "abc"}}"#), (true, vec![]));
    assert_eq!(
        check(schema, r#"{"x": {"v": "abc"}}"#).1,
        vec!["String 'abc' exceeds maximum length of 1. Line 1, position 13."]
    );
    assert_eq!(
        check(schema, r#"{"x": {"v": "a"}, "y": {"v": "abcdef"}}"#).1,
        vec!["String 'abcdef' exceeds maximum length of 5. Line 1, position 30."]
    );
}

// ============================================================================
// Entry points
// ============================================================================

#[test]
fn test_validate_returns_first_violation() {
    let schema = JsonSchema::parse(r#"{"items": {"type": "string"}}"#).unwrap();
    let value = JsonNode::parse("[1, 2]").unwrap();
    match schema.validate(&value) {
        Err(Error::Validation(e)) => {
            assert_eq!(e.message(), "Invalid type. Expected String but got Integer. Line 1, position 2.");
            assert_eq!(e.path(), "[0]");
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
    assert!(schema.validate(&JsonNode::parse(r#"["a"]"#).unwrap()).is_ok());
}

#[test]
fn test_validate_with_streams_every_violation() {
    let schema = JsonSchema::parse(r#"{"items": {"type": "string"}}"#).unwrap();
    let value = JsonNode::parse("[1, \"a\", 2]").unwrap();
    let mut seen = Vec::new();
    schema.validate_with(&value, |error| {
        seen.push((error.path().to_string(), error.message().to_string()))
    });
    assert_eq!(
        seen,
        vec![
            (
                "[0]".to_string(),
                "Invalid type. Expected String but got Integer. Line 1, position 2.".to_string()
            ),
            (
                "[2]".to_string(),
                "Invalid type. Expected String but got Integer. Line 1, position 10.".to_string()
            ),
        ]
    );
}

#[test]
fn test_validator_is_shareable_across_threads() {
    let schema = JsonSchema::parse(r#"{"items": {"type": "integer"}}"#).unwrap();
    std::thread::scope(|scope| {
        for n in 0..4 {
            let schema = &schema;
            scope.spawn(move || {
                let value = JsonNode::from(serde_json::json!([n, n + 1]));
                assert!(schema.is_valid(&value));
            });
        }
    });
}

// ============================================================================
// Properties
// ============================================================================

fn duplicate_indices(values: &[i64]) -> Vec<usize> {
    let mut seen: Vec<i64> = Vec::new();
    let mut duplicates = Vec::new();
    for (index, value) in values.iter().enumerate() {
        if seen.contains(value) {
            duplicates.push(index);
        } else {
            seen.push(*value);
        }
    }
    duplicates
}

proptest! {
    #[test]
    fn prop_unique_items_reports_every_repeat(values in prop::collection::vec(0i64..5, 0..12)) {
        let schema = JsonSchema::parse(r#"{"uniqueItems": true}"#).unwrap();
        let value = JsonNode::from(serde_json::json!(values));
        let errors = schema.iter_errors(&value);
        let expected = duplicate_indices(&values);

        prop_assert_eq!(schema.is_valid(&value), expected.is_empty());
        let reported: Vec<String> = errors.iter().map(|e| e.path().to_string()).collect();
        let expected: Vec<String> = expected.iter().map(|i| format!("[{}]", i)).collect();
        prop_assert_eq!(reported, expected);
    }
}
