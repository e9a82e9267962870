//! Schema building and validation benchmarks
//!
//! Run with: cargo bench --bench validation

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use jsonschema3::{JsonNode, JsonSchema};

const SCHEMA: &str = r#"{
    "id": "node",
    "type": "object",
    "properties": {
        "name": {"type": "string", "required": true, "maxLength": 64, "pattern": "^[a-z]"},
        "weight": {"type": "number", "minimum": 0, "divisibleBy": 0.5},
        "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true},
        "children": {"type": "array", "items": {"$ref": "node"}}
    },
    "additionalProperties": false
}"#;

/// Tree of `depth` levels with `width` children per node
fn tree(depth: usize, width: usize) -> String {
    let children = if depth == 0 {
        String::new()
    } else {
        let child = tree(depth - 1, width);
        vec![child; width].join(",")
    };
    format!(
        r#"{{"name": "n{}", "weight": 1.5, "tags": ["a", "b", "c"], "children": [{}]}}"#,
        depth, children
    )
}

fn bench_parse_schema(c: &mut Criterion) {
    c.bench_function("parse_schema", |b| {
        b.iter(|| JsonSchema::parse(black_box(SCHEMA)).unwrap())
    });
}

fn bench_validate(c: &mut Criterion) {
    let schema = JsonSchema::parse(SCHEMA).unwrap();
    let mut group = c.benchmark_group("validate");

    for depth in [1, 3, 5] {
        let document = JsonNode::parse(&tree(depth, 3)).unwrap();
        group.bench_with_input(BenchmarkId::new("tree", depth), &document, |b, document| {
            b.iter(|| schema.is_valid(black_box(document)))
        });
    }
    group.finish();
}

fn bench_iter_errors(c: &mut Criterion) {
    let schema = JsonSchema::parse(SCHEMA).unwrap();
    let text = tree(3, 3).replace("\"weight\": 1.5", "\"weight\": -0.3");
    let document = JsonNode::parse(&text).unwrap();

    c.bench_function("iter_errors", |b| {
        b.iter(|| schema.iter_errors(black_box(&document)))
    });
}

criterion_group!(benches, bench_parse_schema, bench_validate, bench_iter_errors);
criterion_main!(benches);
