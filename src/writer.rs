//! Schema serialization
//!
//! Writes a [`Schema`] graph back out as a JSON schema document.
//!
//! A subschema declaring an `id` is written as `{"$ref": "<id>"}` when it
//! was built from another document, or when it has already been written
//! once. A subschema that would recurse into one of its own ancestors is
//! written as a `$ref` to its id, or failing that, its location.

use std::collections::HashSet;

use serde_json::{Map, Number, Value};

use crate::validators::{JsonSchemaType, Schema, SchemaId, SchemaResolver};

/// Serializes schemas of one resolver
#[derive(Debug)]
pub struct SchemaWriter<'a> {
    resolver: &'a SchemaResolver,
    /// Document of the schema being written
    document: usize,
    /// Schemas currently being written, outermost first
    stack: Vec<SchemaId>,
    written: HashSet<SchemaId>,
}

impl<'a> SchemaWriter<'a> {
    /// Create a writer over `resolver`
    pub fn new(resolver: &'a SchemaResolver) -> Self {
        Self {
            resolver,
            document: 0,
            stack: Vec::new(),
            written: HashSet::new(),
        }
    }

    /// Write `root` and everything reachable from it
    pub fn write(&mut self, root: SchemaId) -> Value {
        self.document = self.resolver.document_of(root);
        self.stack.clear();
        self.written.clear();
        self.write_schema(root)
    }

    /// Write `root` as pretty-printed JSON text
    pub fn write_string(&mut self, root: SchemaId) -> String {
        let value = self.write(root);
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    }

    fn write_child(&mut self, child: SchemaId) -> Value {
        let resolver = self.resolver;
        let schema = &resolver[child];

        let registered_id = schema
            .id
            .as_deref()
            .filter(|id| resolver.get(id) == Some(child));
        if let Some(id) = registered_id {
            if resolver.document_of(child) != self.document || self.written.contains(&child) {
                return reference(id);
            }
        }
        if self.stack.contains(&child) {
            return reference(registered_id.unwrap_or(schema.location.as_str()));
        }
        self.write_schema(child)
    }

    fn write_schema(&mut self, id: SchemaId) -> Value {
        let resolver = self.resolver;
        let schema = &resolver[id];
        self.stack.push(id);
        self.written.insert(id);

        let mut out = Map::new();
        write_annotations(schema, &mut out);

        if !schema.properties.is_empty() {
            let properties: Map<String, Value> = schema
                .properties
                .iter()
                .map(|(name, &child)| (name.clone(), self.write_child(child)))
                .collect();
            out.insert("properties".into(), Value::Object(properties));
        }
        if !schema.pattern_properties.is_empty() {
            let patterns: Map<String, Value> = schema
                .pattern_properties
                .iter()
                .map(|(pattern, &child)| (pattern.as_str().to_string(), self.write_child(child)))
                .collect();
            out.insert("patternProperties".into(), Value::Object(patterns));
        }
        if !schema.allow_additional_properties {
            out.insert("additionalProperties".into(), Value::Bool(false));
        } else if let Some(child) = schema.additional_properties {
            let value = self.write_child(child);
            out.insert("additionalProperties".into(), value);
        }

        if schema.positional_items_validation {
            let items: Vec<Value> = schema.items.iter().map(|&c| self.write_child(c)).collect();
            out.insert("items".into(), Value::Array(items));
        } else if let Some(&child) = schema.items.first() {
            let value = self.write_child(child);
            out.insert("items".into(), value);
        }
        if !schema.allow_additional_items {
            out.insert("additionalItems".into(), Value::Bool(false));
        } else if let Some(child) = schema.additional_items {
            let value = self.write_child(child);
            out.insert("additionalItems".into(), value);
        }

        write_constraints(schema, &mut out);

        match schema.extends.as_slice() {
            [] => {}
            [parent] => {
                let value = self.write_child(*parent);
                out.insert("extends".into(), value);
            }
            parents => {
                let values: Vec<Value> = parents.iter().map(|&p| self.write_child(p)).collect();
                out.insert("extends".into(), Value::Array(values));
            }
        }

        self.stack.pop();
        Value::Object(out)
    }
}

fn reference(target: &str) -> Value {
    let mut out = Map::new();
    out.insert("$ref".into(), Value::String(target.to_string()));
    Value::Object(out)
}

fn write_annotations(schema: &Schema, out: &mut Map<String, Value>) {
    insert_string(out, "id", &schema.id);
    insert_string(out, "title", &schema.title);
    insert_string(out, "description", &schema.description);
    if let Some(types) = schema.schema_type {
        out.insert("type".into(), write_type(types));
    }
    if let Some(types) = schema.disallow {
        out.insert("disallow".into(), write_type(types));
    }
    insert_bool(out, "required", schema.required);
    insert_string(out, "requires", &schema.requires);
    insert_bool(out, "readonly", schema.read_only);
    insert_bool(out, "hidden", schema.hidden);
    insert_bool(out, "transient", schema.transient);
    if let Some(default) = &schema.default {
        out.insert("default".into(), default.to_json());
    }
}

fn write_constraints(schema: &Schema, out: &mut Map<String, Value>) {
    insert_number(out, "minimum", schema.minimum);
    insert_number(out, "maximum", schema.maximum);
    insert_bool(out, "exclusiveMinimum", schema.exclusive_minimum);
    insert_bool(out, "exclusiveMaximum", schema.exclusive_maximum);
    insert_count(out, "minLength", schema.minimum_length);
    insert_count(out, "maxLength", schema.maximum_length);
    insert_count(out, "minItems", schema.minimum_items);
    insert_count(out, "maxItems", schema.maximum_items);
    insert_number(out, "divisibleBy", schema.divisible_by);
    insert_bool(out, "uniqueItems", schema.unique_items);
    insert_string(out, "format", &schema.format);
    if let Some(pattern) = &schema.pattern {
        out.insert("pattern".into(), Value::String(pattern.as_str().to_string()));
    }
    if !schema.enum_values.is_empty() {
        let values = schema.enum_values.iter().map(|v| v.to_json()).collect();
        out.insert("enum".into(), Value::Array(values));
    }
    if !schema.options.is_empty() {
        let options = schema
            .options
            .iter()
            .map(|option| {
                let mut entry = Map::new();
                entry.insert("value".into(), option.value.to_json());
                insert_string(&mut entry, "label", &option.label);
                Value::Object(entry)
            })
            .collect();
        out.insert("options".into(), Value::Array(options));
    }
}

/// `"any"`, a single type name, or an array of names
fn write_type(types: JsonSchemaType) -> Value {
    if types == JsonSchemaType::ANY {
        return Value::String("any".into());
    }
    let names = types.keyword_names();
    match names.as_slice() {
        [name] => Value::String((*name).to_string()),
        _ => Value::Array(names.iter().map(|n| Value::String((*n).to_string())).collect()),
    }
}

fn insert_string(out: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        out.insert(key.into(), Value::String(value.clone()));
    }
}

fn insert_bool(out: &mut Map<String, Value>, key: &str, value: Option<bool>) {
    if let Some(value) = value {
        out.insert(key.into(), Value::Bool(value));
    }
}

fn insert_count(out: &mut Map<String, Value>, key: &str, value: Option<usize>) {
    if let Some(value) = value {
        out.insert(key.into(), Value::from(value));
    }
}

fn insert_number(out: &mut Map<String, Value>, key: &str, value: Option<f64>) {
    if let Some(value) = value {
        out.insert(key.into(), number(value));
    }
}

/// Integral values are written without a fraction
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15 {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::JsonSchema;
    use serde_json::json;

    #[test]
    fn test_write_type() {
        assert_eq!(write_type(JsonSchemaType::ANY), json!("any"));
        assert_eq!(write_type(JsonSchemaType::INTEGER), json!("integer"));
        assert_eq!(
            write_type(JsonSchemaType::STRING | JsonSchemaType::NULL),
            json!(["string", "null"])
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(number(10.0), json!(10));
        assert_eq!(number(0.01), json!(0.01));
    }

    #[test]
    fn test_self_reference_written_as_ref() {
        let schema = JsonSchema::parse(r#"{"id": "X", "items": {"$ref": "X"}}"#).unwrap();
        assert_eq!(schema.to_json(), json!({"id": "X", "items": {"$ref": "X"}}));
    }

    #[test]
    fn test_anonymous_cycle_written_as_location() {
        let schema =
            JsonSchema::parse(r##"{"properties": {"child": {"$ref": "#"}}}"##).unwrap();
        assert_eq!(
            schema.to_json(),
            json!({"properties": {"child": {"$ref": "#"}}})
        );
    }
}
