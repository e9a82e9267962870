//! Schema Document Parsing
//!
//! This module turns a JSON schema document into [`Schema`] nodes stored in a
//! [`SchemaResolver`], resolving `$ref` and `extends` along the way.
//!
//! A node is registered by location and by `id` before any of its keywords
//! are read, so references to a node that is still being filled in (self,
//! forward and circular references) resolve to that node.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::facets::PatternFacet;
use super::resolver::SchemaResolver;
use super::schemas::{JsonSchemaType, Schema, SchemaId, SchemaOption};

use crate::documents::{JsonNode, JsonValue};
use crate::error::{Error, Result, SchemaFormatError, SchemaReferenceError};
use crate::limits::Limits;
use crate::pointers::{evaluate, format_location, parse_fragment};

/// Draft-3 keyword names
mod keywords {
    pub const REF: &str = "$ref";
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const FORMAT: &str = "format";
    pub const PATTERN: &str = "pattern";
    pub const TYPE: &str = "type";
    pub const DISALLOW: &str = "disallow";
    pub const REQUIRED: &str = "required";
    pub const REQUIRES: &str = "requires";
    pub const READ_ONLY: &str = "readonly";
    pub const HIDDEN: &str = "hidden";
    pub const TRANSIENT: &str = "transient";
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
    pub const EXCLUSIVE_MINIMUM: &str = "exclusiveMinimum";
    pub const EXCLUSIVE_MAXIMUM: &str = "exclusiveMaximum";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const MIN_ITEMS: &str = "minItems";
    pub const MAX_ITEMS: &str = "maxItems";
    pub const DIVISIBLE_BY: &str = "divisibleBy";
    pub const UNIQUE_ITEMS: &str = "uniqueItems";
    pub const ITEMS: &str = "items";
    pub const ADDITIONAL_ITEMS: &str = "additionalItems";
    pub const PROPERTIES: &str = "properties";
    pub const PATTERN_PROPERTIES: &str = "patternProperties";
    pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
    pub const EXTENDS: &str = "extends";
    pub const ENUM: &str = "enum";
    pub const DEFAULT: &str = "default";
    pub const OPTIONS: &str = "options";
    pub const OPTION_VALUE: &str = "value";
    pub const OPTION_LABEL: &str = "label";
}

type Members = IndexMap<String, JsonNode>;

/// Builds a schema graph from a JSON document.
///
/// The builder borrows a resolver for the duration of one build; nodes and
/// ids it creates stay in the resolver, so schemas built later can refer to
/// them by `id`. A failed build removes everything it added.
#[derive(Debug)]
pub struct SchemaBuilder<'r> {
    resolver: &'r mut SchemaResolver,
    limits: Limits,
    /// Nodes of the current document by location
    locations: HashMap<String, SchemaId>,
    /// `$ref` targets currently being resolved
    resolving: HashSet<String>,
    created: usize,
}

impl<'r> SchemaBuilder<'r> {
    /// Create a builder adding nodes to `resolver`
    pub fn new(resolver: &'r mut SchemaResolver) -> Self {
        Self {
            resolver,
            limits: Limits::default(),
            locations: HashMap::new(),
            resolving: HashSet::new(),
            created: 0,
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Parse `text` and build its root schema
    pub fn build(self, text: &str) -> Result<SchemaId> {
        let document = JsonNode::parse_with_limits(text, self.limits.clone())?;
        self.build_document(&document)
    }

    /// Build the root schema of an already parsed document
    pub fn build_document(mut self, document: &JsonNode) -> Result<SchemaId> {
        let start = self.resolver.len();
        debug!(existing = start, "building schema document");
        self.resolver.begin_document();

        let mut path = Vec::new();
        match self.build_schema(document, document, &mut path) {
            Ok(root) => {
                debug!(
                    created = self.created,
                    root = root.index(),
                    "schema document built"
                );
                Ok(root)
            }
            Err(e) => {
                self.resolver.truncate(start);
                debug!(error = %e, "schema build failed, rolled back");
                Err(e)
            }
        }
    }

    /// Build the schema object `node` found at `path` in `document`
    fn build_schema(
        &mut self,
        document: &JsonNode,
        node: &JsonNode,
        path: &mut Vec<String>,
    ) -> Result<SchemaId> {
        let members = node.as_object().ok_or_else(|| {
            SchemaFormatError::new(format!(
                "Expected object while parsing schema object, got {}.",
                node.kind_name()
            ))
            .with_location(format_location(path))
        })?;

        if let Some(reference) = members.get(keywords::REF) {
            let target = reference.as_str().ok_or_else(|| {
                invalid_value(keywords::REF, "String", reference, format_location(path))
            })?;
            return self.resolve_reference(document, target);
        }

        let location = format_location(path);
        if let Some(&existing) = self.locations.get(&location) {
            return Ok(existing);
        }

        self.created += 1;
        self.limits.check_schema_nodes(self.created)?;

        let mut schema = Schema::new(location.clone());
        read_annotations(members, &mut schema)?;
        read_constraints(members, &mut schema)?;

        let id = schema.id.clone();
        let schema_id = self.resolver.allocate(schema);
        self.locations.insert(location.clone(), schema_id);
        if let Some(id) = &id {
            self.resolver.register_id(id, schema_id)?;
        }
        trace!(location = %location, id = ?id, node = schema_id.index(), "registered schema");

        self.read_children(document, members, schema_id, path)?;
        Ok(schema_id)
    }

    /// Keywords holding subschemas
    fn read_children(
        &mut self,
        document: &JsonNode,
        members: &Members,
        schema_id: SchemaId,
        path: &mut Vec<String>,
    ) -> Result<()> {
        if let Some(items) = members.get(keywords::ITEMS) {
            let (schemas, positional) = match &items.value {
                JsonValue::Object(_) => {
                    (vec![self.build_child(document, items, path, &[keywords::ITEMS])?], false)
                }
                JsonValue::Array(entries) => {
                    let mut schemas = Vec::with_capacity(entries.len());
                    for (index, entry) in entries.iter().enumerate() {
                        let index = index.to_string();
                        schemas.push(self.build_child(document, entry, path, &[keywords::ITEMS, &index])?);
                    }
                    (schemas, true)
                }
                _ => {
                    return Err(invalid_value(
                        keywords::ITEMS,
                        "Object or Array",
                        items,
                        format_location(path),
                    ))
                }
            };
            let schema = self.resolver.schema_mut(schema_id);
            schema.items = schemas;
            schema.positional_items_validation = positional;
        }

        if let Some(additional) = members.get(keywords::ADDITIONAL_ITEMS) {
            let (allow, child) =
                self.build_additional(document, additional, path, keywords::ADDITIONAL_ITEMS)?;
            let schema = self.resolver.schema_mut(schema_id);
            schema.allow_additional_items = allow;
            schema.additional_items = child;
        }

        if let Some(properties) = members.get(keywords::PROPERTIES) {
            let entries = properties.as_object().ok_or_else(|| {
                invalid_value(keywords::PROPERTIES, "Object", properties, format_location(path))
            })?;
            let mut built = IndexMap::with_capacity(entries.len());
            for (name, entry) in entries {
                let child = self.build_child(document, entry, path, &[keywords::PROPERTIES, name])?;
                built.insert(name.clone(), child);
            }
            self.resolver.schema_mut(schema_id).properties = built;
        }

        if let Some(patterns) = members.get(keywords::PATTERN_PROPERTIES) {
            let entries = patterns.as_object().ok_or_else(|| {
                invalid_value(keywords::PATTERN_PROPERTIES, "Object", patterns, format_location(path))
            })?;
            let mut built = IndexMap::with_capacity(entries.len());
            for (source, entry) in entries {
                let facet = compile_pattern(source, format_location(path))?;
                let child =
                    self.build_child(document, entry, path, &[keywords::PATTERN_PROPERTIES, source])?;
                built.insert(facet, child);
            }
            self.resolver.schema_mut(schema_id).pattern_properties = built;
        }

        if let Some(additional) = members.get(keywords::ADDITIONAL_PROPERTIES) {
            let (allow, child) =
                self.build_additional(document, additional, path, keywords::ADDITIONAL_PROPERTIES)?;
            let schema = self.resolver.schema_mut(schema_id);
            schema.allow_additional_properties = allow;
            schema.additional_properties = child;
        }

        if let Some(extends) = members.get(keywords::EXTENDS) {
            let parents = match &extends.value {
                JsonValue::Object(_) => {
                    vec![self.build_child(document, extends, path, &[keywords::EXTENDS])?]
                }
                JsonValue::Array(entries) => {
                    let mut parents = Vec::with_capacity(entries.len());
                    for (index, entry) in entries.iter().enumerate() {
                        let index = index.to_string();
                        parents.push(self.build_child(document, entry, path, &[keywords::EXTENDS, &index])?);
                    }
                    parents
                }
                _ => {
                    return Err(invalid_value(
                        keywords::EXTENDS,
                        "Object or Array",
                        extends,
                        format_location(path),
                    ))
                }
            };
            self.resolver.schema_mut(schema_id).extends = parents;
        }

        Ok(())
    }

    fn build_child(
        &mut self,
        document: &JsonNode,
        node: &JsonNode,
        path: &mut Vec<String>,
        segments: &[&str],
    ) -> Result<SchemaId> {
        let depth = path.len();
        path.extend(segments.iter().map(|s| s.to_string()));
        let result = self.build_schema(document, node, path);
        path.truncate(depth);
        result
    }

    /// `additionalProperties` / `additionalItems`: a boolean or a schema
    fn build_additional(
        &mut self,
        document: &JsonNode,
        node: &JsonNode,
        path: &mut Vec<String>,
        keyword: &str,
    ) -> Result<(bool, Option<SchemaId>)> {
        match &node.value {
            JsonValue::Boolean(allow) => Ok((*allow, None)),
            JsonValue::Object(_) => {
                let child = self.build_child(document, node, path, &[keyword])?;
                Ok((true, Some(child)))
            }
            _ => Err(invalid_value(keyword, "Boolean or Object", node, format_location(path))),
        }
    }

    fn resolve_reference(&mut self, document: &JsonNode, target: &str) -> Result<SchemaId> {
        if let Some(mut segments) = parse_fragment(target) {
            let location = format_location(&segments);
            if let Some(&existing) = self.locations.get(&location) {
                trace!(reference = %target, node = existing.index(), "resolved reference by location");
                return Ok(existing);
            }
            if !self.resolving.insert(target.to_string()) {
                return Err(SchemaReferenceError::new(target).into());
            }
            let result = match evaluate(document, &segments) {
                Some(node) => {
                    trace!(reference = %target, "parsing reference target");
                    self.build_schema(document, node, &mut segments)
                }
                None => Err(SchemaReferenceError::new(target).into()),
            };
            self.resolving.remove(target);
            return result;
        }

        if let Some(existing) = self.resolver.get(target) {
            trace!(reference = %target, node = existing.index(), "resolved reference by id");
            return Ok(existing);
        }
        if !self.resolving.insert(target.to_string()) {
            return Err(SchemaReferenceError::new(target).into());
        }
        let result = match find_schema_id(document, target) {
            Some(mut segments) => match evaluate(document, &segments) {
                Some(node) => {
                    trace!(reference = %target, location = %format_location(&segments), "parsing id target");
                    self.build_schema(document, node, &mut segments)
                }
                None => Err(SchemaReferenceError::new(target).into()),
            },
            None => Err(SchemaReferenceError::new(target).into()),
        };
        self.resolving.remove(target);
        result
    }
}

/// Depth-first search for the first schema object declaring `"id": id`.
///
/// Keywords holding literal JSON values are not searched, and the members
/// of `properties`/`patternProperties` are searched as schemas whatever
/// their names. Returns the segments leading to the match.
fn find_schema_id(root: &JsonNode, id: &str) -> Option<Vec<String>> {
    fn walk_schema(node: &JsonNode, id: &str, path: &mut Vec<String>) -> bool {
        match &node.value {
            JsonValue::Object(members) => {
                if members.get(keywords::ID).and_then(JsonNode::as_str) == Some(id) {
                    return true;
                }
                for (name, child) in members {
                    let found = match name.as_str() {
                        keywords::ENUM | keywords::DEFAULT | keywords::OPTIONS => continue,
                        keywords::PROPERTIES | keywords::PATTERN_PROPERTIES => {
                            path.push(name.clone());
                            walk_members(child, id, path)
                        }
                        _ => {
                            path.push(name.clone());
                            walk_schema(child, id, path)
                        }
                    };
                    if found {
                        return true;
                    }
                    path.pop();
                }
                false
            }
            JsonValue::Array(items) => items.iter().enumerate().any(|(index, child)| {
                path.push(index.to_string());
                let found = walk_schema(child, id, path);
                if !found {
                    path.pop();
                }
                found
            }),
            _ => false,
        }
    }

    fn walk_members(node: &JsonNode, id: &str, path: &mut Vec<String>) -> bool {
        let members = match node.as_object() {
            Some(members) => members,
            None => return false,
        };
        members.iter().any(|(name, child)| {
            path.push(name.clone());
            let found = walk_schema(child, id, path);
            if !found {
                path.pop();
            }
            found
        })
    }

    let mut path = Vec::new();
    walk_schema(root, id, &mut path).then_some(path)
}

/// Metadata keywords
fn read_annotations(members: &Members, schema: &mut Schema) -> Result<()> {
    let location = schema.location.clone();
    schema.id = read_string(members, keywords::ID, &location)?;
    schema.title = read_string(members, keywords::TITLE, &location)?;
    schema.description = read_string(members, keywords::DESCRIPTION, &location)?;
    schema.format = read_string(members, keywords::FORMAT, &location)?;
    schema.read_only = read_bool(members, keywords::READ_ONLY, &location)?;
    schema.hidden = read_bool(members, keywords::HIDDEN, &location)?;
    schema.transient = read_bool(members, keywords::TRANSIENT, &location)?;
    schema.default = members.get(keywords::DEFAULT).cloned();

    if let Some(options) = members.get(keywords::OPTIONS) {
        let entries = options.as_array().ok_or_else(|| {
            invalid_value(keywords::OPTIONS, "Array", options, location.clone())
        })?;
        schema.options = entries
            .iter()
            .map(|entry| read_option(entry, &location))
            .collect::<Result<_>>()?;
    }
    Ok(())
}

fn read_option(entry: &JsonNode, location: &str) -> Result<SchemaOption> {
    let members = entry
        .as_object()
        .ok_or_else(|| invalid_value(keywords::OPTIONS, "Object", entry, location))?;
    let value = members.get(keywords::OPTION_VALUE).cloned().ok_or_else(|| {
        SchemaFormatError::new("Option object is missing its 'value' member.").with_location(location)
    })?;
    let label = read_string(members, keywords::OPTION_LABEL, location)?;
    Ok(SchemaOption { value, label })
}

/// Keywords constraining the instance, other than subschemas
fn read_constraints(members: &Members, schema: &mut Schema) -> Result<()> {
    let location = schema.location.clone();

    if let Some(node) = members.get(keywords::TYPE) {
        schema.schema_type = Some(read_type(node, &location)?);
    }
    if let Some(node) = members.get(keywords::DISALLOW) {
        schema.disallow = Some(read_type(node, &location)?);
    }

    schema.required = read_bool(members, keywords::REQUIRED, &location)?;
    schema.requires = read_string(members, keywords::REQUIRES, &location)?;

    schema.minimum = read_number(members, keywords::MINIMUM, &location)?;
    schema.maximum = read_number(members, keywords::MAXIMUM, &location)?;
    schema.exclusive_minimum = read_bool(members, keywords::EXCLUSIVE_MINIMUM, &location)?;
    schema.exclusive_maximum = read_bool(members, keywords::EXCLUSIVE_MAXIMUM, &location)?;
    schema.minimum_length = read_count(members, keywords::MIN_LENGTH, &location)?;
    schema.maximum_length = read_count(members, keywords::MAX_LENGTH, &location)?;
    schema.minimum_items = read_count(members, keywords::MIN_ITEMS, &location)?;
    schema.maximum_items = read_count(members, keywords::MAX_ITEMS, &location)?;
    schema.unique_items = read_bool(members, keywords::UNIQUE_ITEMS, &location)?;

    schema.divisible_by = read_number(members, keywords::DIVISIBLE_BY, &location)?;
    if let Some(divisor) = schema.divisible_by {
        if divisor == 0.0 || !divisor.is_finite() {
            return Err(SchemaFormatError::new(format!(
                "Invalid divisibleBy value {}, expected a non-zero number.",
                divisor
            ))
            .with_location(location)
            .into());
        }
    }

    if let Some(pattern) = read_string(members, keywords::PATTERN, &location)? {
        schema.pattern = Some(compile_pattern(&pattern, location.clone())?);
    }

    if let Some(node) = members.get(keywords::ENUM) {
        let values = node.as_array().ok_or_else(|| {
            SchemaFormatError::new(format!(
                "Expected Array token while parsing enum values, got {}.",
                node.kind_name()
            ))
            .with_location(location.clone())
        })?;
        schema.enum_values = values.clone();
    }
    Ok(())
}

/// `type` / `disallow`: a type name or an array of type names
fn read_type(node: &JsonNode, location: &str) -> Result<JsonSchemaType> {
    match &node.value {
        JsonValue::String(name) => type_from_name(name, location),
        JsonValue::Array(entries) => {
            let mut types = JsonSchemaType::NONE;
            for entry in entries {
                let name = entry.as_str().ok_or_else(|| {
                    SchemaFormatError::new(format!(
                        "Expected JSON schema type string token, got {}.",
                        entry.kind_name()
                    ))
                    .with_location(location)
                })?;
                types |= type_from_name(name, location)?;
            }
            Ok(types)
        }
        _ => Err(SchemaFormatError::new(format!(
            "Expected array or JSON schema type string token, got {}.",
            node.kind_name()
        ))
        .with_location(location)
        .into()),
    }
}

fn type_from_name(name: &str, location: &str) -> Result<JsonSchemaType> {
    JsonSchemaType::from_name(name).ok_or_else(|| {
        SchemaFormatError::new(format!("Invalid JSON schema type: {}.", name))
            .with_location(location)
            .into()
    })
}

fn compile_pattern(source: &str, location: impl Into<String>) -> Result<PatternFacet> {
    PatternFacet::new(source).map_err(|e| match e {
        Error::SchemaFormat(format) => Error::SchemaFormat(format.with_location(location)),
        other => other,
    })
}

fn read_string(members: &Members, keyword: &str, location: &str) -> Result<Option<String>> {
    members
        .get(keyword)
        .map(|node| {
            node.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid_value(keyword, "String", node, location))
        })
        .transpose()
}

fn read_bool(members: &Members, keyword: &str, location: &str) -> Result<Option<bool>> {
    members
        .get(keyword)
        .map(|node| {
            node.as_bool()
                .ok_or_else(|| invalid_value(keyword, "Boolean", node, location))
        })
        .transpose()
}

fn read_number(members: &Members, keyword: &str, location: &str) -> Result<Option<f64>> {
    members
        .get(keyword)
        .map(|node| {
            node.as_f64()
                .ok_or_else(|| invalid_value(keyword, "Integer or Float", node, location))
        })
        .transpose()
}

/// Non-negative integer keywords
fn read_count(members: &Members, keyword: &str, location: &str) -> Result<Option<usize>> {
    members
        .get(keyword)
        .map(|node| {
            node.as_usize()
                .ok_or_else(|| invalid_value(keyword, "non-negative Integer", node, location))
        })
        .transpose()
}

fn invalid_value(
    keyword: &str,
    expected: &str,
    node: &JsonNode,
    location: impl Into<String>,
) -> Error {
    SchemaFormatError::new(format!(
        "Invalid value for '{}', expected {} but got {}.",
        keyword,
        expected,
        node.kind_name()
    ))
    .with_location(location)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(text: &str) -> (SchemaResolver, Result<SchemaId>) {
        let mut resolver = SchemaResolver::new();
        let result = SchemaBuilder::new(&mut resolver).build(text);
        (resolver, result)
    }

    #[test]
    fn test_scalar_keywords() {
        let (resolver, root) = build(
            r#"{
                "id": "person",
                "title": "Person",
                "type": ["string", "null"],
                "minLength": 2,
                "maxLength": 5,
                "pattern": "^a",
                "required": true,
                "readonly": true,
                "default": "ab",
                "options": [{"value": "ab", "label": "AB"}]
            }"#,
        );
        let schema = &resolver[root.unwrap()];
        assert_eq!(schema.id.as_deref(), Some("person"));
        assert_eq!(schema.title.as_deref(), Some("Person"));
        assert_eq!(
            schema.schema_type,
            Some(JsonSchemaType::STRING | JsonSchemaType::NULL)
        );
        assert_eq!(schema.minimum_length, Some(2));
        assert_eq!(schema.maximum_length, Some(5));
        assert_eq!(schema.pattern.as_ref().unwrap().as_str(), "^a");
        assert_eq!(schema.required, Some(true));
        assert_eq!(schema.read_only, Some(true));
        assert_eq!(schema.options.len(), 1);
        assert_eq!(schema.options[0].label.as_deref(), Some("AB"));
        assert_eq!(schema.location, "#");
    }

    #[test]
    fn test_self_reference_is_identical() {
        let (resolver, root) = build(r#"{"id": "X", "items": {"$ref": "X"}}"#);
        let root = root.unwrap();
        assert_eq!(resolver[root].items, vec![root]);
        assert!(!resolver[root].positional_items_validation);
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_pointer_reference_to_root() {
        let (resolver, root) = build(r##"{"properties": {"child": {"$ref": "#"}}}"##);
        let root = root.unwrap();
        assert_eq!(resolver[root].properties["child"], root);
    }

    #[test]
    fn test_forward_pointer_reference() {
        let (resolver, root) = build(
            r##"{"properties": {
                "a": {"$ref": "#/properties/b"},
                "b": {"type": "integer"}
            }}"##,
        );
        let root = resolver[root.unwrap()].properties.clone();
        assert_eq!(root["a"], root["b"]);
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn test_reference_to_non_standard_location() {
        let (resolver, root) = build(
            r##"{"definitions": {"positive": {"minimum": 0}},
                "items": {"$ref": "#/definitions/positive"}}"##,
        );
        let root = root.unwrap();
        let item = resolver[root].items[0];
        assert_eq!(resolver[item].location, "#/definitions/positive");
        assert_eq!(resolver[item].minimum, Some(0.0));
    }

    #[test]
    fn test_forward_id_reference() {
        let (resolver, root) = build(
            r#"{"properties": {
                "a": {"$ref": "later"},
                "b": {"id": "later", "type": "string"}
            }}"#,
        );
        let root = root.unwrap();
        let properties = &resolver[root].properties;
        assert_eq!(properties["a"], properties["b"]);
        assert_eq!(resolver.get("later"), Some(properties["b"]));
    }

    #[test]
    fn test_circular_references_through_aliases() {
        let (resolver, root) = build(
            r##"{"properties": {
                "a": {"$ref": "#/properties/b"},
                "b": {"items": {"$ref": "#/properties/a"}}
            }}"##,
        );
        let root = root.unwrap();
        let b = resolver[root].properties["b"];
        assert_eq!(resolver[b].items, vec![b]);
    }

    #[test]
    fn test_unresolvable_reference() {
        let (resolver, result) = build(r#"{"items": {"$ref": "missing"}}"#);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Could not resolve schema reference 'missing'.");
        assert!(resolver.is_empty());
    }

    #[test]
    fn test_find_schema_id() {
        let doc = JsonNode::parse(
            r#"{
                "default": {"id": "x"},
                "enum": [{"id": "x"}],
                "properties": {"default": {"items": [{}, {"id": "x"}]}}
            }"#,
        )
        .unwrap();
        assert_eq!(
            find_schema_id(&doc, "x"),
            Some(vec![
                "properties".into(),
                "default".into(),
                "items".into(),
                "1".into()
            ])
        );
        assert_eq!(find_schema_id(&doc, "y"), None);
    }

    #[test]
    fn test_id_inside_literal_is_not_a_schema() {
        let (resolver, result) =
            build(r#"{"items": {"$ref": "x"}, "default": {"id": "x", "type": "string"}}"#);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Could not resolve schema reference 'x'.");
        assert!(resolver.is_empty());
    }

    #[test]
    fn test_reference_loop_is_unresolvable() {
        let (_, result) = build(r##"{"$ref": "#"}"##);
        assert!(matches!(result, Err(Error::SchemaReference(_))));
    }

    #[test]
    fn test_pointer_escapes_and_bounds() {
        let (resolver, root) = build(
            r##"{"properties": {"a/b": {"type": "null"}},
                "items": [{"$ref": "#/properties/a~1b"}]}"##,
        );
        let root = root.unwrap();
        assert_eq!(resolver[root].items[0], resolver[root].properties["a/b"]);

        let (_, result) = build(r##"{"items": [{}], "extends": {"$ref": "#/items/3"}}"##);
        assert!(matches!(result, Err(Error::SchemaReference(_))));
    }

    #[test]
    fn test_invalid_type_name() {
        let (resolver, result) = build(r#"{"properties": {"a": {"type": "lol"}}}"#);
        match result {
            Err(Error::SchemaFormat(e)) => {
                assert_eq!(e.message, "Invalid JSON schema type: lol.");
                assert_eq!(e.location.as_deref(), Some("#/properties/a"));
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(resolver.is_empty());
    }

    #[test]
    fn test_invalid_type_token() {
        let (_, result) = build(r#"{"disallow": [1]}"#);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Expected JSON schema type string token, got Integer. Schema location: '#'."
        );
    }

    #[test]
    fn test_enum_must_be_array() {
        let (_, result) = build(r#"{"enum": 1}"#);
        assert!(matches!(result, Err(Error::SchemaFormat(_))));
    }

    #[test]
    fn test_additional_keywords() {
        let (resolver, root) = build(
            r#"{"items": [{}, {}], "additionalItems": false,
                "additionalProperties": {"type": "string"}}"#,
        );
        let schema = &resolver[root.unwrap()];
        assert!(schema.positional_items_validation);
        assert_eq!(schema.items.len(), 2);
        assert!(!schema.allow_additional_items);
        assert!(schema.additional_items.is_none());
        assert!(schema.allow_additional_properties);
        assert!(schema.additional_properties.is_some());
    }

    #[test]
    fn test_extends_across_builds() {
        let mut resolver = SchemaResolver::new();
        let first = SchemaBuilder::new(&mut resolver)
            .build(r#"{"id": "first", "additionalProperties": {}}"#)
            .unwrap();
        let second = SchemaBuilder::new(&mut resolver)
            .build(r#"{"id": "second", "extends": {"$ref": "first"}, "additionalProperties": {"type": "string"}}"#)
            .unwrap();
        assert_eq!(resolver[second].extends, vec![first]);
    }

    #[test]
    fn test_failed_build_keeps_earlier_schemas() {
        let mut resolver = SchemaResolver::new();
        SchemaBuilder::new(&mut resolver)
            .build(r#"{"id": "kept"}"#)
            .unwrap();
        let result = SchemaBuilder::new(&mut resolver)
            .build(r#"{"id": "dropped", "items": {"type": 5}}"#);
        assert!(result.is_err());
        assert_eq!(resolver.len(), 1);
        assert!(resolver.get("kept").is_some());
        assert!(resolver.get("dropped").is_none());
    }

    #[test]
    fn test_schema_node_limit() {
        let mut resolver = SchemaResolver::new();
        let limits = Limits {
            max_schema_nodes: 2,
            ..Limits::default()
        };
        let result = SchemaBuilder::new(&mut resolver)
            .with_limits(limits)
            .build(r#"{"properties": {"a": {}, "b": {}}}"#);
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_divisible_by_zero() {
        let (_, result) = build(r#"{"divisibleBy": 0}"#);
        assert!(matches!(result, Err(Error::SchemaFormat(_))));
    }
}
