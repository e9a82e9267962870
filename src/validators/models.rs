//! Flattened schema models
//!
//! A [`SchemaModel`] is the validation-ready view of a schema: its own
//! keywords merged with everything it inherits through `extends`. Models
//! are computed in two steps:
//!
//! 1. [`SchemaNode`]s group the schemas contributing to one position of the
//!    instance (a schema, its `extends` closure, and for children, every
//!    contributor's subschema under the same property name, pattern or item
//!    index). Nodes are memoized by their ordered list of contributors.
//! 2. Each node is flattened into a model, memoized by node.
//!
//! Both tables are filled before children are visited, so self-referential
//! and mutually recursive schemas produce finite, cyclic model graphs.

use std::collections::{HashMap, HashSet};
use std::ops::Index;

use indexmap::IndexMap;

use crate::documents::JsonNode;

use super::facets::PatternFacet;
use super::resolver::SchemaResolver;
use super::schemas::{JsonSchemaType, Schema, SchemaId};

/// Handle of a [`SchemaNode`] inside a [`SchemaModelBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Handle of a [`SchemaModel`] inside a [`SchemaModelBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(usize);

impl ModelId {
    /// Position of the model in its builder
    pub fn index(self) -> usize {
        self.0
    }
}

/// Schemas contributing to one position of an instance
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Contributors, most specific first
    pub schemas: Vec<SchemaId>,
    /// Merged property subschemas
    pub properties: IndexMap<String, NodeId>,
    /// Merged pattern property subschemas
    pub pattern_properties: IndexMap<PatternFacet, NodeId>,
    /// Merged item subschemas, by index
    pub items: Vec<NodeId>,
    /// Merged `additionalProperties` subschemas
    pub additional_properties: Option<NodeId>,
    /// Merged `additionalItems` subschemas
    pub additional_items: Option<NodeId>,
}

impl SchemaNode {
    fn new(schemas: Vec<SchemaId>) -> Self {
        Self {
            schemas,
            properties: IndexMap::new(),
            pattern_properties: IndexMap::new(),
            items: Vec::new(),
            additional_properties: None,
            additional_items: None,
        }
    }
}

/// Effective constraints for one position of an instance
#[derive(Debug, Clone)]
pub struct SchemaModel {
    /// Whether the described property must be present
    pub required: bool,
    /// Allowed kinds
    pub schema_type: JsonSchemaType,
    /// Forbidden kinds
    pub disallow: JsonSchemaType,
    /// Minimum string length
    pub minimum_length: Option<usize>,
    /// Maximum string length
    pub maximum_length: Option<usize>,
    /// Minimum array length
    pub minimum_items: Option<usize>,
    /// Maximum array length
    pub maximum_items: Option<usize>,
    /// Lower bound
    pub minimum: Option<f64>,
    /// Upper bound
    pub maximum: Option<f64>,
    /// Whether `minimum` itself is rejected
    pub exclusive_minimum: bool,
    /// Whether `maximum` itself is rejected
    pub exclusive_maximum: bool,
    /// Numbers must be a multiple of this
    pub divisible_by: Option<f64>,
    /// Whether array items must be distinct
    pub unique_items: bool,
    /// Sibling that must be present along with this property
    pub requires: Option<String>,
    /// Every pattern a string must match
    pub patterns: Vec<PatternFacet>,
    /// Allowed values; empty means unconstrained
    pub enum_values: Vec<JsonNode>,
    /// Item models
    pub items: Vec<ModelId>,
    /// Whether `items` applies by index
    pub positional_items_validation: bool,
    /// Model for items past the positional ones
    pub additional_items: Option<ModelId>,
    /// `false` rejects items past the positional ones
    pub allow_additional_items: bool,
    /// Declared property models
    pub properties: IndexMap<String, ModelId>,
    /// Models for undeclared properties matching a pattern
    pub pattern_properties: Vec<(PatternFacet, ModelId)>,
    /// Model for remaining undeclared properties
    pub additional_properties: Option<ModelId>,
    /// `false` rejects remaining undeclared properties
    pub allow_additional_properties: bool,
}

impl Default for SchemaModel {
    fn default() -> Self {
        Self {
            required: false,
            schema_type: JsonSchemaType::ANY,
            disallow: JsonSchemaType::NONE,
            minimum_length: None,
            maximum_length: None,
            minimum_items: None,
            maximum_items: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: false,
            exclusive_maximum: false,
            divisible_by: None,
            unique_items: false,
            requires: None,
            patterns: Vec::new(),
            enum_values: Vec::new(),
            items: Vec::new(),
            positional_items_validation: false,
            additional_items: None,
            allow_additional_items: true,
            properties: IndexMap::new(),
            pattern_properties: Vec::new(),
            additional_properties: None,
            allow_additional_properties: true,
        }
    }
}

/// Builds and memoizes [`SchemaModel`]s for the schemas of one resolver
#[derive(Debug)]
pub struct SchemaModelBuilder<'a> {
    resolver: &'a SchemaResolver,
    nodes: Vec<SchemaNode>,
    /// Nodes by ordered contributor list
    node_index: HashMap<Vec<SchemaId>, NodeId>,
    models: Vec<SchemaModel>,
    node_models: HashMap<NodeId, ModelId>,
}

impl<'a> SchemaModelBuilder<'a> {
    /// Create a builder over `resolver`
    pub fn new(resolver: &'a SchemaResolver) -> Self {
        Self {
            resolver,
            nodes: Vec::new(),
            node_index: HashMap::new(),
            models: Vec::new(),
            node_models: HashMap::new(),
        }
    }

    /// Model of `schema`, building it on first use
    pub fn build(&mut self, schema: SchemaId) -> ModelId {
        let node = self.add_schema(None, schema);
        self.build_model(node)
    }

    /// Node whose contributors are those of `existing` followed by `schema`
    /// and its `extends` closure.
    pub fn add_schema(&mut self, existing: Option<NodeId>, schema: SchemaId) -> NodeId {
        let mut schemas = existing
            .map(|node| self.nodes[node.0].schemas.clone())
            .unwrap_or_default();
        let mut visited: HashSet<SchemaId> = schemas.iter().copied().collect();
        self.collect_contributors(schema, &mut schemas, &mut visited);

        // the same contributors in another order merge differently
        if let Some(&node) = self.node_index.get(&schemas) {
            return node;
        }

        let node = NodeId(self.nodes.len());
        self.nodes.push(SchemaNode::new(schemas.clone()));
        self.node_index.insert(schemas.clone(), node);

        for contributor in schemas {
            self.add_children(node, contributor);
        }
        node
    }

    fn collect_contributors(
        &self,
        schema: SchemaId,
        schemas: &mut Vec<SchemaId>,
        visited: &mut HashSet<SchemaId>,
    ) {
        if !visited.insert(schema) {
            return;
        }
        schemas.push(schema);
        for &parent in &self.resolver[schema].extends {
            self.collect_contributors(parent, schemas, visited);
        }
    }

    /// Merge the subschemas of `contributor` into the children of `node`
    fn add_children(&mut self, node: NodeId, contributor: SchemaId) {
        let resolver = self.resolver;
        let schema = &resolver[contributor];

        for (name, &child) in &schema.properties {
            let existing = self.nodes[node.0].properties.get(name).copied();
            let merged = self.add_schema(existing, child);
            self.nodes[node.0].properties.insert(name.clone(), merged);
        }

        for (pattern, &child) in &schema.pattern_properties {
            let existing = self.nodes[node.0].pattern_properties.get(pattern).copied();
            let merged = self.add_schema(existing, child);
            self.nodes[node.0]
                .pattern_properties
                .insert(pattern.clone(), merged);
        }

        for (index, &child) in schema.items.iter().enumerate() {
            let existing = self.nodes[node.0].items.get(index).copied();
            let merged = self.add_schema(existing, child);
            let items = &mut self.nodes[node.0].items;
            if index < items.len() {
                items[index] = merged;
            } else {
                items.push(merged);
            }
        }

        if let Some(child) = schema.additional_properties {
            let existing = self.nodes[node.0].additional_properties;
            let merged = self.add_schema(existing, child);
            self.nodes[node.0].additional_properties = Some(merged);
        }

        if let Some(child) = schema.additional_items {
            let existing = self.nodes[node.0].additional_items;
            let merged = self.add_schema(existing, child);
            self.nodes[node.0].additional_items = Some(merged);
        }
    }

    fn build_model(&mut self, node: NodeId) -> ModelId {
        if let Some(&model) = self.node_models.get(&node) {
            return model;
        }
        let id = ModelId(self.models.len());
        self.models.push(SchemaModel::default());
        self.node_models.insert(node, id);

        let mut model = self.flatten(node);
        let children = self.nodes[node.0].clone();

        model.properties = children
            .properties
            .iter()
            .map(|(name, &child)| (name.clone(), self.build_model(child)))
            .collect();
        model.pattern_properties = children
            .pattern_properties
            .iter()
            .map(|(pattern, &child)| (pattern.clone(), self.build_model(child)))
            .collect();
        model.items = children
            .items
            .iter()
            .map(|&child| self.build_model(child))
            .collect();
        if model.allow_additional_properties {
            model.additional_properties = children
                .additional_properties
                .map(|child| self.build_model(child));
        }
        if model.allow_additional_items {
            model.additional_items = children.additional_items.map(|child| self.build_model(child));
        }

        self.models[id.0] = model;
        id
    }

    /// Merge the keywords of a node's contributors
    fn flatten(&self, node: NodeId) -> SchemaModel {
        let schemas: Vec<&Schema> = self.nodes[node.0]
            .schemas
            .iter()
            .map(|&id| &self.resolver[id])
            .collect();
        let first = |get: &dyn Fn(&Schema) -> Option<bool>| schemas.iter().find_map(|s| get(s));

        let mut model = SchemaModel {
            required: first(&|s| s.required).unwrap_or(false),
            schema_type: schemas
                .iter()
                .find_map(|s| s.schema_type)
                .unwrap_or(JsonSchemaType::ANY),
            disallow: schemas
                .iter()
                .find_map(|s| s.disallow)
                .unwrap_or(JsonSchemaType::NONE),
            minimum_length: schemas.iter().find_map(|s| s.minimum_length),
            maximum_length: schemas.iter().find_map(|s| s.maximum_length),
            minimum_items: schemas.iter().find_map(|s| s.minimum_items),
            maximum_items: schemas.iter().find_map(|s| s.maximum_items),
            minimum: schemas.iter().find_map(|s| s.minimum),
            maximum: schemas.iter().find_map(|s| s.maximum),
            exclusive_minimum: first(&|s| s.exclusive_minimum).unwrap_or(false),
            exclusive_maximum: first(&|s| s.exclusive_maximum).unwrap_or(false),
            divisible_by: schemas.iter().find_map(|s| s.divisible_by),
            unique_items: first(&|s| s.unique_items).unwrap_or(false),
            requires: schemas.iter().find_map(|s| s.requires.clone()),
            positional_items_validation: schemas
                .iter()
                .find(|s| !s.items.is_empty())
                .map_or(false, |s| s.positional_items_validation),
            allow_additional_items: schemas
                .iter()
                .find(|s| s.declares_additional_items())
                .map_or(true, |s| s.allow_additional_items),
            allow_additional_properties: schemas
                .iter()
                .find(|s| s.declares_additional_properties())
                .map_or(true, |s| s.allow_additional_properties),
            ..SchemaModel::default()
        };

        // most specific last
        for schema in schemas.iter().rev() {
            if let Some(pattern) = &schema.pattern {
                if !model.patterns.contains(pattern) {
                    model.patterns.push(pattern.clone());
                }
            }
            for value in &schema.enum_values {
                if !model.enum_values.iter().any(|v| v.deep_equals(value)) {
                    model.enum_values.push(value.clone());
                }
            }
        }
        model
    }

    /// Node by handle
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Model by handle
    pub fn model(&self, id: ModelId) -> &SchemaModel {
        &self.models[id.0]
    }

    /// Number of nodes created so far
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of models created so far
    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}

impl Index<ModelId> for SchemaModelBuilder<'_> {
    type Output = SchemaModel;

    fn index(&self, id: ModelId) -> &SchemaModel {
        self.model(id)
    }
}
