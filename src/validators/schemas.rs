//! Schema document model
//!
//! A parsed schema document is a graph of [`Schema`] nodes stored in a
//! [`SchemaResolver`] arena. Nodes are addressed by [`SchemaId`]; two
//! positions in a document refer to "the same schema" exactly when they hold
//! the same id. Graphs may be cyclic, so nothing here compares schemas
//! structurally.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use indexmap::IndexMap;

use crate::documents::{JsonNode, JsonValue};
use crate::error::Result;

use super::document_validation::Validator;
use super::exceptions::ValidationError;
use super::facets::PatternFacet;
use super::parsing::SchemaBuilder;
use super::resolver::SchemaResolver;

/// Handle of a schema node inside a [`SchemaResolver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    /// Position of the node in its resolver
    pub fn index(self) -> usize {
        self.0
    }
}

/// Set of JSON value kinds, as used by `type` and `disallow`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct JsonSchemaType(u8);

impl JsonSchemaType {
    /// No kind
    pub const NONE: Self = Self(0);
    /// `"string"`
    pub const STRING: Self = Self(1);
    /// `"number"`
    pub const FLOAT: Self = Self(2);
    /// `"integer"`
    pub const INTEGER: Self = Self(4);
    /// `"boolean"`
    pub const BOOLEAN: Self = Self(8);
    /// `"object"`
    pub const OBJECT: Self = Self(16);
    /// `"array"`
    pub const ARRAY: Self = Self(32);
    /// `"null"`
    pub const NULL: Self = Self(64);
    /// `"any"`
    pub const ANY: Self = Self(127);

    const FLAGS: [(Self, &'static str, &'static str); 7] = [
        (Self::STRING, "string", "String"),
        (Self::FLOAT, "number", "Float"),
        (Self::INTEGER, "integer", "Integer"),
        (Self::BOOLEAN, "boolean", "Boolean"),
        (Self::OBJECT, "object", "Object"),
        (Self::ARRAY, "array", "Array"),
        (Self::NULL, "null", "Null"),
    ];

    /// Parse a draft-3 type name
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "any" {
            return Some(Self::ANY);
        }
        Self::FLAGS
            .iter()
            .find(|(_, keyword, _)| *keyword == name)
            .map(|(flag, _, _)| *flag)
    }

    /// Whether every kind in `other` is also in `self`
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no kind is set
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The single kind of a JSON value
    pub fn of(value: &JsonNode) -> Self {
        match value.value {
            JsonValue::Null => Self::NULL,
            JsonValue::Boolean(_) => Self::BOOLEAN,
            JsonValue::Integer(_) => Self::INTEGER,
            JsonValue::Float(_) => Self::FLOAT,
            JsonValue::String(_) => Self::STRING,
            JsonValue::Array(_) => Self::ARRAY,
            JsonValue::Object(_) => Self::OBJECT,
        }
    }

    /// Whether `value` belongs to this set.
    ///
    /// Integers belong to `number`; floats without a fractional part belong
    /// to `integer`.
    pub fn matches(self, value: &JsonNode) -> bool {
        let kind = Self::of(value);
        if self.contains(kind) {
            return true;
        }
        match value.value {
            JsonValue::Integer(_) => self.contains(Self::FLOAT),
            JsonValue::Float(f) => f.is_finite() && f.fract() == 0.0 && self.contains(Self::INTEGER),
            _ => false,
        }
    }

    /// Draft-3 keyword names of the kinds in this set
    pub fn keyword_names(self) -> Vec<&'static str> {
        Self::FLAGS
            .iter()
            .filter(|(flag, _, _)| self.contains(*flag))
            .map(|(_, keyword, _)| *keyword)
            .collect()
    }
}

impl BitOr for JsonSchemaType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for JsonSchemaType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for JsonSchemaType {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for JsonSchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ANY {
            return write!(f, "Any");
        }
        if self.is_empty() {
            return write!(f, "None");
        }
        let names: Vec<&str> = Self::FLAGS
            .iter()
            .filter(|(flag, _, _)| self.contains(*flag))
            .map(|(_, _, display)| *display)
            .collect();
        write!(f, "{}", names.join(", "))
    }
}

impl fmt::Debug for JsonSchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonSchemaType({})", self)
    }
}

/// Entry of the `options` keyword
#[derive(Debug, Clone)]
pub struct SchemaOption {
    /// Value offered to the user
    pub value: JsonNode,
    /// Display label
    pub label: Option<String>,
}

/// One parsed schema object
#[derive(Debug, Clone)]
pub struct Schema {
    /// Globally unique name usable as a `$ref` target
    pub id: Option<String>,
    /// Pointer from the document root, e.g. `#/properties/foo/items/1`
    pub location: String,
    /// Title
    pub title: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Format hint (not enforced)
    pub format: Option<String>,
    /// Regular expression strings must contain a match for
    pub pattern: Option<PatternFacet>,
    /// Allowed kinds; `None` allows any
    pub schema_type: Option<JsonSchemaType>,
    /// Forbidden kinds; `None` forbids nothing
    pub disallow: Option<JsonSchemaType>,
    /// Whether the property this schema describes must be present
    pub required: Option<bool>,
    /// Metadata
    pub read_only: Option<bool>,
    /// Metadata
    pub hidden: Option<bool>,
    /// Metadata
    pub transient: Option<bool>,
    /// Inclusive lower bound unless `exclusive_minimum`
    pub minimum: Option<f64>,
    /// Inclusive upper bound unless `exclusive_maximum`
    pub maximum: Option<f64>,
    /// Whether `minimum` itself is rejected
    pub exclusive_minimum: Option<bool>,
    /// Whether `maximum` itself is rejected
    pub exclusive_maximum: Option<bool>,
    /// Minimum string length in UTF-16 code units
    pub minimum_length: Option<usize>,
    /// Maximum string length in UTF-16 code units
    pub maximum_length: Option<usize>,
    /// Minimum array length
    pub minimum_items: Option<usize>,
    /// Maximum array length
    pub maximum_items: Option<usize>,
    /// Numbers must be a multiple of this
    pub divisible_by: Option<f64>,
    /// Whether array items must be pairwise distinct
    pub unique_items: Option<bool>,
    /// Item schemas, positional or a single schema for every item
    pub items: Vec<SchemaId>,
    /// Whether `items` applies by index
    pub positional_items_validation: bool,
    /// Schema for items past the positional ones
    pub additional_items: Option<SchemaId>,
    /// `false` rejects items past the positional ones
    pub allow_additional_items: bool,
    /// Declared properties
    pub properties: IndexMap<String, SchemaId>,
    /// Schemas for undeclared properties whose name matches the pattern
    pub pattern_properties: IndexMap<PatternFacet, SchemaId>,
    /// Schema for remaining undeclared properties
    pub additional_properties: Option<SchemaId>,
    /// `false` rejects remaining undeclared properties
    pub allow_additional_properties: bool,
    /// Sibling property that must be present along with this one
    pub requires: Option<String>,
    /// Allowed values; empty means unconstrained
    pub enum_values: Vec<JsonNode>,
    /// Schemas this one inherits constraints from
    pub extends: Vec<SchemaId>,
    /// Default value
    pub default: Option<JsonNode>,
    /// Suggested values
    pub options: Vec<SchemaOption>,
}

impl Schema {
    /// Create an unconstrained schema at `location`
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            id: None,
            location: location.into(),
            title: None,
            description: None,
            format: None,
            pattern: None,
            schema_type: None,
            disallow: None,
            required: None,
            read_only: None,
            hidden: None,
            transient: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            minimum_length: None,
            maximum_length: None,
            minimum_items: None,
            maximum_items: None,
            divisible_by: None,
            unique_items: None,
            items: Vec::new(),
            positional_items_validation: false,
            additional_items: None,
            allow_additional_items: true,
            properties: IndexMap::new(),
            pattern_properties: IndexMap::new(),
            additional_properties: None,
            allow_additional_properties: true,
            requires: None,
            enum_values: Vec::new(),
            extends: Vec::new(),
            default: None,
            options: Vec::new(),
        }
    }

    /// Whether `additionalProperties` was given, as a schema or as `false`
    pub fn declares_additional_properties(&self) -> bool {
        !self.allow_additional_properties || self.additional_properties.is_some()
    }

    /// Whether `additionalItems` was given, as a schema or as `false`
    pub fn declares_additional_items(&self) -> bool {
        !self.allow_additional_items || self.additional_items.is_some()
    }
}

/// A parsed schema together with the resolver that owns its graph
#[derive(Debug)]
pub struct JsonSchema {
    resolver: SchemaResolver,
    root: SchemaId,
}

impl JsonSchema {
    /// Parse a schema document from a string
    pub fn parse(text: &str) -> Result<Self> {
        let mut resolver = SchemaResolver::new();
        let root = SchemaBuilder::new(&mut resolver).build(text)?;
        Ok(Self { resolver, root })
    }

    /// Wrap a resolver and one of its schemas
    pub fn from_parts(resolver: SchemaResolver, root: SchemaId) -> Self {
        Self { resolver, root }
    }

    /// Give back the resolver and root id
    pub fn into_parts(self) -> (SchemaResolver, SchemaId) {
        (self.resolver, self.root)
    }

    /// Id of the root schema
    pub fn root(&self) -> SchemaId {
        self.root
    }

    /// The root schema node
    pub fn schema(&self) -> &Schema {
        &self.resolver[self.root]
    }

    /// The resolver owning the graph
    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Validator for the root schema
    pub fn validator(&self) -> Validator<'_> {
        Validator::new(&self.resolver, self.root)
    }

    /// Check whether `value` is valid
    pub fn is_valid(&self, value: &JsonNode) -> bool {
        self.validator().is_valid(value)
    }

    /// Check `value` and collect every violation message
    pub fn is_valid_with_messages(&self, value: &JsonNode) -> (bool, Vec<String>) {
        self.validator().is_valid_with_messages(value)
    }

    /// Fail with the first violation
    pub fn validate(&self, value: &JsonNode) -> Result<()> {
        self.validator().validate(value)
    }

    /// Stream every violation to `handler`
    pub fn validate_with<F>(&self, value: &JsonNode, handler: F)
    where
        F: FnMut(&ValidationError),
    {
        self.validator().validate_with(value, handler)
    }

    /// Every violation, in document order
    pub fn iter_errors(&self, value: &JsonNode) -> Vec<ValidationError> {
        self.validator().iter_errors(value)
    }

    /// Re-serialize the root schema
    pub fn to_json(&self) -> serde_json::Value {
        crate::writer::SchemaWriter::new(&self.resolver).write(self.root)
    }
}
