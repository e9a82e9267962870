//! JSON document handling
//!
//! This module provides the JSON value tree used both as the raw schema
//! document and as the instance being validated. Every node remembers where
//! it started in the source text so diagnostics can point back at it.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;
use crate::reader::{JsonReader, JsonToken, Token};

/// Source position of a node (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number
    pub line: usize,
    /// Column of the node's first character
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A JSON value
#[derive(Debug, Clone)]
pub enum JsonValue {
    /// `null`
    Null,
    /// `true`/`false`
    Boolean(bool),
    /// Integral number
    Integer(i64),
    /// Non-integral or out-of-range number
    Float(f64),
    /// String
    String(String),
    /// Ordered list of values
    Array(Vec<JsonNode>),
    /// Members in insertion order; a repeated name keeps its first slot and last value
    Object(IndexMap<String, JsonNode>),
}

/// A JSON value together with its source position
#[derive(Debug, Clone)]
pub struct JsonNode {
    /// The value
    pub value: JsonValue,
    /// Where the value started, when it was read from text
    pub position: Option<Position>,
}

impl JsonNode {
    /// Create a node without position information
    pub fn new(value: JsonValue) -> Self {
        Self {
            value,
            position: None,
        }
    }

    /// Set the source position
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Parse a JSON document from a string
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_limits(text, Limits::default())
    }

    /// Parse a JSON document, enforcing the given limits
    pub fn parse_with_limits(text: &str, limits: Limits) -> Result<Self> {
        limits.check_document_size(text.len())?;
        let mut reader = JsonReader::new(text).with_limits(limits);
        let first = reader.next_token()?.ok_or_else(|| {
            Error::Parse(ParseError::new(
                "Unexpected end of content while reading JSON.",
                1,
                1,
            ))
        })?;
        let node = read_node(&mut reader, first)?;
        // rejects trailing content
        reader.next_token()?;
        Ok(node)
    }

    /// Source position, if known
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Structural equality: arrays compare in order, objects by key set,
    /// and integers compare equal to floats of the same value.
    pub fn deep_equals(&self, other: &JsonNode) -> bool {
        match (&self.value, &other.value) {
            (JsonValue::Null, JsonValue::Null) => true,
            (JsonValue::Boolean(a), JsonValue::Boolean(b)) => a == b,
            (JsonValue::Integer(a), JsonValue::Integer(b)) => a == b,
            (JsonValue::Float(a), JsonValue::Float(b)) => a == b,
            (JsonValue::Integer(a), JsonValue::Float(b))
            | (JsonValue::Float(b), JsonValue::Integer(a)) => (*a as f64) == *b,
            (JsonValue::String(a), JsonValue::String(b)) => a == b,
            (JsonValue::Array(a), JsonValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_equals(y))
            }
            (JsonValue::Object(a), JsonValue::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).map_or(false, |w| v.deep_equals(w)))
            }
            _ => false,
        }
    }

    /// Member of an object by name
    pub fn get(&self, name: &str) -> Option<&JsonNode> {
        self.as_object().and_then(|map| map.get(name))
    }

    /// Element of an array by index
    pub fn at(&self, index: usize) -> Option<&JsonNode> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Object members, if this is an object
    pub fn as_object(&self) -> Option<&IndexMap<String, JsonNode>> {
        match &self.value {
            JsonValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Array items, if this is an array
    pub fn as_array(&self) -> Option<&Vec<JsonNode>> {
        match &self.value {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// String value, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            JsonValue::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// Numeric value of an integer or float
    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            JsonValue::Integer(i) => Some(i as f64),
            JsonValue::Float(f) => Some(f),
            _ => None,
        }
    }

    /// Non-negative integral value
    pub fn as_usize(&self) -> Option<usize> {
        match self.value {
            JsonValue::Integer(i) if i >= 0 => usize::try_from(i).ok(),
            _ => None,
        }
    }

    /// Name of the value's kind, as used in messages
    pub fn kind_name(&self) -> &'static str {
        match self.value {
            JsonValue::Null => "Null",
            JsonValue::Boolean(_) => "Boolean",
            JsonValue::Integer(_) => "Integer",
            JsonValue::Float(_) => "Float",
            JsonValue::String(_) => "String",
            JsonValue::Array(_) => "Array",
            JsonValue::Object(_) => "Object",
        }
    }

    /// Convert to a `serde_json::Value`, dropping positions
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match &self.value {
            JsonValue::Null => Value::Null,
            JsonValue::Boolean(b) => Value::Bool(*b),
            JsonValue::Integer(i) => Value::from(*i),
            JsonValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => Value::Array(items.iter().map(JsonNode::to_json).collect()),
            JsonValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Compact JSON text
impl fmt::Display for JsonNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<JsonValue> for JsonNode {
    fn from(value: JsonValue) -> Self {
        JsonNode::new(value)
    }
}

impl From<serde_json::Value> for JsonNode {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        let value = match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => JsonValue::Integer(i),
                None => JsonValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => JsonValue::String(s),
            Value::Array(items) => JsonValue::Array(items.into_iter().map(JsonNode::from).collect()),
            Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsonNode::from(v)))
                    .collect(),
            ),
        };
        JsonNode::new(value)
    }
}

fn read_node(reader: &mut JsonReader<'_>, token: Token) -> Result<JsonNode> {
    let position = Position::new(token.line, token.column);
    let value = match token.kind {
        JsonToken::Null => JsonValue::Null,
        JsonToken::Boolean(b) => JsonValue::Boolean(b),
        JsonToken::Integer(i) => JsonValue::Integer(i),
        JsonToken::Float(f) => JsonValue::Float(f),
        JsonToken::String(s) => JsonValue::String(s),
        JsonToken::StartArray => {
            let mut items = Vec::new();
            loop {
                let next = expect_token(reader)?;
                if next.kind == JsonToken::EndArray {
                    break;
                }
                items.push(read_node(reader, next)?);
            }
            JsonValue::Array(items)
        }
        JsonToken::StartObject => {
            let mut members = IndexMap::new();
            loop {
                let next = expect_token(reader)?;
                match next.kind {
                    JsonToken::EndObject => break,
                    JsonToken::PropertyName(name) => {
                        let value_token = expect_token(reader)?;
                        members.insert(name, read_node(reader, value_token)?);
                    }
                    other => {
                        return Err(Error::Parse(ParseError::new(
                            format!("Unexpected token {} while reading object.", other.describe()),
                            next.line,
                            next.column,
                        )))
                    }
                }
            }
            JsonValue::Object(members)
        }
        other => {
            return Err(Error::Parse(ParseError::new(
                format!("Unexpected token {} while reading value.", other.describe()),
                token.line,
                token.column,
            )))
        }
    };
    Ok(JsonNode { value, position: Some(position) })
}

fn expect_token(reader: &mut JsonReader<'_>) -> Result<Token> {
    reader
        .next_token()?
        .ok_or_else(|| Error::Parse(ParseError::new("Unexpected end of content.", 1, 1)))
}
