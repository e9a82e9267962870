//! # jsonschema3
//!
//! A Rust implementation of JSON Schema draft 3.
//!
//! ## Features
//!
//! - Parsing of schema documents into a shared, possibly cyclic schema graph
//! - `$ref` resolution by JSON Pointer or `id`, including forward and
//!   circular references, across documents loaded into one resolver
//! - `extends` inheritance, flattened into validation models
//! - Validation with path and line/position qualified messages
//! - Re-serialization of schema graphs
//!
//! ## Example
//!
//! ```rust
//! use jsonschema3::{JsonNode, JsonSchema};
//!
//! let schema = JsonSchema::parse(r#"{"properties": {"lol": {"required": true}}}"#)?;
//! let value = JsonNode::parse("{}")?;
//!
//! let (valid, messages) = schema.is_valid_with_messages(&value);
//! assert!(!valid);
//! assert_eq!(
//!     messages,
//!     vec!["Required properties are missing from object: lol. Line 1, position 1."]
//! );
//! # Ok::<(), jsonschema3::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Documents
pub mod documents;
pub mod pointers;
pub mod reader;

// Resource loading
pub mod loaders;

// Schemas and validation
pub mod validators;
pub mod writer;

// Re-exports for convenience
pub use documents::{JsonNode, JsonValue, Position};
pub use error::{Error, Result};
pub use limits::Limits;
pub use loaders::Loader;
pub use validators::{
    JsonSchema, JsonSchemaType, Schema, SchemaBuilder, SchemaId, SchemaModelBuilder,
    SchemaResolver, ValidationError, Validator,
};
pub use writer::SchemaWriter;

/// Version of the jsonschema3 library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
