//! JSON Schema validators
//!
//! This module contains the schema graph, the builder that parses schema
//! documents into it, the model builder that flattens inheritance, and the
//! validator that checks JSON values against the result.

// Schema graph
pub mod facets;
pub mod resolver;
pub mod schemas;

// Building
pub mod models;
pub mod parsing;

// Validation
pub mod document_validation;
pub mod exceptions;
pub mod validation;

// Re-exports
pub use document_validation::Validator;
pub use exceptions::{SchemaValidationError, ValidationError};
pub use facets::PatternFacet;
pub use models::{ModelId, NodeId, SchemaModel, SchemaModelBuilder, SchemaNode};
pub use parsing::SchemaBuilder;
pub use resolver::SchemaResolver;
pub use schemas::{JsonSchema, JsonSchemaType, Schema, SchemaId, SchemaOption};
pub use validation::{ValidationContext, ValidationMode};
