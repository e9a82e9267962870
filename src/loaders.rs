//! Resource loading utilities
//!
//! This module loads schema and instance documents from the file system.
//! Fetching schemas by URL is left to the caller.

use std::fs;
use std::path::Path;

use crate::documents::JsonNode;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::validators::{JsonSchema, SchemaBuilder, SchemaId, SchemaResolver};

/// Resource loader for schemas and documents
#[derive(Debug, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load a file as a string
    pub fn load(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
        })?;

        self.limits.check_document_size(content.len())?;

        Ok(content)
    }

    /// Load and parse a JSON instance document
    pub fn load_document(&self, path: &Path) -> Result<JsonNode> {
        let content = self.load(path)?;
        JsonNode::parse_with_limits(&content, self.limits.clone())
    }

    /// Load a schema file into its own resolver
    pub fn load_schema(&self, path: &Path) -> Result<JsonSchema> {
        let mut resolver = SchemaResolver::new();
        let root = self.load_schema_into(path, &mut resolver)?;
        Ok(JsonSchema::from_parts(resolver, root))
    }

    /// Load a schema file into an existing resolver, so it can reference
    /// (and be referenced by) schemas loaded earlier
    pub fn load_schema_into(&self, path: &Path, resolver: &mut SchemaResolver) -> Result<SchemaId> {
        let content = self.load(path)?;
        tracing::debug!(path = %path.display(), "loading schema");
        SchemaBuilder::new(resolver)
            .with_limits(self.limits.clone())
            .build(&content)
    }
}
