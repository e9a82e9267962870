//! Schema registry
//!
//! [`SchemaResolver`] owns every [`Schema`] node created by the builds run
//! against it and maps declared `id`s to nodes, so a document parsed later
//! can `$ref` or `extends` a schema parsed earlier.

use std::collections::HashMap;
use std::ops::Index;

use crate::error::{Result, SchemaFormatError};

use super::schemas::{Schema, SchemaId};

/// Arena of schema nodes plus the `id` registry
#[derive(Debug, Default)]
pub struct SchemaResolver {
    schemas: Vec<Schema>,
    ids: HashMap<String, SchemaId>,
    /// First node of each built document
    documents: Vec<usize>,
}

impl SchemaResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of schema nodes
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether no schema has been loaded
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Schema node by handle
    pub fn schema(&self, id: SchemaId) -> &Schema {
        &self.schemas[id.0]
    }

    /// Handle of the schema registered under `id`
    pub fn get(&self, id: &str) -> Option<SchemaId> {
        self.ids.get(id).copied()
    }

    /// Schema registered under `id`
    pub fn get_schema(&self, id: &str) -> Option<&Schema> {
        self.get(id).map(|sid| self.schema(sid))
    }

    /// Every node with its handle, in creation order
    pub fn iter(&self) -> impl Iterator<Item = (SchemaId, &Schema)> {
        self.schemas
            .iter()
            .enumerate()
            .map(|(index, schema)| (SchemaId(index), schema))
    }

    /// Registered ids
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.keys().map(String::as_str)
    }

    /// Index of the document (in build order) that created `id`
    pub fn document_of(&self, id: SchemaId) -> usize {
        self.documents
            .partition_point(|&start| start <= id.0)
            .saturating_sub(1)
    }

    pub(crate) fn begin_document(&mut self) {
        self.documents.push(self.schemas.len());
    }

    pub(crate) fn allocate(&mut self, schema: Schema) -> SchemaId {
        self.schemas.push(schema);
        SchemaId(self.schemas.len() - 1)
    }

    pub(crate) fn schema_mut(&mut self, id: SchemaId) -> &mut Schema {
        &mut self.schemas[id.0]
    }

    pub(crate) fn register_id(&mut self, id: &str, schema: SchemaId) -> Result<()> {
        if let Some(existing) = self.ids.get(id) {
            if *existing != schema {
                return Err(SchemaFormatError::new(format!(
                    "Schema id '{}' is already registered.",
                    id
                ))
                .with_location(self.schemas[schema.0].location.clone())
                .into());
            }
            return Ok(());
        }
        self.ids.insert(id.to_string(), schema);
        Ok(())
    }

    /// Drop every node created at or after `len`, with their ids
    pub(crate) fn truncate(&mut self, len: usize) {
        self.schemas.truncate(len);
        self.ids.retain(|_, schema| schema.0 < len);
        while self.documents.last().map_or(false, |&start| start >= len) {
            self.documents.pop();
        }
    }
}

impl Index<SchemaId> for SchemaResolver {
    type Output = Schema;

    fn index(&self, id: SchemaId) -> &Schema {
        self.schema(id)
    }
}
