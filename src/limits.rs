//! Limits and constraints for JSON and schema processing
//!
//! This module defines limits that keep hostile or accidental input from
//! exhausting the stack or memory: deeply nested documents, huge files and
//! schema documents that expand into an unreasonable number of nodes.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum nesting depth of a JSON document
    pub max_depth: usize,

    /// Maximum document size in bytes
    pub max_document_size: usize,

    /// Maximum number of schema nodes created by one build
    pub max_schema_nodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_document_size: 100 * 1024 * 1024, // 100 MB
            max_schema_nodes: 100_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_depth: 64,
            max_document_size: 10 * 1024 * 1024, // 10 MB
            max_schema_nodes: 10_000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_depth: 2048,
            max_document_size: 1024 * 1024 * 1024, // 1 GB
            max_schema_nodes: 10_000_000,
        }
    }

    /// Check if nesting depth is within limits
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            Err(Error::LimitExceeded(format!(
                "JSON depth {} exceeds maximum {}",
                depth, self.max_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if document size is within limits
    pub fn check_document_size(&self, size: usize) -> Result<()> {
        if size > self.max_document_size {
            Err(Error::LimitExceeded(format!(
                "Document size {} bytes exceeds maximum {} bytes",
                size, self.max_document_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of schema nodes is within limits
    pub fn check_schema_nodes(&self, count: usize) -> Result<()> {
        if count > self.max_schema_nodes {
            Err(Error::LimitExceeded(format!(
                "Schema node count {} exceeds maximum {}",
                count, self.max_schema_nodes
            )))
        } else {
            Ok(())
        }
    }
}
