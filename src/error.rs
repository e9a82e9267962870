//! Error types for jsonschema3
//!
//! Build-time errors (malformed documents, unresolvable references, invalid
//! keyword values) abort the operation that raised them. Validation-time
//! constraint violations are collected as [`ValidationError`]s and only turn
//! into an [`Error`] through the throw-style entry point.
//!
//! [`ValidationError`]: crate::validators::ValidationError

use std::fmt;
use thiserror::Error;

pub use crate::validators::exceptions::SchemaValidationError;

/// Result type alias using jsonschema3 Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for jsonschema3 operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed JSON text
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A `$ref` or `extends` target could not be resolved
    #[error("{0}")]
    SchemaReference(#[from] SchemaReferenceError),

    /// A schema keyword holds a value it cannot hold
    #[error("{0}")]
    SchemaFormat(#[from] SchemaFormatError),

    /// First constraint violation reported by a throw-style validation
    #[error("{0}")]
    Validation(#[from] SchemaValidationError),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// A file could not be read; the message names the path
    #[error("resource error: {0}")]
    Resource(String),
}

/// JSON syntax error with the position at which it was detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
}

impl ParseError {
    /// Create a new parse error at the given position
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Line {}, position {}.",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for ParseError {}

/// A `$ref` target that names neither a registered id nor a reachable location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReferenceError {
    /// The reference exactly as written in the document
    pub reference: String,
}

impl SchemaReferenceError {
    /// Create a new reference error
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }
}

impl fmt::Display for SchemaReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not resolve schema reference '{}'.", self.reference)
    }
}

impl std::error::Error for SchemaReferenceError {}

/// A schema keyword with an unusable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFormatError {
    /// Error message
    pub message: String,
    /// Location of the offending schema, e.g. `#/properties/foo`
    pub location: Option<String>,
}

impl SchemaFormatError {
    /// Create a new format error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Set the schema location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for SchemaFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, " Schema location: '{}'.", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaFormatError {}
