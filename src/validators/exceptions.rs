//! Validation Exceptions
//!
//! This module contains the error types produced while validating a JSON
//! value against a schema.

use std::fmt;

use serde::Serialize;

use crate::documents::Position;

/// A single constraint violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The message, followed by the value's position when known
    message: String,
    /// Path of the offending value, e.g. `foo[2].bar`; empty for the root
    path: String,
    /// Line of the offending value
    pub line: Option<usize>,
    /// Column of the offending value
    pub column: Option<usize>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: String::new(),
            line: None,
            column: None,
        }
    }

    /// Set the path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the position, appending it to the message
    pub fn with_position(mut self, position: Position) -> Self {
        self.message = format!(
            "{} Line {}, position {}.",
            self.message, position.line, position.column
        );
        self.line = Some(position.line);
        self.column = Some(position.column);
        self
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the path to the offending value
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Position of the offending value, if known
    pub fn position(&self) -> Option<Position> {
        Some(Position::new(self.line?, self.column?))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Raised by throw-style validation, wrapping the first violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationError {
    /// The violation
    pub error: ValidationError,
}

impl SchemaValidationError {
    /// Create a new schema validation error
    pub fn new(error: ValidationError) -> Self {
        Self { error }
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        self.error.message()
    }

    /// Get the path to the offending value
    pub fn path(&self) -> &str {
        self.error.path()
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for SchemaValidationError {}

impl From<ValidationError> for SchemaValidationError {
    fn from(error: ValidationError) -> Self {
        Self::new(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_suffix() {
        let error = ValidationError::new("Required properties are missing from object: lol.")
            .with_position(Position::new(1, 1));
        assert_eq!(
            error.message(),
            "Required properties are missing from object: lol. Line 1, position 1."
        );
        assert_eq!(error.position(), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_without_position() {
        let error = ValidationError::new("Type Null is disallowed.").with_path("a[0]");
        assert_eq!(error.to_string(), "Type Null is disallowed.");
        assert_eq!(error.path(), "a[0]");
        assert_eq!(error.position(), None);
    }

    #[test]
    fn test_serialize() {
        let error = ValidationError::new("x").with_path("a");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["path"], "a");
        assert_eq!(json["line"], serde_json::Value::Null);
    }

    #[test]
    fn test_schema_validation_error_wraps_message() {
        let error = SchemaValidationError::new(ValidationError::new("boom").with_path("p"));
        assert_eq!(error.to_string(), "boom");
        assert_eq!(error.path(), "p");
    }
}
