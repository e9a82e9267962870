//! Validation Infrastructure
//!
//! This module provides the validation context that collects violations
//! during one pass over a JSON value.

use std::fmt;

use crate::documents::Position;
use crate::error::{Error, Result};

use super::exceptions::{SchemaValidationError, ValidationError};

/// How a validation pass reacts to a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Stop at the first violation
    #[default]
    Strict,
    /// Collect every violation
    Lax,
}

impl ValidationMode {
    /// Get the mode as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::Strict => "strict",
            ValidationMode::Lax => "lax",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Callback receiving each violation as it is found
pub type ErrorHandler<'h> = &'h mut dyn FnMut(&ValidationError);

/// State of one validation pass
pub struct ValidationContext<'h> {
    /// Current validation mode
    pub mode: ValidationMode,
    /// Collected validation errors; empty when a handler receives them
    pub errors: Vec<ValidationError>,
    handler: Option<ErrorHandler<'h>>,
    reported: usize,
}

impl<'h> ValidationContext<'h> {
    /// Create a new validation context
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            errors: Vec::new(),
            handler: None,
            reported: 0,
        }
    }

    /// Forward every violation to `handler` as it is reported
    pub fn with_handler(mut self, handler: ErrorHandler<'h>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Check if any violation was collected or streamed
    pub fn has_errors(&self) -> bool {
        self.reported > 0
    }

    /// Number of violations collected or streamed
    pub fn error_count(&self) -> usize {
        self.reported
    }

    /// Report a violation at `path`, positioned at the offending value
    pub fn report(
        &mut self,
        message: impl Into<String>,
        path: &str,
        position: Option<Position>,
    ) -> Result<()> {
        let mut error = ValidationError::new(message).with_path(path);
        if let Some(position) = position {
            error = error.with_position(position);
        }
        self.raise_or_collect(error)
    }

    /// Raise or collect an error based on validation mode.
    ///
    /// With a handler installed, lax errors are streamed and not stored.
    pub fn raise_or_collect(&mut self, error: ValidationError) -> Result<()> {
        if let Some(handler) = self.handler.as_mut() {
            handler(&error);
        }
        match self.mode {
            ValidationMode::Strict => Err(Error::Validation(SchemaValidationError::new(error))),
            ValidationMode::Lax => {
                self.reported += 1;
                if self.handler.is_none() {
                    self.errors.push(error);
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("mode", &self.mode)
            .field("errors", &self.errors)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}
