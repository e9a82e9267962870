//! Constraining facets
//!
//! Compiled regular expressions and the individual scalar checks applied by
//! the validator. Each `check_*` function returns the violation message, or
//! `None` when the value satisfies the facet.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

use regex::Regex;

use crate::error::{Result, SchemaFormatError};

/// Pattern facet using regular expressions.
///
/// Equality and hashing use the pattern source, so an
/// `IndexMap<PatternFacet, _>` can be queried with a `&str`.
#[derive(Debug, Clone)]
pub struct PatternFacet {
    /// Regular expression pattern
    pub pattern: String,
    /// Compiled regex
    regex: Regex,
}

impl PatternFacet {
    /// Create a new pattern facet
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            SchemaFormatError::new(format!("Invalid pattern '{}': {}", pattern, e))
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Whether the pattern matches anywhere in `value`
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// The pattern source
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl PartialEq for PatternFacet {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for PatternFacet {}

impl Hash for PatternFacet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
    }
}

impl Borrow<str> for PatternFacet {
    fn borrow(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Display for PatternFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

/// Length of a string in UTF-16 code units
pub fn text_length(value: &str) -> usize {
    value.encode_utf16().count()
}

/// `maxLength`
pub fn check_max_length(value: &str, max: usize) -> Option<String> {
    (text_length(value) > max)
        .then(|| format!("String '{}' exceeds maximum length of {}.", value, max))
}

/// `minLength`
pub fn check_min_length(value: &str, min: usize) -> Option<String> {
    (text_length(value) < min)
        .then(|| format!("String '{}' is less than minimum length of {}.", value, min))
}

/// `pattern`
pub fn check_pattern(value: &str, pattern: &PatternFacet) -> Option<String> {
    (!pattern.is_match(value)).then(|| {
        format!(
            "String '{}' does not match regex pattern '{}'.",
            value, pattern
        )
    })
}

/// A number being checked, with the kind name and text used in messages
#[derive(Debug, Clone, Copy)]
pub struct NumericValue {
    /// `Integer` or `Float`
    pub kind: &'static str,
    /// Numeric value
    pub value: f64,
    /// Exact integral value, when the JSON value is an integer
    pub integer: Option<i64>,
}

impl NumericValue {
    /// An integer value
    pub fn integer(value: i64) -> Self {
        NumericValue {
            kind: "Integer",
            value: value as f64,
            integer: Some(value),
        }
    }

    /// A float value
    pub fn float(value: f64) -> Self {
        NumericValue {
            kind: "Float",
            value,
            integer: None,
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.integer {
            Some(i) => write!(f, "{}", i),
            None => write!(f, "{}", self.value),
        }
    }
}

/// `maximum` with `exclusiveMaximum`
pub fn check_maximum(number: NumericValue, maximum: f64, exclusive: bool) -> Option<String> {
    if number.value > maximum {
        Some(format!(
            "{} {} exceeds maximum value of {}.",
            number.kind, number, maximum
        ))
    } else if exclusive && number.value == maximum {
        Some(format!(
            "{} {} equals maximum value of {} and exclusive maximum is true.",
            number.kind, number, maximum
        ))
    } else {
        None
    }
}

/// `minimum` with `exclusiveMinimum`
pub fn check_minimum(number: NumericValue, minimum: f64, exclusive: bool) -> Option<String> {
    if number.value < minimum {
        Some(format!(
            "{} {} is less than minimum value of {}.",
            number.kind, number, minimum
        ))
    } else if exclusive && number.value == minimum {
        Some(format!(
            "{} {} equals minimum value of {} and exclusive minimum is true.",
            number.kind, number, minimum
        ))
    } else {
        None
    }
}

/// `divisibleBy`
pub fn check_divisible_by(number: NumericValue, divisor: f64) -> Option<String> {
    (!is_divisible(number, divisor)).then(|| {
        format!(
            "{} {} is not evenly divisible by {}.",
            number.kind, number, divisor
        )
    })
}

/// Whether `number` is a multiple of `divisor`.
///
/// Integral operands use exact arithmetic; otherwise the IEEE remainder is
/// compared to zero with a tolerance relative to the operands, so that
/// `0.07` counts as a multiple of `0.01`.
pub fn is_divisible(number: NumericValue, divisor: f64) -> bool {
    if divisor == 0.0 || !divisor.is_finite() {
        return false;
    }
    if let Some(i) = number.integer {
        if divisor.fract() == 0.0 && divisor.abs() < 9.007_199_254_740_992e15 {
            // only i64::MIN % -1 overflows, and it divides evenly
            return i.checked_rem(divisor as i64).map_or(true, |r| r == 0);
        }
    }
    let remainder = floating_point_remainder(number.value, divisor);
    let scale = number.value.abs().max(divisor.abs()).max(1.0);
    remainder.abs() <= 20.0 * f64::EPSILON * scale
}

fn floating_point_remainder(dividend: f64, divisor: f64) -> f64 {
    dividend - divisor * (dividend / divisor).round()
}

/// `maxItems`
pub fn check_max_items(count: usize, max: usize) -> Option<String> {
    (count > max).then(|| format!("Array item count {} exceeds maximum count of {}.", count, max))
}

/// `minItems`
pub fn check_min_items(count: usize, min: usize) -> Option<String> {
    (count < min).then(|| format!("Array item count {} is less than minimum count of {}.", count, min))
}
