//! Document Validation
//!
//! This module validates JSON values against schema models. The walk is
//! value-driven: each value is checked against the model for its position,
//! then its members or items are checked against their own models.

use tracing::debug;

use crate::documents::{JsonNode, JsonValue};
use crate::error::Result;
use crate::pointers::{join_index, join_property};

use super::exceptions::ValidationError;
use super::facets::{
    check_divisible_by, check_max_items, check_max_length, check_maximum, check_min_items,
    check_min_length, check_minimum, check_pattern, NumericValue,
};
use super::models::{ModelId, SchemaModel, SchemaModelBuilder};
use super::resolver::SchemaResolver;
use super::schemas::SchemaId;
use super::validation::{ValidationContext, ValidationMode};

/// Validates JSON values against one schema of a resolver.
///
/// Each call flattens the schema into models of its own, so a validator
/// (and the resolver it borrows) can be shared between threads.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    resolver: &'a SchemaResolver,
    schema: SchemaId,
}

impl<'a> Validator<'a> {
    /// Create a validator for `schema`
    pub fn new(resolver: &'a SchemaResolver, schema: SchemaId) -> Self {
        Self { resolver, schema }
    }

    /// The schema values are checked against
    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    /// Check whether `value` is valid
    pub fn is_valid(&self, value: &JsonNode) -> bool {
        let mut context = ValidationContext::new(ValidationMode::Strict);
        self.run(value, &mut context).is_ok()
    }

    /// Check `value` and collect every violation message
    pub fn is_valid_with_messages(&self, value: &JsonNode) -> (bool, Vec<String>) {
        let errors = self.iter_errors(value);
        let messages: Vec<String> = errors.iter().map(|e| e.message().to_string()).collect();
        (messages.is_empty(), messages)
    }

    /// Every violation, in document order
    pub fn iter_errors(&self, value: &JsonNode) -> Vec<ValidationError> {
        let mut context = ValidationContext::new(ValidationMode::Lax);
        // lax contexts never fail
        let _ = self.run(value, &mut context);
        context.errors
    }

    /// Fail with the first violation
    pub fn validate(&self, value: &JsonNode) -> Result<()> {
        let mut context = ValidationContext::new(ValidationMode::Strict);
        self.run(value, &mut context)
    }

    /// Stream every violation to `handler`
    pub fn validate_with<F>(&self, value: &JsonNode, mut handler: F)
    where
        F: FnMut(&ValidationError),
    {
        let mut context = ValidationContext::new(ValidationMode::Lax).with_handler(&mut handler);
        let _ = self.run(value, &mut context);
    }

    fn run(&self, value: &JsonNode, context: &mut ValidationContext<'_>) -> Result<()> {
        let mut models = SchemaModelBuilder::new(self.resolver);
        let model = models.build(self.schema);
        let result = validate_value(&models, model, value, "", context);
        debug!(
            mode = %context.mode,
            errors = context.error_count(),
            models = models.model_count(),
            valid = result.is_ok() && !context.has_errors(),
            "validation finished"
        );
        result
    }
}

/// Validate `value`, found at `path`, against `model`
pub fn validate_value(
    models: &SchemaModelBuilder<'_>,
    model: ModelId,
    value: &JsonNode,
    path: &str,
    context: &mut ValidationContext<'_>,
) -> Result<()> {
    let schema = &models[model];

    if !schema.schema_type.matches(value) {
        context.report(
            format!(
                "Invalid type. Expected {} but got {}.",
                schema.schema_type,
                value.kind_name()
            ),
            path,
            value.position(),
        )?;
    }
    if schema.disallow.matches(value) {
        context.report(
            format!("Type {} is disallowed.", value.kind_name()),
            path,
            value.position(),
        )?;
    }

    match &value.value {
        JsonValue::String(text) => validate_string(schema, text, value, path, context)?,
        JsonValue::Integer(i) => {
            validate_number(schema, NumericValue::integer(*i), value, path, context)?
        }
        JsonValue::Float(f) => {
            validate_number(schema, NumericValue::float(*f), value, path, context)?
        }
        JsonValue::Array(items) => validate_array(models, schema, items, value, path, context)?,
        JsonValue::Object(_) => validate_object(models, schema, value, path, context)?,
        JsonValue::Null | JsonValue::Boolean(_) => {}
    }

    if !schema.enum_values.is_empty()
        && !schema.enum_values.iter().any(|v| v.deep_equals(value))
    {
        context.report(
            format!("Value {} is not defined in enum.", value),
            path,
            value.position(),
        )?;
    }
    Ok(())
}

fn validate_string(
    schema: &SchemaModel,
    text: &str,
    value: &JsonNode,
    path: &str,
    context: &mut ValidationContext<'_>,
) -> Result<()> {
    let mut messages = Vec::new();
    if let Some(max) = schema.maximum_length {
        messages.extend(check_max_length(text, max));
    }
    if let Some(min) = schema.minimum_length {
        messages.extend(check_min_length(text, min));
    }
    for pattern in &schema.patterns {
        messages.extend(check_pattern(text, pattern));
    }
    for message in messages {
        context.report(message, path, value.position())?;
    }
    Ok(())
}

fn validate_number(
    schema: &SchemaModel,
    number: NumericValue,
    value: &JsonNode,
    path: &str,
    context: &mut ValidationContext<'_>,
) -> Result<()> {
    let mut messages = Vec::new();
    if let Some(maximum) = schema.maximum {
        messages.extend(check_maximum(number, maximum, schema.exclusive_maximum));
    }
    if let Some(minimum) = schema.minimum {
        messages.extend(check_minimum(number, minimum, schema.exclusive_minimum));
    }
    if let Some(divisor) = schema.divisible_by {
        messages.extend(check_divisible_by(number, divisor));
    }
    for message in messages {
        context.report(message, path, value.position())?;
    }
    Ok(())
}

fn validate_array(
    models: &SchemaModelBuilder<'_>,
    schema: &SchemaModel,
    items: &[JsonNode],
    value: &JsonNode,
    path: &str,
    context: &mut ValidationContext<'_>,
) -> Result<()> {
    let mut representatives: Vec<&JsonNode> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let item_path = join_index(path, index);

        if schema.positional_items_validation {
            if let Some(&item_model) = schema.items.get(index) {
                validate_value(models, item_model, item, &item_path, context)?;
            } else if let Some(additional) = schema.additional_items {
                validate_value(models, additional, item, &item_path, context)?;
            } else if !schema.allow_additional_items {
                context.report(
                    format!(
                        "Index {} has not been defined and the schema does not allow additional items.",
                        index
                    ),
                    &item_path,
                    item.position(),
                )?;
            }
        } else if let Some(&item_model) = schema.items.first() {
            validate_value(models, item_model, item, &item_path, context)?;
        }

        if schema.unique_items {
            if representatives.iter().any(|r| r.deep_equals(item)) {
                context.report(
                    format!("Non-unique array item at index {}.", index),
                    &item_path,
                    item.position(),
                )?;
            } else {
                representatives.push(item);
            }
        }
    }

    let mut messages = Vec::new();
    if let Some(min) = schema.minimum_items {
        messages.extend(check_min_items(items.len(), min));
    }
    if let Some(max) = schema.maximum_items {
        messages.extend(check_max_items(items.len(), max));
    }
    for message in messages {
        context.report(message, path, value.position())?;
    }
    Ok(())
}

fn validate_object(
    models: &SchemaModelBuilder<'_>,
    schema: &SchemaModel,
    value: &JsonNode,
    path: &str,
    context: &mut ValidationContext<'_>,
) -> Result<()> {
    let Some(members) = value.as_object() else {
        return Ok(());
    };

    for (name, member) in members {
        let member_path = join_property(path, name);

        if let Some(&property) = schema.properties.get(name) {
            validate_value(models, property, member, &member_path, context)?;
            continue;
        }

        let mut matched = false;
        for (pattern, pattern_model) in &schema.pattern_properties {
            if pattern.is_match(name) {
                matched = true;
                validate_value(models, *pattern_model, member, &member_path, context)?;
            }
        }
        if matched {
            continue;
        }

        if let Some(additional) = schema.additional_properties {
            validate_value(models, additional, member, &member_path, context)?;
        } else if !schema.allow_additional_properties {
            context.report(
                format!(
                    "Property '{}' has not been defined and the schema does not allow additional properties.",
                    name
                ),
                &member_path,
                member.position(),
            )?;
        }
    }

    for (name, member) in members {
        let Some(&property) = schema.properties.get(name) else {
            continue;
        };
        if let Some(other) = &models[property].requires {
            if !members.contains_key(other) {
                context.report(
                    format!("Property '{}' requires property '{}' to be present.", name, other),
                    &join_property(path, name),
                    member.position(),
                )?;
            }
        }
    }

    let missing: Vec<&str> = schema
        .properties
        .iter()
        .filter(|(name, property)| {
            models[**property].required && !members.contains_key(name.as_str())
        })
        .map(|(name, _)| name.as_str())
        .collect();
    if !missing.is_empty() {
        context.report(
            format!(
                "Required properties are missing from object: {}.",
                missing.join(", ")
            ),
            path,
            value.position(),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::JsonSchema;

    fn messages(schema: &str, value: &str) -> Vec<String> {
        let schema = JsonSchema::parse(schema).unwrap();
        let value = JsonNode::parse(value).unwrap();
        schema.is_valid_with_messages(&value).1
    }

    #[test]
    fn test_pattern() {
        assert!(messages(r#"{"pattern": "lol"}"#, r#""pie lol""#).is_empty());
        assert_eq!(
            messages(r#"{"pattern": "lol"}"#, r#""pie""#),
            vec!["String 'pie' does not match regex pattern 'lol'. Line 1, position 1."]
        );
    }

    #[test]
    fn test_type_without_position() {
        let schema = JsonSchema::parse(r#"{"type": "integer"}"#).unwrap();
        let value = JsonNode::from(serde_json::json!("pie"));
        let (valid, messages) = schema.is_valid_with_messages(&value);
        assert!(!valid);
        assert_eq!(messages, vec!["Invalid type. Expected Integer but got String."]);
    }

    #[test]
    fn test_required_reported_at_object() {
        assert_eq!(
            messages(r#"{"properties": {"lol": {"required": true}}}"#, "{}"),
            vec!["Required properties are missing from object: lol. Line 1, position 1."]
        );
    }

    #[test]
    fn test_additional_items_disallowed() {
        let messages = messages(
            r#"{"items": [{"type": "string"}], "additionalItems": false}"#,
            r#"["a", 1]"#,
        );
        assert_eq!(
            messages,
            vec!["Index 1 has not been defined and the schema does not allow additional items. Line 1, position 7."]
        );
    }

    #[test]
    fn test_strict_stops_at_first() {
        let schema = JsonSchema::parse(r#"{"items": {"type": "string"}}"#).unwrap();
        let value = JsonNode::parse("[1, 2, 3]").unwrap();
        let err = schema.validate(&value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type. Expected String but got Integer. Line 1, position 2."
        );
        assert_eq!(schema.iter_errors(&value).len(), 3);
    }

    #[test]
    fn test_requires() {
        let schema = r#"{"properties": {"a": {"requires": "b"}, "b": {}}}"#;
        assert!(messages(schema, r#"{"a": 1, "b": 2}"#).is_empty());
        assert!(messages(schema, r#"{"b": 2}"#).is_empty());
        assert_eq!(
            messages(schema, r#"{"a": 1}"#),
            vec!["Property 'a' requires property 'b' to be present. Line 1, position 7."]
        );
    }
}
