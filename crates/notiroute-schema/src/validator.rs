use serde::Serialize;

use crate::spec::{PropertySpec, SchemaSpec};
use crate::value::{Message, Value};

/// Outcome of validating one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// Violations in discovery order.
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn schema_not_found(schema_id: &str) -> Self {
        Self::from_errors(vec![format!("Schema not found: {schema_id}")])
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Validates messages against schemas resolved by id.
///
/// Implementations fail closed: an unknown schema id is a failed result, never a panic.
pub trait PayloadValidator: Send + Sync {
    fn validate(&self, schema_id: &str, message: &Message) -> ValidationResult;
}

/// Validate a message against a compiled schema.
///
/// Keys are visited in message order. Unknown keys stop after the
/// additional-property check, and a type mismatch skips every later check on
/// that key.
pub fn validate_spec(spec: &SchemaSpec, message: &Message) -> ValidationResult {
    let mut errors = Vec::new();

    for name in &spec.required {
        if !message.contains_key(name) {
            errors.push(format!("Missing required field: {name}"));
        }
    }

    for (key, value) in message.iter() {
        let Some(prop) = spec.property(key) else {
            if !spec.additional_properties {
                errors.push(format!("Additional property not allowed: {key}"));
            }
            continue;
        };

        if let Some(expected) = prop.property_type {
            if !expected.accepts(value) {
                errors.push(format!(
                    "Field '{key}' has wrong type. Expected: {expected}"
                ));
                continue;
            }
        }

        match value {
            Value::String(text) => check_string(key, text, prop, &mut errors),
            Value::Integer(_) | Value::Unsigned(_) | Value::Float(_) => {
                check_bounds(key, value, prop, &mut errors)
            }
            _ => {}
        }
    }

    ValidationResult::from_errors(errors)
}

fn check_string(key: &str, text: &str, prop: &PropertySpec, errors: &mut Vec<String>) {
    let length = text.chars().count();

    if let Some(max) = prop.max_length {
        if length > max {
            errors.push(format!(
                "Field '{key}' exceeds maxLength of {max} (actual: {length})"
            ));
        }
    }

    if let Some(min) = prop.min_length {
        if length < min {
            errors.push(format!(
                "Field '{key}' below minLength of {min} (actual: {length})"
            ));
        }
    }

    if let Some(pattern) = &prop.pattern {
        if !pattern.is_match(text) {
            errors.push(format!(
                "Field '{key}' doesn't match pattern: {}",
                pattern.as_str()
            ));
        }
    }

    if let Some(allowed) = &prop.allowed {
        if !allowed.iter().any(|candidate| candidate == text) {
            let listed = serde_json::to_string(allowed).unwrap_or_else(|_| "[]".to_string());
            errors.push(format!(
                "Field '{key}' value '{text}' not in allowed values: {listed}"
            ));
        }
    }
}

// Bounds apply to every numeric value, so `number` properties are bounded too.
fn check_bounds(key: &str, value: &Value, prop: &PropertySpec, errors: &mut Vec<String>) {
    if let Some(min) = prop.minimum {
        if below(value, min) {
            errors.push(format!("Field '{key}' below minimum: {min} (actual: {value})"));
        }
    }

    if let Some(max) = prop.maximum {
        if above(value, max) {
            errors.push(format!("Field '{key}' exceeds maximum: {max} (actual: {value})"));
        }
    }
}

fn below(value: &Value, bound: i64) -> bool {
    match value {
        Value::Integer(n) => *n < bound,
        Value::Unsigned(n) => i128::from(*n) < i128::from(bound),
        Value::Float(f) => *f < bound as f64,
        _ => false,
    }
}

fn above(value: &Value, bound: i64) -> bool {
    match value {
        Value::Integer(n) => *n > bound,
        Value::Unsigned(n) => i128::from(*n) > i128::from(bound),
        Value::Float(f) => *f > bound as f64,
        _ => false,
    }
}
