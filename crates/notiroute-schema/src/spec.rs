//! Compiled schema form.
//!
//! Only a small JSON Schema vocabulary is recognised: `type`, `required`,
//! `properties`, `additionalProperties`, and per-property `maxLength`,
//! `minLength`, `pattern`, `enum`, `minimum`, `maximum`. Every other keyword is
//! ignored, as is a recognised keyword holding a value of the wrong JSON kind.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde_json::{Map, Value as Json};

use crate::config::StoreConfig;
use crate::error::{Result, SchemaError};
use crate::value::Value;

/// Declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl PropertyType {
    /// Parse a JSON Schema type name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Whether a runtime value satisfies this declared type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => matches!(value, Value::String(_)),
            Self::Integer => value.is_whole_number(),
            Self::Number => value.is_numeric(),
            Self::Boolean => matches!(value, Value::Bool(_)),
            Self::Array => matches!(value, Value::List(_)),
            Self::Object => matches!(value, Value::Map(_)),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `pattern` keyword, compiled to match the whole string.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    whole: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> std::result::Result<Self, regex::Error> {
        let whole = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            whole,
        })
    }

    /// Pattern text as written in the schema.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when the pattern matches the entire input, not just a substring.
    pub fn is_match(&self, input: &str) -> bool {
        self.whole.is_match(input)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Constraints for a single property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySpec {
    pub property_type: Option<PropertyType>,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub pattern: Option<Pattern>,
    /// Allowed string values, in declaration order.
    pub allowed: Option<Vec<String>>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
}

/// Compiled schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSpec {
    /// Required field names, deduplicated, in declaration order.
    pub required: Vec<String>,
    pub properties: BTreeMap<String, PropertySpec>,
    pub additional_properties: bool,
}

impl Default for SchemaSpec {
    fn default() -> Self {
        Self {
            required: Vec::new(),
            properties: BTreeMap::new(),
            additional_properties: true,
        }
    }
}

impl SchemaSpec {
    /// Compile schema text.
    pub fn parse(schema_json: &str, config: &StoreConfig) -> Result<Self> {
        let schema: Json = serde_json::from_str(schema_json)?;
        Self::from_value(&schema, config)
    }

    /// Compile an already-parsed schema document.
    pub fn from_value(schema: &Json, config: &StoreConfig) -> Result<Self> {
        let root = schema.as_object().ok_or(SchemaError::NotAnObject {
            found: json_kind(schema),
        })?;

        let mut required: Vec<String> = Vec::new();
        if let Some(Json::Array(names)) = root.get("required") {
            for name in names.iter().filter_map(Json::as_str) {
                if !required.iter().any(|existing| existing == name) {
                    required.push(name.to_string());
                }
            }
        }

        let mut properties = BTreeMap::new();
        if let Some(Json::Object(props)) = root.get("properties") {
            for (name, prop) in props {
                let spec = match prop {
                    Json::Object(prop) => compile_property(name, prop)?,
                    _ => PropertySpec::default(),
                };
                properties.insert(name.clone(), spec);
            }
        }

        // Schema-valued additionalProperties is out of scope; only booleans count.
        let additional_properties = match root.get("additionalProperties") {
            Some(Json::Bool(allowed)) => *allowed,
            _ => !config.strict_mode,
        };

        Ok(Self {
            required,
            properties,
            additional_properties,
        })
    }

    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.get(name)
    }

    /// Required names that have no entry in `properties`.
    pub fn undeclared_required(&self) -> impl Iterator<Item = &str> {
        self.required
            .iter()
            .filter(|name| !self.properties.contains_key(name.as_str()))
            .map(String::as_str)
    }
}

fn compile_property(name: &str, prop: &Map<String, Json>) -> Result<PropertySpec> {
    let pattern = match prop.get("pattern").and_then(Json::as_str) {
        Some(source) => Some(Pattern::new(source).map_err(|source| {
            SchemaError::InvalidPattern {
                property: name.to_string(),
                source,
            }
        })?),
        None => None,
    };

    let allowed = match prop.get("enum") {
        Some(Json::Array(values)) => Some(
            values
                .iter()
                .filter_map(Json::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    };

    Ok(PropertySpec {
        property_type: prop
            .get("type")
            .and_then(Json::as_str)
            .and_then(PropertyType::parse),
        max_length: prop.get("maxLength").and_then(as_length),
        min_length: prop.get("minLength").and_then(as_length),
        pattern,
        allowed,
        minimum: prop.get("minimum").and_then(as_whole_i64),
        maximum: prop.get("maximum").and_then(as_whole_i64),
    })
}

fn as_length(value: &Json) -> Option<usize> {
    as_whole_i64(value).and_then(|n| usize::try_from(n).ok())
}

fn as_whole_i64(value: &Json) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
