// crates/actionset-core/src/core/schema.rs
// ============================================================================
// Module: Actionset Schemas
// Description: JSON-schema-like object shapes and derived action schemas.
// Purpose: Describe action parameters and responses for presentation to agents.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`ObjectSchema`] is the object-typed root of a parameter or response tree.
//! Property bodies are kept as raw JSON so nested shapes published by the
//! remote service survive untouched. [`ActionSchema`] is the immutable view an
//! agent receives; it is derived on demand and never persisted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::ActionId;
use crate::core::identifiers::AppId;

// ============================================================================
// SECTION: Object Schema
// ============================================================================

/// Object-typed JSON schema root.
///
/// # Invariants
/// - `schema_type` is `"object"` for schemas built by this crate.
/// - Every name in `required` is expected to appear in `properties`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSchema {
    /// Optional schema title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// JSON schema type keyword.
    #[serde(rename = "type", default = "object_type")]
    pub schema_type: String,
    /// Property schemas keyed by field name.
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Names of mandatory fields.
    #[serde(default)]
    pub required: Vec<String>,
}

impl ObjectSchema {
    /// Creates an empty object schema.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            schema_type: object_type(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    /// Sets the schema title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds a property, recording it as required when requested.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, schema: Value, required: bool) -> Self {
        let name = name.into();
        if required && !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema);
        self
    }

    /// Returns true when the named field is mandatory.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|field| field == name)
    }

    /// Returns the schema of the named property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Returns the `description` of the named property when it is a string.
    #[must_use]
    pub fn property_description(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(|schema| schema.get("description")).and_then(Value::as_str)
    }

    /// Serializes the schema into a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(title) = &self.title {
            map.insert("title".to_string(), Value::String(title.clone()));
        }
        map.insert("type".to_string(), Value::String(self.schema_type.clone()));
        map.insert("properties".to_string(), Value::Object(self.properties.clone()));
        map.insert(
            "required".to_string(),
            Value::Array(self.required.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(map)
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Default JSON schema type for object roots.
fn object_type() -> String {
    "object".to_string()
}

// ============================================================================
// SECTION: Action Schema
// ============================================================================

/// Presentation view of one action.
///
/// # Invariants
/// - `name` and `description` are already truncated to the configured limits.
/// - `action` keeps the untruncated slug so the schema can be executed.
/// - Parameter descriptions are synthesized; see the toolset schema resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSchema {
    /// Untruncated action slug.
    pub action: ActionId,
    /// Presentation name (possibly truncated).
    pub name: String,
    /// Human-readable display name.
    pub display_name: String,
    /// App the action belongs to.
    pub app: AppId,
    /// Presentation description (possibly truncated).
    pub description: String,
    /// Catalogue tags.
    pub tags: Vec<String>,
    /// Parameter tree.
    pub parameters: ObjectSchema,
    /// Response tree.
    pub response: ObjectSchema,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the JSON type name of a value (`null`, `boolean`, `number`, ...).
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
