// crates/actionset-toolset/src/schema.rs
// ============================================================================
// Module: Schema Resolver
// Description: Presentation schemas with synthesized parameter descriptions.
// Purpose: Produce size-bounded action schemas for calling agents.
// Dependencies: actionset-core, serde_json
// ============================================================================

//! ## Overview
//! [`SchemaResolver`] turns catalogue metadata into [`ActionSchema`] values.
//! Every parameter gets a description of the form
//! `<base>. Please provide a value of type <type>. This parameter is required.`
//! (or `... is optional.`), where the base is the published description, the
//! title, or the humanized field name. Nested object properties are described
//! against their own `required` lists.
//!
//! Names and descriptions longer than the configured limits are cut to exactly
//! the limit, counted in characters. Shorter values are never padded.
//!
//! # Invariants
//! - Resolution never mutates catalogue metadata, so repeated resolution of
//!   the same action yields identical schemas.
//! - Output order matches input order; duplicates are kept.

// ============================================================================
// SECTION: Imports
// ============================================================================

use actionset_core::ActionId;
use actionset_core::ActionMetadata;
use actionset_core::ActionSchema;
use actionset_core::ObjectSchema;
use serde_json::Map;
use serde_json::Value;

use crate::catalogue::Catalogue;
use crate::error::ToolsetError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Phrase identifying an already synthesized description.
const SYNTHESIZED_MARKER: &str = "Please provide a value of type";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Character limits applied to presented names and descriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharLimits {
    /// Maximum name length.
    pub name: Option<usize>,
    /// Maximum description length.
    pub description: Option<usize>,
}

/// Derives presentation schemas from catalogue metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaResolver {
    /// Configured limits.
    limits: CharLimits,
}

impl SchemaResolver {
    /// Creates a resolver with the given limits.
    #[must_use]
    pub const fn new(limits: CharLimits) -> Self {
        Self {
            limits,
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> CharLimits {
        self.limits
    }

    /// Builds the schema of one action.
    #[must_use]
    pub fn resolve(&self, action: &ActionMetadata) -> ActionSchema {
        let description = action
            .description
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(&action.display_name);
        ActionSchema {
            action: action.action.clone(),
            name: truncate_chars(action.action.as_str(), self.limits.name),
            display_name: action.display_name.clone(),
            app: action.app.clone(),
            description: truncate_chars(description, self.limits.description),
            tags: action.tags.clone(),
            parameters: synthesize_parameters(&action.parameters),
            response: action.response.clone(),
        }
    }

    /// Resolves each slug through `catalogue`, preserving order and duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::ActionNotFound`] for the first unknown slug.
    pub fn resolve_all(
        &self,
        catalogue: &Catalogue,
        actions: &[ActionId],
    ) -> Result<Vec<ActionSchema>, ToolsetError> {
        actions.iter().map(|action| Ok(self.resolve(&catalogue.action(action)?))).collect()
    }
}

// ============================================================================
// SECTION: Description Synthesis
// ============================================================================

/// Returns a copy of `schema` with every property description synthesized.
#[must_use]
pub fn synthesize_parameters(schema: &ObjectSchema) -> ObjectSchema {
    ObjectSchema {
        title: schema.title.clone(),
        schema_type: schema.schema_type.clone(),
        properties: synthesize_properties(&schema.properties, &schema.required),
        required: schema.required.clone(),
    }
}

/// Formats a parameter description.
///
/// A trailing period on `base` is not doubled.
#[must_use]
pub fn describe_parameter(base: &str, type_label: &str, required: bool) -> String {
    let base = base.trim().trim_end_matches('.');
    let requirement = if required { "required" } else { "optional" };
    format!("{base}. {SYNTHESIZED_MARKER} {type_label}. This parameter is {requirement}.")
}

/// Synthesizes descriptions for a property map.
fn synthesize_properties(properties: &Map<String, Value>, required: &[String]) -> Map<String, Value> {
    properties
        .iter()
        .map(|(name, schema)| {
            let is_required = required.iter().any(|field| field == name);
            (name.clone(), synthesize_property(name, schema, is_required))
        })
        .collect()
}

/// Synthesizes the description of one property and its nested fields.
fn synthesize_property(name: &str, schema: &Value, required: bool) -> Value {
    let Value::Object(map) = schema else {
        return schema.clone();
    };
    let mut map = map.clone();

    let existing = map.get("description").and_then(Value::as_str).filter(|text| !text.trim().is_empty());
    let description = match existing {
        Some(text) if text.contains(SYNTHESIZED_MARKER) => text.to_string(),
        Some(text) => describe_parameter(text, &type_label(schema), required),
        None => {
            let base = map
                .get("title")
                .and_then(Value::as_str)
                .filter(|text| !text.trim().is_empty())
                .map_or_else(|| humanize(name), str::to_string);
            describe_parameter(&base, &type_label(schema), required)
        }
    };
    map.insert("description".to_string(), Value::String(description));

    if let Some(Value::Object(nested)) = map.get("properties") {
        let nested_required = required_list(map.get("required"));
        let nested = synthesize_properties(nested, &nested_required);
        map.insert("properties".to_string(), Value::Object(nested));
    }
    if let Some(Value::Object(items)) = map.get("items")
        && let Some(Value::Object(nested)) = items.get("properties")
    {
        let nested_required = required_list(items.get("required"));
        let mut items = items.clone();
        items.insert(
            "properties".to_string(),
            Value::Object(synthesize_properties(nested, &nested_required)),
        );
        map.insert("items".to_string(), Value::Object(items));
    }
    Value::Object(map)
}

/// Reads a JSON `required` array.
fn required_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|fields| fields.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Describes the JSON type of a property schema.
fn type_label(schema: &Value) -> String {
    match schema.get("type") {
        Some(Value::String(kind)) => return kind.clone(),
        Some(Value::Array(kinds)) => {
            let kinds: Vec<&str> = kinds.iter().filter_map(Value::as_str).collect();
            if !kinds.is_empty() {
                return kinds.join(" or ");
            }
        }
        _ => {}
    }
    for keyword in ["anyOf", "oneOf"] {
        if let Some(Value::Array(variants)) = schema.get(keyword) {
            let labels: Vec<String> = variants.iter().map(type_label).collect();
            if !labels.is_empty() {
                return labels.join(" or ");
            }
        }
    }
    if schema.get("properties").is_some() {
        return "object".to_string();
    }
    if schema.get("items").is_some() {
        return "array".to_string();
    }
    "any".to_string()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Cuts `text` to at most `limit` characters; no ellipsis, no padding.
#[must_use]
pub fn truncate_chars(text: &str, limit: Option<usize>) -> String {
    match limit {
        Some(limit) => text.chars().take(limit).collect(),
        None => text.to_string(),
    }
}

/// `owner_name` -> `Owner Name`.
pub(crate) fn humanize(name: &str) -> String {
    name.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
