// crates/actionset-toolset/src/runtime.rs
// ============================================================================
// Module: Runtime Actions
// Description: Registration of in-process actions from plain callables.
// Purpose: Derive action metadata from a typed parameter list and docstring.
// Dependencies: actionset-core, serde_json
// ============================================================================

//! ## Overview
//! A runtime action is a Rust closure plus a [`RuntimeActionDefinition`]: a
//! tool name, a function name, typed parameters, and return fields. The
//! definition is turned into catalogue metadata without a remote round-trip.
//! [`RuntimeActionBuilder`] is the convenience form; it fills descriptions from
//! a Sphinx-style docstring and then makes the same explicit registration call.
//!
//! The action slug is `TOOL_NAME` upper-cased and the owning app is `TOOL`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use actionset_core::ActionId;
use actionset_core::ActionMetadata;
use actionset_core::ActionOrigin;
use actionset_core::AppId;
use actionset_core::AppMetadata;
use actionset_core::ObjectSchema;
use actionset_core::Params;
use serde_json::Map;
use serde_json::Value;

use crate::error::ToolsetError;
use crate::registry::ActionRegistry;
use crate::schema::humanize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Callable backing a local or runtime action.
///
/// Returns the action's `data` payload, or an error message reported back to
/// the caller inside an unsuccessful response.
pub type ActionHandler = Arc<dyn Fn(&Params) -> Result<Value, String> + Send + Sync>;

/// JSON type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// JSON string.
    String,
    /// JSON integer.
    Integer,
    /// Any JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
}

impl FieldType {
    /// Returns the JSON schema type keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Declared parameter of a runtime action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Field name.
    pub name: String,
    /// Field type.
    pub field_type: FieldType,
    /// True when callers must supply the field.
    pub required: bool,
    /// Field description.
    pub description: Option<String>,
}

impl ParameterSpec {
    /// Declares a mandatory parameter.
    #[must_use]
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            description: None,
        }
    }

    /// Declares an optional parameter.
    #[must_use]
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Declared return field of a runtime action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnSpec {
    /// Field name.
    pub name: String,
    /// Field type.
    pub field_type: FieldType,
    /// Field description.
    pub description: Option<String>,
}

impl ReturnSpec {
    /// Declares a return field.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ============================================================================
// SECTION: Definition
// ============================================================================

/// Explicit description of a runtime action.
///
/// # Invariants
/// - `tool` and `name` contain only ASCII letters, digits, and underscores.
/// - Parameter and return names are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeActionDefinition {
    /// Tool (pseudo-app) name.
    pub tool: String,
    /// Function name.
    pub name: String,
    /// Action description; the humanized name when absent.
    pub description: Option<String>,
    /// Declared parameters in order.
    pub parameters: Vec<ParameterSpec>,
    /// Declared return fields in order.
    pub returns: Vec<ReturnSpec>,
    /// Local packages the handler needs.
    pub requires: Vec<String>,
    /// Catalogue tags.
    pub tags: Vec<String>,
}

impl RuntimeActionDefinition {
    /// Creates an empty definition for `tool` and function `name`.
    #[must_use]
    pub fn new(tool: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            name: name.into(),
            description: None,
            parameters: Vec::new(),
            returns: Vec::new(),
            requires: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Returns the action slug (`TOOL_NAME`).
    #[must_use]
    pub fn action_id(&self) -> ActionId {
        ActionId::new(format!("{}_{}", self.tool, self.name).to_ascii_uppercase())
    }

    /// Returns the owning pseudo-app.
    #[must_use]
    pub fn app_id(&self) -> AppId {
        AppId::new(self.tool.to_ascii_uppercase())
    }

    /// Returns the pseudo-app record created on first registration.
    #[must_use]
    pub fn app_metadata(&self) -> AppMetadata {
        let mut app = AppMetadata::local(self.app_id());
        app.origin = ActionOrigin::Runtime;
        app.display_name = humanize(&self.tool);
        app
    }

    /// Builds catalogue metadata for the action.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::Registration`] when names are malformed or
    /// duplicated.
    pub fn to_metadata(&self) -> Result<ActionMetadata, ToolsetError> {
        validate_slug_part("tool", &self.tool)?;
        validate_slug_part("name", &self.name)?;

        let mut seen = BTreeSet::new();
        let mut parameters = ObjectSchema::new().with_title(format!("{}Request", pascal(&self.name)));
        for param in &self.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(ToolsetError::Registration(format!(
                    "duplicate parameter `{}` in {}",
                    param.name,
                    self.action_id()
                )));
            }
            let schema = field_schema(&param.name, param.field_type, param.description.as_deref());
            parameters = parameters.with_property(param.name.clone(), schema, param.required);
        }

        let mut seen = BTreeSet::new();
        let mut response = ObjectSchema::new().with_title(format!("{}Response", pascal(&self.name)));
        for field in &self.returns {
            if !seen.insert(field.name.as_str()) {
                return Err(ToolsetError::Registration(format!(
                    "duplicate return field `{}` in {}",
                    field.name,
                    self.action_id()
                )));
            }
            let schema = field_schema(&field.name, field.field_type, field.description.as_deref());
            response = response.with_property(field.name.clone(), schema, true);
        }

        let description = self.description.clone().unwrap_or_else(|| humanize(&self.name));
        Ok(ActionMetadata::new(self.action_id(), self.app_id())
            .with_display_name(humanize(&self.name))
            .with_description(description)
            .with_tags(self.tags.iter().cloned())
            .with_parameters(parameters)
            .with_response(response)
            .with_requires(self.requires.iter().cloned())
            .with_origin(ActionOrigin::Runtime))
    }
}

// ============================================================================
// SECTION: Docstrings
// ============================================================================

/// Descriptions extracted from a Sphinx-style docstring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Docstring {
    /// Text before the first field directive.
    pub summary: Option<String>,
    /// `:param name:` descriptions.
    pub params: BTreeMap<String, String>,
    /// `:return name:` descriptions; an unnamed `:return:` is keyed `return`.
    pub returns: BTreeMap<String, String>,
}

/// Section a docstring line is appended to.
enum DocTarget {
    /// Summary paragraph(s).
    Summary,
    /// A parameter description.
    Param(String),
    /// A return description.
    Return(String),
    /// An ignored directive (`:raises:`, `:type:`, ...).
    Ignored,
}

/// Parses `summary`, `:param name: text`, and `:return name: text` fields.
///
/// Continuation lines are joined with single spaces. Typed forms such as
/// `:param str owner:` use the last word as the name.
#[must_use]
pub fn parse_docstring(text: &str) -> Docstring {
    let mut doc = Docstring::default();
    let mut summary: Vec<&str> = Vec::new();
    let mut target = DocTarget::Summary;
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(directive) = line.strip_prefix(':')
            && let Some((head, body)) = directive.split_once(':')
        {
            let mut words = head.split_whitespace();
            let kind = words.next().unwrap_or_default();
            let name = words.last();
            let body = body.trim().to_string();
            target = match (kind, name) {
                ("param" | "parameter" | "arg", Some(name)) => {
                    doc.params.insert(name.to_string(), body);
                    DocTarget::Param(name.to_string())
                }
                ("return" | "returns", name) => {
                    let name = name.unwrap_or("return").to_string();
                    doc.returns.insert(name.clone(), body);
                    DocTarget::Return(name)
                }
                _ => DocTarget::Ignored,
            };
            continue;
        }
        match &target {
            DocTarget::Summary => summary.push(line),
            DocTarget::Param(name) => append_line(doc.params.get_mut(name), line),
            DocTarget::Return(name) => append_line(doc.returns.get_mut(name), line),
            DocTarget::Ignored => {}
        }
    }
    if !summary.is_empty() {
        doc.summary = Some(summary.join(" "));
    }
    doc
}

/// Appends a continuation line to a description.
fn append_line(entry: Option<&mut String>, line: &str) {
    if let Some(text) = entry {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(line);
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Convenience builder for runtime actions.
///
/// ```ignore
/// RuntimeActionBuilder::new("math", "add")
///     .docstring("Add two numbers.\n:param a: First\n:param b: Second\n:return sum: Sum")
///     .param(ParameterSpec::required("a", FieldType::Integer))
///     .param(ParameterSpec::required("b", FieldType::Integer))
///     .returns(ReturnSpec::new("sum", FieldType::Integer))
///     .register(&registry, |params| { /* ... */ })?;
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeActionBuilder {
    /// Definition under construction.
    definition: RuntimeActionDefinition,
    /// Parsed docstring, when supplied.
    docstring: Option<Docstring>,
}

impl RuntimeActionBuilder {
    /// Starts a builder for `tool` and function `name`.
    #[must_use]
    pub fn new(tool: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            definition: RuntimeActionDefinition::new(tool, name),
            docstring: None,
        }
    }

    /// Supplies a docstring used for descriptions not set explicitly.
    #[must_use]
    pub fn docstring(mut self, text: &str) -> Self {
        self.docstring = Some(parse_docstring(text));
        self
    }

    /// Sets the action description explicitly.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.definition.description = Some(description.into());
        self
    }

    /// Adds a parameter.
    #[must_use]
    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.definition.parameters.push(param);
        self
    }

    /// Adds a return field.
    #[must_use]
    pub fn returns(mut self, field: ReturnSpec) -> Self {
        self.definition.returns.push(field);
        self
    }

    /// Sets the required local packages.
    #[must_use]
    pub fn requires<I, S>(mut self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definition.requires = requires.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the catalogue tags.
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definition.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the definition with docstring descriptions applied.
    #[must_use]
    pub fn definition(self) -> RuntimeActionDefinition {
        let mut definition = self.definition;
        let Some(doc) = self.docstring else {
            return definition;
        };
        if definition.description.is_none() {
            definition.description = doc.summary;
        }
        for param in &mut definition.parameters {
            if param.description.is_none() {
                param.description = doc.params.get(&param.name).cloned();
            }
        }
        for field in &mut definition.returns {
            if field.description.is_none() {
                field.description = doc.returns.get(&field.name).cloned();
            }
        }
        definition
    }

    /// Registers the action with `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::Registration`] when the definition is invalid.
    pub fn register<F>(
        self,
        registry: &ActionRegistry,
        handler: F,
    ) -> Result<ActionMetadata, ToolsetError>
    where
        F: Fn(&Params) -> Result<Value, String> + Send + Sync + 'static,
    {
        registry.register_runtime(&self.definition(), Arc::new(handler))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects empty names and characters that cannot appear in a slug.
fn validate_slug_part(label: &str, value: &str) -> Result<(), ToolsetError> {
    if value.is_empty() {
        return Err(ToolsetError::Registration(format!("runtime action {label} is empty")));
    }
    if !value.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(ToolsetError::Registration(format!(
            "runtime action {label} `{value}` must be ascii letters, digits, or underscores"
        )));
    }
    Ok(())
}

/// Builds a property schema for a declared field.
fn field_schema(name: &str, field_type: FieldType, description: Option<&str>) -> Value {
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String(field_type.as_str().to_string()));
    map.insert("title".to_string(), Value::String(humanize(name)));
    if let Some(description) = description {
        map.insert("description".to_string(), Value::String(description.to_string()));
    }
    Value::Object(map)
}

/// `send_email` -> `SendEmail`.
fn pascal(name: &str) -> String {
    humanize(name).replace(' ', "")
}
