// crates/actionset-core/src/core/catalogue.rs
// ============================================================================
// Module: Catalogue Metadata
// Description: App and action metadata records held by the catalogue.
// Purpose: Provide the raw, slug-keyed facts from which schemas are derived.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Metadata records are the catalogue's view of an app or action: membership,
//! tags, raw parameter and response trees, local package requirements, and
//! where the action runs. Every action belongs to exactly one app.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ActionId;
use crate::core::identifiers::AppId;
use crate::core::schema::ObjectSchema;

// ============================================================================
// SECTION: Origin
// ============================================================================

/// Where an action is defined and executed.
///
/// # Invariants
/// - Variants are stable for wire labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOrigin {
    /// Published and executed by the remote service.
    #[default]
    Remote,
    /// Shipped with the process and executed in-process.
    Local,
    /// Registered at runtime from a plain callable.
    Runtime,
}

impl ActionOrigin {
    /// Returns true when the action executes in-process.
    #[must_use]
    pub const fn is_local(self) -> bool {
        !matches!(self, Self::Remote)
    }

    /// Returns a stable label for the origin.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
            Self::Runtime => "runtime",
        }
    }
}

// ============================================================================
// SECTION: App Metadata
// ============================================================================

/// Catalogue record for an app.
///
/// # Invariants
/// - `requires` is ordered and may contain duplicates; consumers deduplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    /// App slug.
    pub app: AppId,
    /// Human-readable name.
    pub display_name: String,
    /// App description.
    #[serde(default)]
    pub description: String,
    /// Catalogue tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// True when actions of this app need no connected account.
    #[serde(default)]
    pub no_auth: bool,
    /// Where the app's actions run.
    #[serde(default)]
    pub origin: ActionOrigin,
    /// Local packages required before the app's actions can run.
    #[serde(default)]
    pub requires: Vec<String>,
}

impl AppMetadata {
    /// Creates a remote app record with the slug as display name.
    #[must_use]
    pub fn new(app: impl Into<AppId>) -> Self {
        let app = app.into();
        Self {
            display_name: app.as_str().to_string(),
            app,
            description: String::new(),
            tags: Vec::new(),
            no_auth: false,
            origin: ActionOrigin::Remote,
            requires: Vec::new(),
        }
    }

    /// Creates a local app record (no connected account needed).
    #[must_use]
    pub fn local(app: impl Into<AppId>) -> Self {
        Self {
            no_auth: true,
            origin: ActionOrigin::Local,
            ..Self::new(app)
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the app as not requiring a connected account.
    #[must_use]
    pub const fn with_no_auth(mut self, no_auth: bool) -> Self {
        self.no_auth = no_auth;
        self
    }

    /// Sets the required local packages.
    #[must_use]
    pub fn with_requires<I, S>(mut self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires = requires.into_iter().map(Into::into).collect();
        self
    }
}

// ============================================================================
// SECTION: Action Metadata
// ============================================================================

/// Catalogue record for an action.
///
/// # Invariants
/// - `app` is the single app the action belongs to.
/// - `parameters` and `response` are raw trees; descriptions are synthesized later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMetadata {
    /// Action slug.
    pub action: ActionId,
    /// Owning app slug.
    pub app: AppId,
    /// Human-readable name.
    pub display_name: String,
    /// Raw description, when published.
    #[serde(default)]
    pub description: Option<String>,
    /// Catalogue tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Raw parameter tree.
    #[serde(default)]
    pub parameters: ObjectSchema,
    /// Raw response tree.
    #[serde(default)]
    pub response: ObjectSchema,
    /// Local packages required before the action can run.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Where the action runs.
    #[serde(default)]
    pub origin: ActionOrigin,
    /// True when the action needs no connected account.
    #[serde(default)]
    pub no_auth: bool,
}

impl ActionMetadata {
    /// Creates a remote action record with empty schemas.
    #[must_use]
    pub fn new(action: impl Into<ActionId>, app: impl Into<AppId>) -> Self {
        let action = action.into();
        Self {
            display_name: action.as_str().to_string(),
            action,
            app: app.into(),
            description: None,
            tags: Vec::new(),
            parameters: ObjectSchema::new(),
            response: ObjectSchema::new(),
            requires: Vec::new(),
            origin: ActionOrigin::Remote,
            no_auth: false,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the parameter tree.
    #[must_use]
    pub fn with_parameters(mut self, parameters: ObjectSchema) -> Self {
        self.parameters = parameters;
        self
    }

    /// Sets the response tree.
    #[must_use]
    pub fn with_response(mut self, response: ObjectSchema) -> Self {
        self.response = response;
        self
    }

    /// Sets the required local packages.
    #[must_use]
    pub fn with_requires<I, S>(mut self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires = requires.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the origin; local origins imply `no_auth`.
    #[must_use]
    pub const fn with_origin(mut self, origin: ActionOrigin) -> Self {
        self.origin = origin;
        if origin.is_local() {
            self.no_auth = true;
        }
        self
    }

    /// Marks the action as not requiring a connected account.
    #[must_use]
    pub const fn with_no_auth(mut self, no_auth: bool) -> Self {
        self.no_auth = no_auth;
        self
    }

    /// Returns true when the action carries at least one of `tags`.
    #[must_use]
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|wanted| self.tags.iter().any(|tag| tag.eq_ignore_ascii_case(wanted)))
    }
}
