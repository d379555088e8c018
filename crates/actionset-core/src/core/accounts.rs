// crates/actionset-core/src/core/accounts.rs
// ============================================================================
// Module: Connected Accounts
// Description: Connected account records returned by the account directory.
// Purpose: Describe which app and entity an account identifier belongs to.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A connected account is the authorized link between an entity and an app.
//! The toolset only reads these records; creating them is a login concern.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AppId;
use crate::core::identifiers::ConnectedAccountId;
use crate::core::identifiers::EntityId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Lifecycle status of a connected account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Usable for execution.
    #[default]
    Active,
    /// Authorization still in progress.
    Initiated,
    /// Authorization failed or was revoked.
    Failed,
    /// Administratively disabled.
    Disabled,
}

impl AccountStatus {
    /// Parses a remote status label, treating unknown labels as failed.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "initiated" | "initializing" => Self::Initiated,
            "disabled" => Self::Disabled,
            _ => Self::Failed,
        }
    }

    /// Returns true when the account can be used for execution.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Connected account record.
///
/// # Invariants
/// - `app` is the app the account was authorized for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedAccount {
    /// Account identifier.
    pub id: ConnectedAccountId,
    /// App the account belongs to.
    pub app: AppId,
    /// Entity owning the account, when reported.
    pub entity_id: Option<EntityId>,
    /// Account status.
    pub status: AccountStatus,
}

impl ConnectedAccount {
    /// Creates an active account record without an entity.
    #[must_use]
    pub fn new(id: impl Into<ConnectedAccountId>, app: impl Into<AppId>) -> Self {
        Self {
            id: id.into(),
            app: app.into(),
            entity_id: None,
            status: AccountStatus::Active,
        }
    }

    /// Sets the owning entity.
    #[must_use]
    pub fn with_entity(mut self, entity_id: impl Into<EntityId>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns true when the account belongs to `app`.
    #[must_use]
    pub fn belongs_to(&self, app: &AppId) -> bool {
        app.matches(self.app.as_str())
    }
}
