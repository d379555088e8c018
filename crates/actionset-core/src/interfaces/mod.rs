// crates/actionset-core/src/interfaces/mod.rs
// ============================================================================
// Module: Actionset Interfaces
// Description: Backend-agnostic interfaces for remote execution, catalogue
//              metadata, connected accounts, and local package installation.
// Purpose: Define the contract surfaces consumed by the toolset core.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the toolset reaches its failure-prone collaborators
//! without embedding transport or operating-system details. The toolset never
//! retries through these seams; retries and timeouts belong to implementations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::ActionId;
use crate::core::ActionMetadata;
use crate::core::AppId;
use crate::core::AppMetadata;
use crate::core::ConnectedAccount;
use crate::core::ConnectedAccountId;
use crate::core::EntityId;
use crate::core::ExecutionRequest;
use crate::core::Params;

// ============================================================================
// SECTION: Remote Errors
// ============================================================================

/// Errors raised at the remote service boundary.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `CredentialMissing` is raised before any network traffic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No API key was available when a remote call was attempted.
    #[error(
        "api key not provided; either provide an api key, export it as `{env_var}`, or run \
         `actionset login`"
    )]
    CredentialMissing {
        /// Environment variable expected to hold the key.
        env_var: String,
    },
    /// Request could not be sent or the response could not be read.
    #[error("remote request failed: {0}")]
    Transport(String),
    /// Remote service answered with a non-success status.
    #[error("remote service returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response summary.
        message: String,
    },
    /// Response body did not match the expected shape.
    #[error("remote response invalid: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Returns the stable error code for this remote error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CredentialMissing {
                ..
            } => "credential_missing",
            Self::Transport(_) => "transport_failed",
            Self::Status {
                ..
            } => "status_error",
            Self::Decode(_) => "decode_failed",
        }
    }
}

// ============================================================================
// SECTION: Remote Executor
// ============================================================================

/// Remote action execution boundary.
pub trait RemoteExecutor {
    /// Executes one action remotely and returns the raw response payload.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the call fails; callers do not retry.
    fn execute(&self, request: &ExecutionRequest) -> Result<Params, RemoteError>;
}

// ============================================================================
// SECTION: Catalogue Source
// ============================================================================

/// Filter used when listing catalogue actions.
///
/// # Invariants
/// - Empty `apps` matches every app; empty `tags` matches every action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionFilter {
    /// Apps to include.
    pub apps: Vec<AppId>,
    /// Tags of which at least one must be present.
    pub tags: Vec<String>,
}

impl ActionFilter {
    /// Creates a filter over the given apps and tags.
    #[must_use]
    pub const fn new(apps: Vec<AppId>, tags: Vec<String>) -> Self {
        Self {
            apps,
            tags,
        }
    }

    /// Returns true when the action satisfies the filter.
    #[must_use]
    pub fn matches(&self, action: &ActionMetadata) -> bool {
        let app_ok =
            self.apps.is_empty() || self.apps.iter().any(|app| app.matches(action.app.as_str()));
        let tag_ok = self.tags.is_empty() || action.has_any_tag(&self.tags);
        app_ok && tag_ok
    }
}

/// Remote catalogue metadata source.
pub trait CatalogueSource {
    /// Fetches metadata for one action; `Ok(None)` when the slug is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the lookup fails.
    fn fetch_action(&self, action: &ActionId) -> Result<Option<ActionMetadata>, RemoteError>;

    /// Fetches metadata for one app; `Ok(None)` when the slug is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the lookup fails.
    fn fetch_app(&self, app: &AppId) -> Result<Option<AppMetadata>, RemoteError>;

    /// Lists actions matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the listing fails.
    fn list_actions(&self, filter: &ActionFilter) -> Result<Vec<ActionMetadata>, RemoteError>;
}

// ============================================================================
// SECTION: Account Directory
// ============================================================================

/// Connected account directory of the remote service.
pub trait AccountDirectory {
    /// Fetches one account; `Ok(None)` when the identifier is unknown to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the lookup fails.
    fn connected_account(
        &self,
        account: &ConnectedAccountId,
    ) -> Result<Option<ConnectedAccount>, RemoteError>;

    /// Lists the entity's accounts, optionally restricted to one app.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the listing fails.
    fn connected_accounts(
        &self,
        entity: &EntityId,
        app: Option<&AppId>,
    ) -> Result<Vec<ConnectedAccount>, RemoteError>;
}

// ============================================================================
// SECTION: Package Installer
// ============================================================================

/// Local package installer errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InstallerError {
    /// Installer process could not be started.
    #[error("failed to run {program}: {error}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Error details.
        error: String,
    },
    /// Installer process exited unsuccessfully.
    #[error("installer exited with {status}: {stderr}")]
    Exited {
        /// Exit status label.
        status: String,
        /// Captured standard error (trimmed).
        stderr: String,
    },
}

/// Local package manager boundary.
pub trait PackageInstaller {
    /// Returns true when the package is already importable.
    fn is_installed(&self, package: &str) -> bool;

    /// Installs the package and returns the installer's textual output.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError`] when the installer cannot run or exits unsuccessfully.
    fn install(&self, package: &str) -> Result<String, InstallerError>;
}
