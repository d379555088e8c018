// crates/actionset-toolset/src/error.rs
// ============================================================================
// Module: Toolset Errors
// Description: Caller-facing error type of the toolset core.
// Purpose: Classify every hard failure of a toolset call with a stable code.
// Dependencies: actionset-core, actionset-config, thiserror
// ============================================================================

//! ## Overview
//! [`ToolsetError`] is returned by every fallible toolset operation. Messages
//! name the offending slug and, where one exists, the command that fixes the
//! problem. Post-processor contract violations are not errors; they degrade
//! the result to `None` and emit a warning event instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use actionset_config::ConfigError;
use actionset_core::ActionId;
use actionset_core::AppId;
use actionset_core::ConnectedAccountId;
use actionset_core::RemoteError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Toolset failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling; see [`ToolsetError::code`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolsetError {
    /// No API key was available when a remote call was attempted.
    #[error(
        "api key not provided; either provide an api key, export it as `{env_var}`, or run \
         `actionset login`"
    )]
    CredentialMissing {
        /// Environment variable expected to hold the key.
        env_var: String,
    },
    /// No connected account exists for an app that needs one.
    #[error(
        "no connected account found for app `{app}`; run `actionset add {}` to fix this",
        .app.command_name()
    )]
    AccountNotFound {
        /// App lacking a connected account.
        app: AppId,
    },
    /// Explicit connected accounts that do not belong to their stated app.
    #[error("invalid connected accounts found: [{}]", format_pairs(.pairs))]
    AccountMismatch {
        /// Every invalid pair, in map order.
        pairs: Vec<(AppId, ConnectedAccountId)>,
    },
    /// Unknown action slug.
    #[error("action `{action}` not found")]
    ActionNotFound {
        /// Requested action.
        action: ActionId,
    },
    /// Unknown app slug.
    #[error("app `{app}` not found")]
    AppNotFound {
        /// Requested app.
        app: AppId,
    },
    /// A local package could not be installed.
    #[error("error installing {package}: {detail}")]
    DependencyInstall {
        /// Package that failed.
        package: String,
        /// Installer detail.
        detail: String,
    },
    /// A pre-processor returned something other than a JSON object.
    #[error("expected pre-processor for {scope} to return 'object', got '{actual}'")]
    PreProcessorContract {
        /// Scope label of the offending processor.
        scope: String,
        /// JSON type actually returned.
        actual: &'static str,
    },
    /// Caller-supplied parameters are unusable.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// A local or runtime action has no registered handler.
    #[error("no local handler registered for action `{action}`")]
    LocalHandlerMissing {
        /// Action without a handler.
        action: ActionId,
    },
    /// Local or runtime registration was rejected.
    #[error("registration failed: {0}")]
    Registration(String),
    /// Remote boundary failure, propagated verbatim.
    #[error(transparent)]
    Remote(RemoteError),
    /// Configuration could not be turned into a toolset.
    #[error("toolset configuration error: {0}")]
    Config(String),
}

impl ToolsetError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CredentialMissing {
                ..
            } => "credential_missing",
            Self::AccountNotFound {
                ..
            } => "account_not_found",
            Self::AccountMismatch {
                ..
            } => "account_mismatch",
            Self::ActionNotFound {
                ..
            } => "action_not_found",
            Self::AppNotFound {
                ..
            } => "app_not_found",
            Self::DependencyInstall {
                ..
            } => "dependency_install_failed",
            Self::PreProcessorContract {
                ..
            } => "pre_processor_contract",
            Self::InvalidParams(_) => "invalid_params",
            Self::LocalHandlerMissing {
                ..
            } => "local_handler_missing",
            Self::Registration(_) => "registration_failed",
            Self::Remote(_) => "remote_execution_failed",
            Self::Config(_) => "config_invalid",
        }
    }
}

impl From<RemoteError> for ToolsetError {
    fn from(error: RemoteError) -> Self {
        match error {
            RemoteError::CredentialMissing {
                env_var,
            } => Self::CredentialMissing {
                env_var,
            },
            other => Self::Remote(other),
        }
    }
}

impl From<ConfigError> for ToolsetError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error.to_string())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders `(APP, account)` pairs separated by commas.
fn format_pairs(pairs: &[(AppId, ConnectedAccountId)]) -> String {
    let mut out = String::new();
    for (index, (app, account)) in pairs.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "({app}, {account})");
    }
    out
}
