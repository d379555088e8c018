// crates/actionset-toolset/src/accounts.rs
// ============================================================================
// Module: Account Resolver
// Description: Maps apps to connected accounts for remote execution.
// Purpose: Verify explicit accounts once and resolve the rest on demand.
// Dependencies: actionset-core
// ============================================================================

//! ## Overview
//! Explicit (app, account) pairs are verified when the resolver is built:
//! each account is fetched from the directory and must belong to its stated
//! app and, when the directory reports an owner, to the toolset's entity.
//! Every failing pair is reported together in one
//! [`ToolsetError::AccountMismatch`]. After that, explicit accounts are used
//! verbatim; other apps are resolved against the directory at call time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use actionset_core::AccountDirectory;
use actionset_core::AppId;
use actionset_core::ConnectedAccountId;
use actionset_core::EntityId;

use crate::error::ToolsetError;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Connected account resolver owned by one toolset.
///
/// # Invariants
/// - Every explicit pair was verified against the directory at construction.
pub struct AccountResolver {
    /// Connected account directory.
    directory: Arc<dyn AccountDirectory + Send + Sync>,
    /// Verified explicit accounts.
    explicit: BTreeMap<AppId, ConnectedAccountId>,
}

impl AccountResolver {
    /// Verifies `explicit` for `entity` and builds the resolver.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::AccountMismatch`] listing every invalid pair,
    /// or the first remote failure encountered while verifying.
    pub fn verified(
        directory: Arc<dyn AccountDirectory + Send + Sync>,
        explicit: BTreeMap<AppId, ConnectedAccountId>,
        entity: &EntityId,
    ) -> Result<Self, ToolsetError> {
        let mut invalid = Vec::new();
        for (app, account) in &explicit {
            let valid = directory.connected_account(account)?.is_some_and(|record| {
                record.belongs_to(app)
                    && record.entity_id.as_ref().is_none_or(|owner| owner == entity)
            });
            if !valid {
                invalid.push((app.clone(), account.clone()));
            }
        }
        if !invalid.is_empty() {
            return Err(ToolsetError::AccountMismatch {
                pairs: invalid,
            });
        }
        Ok(Self {
            directory,
            explicit,
        })
    }

    /// Returns the explicit account for `app`, matching case-insensitively.
    #[must_use]
    pub fn explicit_for(&self, app: &AppId) -> Option<&ConnectedAccountId> {
        self.explicit.get(app).or_else(|| {
            self.explicit
                .iter()
                .find(|(candidate, _)| app.matches(candidate.as_str()))
                .map(|(_, account)| account)
        })
    }

    /// Returns the verified explicit accounts.
    #[must_use]
    pub const fn explicit(&self) -> &BTreeMap<AppId, ConnectedAccountId> {
        &self.explicit
    }

    /// Resolves the account used to execute actions of `app` for `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::AccountNotFound`] when the entity has no active
    /// account for the app, and propagates remote failures.
    pub fn resolve(
        &self,
        app: &AppId,
        entity: &EntityId,
    ) -> Result<ConnectedAccountId, ToolsetError> {
        if let Some(account) = self.explicit_for(app) {
            return Ok(account.clone());
        }
        self.directory
            .connected_accounts(entity, Some(app))?
            .into_iter()
            .find(|account| account.belongs_to(app) && account.status.is_active())
            .map(|account| account.id)
            .ok_or_else(|| ToolsetError::AccountNotFound {
                app: app.clone(),
            })
    }
}
