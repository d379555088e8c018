// crates/actionset-toolset/src/registry.rs
// ============================================================================
// Module: Local Action Registry
// Description: Process-wide registry of local apps, local actions, and handlers.
// Purpose: Resolve in-process actions without a remote round-trip.
// Dependencies: actionset-core
// ============================================================================

//! ## Overview
//! The registry holds apps and actions that execute in-process: local actions
//! shipped with the host and runtime actions registered from closures. Lookups
//! consult it before the remote catalogue. Registering an action that already
//! exists replaces it.
//!
//! [`ActionRegistry::shared`] is the process-wide instance. Tests that need
//! isolation build their own with [`ActionRegistry::new`] or call
//! [`ActionRegistry::clear`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::PoisonError;
use std::sync::RwLock;

use actionset_core::ActionFilter;
use actionset_core::ActionId;
use actionset_core::ActionMetadata;
use actionset_core::AppId;
use actionset_core::AppMetadata;

use crate::error::ToolsetError;
use crate::runtime::ActionHandler;
use crate::runtime::RuntimeActionDefinition;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Registered action and its handler.
#[derive(Clone)]
struct LocalAction {
    /// Catalogue metadata.
    metadata: ActionMetadata,
    /// Handler, absent for metadata-only registrations.
    handler: Option<ActionHandler>,
}

/// Registry contents.
#[derive(Default)]
struct RegistryState {
    /// Local apps keyed by slug.
    apps: BTreeMap<AppId, AppMetadata>,
    /// Local actions keyed by slug, in slug order.
    actions: BTreeMap<ActionId, LocalAction>,
}

/// Registry of in-process apps and actions.
///
/// # Invariants
/// - Every registered action's app is registered.
/// - Every registered action has a local or runtime origin.
#[derive(Default)]
pub struct ActionRegistry {
    /// Guarded registry contents.
    state: RwLock<RegistryState>,
}

/// Process-wide registry instance.
static SHARED_REGISTRY: OnceLock<Arc<ActionRegistry>> = OnceLock::new();

impl ActionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(SHARED_REGISTRY.get_or_init(|| Arc::new(Self::new())))
    }

    /// Registers or replaces a local app.
    pub fn register_app(&self, app: AppMetadata) {
        self.write().apps.insert(app.app.clone(), app);
    }

    /// Registers or replaces a local action with its handler.
    ///
    /// The action's app is registered as a local app when unknown.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::Registration`] when the action is remote.
    pub fn register_action(
        &self,
        metadata: ActionMetadata,
        handler: Option<ActionHandler>,
    ) -> Result<(), ToolsetError> {
        if !metadata.origin.is_local() {
            return Err(ToolsetError::Registration(format!(
                "action `{}` has a remote origin and cannot be registered locally",
                metadata.action
            )));
        }
        let mut state = self.write();
        if !state.apps.contains_key(&metadata.app) {
            let app = AppMetadata::local(metadata.app.clone());
            state.apps.insert(app.app.clone(), app);
        }
        state.actions.insert(metadata.action.clone(), LocalAction {
            metadata,
            handler,
        });
        Ok(())
    }

    /// Registers a runtime action from its explicit definition.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::Registration`] when the definition is invalid.
    pub fn register_runtime(
        &self,
        definition: &RuntimeActionDefinition,
        handler: ActionHandler,
    ) -> Result<ActionMetadata, ToolsetError> {
        let metadata = definition.to_metadata()?;
        {
            let mut state = self.write();
            state.apps.entry(definition.app_id()).or_insert_with(|| definition.app_metadata());
        }
        self.register_action(metadata.clone(), Some(handler))?;
        Ok(metadata)
    }

    /// Returns a registered action.
    #[must_use]
    pub fn action(&self, action: &ActionId) -> Option<ActionMetadata> {
        self.read().actions.get(action).map(|entry| entry.metadata.clone())
    }

    /// Returns a registered app, matching the slug case-insensitively.
    #[must_use]
    pub fn app(&self, app: &AppId) -> Option<AppMetadata> {
        let state = self.read();
        state.apps.get(app).cloned().or_else(|| {
            state.apps.values().find(|candidate| app.matches(candidate.app.as_str())).cloned()
        })
    }

    /// Returns true when `app` is a registered local app.
    #[must_use]
    pub fn has_app(&self, app: &AppId) -> bool {
        self.app(app).is_some()
    }

    /// Returns the handler of a registered action.
    #[must_use]
    pub fn handler(&self, action: &ActionId) -> Option<ActionHandler> {
        self.read().actions.get(action).and_then(|entry| entry.handler.clone())
    }

    /// Returns registered actions matching `filter`, in slug order.
    #[must_use]
    pub fn actions_matching(&self, filter: &ActionFilter) -> Vec<ActionMetadata> {
        self.read()
            .actions
            .values()
            .filter(|entry| filter.matches(&entry.metadata))
            .map(|entry| entry.metadata.clone())
            .collect()
    }

    /// Replaces the required packages of a registered action.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::ActionNotFound`] when the action is unknown.
    pub fn set_action_requires<I, S>(&self, action: &ActionId, requires: I) -> Result<(), ToolsetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.write();
        let entry = state.actions.get_mut(action).ok_or_else(|| ToolsetError::ActionNotFound {
            action: action.clone(),
        })?;
        entry.metadata.requires = requires.into_iter().map(Into::into).collect();
        Ok(())
    }

    /// Replaces the required packages of a registered app.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::AppNotFound`] when the app is unknown.
    pub fn set_app_requires<I, S>(&self, app: &AppId, requires: I) -> Result<(), ToolsetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.write();
        let entry = state.apps.get_mut(app).ok_or_else(|| ToolsetError::AppNotFound {
            app: app.clone(),
        })?;
        entry.requires = requires.into_iter().map(Into::into).collect();
        Ok(())
    }

    /// Removes every registration.
    pub fn clear(&self) {
        let mut state = self.write();
        state.apps.clear();
        state.actions.clear();
    }

    /// Acquires the read lock, recovering from poisoning.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires the write lock, recovering from poisoning.
    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
