// crates/actionset-toolset/src/catalogue.rs
// ============================================================================
// Module: Catalogue Cache
// Description: Slug-keyed lookup over local registrations and remote metadata.
// Purpose: Populate action and app metadata lazily and keep it for reuse.
// Dependencies: actionset-core
// ============================================================================

//! ## Overview
//! Lookups consult the [`ActionRegistry`] first, then the cache, then the
//! remote [`CatalogueSource`]. Remote results are cached for the lifetime of
//! the catalogue; concurrent first lookups may fetch twice but always store
//! the same record. Unknown slugs surface as not-found errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use actionset_core::ActionFilter;
use actionset_core::ActionId;
use actionset_core::ActionMetadata;
use actionset_core::AppId;
use actionset_core::AppMetadata;
use actionset_core::CatalogueSource;

use crate::error::ToolsetError;
use crate::registry::ActionRegistry;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Cached remote metadata.
#[derive(Default)]
struct CatalogueCache {
    /// Actions by slug.
    actions: BTreeMap<ActionId, ActionMetadata>,
    /// Apps by slug.
    apps: BTreeMap<AppId, AppMetadata>,
    /// Full action lists of loaded apps, in catalogue order.
    loaded: BTreeMap<AppId, Vec<ActionId>>,
}

/// Read-mostly catalogue of remote and local metadata.
pub struct Catalogue {
    /// Remote metadata source.
    source: Arc<dyn CatalogueSource + Send + Sync>,
    /// Local registrations, consulted first.
    registry: Arc<ActionRegistry>,
    /// Remote metadata cache.
    cache: RwLock<CatalogueCache>,
}

impl Catalogue {
    /// Creates an empty catalogue over `source` and `registry`.
    #[must_use]
    pub fn new(
        source: Arc<dyn CatalogueSource + Send + Sync>,
        registry: Arc<ActionRegistry>,
    ) -> Self {
        Self {
            source,
            registry,
            cache: RwLock::new(CatalogueCache::default()),
        }
    }

    /// Returns the local registry backing this catalogue.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// Resolves an action slug.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::ActionNotFound`] for unknown slugs and
    /// propagates remote failures.
    pub fn action(&self, action: &ActionId) -> Result<ActionMetadata, ToolsetError> {
        if let Some(local) = self.registry.action(action) {
            return Ok(local);
        }
        if let Some(cached) = self.read().actions.get(action) {
            return Ok(cached.clone());
        }
        let fetched = self.source.fetch_action(action)?.ok_or_else(|| {
            ToolsetError::ActionNotFound {
                action: action.clone(),
            }
        })?;
        self.write().actions.entry(action.clone()).or_insert_with(|| fetched.clone());
        Ok(fetched)
    }

    /// Resolves an app slug.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::AppNotFound`] for unknown slugs and propagates
    /// remote failures.
    pub fn app(&self, app: &AppId) -> Result<AppMetadata, ToolsetError> {
        if let Some(local) = self.registry.app(app) {
            return Ok(local);
        }
        if let Some(cached) = self.read().apps.get(app) {
            return Ok(cached.clone());
        }
        let fetched = self.source.fetch_app(app)?.ok_or_else(|| ToolsetError::AppNotFound {
            app: app.clone(),
        })?;
        self.write().apps.entry(app.clone()).or_insert_with(|| fetched.clone());
        Ok(fetched)
    }

    /// Eagerly fetches an app and its full action list into the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::AppNotFound`] for unknown apps and propagates
    /// remote failures.
    pub fn load_app(&self, app: &AppId) -> Result<Vec<ActionMetadata>, ToolsetError> {
        let metadata = self.app(app)?;
        let filter = ActionFilter::new(vec![metadata.app.clone()], Vec::new());
        if self.registry.has_app(app) {
            return Ok(self.registry.actions_matching(&filter));
        }
        if let Some(actions) = self.loaded_actions(&metadata.app) {
            return Ok(actions);
        }
        let actions = self.source.list_actions(&filter)?;
        let mut cache = self.write();
        for action in &actions {
            cache.actions.entry(action.action.clone()).or_insert_with(|| action.clone());
        }
        cache
            .loaded
            .insert(metadata.app.clone(), actions.iter().map(|action| action.action.clone()).collect());
        Ok(actions)
    }

    /// Finds actions matching `filter` across local and remote apps.
    ///
    /// Local matches come first (slug order), then remote matches in
    /// catalogue order. Loaded apps are answered from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::AppNotFound`] when a filtered app is unknown
    /// and propagates remote failures.
    pub fn find_actions(&self, filter: &ActionFilter) -> Result<Vec<ActionMetadata>, ToolsetError> {
        for app in &filter.apps {
            self.app(app)?;
        }
        let mut found = self.registry.actions_matching(filter);
        let remote_apps: Vec<AppId> =
            filter.apps.iter().filter(|app| !self.registry.has_app(app)).cloned().collect();
        if !filter.apps.is_empty() && remote_apps.is_empty() {
            return Ok(found);
        }

        let mut unloaded = Vec::new();
        for app in &remote_apps {
            match self.loaded_actions(app) {
                Some(actions) => {
                    found.extend(actions.into_iter().filter(|action| filter.matches(action)));
                }
                None => unloaded.push(app.clone()),
            }
        }
        if !remote_apps.is_empty() && unloaded.is_empty() {
            return Ok(found);
        }

        let remote = self.source.list_actions(&ActionFilter::new(unloaded, filter.tags.clone()))?;
        {
            let mut cache = self.write();
            for action in &remote {
                cache.actions.entry(action.action.clone()).or_insert_with(|| action.clone());
            }
        }
        found.extend(
            remote.into_iter().filter(|action| !action.origin.is_local() && filter.matches(action)),
        );
        Ok(found)
    }

    /// Drops every cached remote record.
    pub fn clear(&self) {
        let mut cache = self.write();
        cache.actions.clear();
        cache.apps.clear();
        cache.loaded.clear();
    }

    /// Returns the cached action list of a loaded app.
    fn loaded_actions(&self, app: &AppId) -> Option<Vec<ActionMetadata>> {
        let cache = self.read();
        let slugs = cache.loaded.get(app)?;
        Some(slugs.iter().filter_map(|slug| cache.actions.get(slug).cloned()).collect())
    }

    /// Acquires the cache read lock, recovering from poisoning.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, CatalogueCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires the cache write lock, recovering from poisoning.
    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CatalogueCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}
