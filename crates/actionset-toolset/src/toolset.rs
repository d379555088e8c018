// crates/actionset-toolset/src/toolset.rs
// ============================================================================
// Module: Toolset
// Description: Execution core orchestrating accounts, processors, and dispatch.
// Purpose: Provide the single caller-facing entry point of the toolset.
// Dependencies: actionset-core, actionset-config, actionset-client, rand, serde
// ============================================================================

//! ## Overview
//! One [`Toolset::execute_action`] call runs a linear sequence with no retries:
//! resolve the connected account, serialize the parameters, pre-process,
//! dispatch, post-process. Local and runtime actions are dispatched to their
//! registered handler and skip account resolution.
//!
//! [`Toolset::get_action_schemas`] and [`Toolset::get_tools`] take the lighter
//! path: resolve catalogue entries, optionally validate local dependencies,
//! optionally verify connected accounts, then derive schemas.
//!
//! Variants (runtime tag and character limits) are plain configuration in
//! [`ToolsetVariant`]; there is no per-variant type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::slice;
use std::sync::Arc;

use actionset_client::HttpRemoteService;
use actionset_config::ActionsetConfig;
use actionset_config::DEFAULT_RUNTIME;
use actionset_config::DEFAULT_SUCCESS_MARKER;
use actionset_core::AccountDirectory;
use actionset_core::ActionFilter;
use actionset_core::ActionId;
use actionset_core::ActionMetadata;
use actionset_core::ActionSchema;
use actionset_core::AppId;
use actionset_core::AppMetadata;
use actionset_core::CatalogueSource;
use actionset_core::ConnectedAccountId;
use actionset_core::EntityId;
use actionset_core::ExecutionRequest;
use actionset_core::PackageInstaller;
use actionset_core::Params;
use actionset_core::RemoteExecutor;
use actionset_core::SessionId;
use actionset_core::json_type_name;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Serialize;
use serde_json::Value;

use crate::accounts::AccountResolver;
use crate::catalogue::Catalogue;
use crate::dependencies::CommandInstaller;
use crate::dependencies::DependencyValidator;
use crate::dependencies::InstalledPackages;
use crate::error::ToolsetError;
use crate::events::ACCOUNT_CHECK_SKIPPED;
use crate::events::ACTION_EXECUTED;
use crate::events::EventLevel;
use crate::events::PROCESSORS_DEPRECATED;
use crate::events::StderrEventSink;
use crate::events::ToolsetEvent;
use crate::events::ToolsetEventSink;
use crate::events::sink_from_config;
use crate::processors::ProcessorScope;
use crate::processors::ProcessorSpec;
use crate::registry::ActionRegistry;
use crate::schema::CharLimits;
use crate::schema::SchemaResolver;

// ============================================================================
// SECTION: Variant
// ============================================================================

/// Fixed configuration distinguishing one toolset flavour from another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsetVariant {
    /// Runtime tag sent with every remote execution.
    pub runtime: String,
    /// Hard cut applied to presented descriptions.
    pub description_char_limit: Option<usize>,
    /// Hard cut applied to presented action names.
    pub action_name_char_limit: Option<usize>,
}

impl ToolsetVariant {
    /// Creates a variant without character limits.
    #[must_use]
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
            description_char_limit: None,
            action_name_char_limit: None,
        }
    }

    /// Sets the description limit.
    #[must_use]
    pub fn with_description_char_limit(mut self, limit: usize) -> Self {
        self.description_char_limit = Some(limit);
        self
    }

    /// Sets the action name limit.
    #[must_use]
    pub fn with_action_name_char_limit(mut self, limit: usize) -> Self {
        self.action_name_char_limit = Some(limit);
        self
    }

    /// Returns the limits applied by the schema resolver.
    #[must_use]
    pub const fn char_limits(&self) -> CharLimits {
        CharLimits {
            name: self.action_name_char_limit,
            description: self.description_char_limit,
        }
    }
}

impl Default for ToolsetVariant {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME)
    }
}

// ============================================================================
// SECTION: Backends
// ============================================================================

/// External collaborators of a toolset.
#[derive(Clone)]
pub struct ToolsetBackends {
    /// Remote action executor.
    pub executor: Arc<dyn RemoteExecutor + Send + Sync>,
    /// Remote catalogue metadata.
    pub catalogue: Arc<dyn CatalogueSource + Send + Sync>,
    /// Connected account directory.
    pub accounts: Arc<dyn AccountDirectory + Send + Sync>,
    /// Local package installer.
    pub installer: Arc<dyn PackageInstaller + Send + Sync>,
}

impl ToolsetBackends {
    /// Uses one remote service for execution, catalogue, and accounts.
    #[must_use]
    pub fn remote<S>(service: Arc<S>, installer: Arc<dyn PackageInstaller + Send + Sync>) -> Self
    where
        S: RemoteExecutor + CatalogueSource + AccountDirectory + Send + Sync + 'static,
    {
        Self {
            executor: Arc::clone(&service) as Arc<dyn RemoteExecutor + Send + Sync>,
            catalogue: Arc::clone(&service) as Arc<dyn CatalogueSource + Send + Sync>,
            accounts: service,
            installer,
        }
    }
}

// ============================================================================
// SECTION: Call Options
// ============================================================================

/// Per-call options of [`Toolset::execute_action`].
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Entity to act for; the toolset entity when absent.
    pub entity_id: Option<EntityId>,
    /// Account to use unconditionally.
    pub connected_account_id: Option<ConnectedAccountId>,
    /// Natural-language hint forwarded to the remote service.
    pub text: Option<String>,
    /// Session to report; the toolset session when absent.
    pub session_id: Option<SessionId>,
    /// Processors for this call, layered over construction-time processors.
    pub processors: Option<ProcessorSpec>,
}

impl ExecuteOptions {
    /// Sets the entity.
    #[must_use]
    pub fn with_entity(mut self, entity_id: impl Into<EntityId>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Sets the connected account.
    #[must_use]
    pub fn with_connected_account(mut self, account: impl Into<ConnectedAccountId>) -> Self {
        self.connected_account_id = Some(account.into());
        self
    }

    /// Sets the text hint.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the session.
    #[must_use]
    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Sets per-call processors.
    #[must_use]
    pub fn with_processors(mut self, processors: ProcessorSpec) -> Self {
        self.processors = Some(processors);
        self
    }
}

/// Selection of actions for schema retrieval and tool enumeration.
///
/// Explicit actions come first in the given order, followed by app and tag
/// matches that were not listed explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRequest {
    /// Explicit actions.
    pub actions: Vec<ActionId>,
    /// Apps whose actions are included.
    pub apps: Vec<AppId>,
    /// Tags of which an included action carries at least one.
    pub tags: Vec<String>,
    /// Overrides the toolset's connected account check setting.
    pub check_connected_accounts: Option<bool>,
}

impl SchemaRequest {
    /// Selects explicit actions.
    #[must_use]
    pub fn actions<I, A>(actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActionId>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Adds app selection.
    #[must_use]
    pub fn with_apps<I, A>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AppId>,
    {
        self.apps = apps.into_iter().map(Into::into).collect();
        self
    }

    /// Adds tag selection.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Skips connected account verification for this request.
    #[must_use]
    pub const fn skip_account_check(mut self) -> Self {
        self.check_connected_accounts = Some(false);
        self
    }
}

// ============================================================================
// SECTION: Tool Handles
// ============================================================================

/// Executable schema returned by [`Toolset::get_tools`].
///
/// Processors passed to `get_tools` apply to every execution made through
/// this handle.
pub struct Tool<'a> {
    /// Owning toolset.
    toolset: &'a Toolset,
    /// Presentation schema.
    schema: ActionSchema,
    /// Processors bound at enumeration time.
    processors: ProcessorSpec,
}

impl Tool<'_> {
    /// Returns the presentation schema.
    #[must_use]
    pub const fn schema(&self) -> &ActionSchema {
        &self.schema
    }

    /// Executes the tool's action.
    ///
    /// Processors in `options` win over the handle's on colliding scopes.
    ///
    /// # Errors
    ///
    /// See [`Toolset::execute_action`].
    pub fn execute<P: Serialize + ?Sized>(
        &self,
        params: &P,
        mut options: ExecuteOptions,
    ) -> Result<Option<Params>, ToolsetError> {
        let processors = match options.processors.take() {
            Some(call) => self.processors.layered(&call),
            None => self.processors.clone(),
        };
        self.toolset.execute_action(&self.schema.action, params, options.with_processors(processors))
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for [`Toolset`].
pub struct ToolsetBuilder {
    /// External collaborators.
    backends: ToolsetBackends,
    /// Variant configuration.
    variant: ToolsetVariant,
    /// Default entity.
    entity_id: EntityId,
    /// Fixed session, generated when absent.
    session_id: Option<SessionId>,
    /// Explicit connected accounts.
    connected_accounts: BTreeMap<AppId, ConnectedAccountId>,
    /// Construction-time processors.
    processors: ProcessorSpec,
    /// Event sink; stderr when absent.
    events: Option<Arc<dyn ToolsetEventSink>>,
    /// Local registry; the shared registry when absent.
    registry: Option<Arc<ActionRegistry>>,
    /// Catalogue; built over the backends when absent.
    catalogue: Option<Arc<Catalogue>>,
    /// Verified package cache; the global cache when absent.
    installed: Option<Arc<InstalledPackages>>,
    /// Installer success marker.
    success_marker: String,
    /// Validate local dependencies automatically.
    auto_validate: bool,
    /// Verify connected accounts during schema retrieval.
    check_connected_accounts: bool,
}

impl ToolsetBuilder {
    /// Sets the variant.
    #[must_use]
    pub fn variant(mut self, variant: ToolsetVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the default entity.
    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<EntityId>) -> Self {
        self.entity_id = entity_id.into();
        self
    }

    /// Fixes the session instead of generating one.
    #[must_use]
    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Adds an explicit connected account for `app`.
    #[must_use]
    pub fn connected_account(
        mut self,
        app: impl Into<AppId>,
        account: impl Into<ConnectedAccountId>,
    ) -> Self {
        self.connected_accounts.insert(app.into(), account.into());
        self
    }

    /// Adds explicit connected accounts.
    #[must_use]
    pub fn connected_accounts<I>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = (AppId, ConnectedAccountId)>,
    {
        self.connected_accounts.extend(accounts);
        self
    }

    /// Sets construction-time processors.
    ///
    /// Deprecated in favour of [`ExecuteOptions::processors`] and the
    /// processors argument of [`Toolset::get_tools`]; building a toolset with
    /// non-empty processors records a `processors_deprecated` warning.
    #[must_use]
    pub fn processors(mut self, processors: ProcessorSpec) -> Self {
        self.processors = processors;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn event_sink(mut self, events: Arc<dyn ToolsetEventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Sets the local registry.
    #[must_use]
    pub fn registry(mut self, registry: Arc<ActionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Shares an existing catalogue; its registry takes precedence.
    #[must_use]
    pub fn catalogue(mut self, catalogue: Arc<Catalogue>) -> Self {
        self.catalogue = Some(catalogue);
        self
    }

    /// Sets the verified package cache.
    #[must_use]
    pub fn installed_packages(mut self, installed: Arc<InstalledPackages>) -> Self {
        self.installed = Some(installed);
        self
    }

    /// Sets the installer success marker.
    #[must_use]
    pub fn success_marker(mut self, marker: impl Into<String>) -> Self {
        self.success_marker = marker.into();
        self
    }

    /// Enables or disables automatic dependency validation.
    #[must_use]
    pub const fn auto_validate(mut self, enabled: bool) -> Self {
        self.auto_validate = enabled;
        self
    }

    /// Enables or disables connected account checks during schema retrieval.
    #[must_use]
    pub const fn check_connected_accounts(mut self, enabled: bool) -> Self {
        self.check_connected_accounts = enabled;
        self
    }

    /// Verifies explicit accounts and builds the toolset.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::AccountMismatch`] listing every explicit
    /// account that does not belong to its app, or the remote failure that
    /// prevented verification.
    pub fn build(self) -> Result<Toolset, ToolsetError> {
        let Self {
            backends,
            variant,
            entity_id,
            session_id,
            connected_accounts,
            processors,
            events,
            registry,
            catalogue,
            installed,
            success_marker,
            auto_validate,
            check_connected_accounts,
        } = self;
        let events: Arc<dyn ToolsetEventSink> =
            events.unwrap_or_else(|| Arc::new(StderrEventSink::new(EventLevel::Info)));
        if !processors.is_empty() {
            events.record(&ToolsetEvent::warning(
                PROCESSORS_DEPRECATED,
                "construction-time processors are deprecated; pass processors per call instead",
            ));
        }
        let catalogue = catalogue.unwrap_or_else(|| {
            let registry = registry.unwrap_or_else(ActionRegistry::shared);
            Arc::new(Catalogue::new(backends.catalogue, registry))
        });
        let accounts = AccountResolver::verified(backends.accounts, connected_accounts, &entity_id)?;
        let dependencies = DependencyValidator::new(
            backends.installer,
            installed.unwrap_or_else(InstalledPackages::global),
            success_marker,
            Arc::clone(&events),
        );
        Ok(Toolset {
            schemas: SchemaResolver::new(variant.char_limits()),
            variant,
            entity_id,
            session_id: session_id.unwrap_or_else(generate_session_id),
            executor: backends.executor,
            catalogue,
            accounts,
            processors,
            dependencies,
            auto_validate,
            check_connected_accounts,
            events,
        })
    }
}

// ============================================================================
// SECTION: Toolset
// ============================================================================

/// Caller-facing toolset.
///
/// # Invariants
/// - Explicit connected accounts were verified at construction.
/// - Construction-time processors and accounts are read-only.
pub struct Toolset {
    /// Variant configuration.
    variant: ToolsetVariant,
    /// Default entity.
    entity_id: EntityId,
    /// Session reported with every remote execution.
    session_id: SessionId,
    /// Remote action executor.
    executor: Arc<dyn RemoteExecutor + Send + Sync>,
    /// Catalogue over local registrations and remote metadata.
    catalogue: Arc<Catalogue>,
    /// Connected account resolver.
    accounts: AccountResolver,
    /// Construction-time processors.
    processors: ProcessorSpec,
    /// Local dependency validator.
    dependencies: DependencyValidator,
    /// Schema resolver configured with the variant limits.
    schemas: SchemaResolver,
    /// Validate local dependencies automatically.
    auto_validate: bool,
    /// Verify connected accounts during schema retrieval by default.
    check_connected_accounts: bool,
    /// Event sink.
    events: Arc<dyn ToolsetEventSink>,
}

impl Toolset {
    /// Starts a builder over `backends`.
    #[must_use]
    pub fn builder(backends: ToolsetBackends) -> ToolsetBuilder {
        ToolsetBuilder {
            backends,
            variant: ToolsetVariant::default(),
            entity_id: EntityId::default(),
            session_id: None,
            connected_accounts: BTreeMap::new(),
            processors: ProcessorSpec::new(),
            events: None,
            registry: None,
            catalogue: None,
            installed: None,
            success_marker: DEFAULT_SUCCESS_MARKER.to_string(),
            auto_validate: true,
            check_connected_accounts: true,
        }
    }

    /// Builds a toolset wired to the HTTP client and command installer.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::Config`] for invalid configuration and the
    /// errors of [`ToolsetBuilder::build`].
    pub fn from_config(config: &ActionsetConfig) -> Result<Self, ToolsetError> {
        config.validate()?;
        let service = Arc::new(HttpRemoteService::new(config.remote.clone())?);
        let installer = Arc::new(CommandInstaller::from_config(&config.dependencies));
        let variant = ToolsetVariant {
            runtime: config.toolset.runtime.clone(),
            description_char_limit: config.toolset.description_char_limit,
            action_name_char_limit: config.toolset.action_name_char_limit,
        };
        let accounts = config.connected_accounts.iter().map(|(app, account)| {
            (AppId::new(app.as_str()), ConnectedAccountId::new(account.as_str()))
        });
        Self::builder(ToolsetBackends::remote(service, installer))
            .variant(variant)
            .entity_id(config.toolset.entity_id.as_str())
            .connected_accounts(accounts)
            .auto_validate(config.dependencies.auto_validate)
            .check_connected_accounts(config.toolset.check_connected_accounts)
            .success_marker(config.dependencies.success_marker.clone())
            .event_sink(sink_from_config(&config.logging)?)
            .build()
    }

    /// Returns the variant.
    #[must_use]
    pub const fn variant(&self) -> &ToolsetVariant {
        &self.variant
    }

    /// Returns the runtime tag.
    #[must_use]
    pub fn runtime(&self) -> &str {
        &self.variant.runtime
    }

    /// Returns the default entity.
    #[must_use]
    pub const fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    /// Returns the session of this toolset.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the catalogue.
    #[must_use]
    pub const fn catalogue(&self) -> &Arc<Catalogue> {
        &self.catalogue
    }

    /// Returns the verified explicit connected accounts.
    #[must_use]
    pub const fn connected_accounts(&self) -> &BTreeMap<AppId, ConnectedAccountId> {
        self.accounts.explicit()
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Executes one action.
    ///
    /// Returns `Ok(None)` when a post-processor returned a non-object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError`] when the action is unknown, no account can be
    /// resolved, parameters do not serialize to an object, a pre-processor
    /// breaks its contract, local dependencies cannot be installed, or the
    /// dispatch fails. Nothing is retried.
    pub fn execute_action<P: Serialize + ?Sized>(
        &self,
        action: &ActionId,
        params: &P,
        options: ExecuteOptions,
    ) -> Result<Option<Params>, ToolsetError> {
        let metadata = self.catalogue.action(action)?;
        let ExecuteOptions {
            entity_id,
            connected_account_id,
            text,
            session_id,
            processors,
        } = options;
        let processors = processors.map_or(Cow::Borrowed(&self.processors), |call| {
            Cow::Owned(self.processors.layered(&call))
        });
        let candidates = ProcessorScope::candidates(&metadata.action, &metadata.app);
        if metadata.origin.is_local() {
            let params = serialize_params(params)?;
            return self.execute_local(&metadata, params, &processors, &candidates);
        }

        let entity_id = entity_id.unwrap_or_else(|| self.entity_id.clone());
        let connected_account_id = match connected_account_id {
            Some(account) => Some(account),
            None => self.resolve_account(&metadata, &entity_id)?,
        };
        let params = processors.pre_process(&candidates, serialize_params(params)?)?;
        let request = ExecutionRequest {
            action: metadata.action.clone(),
            app: metadata.app.clone(),
            params,
            entity_id,
            connected_account_id,
            text,
            session_id: session_id.unwrap_or_else(|| self.session_id.clone()),
            runtime: self.variant.runtime.clone(),
        };
        let response = self.executor.execute(&request)?;
        self.record_execution(&metadata, "remote");
        Ok(processors.post_process(&candidates, response, self.events.as_ref()))
    }

    /// Dispatches a local or runtime action to its handler.
    fn execute_local(
        &self,
        metadata: &ActionMetadata,
        params: Params,
        processors: &ProcessorSpec,
        candidates: &[ProcessorScope],
    ) -> Result<Option<Params>, ToolsetError> {
        if self.auto_validate {
            let app = self.catalogue.app(&metadata.app)?;
            self.dependencies.validate(slice::from_ref(&app), slice::from_ref(metadata))?;
        }
        let handler = self.catalogue.registry().handler(&metadata.action).ok_or_else(|| {
            ToolsetError::LocalHandlerMissing {
                action: metadata.action.clone(),
            }
        })?;
        let params = processors.pre_process(candidates, params)?;
        let response = local_response(handler(&params));
        self.record_execution(metadata, metadata.origin.as_str());
        Ok(processors.post_process(candidates, response, self.events.as_ref()))
    }

    /// Resolves the account for a remote action without an explicit one.
    fn resolve_account(
        &self,
        metadata: &ActionMetadata,
        entity: &EntityId,
    ) -> Result<Option<ConnectedAccountId>, ToolsetError> {
        if metadata.no_auth {
            return Ok(None);
        }
        if let Some(account) = self.accounts.explicit_for(&metadata.app) {
            return Ok(Some(account.clone()));
        }
        if self.app_is_no_auth(&metadata.app)? {
            return Ok(None);
        }
        self.accounts.resolve(&metadata.app, entity).map(Some)
    }

    /// Records a dispatch event.
    fn record_execution(&self, metadata: &ActionMetadata, target: &str) {
        self.events.record(
            &ToolsetEvent::info(ACTION_EXECUTED, format!("executed {} ({target})", metadata.action))
                .with_action(&metadata.action)
                .with_app(&metadata.app),
        );
    }

    // ------------------------------------------------------------------------
    // Schemas and tools
    // ------------------------------------------------------------------------

    /// Returns presentation schemas for the selected actions.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::ActionNotFound`] for unknown explicit actions,
    /// [`ToolsetError::AppNotFound`] for unknown apps,
    /// dependency failures for local actions, [`ToolsetError::AccountNotFound`]
    /// when account checks are enabled and an app has no account, and remote
    /// failures.
    pub fn get_action_schemas(
        &self,
        request: &SchemaRequest,
    ) -> Result<Vec<ActionSchema>, ToolsetError> {
        let actions = self.collect_actions(request)?;
        if self.auto_validate {
            self.validate_local(&actions)?;
        }
        let check = request.check_connected_accounts.unwrap_or(self.check_connected_accounts);
        self.check_accounts(&actions, check)?;
        Ok(actions.iter().map(|action| self.schemas.resolve(action)).collect())
    }

    /// Returns executable tool handles for the selected actions.
    ///
    /// `processors` bind to the returned handles only.
    ///
    /// # Errors
    ///
    /// See [`Toolset::get_action_schemas`].
    pub fn get_tools(
        &self,
        request: &SchemaRequest,
        processors: Option<ProcessorSpec>,
    ) -> Result<Vec<Tool<'_>>, ToolsetError> {
        let processors = processors.unwrap_or_default();
        Ok(self
            .get_action_schemas(request)?
            .into_iter()
            .map(|schema| Tool {
                toolset: self,
                schema,
                processors: processors.clone(),
            })
            .collect())
    }

    /// Returns actions carrying at least one of `tags`, optionally limited to
    /// `apps`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::InvalidParams`] when no tag is given,
    /// [`ToolsetError::AppNotFound`] for an unknown app, and propagates
    /// remote failures.
    pub fn find_actions_by_tags(
        &self,
        apps: &[AppId],
        tags: &[String],
    ) -> Result<Vec<ActionId>, ToolsetError> {
        let tags: Vec<String> =
            tags.iter().map(|tag| tag.trim()).filter(|tag| !tag.is_empty()).map(str::to_string).collect();
        if tags.is_empty() {
            return Err(ToolsetError::InvalidParams("at least one tag is required".to_string()));
        }
        let found = self.catalogue.find_actions(&ActionFilter::new(apps.to_vec(), tags))?;
        Ok(found.into_iter().map(|action| action.action).collect())
    }

    /// Eagerly loads an app and its actions into the catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::AppNotFound`] for unknown apps and propagates
    /// remote failures.
    pub fn load_app(&self, app: &AppId) -> Result<Vec<ActionMetadata>, ToolsetError> {
        self.catalogue.load_app(app)
    }

    /// Ensures the local packages of `apps` and `actions` are installed.
    ///
    /// # Errors
    ///
    /// Returns not-found errors for unknown slugs and
    /// [`ToolsetError::DependencyInstall`] for the first failing package.
    pub fn validate_tools(&self, apps: &[AppId], actions: &[ActionId]) -> Result<(), ToolsetError> {
        let apps = apps.iter().map(|app| self.catalogue.app(app)).collect::<Result<Vec<_>, _>>()?;
        let actions =
            actions.iter().map(|action| self.catalogue.action(action)).collect::<Result<Vec<_>, _>>()?;
        self.dependencies.validate(&apps, &actions)
    }

    /// Verifies that actions of `app` can be executed for the default entity.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::AccountNotFound`] when no account exists.
    pub fn check_connected_account(&self, app: &AppId) -> Result<(), ToolsetError> {
        if self.accounts.explicit_for(app).is_some() || self.app_is_no_auth(app)? {
            return Ok(());
        }
        self.accounts.resolve(app, &self.entity_id).map(|_| ())
    }

    /// Resolves explicit actions followed by app and tag matches.
    fn collect_actions(&self, request: &SchemaRequest) -> Result<Vec<ActionMetadata>, ToolsetError> {
        let mut actions = request
            .actions
            .iter()
            .map(|action| self.catalogue.action(action))
            .collect::<Result<Vec<_>, _>>()?;
        if !request.apps.is_empty() || !request.tags.is_empty() {
            let explicit: BTreeSet<&ActionId> = request.actions.iter().collect();
            let filter = ActionFilter::new(request.apps.clone(), request.tags.clone());
            let found = self.catalogue.find_actions(&filter)?;
            actions.extend(found.into_iter().filter(|action| !explicit.contains(&action.action)));
        }
        Ok(actions)
    }

    /// Validates dependencies of the local actions among `actions`.
    fn validate_local(&self, actions: &[ActionMetadata]) -> Result<(), ToolsetError> {
        let local: Vec<ActionMetadata> =
            actions.iter().filter(|action| action.origin.is_local()).cloned().collect();
        if local.is_empty() {
            return Ok(());
        }
        let mut seen = BTreeSet::new();
        let mut apps: Vec<AppMetadata> = Vec::new();
        for action in &local {
            if seen.insert(action.app.clone()) {
                apps.push(self.catalogue.app(&action.app)?);
            }
        }
        self.dependencies.validate(&apps, &local)
    }

    /// Verifies connected accounts of remote apps, or warns that it did not.
    fn check_accounts(&self, actions: &[ActionMetadata], enabled: bool) -> Result<(), ToolsetError> {
        let apps: BTreeSet<&AppId> = actions
            .iter()
            .filter(|action| !action.no_auth && !action.origin.is_local())
            .map(|action| &action.app)
            .collect();
        if apps.is_empty() {
            return Ok(());
        }
        if !enabled {
            let mut listed = String::new();
            for (index, app) in apps.iter().enumerate() {
                if index > 0 {
                    listed.push_str(", ");
                }
                listed.push_str(app.as_str());
            }
            self.events.record(&ToolsetEvent::warning(
                ACCOUNT_CHECK_SKIPPED,
                format!("not verifying connected accounts for apps: {listed}"),
            ));
            return Ok(());
        }
        for app in apps {
            self.check_connected_account(app)?;
        }
        Ok(())
    }

    /// Returns true when the app needs no connected account.
    ///
    /// Unknown apps are treated as needing one.
    fn app_is_no_auth(&self, app: &AppId) -> Result<bool, ToolsetError> {
        match self.catalogue.app(app) {
            Ok(metadata) => Ok(metadata.no_auth),
            Err(ToolsetError::AppNotFound {
                ..
            }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts caller parameters to a JSON object; `null` becomes empty.
fn serialize_params<P: Serialize + ?Sized>(params: &P) -> Result<Params, ToolsetError> {
    match serde_json::to_value(params).map_err(|err| ToolsetError::InvalidParams(err.to_string()))? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Params::new()),
        other => Err(ToolsetError::InvalidParams(format!(
            "expected an object, got '{}'",
            json_type_name(&other)
        ))),
    }
}

/// Wraps a handler result in the remote response envelope.
fn local_response(result: Result<Value, String>) -> Params {
    let (data, error, successful) = match result {
        Ok(data) => (data, Value::Null, true),
        Err(message) => (Value::Object(Params::new()), Value::String(message), false),
    };
    let mut response = Params::new();
    response.insert("data".to_string(), data);
    response.insert("error".to_string(), error);
    response.insert("successful".to_string(), Value::Bool(successful));
    response
}

/// Generates a random 128-bit hex session identifier.
fn generate_session_id() -> SessionId {
    let mut high = [0u8; 8];
    let mut low = [0u8; 8];
    OsRng.fill_bytes(&mut high);
    OsRng.fill_bytes(&mut low);
    SessionId::new(format!("{:016x}{:016x}", u64::from_be_bytes(high), u64::from_be_bytes(low)))
}
