// crates/actionset-toolset/tests/common/mod.rs
// ============================================================================
// Module: Toolset Test Helpers
// Description: In-memory remote service, installer, and toolset harness.
// Purpose: Drive the toolset without network access or package managers.
// ============================================================================

#![allow(dead_code, reason = "Shared helpers are not used by every test binary.")]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use actionset_core::AccountDirectory;
use actionset_core::AccountStatus;
use actionset_core::ActionFilter;
use actionset_core::ActionId;
use actionset_core::ActionMetadata;
use actionset_core::AppId;
use actionset_core::AppMetadata;
use actionset_core::CatalogueSource;
use actionset_core::ConnectedAccount;
use actionset_core::ConnectedAccountId;
use actionset_core::EntityId;
use actionset_core::ExecutionRequest;
use actionset_core::InstallerError;
use actionset_core::ObjectSchema;
use actionset_core::PackageInstaller;
use actionset_core::Params;
use actionset_core::RemoteError;
use actionset_core::RemoteExecutor;
use actionset_core::SessionId;
use actionset_toolset::ActionRegistry;
use actionset_toolset::InstalledPackages;
use actionset_toolset::MemoryEventSink;
use actionset_toolset::Toolset;
use actionset_toolset::ToolsetBackends;
use actionset_toolset::ToolsetBuilder;
use serde_json::json;

// ============================================================================
// SECTION: Remote Fake
// ============================================================================

/// In-memory stand-in for the remote service.
#[derive(Default)]
pub struct FakeRemote {
    pub actions: Vec<ActionMetadata>,
    pub apps: Vec<AppMetadata>,
    pub accounts: Vec<ConnectedAccount>,
    pub response: Params,
    pub execute_error: Option<RemoteError>,
    executions: Mutex<Vec<ExecutionRequest>>,
    action_fetches: AtomicUsize,
    list_calls: AtomicUsize,
}

impl FakeRemote {
    /// GitHub (auth), SerpApi (no auth), and Slack (no account) catalogue.
    pub fn github() -> Self {
        let params = ObjectSchema::new()
            .with_property("owner", json!({"type": "string", "description": "Repository owner"}), true)
            .with_property("repo", json!({"type": "string", "title": "Repo"}), true);
        let mut response = Params::new();
        response.insert("successfull".to_string(), json!(true));
        response.insert("data".to_string(), json!({"starred": true}));
        Self {
            actions: vec![
                ActionMetadata::new("GITHUB_STAR_A_REPO", "GITHUB")
                    .with_display_name("Star a repository")
                    .with_description("Stars a repository for the authenticated user")
                    .with_tags(["important"])
                    .with_parameters(params),
                ActionMetadata::new("GITHUB_LIST_ISSUES", "GITHUB")
                    .with_display_name("List issues")
                    .with_tags(["read"]),
                ActionMetadata::new("SERPAPI_SEARCH", "SERPAPI").with_tags(["important"]),
                ActionMetadata::new("HACKERNEWS_TOP", "HACKERNEWS").with_no_auth(true),
                ActionMetadata::new("SLACK_SEND_MESSAGE", "SLACK").with_tags(["write"]),
            ],
            apps: vec![
                AppMetadata::new("GITHUB"),
                AppMetadata::new("SERPAPI").with_no_auth(true),
                AppMetadata::new("HACKERNEWS"),
                AppMetadata::new("SLACK"),
            ],
            accounts: vec![
                ConnectedAccount::new("acc_github", "GITHUB").with_entity("default"),
                ConnectedAccount::new("acc_github_old", "GITHUB")
                    .with_entity("default")
                    .with_status(AccountStatus::from_label("INITIATED")),
                ConnectedAccount::new("acc_other", "GITHUB").with_entity("someone-else"),
            ],
            response,
            ..Self::default()
        }
    }

    /// Returns every execution request received.
    pub fn executions(&self) -> Vec<ExecutionRequest> {
        self.executions.lock().unwrap().clone()
    }

    /// Returns how many single-action fetches were made.
    pub fn action_fetches(&self) -> usize {
        self.action_fetches.load(Ordering::SeqCst)
    }

    /// Returns how many list requests were made.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl RemoteExecutor for FakeRemote {
    fn execute(&self, request: &ExecutionRequest) -> Result<Params, RemoteError> {
        self.executions.lock().unwrap().push(request.clone());
        match &self.execute_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.response.clone()),
        }
    }
}

impl CatalogueSource for FakeRemote {
    fn fetch_action(&self, action: &ActionId) -> Result<Option<ActionMetadata>, RemoteError> {
        self.action_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.actions.iter().find(|candidate| &candidate.action == action).cloned())
    }

    fn fetch_app(&self, app: &AppId) -> Result<Option<AppMetadata>, RemoteError> {
        Ok(self.apps.iter().find(|candidate| candidate.app.matches(app.as_str())).cloned())
    }

    fn list_actions(&self, filter: &ActionFilter) -> Result<Vec<ActionMetadata>, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.actions.iter().filter(|action| filter.matches(action)).cloned().collect())
    }
}

impl AccountDirectory for FakeRemote {
    fn connected_account(
        &self,
        account: &ConnectedAccountId,
    ) -> Result<Option<ConnectedAccount>, RemoteError> {
        Ok(self.accounts.iter().find(|candidate| &candidate.id == account).cloned())
    }

    fn connected_accounts(
        &self,
        entity: &EntityId,
        app: Option<&AppId>,
    ) -> Result<Vec<ConnectedAccount>, RemoteError> {
        Ok(self
            .accounts
            .iter()
            .filter(|account| account.entity_id.as_ref().is_none_or(|owner| owner == entity))
            .filter(|account| app.is_none_or(|app| account.belongs_to(app)))
            .cloned()
            .collect())
    }
}

// ============================================================================
// SECTION: Installer Fake
// ============================================================================

/// Installer recording install attempts.
pub struct FakeInstaller {
    present: Mutex<BTreeSet<String>>,
    failing: BTreeSet<String>,
    output: String,
    installs: Mutex<Vec<String>>,
}

impl Default for FakeInstaller {
    fn default() -> Self {
        Self {
            present: Mutex::new(BTreeSet::new()),
            failing: BTreeSet::new(),
            output: "Successfully installed".to_string(),
            installs: Mutex::new(Vec::new()),
        }
    }
}

impl FakeInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `package` as already importable.
    pub fn with_present(self, package: &str) -> Self {
        self.present.lock().unwrap().insert(package.to_string());
        self
    }

    /// Makes installing `package` fail.
    pub fn with_failure(mut self, package: &str) -> Self {
        self.failing.insert(package.to_string());
        self
    }

    /// Replaces the installer output.
    pub fn with_output(mut self, output: &str) -> Self {
        self.output = output.to_string();
        self
    }

    /// Returns every install attempt in order.
    pub fn installs(&self) -> Vec<String> {
        self.installs.lock().unwrap().clone()
    }
}

impl PackageInstaller for FakeInstaller {
    fn is_installed(&self, package: &str) -> bool {
        self.present.lock().unwrap().contains(package)
    }

    fn install(&self, package: &str) -> Result<String, InstallerError> {
        self.installs.lock().unwrap().push(package.to_string());
        if self.failing.contains(package) {
            return Err(InstallerError::Exited {
                status: "exit status: 1".to_string(),
                stderr: "no matching distribution".to_string(),
            });
        }
        self.present.lock().unwrap().insert(package.to_string());
        Ok(format!("{} {package}", self.output))
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Isolated collaborators for one test.
pub struct Harness {
    pub remote: Arc<FakeRemote>,
    pub installer: Arc<FakeInstaller>,
    pub registry: Arc<ActionRegistry>,
    pub installed: Arc<InstalledPackages>,
    pub events: Arc<MemoryEventSink>,
}

impl Harness {
    pub fn new(remote: FakeRemote) -> Self {
        Self::with_installer(remote, FakeInstaller::new())
    }

    pub fn with_installer(remote: FakeRemote, installer: FakeInstaller) -> Self {
        Self {
            remote: Arc::new(remote),
            installer: Arc::new(installer),
            registry: Arc::new(ActionRegistry::new()),
            installed: Arc::new(InstalledPackages::new()),
            events: Arc::new(MemoryEventSink::new()),
        }
    }

    pub fn github() -> Self {
        Self::new(FakeRemote::github())
    }

    /// Builder wired to the isolated collaborators with a fixed session.
    pub fn builder(&self) -> ToolsetBuilder {
        Toolset::builder(ToolsetBackends::remote(Arc::clone(&self.remote), self.installer.clone()))
            .registry(Arc::clone(&self.registry))
            .installed_packages(Arc::clone(&self.installed))
            .event_sink(self.events.clone())
            .session_id(SessionId::new("session-test"))
    }

    pub fn toolset(&self) -> Toolset {
        self.builder().build().expect("toolset builds")
    }
}
