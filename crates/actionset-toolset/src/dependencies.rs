// crates/actionset-toolset/src/dependencies.rs
// ============================================================================
// Module: Dependency Validator
// Description: Local package verification and on-demand installation.
// Purpose: Ensure packages required by local actions are importable.
// Dependencies: actionset-core, actionset-config
// ============================================================================

//! ## Overview
//! [`DependencyValidator::validate`] collects the deduplicated `requires`
//! lists of the given apps and actions and installs what is missing. Verified
//! packages are remembered in [`InstalledPackages`], which is process-wide by
//! default so that separate toolsets do not reinstall the same package.
//! Validation stops at the first package that fails to install.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::process::Command;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::sync::PoisonError;

use actionset_config::DependencyConfig;
use actionset_core::ActionMetadata;
use actionset_core::AppMetadata;
use actionset_core::InstallerError;
use actionset_core::PackageInstaller;

use crate::error::ToolsetError;
use crate::events::PACKAGE_INSTALLED;
use crate::events::ToolsetEvent;
use crate::events::ToolsetEventSink;

// ============================================================================
// SECTION: Verified Packages
// ============================================================================

/// Set of packages verified importable in this process.
#[derive(Debug, Default)]
pub struct InstalledPackages {
    /// Verified package names.
    verified: Mutex<BTreeSet<String>>,
}

/// Process-wide verified package set.
static GLOBAL_PACKAGES: OnceLock<Arc<InstalledPackages>> = OnceLock::new();

impl InstalledPackages {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide set.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL_PACKAGES.get_or_init(|| Arc::new(Self::new())))
    }

    /// Returns true when `package` was verified.
    #[must_use]
    pub fn contains(&self, package: &str) -> bool {
        self.lock().contains(package)
    }

    /// Records `package` as verified.
    pub fn insert(&self, package: &str) {
        self.lock().insert(package.to_string());
    }

    /// Returns the number of verified packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when nothing was verified yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forgets every verified package.
    pub fn reset(&self) {
        self.lock().clear();
    }

    /// Acquires the set, recovering from poisoning.
    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.verified.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Verifies and installs local package requirements.
pub struct DependencyValidator {
    /// Package manager boundary.
    installer: Arc<dyn PackageInstaller + Send + Sync>,
    /// Verified package cache.
    verified: Arc<InstalledPackages>,
    /// Substring the installer prints on success.
    success_marker: String,
    /// Event sink for install notices.
    events: Arc<dyn ToolsetEventSink>,
}

impl DependencyValidator {
    /// Creates a validator.
    #[must_use]
    pub fn new(
        installer: Arc<dyn PackageInstaller + Send + Sync>,
        verified: Arc<InstalledPackages>,
        success_marker: impl Into<String>,
        events: Arc<dyn ToolsetEventSink>,
    ) -> Self {
        Self {
            installer,
            verified,
            success_marker: success_marker.into(),
            events,
        }
    }

    /// Returns the verified package cache.
    #[must_use]
    pub const fn verified(&self) -> &Arc<InstalledPackages> {
        &self.verified
    }

    /// Ensures every package required by `apps` and `actions` is importable.
    ///
    /// App requirements are checked before action requirements, each in
    /// declaration order, without duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::DependencyInstall`] for the first package that
    /// cannot be installed; later packages are not attempted.
    pub fn validate(
        &self,
        apps: &[AppMetadata],
        actions: &[ActionMetadata],
    ) -> Result<(), ToolsetError> {
        let packages = required_packages(apps, actions);
        for package in packages {
            if self.verified.contains(&package) {
                continue;
            }
            if self.installer.is_installed(&package) {
                self.verified.insert(&package);
                continue;
            }
            self.install(&package)?;
        }
        Ok(())
    }

    /// Installs one package and checks the success marker.
    fn install(&self, package: &str) -> Result<(), ToolsetError> {
        let output =
            self.installer.install(package).map_err(|err| ToolsetError::DependencyInstall {
                package: package.to_string(),
                detail: err.to_string(),
            })?;
        if !output.contains(&self.success_marker) {
            return Err(ToolsetError::DependencyInstall {
                package: package.to_string(),
                detail: format!("installer output did not contain `{}`", self.success_marker),
            });
        }
        self.verified.insert(package);
        self.events.record(
            &ToolsetEvent::info(PACKAGE_INSTALLED, format!("installed {package}"))
                .with_package(package),
        );
        Ok(())
    }
}

/// Returns the ordered, deduplicated union of required packages.
fn required_packages(apps: &[AppMetadata], actions: &[ActionMetadata]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    apps.iter()
        .flat_map(|app| app.requires.iter())
        .chain(actions.iter().flat_map(|action| action.requires.iter()))
        .map(|package| package.trim())
        .filter(|package| !package.is_empty() && seen.insert(package.to_string()))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// SECTION: Command Installer
// ============================================================================

/// Package installer backed by a package manager subprocess.
///
/// # Invariants
/// - `program` is run without a shell; arguments are passed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInstaller {
    /// Package manager program.
    program: String,
    /// Arguments preceding the package for installation.
    install_args: Vec<String>,
    /// Arguments preceding the package for presence checks.
    check_args: Vec<String>,
}

impl CommandInstaller {
    /// Creates an installer for `program`.
    #[must_use]
    pub fn new(program: impl Into<String>, install_args: Vec<String>, check_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            install_args,
            check_args,
        }
    }

    /// Creates an installer from dependency configuration.
    #[must_use]
    pub fn from_config(config: &DependencyConfig) -> Self {
        Self::new(config.program.clone(), config.install_args.clone(), config.check_args.clone())
    }
}

impl PackageInstaller for CommandInstaller {
    fn is_installed(&self, package: &str) -> bool {
        Command::new(&self.program)
            .args(&self.check_args)
            .arg(package)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    fn install(&self, package: &str) -> Result<String, InstallerError> {
        let output = Command::new(&self.program)
            .args(&self.install_args)
            .arg(package)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| InstallerError::Spawn {
                program: self.program.clone(),
                error: err.to_string(),
            })?;
        if !output.status.success() {
            return Err(InstallerError::Exited {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}
