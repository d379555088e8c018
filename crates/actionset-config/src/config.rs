// crates/actionset-config/src/config.rs
// ============================================================================
// Module: Actionset Configuration
// Description: Configuration loading and validation for the toolset.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section has defaults, so an empty file is a valid configuration.
//! The API key is never required here: it is resolved at the point a remote
//! call is made, so a toolset can be built and inspected offline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "actionset.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "ACTIONSET_CONFIG";
/// Environment variable holding the API key unless configured otherwise.
pub const DEFAULT_API_KEY_ENV: &str = "ACTIONSET_API_KEY";
/// Default remote service base URL.
pub const DEFAULT_BASE_URL: &str = "https://backend.actionset.dev/api";
/// Runtime tag of the stock toolset variant.
pub const DEFAULT_RUNTIME: &str = "actionset";
/// Marker the default installer prints on success.
pub const DEFAULT_SUCCESS_MARKER: &str = "Successfully installed";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum remote request timeout in milliseconds.
pub(crate) const MIN_REMOTE_TIMEOUT_MS: u64 = 100;
/// Maximum remote request timeout in milliseconds.
pub(crate) const MAX_REMOTE_TIMEOUT_MS: u64 = 300_000;
/// Maximum accepted remote response size in bytes.
pub(crate) const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Maximum number of explicit connected accounts.
pub(crate) const MAX_CONNECTED_ACCOUNTS: usize = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Actionset configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ActionsetConfig {
    /// Remote service configuration.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Toolset variant and behaviour configuration.
    #[serde(default)]
    pub toolset: ToolsetConfig,
    /// Local dependency installation configuration.
    #[serde(default)]
    pub dependencies: DependencyConfig,
    /// Event logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Explicit connected accounts keyed by app slug.
    #[serde(default)]
    pub connected_accounts: BTreeMap<String, String>,
}

impl ActionsetConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.remote.validate()?;
        self.toolset.validate()?;
        self.dependencies.validate()?;
        self.logging.validate()?;
        if self.connected_accounts.len() > MAX_CONNECTED_ACCOUNTS {
            return Err(ConfigError::Invalid("too many connected_accounts entries".to_string()));
        }
        for (app, account) in &self.connected_accounts {
            if app.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "connected_accounts keys must be non-empty".to_string(),
                ));
            }
            if account.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "connected_accounts.{app} must be non-empty"
                )));
            }
        }
        Ok(())
    }
}

/// Remote service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// Base URL of the remote service API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Inline API key (prefer `api_key_env`).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// User agent for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_ms: default_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl RemoteConfig {
    /// Resolves the API key from the inline value or the environment.
    ///
    /// Blank values count as missing.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key
            && !key.trim().is_empty()
        {
            return Some(key.clone());
        }
        env::var(&self.api_key_env).ok().filter(|key| !key.trim().is_empty())
    }

    /// Validates remote configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|_| ConfigError::Invalid("remote.base_url must be a valid url".to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(
                "remote.base_url must use http:// or https://".to_string(),
            ));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(ConfigError::Invalid(
                "remote.base_url must not embed credentials".to_string(),
            ));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.api_key_env must be non-empty".to_string()));
        }
        if !(MIN_REMOTE_TIMEOUT_MS ..= MAX_REMOTE_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "remote.timeout_ms must be between {MIN_REMOTE_TIMEOUT_MS} and \
                 {MAX_REMOTE_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "remote.max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES}"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.user_agent must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Toolset variant configuration.
///
/// # Invariants
/// - Character limits, when set, are greater than zero.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsetConfig {
    /// Runtime tag identifying the toolset variant.
    #[serde(default = "default_runtime")]
    pub runtime: String,
    /// Entity used when a call does not name one.
    #[serde(default = "default_entity_id")]
    pub entity_id: String,
    /// Hard cut applied to action descriptions.
    #[serde(default)]
    pub description_char_limit: Option<usize>,
    /// Hard cut applied to action names.
    #[serde(default)]
    pub action_name_char_limit: Option<usize>,
    /// Verify connected accounts when enumerating schemas and tools.
    #[serde(default = "default_true")]
    pub check_connected_accounts: bool,
}

impl Default for ToolsetConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            entity_id: default_entity_id(),
            description_char_limit: None,
            action_name_char_limit: None,
            check_connected_accounts: true,
        }
    }
}

impl ToolsetConfig {
    /// Validates toolset configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.trim().is_empty() {
            return Err(ConfigError::Invalid("toolset.runtime must be non-empty".to_string()));
        }
        if self.entity_id.trim().is_empty() {
            return Err(ConfigError::Invalid("toolset.entity_id must be non-empty".to_string()));
        }
        if self.description_char_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "toolset.description_char_limit must be greater than zero".to_string(),
            ));
        }
        if self.action_name_char_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "toolset.action_name_char_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Local package installer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyConfig {
    /// Validate local dependencies before schema retrieval and local execution.
    #[serde(default = "default_true")]
    pub auto_validate: bool,
    /// Package manager program.
    #[serde(default = "default_installer_program")]
    pub program: String,
    /// Arguments preceding the package name for installation.
    #[serde(default = "default_install_args")]
    pub install_args: Vec<String>,
    /// Arguments preceding the package name for presence checks.
    #[serde(default = "default_check_args")]
    pub check_args: Vec<String>,
    /// Substring whose presence in installer output signals success.
    #[serde(default = "default_success_marker")]
    pub success_marker: String,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            auto_validate: true,
            program: default_installer_program(),
            install_args: default_install_args(),
            check_args: default_check_args(),
            success_marker: default_success_marker(),
        }
    }
}

impl DependencyConfig {
    /// Validates installer configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::Invalid("dependencies.program must be non-empty".to_string()));
        }
        if self.success_marker.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "dependencies.success_marker must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Event sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkKind {
    /// JSON lines on standard error.
    #[default]
    Stderr,
    /// JSON lines appended to `logging.path`.
    File,
    /// Discard events.
    None,
}

/// Minimum level of recorded events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Informational events and above.
    #[default]
    Info,
    /// Warnings only.
    Warning,
}

/// Event logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Sink receiving events.
    #[serde(default)]
    pub sink: LogSinkKind,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
    /// Minimum recorded level.
    #[serde(default)]
    pub level: LogLevel,
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (LogSinkKind::File, None) => {
                Err(ConfigError::Invalid("logging.sink=file requires logging.path".to_string()))
            }
            (_, Some(path)) => validate_path_string("logging.path", path),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} component too long")));
        }
    }
    Ok(())
}

/// Default remote base URL.
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Default API key environment variable.
fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

/// Default remote timeout in milliseconds.
const fn default_timeout_ms() -> u64 {
    30_000
}

/// Default maximum response size in bytes.
const fn default_max_response_bytes() -> usize {
    8 * 1024 * 1024
}

/// Default user agent.
fn default_user_agent() -> String {
    "actionset/0.1".to_string()
}

/// Default runtime tag.
fn default_runtime() -> String {
    DEFAULT_RUNTIME.to_string()
}

/// Default entity identifier.
fn default_entity_id() -> String {
    "default".to_string()
}

/// Serde helper for `true` defaults.
const fn default_true() -> bool {
    true
}

/// Default installer program.
fn default_installer_program() -> String {
    "python3".to_string()
}

/// Default installer arguments.
fn default_install_args() -> Vec<String> {
    vec!["-m".to_string(), "pip".to_string(), "install".to_string()]
}

/// Default presence-check arguments.
fn default_check_args() -> Vec<String> {
    vec!["-m".to_string(), "pip".to_string(), "show".to_string()]
}

/// Default installer success marker.
fn default_success_marker() -> String {
    DEFAULT_SUCCESS_MARKER.to_string()
}
