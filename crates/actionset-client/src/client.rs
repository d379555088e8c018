// crates/actionset-client/src/client.rs
// ============================================================================
// Module: HTTP Remote Service
// Description: Blocking reqwest client for the remote action service.
// Purpose: Implement execution, catalogue, and account lookups with hard limits.
// Dependencies: actionset-core, actionset-config, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! Every request carries the API key in the [`API_KEY_HEADER`] header. The key
//! is resolved per call from [`RemoteConfig`]; when it is missing the call
//! fails with [`RemoteError::CredentialMissing`] and nothing is sent. Response
//! bodies are read through a byte limit and redirects are never followed.
//! The client does not retry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use actionset_config::RemoteConfig;
use actionset_core::AccountDirectory;
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
use actionset_core::Params;
use actionset_core::RemoteError;
use actionset_core::RemoteExecutor;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use url::Url;

use crate::wire::ActionDto;
use crate::wire::AppDto;
use crate::wire::ConnectedAccountDto;
use crate::wire::ExecuteBody;
use crate::wire::ItemsEnvelope;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Maximum characters of an error body echoed into [`RemoteError::Status`].
const MAX_ERROR_SNIPPET_CHARS: usize = 256;

// ============================================================================
// SECTION: Service
// ============================================================================

/// Blocking HTTP client for the remote action service.
///
/// # Invariants
/// - `base_url` parses as an absolute http(s) URL.
/// - No request is sent without an API key.
pub struct HttpRemoteService {
    /// Remote configuration (base URL, key sources, limits).
    config: RemoteConfig,
    /// Parsed base URL.
    base_url: Url,
    /// HTTP client configured with timeout and user agent.
    client: Client,
}

impl HttpRemoteService {
    /// Builds a client from remote configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Transport`] when the base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|err| RemoteError::Transport(format!("invalid base url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::Transport("base url cannot carry paths".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| RemoteError::Transport("http client build failed".to_string()))?;
        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves the API key or reports which variable was expected.
    fn api_key(&self) -> Result<String, RemoteError> {
        self.config.resolve_api_key().ok_or_else(|| RemoteError::CredentialMissing {
            env_var: self.config.api_key_env.clone(),
        })
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::Transport("base url cannot carry paths".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends an authenticated request.
    fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let key = self.api_key()?;
        builder
            .header(API_KEY_HEADER, key)
            .send()
            .map_err(|err| RemoteError::Transport(err.without_url().to_string()))
    }

    /// Sends a GET request and decodes the body; `Ok(None)` on 404.
    fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, RemoteError> {
        let response = self.send(self.client.get(url))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.decode(response).map(Some)
    }

    /// Sends a GET request and decodes the body.
    fn get_required<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        let response = self.send(self.client.get(url))?;
        self.decode(response)
    }

    /// Reads a bounded body and decodes it, mapping failures to [`RemoteError`].
    fn decode<T: DeserializeOwned>(&self, mut response: Response) -> Result<T, RemoteError> {
        let status = response.status();
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: error_snippet(&body),
            });
        }
        serde_json::from_slice(&body).map_err(|err| RemoteError::Decode(err.to_string()))
    }
}

impl RemoteExecutor for HttpRemoteService {
    fn execute(&self, request: &ExecutionRequest) -> Result<Params, RemoteError> {
        let url = self.endpoint(&["v2", "actions", request.action.as_str(), "execute"])?;
        let body = serde_json::to_vec(&ExecuteBody::from(request))
            .map_err(|err| RemoteError::Decode(format!("request encoding failed: {err}")))?;
        let response = self.send(
            self.client.post(url).header(CONTENT_TYPE, "application/json").body(body),
        )?;
        self.decode(response)
    }
}

impl CatalogueSource for HttpRemoteService {
    fn fetch_action(&self, action: &ActionId) -> Result<Option<ActionMetadata>, RemoteError> {
        let url = self.endpoint(&["v2", "actions", action.as_str()])?;
        Ok(self.get_optional::<ActionDto>(url)?.map(ActionMetadata::from))
    }

    fn fetch_app(&self, app: &AppId) -> Result<Option<AppMetadata>, RemoteError> {
        let url = self.endpoint(&["v1", "apps", &app.command_name()])?;
        Ok(self.get_optional::<AppDto>(url)?.map(AppMetadata::from))
    }

    fn list_actions(&self, filter: &ActionFilter) -> Result<Vec<ActionMetadata>, RemoteError> {
        let mut url = self.endpoint(&["v2", "actions"])?;
        {
            let mut query = url.query_pairs_mut();
            if !filter.apps.is_empty() {
                let apps: Vec<String> = filter.apps.iter().map(AppId::command_name).collect();
                query.append_pair("apps", &apps.join(","));
            }
            if !filter.tags.is_empty() {
                query.append_pair("tags", &filter.tags.join(","));
            }
        }
        let envelope: ItemsEnvelope<ActionDto> = self.get_required(url)?;
        Ok(envelope.items.into_iter().map(ActionMetadata::from).collect())
    }
}

impl AccountDirectory for HttpRemoteService {
    fn connected_account(
        &self,
        account: &ConnectedAccountId,
    ) -> Result<Option<ConnectedAccount>, RemoteError> {
        let url = self.endpoint(&["v1", "connectedAccounts", account.as_str()])?;
        Ok(self.get_optional::<ConnectedAccountDto>(url)?.map(ConnectedAccount::from))
    }

    fn connected_accounts(
        &self,
        entity: &EntityId,
        app: Option<&AppId>,
    ) -> Result<Vec<ConnectedAccount>, RemoteError> {
        let mut url = self.endpoint(&["v1", "connectedAccounts"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("user_uuid", entity.as_str());
            if let Some(app) = app {
                query.append_pair("appNames", &app.command_name());
            }
            query.append_pair("showActiveOnly", "true");
        }
        let envelope: ItemsEnvelope<ConnectedAccountDto> = self.get_required(url)?;
        Ok(envelope.items.into_iter().map(ConnectedAccount::from).collect())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, RemoteError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| RemoteError::Transport("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(RemoteError::Transport("response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle
        .read_to_end(&mut buf)
        .map_err(|_| RemoteError::Transport("failed to read response".to_string()))?;
    if buf.len() > max_bytes {
        return Err(RemoteError::Transport("response exceeds size limit".to_string()));
    }
    Ok(buf)
}

/// Summarizes an error body for status errors.
fn error_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty response".to_string();
    }
    trimmed.chars().take(MAX_ERROR_SNIPPET_CHARS).collect()
}
