// crates/actionset-client/src/wire.rs
// ============================================================================
// Module: Remote Wire Types
// Description: JSON request and response bodies of the remote service API.
// Purpose: Keep camelCase wire shapes out of the core data model.
// Dependencies: actionset-core, serde
// ============================================================================

//! ## Overview
//! Wire types mirror the remote payloads and convert into core records. App
//! names are upper-cased on the way in because the service reports lowercase
//! names (`github`) for catalogue slugs (`GITHUB`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use actionset_core::AccountStatus;
use actionset_core::ActionMetadata;
use actionset_core::AppMetadata;
use actionset_core::ConnectedAccount;
use actionset_core::ExecutionRequest;
use actionset_core::ObjectSchema;
use actionset_core::Params;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Body of an execute call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExecuteBody<'a> {
    /// Entity on whose behalf the action runs.
    entity_id: &'a str,
    /// Lowercase app name.
    app_name: String,
    /// Connected account, when one was resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    connected_account_id: Option<&'a str>,
    /// Action input.
    input: &'a Params,
    /// Optional natural-language hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    /// Session correlation.
    session_info: SessionInfo<'a>,
    /// Runtime tag of the calling toolset variant.
    runtime: &'a str,
}

/// Session correlation block.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionInfo<'a> {
    /// Session identifier.
    session_id: &'a str,
}

impl<'a> From<&'a ExecutionRequest> for ExecuteBody<'a> {
    fn from(request: &'a ExecutionRequest) -> Self {
        Self {
            entity_id: request.entity_id.as_str(),
            app_name: request.app.command_name(),
            connected_account_id: request.connected_account_id.as_ref().map(|id| id.as_str()),
            input: &request.params,
            text: request.text.as_deref(),
            session_info: SessionInfo {
                session_id: request.session_id.as_str(),
            },
            runtime: &request.runtime,
        }
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Paged listing envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ItemsEnvelope<T> {
    /// Listed items.
    #[serde(default = "Vec::new")]
    pub(crate) items: Vec<T>,
}

/// Remote action record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActionDto {
    /// Action slug.
    name: String,
    /// Owning app name.
    app_name: String,
    /// Human-readable name.
    #[serde(default)]
    display_name: Option<String>,
    /// Description.
    #[serde(default)]
    description: Option<String>,
    /// Tags.
    #[serde(default)]
    tags: Vec<String>,
    /// Parameter tree.
    #[serde(default)]
    parameters: ObjectSchema,
    /// Response tree.
    #[serde(default)]
    response: ObjectSchema,
    /// True when no connected account is needed.
    #[serde(default)]
    no_auth: bool,
}

impl From<ActionDto> for ActionMetadata {
    fn from(dto: ActionDto) -> Self {
        let mut action = Self::new(dto.name, dto.app_name.to_ascii_uppercase())
            .with_tags(dto.tags)
            .with_parameters(dto.parameters)
            .with_response(dto.response)
            .with_no_auth(dto.no_auth);
        if let Some(display_name) = dto.display_name {
            action = action.with_display_name(display_name);
        }
        if let Some(description) = dto.description {
            action = action.with_description(description);
        }
        action
    }
}

/// Remote app record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppDto {
    /// App slug.
    key: String,
    /// Human-readable name.
    #[serde(default)]
    name: Option<String>,
    /// Description.
    #[serde(default)]
    description: Option<String>,
    /// Categories, used as tags.
    #[serde(default)]
    categories: Vec<String>,
    /// True when no connected account is needed.
    #[serde(default)]
    no_auth: bool,
}

impl From<AppDto> for AppMetadata {
    fn from(dto: AppDto) -> Self {
        let mut app = Self::new(dto.key.to_ascii_uppercase()).with_no_auth(dto.no_auth);
        if let Some(name) = dto.name {
            app.display_name = name;
        }
        if let Some(description) = dto.description {
            app = app.with_description(description);
        }
        app.tags = dto.categories;
        app
    }
}

/// Remote connected account record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConnectedAccountDto {
    /// Account identifier.
    id: String,
    /// App the account was authorized for.
    app_name: String,
    /// Owning entity.
    #[serde(default)]
    client_unique_user_id: Option<String>,
    /// Status label.
    #[serde(default)]
    status: Option<String>,
}

impl From<ConnectedAccountDto> for ConnectedAccount {
    fn from(dto: ConnectedAccountDto) -> Self {
        let status = dto.status.as_deref().map_or(AccountStatus::Active, AccountStatus::from_label);
        let account =
            Self::new(dto.id, dto.app_name.to_ascii_uppercase()).with_status(status);
        match dto.client_unique_user_id {
            Some(entity) => account.with_entity(entity),
            None => account,
        }
    }
}
