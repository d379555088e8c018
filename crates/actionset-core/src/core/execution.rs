// crates/actionset-core/src/core/execution.rs
// ============================================================================
// Module: Execution Requests
// Description: Transient value objects for a single action invocation.
// Purpose: Carry the fully resolved inputs handed to the remote executor.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An [`ExecutionRequest`] is built by the toolset after account resolution,
//! parameter serialization, and pre-processing. It is plain data: parameters
//! are a JSON object, never caller-side model types.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::ActionId;
use crate::core::identifiers::AppId;
use crate::core::identifiers::ConnectedAccountId;
use crate::core::identifiers::EntityId;
use crate::core::identifiers::SessionId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Plain parameter and response payload shape.
pub type Params = Map<String, Value>;

/// Fully resolved invocation handed to the remote executor.
///
/// # Invariants
/// - `params` are already serialized and pre-processed.
/// - `connected_account_id` is `None` only for actions that need no account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionRequest {
    /// Action to execute.
    pub action: ActionId,
    /// App owning the action.
    pub app: AppId,
    /// Request payload.
    pub params: Params,
    /// Entity on whose behalf the action runs.
    pub entity_id: EntityId,
    /// Connected account used for the call.
    pub connected_account_id: Option<ConnectedAccountId>,
    /// Optional natural-language hint forwarded to the remote service.
    pub text: Option<String>,
    /// Session correlating calls of one toolset.
    pub session_id: SessionId,
    /// Runtime tag of the toolset variant issuing the call.
    pub runtime: String,
}
