// crates/actionset-core/src/core/mod.rs
// ============================================================================
// Module: Actionset Core Types
// Description: Canonical identifiers and catalogue structures.
// Purpose: Provide stable, serializable types shared by every Actionset crate.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types describe what the catalogue knows about apps and actions, what
//! an agent is shown (the derived [`ActionSchema`]), and the transient value
//! objects of a single invocation ([`ExecutionRequest`]).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod accounts;
pub mod catalogue;
pub mod execution;
pub mod identifiers;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use accounts::AccountStatus;
pub use accounts::ConnectedAccount;
pub use catalogue::ActionMetadata;
pub use catalogue::ActionOrigin;
pub use catalogue::AppMetadata;
pub use execution::ExecutionRequest;
pub use execution::Params;
pub use identifiers::ActionId;
pub use identifiers::AppId;
pub use identifiers::ConnectedAccountId;
pub use identifiers::EntityId;
pub use identifiers::SessionId;
pub use schema::ActionSchema;
pub use schema::ObjectSchema;
pub use schema::json_type_name;
