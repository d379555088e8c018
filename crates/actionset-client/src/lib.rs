// crates/actionset-client/src/lib.rs
// ============================================================================
// Module: Actionset Client Library
// Description: Blocking HTTP implementation of the remote service boundary.
// Purpose: Execute actions and fetch catalogue and account data over HTTPS.
// Dependencies: actionset-core, actionset-config, reqwest, url
// ============================================================================

//! ## Overview
//! [`HttpRemoteService`] implements [`actionset_core::RemoteExecutor`],
//! [`actionset_core::CatalogueSource`], and [`actionset_core::AccountDirectory`]
//! against the remote service API. The API key is resolved on every call, so a
//! missing key surfaces as [`actionset_core::RemoteError::CredentialMissing`]
//! before any request leaves the process.

pub mod client;
mod wire;

pub use client::API_KEY_HEADER;
pub use client::HttpRemoteService;
