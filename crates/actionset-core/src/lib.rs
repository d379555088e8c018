// crates/actionset-core/src/lib.rs
// ============================================================================
// Module: Actionset Core Library
// Description: Public API surface for the Actionset core model.
// Purpose: Expose identifiers, catalogue types, and backend interfaces.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Actionset core defines the shared vocabulary of the toolset: stable action
//! and app identifiers, catalogue metadata, derived action schemas, and the
//! backend-agnostic interfaces through which the toolset reaches the remote
//! service, the connected-account directory, and the local package installer.
//! It performs no I/O itself.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AccountDirectory;
pub use interfaces::ActionFilter;
pub use interfaces::CatalogueSource;
pub use interfaces::InstallerError;
pub use interfaces::PackageInstaller;
pub use interfaces::RemoteError;
pub use interfaces::RemoteExecutor;
