// crates/actionset-config/src/lib.rs
// ============================================================================
// Module: Actionset Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for actionset.toml semantics.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! `actionset-config` defines the configuration model for the toolset: the
//! remote service endpoint and credential source, the toolset variant, the
//! local package installer, event logging, and explicit connected accounts.
//! Loading is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
