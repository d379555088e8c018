// crates/actionset-toolset/src/lib.rs
// ============================================================================
// Module: Actionset Toolset Library
// Description: Action resolution, validation, and execution pipeline.
// Purpose: Expose the catalogue of remote and local actions to calling agents.
// Dependencies: actionset-core, actionset-config, actionset-client, rand, serde_json
// ============================================================================

//! ## Overview
//! The toolset coordinates the failure-prone collaborators behind one
//! synchronous contract: the catalogue, the local package installer, the
//! connected account directory, and the remote executor. [`Toolset`] is the
//! only entry point callers need; the component modules are public so hosts
//! can reuse them individually.
//!
//! A call to [`Toolset::execute_action`] resolves the account, serializes the
//! parameters, runs pre-processors, dispatches (remotely or to a local
//! handler), and runs post-processors. No step is retried.

pub mod accounts;
pub mod catalogue;
pub mod dependencies;
pub mod error;
pub mod events;
pub mod processors;
pub mod registry;
pub mod runtime;
pub mod schema;
pub mod toolset;

pub use accounts::AccountResolver;
pub use catalogue::Catalogue;
pub use dependencies::CommandInstaller;
pub use dependencies::DependencyValidator;
pub use dependencies::InstalledPackages;
pub use error::ToolsetError;
pub use events::EventLevel;
pub use events::FileEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::StderrEventSink;
pub use events::ToolsetEvent;
pub use events::ToolsetEventSink;
pub use processors::Processor;
pub use processors::ProcessorPhase;
pub use processors::ProcessorScope;
pub use processors::ProcessorSpec;
pub use registry::ActionRegistry;
pub use runtime::ActionHandler;
pub use runtime::FieldType;
pub use runtime::ParameterSpec;
pub use runtime::ReturnSpec;
pub use runtime::RuntimeActionBuilder;
pub use runtime::RuntimeActionDefinition;
pub use schema::CharLimits;
pub use schema::SchemaResolver;
pub use toolset::ExecuteOptions;
pub use toolset::SchemaRequest;
pub use toolset::Tool;
pub use toolset::Toolset;
pub use toolset::ToolsetBackends;
pub use toolset::ToolsetBuilder;
pub use toolset::ToolsetVariant;
