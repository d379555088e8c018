// crates/actionset-toolset/src/processors.rs
// ============================================================================
// Module: Processor Pipeline
// Description: Scoped pre- and post-transforms around action dispatch.
// Purpose: Apply user transforms with action-over-app precedence.
// Dependencies: actionset-core, serde_json
// ============================================================================

//! ## Overview
//! A [`ProcessorSpec`] maps each [`ProcessorPhase`] to transforms keyed by a
//! [`ProcessorScope`]: an action or an app. Lookup takes an ordered candidate
//! list, most specific first, and the first scope present wins. No match is a
//! passthrough.
//!
//! Output contracts differ by phase:
//! - Pre-processors must return an object; anything else fails the call with
//!   [`ToolsetError::PreProcessorContract`] before dispatch.
//! - Post-processors that return a non-object degrade the result to `None`
//!   and emit one `processor_contract_violation` warning.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use actionset_core::ActionId;
use actionset_core::AppId;
use actionset_core::Params;
use actionset_core::json_type_name;
use serde_json::Value;

use crate::error::ToolsetError;
use crate::events::PROCESSOR_CONTRACT_VIOLATION;
use crate::events::ToolsetEvent;
use crate::events::ToolsetEventSink;

// ============================================================================
// SECTION: Types
// ============================================================================

/// User-supplied payload transform.
pub type Processor = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Processing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorPhase {
    /// Applied to request parameters before dispatch.
    Pre,
    /// Applied to the response after dispatch.
    Post,
}

impl ProcessorPhase {
    /// Returns a stable label for the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }
}

/// Key a processor is registered under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProcessorScope {
    /// One action.
    Action(ActionId),
    /// Every action of an app.
    App(AppId),
}

impl ProcessorScope {
    /// Returns lookup candidates for an action, most specific first.
    #[must_use]
    pub fn candidates(action: &ActionId, app: &AppId) -> [Self; 2] {
        [Self::Action(action.clone()), Self::App(app.clone())]
    }

    /// Returns true when this scope names the same key as `other`.
    ///
    /// App scopes compare case-insensitively.
    fn covers(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Action(left), Self::Action(right)) => left == right,
            (Self::App(left), Self::App(right)) => left.matches(right.as_str()),
            _ => false,
        }
    }
}

impl fmt::Display for ProcessorScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(action) => write!(f, "action `{action}`"),
            Self::App(app) => write!(f, "app `{app}`"),
        }
    }
}

impl From<ActionId> for ProcessorScope {
    fn from(action: ActionId) -> Self {
        Self::Action(action)
    }
}

impl From<AppId> for ProcessorScope {
    fn from(app: AppId) -> Self {
        Self::App(app)
    }
}

// ============================================================================
// SECTION: Spec
// ============================================================================

/// Pre- and post-processors keyed by scope.
///
/// # Invariants
/// - At most one processor per (phase, scope).
#[derive(Clone, Default)]
pub struct ProcessorSpec {
    /// Request transforms.
    pre: BTreeMap<ProcessorScope, Processor>,
    /// Response transforms.
    post: BTreeMap<ProcessorScope, Processor>,
}

impl fmt::Debug for ProcessorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorSpec")
            .field("pre", &self.pre.keys().collect::<Vec<_>>())
            .field("post", &self.post.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProcessorSpec {
    /// Creates an empty spec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pre-processor for `scope`.
    #[must_use]
    pub fn with_pre<F>(mut self, scope: impl Into<ProcessorScope>, processor: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.insert(ProcessorPhase::Pre, scope.into(), Arc::new(processor));
        self
    }

    /// Adds a post-processor for `scope`.
    #[must_use]
    pub fn with_post<F>(mut self, scope: impl Into<ProcessorScope>, processor: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.insert(ProcessorPhase::Post, scope.into(), Arc::new(processor));
        self
    }

    /// Inserts or replaces a processor.
    pub fn insert(&mut self, phase: ProcessorPhase, scope: ProcessorScope, processor: Processor) {
        self.phase_mut(phase).insert(scope, processor);
    }

    /// Returns true when no processor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }

    /// Returns `self` overlaid with `overrides`; overrides win per scope.
    #[must_use]
    pub fn layered(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        for phase in [ProcessorPhase::Pre, ProcessorPhase::Post] {
            for (scope, processor) in overrides.phase(phase) {
                let target = merged.phase_mut(phase);
                target.retain(|existing, _| !existing.covers(scope));
                target.insert(scope.clone(), Arc::clone(processor));
            }
        }
        merged
    }

    /// Returns the processor of the first candidate present.
    #[must_use]
    pub fn resolve(
        &self,
        phase: ProcessorPhase,
        candidates: &[ProcessorScope],
    ) -> Option<(&ProcessorScope, &Processor)> {
        let processors = self.phase(phase);
        candidates.iter().find_map(|candidate| {
            processors.get_key_value(candidate).or_else(|| {
                processors.iter().find(|(scope, _)| scope.covers(candidate))
            })
        })
    }

    /// Applies the matching processor to `payload`; passthrough when none.
    #[must_use]
    pub fn apply(
        &self,
        phase: ProcessorPhase,
        candidates: &[ProcessorScope],
        payload: Value,
    ) -> Value {
        match self.resolve(phase, candidates) {
            Some((_, processor)) => processor(payload),
            None => payload,
        }
    }

    /// Runs the pre-processing phase over request parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ToolsetError::PreProcessorContract`] when the processor
    /// returns a non-object.
    pub fn pre_process(
        &self,
        candidates: &[ProcessorScope],
        params: Params,
    ) -> Result<Params, ToolsetError> {
        let Some((scope, processor)) = self.resolve(ProcessorPhase::Pre, candidates) else {
            return Ok(params);
        };
        match processor(Value::Object(params)) {
            Value::Object(processed) => Ok(processed),
            other => Err(ToolsetError::PreProcessorContract {
                scope: scope.to_string(),
                actual: json_type_name(&other),
            }),
        }
    }

    /// Runs the post-processing phase over a response.
    ///
    /// Returns `None` and records a warning when the processor returns a
    /// non-object.
    pub fn post_process(
        &self,
        candidates: &[ProcessorScope],
        response: Params,
        events: &dyn ToolsetEventSink,
    ) -> Option<Params> {
        let Some((scope, processor)) = self.resolve(ProcessorPhase::Post, candidates) else {
            return Some(response);
        };
        match processor(Value::Object(response)) {
            Value::Object(processed) => Some(processed),
            other => {
                let mut event = ToolsetEvent::warning(
                    PROCESSOR_CONTRACT_VIOLATION,
                    format!(
                        "expected post-processor to return 'object', got '{}'",
                        json_type_name(&other)
                    ),
                );
                match scope {
                    ProcessorScope::Action(action) => event = event.with_action(action),
                    ProcessorScope::App(app) => event = event.with_app(app),
                }
                events.record(&event);
                None
            }
        }
    }

    /// Returns the processors of one phase.
    const fn phase(&self, phase: ProcessorPhase) -> &BTreeMap<ProcessorScope, Processor> {
        match phase {
            ProcessorPhase::Pre => &self.pre,
            ProcessorPhase::Post => &self.post,
        }
    }

    /// Returns the processors of one phase mutably.
    const fn phase_mut(&mut self, phase: ProcessorPhase) -> &mut BTreeMap<ProcessorScope, Processor> {
        match phase {
            ProcessorPhase::Pre => &mut self.pre,
            ProcessorPhase::Post => &mut self.post,
        }
    }
}
