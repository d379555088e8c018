//! Processor pipeline tests for actionset-toolset.
// crates/actionset-toolset/tests/processors.rs
// ============================================================================
// Module: Processor Pipeline Tests
// Description: Pre/post processing through execute and tool handles.
// Purpose: Ensure processors run once, honor scope precedence, and degrade safely.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

mod common;

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use actionset_core::ActionId;
use actionset_core::AppId;
use actionset_toolset::ExecuteOptions;
use actionset_toolset::ProcessorSpec;
use actionset_toolset::SchemaRequest;
use actionset_toolset::events::PROCESSOR_CONTRACT_VIOLATION;
use actionset_toolset::events::PROCESSORS_DEPRECATED;
use serde_json::Value;
use serde_json::json;

use crate::common::Harness;

fn star() -> ActionId {
    ActionId::new("GITHUB_STAR_A_REPO")
}

fn counting(counter: &Arc<AtomicUsize>, key: &'static str) -> impl Fn(Value) -> Value + Send + Sync + 'static {
    let counter = Arc::clone(counter);
    move |mut value| {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Value::Object(map) = &mut value {
            map.insert(key.to_string(), json!(true));
        }
        value
    }
}

// ============================================================================
// SECTION: Execute
// ============================================================================

#[test]
fn pre_and_post_processors_run_exactly_once() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let pre = Arc::new(AtomicUsize::new(0));
    let post = Arc::new(AtomicUsize::new(0));
    let processors = ProcessorSpec::new()
        .with_pre(star(), counting(&pre, "pre_applied"))
        .with_post(star(), counting(&post, "post_applied"));
    let result = toolset
        .execute_action(&star(), &json!({"owner": "octocat"}), ExecuteOptions::default().with_processors(processors))
        .unwrap()
        .unwrap();
    assert_eq!(pre.load(Ordering::SeqCst), 1);
    assert_eq!(post.load(Ordering::SeqCst), 1);
    assert_eq!(result["post_applied"], json!(true));
    assert_eq!(harness.remote.executions()[0].params["pre_applied"], json!(true));
}

#[test]
fn non_object_post_result_yields_none_and_one_warning() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let processors = ProcessorSpec::new().with_post(star(), |_| json!("flattened"));
    let result = toolset
        .execute_action(&star(), &json!({}), ExecuteOptions::default().with_processors(processors))
        .unwrap();
    assert!(result.is_none());
    let warnings = harness.events.named(PROCESSOR_CONTRACT_VIOLATION);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "expected post-processor to return 'object', got 'string'");
}

#[test]
fn non_object_pre_result_fails_before_dispatch() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let processors = ProcessorSpec::new().with_pre(AppId::new("GITHUB"), |_| Value::Null);
    let err = toolset
        .execute_action(&star(), &json!({}), ExecuteOptions::default().with_processors(processors))
        .unwrap_err();
    assert_eq!(err.code(), "pre_processor_contract");
    assert_eq!(err.to_string(), "expected pre-processor for app `GITHUB` to return 'object', got 'null'");
    assert!(harness.remote.executions().is_empty());
}

#[test]
fn app_scope_applies_when_no_action_scope_matches() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let processors = ProcessorSpec::new()
        .with_post(AppId::new("github"), |_| json!({"by": "app"}))
        .with_post(ActionId::new("GITHUB_LIST_ISSUES"), |_| json!({"by": "other action"}));
    let result = toolset
        .execute_action(&star(), &json!({}), ExecuteOptions::default().with_processors(processors))
        .unwrap()
        .unwrap();
    assert_eq!(result["by"], json!("app"));
}

#[test]
fn construction_processors_are_deprecated_and_overridable() {
    let harness = Harness::github();
    let toolset = harness
        .builder()
        .processors(ProcessorSpec::new().with_post(star(), |_| json!({"by": "construction"})))
        .build()
        .unwrap();
    assert_eq!(harness.events.named(PROCESSORS_DEPRECATED).len(), 1);

    let result = toolset.execute_action(&star(), &json!({}), ExecuteOptions::default()).unwrap().unwrap();
    assert_eq!(result["by"], json!("construction"));

    let call = ProcessorSpec::new().with_post(star(), |_| json!({"by": "call"}));
    let result = toolset
        .execute_action(&star(), &json!({}), ExecuteOptions::default().with_processors(call))
        .unwrap()
        .unwrap();
    assert_eq!(result["by"], json!("call"));
}

// ============================================================================
// SECTION: Tool Handles
// ============================================================================

#[test]
fn tool_processors_bind_to_returned_handles() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let bound = ProcessorSpec::new().with_post(AppId::new("GITHUB"), |_| json!({"by": "tool"}));
    let tools = toolset.get_tools(&SchemaRequest::actions([star()]), Some(bound)).unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].schema().action, star());

    let result = tools[0].execute(&json!({}), ExecuteOptions::default()).unwrap().unwrap();
    assert_eq!(result["by"], json!("tool"));

    let direct = toolset.execute_action(&star(), &json!({}), ExecuteOptions::default()).unwrap().unwrap();
    assert_eq!(direct["successfull"], json!(true));

    let call = ProcessorSpec::new().with_post(star(), |_| json!({"by": "call"}));
    let result = tools[0].execute(&json!({}), ExecuteOptions::default().with_processors(call)).unwrap().unwrap();
    assert_eq!(result["by"], json!("call"));
}
