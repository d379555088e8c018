//! Runtime action tests for actionset-toolset.
// crates/actionset-toolset/tests/runtime_actions.rs
// ============================================================================
// Module: Runtime Action Tests
// Description: Registered callables surfaced through the catalogue.
// Purpose: Ensure runtime actions present schemas and execute like catalogue actions.
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

use actionset_core::ActionId;
use actionset_core::ActionOrigin;
use actionset_core::AppId;
use actionset_toolset::ExecuteOptions;
use actionset_toolset::FieldType;
use actionset_toolset::ParameterSpec;
use actionset_toolset::ProcessorSpec;
use actionset_toolset::ReturnSpec;
use actionset_toolset::RuntimeActionBuilder;
use actionset_toolset::SchemaRequest;
use serde_json::Value;
use serde_json::json;

use crate::common::Harness;

fn register_greeter(harness: &Harness) {
    RuntimeActionBuilder::new("greeter", "say_hello")
        .docstring(
            "Greets a person by name.\n\n:param name: Person to greet\n:return greeting: Rendered greeting",
        )
        .param(ParameterSpec::required("name", FieldType::String))
        .param(ParameterSpec::optional("excited", FieldType::Boolean))
        .returns(ReturnSpec::new("greeting", FieldType::String))
        .tags(["social"])
        .register(&harness.registry, |params| {
            let name = params.get("name").and_then(Value::as_str).ok_or("name is required")?;
            let excited = params.get("excited").and_then(Value::as_bool).unwrap_or(false);
            let mark = if excited { "!" } else { "." };
            Ok(json!({"greeting": format!("Hello, {name}{mark}")}))
        })
        .unwrap();
}

#[test]
fn runtime_actions_present_synthesized_schemas() {
    let harness = Harness::github();
    register_greeter(&harness);
    let toolset = harness.toolset();
    let schema = toolset
        .get_action_schemas(&SchemaRequest::actions(["GREETER_SAY_HELLO"]))
        .unwrap()
        .remove(0);
    assert_eq!(schema.app, AppId::new("GREETER"));
    assert_eq!(schema.description, "Greets a person by name.");
    assert_eq!(schema.parameters.title.as_deref(), Some("SayHelloRequest"));
    assert_eq!(
        schema.parameters.property_description("name"),
        Some("Person to greet. Please provide a value of type string. This parameter is required.")
    );
    assert!(schema.parameters.property_description("excited").unwrap().ends_with("This parameter is optional."));
    assert!(harness.remote.executions().is_empty());
}

#[test]
fn runtime_actions_are_found_by_app_and_tag() {
    let harness = Harness::github();
    register_greeter(&harness);
    let toolset = harness.toolset();
    let by_tag = toolset.find_actions_by_tags(&[], &["social".to_string()]).unwrap();
    assert_eq!(by_tag, vec![ActionId::new("GREETER_SAY_HELLO")]);

    let by_app = toolset.get_action_schemas(&SchemaRequest::default().with_apps(["greeter"])).unwrap();
    assert_eq!(by_app.len(), 1);
    assert_eq!(harness.remote.list_calls(), 1);
    assert_eq!(toolset.catalogue().action(&ActionId::new("GREETER_SAY_HELLO")).unwrap().origin, ActionOrigin::Runtime);
}

#[test]
fn runtime_actions_execute_through_processors() {
    let harness = Harness::github();
    register_greeter(&harness);
    let toolset = harness.toolset();
    let processors = ProcessorSpec::new().with_pre(AppId::new("GREETER"), |mut value| {
        if let Value::Object(map) = &mut value {
            map.insert("excited".to_string(), json!(true));
        }
        value
    });
    let result = toolset
        .execute_action(
            &ActionId::new("GREETER_SAY_HELLO"),
            &json!({"name": "Ada"}),
            ExecuteOptions::default().with_processors(processors),
        )
        .unwrap()
        .unwrap();
    assert_eq!(result["data"]["greeting"], json!("Hello, Ada!"));
    assert_eq!(result["successful"], json!(true));
}

#[test]
fn malformed_runtime_names_are_rejected() {
    let harness = Harness::github();
    let err = RuntimeActionBuilder::new("bad tool", "run").register(&harness.registry, |_| Ok(Value::Null)).unwrap_err();
    assert_eq!(err.code(), "registration_failed");
}
