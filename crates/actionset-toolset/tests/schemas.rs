//! Schema retrieval tests for actionset-toolset.
// crates/actionset-toolset/tests/schemas.rs
// ============================================================================
// Module: Schema Retrieval Tests
// Description: Selection, caching, description synthesis, and limits.
// Purpose: Ensure presented schemas are valid, stable, and bounded.
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
use actionset_core::ActionMetadata;
use actionset_core::AppId;
use actionset_toolset::CharLimits;
use actionset_toolset::SchemaRequest;
use actionset_toolset::SchemaResolver;
use actionset_toolset::ToolsetVariant;
use actionset_toolset::events::ACCOUNT_CHECK_SKIPPED;
use proptest::prelude::*;
use serde_json::json;

use crate::common::Harness;

fn star() -> ActionId {
    ActionId::new("GITHUB_STAR_A_REPO")
}

// ============================================================================
// SECTION: Selection
// ============================================================================

#[test]
fn explicit_actions_lead_and_app_matches_skip_named_actions() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let request = SchemaRequest::actions([ActionId::new("GITHUB_LIST_ISSUES")]).with_apps([AppId::new("GITHUB")]);
    let schemas = toolset.get_action_schemas(&request).unwrap();
    let names: Vec<&str> = schemas.iter().map(|schema| schema.action.as_str()).collect();
    assert_eq!(names, vec!["GITHUB_LIST_ISSUES", "GITHUB_STAR_A_REPO"]);
}

#[test]
fn repeated_explicit_actions_yield_repeated_schemas() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let schemas = toolset.get_action_schemas(&SchemaRequest::actions([star(), star()])).unwrap();
    assert_eq!(schemas.len(), 2);
    assert_eq!(schemas[0], schemas[1]);
}

#[test]
fn unknown_apps_are_not_found() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let err = toolset.get_action_schemas(&SchemaRequest::default().with_apps(["NOT_AN_APP"])).unwrap_err();
    assert_eq!(err.code(), "app_not_found");

    let err = toolset
        .find_actions_by_tags(&[AppId::new("NOT_AN_APP")], &["important".to_string()])
        .unwrap_err();
    assert_eq!(err.code(), "app_not_found");
    assert_eq!(harness.remote.list_calls(), 0);
}

#[test]
fn resolver_keeps_slug_order_and_duplicates() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let resolver = SchemaResolver::new(CharLimits::default());
    let slugs = [ActionId::new("GITHUB_LIST_ISSUES"), star(), ActionId::new("GITHUB_LIST_ISSUES")];
    let schemas = resolver.resolve_all(toolset.catalogue(), &slugs).unwrap();
    let names: Vec<&str> = schemas.iter().map(|schema| schema.action.as_str()).collect();
    assert_eq!(names, vec!["GITHUB_LIST_ISSUES", "GITHUB_STAR_A_REPO", "GITHUB_LIST_ISSUES"]);

    let err = resolver.resolve_all(toolset.catalogue(), &[star(), ActionId::new("GITHUB_NOPE")]).unwrap_err();
    assert_eq!(err.code(), "action_not_found");
}

#[test]
fn tags_select_across_apps() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let found = toolset.find_actions_by_tags(&[], &["important".to_string()]).unwrap();
    assert_eq!(found, vec![star(), ActionId::new("SERPAPI_SEARCH")]);

    let scoped = toolset.find_actions_by_tags(&[AppId::new("github")], &["important".to_string()]).unwrap();
    assert_eq!(scoped, vec![star()]);
}

#[test]
fn tag_search_requires_a_tag() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let err = toolset.find_actions_by_tags(&[AppId::new("GITHUB")], &[" ".to_string()]).unwrap_err();
    assert_eq!(err.code(), "invalid_params");
}

#[test]
fn unknown_explicit_action_is_not_found() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let err = toolset.get_action_schemas(&SchemaRequest::actions(["GITHUB_NOPE"])).unwrap_err();
    assert_eq!(err.code(), "action_not_found");
}

#[test]
fn metadata_is_fetched_once_per_slug() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    toolset.get_action_schemas(&SchemaRequest::actions([star()])).unwrap();
    toolset.get_action_schemas(&SchemaRequest::actions([star()])).unwrap();
    assert_eq!(harness.remote.action_fetches(), 1);
}

#[test]
fn loaded_apps_answer_later_searches_from_cache() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let loaded = toolset.load_app(&AppId::new("GITHUB")).unwrap();
    assert_eq!(loaded.len(), 2);
    let calls = harness.remote.list_calls();
    let schemas = toolset.get_action_schemas(&SchemaRequest::default().with_apps(["GITHUB"])).unwrap();
    assert_eq!(schemas.len(), 2);
    assert_eq!(harness.remote.list_calls(), calls);
}

// ============================================================================
// SECTION: Account Checks
// ============================================================================

#[test]
fn account_check_rejects_apps_without_accounts() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let err = toolset
        .get_action_schemas(&SchemaRequest::actions([ActionId::new("SLACK_SEND_MESSAGE")]))
        .unwrap_err();
    assert_eq!(err.code(), "account_not_found");
}

#[test]
fn skipped_account_check_warns_with_app_list() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let request =
        SchemaRequest::actions([ActionId::new("SLACK_SEND_MESSAGE"), star()]).skip_account_check();
    let schemas = toolset.get_action_schemas(&request).unwrap();
    assert_eq!(schemas.len(), 2);
    let warnings = harness.events.named(ACCOUNT_CHECK_SKIPPED);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "not verifying connected accounts for apps: GITHUB, SLACK");
}

#[test]
fn toolset_level_check_setting_applies_by_default() {
    let harness = Harness::github();
    let toolset = harness.builder().check_connected_accounts(false).build().unwrap();
    toolset.get_action_schemas(&SchemaRequest::actions([ActionId::new("SLACK_SEND_MESSAGE")])).unwrap();
    assert_eq!(harness.events.named(ACCOUNT_CHECK_SKIPPED).len(), 1);
}

// ============================================================================
// SECTION: Presentation
// ============================================================================

#[test]
fn parameter_schemas_are_valid_json_schema() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let schema = toolset.get_action_schemas(&SchemaRequest::actions([star()])).unwrap().remove(0);
    let document = schema.parameters.to_value();
    let validator = jsonschema::validator_for(&document).unwrap();
    assert!(validator.is_valid(&json!({"owner": "octocat", "repo": "hello"})));
    assert!(!validator.is_valid(&json!({"owner": "octocat"})));
    assert_eq!(
        schema.parameters.property_description("owner"),
        Some("Repository owner. Please provide a value of type string. This parameter is required.")
    );
    assert_eq!(
        schema.parameters.property_description("repo"),
        Some("Repo. Please provide a value of type string. This parameter is required.")
    );
}

#[test]
fn repeated_retrieval_does_not_rewrap_descriptions() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let first = toolset.get_action_schemas(&SchemaRequest::actions([star()])).unwrap();
    let second = toolset.get_action_schemas(&SchemaRequest::actions([star()])).unwrap();
    assert_eq!(first, second);
}

#[test]
fn display_name_fills_missing_description() {
    let harness = Harness::github();
    let toolset = harness.toolset();
    let schema = toolset
        .get_action_schemas(&SchemaRequest::actions([ActionId::new("GITHUB_LIST_ISSUES")]))
        .unwrap()
        .remove(0);
    assert_eq!(schema.description, "List issues");
}

#[test]
fn variant_limits_truncate_presented_text() {
    let harness = Harness::github();
    let variant = ToolsetVariant::new("langchain").with_description_char_limit(5).with_action_name_char_limit(6);
    let toolset = harness.builder().variant(variant).build().unwrap();
    assert_eq!(toolset.runtime(), "langchain");
    let schema = toolset.get_action_schemas(&SchemaRequest::actions([star()])).unwrap().remove(0);
    assert_eq!(schema.name, "GITHUB");
    assert_eq!(schema.description, "Stars");
    assert_eq!(schema.action, star());
}

proptest! {
    #[test]
    fn truncation_never_exceeds_limits(
        description in "[a-zé][a-zA-Zé ]{0,79}",
        name in "[A-Z_]{1,40}",
        limit in 1usize..32,
    ) {
        let resolver = SchemaResolver::new(CharLimits { name: Some(limit), description: Some(limit) });
        let action = ActionMetadata::new(name.as_str(), "APP").with_description(description.as_str());
        let schema = resolver.resolve(&action);
        prop_assert!(schema.name.chars().count() <= limit);
        prop_assert!(schema.description.chars().count() <= limit);
        prop_assert!(description.starts_with(&schema.description));
    }
}
