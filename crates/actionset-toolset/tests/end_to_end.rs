//! End-to-end tests for actionset-toolset over the HTTP client.
// crates/actionset-toolset/tests/end_to_end.rs
// ============================================================================
// Module: End-to-End Tests
// Description: Configuration-built toolset against a loopback remote service.
// Purpose: Exercise config, client, catalogue, accounts, and execution together.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::fs;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use actionset_config::ActionsetConfig;
use actionset_core::ActionId;
use actionset_toolset::ExecuteOptions;
use actionset_toolset::SchemaRequest;
use actionset_toolset::Toolset;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Loopback Service
// ============================================================================

/// Loopback remote service with a fixed GitHub catalogue.
struct Backend {
    base_url: String,
    server: Arc<Server>,
    seen: Arc<Mutex<Vec<(String, String, String)>>>,
    handle: Option<JoinHandle<()>>,
}

impl Backend {
    fn start() -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let worker = Arc::clone(&server);
        let worker_seen = Arc::clone(&seen);
        let handle = thread::spawn(move || {
            for mut request in worker.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let method = request.method().as_str().to_string();
                let url = request.url().to_string();
                let (status, payload) = route(&method, &url);
                worker_seen.lock().unwrap().push((method, url, body));
                let response = Response::from_string(payload.to_string())
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
                    );
                let _ = request.respond(response);
            }
        });
        Self {
            base_url: format!("http://{addr}/api"),
            server,
            seen,
            handle: Some(handle),
        }
    }

    fn seen(&self) -> Vec<(String, String, String)> {
        self.seen.lock().unwrap().clone()
    }

    fn config(&self, extra: &str) -> ActionsetConfig {
        let document = format!(
            "[remote]\nbase_url = \"{}\"\napi_key = \"test-key\"\ntimeout_ms = 5000\n\n{extra}",
            self.base_url
        );
        ActionsetConfig::from_toml_str(&document).unwrap()
    }
}

impl Drop for Backend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn route(method: &str, url: &str) -> (u16, Value) {
    let account = json!({
        "id": "acc_1",
        "appName": "github",
        "clientUniqueUserId": "default",
        "status": "ACTIVE"
    });
    match (method, url) {
        ("POST", "/api/v2/actions/GITHUB_STAR_A_REPO/execute") => {
            (200, json!({"successfull": true, "data": {"starred": true}, "error": null}))
        }
        ("GET", "/api/v2/actions/GITHUB_STAR_A_REPO") => (
            200,
            json!({
                "name": "GITHUB_STAR_A_REPO",
                "appName": "github",
                "displayName": "Star a repository",
                "description": "Stars a repository",
                "tags": ["important"],
                "parameters": {
                    "type": "object",
                    "properties": {
                        "owner": {"type": "string", "description": "Repository owner"},
                        "repo": {"type": "string", "description": "Repository name"}
                    },
                    "required": ["owner", "repo"]
                },
                "response": {"type": "object", "properties": {}}
            }),
        ),
        ("GET", "/api/v1/apps/github") => (200, json!({"key": "github", "name": "GitHub", "noAuth": false})),
        ("GET", "/api/v1/connectedAccounts/acc_1") => (200, account),
        ("GET", url) if url.starts_with("/api/v1/connectedAccounts?") => (200, json!({"items": [account]})),
        _ => (404, json!({"message": "not found"})),
    }
}

fn star() -> ActionId {
    ActionId::new("GITHUB_STAR_A_REPO")
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

#[test]
fn configured_toolset_executes_remote_action() {
    let backend = Backend::start();
    let toolset = Toolset::from_config(&backend.config("[logging]\nsink = \"none\"\n")).unwrap();
    let result = toolset
        .execute_action(&star(), &json!({"owner": "octocat", "repo": "hello"}), ExecuteOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(result["successfull"], json!(true));

    let seen = backend.seen();
    let (_, _, body) = seen.iter().find(|(method, _, _)| method == "POST").unwrap();
    let body: Value = serde_json::from_str(body).unwrap();
    assert_eq!(body["appName"], json!("github"));
    assert_eq!(body["entityId"], json!("default"));
    assert_eq!(body["connectedAccountId"], json!("acc_1"));
    assert_eq!(body["input"], json!({"owner": "octocat", "repo": "hello"}));
    assert_eq!(body["sessionInfo"]["sessionId"], json!(toolset.session_id().as_str()));
    assert_eq!(body["runtime"], json!("actionset"));
}

#[test]
fn configured_accounts_are_verified_and_events_written_to_file() {
    let backend = Backend::start();
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("events.jsonl");
    let extra = format!(
        "[logging]\nsink = \"file\"\npath = \"{}\"\n\n[connected_accounts]\ngithub = \"acc_1\"\n",
        log.display()
    );
    let toolset = Toolset::from_config(&backend.config(&extra)).unwrap();
    let schemas = toolset.get_action_schemas(&SchemaRequest::actions([star()])).unwrap();
    assert_eq!(schemas[0].parameters.required, vec!["owner".to_string(), "repo".to_string()]);
    toolset.execute_action(&star(), &json!({}), ExecuteOptions::default()).unwrap();

    let urls: Vec<String> = backend.seen().into_iter().map(|(_, url, _)| url).collect();
    assert!(urls.contains(&"/api/v1/connectedAccounts/acc_1".to_string()));
    assert!(!urls.iter().any(|url| url.starts_with("/api/v1/connectedAccounts?")));

    let written = fs::read_to_string(&log).unwrap();
    let line = written.lines().find(|line| line.contains("action_executed")).unwrap();
    let event: Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["action"], json!("GITHUB_STAR_A_REPO"));
    assert_eq!(event["level"], json!("info"));
}

#[test]
fn rejected_explicit_account_fails_construction() {
    let backend = Backend::start();
    let extra = "[logging]\nsink = \"none\"\n\n[connected_accounts]\nslack = \"acc_1\"\n";
    let Err(err) = Toolset::from_config(&backend.config(extra)) else {
        panic!("expected an account mismatch");
    };
    assert_eq!(err.code(), "account_mismatch");
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut config = ActionsetConfig::default();
    config.remote.base_url = "ftp://example.com".to_string();
    let Err(err) = Toolset::from_config(&config) else {
        panic!("expected a config error");
    };
    assert_eq!(err.code(), "config_invalid");
}
