// crates/actionset-client/tests/common/mod.rs
// ============================================================================
// Module: Client Test Helpers
// Description: Loopback tiny_http server recording requests.
// Purpose: Observe exactly what the client sends and control what it receives.
// ============================================================================

#![allow(dead_code, reason = "Shared helpers are not used by every test binary.")]

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use actionset_config::RemoteConfig;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Request observed by the stub server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub api_key: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// Loopback server answering from a routing closure.
pub struct StubServer {
    pub base_url: String,
    server: Arc<Server>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Starts a server; `route(method, url)` returns status and JSON body.
    pub fn start<F>(route: F) -> Self
    where
        F: Fn(&str, &str) -> (u16, String) + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let worker_server = Arc::clone(&server);
        let worker_requests = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            for mut request in worker_server.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let header = |name: &'static str| {
                    request
                        .headers()
                        .iter()
                        .find(|header| header.field.equiv(name))
                        .map(|header| header.value.as_str().to_string())
                };
                let recorded = RecordedRequest {
                    method: request.method().as_str().to_string(),
                    url: request.url().to_string(),
                    api_key: header("x-api-key"),
                    content_type: header("Content-Type"),
                    body,
                };
                let (status, payload) = route(&recorded.method, &recorded.url);
                worker_requests.lock().unwrap().push(recorded);
                let response = Response::from_string(payload)
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                            .unwrap(),
                    );
                let _ = request.respond(response);
            }
        });
        Self {
            base_url: format!("http://{addr}/api"),
            server,
            requests,
            handle: Some(handle),
        }
    }

    /// Returns the requests observed so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Remote configuration pointing at this server with an inline key.
    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: self.base_url.clone(),
            api_key: Some("test-key".to_string()),
            timeout_ms: 5_000,
            ..RemoteConfig::default()
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
