//! Stub Reader API for tests
//!
//! An `axum` router on a loopback port that answers each configured path
//! with a canned response and records every request it sees, so client tests
//! can assert on the query string and headers that were actually sent.

use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const LIST_PATH: &str = "/api/v3/list/";
pub const AUTH_PATH: &str = "/api/v2/auth/";

const NOT_FOUND_BODY: &str = r#"{"detail":"Not found."}"#;

/// Canned response for one path
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl StubResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self::text(status, "")
    }

    /// Wait before answering, for timeout tests
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request as received by the stub
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded query parameters in the order they were sent
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.uri.query().unwrap_or("").as_bytes())
            .into_owned()
            .collect()
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

/// Running stub server, stopped on drop
pub struct StubUpstream {
    addr: SocketAddr,
    requests: Recorded,
    handle: JoinHandle<()>,
}

impl StubUpstream {
    /// Start serving `routes` (exact path match). Unknown paths get a 404.
    pub async fn start(routes: Vec<(&str, StubResponse)>) -> Self {
        let requests: Recorded = Arc::new(Mutex::new(Vec::new()));

        let mut router = Router::new();
        for (path, response) in routes {
            let recorded = requests.clone();
            router = router.route(
                path,
                any(move |method: Method, uri: Uri, headers: HeaderMap| {
                    respond(recorded.clone(), Some(response.clone()), method, uri, headers)
                }),
            );
        }
        let recorded = requests.clone();
        let router = router.fallback(move |method: Method, uri: Uri, headers: HeaderMap| {
            respond(recorded.clone(), None, method, uri, headers)
        });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub upstream");
        let addr = listener.local_addr().expect("Failed to read stub address");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("stub upstream stopped: {}", e);
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    /// Stub that answers `/api/v3/list/` with `response`
    pub async fn list(response: StubResponse) -> Self {
        Self::start(vec![(LIST_PATH, response)]).await
    }

    /// Value for `[api] base_url`
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v3", self.addr)
    }

    /// Value for `[api] auth_url`
    pub fn auth_url(&self) -> String {
        format!("http://{}{}", self.addr, AUTH_PATH)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Drop for StubUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn respond(
    recorded: Recorded,
    response: Option<StubResponse>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    recorded.lock().unwrap().push(RecordedRequest {
        method,
        uri,
        headers,
    });

    let response = response.unwrap_or_else(|| StubResponse::text(404, NOT_FOUND_BODY));
    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response()
}
