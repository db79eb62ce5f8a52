//! Test helpers: an in-process fake backend and ready-made configs.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use tokio::net::TcpListener;

use crate::core::config::{BackendConfig, Config};

/// One request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    seen: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A canned-response HTTP backend bound to an ephemeral local port.
pub struct FakeBackend {
    pub url: String,
    seen: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeBackend {
    /// Answer every POST with `status` and `body`.
    pub async fn spawn(status: StatusCode, body: &'static str) -> Self {
        Self::spawn_delayed(status, body, Duration::ZERO).await
    }

    /// Like `spawn`, but wait `delay` before answering.
    pub async fn spawn_delayed(status: StatusCode, body: &'static str, delay: Duration) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            status,
            body,
            delay,
            seen: seen.clone(),
        };

        let app = Router::new().route("/", post(respond)).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("http://{}/", addr),
            seen,
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.seen.lock().unwrap().clone()
    }
}

async fn respond(
    State(state): State<FakeState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    let text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.seen.lock().unwrap().push(RecordedRequest {
        authorization: text(header::AUTHORIZATION),
        content_type: text(header::CONTENT_TYPE),
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

/// A URL on which nothing is listening.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

/// Configuration pointing both tools at the given URLs.
pub fn test_config(datapoint_url: &str, retrieval_url: &str) -> Arc<Config> {
    Arc::new(Config::new(
        BackendConfig::new(datapoint_url, retrieval_url).with_timeout(Duration::from_secs(10)),
    ))
}
