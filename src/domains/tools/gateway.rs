//! Backend gateway - the shared outbound HTTP call used by every tool.
//!
//! Each tool call becomes exactly one authenticated JSON POST to the backend
//! selected by the tool. The outcome is kept as a `Result<String, GatewayError>`
//! internally and only collapsed to text at the tool boundary, so that
//! failures reach the orchestrator as readable strings rather than protocol
//! errors.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::core::config::Config;

use super::error::GatewayError;

/// Downstream service addressed by a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Datapoint lookups (prices, ratings, NAV, ...).
    Datapoint,
    /// Retrieval QA over the research corpus.
    Retrieval,
}

impl Backend {
    /// Short name used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Datapoint => "datapoint",
            Self::Retrieval => "retrieval",
        }
    }
}

/// Success payload returned by both backends. Only `answer` is consumed.
#[derive(Debug, Deserialize)]
struct BackendAnswer {
    answer: String,
}

/// The `tool_input` object shared by every request body.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInput<'a> {
    pub question: &'a str,
}

/// Shared HTTP client plus the configured backend endpoints.
///
/// Cheap to share behind an `Arc`; `reqwest::Client` pools connections
/// internally and needs no further synchronisation.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl Gateway {
    /// Build the gateway from the process configuration.
    pub fn new(config: Arc<Config>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.backends.request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// The configuration this gateway was built from.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// URL configured for a backend.
    pub fn url(&self, backend: Backend) -> &str {
        match backend {
            Backend::Datapoint => &self.config.backends.datapoint_url,
            Backend::Retrieval => &self.config.backends.retrieval_url,
        }
    }

    fn timeout(&self) -> Duration {
        self.config.backends.request_timeout
    }

    /// Build the outbound POST without sending it.
    pub fn build_request<B>(
        &self,
        backend: Backend,
        token: &str,
        body: &B,
    ) -> Result<reqwest::Request, GatewayError>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .post(self.url(backend))
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .build()
            .map_err(|e| GatewayError::from_reqwest(e, self.timeout()))
    }

    /// POST `body` to `backend` on behalf of the bearer `token` and return
    /// the backend's `answer`.
    #[instrument(skip_all, fields(backend = backend.as_str()))]
    pub async fn ask<B>(&self, backend: Backend, token: &str, body: &B) -> Result<String, GatewayError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(backend, token, body)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| GatewayError::from_reqwest(e, self.timeout()))?;

        let status = response.status();

        // The status alone is diagnostic enough when the body can't be read.
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<body unavailable: {}>", e));
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::from_reqwest(e, self.timeout()))?;

        debug!("Raw {} response: {}", backend.as_str(), text);

        let parsed: BackendAnswer = serde_json::from_str(&text).map_err(|e| {
            GatewayError::MalformedResponse(format!(
                "expected a JSON object with a string 'answer' field ({}): {}",
                e, text
            ))
        })?;

        Ok(parsed.answer)
    }
}

/// Collapse a gateway outcome into the text the orchestrator receives.
pub fn into_text(tool: &str, result: Result<String, GatewayError>) -> String {
    match result {
        Ok(answer) => {
            info!("Response from {}: {}", tool, answer);
            answer
        }
        Err(e) => {
            error!("Call to {} failed: {}", tool, e);
            e.to_string()
        }
    }
}

/// Race a tool call against the client's cancellation signal.
///
/// On cancellation `call` is dropped, which aborts its in-flight request.
pub async fn run_cancellable<F, C>(tool: &str, call: F, cancelled: C) -> Result<CallToolResult, McpError>
where
    F: Future<Output = CallToolResult>,
    C: Future<Output = ()>,
{
    tokio::select! {
        result = call => Ok(result),
        _ = cancelled => {
            warn!("{} call cancelled by client", tool);
            Err(McpError::internal_error("Request cancelled".to_string(), None))
        }
    }
}

/// Wrap the final text as a tool result.
///
/// Failures are plain text too: the orchestrator has no separate error
/// channel, so the result is never flagged as an error.
pub fn text_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::testing::{FakeBackend, closed_port_url, test_config};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    #[tokio::test]
    async fn test_ask_returns_answer_on_success() {
        let backend = FakeBackend::spawn(StatusCode::OK, r#"{"answer":"$3.2T","extra":1}"#).await;
        let gateway = Gateway::new(test_config(&backend.url, &backend.url)).unwrap();

        let answer = gateway
            .ask(Backend::Datapoint, "tok", &json!({"q": 1}))
            .await
            .unwrap();
        assert_eq!(answer, "$3.2T");
    }

    #[tokio::test]
    async fn test_ask_sends_bearer_and_json() {
        let backend = FakeBackend::spawn(StatusCode::OK, r#"{"answer":"ok"}"#).await;
        let gateway = Gateway::new(test_config(&backend.url, &backend.url)).unwrap();

        gateway
            .ask(Backend::Retrieval, "abc.def", &json!({"hello": "world"}))
            .await
            .unwrap();

        let seen = backend.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].authorization.as_deref(), Some("Bearer abc.def"));
        assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
        assert_eq!(seen[0].body, json!({"hello": "world"}));
    }

    #[test]
    fn test_empty_token_is_forwarded_verbatim() {
        let gateway = Gateway::new(test_config("http://127.0.0.1:9/", "http://127.0.0.1:9/")).unwrap();

        let request = gateway
            .build_request(Backend::Datapoint, "", &json!({}))
            .unwrap();
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer ");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "http://127.0.0.1:9/");
    }

    #[test]
    fn test_build_request_targets_backend_url() {
        let gateway = Gateway::new(test_config("http://dp.test/a", "http://rt.test/b")).unwrap();

        let datapoint = gateway.build_request(Backend::Datapoint, "t", &json!({})).unwrap();
        let retrieval = gateway.build_request(Backend::Retrieval, "t", &json!({})).unwrap();
        assert_eq!(datapoint.url().as_str(), "http://dp.test/a");
        assert_eq!(retrieval.url().as_str(), "http://rt.test/b");
        assert_eq!(retrieval.headers()[AUTHORIZATION], "Bearer t");
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_http_error() {
        let backend =
            FakeBackend::spawn(StatusCode::UNAUTHORIZED, r#"{"error":"invalid token"}"#).await;
        let gateway = Gateway::new(test_config(&backend.url, &backend.url)).unwrap();

        let err = gateway
            .ask(Backend::Datapoint, "bad", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("invalid token"));
    }

    /// Answer one request with a 500 that promises more body than it sends.
    async fn spawn_truncated_error_backend() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            // Drain the request so closing the socket does not reset it.
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\npartial")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_unreadable_error_body_keeps_status() {
        let url = spawn_truncated_error_backend().await;
        let gateway = Gateway::new(test_config(&url, &url)).unwrap();

        let err = gateway
            .ask(Backend::Datapoint, "tok", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().starts_with("HTTP Error: 500 - <body unavailable:"));
    }

    #[tokio::test]
    async fn test_missing_answer_is_malformed() {
        let backend = FakeBackend::spawn(StatusCode::OK, r#"{"result":"nope"}"#).await;
        let gateway = Gateway::new(test_config(&backend.url, &backend.url)).unwrap();

        let err = gateway
            .ask(Backend::Datapoint, "tok", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
        assert!(err.to_string().starts_with("Response Error:"));
    }

    #[tokio::test]
    async fn test_non_string_answer_is_malformed() {
        let backend = FakeBackend::spawn(StatusCode::OK, r#"{"answer": 42}"#).await;
        let gateway = Gateway::new(test_config(&backend.url, &backend.url)).unwrap();

        let err = gateway
            .ask(Backend::Datapoint, "tok", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
        assert!(err.to_string().starts_with("Response Error:"));
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_malformed() {
        let backend = FakeBackend::spawn(StatusCode::OK, "<html>maintenance</html>").await;
        let gateway = Gateway::new(test_config(&backend.url, &backend.url)).unwrap();

        let err = gateway
            .ask(Backend::Retrieval, "tok", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
        assert!(err.to_string().contains("<html>maintenance</html>"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let url = closed_port_url().await;
        let gateway = Gateway::new(test_config(&url, &url)).unwrap();

        let err = gateway
            .ask(Backend::Retrieval, "tok", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
        assert!(err.to_string().starts_with("Network Error:"));
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let backend = FakeBackend::spawn_delayed(
            StatusCode::OK,
            r#"{"answer":"late"}"#,
            Duration::from_secs(5),
        )
        .await;
        let mut config = (*test_config(&backend.url, &backend.url)).clone();
        config.backends.request_timeout = Duration::from_millis(200);
        let gateway = Gateway::new(Arc::new(config)).unwrap();

        let err = gateway
            .ask(Backend::Datapoint, "tok", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_invalid_header_token_is_request_error() {
        let backend = FakeBackend::spawn(StatusCode::OK, r#"{"answer":"ok"}"#).await;
        let gateway = Gateway::new(test_config(&backend.url, &backend.url)).unwrap();

        let err = gateway
            .ask(Backend::Datapoint, "line\nbreak", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
        assert!(backend.requests().is_empty());
    }

    #[test]
    fn test_into_text_collapses_both_arms() {
        assert_eq!(into_text("t", Ok("X".to_string())), "X");
        let text = into_text("t", Err(GatewayError::Network("refused".to_string())));
        assert_eq!(text, "Network Error: refused");
    }

    #[test]
    fn test_text_result_is_not_flagged_as_error() {
        let result = text_result("HTTP Error: 500 - boom".to_string());
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.content.len(), 1);
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_cancellation_drops_in_flight_call() {
        let backend = FakeBackend::spawn_delayed(
            StatusCode::OK,
            r#"{"answer":"too late"}"#,
            Duration::from_secs(5),
        )
        .await;
        let gateway = Gateway::new(test_config(&backend.url, &backend.url)).unwrap();
        let dropped = Arc::new(AtomicBool::new(false));

        let guard = DropFlag(dropped.clone());
        let call = async {
            let _guard = guard;
            text_result(into_text("t", gateway.ask(Backend::Datapoint, "tok", &json!({})).await))
        };

        let started = Instant::now();
        let result = run_cancellable("t", call, tokio::time::sleep(Duration::from_millis(300))).await;

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(dropped.load(Ordering::SeqCst));
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_completed_call_wins_over_pending_cancel() {
        let backend = FakeBackend::spawn(StatusCode::OK, r#"{"answer":"fast"}"#).await;
        let gateway = Gateway::new(test_config(&backend.url, &backend.url)).unwrap();

        let call = async {
            text_result(into_text("t", gateway.ask(Backend::Datapoint, "tok", &json!({})).await))
        };
        let result = run_cancellable("t", call, std::future::pending::<()>())
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(false));
    }
}
