//! Tool-specific error types.

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while dispatching a tool call.
///
/// These are protocol-level failures: no tool ran, so there is no text
/// result to hand back.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }
}

/// Failures of a single backend round-trip.
///
/// The `Display` output of each variant is exactly the text the orchestrator
/// receives as the tool result.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend answered with a non-2xx status.
    #[error("HTTP Error: {status} - {body}")]
    Http { status: u16, body: String },

    /// No usable response was received (refused, DNS, reset, ...).
    #[error("Network Error: {0}")]
    Network(String),

    /// The backend did not answer within the configured deadline.
    #[error("Network Error: request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The outbound request could not be built.
    #[error("Request Error: {0}")]
    InvalidRequest(String),

    /// A 2xx response without a usable `answer` field.
    #[error("Response Error: {0}")]
    MalformedResponse(String),

    /// The HTTP client itself could not be created.
    #[error("Client Error: {0}")]
    Client(String),
}

impl GatewayError {
    /// Classify a `reqwest` error raised before a response was available.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_builder() {
            Self::InvalidRequest(describe(&err))
        } else {
            Self::Network(describe(&err))
        }
    }

    /// HTTP status code, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Render an error together with its source chain.
///
/// `reqwest` keeps the interesting part ("Connection refused", "dns error")
/// in the sources, not in its own message.
fn describe(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
