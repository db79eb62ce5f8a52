//! Error types and handling for the MCP server.
//!
//! This module defines a unified error type for everything that can go wrong
//! outside of a single tool call, all of it at startup.
//! Failures inside a tool call never reach this type; they are rendered as
//! text by the gateway (see `domains::tools::GatewayError`).

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend gateway could not be constructed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] crate::domains::tools::GatewayError),

    /// Configuration-related errors. Always fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
