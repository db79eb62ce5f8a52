//! Morningstar MCP Server Library
//!
//! This crate exposes Morningstar's datapoint and research APIs to MCP
//! clients as two tools. Each tool call is forwarded as a single
//! authenticated HTTP request and the backend's answer is returned as text.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: the tool definitions and the backend gateway they share
//!
//! # Example
//!
//! ```rust,no_run
//! use morningstar_mcp_server::{core::Config, core::McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = McpServer::new(config)?;
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
