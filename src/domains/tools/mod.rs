//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Every tool forwards its call to a Morningstar backend through the shared
//! [`Gateway`] and hands the answer back as text.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `gateway.rs` - Shared authenticated HTTP call and error-to-text mapping
//! - `router.rs` - Dynamic ToolRouter builder for STDIO/TCP transport
//! - `registry.rs` - Central tool registry and HTTP dispatch
//! - `error.rs` - Tool and gateway error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Define params, `build_request_body()`, `execute()` and `http_handler()`
//! 3. Export in `definitions/mod.rs`
//! 4. Add route in `router.rs` using `with_route()`
//! 5. Register in `registry.rs` for HTTP support

pub mod definitions;
mod error;
pub mod gateway;
mod registry;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{GatewayError, ToolError};
pub use gateway::{Backend, Gateway};
pub use registry::ToolRegistry;
pub use router::build_tool_router;
