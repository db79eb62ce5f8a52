//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - HTTP dispatch for tool calls (when http feature is enabled)
//! - Tool metadata for listing

use std::sync::Arc;
#[cfg(feature = "http")]
use tracing::warn;

use rmcp::model::Tool;

#[cfg(feature = "http")]
use super::error::ToolError;
use super::definitions::{ArticlesTool, DatapointTool};
use super::gateway::Gateway;

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    gateway: Arc<Gateway>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Get all tool names.
    pub fn tool_names() -> Vec<&'static str> {
        vec![DatapointTool::NAME, ArticlesTool::NAME]
    }

    /// Get all tools as Tool models (metadata).
    pub fn get_all_tools() -> Vec<Tool> {
        vec![DatapointTool::to_tool(), ArticlesTool::to_tool()]
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    ///
    /// Backend failures come back as `Ok` with an error text; only unknown
    /// tools and unusable arguments are `Err`.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        match name {
            DatapointTool::NAME => DatapointTool::http_handler(arguments, self.gateway.clone()).await,
            ArticlesTool::NAME => ArticlesTool::http_handler(arguments, self.gateway.clone()).await,
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name))
            }
        }
    }
}
