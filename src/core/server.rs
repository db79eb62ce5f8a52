//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol. Tool routing is built dynamically in `domains/tools/router.rs`;
//! every route shares one [`Gateway`] built from the server configuration.

use rmcp::{
    ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler,
};
use std::sync::Arc;

use super::config::Config;
use crate::domains::tools::{Gateway, build_tool_router};

#[cfg(feature = "http")]
use crate::domains::tools::ToolRegistry;

/// Instructions sent to clients during initialization.
const INSTRUCTIONS: &str = "Morningstar MCP server. Use morningstar-datapoint-tool for simple \
     datapoint look ups on a single stock or fund (price, rating, fair value, NAV, ...). \
     Use morningstar-articles-tool for questions answered by Morningstar research, opinion \
     and editorial content. Both tools take the caller's Morningstar authorization token.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Shared outbound client for all tools.
    gateway: Arc<Gateway>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> super::error::Result<Self> {
        let config = Arc::new(config);
        let gateway = Arc::new(Gateway::new(config.clone())?);

        Ok(Self {
            tool_router: build_tool_router::<Self>(gateway.clone()),
            config,
            gateway,
        })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The gateway shared by all tool routes.
    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Server instructions advertised on initialize.
    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, String> {
        let registry = ToolRegistry::new(self.gateway.clone());
        registry
            .call_tool(name, arguments)
            .await
            .map_err(|e| e.to_string())
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BackendConfig;

    fn test_server() -> McpServer {
        McpServer::new(Config::new(BackendConfig::new(
            "http://127.0.0.1:9/dp",
            "http://127.0.0.1:9/rt",
        )))
        .unwrap()
    }

    #[test]
    fn test_server_lists_both_tools() {
        let tools = test_server().list_tools();
        assert_eq!(tools.len(), 2);
        for tool in &tools {
            assert!(tool["inputSchema"]["properties"]["authorization_token"].is_object());
            assert!(tool["inputSchema"]["properties"]["question"].is_object());
        }
    }

    #[test]
    fn test_get_info_advertises_tools_only() {
        let server = test_server();
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
        assert_eq!(info.server_info.name, "Morningstar MCP Server");
    }
}
