//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! This module builds the ToolRouter for STDIO/TCP transport by delegating
//! to the tool definitions themselves. Each tool knows how to create its own route.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::{ArticlesTool, DatapointTool};
use super::gateway::Gateway;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(gateway: Arc<Gateway>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(DatapointTool::create_route(gateway.clone()))
        .with_route(ArticlesTool::create_route(gateway))
}
