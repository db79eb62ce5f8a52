//! Morningstar datapoint lookup tool.
//!
//! Answers simple factual questions about a single security (market cap,
//! ratings, fair value, NAV, ...) by forwarding the question to the
//! datapoint backend.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domains::tools::error::GatewayError;
use crate::domains::tools::gateway::{
    Backend, Gateway, ToolInput, into_text, run_cancellable, text_result,
};

#[cfg(feature = "http")]
use crate::domains::tools::error::ToolError;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the datapoint tool.
#[derive(Clone, Deserialize, JsonSchema)]
pub struct DatapointParams {
    /// Bearer token forwarded to the Morningstar API.
    #[schemars(description = "The authorization token for the Morningstar API")]
    pub authorization_token: String,

    /// The datapoint question.
    #[schemars(description = "The question that can be answered by the Morningstar Datapoint Tool")]
    pub question: String,
}

impl std::fmt::Debug for DatapointParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatapointParams")
            .field("authorization_token", &"[REDACTED]")
            .field("question", &self.question)
            .finish()
    }
}

// ============================================================================
// Request Body
// ============================================================================

/// Exchanges the datapoint backend is restricted to.
pub const EXCHANGES: [&str; 2] = ["New York Stock Exchange, Inc.", "Nasdaq - All Markets"];

/// Domiciles the datapoint backend is restricted to.
pub const DOMICILES: [&str; 1] = ["United States"];

/// Body POSTed to the datapoint backend.
#[derive(Debug, Clone, Serialize)]
pub struct DatapointRequest<'a> {
    pub tool_input: ToolInput<'a>,
    pub additional_kwargs: &'static DatapointKwargs,
}

/// Fixed backend directives; identical for every call.
#[derive(Debug, Clone, Serialize)]
pub struct DatapointKwargs {
    pub datapoint: Toggle,
    pub filters: Filters,
    pub screener: Screener,
}

#[derive(Debug, Clone, Serialize)]
pub struct Toggle {
    pub enable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Filters {
    pub domicile: &'static [&'static str],
    pub exchanges: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct Screener {
    pub enable: bool,
    pub search_type: &'static str,
}

static DATAPOINT_KWARGS: DatapointKwargs = DatapointKwargs {
    datapoint: Toggle { enable: true },
    filters: Filters {
        domicile: &DOMICILES,
        exchanges: &EXCHANGES,
    },
    screener: Screener {
        enable: false,
        search_type: "sql_agent",
    },
};

// ============================================================================
// Tool Definition
// ============================================================================

/// Datapoint tool - single-value lookups for stocks and funds.
#[derive(Debug, Clone)]
pub struct DatapointTool;

impl DatapointTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "morningstar-datapoint-tool";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "use this tool to fetch latest values for Morningstar datapoints such as market capitalization, ratings, fair value ratio, fair value estimate, last closing price, total return, economic moat, earnings per share (EPS), net asset value (NAV), fund size, sector, domicile, primary share and more. Use this tool when the question is just a simple datapoint information look up for a security such as a stock or fund.";

    /// Build the backend request for `question`.
    pub fn build_request_body(question: &str) -> DatapointRequest<'_> {
        DatapointRequest {
            tool_input: ToolInput { question },
            additional_kwargs: &DATAPOINT_KWARGS,
        }
    }

    /// Ask the datapoint backend, keeping the failure typed.
    #[instrument(skip_all)]
    pub async fn answer(gateway: &Gateway, params: &DatapointParams) -> Result<String, GatewayError> {
        info!("Calling Morningstar Datapoint Tool with question: {}", params.question);

        let body = Self::build_request_body(&params.question);
        gateway
            .ask(Backend::Datapoint, &params.authorization_token, &body)
            .await
    }

    /// Execute the tool logic. Always yields a text result.
    pub async fn execute(gateway: &Gateway, params: &DatapointParams) -> CallToolResult {
        text_result(into_text(Self::NAME, Self::answer(gateway, params).await))
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        gateway: Arc<Gateway>,
    ) -> Result<serde_json::Value, ToolError> {
        let params: DatapointParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        let result = Self::execute(&gateway, &params).await;

        Ok(serde_json::json!({
            "content": result.content,
            "isError": result.is_error.unwrap_or(false)
        }))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<DatapointParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO/TCP transport.
    pub fn create_route<S>(gateway: Arc<Gateway>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let ct = ctx.request_context.ct.clone();
            let gateway = gateway.clone();
            async move {
                let params: DatapointParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                run_cancellable(Self::NAME, Self::execute(&gateway, &params), ct.cancelled()).await
            }
            .boxed()
        })
    }
}
