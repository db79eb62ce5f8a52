//! Morningstar articles (research Q&A) tool.
//!
//! Sends the question to the retrieval QA backend, which runs a hybrid search
//! over Morningstar's editorial and research corpus and synthesises an
//! answer from the retrieved summaries.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::domains::tools::error::GatewayError;
use crate::domains::tools::gateway::{
    Backend, Gateway, ToolInput, into_text, run_cancellable, text_result,
};

#[cfg(feature = "http")]
use crate::domains::tools::error::ToolError;

/// Parameters for the articles tool.
#[derive(Clone, Deserialize, JsonSchema)]
pub struct ArticlesParams {
    #[schemars(description = "The authorization token for the Morningstar API")]
    pub authorization_token: String,

    #[schemars(description = "The question that can be answered using the Morningstar Articles Tool")]
    pub question: String,
}

impl std::fmt::Debug for ArticlesParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticlesParams")
            .field("authorization_token", &"[REDACTED]")
            .field("question", &self.question)
            .finish()
    }
}

/// Answer template. The placeholders are filled by the backend, not here.
pub const PROMPT_TEMPLATE: &str =
    "Answer the question: {question}, using the following summaries: {summaries}";

/// Body POSTed to the retrieval backend.
#[derive(Debug, Clone, Serialize)]
pub struct ArticlesRequest<'a> {
    pub tool_input: ToolInput<'a>,
    pub additional_kwargs: &'static RetrievalKwargs,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalKwargs {
    pub prompt: &'static str,
    pub corpus_configs: &'static [CorpusConfig],
    pub use_structured_outputs: bool,
}

/// Selects a document collection and how it is searched.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusConfig {
    pub corpus_slug: &'static str,
    pub retrieval_type: &'static str,
    pub search_args: SearchArgs,
    pub weaviate_class_name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchArgs {
    /// Weight between keyword (0.0) and vector (1.0) scoring.
    pub alpha: f64,
    pub hybrid_search_kwargs: HybridSearchKwargs,
}

#[derive(Debug, Clone, Serialize)]
pub struct HybridSearchKwargs {
    pub fusion_type: &'static str,
    pub properties: &'static [&'static str],
}

static RESEARCH_CORPUS: [CorpusConfig; 1] = [CorpusConfig {
    corpus_slug: "research",
    retrieval_type: "hybrid",
    search_args: SearchArgs {
        alpha: 0.5,
        hybrid_search_kwargs: HybridSearchKwargs {
            fusion_type: "relativeScoreFusion",
            properties: &["content"],
        },
    },
    weaviate_class_name: "Articles_v2",
}];

static RETRIEVAL_KWARGS: RetrievalKwargs = RetrievalKwargs {
    prompt: PROMPT_TEMPLATE,
    corpus_configs: &RESEARCH_CORPUS,
    use_structured_outputs: true,
};

/// Articles tool - Morningstar opinion, research and analysis.
#[derive(Debug, Clone)]
pub struct ArticlesTool;

impl ArticlesTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "morningstar-articles-tool";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "use this tool for getting answers for questions about finance, investing, sustainable investing, investment strategies, portfolio and retirement. It is a reliable resource for obtaining Morningstar's opinion, research, and analysis from Morningstar's Editorial content, methodologies and Thematic research. This tool relies solely on reliable research conducted by Morningstar for all of the information provided. This tool is not intended to provide factual information regarding a stock or fund's rating, price, fair value, or performance.";

    /// Request body for the retrieval backend. Only the question varies.
    pub fn build_request_body(question: &str) -> ArticlesRequest<'_> {
        ArticlesRequest {
            tool_input: ToolInput { question },
            additional_kwargs: &RETRIEVAL_KWARGS,
        }
    }

    /// Ask the retrieval backend and return its answer.
    #[instrument(skip_all)]
    pub async fn answer(gateway: &Gateway, params: &ArticlesParams) -> Result<String, GatewayError> {
        info!("Calling Morningstar Articles Tool");
        debug!("Question: {}", params.question);

        let body = Self::build_request_body(&params.question);
        gateway
            .ask(Backend::Retrieval, &params.authorization_token, &body)
            .await
    }

    /// Run the tool; failures come back as text.
    pub async fn execute(gateway: &Gateway, params: &ArticlesParams) -> CallToolResult {
        text_result(into_text(Self::NAME, Self::answer(gateway, params).await))
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        gateway: Arc<Gateway>,
    ) -> Result<serde_json::Value, ToolError> {
        let params: ArticlesParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        let result = Self::execute(&gateway, &params).await;

        Ok(serde_json::json!({
            "content": result.content,
            "isError": result.is_error.unwrap_or(false)
        }))
    }

    /// Tool metadata advertised to clients.
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ArticlesParams>(),
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
                let params: ArticlesParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                run_cancellable(Self::NAME, Self::execute(&gateway, &params), ct.cancelled()).await
            }
            .boxed()
        })
    }
}
