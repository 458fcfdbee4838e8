//! Cypher query tool.
//!
//! A thin MCP handler over [`QueryService`]: database failures come back as
//! error-flagged tool results, never as protocol errors.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::Deserialize;

use crate::graph::Params;
use crate::mcp::protocol::TextResponse;
use crate::mcp::server::McpServer;
use crate::services::{format_results, QueryService};

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters for the neo4j-query tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryParams {
    /// The Cypher query to execute
    pub query: String,
    /// Query parameters (optional)
    #[serde(default)]
    pub parameters: Option<Params>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router(router = query_tools, vis = "pub(crate)")]
impl McpServer {
    /// Run a Cypher query and render every record as text.
    #[tool(
        name = "neo4j-query",
        description = "Execute a Cypher query against the Neo4j database"
    )]
    pub async fn neo4j_query(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let parameters = params.parameters.unwrap_or_default();
        tracing::info!(
            query_len = params.query.len(),
            parameters = parameters.len(),
            "Running neo4j-query tool"
        );
        tracing::debug!(query = %params.query, "Cypher text");

        let service = QueryService::from(self.context());
        let response = match service.execute(&params.query, parameters).await {
            Ok(records) => TextResponse::success(format_results(&records)),
            Err(e) => TextResponse::error(format!("Neo4j error: {}", e)),
        };

        response.into()
    }
}
