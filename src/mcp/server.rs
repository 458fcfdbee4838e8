//! MCP server implementation for neo4j-mcp.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::ToolCallContext, ServerHandler},
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    ErrorData as McpError, RoleServer,
};

use crate::context::Context;
use crate::error::AppError;

/// MCP server giving AI assistants read/write Cypher access to one Neo4j
/// database through a single `neo4j-query` tool.
#[derive(Clone)]
pub struct McpServer {
    pub(crate) ctx: Arc<Context>,
    tool_router: ToolRouter<McpServer>,
}

impl McpServer {
    pub fn new(ctx: Context) -> Self {
        tracing::info!(
            uri = %ctx.config.connection.uri,
            database = ctx.config.database.as_deref().unwrap_or("<default>"),
            "Initializing neo4j-mcp server"
        );

        Self {
            ctx: Arc::new(ctx),
            tool_router: Self::tool_router(),
        }
    }

    fn tool_router() -> ToolRouter<Self> {
        Self::query_tools()
    }

    /// Get direct access to the context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Descriptors of every registered tool.
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Tool names are matched exactly; anything unregistered is a
    /// method-not-found protocol error rather than a tool result.
    pub(crate) fn ensure_tool(&self, name: &str) -> Result<(), AppError> {
        if self.tools().iter().any(|tool| tool.name == name) {
            Ok(())
        } else {
            Err(AppError::UnknownTool(name.to_string()))
        }
    }
}

// ============================================================================
// Server Handler
// ============================================================================

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                r#"neo4j-mcp - Cypher access to a Neo4j database

## Tools

- **neo4j-query** - Execute a Cypher query. Pass values through `parameters`
  and reference them as `$name` in the query text.

Results are returned as text, one block per record. Database errors are
returned as error results prefixed with "Neo4j error:".
"#
                .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        tracing::debug!("Listing tools");
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if let Err(e) = self.ensure_tool(&request.name) {
            tracing::warn!(tool = %request.name, "Rejected call to unknown tool");
            return Err(e.into());
        }

        let tcc = ToolCallContext::new(self, request, context);
        self.tool_router.call(tcc).await
    }
}
