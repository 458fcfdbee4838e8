//! MCP server command handler.

use std::sync::Arc;

use color_eyre::Result;
use rmcp::ServiceExt;

use crate::context::Context;
use crate::graph::backends::neo4j::Neo4jClient;
use crate::graph::GraphClient;
use crate::mcp::McpServer;

use super::App;

impl App {
    /// Run the MCP server with stdio transport.
    ///
    /// Serves until the client disconnects or the process receives Ctrl-C,
    /// then closes the database connection once.
    pub async fn run_mcp(&self) -> Result<()> {
        tracing::info!("Starting neo4j-mcp server");

        let config = super::load_config()?;
        let client = Neo4jClient::connect(&config).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to Neo4j");
            color_eyre::eyre::eyre!("Failed to connect to Neo4j: {}", e)
        })?;
        let graph: Arc<dyn GraphClient> = Arc::new(client);

        let ctx = Context::new(graph.clone(), config);
        let server = McpServer::new(ctx);

        let service = server.serve(rmcp::transport::stdio()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to start MCP server");
            color_eyre::eyre::eyre!("Failed to start MCP server: {}", e)
        })?;

        tracing::info!("MCP server started, waiting for requests");

        let cancel = service.cancellation_token();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, shutting down");
                cancel.cancel();
            }
        });

        let outcome = service.waiting().await;
        interrupt.abort();

        graph.close().await;

        match outcome {
            Ok(reason) => {
                tracing::info!(reason = ?reason, "MCP server shut down");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "MCP server error");
                Err(color_eyre::eyre::eyre!("MCP server error: {}", e))
            }
        }
    }
}
