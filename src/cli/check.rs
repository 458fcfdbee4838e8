//! Check command handler.

use std::sync::Arc;

use color_eyre::Result;

use crate::graph::backends::neo4j::Neo4jClient;
use crate::graph::{GraphClient, Params};
use crate::services::{format_results, QueryService};

use super::App;

/// Query used to prove the connection works.
const PROBE_QUERY: &str = "RETURN 1 AS ok";

impl App {
    /// Connect with the resolved configuration and run a trivial query.
    pub async fn run_check(&self) -> Result<()> {
        let config = super::load_config()?;
        tracing::info!(uri = %config.connection.uri, "Checking Neo4j connection");

        let client: Arc<dyn GraphClient> = Arc::new(
            Neo4jClient::connect(&config)
                .await
                .map_err(|e| color_eyre::eyre::eyre!("Failed to connect: {}", e))?,
        );

        let result = QueryService::new(client.clone())
            .execute(PROBE_QUERY, Params::new())
            .await;
        client.close().await;

        let records = result.map_err(|e| color_eyre::eyre::eyre!("Neo4j error: {}", e))?;
        tracing::info!("Connection OK");
        println!("{}", format_results(&records));
        Ok(())
    }
}
