//! Query execution service.

use std::sync::Arc;
use std::time::Instant;

use crate::context::Context;
use crate::error::AppError;
use crate::graph::{GraphClient, Params};
use crate::models::Record;

/// Runs Cypher queries on the shared connection.
///
/// Every call opens its own session and closes it before returning, whether
/// the query succeeded or not.
#[derive(Clone)]
pub struct QueryService {
    client: Arc<dyn GraphClient>,
}

impl QueryService {
    pub fn new(client: Arc<dyn GraphClient>) -> Self {
        Self { client }
    }

    /// Execute a query and collect the full result set into memory.
    pub async fn execute(&self, cypher: &str, params: Params) -> Result<Vec<Record>, AppError> {
        let started = Instant::now();
        let mut session = self.client.session().await?;

        let result = session.run(cypher, params).await;

        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "Failed to close session cleanly");
        }

        match &result {
            Ok(records) => tracing::info!(
                records = records.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Query executed"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Query failed"
            ),
        }

        result
    }
}

impl From<&Context> for QueryService {
    fn from(ctx: &Context) -> Self {
        Self::new(ctx.graph.clone())
    }
}
