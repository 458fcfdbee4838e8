//! Application context shared by the MCP server.

use std::sync::Arc;

use crate::config::Config;
use crate::graph::GraphClient;

/// Root application context.
///
/// Built once at startup and handed to the server. The connection handle is
/// never replaced after construction.
#[derive(Clone)]
pub struct Context {
    /// Graph database connection handle.
    pub graph: Arc<dyn GraphClient>,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl Context {
    /// Creates a new context with the given dependencies.
    pub fn new(graph: Arc<dyn GraphClient>, config: Config) -> Self {
        Self {
            graph,
            config: Arc::new(config),
        }
    }
}
