//! neo4j-mcp - Cypher access to Neo4j over the Model Context Protocol

use clap::Parser;
use tracing_subscriber::EnvFilter;

use neo4j_mcp::cli::App;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let app = App::parse();

    // Logs go to stderr; stdout carries the MCP transport.
    let default_level = if app.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    app.run().await
}
