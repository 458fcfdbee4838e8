//! CLI module for neo4j-mcp.
//!
//! Subcommands:
//! - `mcp`: Run the MCP server (stdio transport, the default)
//! - `check`: Verify the configured connection and exit

mod check;
mod mcp;

use clap::{Parser, Subcommand};
use color_eyre::Result;

use crate::config::{Config, ConfigError};

/// neo4j-mcp - Cypher access to Neo4j over MCP
#[derive(Parser)]
#[command(name = "neo4j-mcp")]
#[command(about = "MCP server exposing a Cypher query tool backed by Neo4j")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Command {
    /// Run the MCP server (stdio transport for local use)
    #[default]
    Mcp,

    /// Connect to the database, run a trivial query and exit
    Check,
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> Result<()> {
        match self.command.unwrap_or_default() {
            Command::Mcp => self.run_mcp().await,
            Command::Check => self.run_check().await,
        }
    }
}

/// Loads configuration, exiting with status 1 and the usage text when
/// connection settings are missing.
fn load_config() -> Result<Config> {
    match Config::load() {
        Ok(config) => {
            tracing::debug!(
                uri = %config.connection.uri,
                user = %config.connection.user,
                database = ?config.database,
                "Loaded configuration"
            );
            Ok(config)
        }
        Err(e @ ConfigError::Missing { .. }) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
