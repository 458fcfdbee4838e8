//! Application error types with MCP protocol conversion.

use rmcp::model::ErrorCode;
use thiserror::Error;

/// Application-level errors for the Neo4j MCP server.
#[derive(Error, Debug)]
pub enum AppError {
    // Neo4j errors
    #[error("Neo4j connection error: {0}")]
    Connection(#[from] neo4rs::Error),

    /// Failure reported by the driver while running a query. Carries the
    /// driver's message verbatim.
    #[error("{0}")]
    Database(String),

    #[error("Neo4j connection is closed")]
    ConnectionClosed,

    // Protocol errors
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Wraps a driver error raised during query execution.
    pub fn database(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<AppError> for rmcp::model::ErrorData {
    fn from(err: AppError) -> Self {
        let (code, app_code) = match &err {
            AppError::UnknownTool(_) => (ErrorCode::METHOD_NOT_FOUND, "UNKNOWN_TOOL"),
            AppError::Connection(_) => (ErrorCode::INTERNAL_ERROR, "CONNECTION_ERROR"),
            AppError::Database(_) => (ErrorCode::INTERNAL_ERROR, "DATABASE_ERROR"),
            AppError::ConnectionClosed => (ErrorCode::INTERNAL_ERROR, "CONNECTION_CLOSED"),
            AppError::Config(_) => (ErrorCode::INTERNAL_ERROR, "CONFIG_ERROR"),
        };

        rmcp::model::ErrorData::new(code, format!("[{}] {}", app_code, err), None)
    }
}
