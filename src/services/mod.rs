//! Services behind the MCP tools.
//!
//! - `query`: runs Cypher on the shared connection, one session per call
//! - `format`: renders result records as agent-readable text

pub mod format;
mod query;

pub use format::{format_results, format_value};
pub use query::QueryService;
