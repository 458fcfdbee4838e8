//! Model Context Protocol (MCP) server exposing Cypher execution.
//!
//! ## Modules
//!
//! - `server`: MCP server implementation with tool router
//! - `protocol`: Tool response envelope
//! - `tools`: Tool implementations

mod protocol;
pub(crate) mod server;
mod tools;

pub use protocol::TextResponse;
pub use server::McpServer;
pub use tools::query::QueryParams;
