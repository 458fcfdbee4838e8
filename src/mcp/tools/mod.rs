//! MCP tool implementations.

pub mod query;
