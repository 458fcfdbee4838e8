//! neo4j-mcp - MCP server exposing a Cypher query tool backed by Neo4j
//!
//! One tool, `neo4j-query`, runs arbitrary Cypher with optional parameters
//! and renders the records as agent-readable text.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod mcp;
pub mod models;
pub mod services;
