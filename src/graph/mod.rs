//! Graph abstraction layer for database access.
//!
//! # Architecture
//!
//! - [`GraphClient`] - Connection handle, creates sessions
//! - [`Session`] - Runs one query and is closed afterwards
//!
//! # Usage
//!
//! ```ignore
//! use neo4j_mcp::graph::{backends::neo4j::Neo4jClient, GraphClient, Params};
//!
//! let client = Neo4jClient::connect(&config).await?;
//!
//! let mut session = client.session().await?;
//! let records = session.run("MATCH (n) RETURN n LIMIT 5", Params::new()).await;
//! session.close().await?;
//! ```

mod traits;

pub mod backends;
pub mod cypher;

pub use traits::{GraphClient, Session};

/// Parameters for Cypher queries.
///
/// A map of parameter names to JSON values, as received from tool arguments.
pub type Params = serde_json::Map<String, serde_json::Value>;
