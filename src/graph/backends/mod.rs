//! Backend implementations for graph databases.
//!
//! Each backend implements the traits from [`crate::graph`]:
//!
//! - [`GraphClient`](crate::graph::GraphClient) - connection handle
//! - [`Session`](crate::graph::Session) - single-query execution context
//!
//! # Available Backends
//!
//! | Backend | Module | Status |
//! |---------|--------|--------|
//! | Neo4j (Bolt) | [`neo4j`] | Available |

pub mod neo4j;
