//! Core traits for graph database access.
//!
//! - [`GraphClient`] - the long-lived connection handle; hands out sessions
//! - [`Session`] - a short-lived, single-use execution context

use async_trait::async_trait;

use crate::error::AppError;
use crate::graph::Params;
use crate::models::Record;

/// A session against a graph database.
///
/// Sessions are obtained from a [`GraphClient`], used for one query and then
/// closed. Closing consumes the session so it cannot be reused.
#[async_trait]
pub trait Session: Send {
    /// Runs a Cypher query and collects every result record into memory.
    ///
    /// # Arguments
    ///
    /// * `cypher` - The Cypher query string
    /// * `params` - Parameters to bind to the query
    async fn run(&mut self, cypher: &str, params: Params) -> Result<Vec<Record>, AppError>;

    /// Releases the session and any resources it holds.
    async fn close(self: Box<Self>) -> Result<(), AppError>;
}

/// A graph database connection handle.
///
/// One handle lives for the whole process. It is shared read-only; each
/// query gets its own [`Session`].
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Opens a new session on this connection.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ConnectionClosed`] once [`close`](GraphClient::close)
    /// has been called.
    async fn session(&self) -> Result<Box<dyn Session>, AppError>;

    /// Closes the connection. Only the first call has an effect.
    async fn close(&self);
}
