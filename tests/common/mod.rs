//! Shared test fixtures: an in-memory graph client and an in-process MCP
//! client/server pair.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use neo4j_mcp::config::{Config, ConnectionConfig};
use neo4j_mcp::context::Context;
use neo4j_mcp::error::AppError;
use neo4j_mcp::graph::{GraphClient, Params, Session};
use neo4j_mcp::mcp::McpServer;
use neo4j_mcp::models::Record;
use rmcp::model::CallToolResult;
use rmcp::service::RunningService;
use rmcp::{RoleClient, ServiceExt};

type Handler = dyn Fn(&str, &Params) -> Result<Vec<Record>, AppError> + Send + Sync;

struct Inner {
    handler: Box<Handler>,
    calls: Mutex<Vec<(String, Params)>>,
    opened: AtomicUsize,
    released: AtomicUsize,
    closed: AtomicBool,
}

/// Graph client whose sessions answer every query with `handler`.
///
/// Counts sessions opened and released so tests can assert nothing leaks.
#[derive(Clone)]
pub struct MockGraph {
    inner: Arc<Inner>,
}

impl MockGraph {
    pub fn new(
        handler: impl Fn(&str, &Params) -> Result<Vec<Record>, AppError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner: Arc::new(Inner {
                handler: Box::new(handler),
                calls: Mutex::new(Vec::new()),
                opened: AtomicUsize::new(0),
                released: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// A graph that answers every query with the same records.
    pub fn returning(records: Vec<Record>) -> Arc<Self> {
        Self::new(move |_, _| Ok(records.clone()))
    }

    /// A graph that fails every query with `message`.
    pub fn failing(message: &'static str) -> Arc<Self> {
        Self::new(move |_, _| Err(AppError::database(message)))
    }

    pub fn calls(&self) -> Vec<(String, Params)> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn opened(&self) -> usize {
        self.inner.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphClient for MockGraph {
    async fn session(&self) -> Result<Box<dyn Session>, AppError> {
        if self.is_closed() {
            return Err(AppError::ConnectionClosed);
        }
        self.inner.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            inner: self.inner.clone(),
        }))
    }

    async fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }
}

struct MockSession {
    inner: Arc<Inner>,
}

#[async_trait]
impl Session for MockSession {
    async fn run(&mut self, cypher: &str, params: Params) -> Result<Vec<Record>, AppError> {
        self.inner
            .calls
            .lock()
            .unwrap()
            .push((cypher.to_string(), params.clone()));
        (self.inner.handler)(cypher, &params)
    }

    async fn close(self: Box<Self>) -> Result<(), AppError> {
        self.inner.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        connection: ConnectionConfig {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "password".to_string(),
        },
        database: None,
        max_connections: 4,
        fetch_size: 100,
    }
}

/// Starts an MCP server over an in-memory pipe and returns a connected client.
pub async fn connect(graph: Arc<MockGraph>) -> RunningService<RoleClient, ()> {
    let (server_io, client_io) = tokio::io::duplex(64 * 1024);
    let server = McpServer::new(Context::new(graph, test_config()));

    tokio::spawn(async move {
        let service = server.serve(server_io).await.expect("server failed to start");
        let _ = service.waiting().await;
    });

    ().serve(client_io).await.expect("client failed to connect")
}

/// Text of the single content block of a tool result.
pub fn text_of(result: &CallToolResult) -> String {
    assert_eq!(result.content.len(), 1, "expected a single content block");
    result.content[0]
        .as_text()
        .map(|t| t.text.clone())
        .expect("expected text content")
}
