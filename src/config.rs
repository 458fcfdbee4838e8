//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/neo4j-mcp/config.toml` (XDG) or platform config dir
//! 2. Project config: `.neo4j-mcp.toml`
//! 3. Environment variables: `NEO4J_*`
//!
//! The connection itself can be given either as three discrete values or as a
//! single comma-delimited connection string:
//!
//! ```toml
//! uri = "neo4j+s://example.databases.neo4j.io"
//! user = "neo4j"
//! password = "secret"
//!
//! # or, equivalently
//! connection = "neo4j+s://example.databases.neo4j.io,neo4j,secret"
//! ```
//!
//! When both forms are present, `connection` wins.

use std::collections::BTreeMap;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable prefix shared by every setting.
pub const ENV_PREFIX: &str = "NEO4J_";

/// Default connection pool size handed to the driver.
pub const DEFAULT_MAX_CONNECTIONS: usize = 16;

/// Default number of records fetched per round trip.
pub const DEFAULT_FETCH_SIZE: usize = 200;

/// Settings read verbatim from the environment.
///
/// figment's `Env` provider parses values, which would turn a password such as
/// `0123` or `[abc]` into a number or an array.
const STRING_KEYS: [&str; 5] = ["uri", "user", "password", "connection", "database"];

/// Settings whose environment values are parsed by figment.
const PARSED_KEYS: [&str; 2] = ["max_connections", "fetch_size"];

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = ".neo4j-mcp.toml";

/// Configuration failures. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "\nError: Missing required environment variables: {}\n\n\
         You can provide these variables in two ways:\n\n\
         1. Using separate environment variables:\n   \
         NEO4J_URI=<your-uri> NEO4J_USER=<your-user> NEO4J_PASSWORD=<your-password> neo4j-mcp\n\n\
         2. Using a single connection string:\n   \
         NEO4J_CONNECTION=<uri>,<user>,<password> neo4j-mcp\n\n\
         Example:\n   \
         NEO4J_CONNECTION=neo4j+s://example.databases.neo4j.io,neo4j,your-password neo4j-mcp\n",
        .missing.join(", ")
    )]
    Missing { missing: Vec<&'static str> },

    #[error("Invalid configuration: {0}")]
    Invalid(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(Box::new(err))
    }
}

/// Raw settings as extracted from the figment layers, before validation.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    uri: Option<String>,
    user: Option<String>,
    password: Option<String>,
    connection: Option<String>,
    database: Option<String>,
    max_connections: Option<usize>,
    fetch_size: Option<usize>,
}

/// Validated Neo4j connection parameters.
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Bolt endpoint, e.g. `neo4j://localhost:7687`.
    pub uri: String,
    /// Principal for basic authentication.
    pub user: String,
    /// Credential for basic authentication.
    pub password: String,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ConnectionConfig {
    /// Parses the combined `uri,user,password` form.
    ///
    /// Splits on every comma and keeps the first three fields. There is no
    /// escaping: a password containing a comma is cut at the comma. Fields
    /// past the third are dropped with a warning.
    pub fn parse_connection_string(
        connection: &str,
    ) -> (Option<String>, Option<String>, Option<String>) {
        let mut parts = connection.split(',').map(str::to_string);
        let uri = parts.next();
        let user = parts.next();
        let password = parts.next();

        let extra = parts.count();
        if extra > 0 {
            tracing::warn!(
                extra_fields = extra,
                "Connection string has more than three fields; extra fields ignored"
            );
        }

        (uri, user, password)
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub connection: ConnectionConfig,
    /// Target database; the server default is used when unset.
    pub database: Option<String>,
    pub max_connections: usize,
    pub fetch_size: usize,
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        let user_config = Self::user_config_path();

        let figment = Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(PROJECT_CONFIG_FILE))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed(ENV_PREFIX).only(&PARSED_KEYS))
            .merge(Serialized::defaults(Self::string_env()));

        Self::from_figment(&figment)
    }

    /// Collects the string-valued `NEO4J_*` variables that are set.
    fn string_env() -> BTreeMap<&'static str, String> {
        STRING_KEYS
            .iter()
            .filter_map(|key| {
                let var = format!("{}{}", ENV_PREFIX, key.to_uppercase());
                std::env::var(var).ok().map(|value| (*key, value))
            })
            .collect()
    }

    /// Extract and validate a config from an already assembled figment.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let raw: RawSettings = figment.extract()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let (uri, user, password) = match raw.connection.as_deref().filter(|c| !c.is_empty()) {
            Some(connection) => ConnectionConfig::parse_connection_string(connection),
            None => (raw.uri, raw.user, raw.password),
        };

        let uri = uri.filter(|v| !v.is_empty());
        let user = user.filter(|v| !v.is_empty());
        let password = password.filter(|v| !v.is_empty());

        let mut missing = Vec::new();
        if uri.is_none() {
            missing.push("NEO4J_URI");
        }
        if user.is_none() {
            missing.push("NEO4J_USER");
        }
        if password.is_none() {
            missing.push("NEO4J_PASSWORD");
        }

        match (uri, user, password) {
            (Some(uri), Some(user), Some(password)) => Ok(Self {
                connection: ConnectionConfig {
                    uri,
                    user,
                    password,
                },
                database: raw.database.filter(|d| !d.is_empty()),
                max_connections: raw.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
                fetch_size: raw.fetch_size.unwrap_or(DEFAULT_FETCH_SIZE),
            }),
            _ => Err(ConfigError::Missing { missing }),
        }
    }

    /// User config path: ~/.config/neo4j-mcp/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("neo4j-mcp").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("neo4j-mcp").join("config.toml"))
            .unwrap_or_default()
    }
}
