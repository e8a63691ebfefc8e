//! Store connection configuration.
//!
//! This module provides the `StoreConfig` struct for configuring store
//! connections with conservative defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for store connections.
///
/// # Security
/// This struct does not hold passwords or credentials.
/// The password stays inside the connection URL handed to the driver and is
/// never logged or serialized.
///
/// # Example
/// ```rust
/// use dormkeep_core::store::StoreConfig;
///
/// let config = StoreConfig::new("localhost".to_string())
///     .with_port(3306)
///     .with_database("college_dorm".to_string())
///     .with_username("root".to_string());
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store host address
    pub host: String,
    /// Optional port number
    pub port: Option<u16>,
    /// Database (schema) name, or file path for SQLite
    pub database: Option<String>,
    /// Optional username (password handled separately)
    pub username: Option<String>,
    /// Deadline for acquiring a connection
    pub connect_timeout: Duration,
    /// Deadline for each statement
    pub statement_timeout: Duration,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// How long an idle pooled connection is kept; `None` keeps it forever
    pub idle_timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            database: None,
            username: None,
            connect_timeout: Duration::from_secs(30),
            statement_timeout: Duration::from_secs(30),
            max_connections: 10,
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl std::fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StoreConfig({}{}{})",
            self.host,
            self.port.map_or_else(String::new, |p| format!(":{p}")),
            self.database
                .as_ref()
                .map_or_else(String::new, |db| format!("/{db}"))
        )
        // username and credentials are never shown
    }
}

impl StoreConfig {
    /// Validates configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid or unsafe
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.is_empty() {
            return Err(crate::error::DormError::configuration(
                "host cannot be empty",
            ));
        }

        if self.port == Some(0) {
            return Err(crate::error::DormError::configuration(
                "port must be greater than 0",
            ));
        }

        if self.max_connections == 0 {
            return Err(crate::error::DormError::configuration(
                "max_connections must be greater than 0",
            ));
        }

        if self.max_connections > 100 {
            return Err(crate::error::DormError::configuration(
                "max_connections should not exceed 100",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::DormError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.statement_timeout.is_zero() {
            return Err(crate::error::DormError::configuration(
                "statement_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Creates a new config with safe defaults.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Builder method to set username.
    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    /// Builder method to set the per-statement deadline.
    pub const fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Builder method to set the pool size.
    pub const fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Builder method to set the idle timeout.
    pub const fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Applies the query parameters shared by every backend
    /// (`connect_timeout`, `statement_timeout`, `pool_max_conns`).
    ///
    /// Out-of-range values are ignored and the default is kept.
    pub(crate) fn apply_query_pairs(&mut self, url: &url::Url) {
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "connect_timeout" => {
                    if let Ok(secs) = value.parse::<u64>()
                        && (1..=300).contains(&secs)
                    {
                        self.connect_timeout = Duration::from_secs(secs);
                    }
                }
                "statement_timeout" => {
                    if let Ok(secs) = value.parse::<u64>()
                        && (1..=3600).contains(&secs)
                    {
                        self.statement_timeout = Duration::from_secs(secs);
                    }
                }
                "pool_max_conns" => {
                    if let Ok(max_conns) = value.parse::<u32>()
                        && (1..=100).contains(&max_conns)
                    {
                        self.max_connections = max_conns;
                    }
                }
                _ => {} // Ignore driver-specific parameters
            }
        }
    }
}
