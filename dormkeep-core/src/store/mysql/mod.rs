//! MySQL store with connection pooling and stored routines.
//!
//! # Module Structure
//! - `connection`: URL parsing, validation and pool construction
//! - `session`: pooled sessions, transactions and row decoding
//!
//! # Guarantees
//! - Connection strings are redacted in every error message
//! - Each statement is bounded by `statement_timeout` on both sides: the
//!   client deadline and the server's `max_execution_time`
//! - Sessions go back to the pool when dropped

pub mod connection;
pub mod session;

use super::{RecordStore, StoreBackend, StoreConfig, StoreSession};
use crate::Result;
use async_trait::async_trait;
use sqlx::MySqlPool;

pub use connection::{parse_mysql_connection_config, validate_mysql_connection_string};
pub use session::{MySqlSession, MySqlTransaction};

/// MySQL-backed record store.
pub struct MySqlStore {
    pool: MySqlPool,
    config: StoreConfig,
}

impl std::fmt::Debug for MySqlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlStore")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish_non_exhaustive()
    }
}

impl MySqlStore {
    /// Creates a store with a lazily connecting pool.
    ///
    /// # Errors
    /// Returns error if the connection string is malformed or the settings
    /// fail validation.
    pub fn new(connection_string: &str) -> Result<Self> {
        let config = parse_mysql_connection_config(connection_string)?;
        Self::with_config(connection_string, config)
    }

    /// Creates a store with custom configuration.
    ///
    /// # Errors
    /// Same as [`MySqlStore::new`].
    pub fn with_config(connection_string: &str, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let pool = connection::create_mysql_connection_pool(connection_string, &config)?;
        Ok(Self { pool, config })
    }

    /// Closes the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordStore for MySqlStore {
    async fn acquire(&self) -> Result<Box<dyn StoreSession>> {
        let conn = self.pool.acquire().await.map_err(|e| {
            crate::DormError::from_store(format!("Failed to acquire a connection to {}", self.config), e)
        })?;
        tracing::trace!("Acquired MySQL connection ({} idle)", self.pool.num_idle());

        Ok(Box::new(MySqlSession::new(
            conn,
            self.config.database.clone(),
            self.config.statement_timeout,
        )))
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::MySql
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }
}
