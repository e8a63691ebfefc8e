//! SQLite store for file-based and in-memory databases.
//!
//! # Module Structure
//! - `connection`: connection string handling and pool construction
//! - `session`: sessions, transactions and row decoding
//!
//! # SQLite-Specific Behavior
//! - Columns are discovered through `pragma_table_info`
//! - There are no stored routines; every routine call reports
//!   [`ProcedureOutcome::Unavailable`](crate::store::ProcedureOutcome)
//! - In-memory databases use a single pinned connection so every session
//!   sees the same data

pub mod connection;
pub mod session;

use super::{RecordStore, StoreBackend, StoreConfig, StoreSession};
use crate::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub use connection::{parse_sqlite_connection_config, validate_sqlite_connection_string};
pub use session::{SqliteSession, SqliteTransaction};

/// SQLite-backed record store.
pub struct SqliteStore {
    pool: SqlitePool,
    config: StoreConfig,
    in_memory: bool,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("config", &self.config)
            .field("is_in_memory", &self.in_memory)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens (or creates) the database named by `connection_string`.
    ///
    /// # Connection String Formats
    /// - `sqlite:///path/to/database.db` - Absolute file path
    /// - `sqlite://./relative/path.db` - Relative file path
    /// - `sqlite::memory:` or `:memory:` - In-memory database
    ///
    /// # Errors
    /// Returns error if the connection string is invalid or the database
    /// cannot be opened.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let config = parse_sqlite_connection_config(connection_string)?;
        let in_memory = connection::is_in_memory(connection_string);
        let pool = connection::create_sqlite_pool(connection_string, &config).await?;

        Ok(Self {
            pool,
            config,
            in_memory,
        })
    }

    /// True for `:memory:` databases.
    pub const fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Closes the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn acquire(&self) -> Result<Box<dyn StoreSession>> {
        let conn = self.pool.acquire().await.map_err(|e| {
            crate::DormError::from_store("Failed to acquire a SQLite connection", e)
        })?;
        Ok(Box::new(SqliteSession::new(conn, self.config.statement_timeout)))
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::Sqlite
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }
}
