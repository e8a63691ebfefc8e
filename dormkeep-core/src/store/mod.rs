//! Store traits and factory for scoped connection access.
//!
//! A [`RecordStore`] hands out one [`StoreSession`] per public operation. The
//! session returns its connection to the pool when dropped, so release
//! happens on every exit path, early returns and `?` included. Multi-step
//! writes go through a [`StoreTransaction`], which rolls back when dropped
//! without a commit.
//!
//! # Module Structure
//! - `config`: connection settings parsed from the URL
//! - `mysql`: the production backend, with stored routines
//! - `sqlite`: file or in-memory backend without stored routines

pub mod config;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(test)]
pub(crate) mod testing;

use crate::Result;
use crate::models::Relation;
use crate::schema::TableName;
use crate::sql::Statement;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;

pub use config::StoreConfig;

/// Supported store engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreBackend {
    /// MySQL over sqlx
    MySql,
    /// SQLite over sqlx
    Sqlite,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MySql => write!(f, "MySQL"),
            Self::Sqlite => write!(f, "SQLite"),
        }
    }
}

/// Result of invoking a stored routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureOutcome {
    /// The routine ran to completion
    Completed,
    /// The routine does not exist or does not accept the arguments given
    Unavailable,
}

/// Entry point to a configured store.
///
/// # Object Safety
/// This trait is object-safe; the record service holds it as
/// `Arc<dyn RecordStore>`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Acquires a session, waiting at most `connect_timeout`.
    ///
    /// # Errors
    /// Returns a transport error when no connection can be obtained.
    async fn acquire(&self) -> Result<Box<dyn StoreSession>>;

    /// Engine behind this store.
    fn backend(&self) -> StoreBackend;

    /// Connection settings (credentials excluded).
    fn config(&self) -> &StoreConfig;
}

/// One acquired connection. Dropping it releases the connection.
///
/// Every statement runs under the configured `statement_timeout`.
#[async_trait]
pub trait StoreSession: Send {
    /// Raw column names of `table` from the metadata catalog.
    async fn column_names(&mut self, table: TableName) -> Result<Vec<String>>;

    /// Runs a query and collects every row.
    async fn fetch_all(&mut self, statement: &Statement) -> Result<Relation>;

    /// Runs a query and returns the first column of the first row, or null.
    async fn fetch_scalar(&mut self, statement: &Statement) -> Result<JsonValue>;

    /// Runs a write statement and returns the number of affected rows.
    async fn execute(&mut self, statement: &Statement) -> Result<u64>;

    /// Starts a transaction on this session's connection.
    async fn begin<'a>(&'a mut self) -> Result<Box<dyn StoreTransaction + 'a>>;
}

/// An open transaction. Dropping it without [`StoreTransaction::commit`]
/// rolls it back.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Runs a write statement and returns the number of affected rows.
    async fn execute(&mut self, statement: &Statement) -> Result<u64>;

    /// Invokes a stored routine.
    ///
    /// # Errors
    /// Failures other than an absent or incompatible routine are returned as
    /// errors, so data errors raised by the routine are never mistaken for
    /// [`ProcedureOutcome::Unavailable`].
    async fn call_procedure(&mut self, statement: &Statement) -> Result<ProcedureOutcome>;

    /// Commits every statement run so far.
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Creates a store from a connection URL.
///
/// The pool connects lazily, so this succeeds without a reachable server;
/// connection problems surface on the first `acquire`.
///
/// # Errors
/// Returns a configuration error for malformed URLs or backends that were
/// not compiled in.
///
/// # Example
/// ```rust,no_run
/// use dormkeep_core::store::create_store;
///
/// # async fn example() -> dormkeep_core::Result<()> {
/// let store = create_store("mysql://root@localhost/college_dorm").await?;
/// let session = store.acquire().await?;
/// # drop(session);
/// # Ok(())
/// # }
/// ```
pub async fn create_store(connection_string: &str) -> Result<Arc<dyn RecordStore>> {
    let backend = detect_backend(connection_string)?;
    tracing::debug!("Creating {} store", backend);

    match backend {
        #[cfg(feature = "mysql")]
        StoreBackend::MySql => Ok(Arc::new(mysql::MySqlStore::new(connection_string)?)),
        #[cfg(not(feature = "mysql"))]
        StoreBackend::MySql => Err(crate::DormError::configuration(
            "MySQL support not compiled in. Use --features mysql",
        )),
        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite => Ok(Arc::new(sqlite::SqliteStore::new(connection_string).await?)),
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite => Err(crate::DormError::configuration(
            "SQLite support not compiled in. Use --features sqlite",
        )),
    }
}

/// Detects the backend from the connection string.
///
/// # Errors
/// Returns a configuration error when the format is unrecognized.
pub fn detect_backend(connection_string: &str) -> Result<StoreBackend> {
    if connection_string.starts_with("mysql://") {
        Ok(StoreBackend::MySql)
    } else if connection_string.starts_with("sqlite:")
        || connection_string == ":memory:"
        || connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        Ok(StoreBackend::Sqlite)
    } else {
        Err(crate::DormError::configuration(
            "Unrecognized database connection string format",
        ))
    }
}

/// Runs a driver future under `after`, classifying its failure.
#[cfg(any(feature = "mysql", feature = "sqlite"))]
pub(crate) async fn with_deadline<T, F>(
    operation: &str,
    after: std::time::Duration,
    future: F,
) -> Result<T>
where
    F: std::future::Future<Output = std::result::Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(after, future).await {
        Ok(result) => result.map_err(|e| crate::DormError::from_store(operation, e)),
        Err(_) => Err(crate::DormError::timeout(operation, after)),
    }
}

/// Decodes a driver-side text value that carries a number (DECIMAL sums and
/// the like), falling back to the text itself.
#[cfg(any(feature = "mysql", feature = "sqlite"))]
pub(crate) fn numeric_text(text: String) -> JsonValue {
    if let Ok(n) = text.parse::<i64>() {
        return JsonValue::Number(n.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or(JsonValue::String(text), JsonValue::Number)
}
