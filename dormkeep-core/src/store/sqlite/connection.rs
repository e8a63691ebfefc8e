//! SQLite connection string handling.
//!
//! # Connection Modes
//! - File-based: `sqlite:///path/to/database.db` or `sqlite://./relative.db`
//! - In-memory: `sqlite::memory:` or `:memory:`

use crate::Result;
use crate::error::DormError;
use crate::store::StoreConfig;
use sqlx::SqlitePool;
use url::Url;

/// Parses a SQLite connection string into validated settings.
///
/// # Errors
/// Returns error if the connection string format is not recognized.
pub fn parse_sqlite_connection_config(connection_string: &str) -> Result<StoreConfig> {
    validate_sqlite_connection_string(connection_string)?;

    let mut config =
        StoreConfig::new("localhost".to_string()).with_database(extract_database_name(connection_string));

    if let Ok(url) = Url::parse(connection_string) {
        config.apply_query_pairs(&url);
    }

    if is_in_memory(connection_string) {
        // Every connection to :memory: is a separate database
        config = config.with_max_connections(1).with_idle_timeout(None);
    }

    config.validate()?;
    Ok(config)
}

/// Validates SQLite connection string format.
///
/// # Errors
/// Returns error if the connection string is invalid.
pub fn validate_sqlite_connection_string(connection_string: &str) -> Result<()> {
    if connection_string == ":memory:" {
        return Ok(());
    }

    if connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        return Ok(());
    }

    if connection_string.starts_with("sqlite:") {
        if is_in_memory(connection_string) {
            return Ok(());
        }
        if let Ok(url) = Url::parse(connection_string) {
            if url.scheme() != "sqlite" {
                return Err(DormError::configuration(
                    "Connection string must use sqlite:// scheme",
                ));
            }
            return Ok(());
        }
        if connection_string.starts_with("sqlite://") {
            return Ok(());
        }
    }

    Err(DormError::configuration(
        "Invalid SQLite connection string format: expected sqlite:// URL, file path, or :memory:",
    ))
}

/// True for in-memory connection strings.
pub(crate) fn is_in_memory(connection_string: &str) -> bool {
    connection_string.contains(":memory:") || connection_string.contains("mode=memory")
}

fn extract_database_name(connection_string: &str) -> String {
    if is_in_memory(connection_string) {
        return ":memory:".to_string();
    }

    let path = connection_string
        .strip_prefix("sqlite://")
        .unwrap_or(connection_string);
    let path = path.split('?').next().unwrap_or(path);

    match path.rsplit('/').next() {
        Some(filename) if !filename.is_empty() => filename.to_string(),
        _ => "main".to_string(),
    }
}

fn normalize_connection_string(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        return "sqlite::memory:".to_string();
    }
    if connection_string.starts_with("sqlite:") {
        return connection_string.to_string();
    }
    format!("sqlite://{connection_string}")
}

/// Opens the pool. Foreign keys are enforced on every connection.
pub(crate) async fn create_sqlite_pool(
    connection_string: &str,
    config: &StoreConfig,
) -> Result<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    let normalized = normalize_connection_string(connection_string);
    let options = SqliteConnectOptions::from_str(&normalized)
        .map_err(|e| DormError::configuration(format!("Invalid SQLite connection string: {e}")))?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout);

    if is_in_memory(connection_string) {
        // Keep the only connection alive for the lifetime of the pool
        pool_options = pool_options.min_connections(1).max_lifetime(None);
    }

    pool_options
        .connect_with(options)
        .await
        .map_err(|e| DormError::transport("Failed to open SQLite database", e))
}
