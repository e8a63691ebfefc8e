//! MySQL connection string parsing and pool construction.

use crate::Result;
use crate::error::{DormError, redact_database_url};
use crate::store::StoreConfig;
use sqlx::MySqlPool;
use url::Url;

/// Parses a MySQL connection string into validated settings.
///
/// # Errors
/// Returns a configuration error for malformed URLs, a zero port, or
/// over-long database or user names.
pub fn parse_mysql_connection_config(connection_string: &str) -> Result<StoreConfig> {
    validate_mysql_connection_string(connection_string)?;

    let url = Url::parse(connection_string).map_err(|e| {
        DormError::configuration(format!("Invalid MySQL connection string format: {e}"))
    })?;

    let mut config = StoreConfig::new(url.host_str().unwrap_or("localhost").to_string());

    match url.port() {
        Some(0) => {
            return Err(DormError::configuration(
                "Invalid port number: must be greater than 0",
            ));
        }
        Some(port) => config = config.with_port(port),
        None => config = config.with_port(3306),
    }

    let database = url.path().trim_start_matches('/');
    if !database.is_empty() {
        if database.len() > 64 {
            return Err(DormError::configuration(
                "Database name too long: maximum 64 characters",
            ));
        }
        config = config.with_database(database.to_string());
    }

    let username = url.username();
    if !username.is_empty() {
        if username.len() > 32 {
            return Err(DormError::configuration(
                "Username too long: maximum 32 characters for MySQL",
            ));
        }
        config = config.with_username(username.to_string());
    }

    config.apply_query_pairs(&url);
    config.validate()?;

    Ok(config)
}

/// Validates the MySQL connection string format.
///
/// # Errors
/// Returns error if the string is not a `mysql://` URL with a host.
pub fn validate_mysql_connection_string(connection_string: &str) -> Result<()> {
    let url = Url::parse(connection_string).map_err(|e| {
        DormError::configuration(format!("Invalid MySQL connection string format: {e}"))
    })?;

    if url.scheme() != "mysql" {
        return Err(DormError::configuration(
            "Connection string must use mysql:// scheme",
        ));
    }

    if url.host_str().is_none() {
        return Err(DormError::configuration(
            "Connection string must specify a host",
        ));
    }

    Ok(())
}

/// Creates the connection pool.
///
/// The server-side `max_execution_time` is set from `statement_timeout` on
/// every new connection, and the session time zone is pinned to UTC.
pub(crate) fn create_mysql_connection_pool(
    connection_string: &str,
    config: &StoreConfig,
) -> Result<MySqlPool> {
    use sqlx::Executor;

    let statement_timeout_ms = config.statement_timeout.as_millis();

    let pool = sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(config.max_connections.min(100))
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .test_before_acquire(true)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                conn.execute(
                    format!("SET SESSION max_execution_time = {statement_timeout_ms}").as_str(),
                )
                .await?;
                conn.execute("SET time_zone = '+00:00'").await?;
                Ok(())
            })
        })
        .connect_lazy(connection_string)
        .map_err(|e| {
            DormError::transport(
                format!(
                    "Failed to create MySQL connection pool to {}",
                    redact_database_url(connection_string)
                ),
                e,
            )
        })?;

    Ok(pool)
}
