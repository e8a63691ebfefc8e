//! Pooled MySQL sessions and transactions.

use crate::Result;
use crate::error::DormError;
use crate::models::{Record, Relation};
use crate::schema::TableName;
use crate::sql::{Param, Statement};
use crate::store::{ProcedureOutcome, StoreSession, StoreTransaction, numeric_text, with_deadline};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySql, MySqlArguments, MySqlDatabaseError, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::{Column, Row};
use std::time::Duration;

/// `ER_SP_DOES_NOT_EXIST`
const ROUTINE_DOES_NOT_EXIST: u16 = 1305;
/// `ER_SP_WRONG_NO_OF_ARGS`
const ROUTINE_WRONG_ARGUMENT_COUNT: u16 = 1318;

/// Column discovery through `INFORMATION_SCHEMA`, scoped to the configured
/// schema or the connection's current one.
const COLUMNS_QUERY: &str = r"
    SELECT UPPER(CAST(COLUMN_NAME AS CHAR)) AS COLUMN_NAME
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_SCHEMA = COALESCE(?, DATABASE())
    AND TABLE_NAME = ?
";

/// One pooled MySQL connection.
pub struct MySqlSession {
    conn: PoolConnection<MySql>,
    database: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for MySqlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSession")
            .field("database", &self.database)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MySqlSession {
    pub(crate) const fn new(
        conn: PoolConnection<MySql>,
        database: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            conn,
            database,
            timeout,
        }
    }
}

#[async_trait]
impl StoreSession for MySqlSession {
    async fn column_names(&mut self, table: TableName) -> Result<Vec<String>> {
        let query = sqlx::query_scalar::<_, String>(COLUMNS_QUERY)
            .bind(self.database.clone())
            .bind(table.as_str());
        let context = format!("Failed to list columns of table '{table}'");
        with_deadline(&context, self.timeout, query.fetch_all(&mut *self.conn)).await
    }

    async fn fetch_all(&mut self, statement: &Statement) -> Result<Relation> {
        tracing::debug!("Executing query: {}", statement);
        let query = bind_params(sqlx::query(statement.sql()), statement.params());
        let rows = with_deadline("Query failed", self.timeout, query.fetch_all(&mut *self.conn))
            .await?;
        Ok(rows_to_relation(&rows))
    }

    async fn fetch_scalar(&mut self, statement: &Statement) -> Result<JsonValue> {
        tracing::debug!("Executing scalar query: {}", statement);
        let query = bind_params(sqlx::query(statement.sql()), statement.params());
        let row = with_deadline(
            "Scalar query failed",
            self.timeout,
            query.fetch_optional(&mut *self.conn),
        )
        .await?;
        Ok(row.map_or(JsonValue::Null, |row| extract_column_value(&row, 0)))
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        tracing::debug!("Executing statement: {}", statement);
        let query = bind_params(sqlx::query(statement.sql()), statement.params());
        let done =
            with_deadline("Statement failed", self.timeout, query.execute(&mut *self.conn)).await?;
        Ok(done.rows_affected())
    }

    async fn begin<'a>(&'a mut self) -> Result<Box<dyn StoreTransaction + 'a>> {
        let timeout = self.timeout;
        let tx = with_deadline(
            "Failed to begin transaction",
            timeout,
            sqlx::Connection::begin(&mut *self.conn),
        )
        .await?;
        tracing::trace!("Transaction started");
        Ok(Box::new(MySqlTransaction { tx, timeout }))
    }
}

/// An open MySQL transaction; rolls back on drop unless committed.
pub struct MySqlTransaction<'a> {
    tx: sqlx::Transaction<'a, MySql>,
    timeout: Duration,
}

impl std::fmt::Debug for MySqlTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlTransaction")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StoreTransaction for MySqlTransaction<'_> {
    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        tracing::debug!("Executing statement in transaction: {}", statement);
        let query = bind_params(sqlx::query(statement.sql()), statement.params());
        let done =
            with_deadline("Statement failed", self.timeout, query.execute(&mut *self.tx)).await?;
        Ok(done.rows_affected())
    }

    async fn call_procedure(&mut self, statement: &Statement) -> Result<ProcedureOutcome> {
        tracing::debug!("Calling routine: {}", statement);
        let query = bind_params(sqlx::query(statement.sql()), statement.params());

        match tokio::time::timeout(self.timeout, query.execute(&mut *self.tx)).await {
            Err(_) => Err(DormError::timeout("Routine call", self.timeout)),
            Ok(Ok(_)) => Ok(ProcedureOutcome::Completed),
            Ok(Err(error)) if is_routine_unavailable(&error) => {
                tracing::info!("Routine unavailable, caller may fall back: {}", error);
                Ok(ProcedureOutcome::Unavailable)
            }
            Ok(Err(error)) => Err(DormError::from_routine("Routine call failed", error)),
        }
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        with_deadline("Commit failed", this.timeout, this.tx.commit()).await?;
        tracing::trace!("Transaction committed");
        Ok(())
    }
}

/// True when the server reports the routine as absent or called with the
/// wrong number of arguments.
fn is_routine_unavailable(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db
            .try_downcast_ref::<MySqlDatabaseError>()
            .is_some_and(|e| {
                matches!(
                    e.number(),
                    ROUTINE_DOES_NOT_EXIST | ROUTINE_WRONG_ARGUMENT_COUNT
                )
            }),
        _ => false,
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[Param],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            Param::Int(v) => query.bind(*v),
            Param::Float(v) => query.bind(*v),
            Param::Text(v) => query.bind(v.clone()),
            Param::Null => query.bind(None::<String>),
        };
    }
    query
}

fn rows_to_relation(rows: &[MySqlRow]) -> Relation {
    let columns: Vec<String> = rows.first().map_or_else(Vec::new, |row| {
        row.columns().iter().map(|c| c.name().to_string()).collect()
    });

    let records = rows
        .iter()
        .map(|row| {
            row.columns()
                .iter()
                .map(|column| {
                    (
                        column.name().to_string(),
                        extract_column_value(row, column.ordinal()),
                    )
                })
                .collect::<Record>()
        })
        .collect();

    Relation::new(columns, records)
}

/// Extracts a column value as a JSON value.
fn extract_column_value(row: &MySqlRow, index: usize) -> JsonValue {
    // Try different types in order of likelihood
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(JsonValue::Null, JsonValue::String);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(JsonValue::Null, |n| JsonValue::Number(n.into()));
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(index) {
        return v.map_or(JsonValue::Null, |n| JsonValue::Number(n.into()));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map_or(JsonValue::Null, JsonValue::Number);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(index) {
        return v.map_or(JsonValue::Null, |ts| JsonValue::String(ts.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(index) {
        return v.map_or(JsonValue::Null, |d| JsonValue::String(d.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index) {
        return v.map_or(JsonValue::Null, |ts| JsonValue::String(ts.to_rfc3339()));
    }
    // DECIMAL travels as text in the binary protocol
    if let Ok(v) = row.try_get_unchecked::<Option<String>, _>(index) {
        return v.map_or(JsonValue::Null, numeric_text);
    }

    JsonValue::Null
}
