//! SQLite sessions and transactions.

use crate::Result;
use crate::models::{Record, Relation};
use crate::schema::TableName;
use crate::sql::{Param, Statement};
use crate::store::{ProcedureOutcome, StoreSession, StoreTransaction, numeric_text, with_deadline};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Column, Row};
use std::time::Duration;

const COLUMNS_QUERY: &str = "SELECT UPPER(name) FROM pragma_table_info(?)";

/// One pooled SQLite connection.
pub struct SqliteSession {
    conn: PoolConnection<Sqlite>,
    timeout: Duration,
}

impl std::fmt::Debug for SqliteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSession")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SqliteSession {
    pub(crate) const fn new(conn: PoolConnection<Sqlite>, timeout: Duration) -> Self {
        Self { conn, timeout }
    }
}

#[async_trait]
impl StoreSession for SqliteSession {
    async fn column_names(&mut self, table: TableName) -> Result<Vec<String>> {
        let query = sqlx::query_scalar::<_, String>(COLUMNS_QUERY).bind(table.as_str());
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
        Ok(Box::new(SqliteTransaction { tx, timeout }))
    }
}

/// An open SQLite transaction; rolls back on drop unless committed.
pub struct SqliteTransaction<'a> {
    tx: sqlx::Transaction<'a, Sqlite>,
    timeout: Duration,
}

impl std::fmt::Debug for SqliteTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTransaction")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StoreTransaction for SqliteTransaction<'_> {
    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        tracing::debug!("Executing statement in transaction: {}", statement);
        let query = bind_params(sqlx::query(statement.sql()), statement.params());
        let done =
            with_deadline("Statement failed", self.timeout, query.execute(&mut *self.tx)).await?;
        Ok(done.rows_affected())
    }

    async fn call_procedure(&mut self, statement: &Statement) -> Result<ProcedureOutcome> {
        tracing::debug!("SQLite has no stored routines, skipping: {}", statement);
        Ok(ProcedureOutcome::Unavailable)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        with_deadline("Commit failed", this.timeout, this.tx.commit()).await
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[Param],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
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

fn rows_to_relation(rows: &[SqliteRow]) -> Relation {
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
fn extract_column_value(row: &SqliteRow, index: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(JsonValue::Null, |n| JsonValue::Number(n.into()));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map_or(JsonValue::Null, JsonValue::Number);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(JsonValue::Null, JsonValue::String);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.map_or(JsonValue::Null, |bytes| {
            JsonValue::String(String::from_utf8_lossy(&bytes).into_owned())
        });
    }
    // NUMERIC affinity values that came back as text
    if let Ok(v) = row.try_get_unchecked::<Option<String>, _>(index) {
        return v.map_or(JsonValue::Null, numeric_text);
    }

    JsonValue::Null
}
