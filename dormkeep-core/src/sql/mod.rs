//! Parameterized statement assembly.
//!
//! # Module Structure
//! - `ident`: identifier quoting for names that are already trusted
//! - `builder`: SELECT / INSERT / UPDATE builders over resolved columns
//! - `ordering`: most-recent-first ordering detection
//!
//! # Injection safety
//! Identifiers reach the SQL text only as [`TableName`](crate::schema::TableName)
//! values, [`Column`](crate::schema::Column) values produced by the resolver,
//! or static output labels. Data values always travel as bound parameters.

pub mod builder;
pub mod ident;
pub mod ordering;

use serde::Serialize;

pub use builder::{InsertBuilder, SelectBuilder, UpdateBuilder};
pub use ident::Ident;
pub use ordering::{OrderingStrategy, detect_ordering_strategy};

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Param {
    /// Integer
    Int(i64),
    /// Floating-point number
    Float(f64),
    /// Text
    Text(String),
    /// SQL `NULL`
    Null,
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// SQL text with `?` placeholders plus the values bound to them, in order.
///
/// The `?` placeholder style is understood by both MySQL and SQLite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    sql: String,
    params: Vec<Param>,
}

impl Statement {
    /// Statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Statement with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound parameters, in placeholder order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Parameter values may be secrets; only their count is shown
        write!(f, "{} [{} params]", self.sql, self.params.len())
    }
}
