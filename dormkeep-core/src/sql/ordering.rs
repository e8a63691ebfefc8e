//! Most-recent-first ordering detection.
//!
//! # Ordering Strategy Detection
//!
//! The detection priority is:
//! 1. A recorded-at timestamp column (true recency)
//! 2. The primary key (insertion order for auto-increment keys)
//!
//! There is no unordered fallback: listings without a usable key cannot be
//! ordered and are rejected as a schema resolution failure.

use crate::error::Result;
use crate::schema::{Column, ResolvedColumnMap, SynonymSpec};

/// How a listing is put in most-recent-first order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingStrategy<'a> {
    /// Timestamp column ordering
    Timestamp { column: Column<'a> },
    /// Primary key ordering
    PrimaryKey { column: Column<'a> },
}

impl<'a> OrderingStrategy<'a> {
    /// Column the listing is sorted on.
    pub const fn column(self) -> Column<'a> {
        match self {
            Self::Timestamp { column } | Self::PrimaryKey { column } => column,
        }
    }

    /// True when the listing carries a timestamp.
    pub const fn is_timestamp(self) -> bool {
        matches!(self, Self::Timestamp { .. })
    }
}

/// Detects the best ordering for a table from its resolved columns.
///
/// # Errors
/// Returns [`crate::DormError::SchemaResolution`] when neither a timestamp nor
/// the key resolves.
pub fn detect_ordering_strategy<'a>(
    map: &ResolvedColumnMap<'a>,
    timestamp: &SynonymSpec<'_>,
    key: &SynonymSpec<'_>,
) -> Result<OrderingStrategy<'a>> {
    if let Some(column) = map.optional(timestamp) {
        tracing::debug!(
            "Detected timestamp ordering for {}: {}",
            map.table(),
            column
        );
        return Ok(OrderingStrategy::Timestamp { column });
    }

    let column = map.required(key)?;
    tracing::debug!(
        "No timestamp column on {}, ordering by primary key {}",
        map.table(),
        column
    );
    Ok(OrderingStrategy::PrimaryKey { column })
}

/// Generates an ORDER BY clause for the given ordering strategy.
pub fn generate_order_by_clause(strategy: OrderingStrategy<'_>, descending: bool) -> String {
    let direction = if descending { "DESC" } else { "ASC" };
    format!(
        "ORDER BY {} {}",
        super::Ident::column(strategy.column()),
        direction
    )
}
