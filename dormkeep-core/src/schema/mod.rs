//! Live schema discovery and synonym-based column resolution.
//!
//! # Module Structure
//! - `tables`: the closed set of tables the record layer knows about
//! - `catalog`: fresh, fail-open column discovery through a store session
//! - `resolver`: pure synonym matching against an already-fetched [`ColumnSet`]
//! - `fields`: the synonym lists for every logical field
//!
//! Discovery and decision are kept apart: the catalog performs I/O and never
//! fails, the resolver performs no I/O and is deterministic.

pub mod catalog;
pub mod fields;
pub mod resolver;
pub mod tables;

use std::collections::HashSet;

pub use catalog::{columns_of, resolve_table};
pub use resolver::{Column, Resolution, ResolvedColumnMap, SynonymSpec, resolve};
pub use tables::TableName;

/// Uppercased physical column names of one table.
///
/// A `ColumnSet` is only valid for the operation that fetched it; it is
/// never cached or shared between operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    names: HashSet<String>,
}

impl ColumnSet {
    /// Builds a set from raw column names, uppercasing each one.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().to_uppercase())
                .collect(),
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_uppercase())
    }

    /// Number of distinct columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when discovery found nothing (or failed).
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
