//! Identifier quoting.
//!
//! An [`Ident`] can only be built from a known table, a column returned by
//! the resolver, or a static label compiled into the crate. Quoting uses
//! backticks, which both MySQL and SQLite accept; embedded backticks are
//! doubled.

use crate::schema::{Column, TableName};

/// A quoted SQL identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'a>(&'a str);

impl Ident<'static> {
    /// Identifier of a known table.
    pub const fn table(table: TableName) -> Self {
        Self(table.as_str())
    }

    /// Identifier of a compiled-in output label or table alias.
    pub const fn label(label: &'static str) -> Self {
        Self(label)
    }
}

impl<'a> Ident<'a> {
    /// Identifier of a resolved column.
    pub const fn column(column: Column<'a>) -> Self {
        Self(column.name())
    }
}

impl std::fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}`", self.0.replace('`', "``"))
    }
}

/// `alias.column` with both parts quoted.
pub fn qualified(alias: &'static str, column: Column<'_>) -> String {
    format!("{}.{}", Ident::label(alias), Ident::column(column))
}

/// `expression AS label`.
pub fn aliased(expression: impl std::fmt::Display, label: &'static str) -> String {
    format!("{} AS {}", expression, Ident::label(label))
}
