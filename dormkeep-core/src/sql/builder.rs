//! Statement builders over resolved columns.
//!
//! The typed methods only accept [`Column`] values, which the resolver hands
//! out after checking them against the live catalog. The raw-expression
//! methods are crate-private and only ever receive text assembled from
//! [`Ident`] values.

use super::ident::{Ident, aliased};
use super::ordering::{OrderingStrategy, generate_order_by_clause};
use super::{Param, Statement};
use crate::schema::{Column, TableName};

/// SELECT assembly.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    from: String,
    projection: Vec<String>,
    joins: Vec<String>,
    filters: Vec<String>,
    group_by: Vec<String>,
    order_by: Option<String>,
    params: Vec<Param>,
}

impl SelectBuilder {
    /// `SELECT ... FROM table`.
    pub fn from_table(table: TableName) -> Self {
        Self::with_from(Ident::table(table).to_string())
    }

    /// `SELECT ... FROM table AS alias`.
    pub fn from_aliased(table: TableName, alias: &'static str) -> Self {
        Self::with_from(format!("{} AS {}", Ident::table(table), Ident::label(alias)))
    }

    fn with_from(from: String) -> Self {
        Self {
            from,
            projection: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            order_by: None,
            params: Vec::new(),
        }
    }

    /// Projects `column AS label`.
    pub fn column(self, column: Column<'_>, label: &'static str) -> Self {
        self.expression(aliased(Ident::column(column), label))
    }

    /// Projects a numeric constant under `label`, used when a field degrades.
    pub fn constant(self, value: i64, label: &'static str) -> Self {
        self.expression(aliased(value, label))
    }

    /// Adds `column = ?`.
    pub fn filter_eq(self, column: Column<'_>, value: impl Into<Param>) -> Self {
        let lhs = Ident::column(column).to_string();
        self.filter_expression(lhs, value)
    }

    /// Orders by the detected strategy.
    pub fn order_by(mut self, strategy: OrderingStrategy<'_>, descending: bool) -> Self {
        self.order_by = Some(generate_order_by_clause(strategy, descending));
        self
    }

    pub(crate) fn expression(mut self, expression: String) -> Self {
        self.projection.push(expression);
        self
    }

    pub(crate) fn join(mut self, clause: String) -> Self {
        self.joins.push(clause);
        self
    }

    pub(crate) fn filter_expression(mut self, lhs: String, value: impl Into<Param>) -> Self {
        self.filters.push(format!("{lhs} = ?"));
        self.params.push(value.into());
        self
    }

    pub(crate) fn group_by(mut self, expression: String) -> Self {
        self.group_by.push(expression);
        self
    }

    /// Renders the statement. An empty projection selects `*`.
    pub fn build(self) -> Statement {
        let projection = if self.projection.is_empty() {
            "*".to_string()
        } else {
            self.projection.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", projection, self.from);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filters.join(" AND "));
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        if let Some(order_by) = &self.order_by {
            sql.push(' ');
            sql.push_str(order_by);
        }

        Statement::with_params(sql, self.params)
    }
}

/// INSERT assembly with a per-call column list.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: TableName,
    columns: Vec<String>,
    params: Vec<Param>,
}

impl InsertBuilder {
    /// `INSERT INTO table`.
    pub const fn into(table: TableName) -> Self {
        Self {
            table,
            columns: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Adds a column and its bound value.
    pub fn value(mut self, column: Column<'_>, value: impl Into<Param>) -> Self {
        self.columns.push(Ident::column(column).to_string());
        self.params.push(value.into());
        self
    }

    /// Number of columns added so far.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when no column was added.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Renders the statement.
    pub fn build(self) -> Statement {
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            Ident::table(self.table),
            self.columns.join(", "),
            placeholders
        );
        Statement::with_params(sql, self.params)
    }
}

/// UPDATE assembly.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: TableName,
    assignments: Vec<String>,
    filters: Vec<String>,
    assignment_params: Vec<Param>,
    filter_params: Vec<Param>,
}

impl UpdateBuilder {
    /// `UPDATE table`.
    pub const fn table(table: TableName) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            filters: Vec::new(),
            assignment_params: Vec::new(),
            filter_params: Vec::new(),
        }
    }

    /// Adds `column = ?` to the SET list.
    pub fn set(mut self, column: Column<'_>, value: impl Into<Param>) -> Self {
        self.assignments
            .push(format!("{} = ?", Ident::column(column)));
        self.assignment_params.push(value.into());
        self
    }

    /// Adds `column = ?` to the WHERE clause.
    pub fn filter_eq(mut self, column: Column<'_>, value: impl Into<Param>) -> Self {
        self.filters.push(format!("{} = ?", Ident::column(column)));
        self.filter_params.push(value.into());
        self
    }

    /// Renders the statement; SET parameters bind before WHERE parameters.
    pub fn build(self) -> Statement {
        let mut sql = format!(
            "UPDATE {} SET {}",
            Ident::table(self.table),
            self.assignments.join(", ")
        );
        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filters.join(" AND "));
        }
        let mut params = self.assignment_params;
        params.extend(self.filter_params);
        Statement::with_params(sql, params)
    }
}
