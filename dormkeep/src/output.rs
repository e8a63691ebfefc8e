//! Rendering of record results on stdout.

use clap::ValueEnum;
use dormkeep_core::{Relation, Status};
use serde_json::Value as JsonValue;
use std::fmt::Write as _;

/// How relations are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain-text columns
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Renders a relation. Error markers are rendered as the message alone.
pub fn render_relation(relation: &Relation, format: OutputFormat) -> anyhow::Result<String> {
    if let Some(error) = &relation.error
        && format == OutputFormat::Table
    {
        return Ok(format!("Error: {error}"));
    }
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(relation)?),
        OutputFormat::Table => Ok(render_table(relation)),
    }
}

/// Renders a write outcome.
pub fn render_status(status: &Status, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(status)?),
        OutputFormat::Table => Ok(status.message.clone()),
    }
}

fn cell(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn render_table(relation: &Relation) -> String {
    if relation.is_empty() {
        return "(no rows)".to_string();
    }

    let cells: Vec<Vec<String>> = relation
        .rows
        .iter()
        .map(|row| {
            relation
                .columns
                .iter()
                .map(|column| cell(row.get(column)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = relation
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|value| value.chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut out = String::new();
    let mut line = |values: &[String]| {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };
    line(&relation.columns);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    line(&rule);
    for row in &cells {
        line(row);
    }
    out.trim_end().to_string()
}
