//! Result shapes handed to the presentation layer.
//!
//! Public record operations never return `Err`. Reads produce a [`Relation`]
//! that may carry an error marker, writes produce a [`Status`].

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One row, keyed by output column label.
pub type Record = serde_json::Map<String, JsonValue>;

/// An ordered sequence of uniform-shape records.
///
/// `columns` keeps the projection order of the statement that produced the
/// rows. It is empty when the statement returned no rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Column labels in projection order
    pub columns: Vec<String>,
    /// Rows keyed by column label
    pub rows: Vec<Record>,
    /// Set when the read failed; `rows` is then empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Relation {
    /// Relation with the given projection and rows.
    pub const fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self {
            columns,
            rows,
            error: None,
        }
    }

    /// Empty relation carrying an error marker.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when the read failed.
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Values of one column, in row order.
    pub fn column<'r>(&'r self, label: &'r str) -> impl Iterator<Item = &'r JsonValue> + 'r {
        self.rows
            .iter()
            .map(move |row| row.get(label).unwrap_or(&JsonValue::Null))
    }
}

/// Outcome of a write operation, as a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// True when the write took effect
    pub success: bool,
    /// Message shown to the user
    pub message: String,
}

impl Status {
    /// Successful write.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Failed write.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// A verified login. The stored secret is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Login name as stored
    pub username: String,
    /// Role shown in the greeting
    pub role: String,
    /// Student or staff id the login belongs to
    pub linked_id: Option<i64>,
}

/// Complaint totals by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintTally {
    /// Complaints with status `Open`
    pub open: u64,
    /// Complaints with status `In Progress`
    pub in_progress: u64,
    /// Complaints with status `Resolved`
    pub resolved: u64,
}

impl ComplaintTally {
    /// Sets the bucket named by `status`. Unknown statuses are ignored.
    pub fn record(&mut self, status: &str, count: u64) {
        match status {
            "Open" => self.open = count,
            "In Progress" => self.in_progress = count,
            "Resolved" => self.resolved = count,
            _ => {}
        }
    }
}

/// Headline counters. Each one degrades to 0 on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCounts {
    /// Number of students
    pub total_students: u64,
    /// Students whose fees are pending
    pub pending_fees: u64,
    /// Number of rooms
    pub total_rooms: u64,
    /// Complaints by status
    pub complaints: ComplaintTally,
}

impl std::fmt::Display for DashboardCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total Students: {}", self.total_students)?;
        writeln!(f, "Pending Fees: {}", self.pending_fees)?;
        writeln!(f, "Total Rooms: {}", self.total_rooms)?;
        writeln!(f, "Complaints:")?;
        writeln!(f, "Open: {}", self.complaints.open)?;
        writeln!(f, "In Progress: {}", self.complaints.in_progress)?;
        write!(f, "Resolved: {}", self.complaints.resolved)
    }
}

/// Interprets a driver value as a non-negative count.
pub(crate) fn as_count(value: &JsonValue) -> u64 {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        JsonValue::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
