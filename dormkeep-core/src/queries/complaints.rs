//! Complaint statements over resolved columns.

use crate::Result;
use crate::schema::fields::{complaint, labels};
use crate::schema::{ResolvedColumnMap, TableName};
use crate::sql::{InsertBuilder, SelectBuilder, Statement, UpdateBuilder, detect_ordering_strategy};

/// Status given to newly raised complaints.
pub const INITIAL_STATUS: &str = "Open";

/// Stored routine that records a complaint server-side.
pub const RAISE_COMPLAINT_ROUTINE: &str = "CALL RaiseComplaint(?, ?)";

/// Most-recent-first complaint listing, optionally for one student.
///
/// The text and status columns are omitted when absent. The recorded-at
/// column is projected as `Created_At` when present and drives the order;
/// otherwise the primary key does.
///
/// # Errors
/// Returns a schema resolution error when the complaint id or the student
/// reference cannot be resolved.
pub fn list(map: &ResolvedColumnMap<'_>, student_id: Option<i64>) -> Result<Statement> {
    let id = map.required(&complaint::ID)?;
    let student = map.required(&complaint::STUDENT)?;
    let ordering = detect_ordering_strategy(map, &complaint::RECORDED_AT, &complaint::ID)?;

    let mut select = SelectBuilder::from_table(TableName::Complaint)
        .column(id, labels::COMPLAINT_ID)
        .column(student, labels::STUDENT_ID);
    if let Some(text) = map.optional(&complaint::TEXT) {
        select = select.column(text, labels::TEXT);
    }
    if let Some(status) = map.optional(&complaint::STATUS) {
        select = select.column(status, labels::STATUS);
    }
    if ordering.is_timestamp() {
        select = select.column(ordering.column(), labels::CREATED_AT);
    }
    if let Some(student_id) = student_id {
        select = select.filter_eq(student, student_id);
    }

    Ok(select.order_by(ordering, true).build())
}

/// Call of the server-side complaint routine.
pub fn raise_routine(student_id: i64, text: &str) -> Statement {
    Statement::with_params(RAISE_COMPLAINT_ROUTINE, vec![student_id.into(), text.into()])
}

/// Direct insert used when the routine is unavailable.
///
/// The text is stored only if a text column exists, and the status only if
/// a status column exists.
///
/// # Errors
/// Returns a schema resolution error when the student reference cannot be
/// resolved.
pub fn insert(map: &ResolvedColumnMap<'_>, student_id: i64, text: &str) -> Result<Statement> {
    let student = map.required(&complaint::STUDENT)?;

    let mut insert = InsertBuilder::into(TableName::Complaint).value(student, student_id);
    if let Some(column) = map.optional(&complaint::TEXT) {
        insert = insert.value(column, text);
    }
    if let Some(column) = map.optional(&complaint::STATUS) {
        insert = insert.value(column, INITIAL_STATUS);
    }

    Ok(insert.build())
}

/// Status change for one complaint.
///
/// # Errors
/// Returns a schema resolution error when the complaint id or the status
/// column cannot be resolved.
pub fn update_status(
    map: &ResolvedColumnMap<'_>,
    complaint_id: i64,
    status: &str,
) -> Result<Statement> {
    let id = map.required(&complaint::ID)?;
    let column = map.required(&complaint::STATUS)?;

    Ok(UpdateBuilder::table(TableName::Complaint)
        .set(column, status)
        .filter_eq(id, complaint_id)
        .build())
}
