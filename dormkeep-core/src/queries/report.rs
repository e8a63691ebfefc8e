//! The per-student detail join.
//!
//! One row per student: the student's resolvable fields, the room number
//! through an outer join, the payment total and the complaint count. Each
//! related portion degrades independently when its columns are missing.
//! Payments are summed in a derived table first so that joining complaints
//! cannot multiply the total.

use crate::Result;
use crate::schema::fields::{complaint, fee_payment, labels, room, student};
use crate::schema::{ResolvedColumnMap, TableName};
use crate::sql::ident::{aliased, qualified};
use crate::sql::{Ident, SelectBuilder, Statement};

const STUDENT_ALIAS: &str = "s";
const ROOM_ALIAS: &str = "r";
const PAYMENTS_ALIAS: &str = "f";
const COMPLAINT_ALIAS: &str = "c";
const PAYMENT_REF: &str = "Ref_ID";
const PAYMENT_TOTAL: &str = "Paid_Total";

/// Resolved column maps for the four tables of the report.
#[derive(Debug, Clone)]
pub struct ReportColumns<'a> {
    /// `Student` columns
    pub student: ResolvedColumnMap<'a>,
    /// `Room` columns
    pub room: ResolvedColumnMap<'a>,
    /// `Fee_Payment` columns
    pub fee_payment: ResolvedColumnMap<'a>,
    /// `Complaint` columns
    pub complaint: ResolvedColumnMap<'a>,
}

/// Builds the detail statement for `student_id`.
///
/// # Errors
/// Returns a schema resolution error when the student's primary key cannot
/// be resolved. Every other missing column degrades.
pub fn student_details(columns: &ReportColumns<'_>, student_id: i64) -> Result<Statement> {
    let s_id = columns.student.required(&student::ID)?;
    let s_key = qualified(STUDENT_ALIAS, s_id);

    let mut select = SelectBuilder::from_aliased(TableName::Student, STUDENT_ALIAS)
        .expression(aliased(&s_key, labels::STUDENT_ID))
        .group_by(s_key.clone());

    let optional_fields = [
        (student::NAME, labels::NAME),
        (student::GENDER, labels::GENDER),
        (student::DEPARTMENT, labels::DEPARTMENT),
        (student::ROOM, labels::ROOM_ID),
        (student::FEE_STATUS, labels::FEE_STATUS),
    ];
    for (spec, label) in optional_fields {
        if let Some(column) = columns.student.optional(&spec) {
            let expression = qualified(STUDENT_ALIAS, column);
            select = select
                .expression(aliased(&expression, label))
                .group_by(expression);
        }
    }

    // Room: needs the student's room reference, the room key and the number
    match (
        columns.student.optional(&student::ROOM),
        columns.room.optional(&room::ID),
        columns.room.optional(&room::NUMBER),
    ) {
        (Some(s_room), Some(r_id), Some(r_number)) => {
            let number = qualified(ROOM_ALIAS, r_number);
            select = select
                .join(format!(
                    "LEFT JOIN {} AS {} ON {} = {}",
                    Ident::table(TableName::Room),
                    Ident::label(ROOM_ALIAS),
                    qualified(STUDENT_ALIAS, s_room),
                    qualified(ROOM_ALIAS, r_id)
                ))
                .expression(aliased(&number, labels::ROOM_NUMBER))
                .group_by(number);
        }
        _ => tracing::debug!("Room portion of the student report degraded"),
    }

    // Payments: pre-aggregated per student
    match (
        columns.fee_payment.optional(&fee_payment::STUDENT),
        columns.fee_payment.optional(&fee_payment::AMOUNT),
    ) {
        (Some(f_student), Some(f_amount)) => {
            let reference = Ident::column(f_student);
            select = select
                .join(format!(
                    "LEFT JOIN (SELECT {} AS {}, SUM({}) AS {} FROM {} GROUP BY {}) AS {} ON {} = {}.{}",
                    reference,
                    Ident::label(PAYMENT_REF),
                    Ident::column(f_amount),
                    Ident::label(PAYMENT_TOTAL),
                    Ident::table(TableName::FeePayment),
                    reference,
                    Ident::label(PAYMENTS_ALIAS),
                    s_key,
                    Ident::label(PAYMENTS_ALIAS),
                    Ident::label(PAYMENT_REF)
                ))
                .expression(aliased(
                    format!(
                        "COALESCE(MAX({}.{}), 0)",
                        Ident::label(PAYMENTS_ALIAS),
                        Ident::label(PAYMENT_TOTAL)
                    ),
                    labels::TOTAL_FEES_PAID,
                ));
        }
        _ => {
            tracing::debug!("Payment total of the student report degraded to 0");
            select = select.constant(0, labels::TOTAL_FEES_PAID);
        }
    }

    // Complaints: distinct count
    match (
        columns.complaint.optional(&complaint::ID),
        columns.complaint.optional(&complaint::STUDENT),
    ) {
        (Some(c_id), Some(c_student)) => {
            select = select
                .join(format!(
                    "LEFT JOIN {} AS {} ON {} = {}",
                    Ident::table(TableName::Complaint),
                    Ident::label(COMPLAINT_ALIAS),
                    s_key,
                    qualified(COMPLAINT_ALIAS, c_student)
                ))
                .expression(aliased(
                    format!("COUNT(DISTINCT {})", qualified(COMPLAINT_ALIAS, c_id)),
                    labels::TOTAL_COMPLAINTS,
                ));
        }
        _ => {
            tracing::debug!("Complaint count of the student report degraded to 0");
            select = select.constant(0, labels::TOTAL_COMPLAINTS);
        }
    }

    Ok(select.filter_expression(s_key, student_id).build())
}
