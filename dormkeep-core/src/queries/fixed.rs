//! Statements over well-known column names.
//!
//! These tables are written by this application itself, so their shape is
//! fixed. Values are still always bound.

use crate::schema::TableName;
use crate::sql::{Param, SelectBuilder, Statement};

/// Fee status written when a payment is recorded.
pub const PAID: &str = "Paid";
/// Fee status counted as outstanding.
pub const PENDING: &str = "Pending";

/// `SELECT *` over a whitelisted table.
pub fn select_all(table: TableName) -> Statement {
    SelectBuilder::from_table(table).build()
}

/// Student overview ordered by id.
pub fn list_students() -> Statement {
    Statement::new(
        "SELECT `Student_ID` AS `ID`, `Name`, `Department`, `Fee_Status` FROM `Student`",
    )
}

/// Inserts a student with an explicit id and no payments.
pub fn insert_student(
    student_id: i64,
    name: &str,
    gender: &str,
    department: &str,
    room_id: Option<i64>,
) -> Statement {
    Statement::with_params(
        "INSERT INTO `Student` (`Student_ID`, `Name`, `Gender`, `Department`, `Room_ID`) \
         VALUES (?, ?, ?, ?, ?)",
        vec![
            student_id.into(),
            name.into(),
            gender.into(),
            department.into(),
            room_id.into(),
        ],
    )
}

/// Updates a student's department and fee status.
pub fn update_student(student_id: i64, department: &str, fee_status: &str) -> Statement {
    Statement::with_params(
        "UPDATE `Student` SET `Department` = ?, `Fee_Status` = ? WHERE `Student_ID` = ?",
        vec![department.into(), fee_status.into(), student_id.into()],
    )
}

/// Deletes one student by id.
pub fn delete_student(student_id: i64) -> Statement {
    Statement::with_params(
        "DELETE FROM `Student` WHERE `Student_ID` = ?",
        vec![student_id.into()],
    )
}

/// Inserts one fee payment row.
pub fn insert_payment(student_id: i64, amount: f64, payment_mode: &str) -> Statement {
    Statement::with_params(
        "INSERT INTO `Fee_Payment` (`Student_ID`, `Amount`, `Payment_Mode`) VALUES (?, ?, ?)",
        vec![student_id.into(), amount.into(), payment_mode.into()],
    )
}

/// Marks a student's fees as paid.
pub fn mark_paid(student_id: i64) -> Statement {
    Statement::with_params(
        "UPDATE `Student` SET `Fee_Status` = ? WHERE `Student_ID` = ?",
        vec![PAID.into(), student_id.into()],
    )
}

/// Number of students.
pub fn count_students() -> Statement {
    Statement::new("SELECT COUNT(*) FROM `Student`")
}

/// Students whose fees are still pending.
pub fn count_pending_fees() -> Statement {
    Statement::with_params(
        "SELECT COUNT(*) FROM `Student` WHERE `Fee_Status` = ?",
        vec![PENDING.into()],
    )
}

/// Number of rooms.
pub fn count_rooms() -> Statement {
    Statement::new("SELECT COUNT(*) FROM `Room`")
}

/// Rooms with at least one free bed.
pub fn count_available_rooms() -> Statement {
    Statement::new("SELECT COUNT(*) FROM `Room` WHERE `Current_Occupancy` < `Capacity`")
}

/// Complaints not yet resolved.
pub fn count_open_complaints() -> Statement {
    Statement::with_params(
        "SELECT COUNT(*) FROM `Complaint` WHERE `Status` = ?",
        vec![Param::from(crate::queries::complaints::INITIAL_STATUS)],
    )
}

/// Complaint counts grouped by status, as `Status`, `Total`.
pub fn complaint_status_counts() -> Statement {
    Statement::new("SELECT `Status`, COUNT(*) AS `Total` FROM `Complaint` GROUP BY `Status`")
}

/// Server-side scalar routine counting students with pending fees.
pub fn pending_fees_routine() -> Statement {
    Statement::new("SELECT CalculatePendingFees()")
}

/// Credential row for one username.
pub fn credential(username: &str) -> Statement {
    Statement::with_params(
        "SELECT `Username`, `Password`, `Role`, `Linked_ID` FROM `User_Login` WHERE `Username` = ?",
        vec![username.into()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_uses_whitelisted_identifier() {
        assert_eq!(
            select_all(TableName::FeePayment).sql(),
            "SELECT * FROM `Fee_Payment`"
        );
    }

    #[test]
    fn test_insert_student_binds_missing_room_as_null() {
        let statement = insert_student(5, "Asha", "F", "CSE", None);
        assert_eq!(statement.params().len(), 5);
        assert_eq!(statement.params()[4], Param::Null);
    }

    #[test]
    fn test_update_student_parameter_order() {
        let statement = update_student(5, "ECE", "Pending");
        assert_eq!(
            statement.params(),
            &[
                Param::Text("ECE".to_string()),
                Param::Text("Pending".to_string()),
                Param::Int(5)
            ]
        );
    }

    #[test]
    fn test_credential_lookup_is_parameterized() {
        let statement = credential("alice' OR '1'='1");
        assert!(!statement.sql().contains("alice"));
        assert_eq!(statement.params().len(), 1);
    }

    #[test]
    fn test_placeholder_counts_match_params() {
        for statement in [
            insert_student(1, "a", "b", "c", Some(2)),
            update_student(1, "a", "b"),
            delete_student(1),
            insert_payment(1, 10.0, "UPI"),
            mark_paid(1),
            count_pending_fees(),
            count_open_complaints(),
            credential("a"),
        ] {
            assert_eq!(
                statement.sql().matches('?').count(),
                statement.params().len(),
                "{}",
                statement.sql()
            );
        }
    }
}
