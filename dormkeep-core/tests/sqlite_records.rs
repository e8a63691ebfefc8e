//! Fixed-column record operations and dashboards against in-memory SQLite.

#![cfg(feature = "sqlite")]

mod common;

use dormkeep_core::{DashboardCounts, Result};
use serde_json::json;

#[tokio::test]
async fn test_view_table_and_student_list() -> Result<()> {
    let dorm = common::seeded_canonical().await?;

    let students = dorm.view_table("Student").await;
    assert_eq!(students.len(), 3);

    let listing = dorm.list_students().await;
    assert_eq!(listing.columns, vec!["ID", "Name", "Department", "Fee_Status"]);
    assert_eq!(listing.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_student_crud() -> Result<()> {
    let dorm = common::seeded_canonical().await?;

    let status = dorm.add_student(104, "Nikhil", "M", "CSE", Some(2)).await;
    assert!(status.success, "{status}");

    let duplicate = dorm.add_student(104, "Nikhil", "M", "CSE", Some(2)).await;
    assert!(!duplicate.success);
    assert!(duplicate.message.contains("Rejected by the store"), "{duplicate}");

    let status = dorm.update_student(104, "EEE", "Paid").await;
    assert!(status.success, "{status}");

    let status = dorm.delete_student(104).await;
    assert!(status.success, "{status}");
    assert_eq!(dorm.view_table("Student").await.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_delete_student_with_payments_is_refused() -> Result<()> {
    let dorm = common::seeded_canonical().await?;

    let status = dorm.delete_student(101).await;
    assert!(!status.success);
    assert!(status.message.starts_with("Error: "));
    assert_eq!(dorm.view_table("Student").await.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_add_payment_marks_student_paid() -> Result<()> {
    let dorm = common::seeded_canonical().await?;

    let status = dorm.add_payment(103, 750.0, "UPI").await;
    assert!(status.success, "{status}");
    assert_eq!(dorm.view_table("Fee_Payment").await.len(), 3);

    let listing = dorm.list_students().await;
    let fee_status = listing
        .rows
        .iter()
        .find(|row| row["ID"] == json!(103))
        .map(|row| row["Fee_Status"].clone());
    assert_eq!(fee_status, Some(json!("Paid")));
    Ok(())
}

#[tokio::test]
async fn test_add_payment_for_unknown_student_rolls_back() -> Result<()> {
    let dorm = common::seeded_canonical().await?;
    // without the foreign key the payment insert succeeds and only the
    // missing student row can stop it
    common::run(dorm.store(), &["PRAGMA foreign_keys = OFF"]).await?;

    let status = dorm.add_payment(999, 750.0, "UPI").await;
    assert!(!status.success);
    assert!(status.message.contains("No student with ID 999"), "{status}");
    assert_eq!(dorm.view_table("Fee_Payment").await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_dashboard_counts() -> Result<()> {
    let dorm = common::seeded_canonical().await?;

    let counts = dorm.dashboard_counts().await;
    assert_eq!(counts.total_students, 3);
    assert_eq!(counts.pending_fees, 2);
    assert_eq!(counts.total_rooms, 2);
    assert_eq!(counts.complaints.open, 2);
    assert_eq!(counts.complaints.in_progress, 1);
    assert_eq!(counts.complaints.resolved, 1);
    Ok(())
}

#[tokio::test]
async fn test_dashboard_counts_degrade_on_missing_tables() -> Result<()> {
    let dorm = common::dormitory(&[]).await?;
    assert_eq!(dorm.dashboard_counts().await, DashboardCounts::default());
    Ok(())
}

#[tokio::test]
async fn test_dashboard_summary_without_routine_is_reporting_error() -> Result<()> {
    let dorm = common::seeded_canonical().await?;

    let relation = dorm.dashboard_summary().await;
    assert!(relation.is_error());
    assert!(relation.is_empty());
    assert!(
        relation
            .error
            .unwrap_or_default()
            .contains("Reporting failed")
    );
    Ok(())
}
