//! MySQL integration tests.
//!
//! This test suite covers:
//! - Column discovery through INFORMATION_SCHEMA
//! - Complaint raising through the `RaiseComplaint` routine
//! - The direct-insert fallback when the routine is absent
//! - Routine data errors surfacing without a fallback insert
//! - Routine `SIGNAL`s reported as conflicts, not transport failures
//! - The `CalculatePendingFees()` scalar routine and DECIMAL sums

#![cfg(feature = "mysql")]

use dormkeep_core::schema::{TableName, columns_of};
use dormkeep_core::{DormError, Dormitory, Result, create_store};
use serde_json::json;
use sqlx::MySqlPool;
use std::time::Duration;
use testcontainers_modules::mysql::Mysql;
use testcontainers_modules::testcontainers::ContainerAsync;
use testcontainers_modules::testcontainers::runners::AsyncRunner;

const SCHEMA: &[&str] = &[
    "CREATE TABLE Room (
        Room_ID INT PRIMARY KEY,
        Room_Number VARCHAR(16) NOT NULL,
        Capacity INT NOT NULL,
        Current_Occupancy INT NOT NULL DEFAULT 0
    )",
    "CREATE TABLE Student (
        Student_ID INT PRIMARY KEY,
        Name VARCHAR(100) NOT NULL,
        Gender VARCHAR(8),
        Department VARCHAR(32),
        Room_ID INT,
        Fee_Status VARCHAR(16) NOT NULL DEFAULT 'Pending',
        FOREIGN KEY (Room_ID) REFERENCES Room(Room_ID)
    )",
    "CREATE TABLE Fee_Payment (
        Payment_ID INT AUTO_INCREMENT PRIMARY KEY,
        Student_ID INT NOT NULL,
        Amount DECIMAL(10, 2) NOT NULL,
        Payment_Mode VARCHAR(16),
        FOREIGN KEY (Student_ID) REFERENCES Student(Student_ID)
    )",
    "CREATE TABLE Complaint (
        Complaint_ID INT AUTO_INCREMENT PRIMARY KEY,
        Student_ID INT NOT NULL,
        Text VARCHAR(255),
        Status VARCHAR(16) NOT NULL DEFAULT 'Open',
        Created_At TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),
        FOREIGN KEY (Student_ID) REFERENCES Student(Student_ID)
    )",
    "INSERT INTO Room VALUES (1, 'A-101', 2, 1)",
    "INSERT INTO Student VALUES (101, 'Asha', 'F', 'CSE', 1, 'Pending'), (102, 'Ravi', 'M', 'ECE', 1, 'Pending')",
    "INSERT INTO Fee_Payment (Student_ID, Amount, Payment_Mode) VALUES (101, 1000.00, 'UPI'), (101, 500.50, 'Cash')",
    "CREATE PROCEDURE RaiseComplaint(IN sid INT, IN body VARCHAR(255))
     BEGIN
        INSERT INTO Complaint (Student_ID, Text, Status) VALUES (sid, CONCAT('[routine] ', body), 'Open');
     END",
    "CREATE FUNCTION CalculatePendingFees() RETURNS INT READS SQL DATA
     BEGIN
        DECLARE n INT;
        SELECT COUNT(*) INTO n FROM Student WHERE Fee_Status = 'Pending';
        RETURN n;
     END",
];

/// Wait for MySQL to accept queries
async fn wait_for_mysql_ready(database_url: &str, max_attempts: u32) -> Result<()> {
    for attempt in 1..=max_attempts {
        if let Ok(pool) = MySqlPool::connect(database_url).await {
            let ready = sqlx::query("SELECT 1").fetch_one(&pool).await.is_ok();
            pool.close().await;
            if ready {
                return Ok(());
            }
        }
        if attempt < max_attempts {
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }
    Err(DormError::transport(
        "MySQL did not become ready",
        std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("gave up after {max_attempts} attempts"),
        ),
    ))
}

/// Starts a container with the dormitory schema and both routines.
async fn start_mysql() -> (ContainerAsync<Mysql>, String) {
    let mysql = Mysql::default().start().await.unwrap();
    let port = mysql.get_host_port_ipv4(3306).await.unwrap();
    let database_url = format!("mysql://root@127.0.0.1:{port}/test");
    wait_for_mysql_ready(&database_url, 60).await.unwrap();

    let pool = MySqlPool::connect(&database_url).await.unwrap();
    for &statement in SCHEMA {
        // routine bodies need the text protocol
        sqlx::raw_sql(statement).execute(&pool).await.unwrap();
    }
    pool.close().await;

    (mysql, database_url)
}

async fn execute_raw(database_url: &str, sql: &'static str) {
    let pool = MySqlPool::connect(database_url).await.unwrap();
    sqlx::raw_sql(sql).execute(&pool).await.unwrap();
    pool.close().await;
}

#[tokio::test]
async fn test_mysql_information_schema_discovery() -> Result<()> {
    let (_mysql, database_url) = start_mysql().await;
    let store = create_store(&database_url).await?;

    let mut session = store.acquire().await?;
    let columns = columns_of(session.as_mut(), TableName::Complaint).await;
    assert_eq!(columns.len(), 5);
    assert!(columns.contains("COMPLAINT_ID"));
    assert!(columns.contains("created_at"));

    let unknown = columns_of(session.as_mut(), TableName::Staff).await;
    assert!(unknown.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mysql_raise_complaint_through_routine() -> Result<()> {
    let (_mysql, database_url) = start_mysql().await;
    let dorm = Dormitory::new(create_store(&database_url).await?);

    let (status, refreshed) = dorm.raise_complaint(101, "Broken fan").await;
    assert!(status.success, "{status}");
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed.rows[0]["Text"], json!("[routine] Broken fan"));
    Ok(())
}

#[tokio::test]
async fn test_mysql_raise_complaint_falls_back_when_routine_absent() -> Result<()> {
    let (_mysql, database_url) = start_mysql().await;
    execute_raw(&database_url, "DROP PROCEDURE RaiseComplaint").await;
    let dorm = Dormitory::new(create_store(&database_url).await?);

    let (status, refreshed) = dorm.raise_complaint(101, "Broken fan").await;
    assert!(status.success, "{status}");
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed.rows[0]["Text"], json!("Broken fan"));
    assert_eq!(refreshed.rows[0]["Status"], json!("Open"));
    Ok(())
}

#[tokio::test]
async fn test_mysql_routine_data_error_is_not_masked() -> Result<()> {
    let (_mysql, database_url) = start_mysql().await;
    let dorm = Dormitory::new(create_store(&database_url).await?);

    // the routine exists but violates the foreign key
    let (status, _) = dorm.raise_complaint(999, "Ghost complaint").await;
    assert!(!status.success);
    assert!(status.message.contains("Rejected by the store"), "{status}");
    assert!(dorm.view_complaints(None).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mysql_routine_signal_is_a_conflict() -> Result<()> {
    let (_mysql, database_url) = start_mysql().await;
    execute_raw(&database_url, "DROP PROCEDURE RaiseComplaint").await;
    execute_raw(
        &database_url,
        "CREATE PROCEDURE RaiseComplaint(IN sid INT, IN body VARCHAR(255))
         BEGIN
            SIGNAL SQLSTATE '45000' SET MESSAGE_TEXT = 'Complaints are closed';
         END",
    )
    .await;
    let dorm = Dormitory::new(create_store(&database_url).await?);

    let (status, refreshed) = dorm.raise_complaint(101, "Broken fan").await;
    assert!(!status.success);
    assert!(status.message.contains("Rejected by the store"), "{status}");
    assert!(!status.message.contains("transport"), "{status}");
    assert!(!refreshed.is_error(), "{:?}", refreshed.error);
    assert!(refreshed.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mysql_complaints_newest_first() -> Result<()> {
    let (_mysql, database_url) = start_mysql().await;
    let dorm = Dormitory::new(create_store(&database_url).await?);

    for text in ["first", "second", "third"] {
        let (status, _) = dorm.raise_complaint(102, text).await;
        assert!(status.success, "{status}");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let relation = dorm.view_complaints(Some(102)).await;
    let texts: Vec<_> = relation.column("Text").cloned().collect();
    assert_eq!(
        texts,
        vec![
            json!("[routine] third"),
            json!("[routine] second"),
            json!("[routine] first")
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_mysql_dashboard_summary_and_decimal_sum() -> Result<()> {
    let (_mysql, database_url) = start_mysql().await;
    let dorm = Dormitory::new(create_store(&database_url).await?);

    let summary = dorm.dashboard_summary().await;
    assert!(!summary.is_error(), "{:?}", summary.error);
    assert_eq!(summary.rows[0]["Pending Fees Students"], json!(2));
    assert_eq!(summary.rows[0]["Available Rooms"], json!(1));

    let details = dorm.student_details(101).await;
    assert!(!details.is_error(), "{:?}", details.error);
    let total = details.rows[0]["Total_Fees_Paid"].as_f64().unwrap_or_default();
    assert!((total - 1500.5).abs() < 1e-9);
    assert_eq!(details.rows[0]["Room_Number"], json!("A-101"));

    let status = dorm.add_payment(102, 250.0, "UPI").await;
    assert!(status.success, "{status}");
    let summary = dorm.dashboard_summary().await;
    assert_eq!(summary.rows[0]["Pending Fees Students"], json!(1));
    Ok(())
}
