//! Shared fixtures for the SQLite integration tests.
//!
//! Two synthetic deployments of the dormitory schema are provided: the
//! canonical one, and a drifted one with renamed columns, no complaint
//! timestamp and no payment amount.

#![allow(dead_code)]

use dormkeep_core::sql::Statement;
use dormkeep_core::{Dormitory, RecordStore, Result, create_store};
use std::sync::Arc;

pub const CANONICAL_SCHEMA: &[&str] = &[
    "CREATE TABLE Staff (Staff_ID INTEGER PRIMARY KEY, Name TEXT NOT NULL, Role TEXT)",
    "CREATE TABLE Room (
        Room_ID INTEGER PRIMARY KEY,
        Room_Number TEXT NOT NULL,
        Capacity INTEGER NOT NULL,
        Current_Occupancy INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE Student (
        Student_ID INTEGER PRIMARY KEY,
        Name TEXT NOT NULL,
        Gender TEXT,
        Department TEXT,
        Room_ID INTEGER REFERENCES Room(Room_ID),
        Fee_Status TEXT NOT NULL DEFAULT 'Pending'
    )",
    "CREATE TABLE Fee_Payment (
        Payment_ID INTEGER PRIMARY KEY AUTOINCREMENT,
        Student_ID INTEGER NOT NULL REFERENCES Student(Student_ID),
        Amount REAL NOT NULL,
        Payment_Mode TEXT
    )",
    "CREATE TABLE Complaint (
        Complaint_ID INTEGER PRIMARY KEY AUTOINCREMENT,
        Student_ID INTEGER NOT NULL REFERENCES Student(Student_ID),
        Text TEXT,
        Status TEXT NOT NULL DEFAULT 'Open',
        Created_At TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE User_Login (
        Username TEXT PRIMARY KEY,
        Password TEXT NOT NULL,
        Role TEXT NOT NULL,
        Linked_ID INTEGER
    )",
];

pub const DRIFTED_SCHEMA: &[&str] = &[
    "CREATE TABLE Room (Id INTEGER PRIMARY KEY, Number TEXT, Capacity INTEGER, Current_Occupancy INTEGER)",
    "CREATE TABLE Student (
        Id INTEGER PRIMARY KEY,
        Student_Name TEXT NOT NULL,
        Dept TEXT,
        RoomId INTEGER,
        FeeStatus TEXT
    )",
    "CREATE TABLE Fee_Payment (Payment_ID INTEGER PRIMARY KEY AUTOINCREMENT, StudentId INTEGER, Payment_Mode TEXT)",
    "CREATE TABLE Complaint (
        Id INTEGER PRIMARY KEY AUTOINCREMENT,
        StudentId INTEGER NOT NULL,
        Complaint_Text TEXT,
        State TEXT
    )",
];

/// A fresh in-memory store.
pub async fn memory_store() -> Result<Arc<dyn RecordStore>> {
    create_store("sqlite::memory:").await
}

/// Runs each statement on one session, then releases it.
///
/// The in-memory store has a single connection, so the session must be gone
/// before any record operation runs.
pub async fn run(store: &dyn RecordStore, statements: &[&str]) -> Result<()> {
    let mut session = store.acquire().await?;
    for sql in statements {
        session.execute(&Statement::new(*sql)).await?;
    }
    Ok(())
}

/// A record service over a freshly created deployment of `schema`.
pub async fn dormitory(schema: &[&str]) -> Result<Dormitory> {
    let store = memory_store().await?;
    run(store.as_ref(), schema).await?;
    Ok(Dormitory::new(store))
}

/// Canonical deployment with two rooms, three students, payments and
/// complaints at fixed timestamps.
pub async fn seeded_canonical() -> Result<Dormitory> {
    let dorm = dormitory(CANONICAL_SCHEMA).await?;
    run(
        dorm.store(),
        &[
            "INSERT INTO Room VALUES (1, 'A-101', 2, 2), (2, 'B-202', 3, 1)",
            "INSERT INTO Student VALUES
                (101, 'Asha', 'F', 'CSE', 1, 'Paid'),
                (102, 'Ravi', 'M', 'ECE', 1, 'Pending'),
                (103, 'Meera', 'F', 'MECH', NULL, 'Pending')",
            "INSERT INTO Fee_Payment (Student_ID, Amount, Payment_Mode) VALUES
                (101, 1000.0, 'UPI'), (101, 500.5, 'Cash')",
            "INSERT INTO Complaint (Student_ID, Text, Status, Created_At) VALUES
                (101, 'Leaky tap', 'Resolved', '2024-01-05 10:00:00'),
                (101, 'Broken fan', 'Open', '2024-03-01 09:30:00'),
                (102, 'No hot water', 'In Progress', '2024-02-10 18:15:00'),
                (101, 'Noisy corridor', 'Open', '2023-12-24 22:00:00')",
            "INSERT INTO User_Login VALUES
                ('asha', 'secret', 'Student', 101),
                ('warden', 'hostel 2024  ', 'Warden', NULL)",
        ],
    )
    .await?;
    Ok(dorm)
}

/// Drifted deployment. Complaint ids are inserted out of chronological
/// order on purpose; only the key can order them.
pub async fn seeded_drifted() -> Result<Dormitory> {
    let dorm = dormitory(DRIFTED_SCHEMA).await?;
    run(
        dorm.store(),
        &[
            "INSERT INTO Room VALUES (7, 'C-7', 2, 1)",
            "INSERT INTO Student VALUES (201, 'Kiran', 'CIVIL', 7, 'Pending'), (202, 'Zoya', 'CSE', NULL, 'Paid')",
            "INSERT INTO Fee_Payment (StudentId, Payment_Mode) VALUES (201, 'Card')",
            "INSERT INTO Complaint (Id, StudentId, Complaint_Text, State) VALUES
                (5, 201, 'Window jammed', 'Open'),
                (9, 201, 'Light flickers', 'Open'),
                (2, 202, 'Door lock', 'Resolved')",
        ],
    )
    .await?;
    Ok(dorm)
}
