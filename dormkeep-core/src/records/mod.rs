//! The record service.
//!
//! [`Dormitory`] is the only entry point the presentation layer needs. Every
//! public operation acquires exactly one store session, releases it before
//! returning, and never returns `Err`: reads fold failures into a
//! [`Relation`] error marker, writes into a failed [`Status`].
//!
//! # Module Structure
//! - `complaints`: schema-resolved complaint listing and writes
//! - `report`: the student detail report and the dashboards

mod complaints;
mod report;

pub use report::summary;

use crate::auth::CredentialVerifier;
use crate::error::{DormError, Result};
use crate::models::{Credential, Relation, Status};
use crate::queries::fixed;
use crate::schema::TableName;
use crate::store::RecordStore;
use crate::validation::{require_text, validate_amount};
use std::sync::Arc;

/// Message returned by [`Dormitory::login`] when verification fails.
pub const INVALID_CREDENTIALS: &str =
    "Invalid credentials (username not found or password mismatch).";

/// Record operations over one store.
#[derive(Clone)]
pub struct Dormitory {
    store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for Dormitory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dormitory")
            .field("backend", &self.store.backend())
            .field("database", &self.store.config().database)
            .finish()
    }
}

impl Dormitory {
    /// Creates the service over `store`.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The backing store.
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Reads a whole table.
    ///
    /// Names outside [`TableName::VIEWABLE`] are rejected before the store is
    /// contacted.
    pub async fn view_table(&self, name: &str) -> Relation {
        fold_read("view_table", self.try_view_table(name).await)
    }

    async fn try_view_table(&self, name: &str) -> Result<Relation> {
        let table = TableName::viewable(name)?;
        let mut session = self.store.acquire().await?;
        session.fetch_all(&fixed::select_all(table)).await
    }

    /// Student overview: id, name, department and fee status.
    pub async fn list_students(&self) -> Relation {
        fold_read("list_students", self.fetch(&fixed::list_students()).await)
    }

    /// Adds a student with an explicit id.
    pub async fn add_student(
        &self,
        student_id: i64,
        name: &str,
        gender: &str,
        department: &str,
        room_id: Option<i64>,
    ) -> Status {
        fold_write(
            "add_student",
            self.try_add_student(student_id, name, gender, department, room_id)
                .await,
        )
    }

    async fn try_add_student(
        &self,
        student_id: i64,
        name: &str,
        gender: &str,
        department: &str,
        room_id: Option<i64>,
    ) -> Result<String> {
        let name = require_text("Name", name)?;
        let statement =
            fixed::insert_student(student_id, name, gender.trim(), department.trim(), room_id);
        self.execute(&statement).await?;
        Ok("Student added successfully!".to_string())
    }

    /// Changes a student's department and fee status.
    pub async fn update_student(&self, student_id: i64, department: &str, fee_status: &str) -> Status {
        fold_write(
            "update_student",
            self.try_update_student(student_id, department, fee_status)
                .await,
        )
    }

    async fn try_update_student(
        &self,
        student_id: i64,
        department: &str,
        fee_status: &str,
    ) -> Result<String> {
        let fee_status = require_text("Fee status", fee_status)?;
        let statement = fixed::update_student(student_id, department.trim(), fee_status);
        if self.execute(&statement).await? == 0 {
            return Err(no_student(student_id));
        }
        Ok("Student updated successfully!".to_string())
    }

    /// Deletes a student. Rows referencing the student make the store refuse.
    pub async fn delete_student(&self, student_id: i64) -> Status {
        fold_write("delete_student", self.try_delete_student(student_id).await)
    }

    async fn try_delete_student(&self, student_id: i64) -> Result<String> {
        if self.execute(&fixed::delete_student(student_id)).await? == 0 {
            return Err(no_student(student_id));
        }
        Ok("Student deleted successfully!".to_string())
    }

    /// Records a payment and marks the student's fees as paid.
    ///
    /// Both statements run in one transaction. When no student row is marked
    /// the transaction is rolled back, so no orphan payment is left behind.
    pub async fn add_payment(&self, student_id: i64, amount: f64, payment_mode: &str) -> Status {
        fold_write(
            "add_payment",
            self.try_add_payment(student_id, amount, payment_mode).await,
        )
    }

    async fn try_add_payment(&self, student_id: i64, amount: f64, payment_mode: &str) -> Result<String> {
        validate_amount(amount)?;
        let payment_mode = require_text("Payment mode", payment_mode)?;

        let mut session = self.store.acquire().await?;
        let mut tx = session.begin().await?;
        tx.execute(&fixed::insert_payment(student_id, amount, payment_mode))
            .await?;
        if tx.execute(&fixed::mark_paid(student_id)).await? == 0 {
            // tx is dropped here, which rolls the payment back
            return Err(no_student(student_id));
        }
        tx.commit().await?;

        tracing::info!("Recorded payment for student {}", student_id);
        Ok("Payment recorded successfully!".to_string())
    }

    /// Verifies a login. See [`CredentialVerifier`].
    pub async fn verify(&self, username: &str, secret: &str) -> Option<Credential> {
        CredentialVerifier::new(self.store.as_ref())
            .verify(username, secret)
            .await
    }

    /// Verifies a login and builds the greeting shown to the user.
    pub async fn login(&self, username: &str, secret: &str) -> (Status, Option<Credential>) {
        match self.verify(username, secret).await {
            Some(credential) => (
                Status::ok(format!(
                    "Welcome {}! Logged in as {}.",
                    credential.username, credential.role
                )),
                Some(credential),
            ),
            None => (Status::failed(INVALID_CREDENTIALS), None),
        }
    }

    async fn fetch(&self, statement: &crate::sql::Statement) -> Result<Relation> {
        let mut session = self.store.acquire().await?;
        session.fetch_all(statement).await
    }

    async fn execute(&self, statement: &crate::sql::Statement) -> Result<u64> {
        let mut session = self.store.acquire().await?;
        session.execute(statement).await
    }
}

fn no_student(student_id: i64) -> DormError {
    DormError::conflict(format!("No student with ID {student_id}"))
}

/// Folds a read failure into an error marker.
fn fold_read(operation: &str, result: Result<Relation>) -> Relation {
    result.unwrap_or_else(|e| {
        log_failure(operation, &e);
        Relation::failed(e.to_string())
    })
}

/// Folds a write result into a status message.
fn fold_write(operation: &str, result: Result<String>) -> Status {
    match result {
        Ok(message) => Status::ok(message),
        Err(e) => {
            log_failure(operation, &e);
            Status::failed(format!("Error: {e}"))
        }
    }
}

fn log_failure(operation: &str, error: &DormError) {
    match error {
        DormError::Validation { .. } => tracing::debug!("{} rejected: {}", operation, error),
        DormError::BusinessConflict { .. } => tracing::info!("{} refused: {}", operation, error),
        _ => tracing::warn!("{} failed: {}", operation, error),
    }
}
