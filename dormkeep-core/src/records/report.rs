use super::{Dormitory, fold_read};
use crate::error::{DormError, Result};
use crate::models::{ComplaintTally, DashboardCounts, Record, Relation, as_count};
use crate::queries::fixed;
use crate::queries::report::{self, ReportColumns};
use crate::schema::fields::{complaint, fee_payment, room, student};
use crate::schema::{TableName, resolve_table};
use crate::sql::Statement;
use crate::store::StoreSession;
use serde_json::Value as JsonValue;

/// Column labels of the dashboard summary row.
pub mod summary {
    /// Every student
    pub const TOTAL_STUDENTS: &str = "Total Students";
    /// Rooms with a free bed
    pub const AVAILABLE_ROOMS: &str = "Available Rooms";
    /// Result of `CalculatePendingFees()`
    pub const PENDING_FEES: &str = "Pending Fees Students";
    /// Complaints still open
    pub const OPEN_COMPLAINTS: &str = "Open Complaints";
}

impl Dormitory {
    /// One row describing a student, their room, total paid and complaint
    /// count. Empty when the student does not exist.
    pub async fn student_details(&self, student_id: i64) -> Relation {
        fold_read("student_details", self.try_student_details(student_id).await)
    }

    async fn try_student_details(&self, student_id: i64) -> Result<Relation> {
        let mut session = self.store.acquire().await?;
        let columns = ReportColumns {
            student: resolve_table(session.as_mut(), TableName::Student, &student::ALL).await,
            room: resolve_table(session.as_mut(), TableName::Room, &room::ALL).await,
            fee_payment: resolve_table(session.as_mut(), TableName::FeePayment, &fee_payment::ALL)
                .await,
            complaint: resolve_table(session.as_mut(), TableName::Complaint, &complaint::ALL).await,
        };
        let statement = report::student_details(&columns, student_id)?;
        session.fetch_all(&statement).await
    }

    /// Headline counters for the dashboard.
    ///
    /// Each counter falls back to 0 on its own when its query fails, and all
    /// of them do when no session can be acquired.
    pub async fn dashboard_counts(&self) -> DashboardCounts {
        let mut session = match self.store.acquire().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Dashboard counters unavailable: {}", e);
                return DashboardCounts::default();
            }
        };

        DashboardCounts {
            total_students: count_or_zero(session.as_mut(), "total students", &fixed::count_students())
                .await,
            pending_fees: count_or_zero(session.as_mut(), "pending fees", &fixed::count_pending_fees())
                .await,
            total_rooms: count_or_zero(session.as_mut(), "total rooms", &fixed::count_rooms()).await,
            complaints: complaint_tally(session.as_mut()).await,
        }
    }

    /// Summary row built around the `CalculatePendingFees()` routine.
    ///
    /// A routine that cannot be invoked turns the whole result into a
    /// reporting error; its count is never replaced by 0.
    pub async fn dashboard_summary(&self) -> Relation {
        fold_read("dashboard_summary", self.try_dashboard_summary().await)
    }

    async fn try_dashboard_summary(&self) -> Result<Relation> {
        let mut session = self.store.acquire().await?;

        let total_students = session.fetch_scalar(&fixed::count_students()).await?;
        let available_rooms = session
            .fetch_scalar(&fixed::count_available_rooms())
            .await?;
        let pending_fees = session
            .fetch_scalar(&fixed::pending_fees_routine())
            .await
            .map_err(|e| DormError::reporting(format!("CalculatePendingFees() failed: {e}")))?;
        let open_complaints = session
            .fetch_scalar(&fixed::count_open_complaints())
            .await?;

        let values = [
            (summary::TOTAL_STUDENTS, total_students),
            (summary::AVAILABLE_ROOMS, available_rooms),
            (summary::PENDING_FEES, pending_fees),
            (summary::OPEN_COMPLAINTS, open_complaints),
        ];
        let columns = values.iter().map(|(label, _)| (*label).to_string()).collect();
        let row: Record = values
            .into_iter()
            .map(|(label, value)| (label.to_string(), JsonValue::from(as_count(&value))))
            .collect();

        Ok(Relation::new(columns, vec![row]))
    }
}

async fn count_or_zero(session: &mut dyn StoreSession, counter: &str, statement: &Statement) -> u64 {
    match session.fetch_scalar(statement).await {
        Ok(value) => as_count(&value),
        Err(e) => {
            tracing::warn!("Counter '{}' degraded to 0: {}", counter, e);
            0
        }
    }
}

async fn complaint_tally(session: &mut dyn StoreSession) -> ComplaintTally {
    let mut tally = ComplaintTally::default();
    match session.fetch_all(&fixed::complaint_status_counts()).await {
        Ok(relation) => {
            for row in &relation.rows {
                if let Some(JsonValue::String(status)) = row.get("Status") {
                    tally.record(status, row.get("Total").map_or(0, as_count));
                }
            }
        }
        Err(e) => tracing::warn!("Complaint tally degraded to 0: {}", e),
    }
    tally
}
