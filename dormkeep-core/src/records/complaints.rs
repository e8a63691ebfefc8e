use super::{Dormitory, fold_read, fold_write};
use crate::error::{DormError, Result};
use crate::models::{Relation, Status};
use crate::queries::complaints;
use crate::schema::fields::complaint;
use crate::schema::{ResolvedColumnMap, TableName, resolve_table};
use crate::store::{ProcedureOutcome, StoreSession};

impl Dormitory {
    /// Complaints, most recent first, optionally for one student.
    ///
    /// Ordered by the first recorded-at column present, or by complaint id
    /// when the table has none.
    pub async fn view_complaints(&self, student_id: Option<i64>) -> Relation {
        fold_read("view_complaints", self.try_view_complaints(student_id).await)
    }

    async fn try_view_complaints(&self, student_id: Option<i64>) -> Result<Relation> {
        let mut session = self.store.acquire().await?;
        let map = resolve_table(session.as_mut(), TableName::Complaint, &complaint::ALL).await;
        list_complaints(session.as_mut(), &map, student_id).await
    }

    /// Raises a complaint and returns the student's refreshed complaint list.
    ///
    /// The `RaiseComplaint` routine is tried first. Only when the store
    /// reports it absent or incompatible does a direct insert run instead,
    /// inside the same transaction. Errors raised by the routine itself are
    /// reported as-is. The write and the refreshed listing share one session.
    pub async fn raise_complaint(&self, student_id: i64, text: &str) -> (Status, Relation) {
        let mut session = match self.store.acquire().await {
            Ok(session) => session,
            Err(e) => {
                let refreshed = Relation::failed(e.to_string());
                return (fold_write("raise_complaint", Err(e)), refreshed);
            }
        };
        let map = resolve_table(session.as_mut(), TableName::Complaint, &complaint::ALL).await;

        let status = fold_write(
            "raise_complaint",
            write_complaint(session.as_mut(), &map, student_id, text.trim()).await,
        );
        let refreshed = fold_read(
            "view_complaints",
            list_complaints(session.as_mut(), &map, Some(student_id)).await,
        );
        (status, refreshed)
    }

    /// Sets the status of one complaint.
    pub async fn update_complaint_status(&self, complaint_id: i64, status: &str) -> Status {
        fold_write(
            "update_complaint_status",
            self.try_update_complaint_status(complaint_id, status).await,
        )
    }

    async fn try_update_complaint_status(&self, complaint_id: i64, status: &str) -> Result<String> {
        let status = crate::validation::require_text("Status", status)?;
        let mut session = self.store.acquire().await?;
        let map = resolve_table(session.as_mut(), TableName::Complaint, &complaint::ALL).await;
        let statement = complaints::update_status(&map, complaint_id, status)?;
        if session.execute(&statement).await? == 0 {
            return Err(DormError::conflict(format!(
                "No complaint with ID {complaint_id}"
            )));
        }
        Ok("Complaint status updated successfully!".to_string())
    }
}

async fn list_complaints(
    session: &mut dyn StoreSession,
    map: &ResolvedColumnMap<'_>,
    student_id: Option<i64>,
) -> Result<Relation> {
    let statement = complaints::list(map, student_id)?;
    session.fetch_all(&statement).await
}

/// Runs the routine or the fallback insert in one transaction. The
/// transaction is gone when this returns, committed or rolled back.
async fn write_complaint(
    session: &mut dyn StoreSession,
    map: &ResolvedColumnMap<'_>,
    student_id: i64,
    text: &str,
) -> Result<String> {
    let mut tx = session.begin().await?;
    match tx
        .call_procedure(&complaints::raise_routine(student_id, text))
        .await?
    {
        ProcedureOutcome::Completed => {
            tracing::debug!("Complaint for student {} raised by routine", student_id);
        }
        ProcedureOutcome::Unavailable => {
            tracing::debug!(
                "Complaint routine unavailable, inserting directly for student {}",
                student_id
            );
            tx.execute(&complaints::insert(map, student_id, text)?)
                .await?;
        }
    }
    tx.commit().await?;

    Ok("Complaint raised successfully!".to_string())
}
