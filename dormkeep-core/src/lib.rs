//! Schema-adaptive record access for hostel and dormitory databases.
//!
//! Deployments of the same dormitory data model disagree on column names
//! (`Student_ID` or `Id`, `Text` or `Complaint_Text`) and on whether optional
//! columns such as a creation timestamp exist at all. This crate discovers
//! the live columns of a table on every operation, resolves each logical
//! field through an ordered synonym list, and assembles statements only from
//! the resolved identifiers.
//!
//! # Guarantees
//! - Table identifiers come from a closed enum, column identifiers from the
//!   live catalog. Values are always bound parameters.
//! - Optional fields degrade (omitted column, constant `0`). Required keys
//!   fail visibly.
//! - Every public operation acquires one session and releases it on every
//!   exit path. Multi-statement writes run in one transaction.
//! - Stored secrets are never returned, logged or serialized.
//!
//! # Example
//! ```rust,no_run
//! use dormkeep_core::{Dormitory, create_store};
//!
//! # async fn example() -> dormkeep_core::Result<()> {
//! let store = create_store("mysql://root@localhost/college_dorm").await?;
//! let dorm = Dormitory::new(store);
//!
//! let complaints = dorm.view_complaints(Some(101)).await;
//! println!("{}", serde_json::to_string_pretty(&complaints).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod logging;
pub mod models;
pub mod queries;
pub mod records;
pub mod schema;
pub mod sql;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use auth::CredentialVerifier;
pub use error::{DormError, Result};
pub use models::{ComplaintTally, Credential, DashboardCounts, Record, Relation, Status};
pub use records::{Dormitory, INVALID_CREDENTIALS};
pub use schema::{ColumnSet, ResolvedColumnMap, SynonymSpec, TableName};
pub use store::{
    ProcedureOutcome, RecordStore, StoreBackend, StoreConfig, StoreSession, StoreTransaction,
    create_store,
};
