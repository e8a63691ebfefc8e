//! Statement assembly for every record operation.
//!
//! These functions are pure: they take resolved column maps (or nothing,
//! for fixed-shape statements) and return [`Statement`](crate::sql::Statement)
//! values. Running them is the record service's job.
//!
//! # Module Structure
//! - `complaints`: schema-resolved complaint listing, insert and update
//! - `report`: the per-student detail join
//! - `fixed`: statements over well-known column names

pub mod complaints;
pub mod fixed;
pub mod report;
