//! Table identities known to the record layer.

use crate::error::{DormError, Result};
use serde::Serialize;

/// Every table the record layer reads or writes.
///
/// Table identifiers in generated SQL come only from this enum, never from
/// caller-supplied strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TableName {
    /// `Staff`
    Staff,
    /// `Room`
    Room,
    /// `Student`
    Student,
    /// `Fee_Payment`
    FeePayment,
    /// `Complaint`
    Complaint,
    /// `User_Login`, the credential table
    UserLogin,
}

impl TableName {
    /// Tables that may be read in full by [`crate::Dormitory::view_table`].
    ///
    /// `User_Login` is absent: it holds stored secrets.
    pub const VIEWABLE: [Self; 5] = [
        Self::Staff,
        Self::Room,
        Self::Student,
        Self::FeePayment,
        Self::Complaint,
    ];

    /// Physical table name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Staff => "Staff",
            Self::Room => "Room",
            Self::Student => "Student",
            Self::FeePayment => "Fee_Payment",
            Self::Complaint => "Complaint",
            Self::UserLogin => "User_Login",
        }
    }

    /// Looks a name up in the viewable whitelist.
    ///
    /// Matching is exact; anything outside the whitelist is a validation
    /// error.
    pub fn viewable(name: &str) -> Result<Self> {
        Self::VIEWABLE
            .into_iter()
            .find(|table| table.as_str() == name)
            .ok_or_else(|| DormError::validation(format!("Table '{name}' is not allowed.")))
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
