//! Synonym lists for every logical field the record layer resolves.
//!
//! Each list is ordered by priority: the first spelling found in the live
//! catalog is the one used. Deployments that renamed a column during a
//! legacy migration are covered by the later entries.

use super::SynonymSpec;

/// `Student` fields.
pub mod student {
    use super::SynonymSpec;

    /// Primary key
    pub const ID: SynonymSpec<'static> = SynonymSpec::new("student id", &["Student_ID", "Id"]);
    /// Display name
    pub const NAME: SynonymSpec<'static> = SynonymSpec::new("name", &["Name", "Student_Name"]);
    /// Gender
    pub const GENDER: SynonymSpec<'static> = SynonymSpec::new("gender", &["Gender", "Sex"]);
    /// Department
    pub const DEPARTMENT: SynonymSpec<'static> =
        SynonymSpec::new("department", &["Department", "Dept"]);
    /// Assigned room (foreign key into `Room`)
    pub const ROOM: SynonymSpec<'static> = SynonymSpec::new("room ref", &["Room_ID", "RoomId"]);
    /// Fee status (`Paid` / `Pending`)
    pub const FEE_STATUS: SynonymSpec<'static> =
        SynonymSpec::new("fee status", &["Fee_Status", "FeeStatus"]);

    /// Everything the detail report looks up.
    pub const ALL: [SynonymSpec<'static>; 6] = [ID, NAME, GENDER, DEPARTMENT, ROOM, FEE_STATUS];
}

/// `Room` fields.
pub mod room {
    use super::SynonymSpec;

    /// Primary key
    pub const ID: SynonymSpec<'static> = SynonymSpec::new("room id", &["Room_ID", "Id"]);
    /// Human-facing room number
    pub const NUMBER: SynonymSpec<'static> =
        SynonymSpec::new("room number", &["Room_Number", "Number"]);

    /// Everything the detail report looks up.
    pub const ALL: [SynonymSpec<'static>; 2] = [ID, NUMBER];
}

/// `Fee_Payment` fields.
pub mod fee_payment {
    use super::SynonymSpec;

    /// Paying student (foreign key into `Student`)
    pub const STUDENT: SynonymSpec<'static> =
        SynonymSpec::new("student ref", &["Student_ID", "StudentId"]);
    /// Amount paid
    pub const AMOUNT: SynonymSpec<'static> =
        SynonymSpec::new("amount", &["Amount", "Fee_Amount"]);

    /// Everything the detail report looks up.
    pub const ALL: [SynonymSpec<'static>; 2] = [STUDENT, AMOUNT];
}

/// `Complaint` fields.
pub mod complaint {
    use super::SynonymSpec;

    /// Primary key
    pub const ID: SynonymSpec<'static> =
        SynonymSpec::new("complaint id", &["Complaint_ID", "Id"]);
    /// Raising student (foreign key into `Student`)
    pub const STUDENT: SynonymSpec<'static> =
        SynonymSpec::new("student ref", &["Student_ID", "StudentId"]);
    /// Free-text body; optional, some schemas never stored it
    pub const TEXT: SynonymSpec<'static> = SynonymSpec::new("text", &["Text", "Complaint_Text"]);
    /// Workflow state (`Open` / `In Progress` / `Resolved`)
    pub const STATUS: SynonymSpec<'static> = SynonymSpec::new("status", &["Status", "State"]);
    /// Creation or update timestamp used for most-recent-first ordering
    pub const RECORDED_AT: SynonymSpec<'static> = SynonymSpec::new(
        "recorded at",
        &[
            "Created_At",
            "CreatedAt",
            "Created",
            "Timestamp",
            "Updated_At",
            "UpdatedAt",
        ],
    );

    /// Everything the complaint statements look up.
    pub const ALL: [SynonymSpec<'static>; 5] = [ID, STUDENT, TEXT, STATUS, RECORDED_AT];
}

/// Output labels shared by every deployment, whatever the physical names.
pub mod labels {
    /// Student id
    pub const STUDENT_ID: &str = "Student_ID";
    /// Student name
    pub const NAME: &str = "Name";
    /// Gender
    pub const GENDER: &str = "Gender";
    /// Department
    pub const DEPARTMENT: &str = "Department";
    /// Allocated room id
    pub const ROOM_ID: &str = "Room_ID";
    /// Fee status
    pub const FEE_STATUS: &str = "Fee_Status";
    /// Room number of the allocated room
    pub const ROOM_NUMBER: &str = "Room_Number";
    /// Sum of the student's payments
    pub const TOTAL_FEES_PAID: &str = "Total_Fees_Paid";
    /// Number of complaints the student raised
    pub const TOTAL_COMPLAINTS: &str = "Total_Complaints";
    /// Complaint id
    pub const COMPLAINT_ID: &str = "Complaint_ID";
    /// Complaint text
    pub const TEXT: &str = "Text";
    /// Complaint status
    pub const STATUS: &str = "Status";
    /// When the complaint was recorded
    pub const CREATED_AT: &str = "Created_At";
}
