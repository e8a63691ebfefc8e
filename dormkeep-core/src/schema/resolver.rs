//! Pure synonym resolution against a fetched [`ColumnSet`].
//!
//! The resolver never performs I/O. Given the same column set and synonym
//! list it always returns the same answer: the list order is the tie-break
//! when several candidates are present.

use super::{ColumnSet, TableName};
use crate::error::{DormError, Result};

/// Ordered synonym candidates for one logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynonymSpec<'a> {
    /// Logical (canonical) field name, used in logs and errors
    pub field: &'a str,
    /// Physical column candidates in priority order
    pub candidates: &'a [&'a str],
}

impl<'a> SynonymSpec<'a> {
    /// Creates a synonym list for `field`.
    pub const fn new(field: &'a str, candidates: &'a [&'a str]) -> Self {
        Self { field, candidates }
    }
}

/// A column name that was found in the live catalog.
///
/// Only the resolver can produce one, which is what allows the SQL layer to
/// treat it as a safe identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column<'a>(&'a str);

impl<'a> Column<'a> {
    /// Candidate spelling of the resolved column.
    pub const fn name(self) -> &'a str {
        self.0
    }
}

impl std::fmt::Display for Column<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Outcome of resolving one logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// First present candidate
    Column(Column<'a>),
    /// No candidate is present
    Absent,
}

impl<'a> Resolution<'a> {
    /// The resolved column, if any.
    pub const fn column(self) -> Option<Column<'a>> {
        match self {
            Self::Column(column) => Some(column),
            Self::Absent => None,
        }
    }

    /// True when every candidate was missing.
    pub const fn is_absent(self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Returns the first candidate of `spec` present in `columns`, or
/// [`Resolution::Absent`].
pub fn resolve<'a>(columns: &ColumnSet, spec: &SynonymSpec<'a>) -> Resolution<'a> {
    spec.candidates
        .iter()
        .find(|candidate| columns.contains(candidate))
        .map_or(Resolution::Absent, |candidate| {
            Resolution::Column(Column(*candidate))
        })
}

/// Logical field to physical column decisions for one table, built once per
/// operation and consumed immediately.
#[derive(Debug, Clone)]
pub struct ResolvedColumnMap<'a> {
    table: TableName,
    entries: Vec<(&'a str, Resolution<'a>)>,
}

impl<'a> ResolvedColumnMap<'a> {
    /// Resolves every spec against `columns`, logging each decision.
    pub fn build(table: TableName, columns: &ColumnSet, specs: &[SynonymSpec<'a>]) -> Self {
        let entries = specs
            .iter()
            .map(|spec| {
                let resolution = resolve(columns, spec);
                match resolution {
                    Resolution::Column(column) => tracing::debug!(
                        "Resolved {}.{} to column '{}'",
                        table,
                        spec.field,
                        column
                    ),
                    Resolution::Absent => tracing::debug!(
                        "No candidate of {:?} present for {}.{}",
                        spec.candidates,
                        table,
                        spec.field
                    ),
                }
                (spec.field, resolution)
            })
            .collect();

        Self { table, entries }
    }

    /// Table the map was built for.
    pub const fn table(&self) -> TableName {
        self.table
    }

    /// Resolution for `spec`; fields that were never resolved are absent.
    pub fn get(&self, spec: &SynonymSpec<'_>) -> Resolution<'a> {
        self.entries
            .iter()
            .find(|(field, _)| *field == spec.field)
            .map_or(Resolution::Absent, |(_, resolution)| *resolution)
    }

    /// Column for an optional field; `None` means degrade.
    pub fn optional(&self, spec: &SynonymSpec<'_>) -> Option<Column<'a>> {
        self.get(spec).column()
    }

    /// Column for a field the statement cannot do without.
    ///
    /// # Errors
    /// Returns [`DormError::SchemaResolution`] when no candidate is present.
    pub fn required(&self, spec: &SynonymSpec<'_>) -> Result<Column<'a>> {
        self.optional(spec)
            .ok_or_else(|| DormError::unresolved(self.table.as_str(), spec.field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEXT: SynonymSpec<'static> = SynonymSpec::new("text", &["Text", "Complaint_Text"]);
    const TEXT_REVERSED: SynonymSpec<'static> =
        SynonymSpec::new("text", &["Complaint_Text", "Text"]);

    #[test]
    fn test_first_present_candidate_wins() {
        let columns = ColumnSet::new(["COMPLAINT_ID", "TEXT", "COMPLAINT_TEXT"]);
        assert_eq!(resolve(&columns, &TEXT).column().map(Column::name), Some("Text"));
        assert_eq!(
            resolve(&columns, &TEXT_REVERSED).column().map(Column::name),
            Some("Complaint_Text")
        );
    }

    #[test]
    fn test_later_candidate_used_when_earlier_missing() {
        let columns = ColumnSet::new(["Complaint_Text"]);
        assert_eq!(
            resolve(&columns, &TEXT).column().map(Column::name),
            Some("Complaint_Text")
        );
    }

    #[test]
    fn test_absent_when_nothing_matches() {
        let columns = ColumnSet::new(["Body"]);
        assert!(resolve(&columns, &TEXT).is_absent());
        assert!(resolve(&ColumnSet::default(), &TEXT).is_absent());
    }

    #[test]
    fn test_required_reports_table_and_field() {
        let map = ResolvedColumnMap::build(TableName::Complaint, &ColumnSet::default(), &[TEXT]);
        let error = map.required(&TEXT).unwrap_err();
        assert!(matches!(
            error,
            DormError::SchemaResolution { ref table, ref field } if table == "Complaint" && field == "text"
        ));
    }

    #[test]
    fn test_unknown_field_is_absent() {
        let map = ResolvedColumnMap::build(TableName::Complaint, &ColumnSet::new(["Text"]), &[]);
        assert!(map.get(&TEXT).is_absent());
    }

    fn candidate_names() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[A-Za-z_]{1,8}", 0..6)
    }

    proptest! {
        #[test]
        fn prop_resolve_returns_first_present(
            present in candidate_names(),
            candidates in candidate_names(),
        ) {
            let columns = ColumnSet::new(&present);
            let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
            let spec = SynonymSpec::new("field", &refs);

            let expected = refs
                .iter()
                .copied()
                .find(|c| present.iter().any(|p| p.eq_ignore_ascii_case(c)));
            prop_assert_eq!(resolve(&columns, &spec).column().map(Column::name), expected);
        }

        #[test]
        fn prop_resolve_is_idempotent(
            present in candidate_names(),
            candidates in candidate_names(),
        ) {
            let columns = ColumnSet::new(&present);
            let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
            let spec = SynonymSpec::new("field", &refs);
            prop_assert_eq!(resolve(&columns, &spec), resolve(&columns, &spec));
        }

        #[test]
        fn prop_order_is_the_tie_break(a in "[A-Z]{1,6}", b in "[a-z]{1,6}") {
            let columns = ColumnSet::new([a.as_str(), b.as_str()]);
            let forward = [a.as_str(), b.as_str()];
            let backward = [b.as_str(), a.as_str()];
            prop_assert_eq!(
                resolve(&columns, &SynonymSpec::new("f", &forward)).column().map(Column::name),
                Some(a.as_str())
            );
            prop_assert_eq!(
                resolve(&columns, &SynonymSpec::new("f", &backward)).column().map(Column::name),
                Some(b.as_str())
            );
        }

        #[test]
        fn prop_empty_set_is_always_absent(candidates in candidate_names()) {
            let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
            let spec = SynonymSpec::new("field", &refs);
            prop_assert!(resolve(&ColumnSet::default(), &spec).is_absent());
        }
    }
}
