//! Fresh column discovery through a store session.
//!
//! Every call re-queries the store's metadata catalog. Failures are logged
//! and turned into an empty [`ColumnSet`] so that callers degrade instead of
//! crashing; required columns then surface as schema resolution errors.

use super::{ColumnSet, ResolvedColumnMap, SynonymSpec, TableName};
use crate::store::StoreSession;

/// Returns the uppercased column names currently defined for `table`.
///
/// Never fails: a catalog error yields the empty set.
pub async fn columns_of(session: &mut dyn StoreSession, table: TableName) -> ColumnSet {
    match session.column_names(table).await {
        Ok(names) => {
            let columns = ColumnSet::new(names);
            tracing::debug!("Discovered {} columns for table {}", columns.len(), table);
            columns
        }
        Err(e) => {
            tracing::warn!(
                "Column discovery for table {} failed, treating schema as unknown: {}",
                table,
                e
            );
            ColumnSet::default()
        }
    }
}

/// Discovers `table`'s columns and resolves `specs` against them.
pub async fn resolve_table<'a>(
    session: &mut dyn StoreSession,
    table: TableName,
    specs: &[SynonymSpec<'a>],
) -> ResolvedColumnMap<'a> {
    let columns = columns_of(session, table).await;
    ResolvedColumnMap::build(table, &columns, specs)
}
