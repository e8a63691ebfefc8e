//! In-process fake store for unit tests.
//!
//! Counts acquisitions and records every statement so tests can assert what
//! reached the store (and what never did).

use super::{ProcedureOutcome, RecordStore, StoreBackend, StoreConfig, StoreSession, StoreTransaction};
use crate::error::DormError;
use crate::models::Relation;
use crate::schema::TableName;
use crate::sql::Statement;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared log of everything a fake session saw.
#[derive(Debug, Default)]
pub(crate) struct FakeLog {
    pub acquisitions: AtomicUsize,
    pub statements: Mutex<Vec<Statement>>,
    pub committed: AtomicUsize,
}

impl FakeLog {
    pub(crate) fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub(crate) fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    pub(crate) fn sql(&self) -> Vec<String> {
        self.statements().iter().map(|s| s.sql().to_string()).collect()
    }

    fn record(&self, statement: &Statement) {
        self.statements.lock().unwrap().push(statement.clone());
    }
}

/// Scripted store: a per-table catalog and canned results.
#[derive(Debug, Default)]
pub(crate) struct FakeStore {
    pub log: Arc<FakeLog>,
    catalog: HashMap<TableName, Vec<String>>,
    catalog_fails: bool,
    acquire_fails: bool,
    relation: Relation,
    scalar: Option<JsonValue>,
    affected: u64,
    procedure: Option<ProcedureOutcome>,
    config: StoreConfig,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self {
            affected: 1,
            ..Self::default()
        }
    }

    pub(crate) fn with_table(mut self, table: TableName, columns: &[&str]) -> Self {
        self.catalog
            .insert(table, columns.iter().map(|c| (*c).to_string()).collect());
        self
    }

    pub(crate) const fn with_failing_catalog(mut self) -> Self {
        self.catalog_fails = true;
        self
    }

    pub(crate) const fn with_failing_acquire(mut self) -> Self {
        self.acquire_fails = true;
        self
    }

    pub(crate) fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = relation;
        self
    }

    pub(crate) fn with_scalar(mut self, value: JsonValue) -> Self {
        self.scalar = Some(value);
        self
    }

    pub(crate) const fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    pub(crate) const fn with_procedure(mut self, outcome: ProcedureOutcome) -> Self {
        self.procedure = Some(outcome);
        self
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn acquire(&self) -> Result<Box<dyn StoreSession>> {
        self.log.acquisitions.fetch_add(1, Ordering::SeqCst);
        if self.acquire_fails {
            return Err(DormError::transport(
                "Failed to acquire a connection",
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            ));
        }
        Ok(Box::new(FakeSession {
            log: Arc::clone(&self.log),
            catalog: self.catalog.clone(),
            catalog_fails: self.catalog_fails,
            relation: self.relation.clone(),
            scalar: self.scalar.clone(),
            affected: self.affected,
            procedure: self.procedure,
        }))
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::Sqlite
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }
}

struct FakeSession {
    log: Arc<FakeLog>,
    catalog: HashMap<TableName, Vec<String>>,
    catalog_fails: bool,
    relation: Relation,
    scalar: Option<JsonValue>,
    affected: u64,
    procedure: Option<ProcedureOutcome>,
}

#[async_trait]
impl StoreSession for FakeSession {
    async fn column_names(&mut self, table: TableName) -> Result<Vec<String>> {
        if self.catalog_fails {
            return Err(DormError::transport(
                "catalog unavailable",
                std::io::Error::other("metadata query failed"),
            ));
        }
        Ok(self.catalog.get(&table).cloned().unwrap_or_default())
    }

    async fn fetch_all(&mut self, statement: &Statement) -> Result<Relation> {
        self.log.record(statement);
        Ok(self.relation.clone())
    }

    async fn fetch_scalar(&mut self, statement: &Statement) -> Result<JsonValue> {
        self.log.record(statement);
        self.scalar.clone().ok_or_else(|| {
            DormError::transport(
                "scalar failed",
                std::io::Error::other("FUNCTION does not exist"),
            )
        })
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.log.record(statement);
        Ok(self.affected)
    }

    async fn begin<'a>(&'a mut self) -> Result<Box<dyn StoreTransaction + 'a>> {
        Ok(Box::new(FakeTransaction {
            log: Arc::clone(&self.log),
            affected: self.affected,
            procedure: self.procedure,
        }))
    }
}

struct FakeTransaction {
    log: Arc<FakeLog>,
    affected: u64,
    procedure: Option<ProcedureOutcome>,
}

#[async_trait]
impl StoreTransaction for FakeTransaction {
    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.log.record(statement);
        Ok(self.affected)
    }

    async fn call_procedure(&mut self, statement: &Statement) -> Result<ProcedureOutcome> {
        self.log.record(statement);
        self.procedure.ok_or_else(|| {
            DormError::BusinessConflict {
                context: "Routine call failed".to_string(),
                source: None,
            }
        })
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.log.committed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
